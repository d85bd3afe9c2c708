//! In-process stand-in for the on-console Gecko handler.
//!
//! The device parses requests as the session writes them, applies them to a
//! sparse memory image and queues the responses for the session to read.
//! Tests keep a clone of the device to inspect the request log and the memory
//! image after handing another clone to the session.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::io::{self, Read, Write};
use std::net::Shutdown;
use std::sync::{Arc, Mutex, MutexGuard};

use geckolink_core::Transport;

pub const HEAP_ALLOC_FN: u32 = 0x0201_0000;
pub const HEAP_FREE_FN: u32 = 0x0201_0100;
pub const SYSTEM_ALLOC_FN: u32 = 0x0201_0200;
pub const SYSTEM_FREE_FN: u32 = 0x0201_0300;
pub const MEMSET_FN: u32 = 0x0201_0400;

/// Pointer slots the heap exports resolve to.
pub const HEAP_ALLOC_SLOT: u32 = 0x1000_0100;
pub const HEAP_FREE_SLOT: u32 = 0x1000_0104;

/// First address handed out by the fake allocators.
pub const ALLOCATION_BASE: u32 = 0x1080_0000;

pub const OS_VERSION: u32 = 550;

const STATUS_RUNNING: u8 = 0x01;
const STATUS_OK: u8 = 0xBD;
const STATUS_OK_EMPTY: u8 = 0xB0;
const STATUS_GC_ACK: u8 = 0xAA;

/// One request as received, opcode plus argument bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request
{
    pub opcode: u8,
    pub body: Vec<u8>,
}

impl Request
{
    pub fn word(&self, index: usize) -> u32
    {
        let start = index * 4;
        u32::from_be_bytes(self.body[start..start + 4].try_into().unwrap())
    }
}

/// A remote call the device executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call
{
    pub opcode: u8,
    pub address: u32,
    pub slots: Vec<u32>,
}

#[derive(Default)]
struct DeviceState
{
    memory: BTreeMap<u32, u8>,
    inbox: Vec<u8>,
    outbox: VecDeque<u8>,
    requests: Vec<Request>,
    calls: Vec<Call>,
    exports: HashMap<(String, String), u32>,
    status_script: VecDeque<u8>,
    rpc_returns: VecDeque<u64>,
    big_call_slots: VecDeque<usize>,
    next_allocation: u32,
    allocation_fails: bool,
    shutdowns: Vec<Shutdown>,
    shutdown_error: Option<io::ErrorKind>,
    disconnected: bool,
}

#[derive(Clone)]
pub struct FakeDevice
{
    state: Arc<Mutex<DeviceState>>,
}

impl FakeDevice
{
    /// A device exporting the coreinit allocator and `memset`.
    pub fn new() -> Self
    {
        let device = Self {
            state: Arc::new(Mutex::new(DeviceState {
                next_allocation: ALLOCATION_BASE,
                ..DeviceState::default()
            })),
        };
        device.export("coreinit.rpl", "MEMAllocFromDefaultHeapEx", HEAP_ALLOC_SLOT);
        device.export("coreinit.rpl", "MEMFreeToDefaultHeap", HEAP_FREE_SLOT);
        device.export("coreinit.rpl", "OSAllocFromSystem", SYSTEM_ALLOC_FN);
        device.export("coreinit.rpl", "OSFreeToSystem", SYSTEM_FREE_FN);
        device.export("coreinit.rpl", "memset", MEMSET_FN);
        device.write_memory(HEAP_ALLOC_SLOT, &HEAP_ALLOC_FN.to_be_bytes());
        device.write_memory(HEAP_FREE_SLOT, &HEAP_FREE_FN.to_be_bytes());
        device
    }

    fn state(&self) -> MutexGuard<'_, DeviceState>
    {
        self.state.lock().unwrap()
    }

    pub fn export(&self, module: &str, name: &str, address: u32)
    {
        self.state().exports.insert((module.to_string(), name.to_string()), address);
    }

    pub fn write_memory(&self, address: u32, bytes: &[u8])
    {
        self.state().store(address, bytes);
    }

    pub fn read_memory(&self, address: u32, length: usize) -> Vec<u8>
    {
        self.state().load(address, length)
    }

    /// Answer the next status-bearing request with `status` instead of the
    /// natural one.
    pub fn script_status(&self, status: u8)
    {
        self.state().status_script.push_back(status);
    }

    /// Answer the next remote call with `value` instead of running it.
    pub fn script_rpc_return(&self, value: u64)
    {
        self.state().rpc_returns.push_back(value);
    }

    /// Parse the next `0x80` frame with `slots` argument slots instead of 16.
    ///
    /// A stock handler always reads 16; this stands in for one patched to
    /// accept the 8-slot legacy frame.
    pub fn script_big_call_slots(&self, slots: usize)
    {
        self.state().big_call_slots.push_back(slots);
    }

    pub fn fail_allocations(&self)
    {
        self.state().allocation_fails = true;
    }

    pub fn fail_shutdown(&self, kind: io::ErrorKind)
    {
        self.state().shutdown_error = Some(kind);
    }

    /// Drop every queued response and answer all further reads with EOF.
    pub fn disconnect(&self)
    {
        let mut state = self.state();
        state.outbox.clear();
        state.disconnected = true;
    }

    pub fn requests(&self) -> Vec<Request>
    {
        self.state().requests.clone()
    }

    pub fn count(&self, opcode: u8) -> usize
    {
        self.state().requests.iter().filter(|request| request.opcode == opcode).count()
    }

    pub fn clear_requests(&self)
    {
        self.state().requests.clear();
    }

    pub fn calls(&self) -> Vec<Call>
    {
        self.state().calls.clone()
    }

    pub fn calls_to(&self, address: u32) -> Vec<Call>
    {
        self.calls().into_iter().filter(|call| call.address == address).collect()
    }

    pub fn shutdowns(&self) -> Vec<Shutdown>
    {
        self.state().shutdowns.clone()
    }

    /// Bytes received that do not form a complete request yet.
    pub fn pending_input(&self) -> usize
    {
        self.state().inbox.len()
    }
}

impl DeviceState
{
    fn store(&mut self, address: u32, bytes: &[u8])
    {
        for (i, byte) in bytes.iter().enumerate() {
            self.memory.insert(address + i as u32, *byte);
        }
    }

    fn load(&self, address: u32, length: usize) -> Vec<u8>
    {
        (0..length)
            .map(|i| self.memory.get(&(address + i as u32)).copied().unwrap_or(0))
            .collect()
    }

    fn status_or(&mut self, natural: u8) -> u8
    {
        self.status_script.pop_front().unwrap_or(natural)
    }

    /// Length of the request at the front of the inbox, once enough of it has
    /// arrived to tell.
    fn frame_len(&self) -> Option<usize>
    {
        let opcode = *self.inbox.first()?;
        let word = |offset: usize| -> Option<u32> {
            let bytes = self.inbox.get(offset..offset + 4)?;
            Some(u32::from_be_bytes(bytes.try_into().ok()?))
        };
        match opcode {
            0x01..=0x04 | 0x0B => Some(9),
            0x0C => Some(5),
            0x41 => Some(9 + (word(5)? - word(1)?) as usize),
            0x70 => Some(1 + 4 + 8 * 4),
            0x80 => Some(1 + 4 + self.big_call_slots.front().copied().unwrap_or(16) * 4),
            0x71 => Some(2 + usize::from(*self.inbox.get(1)?) + 1),
            0x72 => Some(13),
            _ => Some(1),
        }
    }

    fn pump(&mut self)
    {
        while let Some(len) = self.frame_len() {
            if self.inbox.len() < len {
                break;
            }
            let frame: Vec<u8> = self.inbox.drain(..len).collect();
            if frame[0] == 0x80 {
                self.big_call_slots.pop_front();
            }
            let request = Request {
                opcode: frame[0],
                body: frame[1..].to_vec(),
            };
            self.handle(&request);
            self.requests.push(request);
        }
    }

    fn respond(&mut self, bytes: &[u8])
    {
        if !self.disconnected {
            self.outbox.extend(bytes);
        }
    }

    fn handle(&mut self, request: &Request)
    {
        match request.opcode {
            0x01 => self.store(request.word(0), &request.body[7..8]),
            0x02 => self.store(request.word(0), &request.body[6..8]),
            0x03 | 0x0B => self.store(request.word(0), &request.body[4..8]),
            0x04 => {
                let (start, end) = (request.word(0), request.word(1));
                let data = self.load(start, (end - start) as usize);
                let natural = if data.iter().all(|b| *b == 0) { STATUS_OK_EMPTY } else { STATUS_OK };
                let status = self.status_or(natural);
                self.respond(&[status]);
                if status == STATUS_OK {
                    self.respond(&data);
                }
            }
            0x0C => {
                let data = self.load(request.word(0), 4);
                self.respond(&data);
            }
            0x41 => {
                let status = self.status_or(STATUS_GC_ACK);
                if status == STATUS_GC_ACK {
                    let start = request.word(0);
                    let payload = request.body[8..].to_vec();
                    self.store(start, &payload);
                }
                self.respond(&[status]);
            }
            0x50 => {
                let status = self.status_or(STATUS_RUNNING);
                self.respond(&[status]);
            }
            0x70 | 0x80 => {
                let slots: Vec<u32> = (1..request.body.len() / 4).map(|i| request.word(i)).collect();
                let call = Call {
                    opcode: request.opcode,
                    address: request.word(0),
                    slots,
                };
                let value = match self.rpc_returns.pop_front() {
                    Some(value) => value,
                    None => self.execute(&call),
                };
                self.calls.push(call);
                self.respond(&value.to_be_bytes());
            }
            0x71 => {
                let body = &request.body[1..request.body.len() - 1];
                let strings: Vec<String> = body[8..]
                    .split(|b| *b == 0)
                    .filter(|s| !s.is_empty())
                    .map(|s| String::from_utf8_lossy(s).into_owned())
                    .collect();
                let address = self
                    .exports
                    .get(&(strings[0].clone(), strings[1].clone()))
                    .copied()
                    .unwrap_or(0);
                self.respond(&address.to_be_bytes());
            }
            0x72 => {
                let (start, value, length) = (request.word(0), request.word(1), request.word(2));
                let found = (start..start + length)
                    .step_by(4)
                    .find(|address| self.load(*address, 4) == value.to_be_bytes())
                    .unwrap_or(0);
                self.respond(&found.to_be_bytes());
            }
            0x99 => self.respond(&[0x82]),
            0x9A => self.respond(&OS_VERSION.to_be_bytes()),
            _ => {}
        }
    }

    fn execute(&mut self, call: &Call) -> u64
    {
        match call.address {
            HEAP_ALLOC_FN | SYSTEM_ALLOC_FN => {
                if self.allocation_fails {
                    return 0;
                }
                let (size, alignment) = (call.slots[0], call.slots[1].max(1));
                let address = self.next_allocation.div_ceil(alignment) * alignment;
                self.next_allocation = address + size;
                u64::from(address)
            }
            MEMSET_FN => {
                let (address, value, size) = (call.slots[0], call.slots[1], call.slots[2]);
                self.store(address, &vec![value as u8; size as usize]);
                u64::from(address)
            }
            _ => 0,
        }
    }
}

impl Read for FakeDevice
{
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>
    {
        let mut state = self.state();
        let n = buf.len().min(state.outbox.len());
        for slot in buf.iter_mut().take(n) {
            *slot = state.outbox.pop_front().unwrap();
        }
        Ok(n)
    }
}

impl Write for FakeDevice
{
    fn write(&mut self, buf: &[u8]) -> io::Result<usize>
    {
        let mut state = self.state();
        if state.disconnected {
            return Err(io::Error::from(io::ErrorKind::BrokenPipe));
        }
        state.inbox.extend_from_slice(buf);
        state.pump();
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()>
    {
        Ok(())
    }
}

impl Transport for FakeDevice
{
    fn shutdown(&mut self, how: Shutdown) -> io::Result<()>
    {
        let mut state = self.state();
        state.shutdowns.push(how);
        match state.shutdown_error {
            Some(kind) => Err(io::Error::from(kind)),
            None => Ok(()),
        }
    }
}
