//! # Session
//!
//! One connection to the Gecko handler and every command it understands.
//!
//! A session is a strict request/response machine:
//!
//! ```text
//! idle -> send command (+ args) -> [await status] -> [transfer payload] -> idle
//! ```
//!
//! Each public method performs complete round trips before it returns, so there
//! is never more than one request outstanding. Memory operations are checked
//! against the address map in [`crate::memory`] before anything is sent; a
//! rejected range never reaches the device.
//!
//! ## Thread Safety
//!
//! A session is single-threaded. For shared use, [`Session::into_shared`]
//! puts the whole session behind one mutex. Do not add finer-grained locking:
//! a round trip must never interleave with another.
//!
//! ## Example
//!
//! ```rust,no_run
//! use geckolink_core::Session;
//!
//! let mut session = Session::connect("192.168.1.20", 7331)?;
//! session.poke(0x1000_0000u32, 0xDEAD_BEEFu32)?;
//! assert_eq!(session.peek_u32(0x1000_0000u32)?, 0xDEAD_BEEF);
//! session.close()?;
//! # Ok::<(), geckolink_core::GeckoError>(())
//! ```

use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream};
use std::sync::{Arc, Mutex};

use geckolink_protocol::{
    Command, Console, ProtocolError, RpcCall, Status, SymbolRequest, WireCodec, KERNEL_CHUNK_SIZE, MEMORY_CHUNK_SIZE,
};
use tracing::{debug, info, trace, warn};

use crate::config::{ConnectionConfig, SessionConfig};
use crate::coreinit::CoreInit;
use crate::error::Result;
use crate::memory::{self, MemoryAccess};
use crate::symbols::{ExportedSymbol, SymbolCache, SymbolKey, COREINIT};
use crate::types::{Address, PokeValue};

/// A duplex byte stream a session can run over.
///
/// `shutdown` is called for each half of the stream when the session closes.
/// The default does nothing, which suits in-memory streams.
pub trait Transport: Read + Write
{
    /// Shut down the read half, the write half, or both.
    ///
    /// ## Errors
    ///
    /// Any error from the underlying stream.
    fn shutdown(&mut self, how: Shutdown) -> io::Result<()>
    {
        let _ = how;
        Ok(())
    }
}

impl Transport for TcpStream
{
    fn shutdown(&mut self, how: Shutdown) -> io::Result<()>
    {
        TcpStream::shutdown(self, how)
    }
}

/// A session behind a single exclusive-access guard.
pub type SharedSession<T = TcpStream> = Arc<Mutex<Session<T>>>;

/// Connection to a Gecko handler.
pub struct Session<T: Transport = TcpStream>
{
    codec: WireCodec<T>,
    symbols: SymbolCache,
    config: SessionConfig,
    closed: bool,
}

impl Session<TcpStream>
{
    /// Connect with default settings.
    ///
    /// ## Errors
    ///
    /// `Connection` if the host cannot be resolved or reached.
    pub fn connect(host: &str, port: u16) -> Result<Self>
    {
        Self::connect_with(&ConnectionConfig::new(host).with_port(port))
    }

    /// Connect using a full configuration.
    ///
    /// Tries every resolved address in turn. Sets `TCP_NODELAY`, since every
    /// request is small and waits for an answer.
    ///
    /// ## Errors
    ///
    /// `Connection` if no resolved address accepts the connection or the
    /// socket options cannot be applied.
    pub fn connect_with(config: &ConnectionConfig) -> Result<Self>
    {
        let endpoint = config.endpoint();
        info!("Connecting to {endpoint}");

        let mut last_error = None;
        let mut connected = None;
        for addr in config.socket_addrs()? {
            let attempt = match config.connect_timeout {
                Some(timeout) => TcpStream::connect_timeout(&addr, timeout),
                None => TcpStream::connect(addr),
            };
            match attempt {
                Ok(stream) => {
                    connected = Some(stream);
                    break;
                }
                Err(err) => {
                    debug!("Connecting to {addr} failed: {err}");
                    last_error = Some(err);
                }
            }
        }
        let stream = match connected {
            Some(stream) => stream,
            None => {
                return Err(last_error
                    .unwrap_or_else(|| {
                        io::Error::new(io::ErrorKind::NotFound, format!("{endpoint} did not resolve to any address"))
                    })
                    .into());
            }
        };

        stream.set_nodelay(true)?;
        stream.set_read_timeout(config.io_timeout)?;
        stream.set_write_timeout(config.io_timeout)?;
        info!("Connected to {endpoint}");

        Ok(Session::with_config(stream, config.session))
    }
}

impl<T: Transport> Session<T>
{
    /// Run a session over an already connected transport.
    pub fn new(transport: T) -> Self
    {
        Self::with_config(transport, SessionConfig::default())
    }

    /// Run a session over an already connected transport with explicit settings.
    pub fn with_config(transport: T, config: SessionConfig) -> Self
    {
        Self {
            codec: WireCodec::new(transport),
            symbols: SymbolCache::new(config.symbol_cache),
            config,
            closed: false,
        }
    }

    /// Settings this session runs with.
    pub fn config(&self) -> &SessionConfig
    {
        &self.config
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T
    {
        self.codec.get_ref()
    }

    /// Mutable access to the underlying transport.
    ///
    /// Writing to it directly desynchronises the protocol.
    pub fn transport_mut(&mut self) -> &mut T
    {
        self.codec.get_mut()
    }

    /// Put the session behind one mutex for use from several threads.
    pub fn into_shared(self) -> SharedSession<T>
    {
        Arc::new(Mutex::new(self))
    }

    /// The remote allocator facade.
    pub fn core_init(&mut self) -> CoreInit<'_, T>
    {
        CoreInit::new(self)
    }

    // ---------------------------------------------------------------------
    // Pokes
    // ---------------------------------------------------------------------

    /// Write a fixed-width value.
    ///
    /// 8/16/32-bit values and `f32` take one poke command. 64-bit values and
    /// `f64` are split into two 32-bit pokes, high word first. Floats are sent
    /// as their IEEE-754 bit patterns. The handler does not answer pokes.
    ///
    /// ## Errors
    ///
    /// - `InvalidAddressRange` / `AccessDenied` if the value's bytes are not
    ///   writable
    /// - `Connection` on stream failure
    pub fn poke(&mut self, address: impl Into<Address>, value: impl Into<PokeValue>) -> Result<()>
    {
        let address = address.into();
        let value = value.into();
        debug!("Poking {address} with {value:?}");
        memory::check_access(address, value.width(), MemoryAccess::Write)?;

        match value {
            PokeValue::U8(v) => self.stage_poke(Command::MemoryPoke8, address, u32::from(v)),
            PokeValue::U16(v) => self.stage_poke(Command::MemoryPoke16, address, u32::from(v)),
            PokeValue::U32(v) => self.stage_poke(Command::MemoryPoke32, address, v),
            PokeValue::F32(v) => self.stage_poke(Command::MemoryPoke32, address, v.to_bits()),
            PokeValue::U64(v) => self.stage_poke64(address, v),
            PokeValue::F64(v) => self.stage_poke64(address, v.to_bits()),
        }
        self.codec.flush()?;
        Ok(())
    }

    /// Write a string through the chunked write path, optionally followed by
    /// a NUL byte.
    ///
    /// ## Errors
    ///
    /// See [`Session::write_memory`].
    pub fn poke_str(&mut self, address: impl Into<Address>, value: &str, null_terminated: bool) -> Result<()>
    {
        let mut bytes = value.as_bytes().to_vec();
        if null_terminated {
            bytes.push(0);
        }
        self.write_memory(address, &bytes)
    }

    // The handler always reads an 8-byte (address, word) argument block and
    // takes the low byte or half-word for the narrow pokes.
    fn stage_poke(&mut self, command: Command, address: Address, word: u32)
    {
        self.codec.write_command(command);
        self.codec.write_u32(address.value());
        self.codec.write_u32(word);
    }

    fn stage_poke64(&mut self, address: Address, value: u64)
    {
        let [high, low] = split_u64(value);
        self.stage_poke(Command::MemoryPoke32, address, high);
        self.stage_poke(Command::MemoryPoke32, address + 4, low);
    }

    // ---------------------------------------------------------------------
    // Peeks
    // ---------------------------------------------------------------------

    /// Read one byte.
    ///
    /// ## Errors
    ///
    /// See [`Session::read_memory`].
    pub fn peek_u8(&mut self, address: impl Into<Address>) -> Result<u8>
    {
        let [byte] = self.peek_array(address.into())?;
        Ok(byte)
    }

    /// Read a big-endian `u16`.
    ///
    /// ## Errors
    ///
    /// See [`Session::read_memory`].
    pub fn peek_u16(&mut self, address: impl Into<Address>) -> Result<u16>
    {
        self.peek_array(address.into()).map(u16::from_be_bytes)
    }

    /// Read a big-endian `u32`.
    ///
    /// ## Errors
    ///
    /// See [`Session::read_memory`].
    pub fn peek_u32(&mut self, address: impl Into<Address>) -> Result<u32>
    {
        self.peek_array(address.into()).map(u32::from_be_bytes)
    }

    /// Read a big-endian `u64`.
    ///
    /// ## Errors
    ///
    /// See [`Session::read_memory`].
    pub fn peek_u64(&mut self, address: impl Into<Address>) -> Result<u64>
    {
        self.peek_array(address.into()).map(u64::from_be_bytes)
    }

    /// Read an `f32` stored as its IEEE-754 bit pattern.
    ///
    /// ## Errors
    ///
    /// See [`Session::read_memory`].
    pub fn peek_f32(&mut self, address: impl Into<Address>) -> Result<f32>
    {
        self.peek_u32(address).map(f32::from_bits)
    }

    /// Read an `f64` stored as its IEEE-754 bit pattern.
    ///
    /// ## Errors
    ///
    /// See [`Session::read_memory`].
    pub fn peek_f64(&mut self, address: impl Into<Address>) -> Result<f64>
    {
        self.peek_u64(address).map(f64::from_bits)
    }

    fn peek_array<const N: usize>(&mut self, address: Address) -> Result<[u8; N]>
    {
        let mut buf = [0u8; N];
        self.read_memory_into(address, &mut buf)?;
        Ok(buf)
    }

    // ---------------------------------------------------------------------
    // Chunked transfer
    // ---------------------------------------------------------------------

    /// Read `length` bytes.
    ///
    /// ## Errors
    ///
    /// See [`Session::read_memory_into`].
    pub fn read_memory(&mut self, address: impl Into<Address>, length: usize) -> Result<Vec<u8>>
    {
        let mut buf = vec![0u8; length];
        self.read_memory_into(address, &mut buf)?;
        Ok(buf)
    }

    /// Fill `buf` from device memory.
    ///
    /// The range is fetched in rounds of at most 0x400 bytes. Each round sends
    /// `MemoryRead` with `[start, end)` and reads a status byte: `OK` is
    /// followed by the bytes, `OK_EMPTY` means the round is all zero and no
    /// bytes follow.
    ///
    /// ## Errors
    ///
    /// - `InvalidArgument` for an empty buffer
    /// - `InvalidAddressRange` / `AccessDenied` if the range is not readable
    /// - `Protocol` if a round answers with any other status
    /// - `Connection` on stream failure
    pub fn read_memory_into(&mut self, address: impl Into<Address>, buf: &mut [u8]) -> Result<()>
    {
        let address = address.into();
        memory::check_transfer(address, buf.len(), MemoryAccess::Read)?;
        debug!("Reading memory at {address}, {} bytes", buf.len());

        let mut cursor = address;
        for chunk in buf.chunks_mut(MEMORY_CHUNK_SIZE) {
            let len = wire_len(chunk.len());
            trace!("Reading chunk {cursor} + 0x{len:x}");
            self.codec.write_command(Command::MemoryRead);
            self.codec.write_u32(cursor.value());
            self.codec.write_u32(cursor.value() + len);

            match self.read_status()? {
                Status::Ok => self.codec.read_exact(chunk)?,
                Status::OkEmpty => chunk.fill(0),
                other => {
                    return Err(ProtocolError::UnexpectedStatus {
                        operation: "memory read",
                        expected: Status::Ok,
                        actual: other,
                    }
                    .into());
                }
            }
            cursor = cursor + len;
        }
        Ok(())
    }

    /// Write `data` to device memory.
    ///
    /// The data is sent in rounds of at most 0x400 bytes, each acknowledged
    /// with `GC_ACK`. A failed round aborts the call; rounds already
    /// acknowledged stay written.
    ///
    /// ## Errors
    ///
    /// - `InvalidArgument` for empty data
    /// - `InvalidAddressRange` / `AccessDenied` if the range is not writable
    /// - `Protocol` if a round is not acknowledged
    /// - `Connection` on stream failure
    pub fn write_memory(&mut self, address: impl Into<Address>, data: &[u8]) -> Result<()>
    {
        let address = address.into();
        memory::check_transfer(address, data.len(), MemoryAccess::Write)?;
        debug!("Writing memory at {address}, {} bytes", data.len());

        let mut cursor = address;
        for chunk in data.chunks(MEMORY_CHUNK_SIZE) {
            let len = wire_len(chunk.len());
            trace!("Writing chunk {cursor} + 0x{len:x}");
            self.codec.write_command(Command::MemoryWrite);
            self.codec.write_u32(cursor.value());
            self.codec.write_u32(cursor.value() + len);
            self.codec.write_bytes(chunk);

            let status = self.read_status()?;
            if status != Status::GcAck {
                return Err(ProtocolError::UnexpectedStatus {
                    operation: "memory write",
                    expected: Status::GcAck,
                    actual: status,
                }
                .into());
            }
            cursor = cursor + len;
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Kernel memory
    // ---------------------------------------------------------------------

    /// Write whole 32-bit words through the kernel, one word per command.
    ///
    /// Kernel access is only allowed in the read/write windows.
    ///
    /// ## Errors
    ///
    /// - `InvalidArgument` unless the length is a positive multiple of 4
    /// - `InvalidAddressRange` / `AccessDenied` outside the read/write windows
    /// - `Connection` on stream failure
    pub fn write_kernel_memory(&mut self, address: impl Into<Address>, data: &[u8]) -> Result<()>
    {
        let address = address.into();
        memory::check_kernel_transfer(address, data.len(), MemoryAccess::Write)?;
        debug!("Writing kernel memory at {address}, {} bytes", data.len());

        let mut cursor = address;
        for word in data.chunks_exact(KERNEL_CHUNK_SIZE) {
            self.codec.write_command(Command::MemoryKernelWrite);
            self.codec.write_u32(cursor.value());
            self.codec.write_bytes(word);
            self.codec.flush()?;
            cursor = cursor + wire_len(KERNEL_CHUNK_SIZE);
        }
        Ok(())
    }

    /// Read whole 32-bit words through the kernel, one word per command.
    ///
    /// ## Errors
    ///
    /// See [`Session::write_kernel_memory`].
    pub fn read_kernel_memory(&mut self, address: impl Into<Address>, length: usize) -> Result<Vec<u8>>
    {
        let address = address.into();
        memory::check_kernel_transfer(address, length, MemoryAccess::Write)?;
        debug!("Reading kernel memory at {address}, {length} bytes");

        let mut output = vec![0u8; length];
        let mut cursor = address;
        for word in output.chunks_exact_mut(KERNEL_CHUNK_SIZE) {
            self.fetch_kernel_word(cursor, word)?;
            cursor = cursor + wire_len(KERNEL_CHUNK_SIZE);
        }
        Ok(output)
    }

    /// Read a single 32-bit word through the kernel.
    ///
    /// ## Errors
    ///
    /// See [`Session::write_kernel_memory`].
    pub fn read_kernel_word(&mut self, address: impl Into<Address>) -> Result<u32>
    {
        let address = address.into();
        memory::check_kernel_transfer(address, KERNEL_CHUNK_SIZE, MemoryAccess::Write)?;
        let mut word = [0u8; KERNEL_CHUNK_SIZE];
        self.fetch_kernel_word(address, &mut word)?;
        Ok(u32::from_be_bytes(word))
    }

    fn fetch_kernel_word(&mut self, address: Address, word: &mut [u8]) -> Result<()>
    {
        self.codec.write_command(Command::MemoryKernelRead);
        self.codec.write_u32(address.value());
        self.codec.read_exact(word)?;
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Remote procedure calls and symbols
    // ---------------------------------------------------------------------

    /// Call a resolved function with up to 16 integer arguments.
    ///
    /// Arguments are zero-padded to 8 or 16 slots. Returns the callee's
    /// 64-bit return value as sent by the handler.
    ///
    /// ## Errors
    ///
    /// - `TooManyParameters` for more than 16 arguments (nothing is sent)
    /// - `Connection` on stream failure
    pub fn call_remote(&mut self, symbol: &ExportedSymbol, params: &[u32]) -> Result<u64>
    {
        debug!("Calling {} from {}", symbol.name(), symbol.module());
        self.call_address(symbol.address(), params)
    }

    /// Call the function at `address` directly.
    ///
    /// ## Errors
    ///
    /// See [`Session::call_remote`].
    pub fn call_address(&mut self, address: impl Into<Address>, params: &[u32]) -> Result<u64>
    {
        let call = RpcCall::new(address.into().value(), params)?;
        trace!("RPC frame: {:?} with {} slots", call.opcode(self.config.rpc_opcodes), call.slot_count());
        call.encode(&mut self.codec, self.config.rpc_opcodes);
        Ok(self.codec.read_u64()?)
    }

    /// Resolve an exported symbol.
    ///
    /// With the cache enabled, a previous lookup with the same module, name and
    /// flags is answered locally. Otherwise the handler is asked for the
    /// address. For pointer symbols that address is dereferenced with one more
    /// 4-byte read to give the final address.
    ///
    /// ## Errors
    ///
    /// - `InvalidArgument` if the names do not fit the lookup payload
    /// - for pointer symbols, any error of [`Session::peek_u32`]
    /// - `Connection` on stream failure
    pub fn get_symbol(&mut self, module: &str, name: &str, is_pointer: bool, is_data: bool) -> Result<ExportedSymbol>
    {
        debug!("Getting symbol {name} from {module}");
        let key = SymbolKey::new(name, is_pointer, is_data);
        if let Some(symbol) = self.symbols.get(module, &key) {
            trace!("Symbol cache hit for {module}!{name}");
            return Ok(symbol.clone());
        }

        SymbolRequest::new(module, name, is_data).encode(&mut self.codec)?;
        let mut address = Address::from(self.codec.read_u32()?);
        if is_pointer {
            address = Address::from(self.peek_u32(address)?);
        }

        let symbol = ExportedSymbol::new(address, module, name);
        self.symbols.insert(key, symbol.clone());
        Ok(symbol)
    }

    /// Resolve a function symbol and call it.
    ///
    /// ## Errors
    ///
    /// See [`Session::get_symbol`] and [`Session::call_remote`].
    pub fn get_and_call_symbol(&mut self, module: &str, name: &str, params: &[u32]) -> Result<u64>
    {
        let symbol = self.get_symbol(module, name, false, false)?;
        self.call_remote(&symbol, params)
    }

    /// Resolve a function exported by `coreinit.rpl` and call it.
    ///
    /// ## Errors
    ///
    /// See [`Session::get_and_call_symbol`].
    pub fn call_coreinit(&mut self, name: &str, params: &[u32]) -> Result<u64>
    {
        self.get_and_call_symbol(COREINIT, name, params)
    }

    /// Whether resolved symbols are cached.
    pub fn is_symbol_cache_enabled(&self) -> bool
    {
        self.symbols.is_enabled()
    }

    /// Enable or disable the symbol cache. Disabling empties it immediately.
    pub fn set_symbol_cache_enabled(&mut self, enabled: bool)
    {
        self.symbols.set_enabled(enabled);
        self.config.symbol_cache = enabled;
    }

    /// Forget every cached symbol.
    pub fn clear_symbol_cache(&mut self)
    {
        self.symbols.clear();
    }

    /// Number of cached symbols.
    pub fn cached_symbol_count(&self) -> usize
    {
        self.symbols.len()
    }

    // ---------------------------------------------------------------------
    // Status and queries
    // ---------------------------------------------------------------------

    /// Read one status byte from the stream.
    ///
    /// Low level: only meaningful right after a command that is answered with
    /// a status.
    ///
    /// ## Errors
    ///
    /// - `Protocol` for a byte outside the status vocabulary
    /// - `Connection` on stream failure
    pub fn read_status(&mut self) -> Result<Status>
    {
        let byte = self.codec.read_u8()?;
        Ok(Status::try_from(byte)?)
    }

    /// Ask the handler for its status.
    ///
    /// ## Errors
    ///
    /// See [`Session::read_status`].
    pub fn gecko_status(&mut self) -> Result<Status>
    {
        debug!("Getting gecko status");
        self.codec.write_command(Command::GetStatus);
        self.read_status()
    }

    /// Ask which console the handler runs on.
    ///
    /// ## Errors
    ///
    /// `Connection` on stream failure.
    pub fn version(&mut self) -> Result<Console>
    {
        debug!("Getting version");
        self.codec.write_command(Command::GetVersion);
        Ok(Console::from(self.codec.read_u8()?))
    }

    /// Ask for the console's OS version.
    ///
    /// ## Errors
    ///
    /// `Connection` on stream failure.
    pub fn os_version(&mut self) -> Result<u32>
    {
        debug!("Getting OS version");
        self.codec.write_command(Command::GetOsVersion);
        Ok(self.codec.read_u32()?)
    }

    /// Search `[address, address + length)` for a 32-bit value.
    ///
    /// Returns whatever address the handler reports; by handler convention
    /// zero means not found.
    ///
    /// ## Errors
    ///
    /// - `InvalidArgument` / `InvalidAddressRange` / `AccessDenied` if the
    ///   range is empty or not readable
    /// - `Connection` on stream failure
    pub fn memory_search(&mut self, address: impl Into<Address>, value: u32, length: u32) -> Result<u32>
    {
        let address = address.into();
        memory::check_transfer(address, length as usize, MemoryAccess::Read)?;
        debug!("Searching {address} + 0x{length:x} for 0x{value:08x}");
        self.codec.write_command(Command::MemorySearch32);
        self.codec.write_u32s(&[address.value(), value, length]);
        Ok(self.codec.read_u32()?)
    }

    /// Send the failure handshake byte, which the handler ignores.
    ///
    /// ## Errors
    ///
    /// `Connection` on stream failure.
    pub fn gc_fail(&mut self) -> Result<()>
    {
        debug!("Sending GCFAIL");
        self.codec.write_command(Command::GcFail);
        self.codec.flush()?;
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Shutdown
    // ---------------------------------------------------------------------

    /// Close the session.
    ///
    /// Drops cached state, then shuts down the input half and the output half
    /// of the stream; the stream itself is released when the session is
    /// dropped at the end of this call. Every step is attempted even if an
    /// earlier one fails, and the first failure is returned.
    ///
    /// ## Errors
    ///
    /// `Connection` with the first error encountered.
    pub fn close(mut self) -> Result<()>
    {
        self.release()
    }

    fn release(&mut self) -> Result<()>
    {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        debug!("Cleaning up session");

        self.symbols.clear();
        let mut first_error: Option<io::Error> = None;

        record(&mut first_error, self.codec.flush());
        record(&mut first_error, self.codec.get_mut().shutdown(Shutdown::Read));
        record(&mut first_error, self.codec.get_mut().shutdown(Shutdown::Write));

        match first_error {
            Some(err) => Err(err.into()),
            None => Ok(()),
        }
    }
}

impl<T: Transport> Drop for Session<T>
{
    fn drop(&mut self)
    {
        if let Err(err) = self.release() {
            warn!("Failed to close session cleanly: {err}");
        }
    }
}

impl<T: Transport> std::fmt::Debug for Session<T>
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {
        f.debug_struct("Session")
            .field("config", &self.config)
            .field("cached_symbols", &self.symbols.len())
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

// A peer that already went away leaves nothing to shut down.
fn record(first_error: &mut Option<io::Error>, result: io::Result<()>)
{
    if let Err(err) = result {
        if err.kind() == io::ErrorKind::NotConnected {
            trace!("Stream already disconnected during close");
            return;
        }
        warn!("Error while closing session: {err}");
        if first_error.is_none() {
            *first_error = Some(err);
        }
    }
}

// Chunk lengths are bounded by MEMORY_CHUNK_SIZE.
#[allow(clippy::cast_possible_truncation)]
fn wire_len(len: usize) -> u32
{
    len as u32
}

#[allow(clippy::cast_possible_truncation)]
fn split_u64(value: u64) -> [u32; 2]
{
    [(value >> 32) as u32, value as u32]
}
