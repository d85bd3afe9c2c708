//! # Remote Allocator
//!
//! Memory management on the console through `coreinit.rpl` exports.
//!
//! [`CoreInit`] borrows a session for as long as it is used; get one from
//! [`Session::core_init`]. Every method resolves its export (through the
//! session's symbol cache when it is enabled) and calls it.
//!
//! | method | export | pointer | data |
//! |--------|--------|---------|------|
//! | [`CoreInit::malloc_heap`] | `MEMAllocFromDefaultHeapEx` | yes | yes |
//! | [`CoreInit::free_heap`] | `MEMFreeToDefaultHeap` | yes | yes |
//! | [`CoreInit::malloc`] | `OSAllocFromSystem` | no | no |
//! | [`CoreInit::free`] | `OSFreeToSystem` | no | no |
//! | [`CoreInit::memset`] | `memset` | no | no |
//!
//! The heap functions are exported as function pointers, so their lookup
//! dereferences the export once to find the real entry point.

use tracing::{debug, warn};

use crate::buffer::{AllocatedBuffer, AllocatorKind, RemoteBuffer};
use crate::error::{GeckoError, Result};
use crate::memory::{self, MemoryAccess};
use crate::session::{Session, Transport};
use crate::symbols::COREINIT;
use crate::types::Address;

const HEAP_ALLOC: &str = "MEMAllocFromDefaultHeapEx";
const HEAP_FREE: &str = "MEMFreeToDefaultHeap";
const SYSTEM_ALLOC: &str = "OSAllocFromSystem";
const SYSTEM_FREE: &str = "OSFreeToSystem";
const MEMSET: &str = "memset";

/// Alignment used for string buffers.
pub const STRING_ALIGNMENT: u32 = 0x20;

/// Round `value` up past the next multiple of `alignment`.
///
/// Computes `value + alignment - value % alignment`, so a value that is
/// already aligned still moves up by a full `alignment`. The result is always
/// strictly greater than `value` and at most `value + alignment`.
///
/// ## Errors
///
/// `InvalidArgument` for a zero alignment or when the result does not fit in
/// 32 bits.
pub fn align(value: u32, alignment: u32) -> Result<u32>
{
    if alignment == 0 {
        return Err(GeckoError::InvalidArgument("alignment must be greater than 0".to_string()));
    }
    value
        .checked_add(alignment - value % alignment)
        .ok_or_else(|| GeckoError::InvalidArgument(format!("aligning 0x{value:x} to 0x{alignment:x} overflows")))
}

/// Allocator facade over a borrowed session.
pub struct CoreInit<'a, T: Transport>
{
    session: &'a mut Session<T>,
}

impl<'a, T: Transport> CoreInit<'a, T>
{
    /// Borrow `session` for allocator calls.
    pub fn new(session: &'a mut Session<T>) -> Self
    {
        Self { session }
    }

    /// Allocate `size` bytes from the default heap.
    ///
    /// Returns `Ok(None)` if the allocator returns a null pointer. With
    /// `fetch` the mirror is read from the device and starts clean; otherwise
    /// it starts zeroed and dirty, so the next flush overwrites whatever the
    /// device memory held.
    ///
    /// ## Errors
    ///
    /// - `InvalidArgument` for a zero size
    /// - any error of the symbol lookup, the call or the fetch
    pub fn malloc_heap(&mut self, size: u32, alignment: u32, fetch: bool) -> Result<Option<AllocatedBuffer>>
    {
        self.allocate(AllocatorKind::Heap, size, alignment, fetch)
    }

    /// Return a default-heap allocation.
    ///
    /// Prefer [`AllocatedBuffer::free`], which picks the right allocator.
    ///
    /// ## Errors
    ///
    /// Any error of the symbol lookup or the call.
    pub fn free_heap(&mut self, address: impl Into<Address>) -> Result<()>
    {
        let address = address.into();
        debug!("Freeing {address} to the default heap");
        let symbol = self.session.get_symbol(COREINIT, HEAP_FREE, true, true)?;
        self.session.call_remote(&symbol, &[address.value()])?;
        Ok(())
    }

    /// Allocate `size` bytes from the system allocator.
    ///
    /// Same contract as [`CoreInit::malloc_heap`].
    ///
    /// ## Errors
    ///
    /// See [`CoreInit::malloc_heap`].
    pub fn malloc(&mut self, size: u32, alignment: u32, fetch: bool) -> Result<Option<AllocatedBuffer>>
    {
        self.allocate(AllocatorKind::System, size, alignment, fetch)
    }

    /// Return a system allocation.
    ///
    /// Prefer [`AllocatedBuffer::free`], which picks the right allocator.
    ///
    /// ## Errors
    ///
    /// Any error of the symbol lookup or the call.
    pub fn free(&mut self, address: impl Into<Address>) -> Result<()>
    {
        let address = address.into();
        debug!("Freeing {address} to the system allocator");
        self.session.call_coreinit(SYSTEM_FREE, &[address.value()])?;
        Ok(())
    }

    /// Fill `size` bytes of device memory at `address` with `value`.
    ///
    /// ## Errors
    ///
    /// - `InvalidArgument` / `InvalidAddressRange` / `AccessDenied` if the
    ///   range is empty or not writable
    /// - any error of the symbol lookup or the call
    pub fn memset(&mut self, address: impl Into<Address>, value: u8, size: u32) -> Result<()>
    {
        let address = address.into();
        memory::check_transfer(address, size as usize, MemoryAccess::Write)?;
        debug!("Setting {size} bytes at {address} to 0x{value:02x}");
        self.session.call_coreinit(MEMSET, &[address.value(), u32::from(value), size])?;
        Ok(())
    }

    /// Fill part of a buffer with `value`, both in the mirror and on the
    /// device, then clear the dirty flag.
    ///
    /// Clearing the flag also drops the record of any earlier unflushed edits
    /// elsewhere in the mirror.
    ///
    /// ## Errors
    ///
    /// - `BufferOutOfBounds` if the span exceeds the mirror (nothing is sent)
    /// - see [`CoreInit::memset`]
    pub fn memset_buffer(&mut self, buffer: &mut RemoteBuffer, offset: usize, value: u8, size: usize) -> Result<()>
    {
        buffer.fill(offset, value, size)?;
        let start = buffer
            .address()
            .checked_offset(offset)
            .ok_or(GeckoError::InvalidAddressRange {
                address: buffer.address(),
                length: offset + size,
            })?;
        let size = u32::try_from(size)
            .map_err(|_| GeckoError::InvalidArgument(format!("memset size 0x{size:x} exceeds 32 bits")))?;
        self.memset(start, value, size)?;
        buffer.clear_dirty();
        Ok(())
    }

    /// Allocate a zeroed, NUL-terminated UTF-8 copy of `text` on the device.
    ///
    /// The buffer holds `align(text.len() + 1, 0x20)` bytes from the system
    /// allocator at 0x20 alignment and is cleared remotely before the text is
    /// written into the mirror. With `flush` the text is sent straight away;
    /// otherwise the buffer is left dirty.
    ///
    /// If anything fails after the allocation, the allocation is freed again
    /// before the error is returned.
    ///
    /// ## Errors
    ///
    /// - `InvalidArgument` if the text is too long for the device
    /// - see [`CoreInit::malloc`], [`CoreInit::memset_buffer`] and
    ///   [`RemoteBuffer::flush`]
    pub fn create_string(&mut self, text: &str, flush: bool) -> Result<Option<AllocatedBuffer>>
    {
        let length = u32::try_from(text.len())
            .map_err(|_| GeckoError::InvalidArgument(format!("string of {} bytes is too long", text.len())))?;
        let size = align(
            length
                .checked_add(1)
                .ok_or_else(|| GeckoError::InvalidArgument("string is too long".to_string()))?,
            STRING_ALIGNMENT,
        )?;
        debug!("Creating string of {length} bytes in a 0x{size:x} byte buffer");

        let Some(mut buffer) = self.malloc(size, STRING_ALIGNMENT, false)? else {
            return Ok(None);
        };

        if let Err(err) = self.write_string(&mut buffer, text, flush) {
            if let Err(free_err) = buffer.free(self.session) {
                warn!("Failed to free string buffer after error: {free_err}");
            }
            return Err(err);
        }
        Ok(Some(buffer))
    }

    fn write_string(&mut self, buffer: &mut AllocatedBuffer, text: &str, flush: bool) -> Result<()>
    {
        let size = buffer.size();
        self.memset_buffer(buffer, 0, 0, size)?;
        buffer.set_data(0, text.as_bytes())?;
        if flush {
            buffer.flush(self.session)?;
        }
        Ok(())
    }

    fn allocate(&mut self, kind: AllocatorKind, size: u32, alignment: u32, fetch: bool) -> Result<Option<AllocatedBuffer>>
    {
        if size == 0 {
            return Err(GeckoError::InvalidArgument("allocation size must be greater than 0".to_string()));
        }
        debug!("Allocating 0x{size:x} bytes aligned to 0x{alignment:x} from the {kind} allocator");

        let returned = match kind {
            AllocatorKind::Heap => {
                let symbol = self.session.get_symbol(COREINIT, HEAP_ALLOC, true, true)?;
                self.session.call_remote(&symbol, &[size, alignment])?
            }
            AllocatorKind::System => self.session.call_coreinit(SYSTEM_ALLOC, &[size, alignment])?,
        };

        let address = Address::new(low_word(returned));
        if address.is_null() {
            debug!("The {kind} allocator returned null");
            return Ok(None);
        }

        let mut buffer = RemoteBuffer::new(address, size as usize);
        if fetch {
            buffer.update(self.session)?;
        } else {
            buffer.mark_dirty();
        }
        Ok(Some(AllocatedBuffer::new(buffer, kind)))
    }
}

// Pointers come back in the low half of the 64-bit return value.
#[allow(clippy::cast_possible_truncation)]
fn low_word(value: u64) -> u32
{
    value as u32
}
