//! # Allocated Buffers
//!
//! A [`RemoteBuffer`] that owns the device allocation behind it.
//!
//! The handle is released with [`AllocatedBuffer::free`], which consumes it,
//! so a freed buffer cannot be flushed, updated or freed a second time.
//! Freeing needs the session, which `Drop` does not have; dropping a buffer
//! that still owns its allocation only logs the leak.

use std::fmt;
use std::ops::{Deref, DerefMut};

use tracing::{debug, warn};

use super::RemoteBuffer;
use crate::error::Result;
use crate::session::{Session, Transport};
use crate::types::Address;

/// Which device allocator produced a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AllocatorKind
{
    /// `MEMAllocFromDefaultHeapEx` / `MEMFreeToDefaultHeap`
    Heap,
    /// `OSAllocFromSystem` / `OSFreeToSystem`
    System,
}

impl fmt::Display for AllocatorKind
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match self {
            AllocatorKind::Heap => write!(f, "default heap"),
            AllocatorKind::System => write!(f, "system"),
        }
    }
}

/// A device allocation together with its local mirror.
///
/// Dereferences to [`RemoteBuffer`] for every mirror operation.
///
/// ## Example
///
/// ```rust,no_run
/// use geckolink_core::Session;
///
/// let mut session = Session::connect("192.168.1.20", 7331)?;
/// if let Some(mut buffer) = session.core_init().malloc(0x40, 0x20, false)? {
///     buffer.set_data(0, b"hello")?;
///     buffer.flush(&mut session)?;
///     buffer.free(&mut session)?;
/// }
/// # Ok::<(), geckolink_core::GeckoError>(())
/// ```
pub struct AllocatedBuffer
{
    buffer: RemoteBuffer,
    kind: AllocatorKind,
    active: bool,
}

impl AllocatedBuffer
{
    /// Take ownership of an allocation made by `kind`.
    pub fn new(buffer: RemoteBuffer, kind: AllocatorKind) -> Self
    {
        Self {
            buffer,
            kind,
            active: true,
        }
    }

    /// The allocator that owns the device memory.
    #[must_use]
    pub fn kind(&self) -> AllocatorKind
    {
        self.kind
    }

    /// Return the allocation to the allocator that produced it.
    ///
    /// ## Errors
    ///
    /// Any error of the remote free call. The handle is consumed either way;
    /// after a transport error the device-side state is unknown.
    pub fn free<T: Transport>(mut self, session: &mut Session<T>) -> Result<()>
    {
        self.active = false;
        let address = self.buffer.address();
        debug!("Freeing {} bytes at {address} to the {} allocator", self.buffer.size(), self.kind);

        let mut core_init = session.core_init();
        match self.kind {
            AllocatorKind::Heap => core_init.free_heap(address),
            AllocatorKind::System => core_init.free(address),
        }
    }

    /// Give up ownership of the allocation and keep only the mirror.
    ///
    /// The device memory stays allocated.
    #[must_use]
    pub fn leak(mut self) -> RemoteBuffer
    {
        self.active = false;
        std::mem::replace(&mut self.buffer, RemoteBuffer::new(Address::ZERO, 0))
    }
}

impl Deref for AllocatedBuffer
{
    type Target = RemoteBuffer;

    fn deref(&self) -> &Self::Target
    {
        &self.buffer
    }
}

impl DerefMut for AllocatedBuffer
{
    fn deref_mut(&mut self) -> &mut Self::Target
    {
        &mut self.buffer
    }
}

impl fmt::Debug for AllocatedBuffer
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.debug_struct("AllocatedBuffer")
            .field("address", &self.buffer.address())
            .field("size", &self.buffer.size())
            .field("dirty", &self.buffer.is_dirty())
            .field("kind", &self.kind)
            .finish()
    }
}

impl Drop for AllocatedBuffer
{
    fn drop(&mut self)
    {
        if self.active {
            warn!(
                "Leaked {} bytes at {} from the {} allocator",
                self.buffer.size(),
                self.buffer.address(),
                self.kind
            );
        }
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_deref_reaches_mirror()
    {
        let mut buffer = AllocatedBuffer::new(RemoteBuffer::new(0x1000_0000u32, 4), AllocatorKind::System);
        buffer.set_data(0, &[1, 2]).unwrap();
        assert!(buffer.is_dirty());
        assert_eq!(buffer.size(), 4);
        assert_eq!(buffer.kind(), AllocatorKind::System);
        drop(buffer.leak());
    }

    #[test]
    fn test_leak_keeps_mirror()
    {
        let buffer = AllocatedBuffer::new(
            RemoteBuffer::from_bytes(0x1000_0040u32, vec![9, 8, 7]),
            AllocatorKind::Heap,
        );
        let plain = buffer.leak();
        assert_eq!(plain.address(), Address::new(0x1000_0040));
        assert_eq!(plain.as_bytes(), &[9, 8, 7]);
    }
}
