//! # Remote Buffers
//!
//! A local mirror of a block of device memory.
//!
//! Edits go to the mirror only and mark it dirty. Nothing reaches the device
//! until [`RemoteBuffer::flush`], which always sends the whole mirror.
//! [`RemoteBuffer::update`] pulls the whole block back and throws away any
//! local edits; [`RemoteBuffer::update_range`] refreshes part of the mirror and
//! leaves the dirty flag alone.
//!
//! Buffers never hold the session. Every operation that talks to the device
//! borrows it for the length of the call.
//!
//! [`AllocatedBuffer`] is a remote buffer that also owns the device allocation
//! behind it.

mod allocated;

pub use allocated::{AllocatedBuffer, AllocatorKind};
use tracing::debug;

use crate::error::{GeckoError, Result};
use crate::session::{Session, Transport};
use crate::types::Address;

/// Device address plus a local mirror of its bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteBuffer
{
    address: Address,
    data: Vec<u8>,
    dirty: bool,
}

impl RemoteBuffer
{
    /// A zero-filled mirror of `size` bytes at `address`, initially clean.
    pub fn new(address: impl Into<Address>, size: usize) -> Self
    {
        Self::from_bytes(address, vec![0; size])
    }

    /// A mirror initialised from `data`, initially clean.
    pub fn from_bytes(address: impl Into<Address>, data: Vec<u8>) -> Self
    {
        Self {
            address: address.into(),
            data,
            dirty: false,
        }
    }

    /// Device address of the first byte.
    #[must_use]
    pub fn address(&self) -> Address
    {
        self.address
    }

    /// Size of the mirror in bytes.
    #[must_use]
    pub fn size(&self) -> usize
    {
        self.data.len()
    }

    /// The mirror's current contents.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8]
    {
        &self.data
    }

    /// Whether the mirror has edits the device has not seen.
    #[must_use]
    pub fn is_dirty(&self) -> bool
    {
        self.dirty
    }

    /// Force the dirty flag on.
    pub fn mark_dirty(&mut self)
    {
        self.dirty = true;
    }

    /// Force the dirty flag off.
    pub fn clear_dirty(&mut self)
    {
        self.dirty = false;
    }

    /// Copy `bytes` into the mirror at `offset` and mark it dirty.
    ///
    /// ## Errors
    ///
    /// `BufferOutOfBounds` if the bytes do not fit. The mirror is unchanged.
    pub fn set_data(&mut self, offset: usize, bytes: &[u8]) -> Result<()>
    {
        let range = self.span(offset, bytes.len())?;
        self.data[range].copy_from_slice(bytes);
        self.dirty = true;
        Ok(())
    }

    /// Copy `out.len()` bytes of the mirror starting at `offset` into `out`.
    ///
    /// ## Errors
    ///
    /// `BufferOutOfBounds` if the span exceeds the mirror.
    pub fn get_data(&self, offset: usize, out: &mut [u8]) -> Result<()>
    {
        let range = self.span(offset, out.len())?;
        out.copy_from_slice(&self.data[range]);
        Ok(())
    }

    /// Fill `size` bytes of the mirror at `offset` with `value` and mark it
    /// dirty.
    ///
    /// ## Errors
    ///
    /// `BufferOutOfBounds` if the span exceeds the mirror.
    pub fn fill(&mut self, offset: usize, value: u8, size: usize) -> Result<()>
    {
        let range = self.span(offset, size)?;
        self.data[range].fill(value);
        self.dirty = true;
        Ok(())
    }

    /// Send the whole mirror to the device and clear the dirty flag.
    ///
    /// ## Errors
    ///
    /// See [`Session::write_memory`]. The flag stays set on failure.
    pub fn flush<T: Transport>(&mut self, session: &mut Session<T>) -> Result<()>
    {
        debug!("Flushing buffer at {} ({} bytes)", self.address, self.data.len());
        session.write_memory(self.address, &self.data)?;
        self.dirty = false;
        Ok(())
    }

    /// Replace the whole mirror with the device's bytes and clear the dirty
    /// flag, discarding local edits.
    ///
    /// ## Errors
    ///
    /// See [`Session::read_memory_into`].
    pub fn update<T: Transport>(&mut self, session: &mut Session<T>) -> Result<()>
    {
        debug!("Updating buffer at {} ({} bytes)", self.address, self.data.len());
        session.read_memory_into(self.address, &mut self.data)?;
        self.dirty = false;
        Ok(())
    }

    /// Refresh `size` bytes of the mirror at `offset` from the same offset on
    /// the device. The dirty flag is left as it was.
    ///
    /// ## Errors
    ///
    /// - `BufferOutOfBounds` if the span exceeds the mirror
    /// - otherwise see [`Session::read_memory_into`]
    pub fn update_range<T: Transport>(&mut self, session: &mut Session<T>, offset: usize, size: usize) -> Result<()>
    {
        let range = self.span(offset, size)?;
        let start = self
            .address
            .checked_offset(offset)
            .ok_or(GeckoError::InvalidAddressRange {
                address: self.address,
                length: offset + size,
            })?;
        debug!("Updating {size} bytes of buffer at {} from {start}", self.address);
        session.read_memory_into(start, &mut self.data[range])
    }

    fn span(&self, offset: usize, length: usize) -> Result<std::ops::Range<usize>>
    {
        match offset.checked_add(length) {
            Some(end) if end <= self.data.len() => Ok(offset..end),
            _ => Err(GeckoError::BufferOutOfBounds {
                offset,
                length,
                size: self.data.len(),
            }),
        }
    }
}
