//! # Error Types
//!
//! Error handling for every session operation.
//!
//! We use `thiserror` to derive `Error` and the display messages.
//!
//! ## Error Categories
//!
//! 1. **Local validation**: rejected before a single byte is sent
//!    (`InvalidArgument`, `InvalidAddressRange`, `AccessDenied`,
//!    `TooManyParameters`, `BufferOutOfBounds`)
//! 2. **Transport**: the stream failed or ended (`Connection`)
//! 3. **Protocol**: the device answered with something the protocol does not
//!    allow (`Protocol`)
//!
//! Nothing is retried. After a transport error the session should be closed.
//! After a protocol error the socket is still open, but the device may be in an
//! inconsistent state and usually needs a reconnect.

use geckolink_protocol::ProtocolError;
use thiserror::Error;

use crate::memory::MemoryAccess;
use crate::types::Address;

/// Main error type for session operations
#[derive(Error, Debug)]
pub enum GeckoError
{
    /// A parameter is out of its allowed domain
    ///
    /// Examples:
    /// - a zero-length transfer
    /// - a kernel transfer whose length is not a multiple of 4
    /// - an alignment of zero
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// `[address, address + length)` is not inside any known memory range
    #[error("Address range {address} + 0x{length:x} is not valid")]
    InvalidAddressRange
    {
        /// Start of the rejected range
        address: Address,
        /// Length of the rejected range
        length: usize,
    },

    /// The range exists but does not permit this kind of access
    #[error("{access} access to {address} + 0x{length:x} is not allowed")]
    AccessDenied
    {
        /// Start of the rejected range
        address: Address,
        /// Length of the rejected range
        length: usize,
        /// The access that was attempted
        access: MemoryAccess,
    },

    /// More RPC arguments than the call frame can carry
    #[error("Too many RPC parameters: {0} (maximum is 16)")]
    TooManyParameters(usize),

    /// A local mirror access falls outside the buffer
    #[error("Buffer access at offset 0x{offset:x} + 0x{length:x} exceeds buffer size 0x{size:x}")]
    BufferOutOfBounds
    {
        /// Requested offset
        offset: usize,
        /// Requested length
        length: usize,
        /// Size of the mirror
        size: usize,
    },

    /// The device broke the protocol
    ///
    /// The socket is still open, but the remote state may now be
    /// inconsistent. A reconnect (or a reboot of the remote side) may be
    /// required.
    #[error("Protocol violation: {0}")]
    Protocol(ProtocolError),

    /// The stream failed, timed out, or ended in the middle of a response
    #[error("Connection error: {0}")]
    Connection(#[from] std::io::Error),
}

impl GeckoError
{
    /// True when the device answered outside the protocol.
    #[must_use]
    pub fn is_protocol_violation(&self) -> bool
    {
        matches!(self, GeckoError::Protocol(_))
    }

    /// True when the error was raised before any byte reached the stream.
    #[must_use]
    pub fn is_local(&self) -> bool
    {
        matches!(
            self,
            GeckoError::InvalidArgument(_)
                | GeckoError::InvalidAddressRange { .. }
                | GeckoError::AccessDenied { .. }
                | GeckoError::TooManyParameters(_)
                | GeckoError::BufferOutOfBounds { .. }
        )
    }
}

impl From<ProtocolError> for GeckoError
{
    fn from(err: ProtocolError) -> Self
    {
        match err {
            // Both are caught before anything is sent.
            ProtocolError::TooManyParameters(count) => GeckoError::TooManyParameters(count),
            ProtocolError::SymbolRequestTooLong(len) => {
                GeckoError::InvalidArgument(format!("symbol request of {len} bytes does not fit the length prefix"))
            }
            other => GeckoError::Protocol(other),
        }
    }
}

/// Convenience type alias for `Result<T, GeckoError>`
///
/// ```rust
/// use geckolink_core::error::Result;
/// fn foo() -> Result<()>
/// {
///     Ok(())
/// }
/// ```
pub type Result<T> = std::result::Result<T, GeckoError>;
