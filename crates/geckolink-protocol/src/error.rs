//! Protocol-level failures.

use thiserror::Error;

use crate::status::Status;

/// The remote side answered with something the protocol does not allow.
///
/// These are distinct from transport failures: the socket is still alive, but
/// the device and the client may now disagree about where a frame begins.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolError
{
    /// A status byte outside the known vocabulary.
    #[error("unknown status byte 0x{0:02x}")]
    UnknownStatus(u8),

    /// A known status that is not valid at this point of the exchange.
    #[error("unexpected status during {operation}: expected {expected}, got {actual}")]
    UnexpectedStatus
    {
        /// Round that was in progress
        operation: &'static str,
        /// Status the round requires
        expected: Status,
        /// Status the device sent
        actual: Status,
    },

    /// More RPC arguments than the big call frame has slots for.
    #[error("too many RPC parameters: {0} (maximum is 16)")]
    TooManyParameters(usize),

    /// Symbol lookup payload does not fit the one-byte length prefix.
    #[error("symbol request is {0} bytes, the length prefix allows at most 255")]
    SymbolRequestTooLong(usize),
}
