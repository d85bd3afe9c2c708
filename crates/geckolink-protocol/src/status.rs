//! # Status and Console codes
//!
//! Single-byte values the handler sends back.

use std::fmt;

use crate::error::ProtocolError;

/// Outcome code accompanying status-bearing rounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status
{
    /// Handler is running (answer to `GetStatus`)
    Running,
    /// Request accepted; a payload follows for reads
    Ok,
    /// Read region is entirely zero; no payload follows
    OkEmpty,
    /// Upload acknowledged
    GcAck,
}

impl Status
{
    /// The byte used on the wire.
    #[must_use]
    pub const fn byte(self) -> u8
    {
        match self {
            Status::Running => 0x01,
            Status::Ok => 0xBD,
            Status::OkEmpty => 0xB0,
            Status::GcAck => 0xAA,
        }
    }
}

impl TryFrom<u8> for Status
{
    type Error = ProtocolError;

    fn try_from(byte: u8) -> Result<Self, Self::Error>
    {
        match byte {
            0x01 => Ok(Status::Running),
            0xBD => Ok(Status::Ok),
            0xB0 => Ok(Status::OkEmpty),
            0xAA => Ok(Status::GcAck),
            other => Err(ProtocolError::UnknownStatus(other)),
        }
    }
}

impl fmt::Display for Status
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        let name = match self {
            Status::Running => "RUNNING",
            Status::Ok => "OK",
            Status::OkEmpty => "OK_EMPTY",
            Status::GcAck => "GC_ACK",
        };
        write!(f, "{name}(0x{:02x})", self.byte())
    }
}

/// Console identifier returned by `GetVersion`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Console
{
    /// Wii U
    WiiU,
    /// Any identifier this client does not know about
    Unknown(u8),
}

impl From<u8> for Console
{
    fn from(byte: u8) -> Self
    {
        match byte {
            0x82 => Console::WiiU,
            other => Console::Unknown(other),
        }
    }
}

impl From<Console> for u8
{
    fn from(console: Console) -> Self
    {
        match console {
            Console::WiiU => 0x82,
            Console::Unknown(byte) => byte,
        }
    }
}

impl fmt::Display for Console
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match self {
            Console::WiiU => write!(f, "Wii U"),
            Console::Unknown(byte) => write!(f, "unknown console 0x{byte:02x}"),
        }
    }
}
