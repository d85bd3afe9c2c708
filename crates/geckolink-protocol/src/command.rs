//! # Commands
//!
//! One-byte opcodes sent as the first byte of a request.

use std::fmt;

/// Request opcode understood by the on-console handler.
///
/// The discriminant is the byte put on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Command
{
    /// Write one byte (low byte of the value word)
    MemoryPoke8 = 0x01,
    /// Write two bytes (low half of the value word)
    MemoryPoke16 = 0x02,
    /// Write one 32-bit word
    MemoryPoke32 = 0x03,
    /// Read `[start, end)`, answered with a status byte and optional payload
    MemoryRead = 0x04,
    /// Write one 32-bit word through the kernel
    MemoryKernelWrite = 0x0B,
    /// Read one 32-bit word through the kernel
    MemoryKernelRead = 0x0C,
    /// Upload `[start, end)`, acknowledged with `GC_ACK`
    MemoryWrite = 0x41,
    /// Ask the handler for its status byte
    GetStatus = 0x50,
    /// Call a function with up to 8 arguments
    RemoteProcedureCall = 0x70,
    /// Resolve an exported symbol
    GetSymbol = 0x71,
    /// Search a range for a 32-bit value
    MemorySearch32 = 0x72,
    /// Call a function with up to 16 arguments
    RemoteProcedureCallBig = 0x80,
    /// Ask which console the handler runs on
    GetVersion = 0x99,
    /// Ask for the console's OS version
    GetOsVersion = 0x9A,
    /// Failure handshake byte; the handler treats it as a no-op
    GcFail = 0xCC,
}

impl Command
{
    /// Every opcode, in wire order.
    pub const ALL: [Command; 15] = [
        Command::MemoryPoke8,
        Command::MemoryPoke16,
        Command::MemoryPoke32,
        Command::MemoryRead,
        Command::MemoryKernelWrite,
        Command::MemoryKernelRead,
        Command::MemoryWrite,
        Command::GetStatus,
        Command::RemoteProcedureCall,
        Command::GetSymbol,
        Command::MemorySearch32,
        Command::RemoteProcedureCallBig,
        Command::GetVersion,
        Command::GetOsVersion,
        Command::GcFail,
    ];

    /// The byte sent on the wire.
    #[must_use]
    pub const fn opcode(self) -> u8
    {
        self as u8
    }

    /// Look a command up by its opcode.
    #[must_use]
    pub fn from_opcode(byte: u8) -> Option<Self>
    {
        Self::ALL.into_iter().find(|command| command.opcode() == byte)
    }
}

impl From<Command> for u8
{
    fn from(command: Command) -> Self
    {
        command.opcode()
    }
}

impl fmt::Display for Command
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "{self:?}(0x{:02x})", self.opcode())
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_opcode_lookup_is_inverse()
    {
        for command in Command::ALL {
            assert_eq!(Command::from_opcode(command.opcode()), Some(command));
        }
        assert_eq!(Command::from_opcode(0x00), None);
    }

    #[test]
    fn test_display_includes_opcode()
    {
        assert_eq!(Command::MemoryWrite.to_string(), "MemoryWrite(0x41)");
    }
}
