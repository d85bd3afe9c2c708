//! # Remote Procedure Call framing
//!
//! A call is the callee address followed by a fixed number of 32-bit argument
//! slots. Supplied arguments fill the slots from the front and the remainder is
//! zero. Two frame sizes exist:
//!
//! | arguments | slots | opcode (`Split`) |
//! |-----------|-------|------------------|
//! | 0..=8     | 8     | `RemoteProcedureCall` (0x70) |
//! | 9..=16    | 16    | `RemoteProcedureCallBig` (0x80) |
//!
//! The handler answers every call with the callee's 64-bit return value.

use std::fmt;
use std::str::FromStr;

use crate::codec::WireCodec;
use crate::command::Command;
use crate::error::ProtocolError;

/// Largest number of arguments a call can carry.
pub const MAX_RPC_PARAMS: usize = 16;

/// Slot count of the small call frame.
pub const SMALL_RPC_SLOTS: usize = 8;

/// How the call opcode is chosen for small frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RpcOpcodeSelection
{
    /// Small frames use `RemoteProcedureCall`, big frames `RemoteProcedureCallBig`.
    #[default]
    Split,
    /// Every frame uses `RemoteProcedureCallBig`, even the 8-slot one.
    ///
    /// Reproduces older clients byte for byte. Only useful against handlers
    /// that were patched to accept it: a stock handler reads 16 slots after
    /// `0x80`, so it waits for the missing 32 bytes until the I/O timeout.
    LegacyBig,
}

impl FromStr for RpcOpcodeSelection
{
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "split" | "default" => Ok(RpcOpcodeSelection::Split),
            "legacy-big" | "legacy" | "big" => Ok(RpcOpcodeSelection::LegacyBig),
            _ => Err(format!("Unknown RPC opcode selection: {s}. Use 'split' or 'legacy-big'")),
        }
    }
}

impl fmt::Display for RpcOpcodeSelection
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match self {
            RpcOpcodeSelection::Split => write!(f, "split"),
            RpcOpcodeSelection::LegacyBig => write!(f, "legacy-big"),
        }
    }
}

/// A marshaled call: callee address plus a bounded argument list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcCall
{
    address: u32,
    slots: [u32; MAX_RPC_PARAMS],
    count: usize,
}

impl RpcCall
{
    /// Build a call frame.
    ///
    /// ## Errors
    ///
    /// [`ProtocolError::TooManyParameters`] when more than 16 arguments are given.
    pub fn new(address: u32, params: &[u32]) -> Result<Self, ProtocolError>
    {
        if params.len() > MAX_RPC_PARAMS {
            return Err(ProtocolError::TooManyParameters(params.len()));
        }
        let mut slots = [0u32; MAX_RPC_PARAMS];
        slots[..params.len()].copy_from_slice(params);
        Ok(Self {
            address,
            slots,
            count: params.len(),
        })
    }

    /// Callee address.
    #[must_use]
    pub fn address(&self) -> u32
    {
        self.address
    }

    /// The arguments as supplied, without padding.
    #[must_use]
    pub fn params(&self) -> &[u32]
    {
        &self.slots[..self.count]
    }

    /// Number of slots the frame occupies on the wire.
    #[must_use]
    pub fn slot_count(&self) -> usize
    {
        if self.count <= SMALL_RPC_SLOTS {
            SMALL_RPC_SLOTS
        } else {
            MAX_RPC_PARAMS
        }
    }

    /// The zero-padded slot array sent after the address.
    #[must_use]
    pub fn slots(&self) -> &[u32]
    {
        &self.slots[..self.slot_count()]
    }

    /// Opcode for this frame under the given selection rule.
    #[must_use]
    pub fn opcode(&self, selection: RpcOpcodeSelection) -> Command
    {
        match (selection, self.slot_count()) {
            (RpcOpcodeSelection::Split, SMALL_RPC_SLOTS) => Command::RemoteProcedureCall,
            _ => Command::RemoteProcedureCallBig,
        }
    }

    /// Stage the whole request on a codec.
    pub fn encode<S>(&self, codec: &mut WireCodec<S>, selection: RpcOpcodeSelection)
    {
        codec.write_command(self.opcode(selection));
        codec.write_u32(self.address);
        codec.write_u32s(self.slots());
    }
}
