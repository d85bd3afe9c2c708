//! # geckolink-protocol
//!
//! Byte-level vocabulary of the Gecko remote-debugging protocol.
//!
//! This crate knows how requests and responses look on the wire and nothing
//! else. It does not validate addresses, cache symbols or decide when a round
//! trip is complete; that policy lives in `geckolink-core`.
//!
//! ## Contents
//!
//! - [`Command`]: one-byte opcodes that start a request
//! - [`Status`] and [`Console`]: one-byte response codes
//! - [`WireCodec`]: big-endian integer and block transfer over a duplex stream
//! - [`RpcCall`]: remote procedure call argument marshaling
//! - [`SymbolRequest`]: the symbol lookup payload
//!
//! All multi-byte integers are big-endian, matching the console's PowerPC CPU.

pub mod codec;
pub mod command;
pub mod error;
pub mod rpc;
pub mod status;
pub mod symbol;

pub use codec::WireCodec;
pub use command::Command;
pub use error::ProtocolError;
pub use rpc::{RpcCall, RpcOpcodeSelection, MAX_RPC_PARAMS};
pub use status::{Console, Status};
pub use symbol::SymbolRequest;

/// Default TCP port the on-console handler listens on.
pub const DEFAULT_PORT: u16 = 7331;

/// Largest payload moved by a single memory read or write round.
pub const MEMORY_CHUNK_SIZE: usize = 0x400;

/// Kernel memory is transferred one 32-bit word per round.
pub const KERNEL_CHUNK_SIZE: usize = 4;
