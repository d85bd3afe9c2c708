//! # geckolink-core
//!
//! Client side of the Gecko remote-debugging protocol spoken by the Wii U
//! TCP Gecko handler.
//!
//! This crate turns the wire vocabulary from `geckolink-protocol` into safe
//! operations on a live console:
//! - Peeking and poking fixed-width values
//! - Chunked memory reads and writes, plus word-sized kernel access
//! - Resolving exported symbols and calling them with up to 16 arguments
//! - Allocating, filling and freeing device memory through `coreinit.rpl`
//!
//! ## Safety on the device
//!
//! The handler dereferences whatever address it receives. A stray address
//! crashes the console instead of failing the request, so every memory
//! operation is checked against a fixed address map ([`memory`]) before a
//! single byte is sent.
//!
//! ## Connection model
//!
//! One [`Session`] owns one TCP stream and runs one request at a time.
//! Buffers and the allocator facade borrow the session per call and never
//! keep it.

pub mod buffer;
pub mod config;
pub mod coreinit;
pub mod error;
pub mod memory;
pub mod prelude;
pub mod session;
pub mod symbols;
pub mod types;

pub use buffer::{AllocatedBuffer, AllocatorKind, RemoteBuffer};
pub use config::{ConfigError, ConnectionConfig, SessionConfig};
pub use coreinit::{align, CoreInit};
// Re-export commonly used types
pub use error::{GeckoError, Result};
pub use geckolink_protocol::{Console, RpcOpcodeSelection, Status, DEFAULT_PORT};
pub use session::{Session, SharedSession, Transport};
pub use symbols::ExportedSymbol;
pub use types::{Address, PokeValue};
