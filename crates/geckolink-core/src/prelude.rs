//! Common module for library exports

pub use crate::buffer::{AllocatedBuffer, AllocatorKind, RemoteBuffer};
pub use crate::config::{ConnectionConfig, SessionConfig};
pub use crate::coreinit::CoreInit;
pub use crate::error::{GeckoError, Result};
pub use crate::memory::MemoryAccess;
pub use crate::session::{Session, Transport};
pub use crate::symbols::ExportedSymbol;
pub use crate::types::{Address, PokeValue};
