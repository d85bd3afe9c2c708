//! # Symbols
//!
//! Exported symbols resolved on the device, and the per-session cache that
//! remembers them.

pub mod cache;

use std::fmt;

pub use cache::{SymbolCache, SymbolKey};

use crate::types::Address;

/// Module that hosts the allocator, `memset` and most system calls.
pub const COREINIT: &str = "coreinit.rpl";

/// A symbol resolved to a device address.
///
/// This is a plain value: it holds no connection and owns nothing on the
/// device. To call it, hand it back to the session that resolved it with
/// [`Session::call_remote`](crate::Session::call_remote).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExportedSymbol
{
    address: Address,
    module: String,
    name: String,
}

impl ExportedSymbol
{
    /// Wrap a resolved address.
    pub fn new(address: Address, module: impl Into<String>, name: impl Into<String>) -> Self
    {
        Self {
            address,
            module: module.into(),
            name: name.into(),
        }
    }

    /// Device address of the export.
    #[must_use]
    pub fn address(&self) -> Address
    {
        self.address
    }

    /// Owning module name.
    #[must_use]
    pub fn module(&self) -> &str
    {
        &self.module
    }

    /// Export name.
    #[must_use]
    pub fn name(&self) -> &str
    {
        &self.name
    }
}

impl fmt::Display for ExportedSymbol
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "{}!{} @ {}", self.module, self.name, self.address)
    }
}
