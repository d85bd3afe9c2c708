//! # Symbol Cache
//!
//! Per-session memo of resolved symbols.
//!
//! Symbol addresses do not change while a title is running, so repeated
//! lookups can be answered locally. The cache is off by default: a title
//! switch on the console invalidates every entry and the session has no way
//! to notice.
//!
//! Entries are keyed by module, then by symbol name together with the lookup
//! flags. A pointer lookup and a plain lookup of the same name resolve to
//! different addresses and never share an entry.

use std::collections::HashMap;

use super::ExportedSymbol;

/// Symbol name plus the flags it was resolved with.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SymbolKey
{
    /// Export name
    pub name: String,
    /// The export was dereferenced once after lookup
    pub is_pointer: bool,
    /// The export was looked up as data rather than code
    pub is_data: bool,
}

impl SymbolKey
{
    /// Build a key.
    pub fn new(name: impl Into<String>, is_pointer: bool, is_data: bool) -> Self
    {
        Self {
            name: name.into(),
            is_pointer,
            is_data,
        }
    }
}

/// Cache of resolved symbols, grouped by module.
///
/// ## Thread Safety
///
/// The cache is not thread-safe. It lives inside a session, which is itself
/// single-threaded.
#[derive(Debug, Default)]
pub struct SymbolCache
{
    enabled: bool,
    modules: HashMap<String, HashMap<SymbolKey, ExportedSymbol>>,
}

impl SymbolCache
{
    /// Create an empty cache.
    #[must_use]
    pub fn new(enabled: bool) -> Self
    {
        Self {
            enabled,
            modules: HashMap::new(),
        }
    }

    /// Whether lookups and inserts are active.
    #[must_use]
    pub fn is_enabled(&self) -> bool
    {
        self.enabled
    }

    /// Turn the cache on or off. Turning it off drops every entry at once.
    pub fn set_enabled(&mut self, enabled: bool)
    {
        self.enabled = enabled;
        if !enabled {
            self.clear();
        }
    }

    /// Drop every entry.
    pub fn clear(&mut self)
    {
        self.modules.clear();
    }

    /// Cached symbol, if the cache is enabled and holds it.
    #[must_use]
    pub fn get(&self, module: &str, key: &SymbolKey) -> Option<&ExportedSymbol>
    {
        if !self.enabled {
            return None;
        }
        self.modules.get(module).and_then(|symbols| symbols.get(key))
    }

    /// Remember a symbol. Ignored while the cache is disabled.
    pub fn insert(&mut self, key: SymbolKey, symbol: ExportedSymbol)
    {
        if !self.enabled {
            return;
        }
        self.modules
            .entry(symbol.module().to_string())
            .or_default()
            .insert(key, symbol);
    }

    /// Number of cached symbols across all modules.
    #[must_use]
    pub fn len(&self) -> usize
    {
        self.modules.values().map(HashMap::len).sum()
    }

    /// True when nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool
    {
        self.len() == 0
    }
}
