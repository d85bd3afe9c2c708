//! # Configuration
//!
//! Settings for opening and running a session.
//!
//! Values come from three layers, lowest priority first:
//!
//! 1. [`Default`] impls
//! 2. Environment variables, via [`ConnectionConfig::from_env`]
//! 3. Explicit setters (the CLI maps its flags onto these)
//!
//! ## Environment Variables
//!
//! - `GECKOLINK_HOST`: console address (default `127.0.0.1`)
//! - `GECKOLINK_PORT`: handler port (default `7331`)
//! - `GECKOLINK_TIMEOUT_MS`: connect and I/O timeout in milliseconds, `0` disables
//! - `GECKOLINK_SYMBOL_CACHE`: `true`/`false`, cache resolved symbols
//! - `GECKOLINK_RPC_OPCODES`: `split` or `legacy-big`

use std::env;
use std::io;
use std::net::{Ipv6Addr, SocketAddr, ToSocketAddrs};
use std::str::FromStr;
use std::time::Duration;
use std::vec;

use geckolink_protocol::{RpcOpcodeSelection, DEFAULT_PORT};
use thiserror::Error;

/// Environment variable holding the console address.
pub const ENV_HOST: &str = "GECKOLINK_HOST";
/// Environment variable holding the handler port.
pub const ENV_PORT: &str = "GECKOLINK_PORT";
/// Environment variable holding the timeout in milliseconds.
pub const ENV_TIMEOUT_MS: &str = "GECKOLINK_TIMEOUT_MS";
/// Environment variable toggling the symbol cache.
pub const ENV_SYMBOL_CACHE: &str = "GECKOLINK_SYMBOL_CACHE";
/// Environment variable selecting the RPC opcode rule.
pub const ENV_RPC_OPCODES: &str = "GECKOLINK_RPC_OPCODES";

/// Behaviour of an open session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionConfig
{
    /// Cache resolved symbols for the life of the session
    pub symbol_cache: bool,
    /// Opcode rule for remote procedure calls
    pub rpc_opcodes: RpcOpcodeSelection,
}

impl SessionConfig
{
    /// Enable or disable the symbol cache.
    #[must_use]
    pub fn with_symbol_cache(mut self, enabled: bool) -> Self
    {
        self.symbol_cache = enabled;
        self
    }

    /// Choose the RPC opcode rule.
    #[must_use]
    pub fn with_rpc_opcodes(mut self, selection: RpcOpcodeSelection) -> Self
    {
        self.rpc_opcodes = selection;
        self
    }
}

/// Where to connect and how long to wait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig
{
    /// Console host name or IP
    pub host: String,
    /// Handler port
    pub port: u16,
    /// Give up connecting after this long
    pub connect_timeout: Option<Duration>,
    /// Fail any single read or write that blocks longer than this
    pub io_timeout: Option<Duration>,
    /// Settings for the session once connected
    pub session: SessionConfig,
}

impl Default for ConnectionConfig
{
    fn default() -> Self
    {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            connect_timeout: Some(Duration::from_secs(5)),
            io_timeout: None,
            session: SessionConfig::default(),
        }
    }
}

impl ConnectionConfig
{
    /// Defaults for the given host.
    pub fn new(host: impl Into<String>) -> Self
    {
        Self {
            host: host.into(),
            ..Self::default()
        }
    }

    /// Defaults overridden by the `GECKOLINK_*` environment variables.
    ///
    /// ## Errors
    ///
    /// Returns `ConfigError::InvalidValue` if a variable is set but cannot be
    /// parsed.
    pub fn from_env() -> Result<Self, ConfigError>
    {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable.
    ///
    /// ## Errors
    ///
    /// See [`ConnectionConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup(ENV_HOST).filter(|host| !host.trim().is_empty()) {
            config.host = host.trim().to_string();
        }
        if let Some(port) = lookup(ENV_PORT) {
            config.port = parse_var(ENV_PORT, &port)?;
        }
        if let Some(timeout) = lookup(ENV_TIMEOUT_MS) {
            let millis: u64 = parse_var(ENV_TIMEOUT_MS, &timeout)?;
            config = config.with_timeout((millis > 0).then(|| Duration::from_millis(millis)));
        }
        if let Some(cache) = lookup(ENV_SYMBOL_CACHE) {
            config.session.symbol_cache = parse_bool(ENV_SYMBOL_CACHE, &cache)?;
        }
        if let Some(selection) = lookup(ENV_RPC_OPCODES) {
            config.session.rpc_opcodes = parse_var(ENV_RPC_OPCODES, &selection)?;
        }

        Ok(config)
    }

    /// Set the host.
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self
    {
        self.host = host.into();
        self
    }

    /// Set the port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self
    {
        self.port = port;
        self
    }

    /// Use the same timeout for connecting and for every read and write.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self
    {
        self.connect_timeout = timeout;
        self.io_timeout = timeout;
        self
    }

    /// Replace the session settings.
    #[must_use]
    pub fn with_session(mut self, session: SessionConfig) -> Self
    {
        self.session = session;
        self
    }

    /// `host:port` for display. IPv6 literals are bracketed.
    #[must_use]
    pub fn endpoint(&self) -> String
    {
        if self.host.parse::<Ipv6Addr>().is_ok() {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }

    /// Resolve the host and port to socket addresses.
    ///
    /// ## Errors
    ///
    /// Any resolver error.
    pub fn socket_addrs(&self) -> io::Result<vec::IntoIter<SocketAddr>>
    {
        (self.host.as_str(), self.port).to_socket_addrs()
    }
}

/// Configuration error
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError
{
    /// A variable is set to something that does not parse
    #[error("Invalid value for {variable}: {value:?} ({reason})")]
    InvalidValue
    {
        /// Variable name
        variable: &'static str,
        /// Raw value
        value: String,
        /// Parser message
        reason: String,
    },
}

fn parse_var<T>(variable: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: ToString,
{
    value.trim().parse().map_err(|err: T::Err| ConfigError::InvalidValue {
        variable,
        value: value.to_string(),
        reason: err.to_string(),
    })
}

fn parse_bool(variable: &'static str, value: &str) -> Result<bool, ConfigError>
{
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            variable,
            value: value.to_string(),
            reason: "expected true or false".to_string(),
        }),
    }
}
