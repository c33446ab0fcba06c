//! Connection configuration for the MongoDB driver.
//!
//! [`AdapterConfig`] is built once with [`AdapterConfigBuilder`] and then owned, unchanged, by
//! the driver for its whole lifetime.

use std::fmt;

/// Default MongoDB host.
pub const DEFAULT_HOST: &str = "localhost";
/// Default MongoDB port.
pub const DEFAULT_PORT: u16 = 27017;

/// Connection parameters of a MongoDB adapter.
#[derive(Clone, PartialEq, Eq)]
pub struct AdapterConfig {
    pub host: String,
    pub port: u16,
    /// Database holding the model collections.
    pub dbname: Option<String>,
    /// Prepended to every collection name.
    pub prefix: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            dbname: None,
            prefix: None,
            username: None,
            password: None,
        }
    }
}

impl fmt::Debug for AdapterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("dbname", &self.dbname)
            .field("prefix", &self.prefix)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl AdapterConfig {
    /// Create a new configuration builder
    pub fn builder() -> AdapterConfigBuilder {
        AdapterConfigBuilder::new()
    }

    /// Connection string for the configured host and port. Credentials are not embedded.
    pub fn connection_uri(&self) -> String {
        format!("mongodb://{}:{}", self.host, self.port)
    }

    /// Backend name of a model collection, with the configured prefix applied.
    pub fn collection_name(&self, name: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}{name}"),
            None => name.to_string(),
        }
    }
}

/// Builder for AdapterConfig
#[derive(Debug, Default)]
pub struct AdapterConfigBuilder {
    config: AdapterConfig,
}

impl AdapterConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the host (default: "localhost")
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Set the port (default: 27017)
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    pub fn dbname(mut self, dbname: impl Into<String>) -> Self {
        self.config.dbname = Some(dbname.into());
        self
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.prefix = Some(prefix.into());
        self
    }

    /// Authenticate against `dbname` with the given credentials
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.config.username = Some(username.into());
        self.config.password = Some(password.into());
        self
    }

    pub fn build(self) -> AdapterConfig {
        self.config
    }
}
