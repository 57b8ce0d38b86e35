//! Configuration for the Learning Info MCP Server
//!
//! The server identity advertised during `initialize`. Nothing here reads the
//! environment or the filesystem; every value has a compiled-in default.

use crate::error::{ConfigError, Result};

/// Default name advertised in `serverInfo`
pub const DEFAULT_SERVER_NAME: &str = "Learning Info Server";

/// Configuration for the Learning Info MCP Server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Name reported to clients in `serverInfo.name`
    pub server_name: String,

    /// Version reported to clients in `serverInfo.version`
    pub server_version: String,

    /// Optional usage hint returned in the `initialize` result
    pub instructions: Option<String>,
}

impl Config {
    /// Create a new configuration with the default server identity
    pub fn new() -> Self {
        Self {
            server_name: DEFAULT_SERVER_NAME.to_string(),
            server_version: env!("CARGO_PKG_VERSION").to_string(),
            instructions: None,
        }
    }

    /// Override the advertised server name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.server_name = name.into();
        self
    }

    /// Attach instructions for the client
    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    /// Check that the configuration can be advertised
    pub fn validate(&self) -> Result<()> {
        if self.server_name.trim().is_empty() {
            return Err(ConfigError::EmptyServerName.into());
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
