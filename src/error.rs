//! Error types for the Learning Info MCP Server
//!
//! This module defines the error hierarchy for all operations in the server.

use thiserror::Error;

/// Main error type for the Learning Info MCP Server
#[derive(Error, Debug)]
pub enum LearningMcpError {
    /// MCP protocol and tool registration errors
    #[error("MCP protocol error: {0}")]
    Mcp(#[from] McpError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Server name must not be empty")]
    EmptyServerName,
}

/// MCP protocol errors
#[derive(Error, Debug)]
pub enum McpError {
    #[error("Tool already registered: {name}")]
    DuplicateTool { name: String },

    #[error("Invalid tool name: {name:?}")]
    InvalidToolName { name: String },

    #[error("Unknown tool: {name}")]
    UnknownTool { name: String },

    #[error("Invalid arguments for tool '{tool}': {message}")]
    InvalidArguments { tool: String, message: String },

    #[error("Protocol error: {message}")]
    ProtocolError { message: String },

    #[error("Transport error: {message}")]
    TransportError { message: String },
}

/// Result type alias for Learning Info MCP operations
pub type Result<T> = std::result::Result<T, LearningMcpError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = McpError::DuplicateTool {
            name: "what_am_i_learning".to_string(),
        };
        assert_eq!(err.to_string(), "Tool already registered: what_am_i_learning");
    }

    #[test]
    fn test_error_conversion() {
        let mcp_err = McpError::UnknownTool {
            name: "nope".to_string(),
        };
        let err: LearningMcpError = mcp_err.into();
        assert!(matches!(err, LearningMcpError::Mcp(McpError::UnknownTool { .. })));
        assert!(err.to_string().contains("Unknown tool: nope"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "stdout closed");
        let err: LearningMcpError = io_err.into();
        assert!(matches!(err, LearningMcpError::Io(_)));
    }
}
