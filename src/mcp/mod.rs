//! MCP (Model Context Protocol) module
//!
//! JSON-RPC dispatch, tool registration and the stdio serve loop.

pub mod server;
pub mod tools;
pub mod types;

pub use server::{McpServer, ServerState, Transport};
pub use tools::ToolRegistry;
