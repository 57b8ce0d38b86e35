//! Learning Info MCP Server Library
//!
//! A Model Context Protocol (MCP) server exposing a single tool,
//! `what_am_i_learning`, over a newline-delimited JSON-RPC stdio transport.

pub mod config;
pub mod error;
pub mod learning;
pub mod mcp;

pub use config::Config;
pub use error::{LearningMcpError, Result};
