//! MCP Server implementation
//!
//! Implements the Model Context Protocol server for stdio transport.

use serde::Serialize;
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info, trace, warn};

use crate::config::Config;
use crate::error::{McpError, Result};
use crate::mcp::tools::ToolRegistry;
use crate::mcp::types::*;

/// Transport the server listens on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    /// Newline-delimited JSON over the process's stdin/stdout
    Stdio,
}

/// Server lifecycle. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    /// Tools registered, not yet serving
    Idle,
    /// Inside the serve loop
    Serving,
    /// Input closed; the server will not serve again
    Stopped,
}

/// MCP Server for the learning-info tool set
pub struct McpServer {
    config: Config,

    /// Registered tools
    tools: ToolRegistry,

    state: ServerState,

    /// Whether the client sent `notifications/initialized`
    initialized: bool,
}

impl McpServer {
    /// Create a new MCP server
    pub fn new(config: Config, tools: ToolRegistry) -> Self {
        Self {
            config,
            tools,
            state: ServerState::Idle,
            initialized: false,
        }
    }

    pub fn state(&self) -> ServerState {
        self.state
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Serve on the selected transport until its input closes
    pub async fn run(&mut self, transport: Transport) -> Result<()> {
        match transport {
            Transport::Stdio => {
                let stdin = BufReader::new(tokio::io::stdin());
                let stdout = tokio::io::stdout();
                self.serve(stdin, stdout).await
            }
        }
    }

    /// Serve requests read line by line from `reader`, writing responses to `writer`.
    ///
    /// Returns `Ok(())` once the reader reaches end of input.
    pub async fn serve<R, W>(&mut self, reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        if self.state != ServerState::Idle {
            return Err(McpError::ProtocolError {
                message: format!("server cannot start from state {:?}", self.state),
            }
            .into());
        }

        self.state = ServerState::Serving;
        info!(
            "{} v{} serving {} tool(s)",
            self.config.server_name,
            self.config.server_version,
            self.tools.len()
        );

        let outcome = self.serve_lines(reader, &mut writer).await;

        self.state = ServerState::Stopped;
        match &outcome {
            Ok(()) => info!("MCP server shutting down (input closed)"),
            Err(e) => warn!("MCP server stopped on error: {}", e),
        }
        outcome
    }

    async fn serve_lines<R, W>(&mut self, mut reader: R, writer: &mut W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut buf = Vec::new();

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf).await? == 0 {
                break;
            }

            let response = match std::str::from_utf8(&buf) {
                Ok(line) if line.trim().is_empty() => continue,
                Ok(line) => {
                    trace!("Received: {}", line.trim_end());
                    self.handle_message(line.trim_end())
                }
                Err(e) => {
                    warn!("Discarding line that is not valid UTF-8: {}", e);
                    Some(JsonRpcResponse::error(
                        None,
                        JsonRpcError::parse_error(format!("Parse error: {}", e)),
                    ))
                }
            };

            if let Some(response) = response {
                let mut response_str = serde_json::to_string(&response)?;
                trace!("Sending: {}", response_str);
                response_str.push('\n');
                write_line(writer, &response_str).await?;
            }
        }

        Ok(())
    }

    /// Handle one incoming JSON-RPC message.
    ///
    /// Returns `None` for notifications, which never get a response.
    pub fn handle_message(&mut self, message: &str) -> Option<JsonRpcResponse> {
        let value: Value = match serde_json::from_str(message) {
            Ok(v) => v,
            Err(e) => {
                warn!("Unparseable message: {}", e);
                return Some(JsonRpcResponse::error(
                    None,
                    JsonRpcError::parse_error(format!("Parse error: {}", e)),
                ));
            }
        };

        let id_hint = value
            .get("id")
            .cloned()
            .and_then(|id| serde_json::from_value::<RequestId>(id).ok());

        let request: JsonRpcRequest = match serde_json::from_value(value) {
            Ok(req) => req,
            Err(e) => {
                return Some(JsonRpcResponse::error(
                    id_hint,
                    JsonRpcError::invalid_request(format!("Invalid request: {}", e)),
                ));
            }
        };

        if request.jsonrpc != JSONRPC_VERSION {
            return request.id.map(|id| {
                JsonRpcResponse::error(
                    Some(id),
                    JsonRpcError::invalid_request(format!(
                        "Unsupported jsonrpc version: {}",
                        request.jsonrpc
                    )),
                )
            });
        }

        if request.is_notification() {
            self.handle_notification(&request);
            return None;
        }

        let id = request.id.clone()?;
        Some(self.handle_request(id, request))
    }

    fn handle_request(&mut self, id: RequestId, request: JsonRpcRequest) -> JsonRpcResponse {
        debug!("Handling request: {} (id={:?})", request.method, id);

        match request.method.as_str() {
            methods::INITIALIZE => self.handle_initialize(id, request.params),
            methods::PING => JsonRpcResponse::success(id, json!({})),
            methods::LIST_TOOLS => {
                let result = ListToolsResult {
                    tools: self.tools.list_tools(),
                };
                to_response(id, &result)
            }
            methods::CALL_TOOL => self.handle_call_tool(id, request.params),
            _ => {
                warn!("Unknown method: {}", request.method);
                JsonRpcResponse::error(Some(id), JsonRpcError::method_not_found(&request.method))
            }
        }
    }

    fn handle_notification(&mut self, notification: &JsonRpcRequest) {
        debug!("Handling notification: {}", notification.method);

        match notification.method.as_str() {
            methods::INITIALIZED => {
                info!("MCP client initialized");
                self.initialized = true;
            }
            methods::CANCELLED => debug!("Request cancelled"),
            other => debug!("Ignoring unknown notification: {}", other),
        }
    }

    /// Handle initialize request
    fn handle_initialize(&self, id: RequestId, params: Option<Value>) -> JsonRpcResponse {
        let params: InitializeParams = match params.map(serde_json::from_value).transpose() {
            Ok(p) => p.unwrap_or_default(),
            Err(e) => {
                return JsonRpcResponse::error(
                    Some(id),
                    JsonRpcError::invalid_params(format!("Invalid initialize params: {}", e)),
                );
            }
        };

        if let Some(client) = &params.client_info {
            info!(
                "MCP client connecting: {} v{}",
                client.name,
                client.version.as_deref().unwrap_or("unknown")
            );
        }

        let protocol_version = negotiate_protocol_version(params.protocol_version.as_deref());
        debug!("Protocol version: {}", protocol_version);

        let result = InitializeResult {
            protocol_version: protocol_version.to_string(),
            server_info: ServerInfo {
                name: self.config.server_name.clone(),
                version: self.config.server_version.clone(),
            },
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: false,
                }),
            },
            instructions: self.config.instructions.clone(),
        };

        to_response(id, &result)
    }

    /// Handle call tool request
    fn handle_call_tool(&self, id: RequestId, params: Option<Value>) -> JsonRpcResponse {
        let params: CallToolParams = match params {
            Some(p) => match serde_json::from_value(p) {
                Ok(params) => params,
                Err(e) => {
                    return JsonRpcResponse::error(
                        Some(id),
                        JsonRpcError::invalid_params(format!("Invalid tool parameters: {}", e)),
                    );
                }
            },
            None => {
                return JsonRpcResponse::error(
                    Some(id),
                    JsonRpcError::invalid_params("Missing tool parameters"),
                );
            }
        };

        debug!("Calling tool: {}", params.name);
        let result = self.tools.call_tool(&params.name, params.arguments);
        to_response(id, &result)
    }
}

async fn write_line<W: AsyncWrite + Unpin>(writer: &mut W, line: &str) -> Result<()> {
    let transport_error = |e: std::io::Error| McpError::TransportError {
        message: format!("failed to write response: {}", e),
    };

    writer
        .write_all(line.as_bytes())
        .await
        .map_err(transport_error)?;
    writer.flush().await.map_err(transport_error)?;
    Ok(())
}

fn to_response<T: Serialize>(id: RequestId, result: &T) -> JsonRpcResponse {
    match serde_json::to_value(result) {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(e) => JsonRpcResponse::error(Some(id), JsonRpcError::internal_error(e.to_string())),
    }
}
