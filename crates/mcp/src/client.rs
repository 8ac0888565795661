//! MCP client session over HTTP POST.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::{Mutex, RwLock};

use crate::error::{Error, Result};
use crate::protocol::{
    CallToolParams, CallToolResult, InitializeParams, JsonRpcNotification, JsonRpcRequest,
    ListToolsResult, RequestId, Tool, decode_body,
};

/// Header a streamable-HTTP server uses to pin a session.
pub const SESSION_HEADER: &str = "mcp-session-id";

/// Configuration for a remote MCP server.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerConfig {
    /// Label used in logs. Falls back to the URL.
    #[serde(default)]
    pub name: Option<String>,
    pub url: String,
    /// Extra headers sent with every request (e.g. `Authorization`).
    #[serde(default)]
    pub headers: HashMap<String, String>,
    /// Per-request timeout. Unset means the HTTP client's default.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl ServerConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Name for logs and errors.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.url)
    }
}

/// A session with one remote MCP server.
///
/// The handshake runs lazily on the first `list_tools` or `call_tool` and
/// exactly once per client.
pub struct Client {
    config: ServerConfig,
    http: reqwest::Client,
    next_id: AtomicI64,
    initialized: Mutex<bool>,
    session_id: RwLock<Option<String>>,
}

impl Client {
    /// Build a client. Fails on header values that cannot go on the wire.
    pub fn new(config: ServerConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        for (name, value) in &config.headers {
            let header_name =
                HeaderName::from_bytes(name.as_bytes()).map_err(|e| Error::InvalidHeader {
                    name: name.clone(),
                    reason: e.to_string(),
                })?;
            let header_value = HeaderValue::from_str(value).map_err(|e| Error::InvalidHeader {
                name: name.clone(),
                reason: e.to_string(),
            })?;
            headers.insert(header_name, header_value);
        }

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder.build().map_err(|e| Error::Client(e.to_string()))?;

        Ok(Self {
            config,
            http,
            next_id: AtomicI64::new(1),
            initialized: Mutex::new(false),
            session_id: RwLock::new(None),
        })
    }

    /// Get the server label.
    pub fn name(&self) -> &str {
        self.config.label()
    }

    /// Perform the handshake if it has not happened yet.
    pub async fn initialize(&self) -> Result<()> {
        let mut initialized = self.initialized.lock().await;
        if *initialized {
            return Ok(());
        }

        // Only the absence of an error matters here.
        let _: Value = self
            .request("initialize", Some(InitializeParams::default()))
            .await?;
        self.notify("notifications/initialized").await?;

        *initialized = true;
        tracing::info!(server = %self.name(), "MCP session initialized");
        Ok(())
    }

    /// Check if the handshake has completed.
    pub async fn is_initialized(&self) -> bool {
        *self.initialized.lock().await
    }

    /// List the tools the server exposes.
    pub async fn list_tools(&self) -> Result<Vec<Tool>> {
        self.initialize().await?;
        let result: ListToolsResult = self.request("tools/list", None::<()>).await?;
        Ok(result.tools)
    }

    /// Call a tool by name.
    ///
    /// A result flagged `isError` is still returned as `Ok`; interpreting it
    /// is up to the caller.
    pub async fn call_tool(&self, name: &str, arguments: Value) -> Result<CallToolResult> {
        self.initialize().await?;
        let params = CallToolParams {
            name: name.to_string(),
            arguments,
        };
        self.request("tools/call", Some(params)).await
    }

    // --- Internal methods ---

    fn next_request_id(&self) -> RequestId {
        RequestId::Number(self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    async fn request<P, R>(&self, method: &str, params: Option<P>) -> Result<R>
    where
        P: serde::Serialize,
        R: serde::de::DeserializeOwned,
    {
        let id = self.next_request_id();
        let mut request = JsonRpcRequest::new(id.clone(), method);
        if let Some(p) = params {
            request = request.with_params(p)?;
        }

        tracing::debug!(server = %self.name(), %id, method, "sending MCP request");
        let response = self.post(serde_json::to_string(&request)?).await?;
        let body = response.text().await.map_err(|source| Error::Transport {
            url: self.config.url.clone(),
            source,
        })?;
        let response = decode_body(&body)?;

        // Error responses may carry a null id when the server could not read ours.
        if response.error.is_none() && response.id.as_ref() != Some(&id) {
            return Err(Error::IdMismatch {
                expected: id,
                actual: response.id,
            });
        }

        let result_value = response.into_result()?;
        serde_json::from_value(result_value)
            .map_err(|e| Error::InvalidResponse(format!("unexpected {method} result: {e}")))
    }

    async fn notify(&self, method: &str) -> Result<()> {
        let notification = JsonRpcNotification::new(method);
        tracing::debug!(server = %self.name(), method, "sending MCP notification");
        self.post(serde_json::to_string(&notification)?).await?;
        Ok(())
    }

    async fn post(&self, body: String) -> Result<reqwest::Response> {
        let mut request = self
            .http
            .post(&self.config.url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json, text/event-stream")
            .body(body);

        let session_id = self.session_id.read().await.clone();
        if let Some(session_id) = session_id {
            request = request.header(SESSION_HEADER, session_id);
        }

        let response = request.send().await.map_err(|source| Error::Transport {
            url: self.config.url.clone(),
            source,
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Status { status, body });
        }

        if let Some(session_id) = response
            .headers()
            .get(SESSION_HEADER)
            .and_then(|v| v.to_str().ok())
        {
            *self.session_id.write().await = Some(session_id.to_string());
        }

        Ok(response)
    }
}
