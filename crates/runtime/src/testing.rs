//! Test fixtures shared across modules.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::atomic::{AtomicU16, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use serde_json::{Value, json};

use crate::llm::{GenerateRequest, GenerateResponse, ModelError, TextGenerator};
use crate::schema::Schema;
use crate::tools::{Tool, ToolError, ToolResult, display_name_for};

type Handler = dyn Fn(Value) -> Result<ToolResult, ToolError> + Send + Sync;

/// A local tool backed by a closure.
pub struct FnTool {
    name: String,
    display_name: String,
    input_schema: Schema,
    output_schema: Schema,
    handler: Box<Handler>,
    calls: AtomicUsize,
}

impl FnTool {
    pub fn new(
        name: &str,
        input_schema: Schema,
        handler: impl Fn(Value) -> Result<ToolResult, ToolError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.to_string(),
            display_name: display_name_for(name),
            input_schema,
            output_schema: Schema::any(),
            handler: Box::new(handler),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_output_schema(mut self, schema: Schema) -> Self {
        self.output_schema = schema;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Tool for FnTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }

    fn description(&self) -> &str {
        "A test tool"
    }

    fn input_schema(&self) -> &Schema {
        &self.input_schema
    }

    fn output_schema(&self) -> &Schema {
        &self.output_schema
    }

    async fn run(&self, args: Value) -> Result<ToolResult, ToolError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.handler)(args)
    }
}

/// A request as seen by [`StubGenerator`].
#[derive(Debug, Clone)]
pub struct Recorded {
    pub system: Option<String>,
    pub prompt: String,
    pub response_name: Option<String>,
}

type Reply = dyn Fn(&Recorded) -> Result<String, ModelError> + Send + Sync;

/// A [`TextGenerator`] that answers from a script or a closure.
pub struct StubGenerator {
    reply: Box<Reply>,
    requests: Mutex<Vec<Recorded>>,
}

impl StubGenerator {
    pub fn from_fn(
        reply: impl Fn(&Recorded) -> Result<String, ModelError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            reply: Box::new(reply),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Replies in order; an exhausted script answers with an API error.
    pub fn script(replies: Vec<Result<String, ModelError>>) -> Self {
        let queue = Mutex::new(VecDeque::from(replies));
        Self::from_fn(move |_| {
            queue
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ModelError::Api("script exhausted".into())))
        })
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    /// How many requests asked for the named json response.
    pub fn count(&self, response_name: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.response_name.as_deref() == Some(response_name))
            .count()
    }
}

impl TextGenerator for StubGenerator {
    fn generate_text(
        &self,
        request: GenerateRequest<'_>,
    ) -> impl Future<Output = Result<GenerateResponse, ModelError>> + Send {
        let recorded = Recorded {
            system: request.system.map(str::to_string),
            prompt: request.prompt.to_string(),
            response_name: request.json_response.map(|r| r.name.clone()),
        };
        let reply = (self.reply)(&recorded);
        self.requests.lock().unwrap().push(recorded);
        std::future::ready(reply.map(GenerateResponse::new))
    }
}

/// Tracks in-flight requests across fake servers.
#[derive(Debug, Clone, Default)]
pub struct Gauge {
    current: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

impl Gauge {
    fn enter(&self) {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
    }

    fn leave(&self) {
        self.current.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

/// An in-process MCP server.
///
/// Every listed tool takes `{text: string}`. `explode` and `sulk` report
/// errors, `fetch` returns an embedded resource and an annotated text block,
/// and any other name echoes its input.
#[derive(Clone)]
pub struct FakeMcpServer {
    tools: Arc<Vec<String>>,
    status: Arc<AtomicU16>,
    latency: Option<Duration>,
    gauge: Option<Gauge>,
}

impl FakeMcpServer {
    pub fn new(tools: &[&str]) -> Self {
        Self {
            tools: Arc::new(tools.iter().map(|t| t.to_string()).collect()),
            status: Arc::new(AtomicU16::new(0)),
            latency: None,
            gauge: None,
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn with_gauge(mut self, gauge: Gauge) -> Self {
        self.gauge = Some(gauge);
        self
    }

    /// Answer every later request with `status` and no JSON-RPC body.
    pub fn fail_with_status(&self, status: u16) {
        self.status.store(status, Ordering::SeqCst);
    }

    /// Bind to an ephemeral port and return the endpoint URL.
    pub async fn spawn(&self) -> String {
        let app = Router::new()
            .route("/mcp", post(handle))
            .with_state(self.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/mcp")
    }

    fn list(&self) -> Value {
        let tools: Vec<Value> = self
            .tools
            .iter()
            .map(|name| {
                json!({
                    "name": name,
                    "description": format!("Remote {name} tool"),
                    "inputSchema": {
                        "type": "object",
                        "properties": {"text": {"type": "string"}},
                        "required": ["text"]
                    }
                })
            })
            .collect();
        json!({ "tools": tools })
    }

    fn call(params: &Value) -> Value {
        let text = params["arguments"]["text"].as_str().unwrap_or_default();
        match params["name"].as_str().unwrap_or_default() {
            "explode" => json!({
                "content": [
                    {"type": "text", "text": "explode failed"},
                    {"type": "image", "data": "AAAA", "mimeType": "image/png"},
                    {"type": "text", "text": "stack trace"}
                ],
                "isError": true
            }),
            "sulk" => json!({ "content": [], "isError": true }),
            "fetch" => json!({
                "content": [
                    {"type": "resource", "resource": {"uri": "file:///a.txt", "text": "hi"}},
                    {"type": "text", "text": text, "annotations": {"priority": 1}}
                ]
            }),
            _ => json!({
                "content": [{"type": "text", "text": format!("echo: {text}")}]
            }),
        }
    }
}

async fn handle(State(server): State<FakeMcpServer>, Json(message): Json<Value>) -> Response {
    if let Some(gauge) = &server.gauge {
        gauge.enter();
    }
    if let Some(latency) = server.latency {
        tokio::time::sleep(latency).await;
    }
    let response = respond(&server, &message);
    if let Some(gauge) = &server.gauge {
        gauge.leave();
    }
    response
}

fn respond(server: &FakeMcpServer, message: &Value) -> Response {
    let status = server.status.load(Ordering::SeqCst);
    if status != 0 {
        let code = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return (code, "server unavailable").into_response();
    }

    let Some(id) = message.get("id").cloned() else {
        return StatusCode::ACCEPTED.into_response();
    };

    let result = match message["method"].as_str().unwrap_or_default() {
        "initialize" => json!({
            "protocolVersion": "2024-11-05",
            "capabilities": {"tools": {}},
            "serverInfo": {"name": "fake"}
        }),
        "tools/list" => server.list(),
        "tools/call" => FakeMcpServer::call(&message["params"]),
        _ => {
            return Json(json!({
                "jsonrpc": "2.0",
                "id": id,
                "error": {"code": -32601, "message": "method not found"}
            }))
            .into_response();
        }
    };
    Json(json!({"jsonrpc": "2.0", "id": id, "result": result})).into_response()
}
