//! MCP tool server built on the `rmcp` SDK.
//!
//! [`ToolServer`] implements [`ServerHandler`], so protocol bookkeeping (handshake, ping,
//! request ids, cancellation) stays inside the SDK. Inbound lines pass through a screening
//! pump first: anything that is not a client message is answered (`-32700` for bytes that
//! are not JSON, `-32601`/`-32602`/`-32600` for malformed requests) or dropped, and never
//! reaches the session, so one bad line cannot end it.

// crates.io
use rmcp::{
	ServerHandler, ServiceExt,
	model::{
		CallToolRequestParam, CallToolResult, ClientJsonRpcMessage, Content, ErrorData,
		Implementation, ListToolsResult, LoggingLevel, PaginatedRequestParam,
		ServerCapabilities, ServerInfo, SetLevelRequestParam, Tool as McpTool,
	},
	service::{RequestContext, RoleServer},
};
use tokio::{
	io::{
		AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, DuplexStream,
	},
	sync::mpsc::{self, UnboundedReceiver, UnboundedSender},
};
// self
use crate::{
	_prelude::*,
	error::ServerError,
	obs::{LogHandle, LogLevel},
	tools::{ToolDefinition, ToolDispatcher, tool_definitions},
};

/// Name reported in `initialize`.
pub const SERVER_NAME: &str = "ebay-broker";

const PARSE_ERROR: i64 = -32700;
const INVALID_REQUEST: i64 = -32600;
const METHOD_NOT_FOUND: i64 = -32601;
const INVALID_PARAMS: i64 = -32602;
const PIPE_CAPACITY: usize = 64 * 1024;
const SERVED_METHODS: [&str; 5] =
	["initialize", "ping", "tools/list", "tools/call", "logging/setLevel"];

/// Serves [`ToolDispatcher`] to an MCP host.
#[derive(Debug)]
pub struct ToolServer {
	dispatcher: ToolDispatcher,
	log_handle: Option<LogHandle>,
}
impl ToolServer {
	/// Creates a server; `log_handle` backs `logging/setLevel` when present.
	pub fn new(dispatcher: ToolDispatcher, log_handle: Option<LogHandle>) -> Self {
		Self { dispatcher, log_handle }
	}

	/// Serves stdin/stdout until the host closes stdin.
	pub async fn run_stdio(self) -> Result<(), ServerError> {
		self.run(BufReader::new(tokio::io::stdin()), tokio::io::stdout()).await
	}

	/// Serves `reader`/`writer` until `reader` reaches end of input.
	pub async fn run<R, W>(self, reader: R, writer: W) -> Result<(), ServerError>
	where
		R: 'static + AsyncBufRead + Send + Unpin,
		W: 'static + AsyncWrite + Send + Unpin,
	{
		let (inbound, session_in) = tokio::io::duplex(PIPE_CAPACITY);
		let (session_out, outbound) = tokio::io::duplex(PIPE_CAPACITY);
		let (replies_tx, replies_rx) = mpsc::unbounded_channel();
		let requests = tokio::spawn(pump_requests(reader, inbound, replies_tx));
		let replies = tokio::spawn(pump_replies(outbound, writer, replies_rx));

		tracing::info!(server = SERVER_NAME, "Tool server listening.");

		let session = ServiceExt::serve(self, (session_in, session_out))
			.await
			.map_err(|e| ServerError::Initialize { message: e.to_string() })?;

		session.waiting().await?;
		requests.await??;
		replies.await??;

		tracing::info!("Input closed; tool server stopping.");

		Ok(())
	}
}
impl ServerHandler for ToolServer {
	fn get_info(&self) -> ServerInfo {
		ServerInfo {
			capabilities: ServerCapabilities::builder().enable_logging().enable_tools().build(),
			server_info: implementation(),
			instructions: Some(
				"eBay search and REST tools. Failures are returned as text starting with `Error: `."
					.into(),
			),
			..Default::default()
		}
	}

	async fn list_tools(
		&self,
		_request: Option<PaginatedRequestParam>,
		_context: RequestContext<RoleServer>,
	) -> Result<ListToolsResult, ErrorData> {
		Ok(ListToolsResult::with_all_items(tool_definitions().into_iter().map(mcp_tool).collect()))
	}

	async fn call_tool(
		&self,
		request: CallToolRequestParam,
		_context: RequestContext<RoleServer>,
	) -> Result<CallToolResult, ErrorData> {
		let output = self.dispatcher.call(&request.name, request.arguments.as_ref()).await;
		let content = vec![Content::text(output.text)];

		Ok(if output.is_error {
			CallToolResult::error(content)
		} else {
			CallToolResult::success(content)
		})
	}

	async fn set_level(
		&self,
		request: SetLevelRequestParam,
		_context: RequestContext<RoleServer>,
	) -> Result<(), ErrorData> {
		if let Some(handle) = &self.log_handle {
			handle
				.set_level(request.level.into())
				.map_err(|e| ErrorData::internal_error(e.to_string(), None))?;
		}

		Ok(())
	}
}

impl From<LoggingLevel> for LogLevel {
	fn from(level: LoggingLevel) -> Self {
		match level {
			LoggingLevel::Debug => LogLevel::Debug,
			LoggingLevel::Info => LogLevel::Info,
			LoggingLevel::Notice => LogLevel::Notice,
			LoggingLevel::Warning => LogLevel::Warning,
			LoggingLevel::Error => LogLevel::Error,
			LoggingLevel::Critical => LogLevel::Critical,
			LoggingLevel::Alert => LogLevel::Alert,
			LoggingLevel::Emergency => LogLevel::Emergency,
		}
	}
}

/// What the screening pump does with one inbound line.
#[derive(Debug, PartialEq)]
enum Screened {
	Forward,
	Reply(Value),
	Drop,
}

fn implementation() -> Implementation {
	let mut implementation = Implementation::from_build_env();

	implementation.name = SERVER_NAME.into();
	implementation.version = env!("CARGO_PKG_VERSION").into();

	implementation
}

fn mcp_tool(definition: ToolDefinition) -> McpTool {
	let schema = match definition.input_schema {
		Value::Object(schema) => schema,
		_ => Map::new(),
	};

	McpTool::new(definition.name, definition.description, Arc::new(schema))
}

fn screen(line: &[u8]) -> Screened {
	let message = match serde_json::from_slice::<Value>(line) {
		Ok(message) => message,
		Err(e) => {
			tracing::warn!(error = %e, "Answering unparseable message.");

			return Screened::Reply(error_response(
				Value::Null,
				PARSE_ERROR,
				format!("Parse error: {e}"),
			));
		},
	};

	if serde_json::from_value::<ClientJsonRpcMessage>(message.clone()).is_ok() {
		return Screened::Forward;
	}

	// Notifications never get a reply, even malformed ones.
	let Some(id) = message.get("id").filter(|id| !id.is_null()).cloned() else {
		tracing::debug!("Dropping malformed notification.");

		return Screened::Drop;
	};
	let (code, text) = match message.get("method").and_then(Value::as_str) {
		Some(method) if SERVED_METHODS.contains(&method) =>
			(INVALID_PARAMS, format!("Invalid params for {method}")),
		Some(method) => (METHOD_NOT_FOUND, format!("Method not found: {method}")),
		None => (INVALID_REQUEST, "Invalid request".into()),
	};

	Screened::Reply(error_response(id, code, text))
}

fn error_response(id: Value, code: i64, message: String) -> Value {
	serde_json::json!({
		"jsonrpc": "2.0",
		"id": id,
		"error": { "code": code, "message": message },
	})
}

async fn pump_requests<R>(
	mut reader: R,
	mut session: DuplexStream,
	replies: UnboundedSender<Value>,
) -> Result<(), ServerError>
where
	R: AsyncBufRead + Unpin,
{
	let mut line = Vec::new();

	loop {
		line.clear();

		if reader.read_until(b'\n', &mut line).await? == 0 {
			break;
		}

		let message = line.trim_ascii();

		if message.is_empty() {
			continue;
		}

		match screen(message) {
			Screened::Forward => {
				session.write_all(message).await?;
				session.write_all(b"\n").await?;
			},
			// The reply pump only stops once the session is gone.
			Screened::Reply(reply) => {
				let _ = replies.send(reply);
			},
			Screened::Drop => (),
		}
	}

	session.shutdown().await?;

	Ok(())
}

async fn pump_replies<W>(
	session: DuplexStream,
	mut writer: W,
	mut replies: UnboundedReceiver<Value>,
) -> Result<(), ServerError>
where
	W: AsyncWrite + Unpin,
{
	let mut lines = BufReader::new(session).lines();
	let mut replies_open = true;

	loop {
		let mut out = tokio::select! {
			line = lines.next_line() => match line? {
				Some(line) => line,
				None => break,
			},
			reply = replies.recv(), if replies_open => match reply {
				Some(reply) => reply.to_string(),
				None => {
					replies_open = false;

					continue;
				},
			},
		};

		out.push('\n');
		writer.write_all(out.as_bytes()).await?;
		writer.flush().await?;
	}

	while let Ok(reply) = replies.try_recv() {
		writer.write_all(format!("{reply}\n").as_bytes()).await?;
	}

	writer.flush().await?;

	Ok(())
}
