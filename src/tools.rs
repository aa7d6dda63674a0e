//! Tool catalog and argument handling for agent hosts.
//!
//! Every call resolves to a [`ToolOutput`]: success payloads are pretty-printed JSON (or the
//! raw body for non-JSON responses) and every failure is rendered as `Error: <message>`, so a
//! host can tell them apart by text alone.

// self
use crate::{
	_prelude::*,
	client::EbayClient,
	config::Config,
	error::ArgumentError,
	project::{ListingRecord, SaleRecord},
	rest::{RestCall, RestResponse},
	search::{BuyingOption, DEFAULT_LIMIT, SearchRequest},
};

/// Tools exposed to the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tool {
	/// Paginated search over active listings.
	ListActiveListings,
	/// Paginated search over sold listings.
	ListSoldListings,
	/// Arbitrary authenticated REST call.
	EbayApiRequest,
	/// Deprecated active search keyed by `ammount`.
	ListAuction,
}
impl Tool {
	/// Every tool, in listing order.
	pub const ALL: [Tool; 4] =
		[Tool::ListAuction, Tool::ListActiveListings, Tool::ListSoldListings, Tool::EbayApiRequest];

	/// Wire name of the tool.
	pub const fn name(self) -> &'static str {
		match self {
			Tool::ListActiveListings => "list-active-listings",
			Tool::ListSoldListings => "list-sold-listings",
			Tool::EbayApiRequest => "ebay-api-request",
			Tool::ListAuction => "list-auction",
		}
	}

	/// Human-readable description shown to the host.
	pub const fn description(self) -> &'static str {
		match self {
			Tool::ListActiveListings =>
				"Search active eBay listings (auctions + fixed price). Returns structured fields \
				 like price, currency, and end date when available.",
			Tool::ListSoldListings =>
				"Search sold eBay listings (Marketplace Insights API). Requires the \
				 buy.marketplace.insights scope.",
			Tool::EbayApiRequest =>
				"Call any eBay REST API endpoint (Browse, Buy, Order, Inventory, etc.). Provide the \
				 path starting after the base URL, e.g. `/buy/browse/v1/item_summary/search`.",
			Tool::ListAuction =>
				"Scan ebay for auctions. Deprecated: prefer list-active-listings, which returns the \
				 same records.",
		}
	}

	/// JSON schema of the tool's arguments.
	pub fn input_schema(self) -> Value {
		let category_ids = serde_json::json!({
			"type": "array",
			"items": { "type": "integer" },
			"description": "Optional category IDs to restrict search results."
		});

		match self {
			Tool::ListActiveListings => serde_json::json!({
				"type": "object",
				"properties": {
					"query": { "type": "string", "description": "The search query." },
					"limit": {
						"type": "integer",
						"description": "Maximum number of listings to return (paginated)."
					},
					"buying_options": {
						"type": "array",
						"items": { "type": "string" },
						"description": "Buying options to include (AUCTION, FIXED_PRICE)."
					},
					"category_ids": category_ids,
					"sort": {
						"type": "string",
						"description": "Optional sort order (e.g. BEST_MATCH, END_DATE_SOONEST)."
					}
				},
				"required": ["query", "limit"]
			}),
			Tool::ListSoldListings => serde_json::json!({
				"type": "object",
				"properties": {
					"query": { "type": "string", "description": "The search query." },
					"limit": {
						"type": "integer",
						"description": "Maximum number of sold listings to return (paginated)."
					},
					"category_ids": category_ids,
					"sort": {
						"type": "string",
						"description": "Optional sort order (e.g. SOLD_DATE_DESC)."
					}
				},
				"required": ["query", "limit"]
			}),
			Tool::EbayApiRequest => serde_json::json!({
				"type": "object",
				"properties": {
					"method": {
						"type": "string",
						"description": "HTTP method to use (GET, POST, PUT, PATCH, DELETE)."
					},
					"path": {
						"type": "string",
						"description": "API path, e.g. /buy/browse/v1/item_summary/search."
					},
					"params": { "type": "object", "description": "Query parameters for the request." },
					"json_body": {
						"type": "object",
						"description": "JSON request body for POST/PUT/PATCH requests."
					}
				},
				"required": ["method", "path"]
			}),
			Tool::ListAuction => serde_json::json!({
				"type": "object",
				"properties": {
					"query": {
						"type": "string",
						"description": "The query to search on ebay. This should just be a name not a description."
					},
					"ammount": {
						"type": "integer",
						"description": "The ammount of results to fetch. This should be a whole non negative number."
					},
					"buying_options": {
						"type": "array",
						"items": { "type": "string" },
						"description": "Buying options to include (e.g., AUCTION, FIXED_PRICE). Defaults to both."
					},
					"category_ids": category_ids
				},
				"required": ["query", "ammount"]
			}),
		}
	}

	/// Catalog entry for this tool.
	pub fn definition(self) -> ToolDefinition {
		ToolDefinition {
			name: self.name(),
			description: self.description(),
			input_schema: self.input_schema(),
		}
	}
}
impl Display for Tool {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.name())
	}
}
impl FromStr for Tool {
	type Err = ArgumentError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Tool::ALL
			.into_iter()
			.find(|tool| tool.name() == s)
			.ok_or_else(|| ArgumentError::UnknownTool { name: s.to_owned() })
	}
}

/// Catalog entry in the host's `tools/list` shape.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
	/// Wire name.
	pub name: &'static str,
	/// Description.
	pub description: &'static str,
	/// Argument schema.
	pub input_schema: Value,
}

/// Returns the full tool catalog.
pub fn tool_definitions() -> Vec<ToolDefinition> {
	Tool::ALL.into_iter().map(Tool::definition).collect()
}

/// Text result of one tool call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToolOutput {
	/// Rendered payload, or `Error: ...` on failure.
	pub text: String,
	/// Whether `text` describes a failure.
	pub is_error: bool,
}
impl ToolOutput {
	/// Successful output.
	pub fn success(text: impl Into<String>) -> Self {
		Self { text: text.into(), is_error: false }
	}

	/// Failure output with the conventional `Error: ` prefix.
	pub fn error(error: impl Display) -> Self {
		Self { text: format!("Error: {error}"), is_error: true }
	}
}

const NO_AUCTIONS: &str = "No auctions found";

enum Payload {
	Listings(Vec<ListingRecord>),
	Auctions(Vec<ListingRecord>),
	Sales(Vec<SaleRecord>),
	Response(RestResponse),
}
impl Payload {
	fn render(self) -> Result<String, serde_json::Error> {
		match self {
			Payload::Listings(records) => serde_json::to_string_pretty(&records),
			Payload::Auctions(records) if records.is_empty() => Ok(NO_AUCTIONS.into()),
			Payload::Auctions(records) => serde_json::to_string_pretty(&records),
			Payload::Sales(records) => serde_json::to_string_pretty(&records),
			Payload::Response(RestResponse::Json(body)) => serde_json::to_string_pretty(&body),
			Payload::Response(RestResponse::Text(body)) => Ok(body),
			Payload::Response(RestResponse::NoContent) => Ok("No content".into()),
		}
	}
}

/// Routes tool calls to the [`EbayClient`], validating credentials and arguments per call.
#[derive(Clone, Debug)]
pub struct ToolDispatcher {
	client: EbayClient,
	config: Config,
}
impl ToolDispatcher {
	/// Creates a dispatcher that reads credentials from `config` on every call.
	pub fn new(client: EbayClient, config: Config) -> Self {
		Self { client, config }
	}

	/// Builds the client from `config` and wraps it.
	pub fn from_config(config: Config) -> Result<Self> {
		Ok(Self::new(EbayClient::from_config(&config)?, config))
	}

	/// Runs `name` with `arguments`; never fails, errors are rendered into the output.
	pub async fn call(&self, name: &str, arguments: Option<&Map<String, Value>>) -> ToolOutput {
		tracing::info!(tool = name, "Handling tool call.");

		match self.dispatch(name, arguments).await.map(|payload| payload.render()) {
			Ok(Ok(text)) => ToolOutput::success(text),
			Ok(Err(e)) => {
				tracing::error!(tool = name, error = %e, "Failed to render tool output.");

				ToolOutput::error(e)
			},
			Err(e) => {
				tracing::error!(tool = name, error = %e, "eBay tool call failed.");

				ToolOutput::error(e)
			},
		}
	}

	async fn dispatch(&self, name: &str, arguments: Option<&Map<String, Value>>) -> Result<Payload> {
		let tool = name.parse::<Tool>()?;
		let args = arguments.ok_or(ArgumentError::Missing { name: "arguments" })?;
		let credentials = self.config.credentials()?;

		match tool {
			Tool::ListActiveListings => {
				let request = active_request(args, &["limit", "ammount"])?;

				Ok(Payload::Listings(self.client.search_active(&credentials, &request).await?))
			},
			Tool::ListAuction => {
				tracing::warn!(
					"The list-auction tool is deprecated; use list-active-listings instead."
				);

				required_amount(args)?;

				let request = active_request(args, &["ammount"])?;

				Ok(Payload::Auctions(self.client.search_active(&credentials, &request).await?))
			},
			Tool::ListSoldListings => {
				let request = search_request(args, &["limit"])?;

				Ok(Payload::Sales(self.client.search_sold(&credentials, &request).await?))
			},
			Tool::EbayApiRequest =>
				Ok(Payload::Response(self.client.request(&credentials, &rest_call(args)?).await?)),
		}
	}
}

fn search_request(
	args: &Map<String, Value>,
	limit_keys: &[&'static str],
) -> Result<SearchRequest, ArgumentError> {
	let query = optional_str(args, "query")?.unwrap_or_default();
	let mut request = SearchRequest::new(query, limit(args, limit_keys)?)?;

	if let Some(ids) = category_ids(args)? {
		request = request.with_category_ids(ids);
	}
	if let Some(sort) = optional_str(args, "sort")?.filter(|sort| !sort.trim().is_empty()) {
		request = request.with_sort(sort);
	}

	Ok(request)
}

fn active_request(
	args: &Map<String, Value>,
	limit_keys: &[&'static str],
) -> Result<SearchRequest, ArgumentError> {
	let request = search_request(args, limit_keys)?;

	Ok(match buying_options(args)? {
		Some(options) => request.with_buying_options(options),
		None => request,
	})
}

fn rest_call(args: &Map<String, Value>) -> Result<RestCall, ArgumentError> {
	let method = optional_str(args, "method")?.unwrap_or_default();
	let path = optional_str(args, "path")?.unwrap_or_default();
	let mut call = RestCall::new(method, path)?;

	match args.get("params") {
		None | Some(Value::Null) => {},
		Some(Value::Object(params)) => call = call.with_json_params(params),
		Some(_) => return Err(ArgumentError::invalid("params", "must be an object")),
	}
	if let Some(body) = args.get("json_body").filter(|body| !body.is_null()) {
		call = call.with_json_body(body.clone());
	}

	Ok(call)
}

fn optional_str<'a>(
	args: &'a Map<String, Value>,
	name: &'static str,
) -> Result<Option<&'a str>, ArgumentError> {
	match args.get(name) {
		None | Some(Value::Null) => Ok(None),
		Some(Value::String(s)) => Ok(Some(s.as_str())),
		Some(_) => Err(ArgumentError::invalid(name, "must be a string")),
	}
}

// Missing, null, and zero select the default; the first present key wins.
fn limit(args: &Map<String, Value>, keys: &[&'static str]) -> Result<usize, ArgumentError> {
	// Null and zero both mean "not given", so a later key can still supply the limit.
	let Some((name, value)) = keys.iter().find_map(|key| {
		args.get(*key).filter(|v| !v.is_null() && v.as_u64() != Some(0)).map(|v| (*key, v))
	}) else {
		return Ok(DEFAULT_LIMIT);
	};

	match value.as_u64() {
		Some(n) => usize::try_from(n).map_err(|e| ArgumentError::invalid(name, e)),
		None if value.as_i64().is_some() => Err(ArgumentError::invalid(name, "must not be negative")),
		None => Err(ArgumentError::invalid(name, "must be a whole number")),
	}
}

fn required_amount(args: &Map<String, Value>) -> Result<(), ArgumentError> {
	match args.get("ammount") {
		None | Some(Value::Null) => Err(ArgumentError::Missing { name: "ammount" }),
		Some(value) if value.as_u64() == Some(0) =>
			Err(ArgumentError::invalid("ammount", "must be a positive integer")),
		Some(_) => Ok(()),
	}
}

fn buying_options(args: &Map<String, Value>) -> Result<Option<Vec<BuyingOption>>, ArgumentError> {
	let items = match args.get("buying_options") {
		None | Some(Value::Null) => return Ok(None),
		Some(Value::Array(items)) => items,
		Some(Value::String(single)) => return Ok(Some(vec![single.parse()?])),
		Some(_) => return Err(ArgumentError::invalid("buying_options", "must be an array")),
	};

	items
		.iter()
		.map(|item| match item {
			Value::String(s) => s.parse(),
			_ => Err(ArgumentError::invalid("buying_options", "entries must be strings")),
		})
		.collect::<Result<Vec<_>, _>>()
		.map(|options| Some(options).filter(|options| !options.is_empty()))
}

fn category_ids(args: &Map<String, Value>) -> Result<Option<Vec<u64>>, ArgumentError> {
	let items = match args.get("category_ids") {
		None | Some(Value::Null) => return Ok(None),
		Some(Value::Array(items)) => items,
		Some(_) => return Err(ArgumentError::invalid("category_ids", "must be an array")),
	};

	items
		.iter()
		.map(|item| match item {
			Value::Number(n) => n.as_u64(),
			Value::String(s) => s.trim().parse().ok(),
			_ => None,
		})
		.map(|id| id.ok_or_else(|| ArgumentError::invalid("category_ids", "entries must be integers")))
		.collect::<Result<Vec<_>, _>>()
		.map(Some)
}
