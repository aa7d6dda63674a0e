//! Generic authenticated REST invoker for endpoints the search helpers do not cover.

// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	environment::Environment,
	error::{ArgumentError, HttpError},
	http::ApiHttpClient,
	obs::{self, OperationKind},
};

/// Decoded outcome of a successful call.
#[derive(Clone, Debug, PartialEq)]
pub enum RestResponse {
	/// Body decoded as JSON.
	Json(Value),
	/// Body that is not JSON, returned verbatim.
	Text(String),
	/// Empty body.
	NoContent,
}
impl RestResponse {
	fn from_body(body: String) -> Self {
		if body.is_empty() {
			return Self::NoContent;
		}

		match serde_json::from_str(&body) {
			Ok(json) => Self::Json(json),
			Err(e) => {
				tracing::debug!(error = %e, "Response body is not JSON; returning raw text.");

				Self::Text(body)
			},
		}
	}
}

/// One arbitrary REST call.
#[derive(Clone, Debug, PartialEq)]
pub struct RestCall {
	/// HTTP method, upper-cased.
	pub method: Method,
	/// Path below the environment's base URL.
	pub path: String,
	/// Query parameters, in order; repeated keys are allowed.
	pub params: Vec<(String, String)>,
	/// Optional JSON request body.
	pub json_body: Option<Value>,
}
impl RestCall {
	/// Validates the method name (case-insensitive) and path.
	pub fn new(method: &str, path: impl Into<String>) -> Result<Self, ArgumentError> {
		let method = method.trim();
		let path = path.into();

		if method.is_empty() {
			return Err(ArgumentError::Missing { name: "method" });
		}
		if path.trim().is_empty() {
			return Err(ArgumentError::Missing { name: "path" });
		}

		let method = Method::from_bytes(method.to_uppercase().as_bytes())
			.map_err(|e| ArgumentError::invalid("method", e))?;

		Ok(Self { method, path: path.trim().to_owned(), params: Vec::new(), json_body: None })
	}

	/// Adds query parameters from a JSON object; arrays become repeated keys and nulls are
	/// dropped.
	pub fn with_json_params(mut self, params: &Map<String, Value>) -> Self {
		for (key, value) in params {
			match value {
				Value::Null => {},
				Value::Array(items) =>
					for item in items {
						if let Some(text) = query_text(item) {
							self.params.push((key.clone(), text));
						}
					},
				other =>
					if let Some(text) = query_text(other) {
						self.params.push((key.clone(), text));
					},
			}
		}

		self
	}

	/// Attaches a JSON body.
	pub fn with_json_body(mut self, body: Value) -> Self {
		self.json_body = Some(body);

		self
	}
}

fn query_text(value: &Value) -> Option<String> {
	match value {
		Value::Null => None,
		Value::String(s) => Some(s.clone()),
		other => Some(other.to_string()),
	}
}

/// Issues single bearer-authenticated calls against one environment.
#[derive(Clone, Debug)]
pub struct RestInvoker {
	http_client: ApiHttpClient,
	environment: Environment,
}
impl RestInvoker {
	/// Creates an invoker for `environment`.
	pub fn new(http_client: ApiHttpClient, environment: Environment) -> Self {
		Self { http_client, environment }
	}

	/// Performs `call`; statuses of 400 and above fail with the status, body and environment.
	pub async fn invoke(&self, token: &TokenSecret, call: &RestCall) -> Result<RestResponse> {
		obs::observe(OperationKind::Request, "invoke", async move {
			let url = self.environment.api_url(&call.path)?;

			tracing::info!(method = %call.method, path = url.path(), "Calling eBay REST API.");

			let mut request = self.http_client.bearer(call.method.clone(), url, token)?;

			if !call.params.is_empty() {
				request = request.query(&call.params);
			}
			if let Some(body) = &call.json_body {
				request = request.json(body);
			}

			let reply = self.http_client.send(request).await?;

			if reply.is_error() {
				return Err(HttpError::Status {
					status: reply.status,
					body: reply.body,
					environment: self.environment.name.to_string(),
				}
				.into());
			}

			Ok(RestResponse::from_body(reply.body))
		})
		.await
	}
}
