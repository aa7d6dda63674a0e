//! Transport primitives shared by the token grant and REST calls.
//!
//! [`ApiHttpClient`] owns the single reqwest client used by the crate. Every request goes
//! through [`ApiHttpClient::send`], which enforces the fixed timeout and hands back the
//! status plus the raw body so callers can decide how to decode it.

// std
use std::{ops::Deref, time::Duration as StdDuration};
// crates.io
use reqwest::{
	RequestBuilder,
	header::{AUTHORIZATION, CONTENT_TYPE, HeaderValue},
};
// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	error::{ConfigError, TransportError},
};

/// Upper bound for every outbound call, in seconds. There is no retry after a timeout.
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Query parameters sent with a REST call, kept sorted for stable URLs.
pub type QueryParams = BTreeMap<String, String>;

/// Status and body of a completed HTTP exchange.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpReply {
	/// HTTP status code.
	pub status: u16,
	/// Response body decoded as text.
	pub body: String,
}
impl HttpReply {
	/// Returns `true` for status 400 and above.
	pub fn is_error(&self) -> bool {
		self.status >= 400
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[derive(Clone, Debug)]
pub struct ApiHttpClient {
	client: ReqwestClient,
	timeout_secs: u64,
}
impl ApiHttpClient {
	/// Builds a client that abandons requests after [`REQUEST_TIMEOUT_SECS`].
	pub fn new() -> Result<Self, ConfigError> {
		Self::with_timeout(REQUEST_TIMEOUT_SECS)
	}

	/// Builds a client with a custom timeout, in seconds.
	pub fn with_timeout(timeout_secs: u64) -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder()
			.timeout(StdDuration::from_secs(timeout_secs))
			.build()
			.map_err(ConfigError::http_client_build)?;

		Ok(Self { client, timeout_secs })
	}

	/// Wraps an existing reqwest [`ReqwestClient`]; its own timeout settings apply.
	pub fn with_client(client: ReqwestClient) -> Self {
		Self { client, timeout_secs: REQUEST_TIMEOUT_SECS }
	}

	/// Starts a bearer-authenticated JSON request.
	pub fn bearer(&self, method: Method, url: Url, token: &TokenSecret) -> Result<RequestBuilder> {
		let mut auth = HeaderValue::from_str(&format!("Bearer {}", token.expose()))
			.map_err(ConfigError::http_client_build)?;

		auth.set_sensitive(true);

		Ok(self
			.client
			.request(method, url)
			.header(AUTHORIZATION, auth)
			.header(CONTENT_TYPE, "application/json"))
	}

	/// Executes one request and reads the full body as text.
	pub async fn send(&self, request: RequestBuilder) -> Result<HttpReply> {
		let response = request
			.send()
			.await
			.map_err(|e| TransportError::from_reqwest(e, self.timeout_secs))?;
		let status = response.status().as_u16();
		let body =
			response.text().await.map_err(|e| TransportError::from_reqwest(e, self.timeout_secs))?;

		Ok(HttpReply { status, body })
	}
}
impl AsRef<ReqwestClient> for ApiHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.client
	}
}
impl Deref for ApiHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.client
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use httpmock::prelude::*;
	use reqwest::Method;
	// self
	use super::*;
	use crate::error::Error;

	#[tokio::test]
	async fn bearer_requests_carry_auth_and_json_headers() {
		let server = MockServer::start_async().await;
		let mock = server
			.mock_async(|when, then| {
				when.method(GET)
					.path("/ping")
					.header("authorization", "Bearer bearer-token")
					.header("content-type", "application/json");
				then.status(418).body("teapot");
			})
			.await;
		let client = ApiHttpClient::new().expect("HTTP client should build.");
		let url = Url::parse(&server.url("/ping")).expect("Mock URL should parse.");
		let request = client
			.bearer(Method::GET, url, &TokenSecret::new("bearer-token"))
			.expect("Bearer request should build.");
		let reply = client.send(request).await.expect("Mock exchange should complete.");

		assert_eq!(reply, HttpReply { status: 418, body: "teapot".into() });
		assert!(reply.is_error());

		mock.assert_async().await;
	}

	#[tokio::test]
	async fn slow_responses_surface_as_timeouts() {
		let server = MockServer::start_async().await;

		server
			.mock_async(|when, then| {
				when.method(GET).path("/slow");
				then.status(200).delay(StdDuration::from_millis(2_500));
			})
			.await;

		let client = ApiHttpClient::with_timeout(1).expect("HTTP client should build.");
		let url = Url::parse(&server.url("/slow")).expect("Mock URL should parse.");
		let request = client
			.bearer(Method::GET, url, &TokenSecret::new("t"))
			.expect("Bearer request should build.");
		let err = client.send(request).await.expect_err("Request should time out.");

		assert!(matches!(err, Error::Transport(TransportError::Timeout { seconds: 1 })));
	}
}
