//! Crate-level error types shared by the token cache, fetchers, and the tool layer.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
///
/// The tool layer renders every variant through [`Display`] behind an `Error: ` prefix, so
/// messages are written to stand on their own.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem (environment name, credentials, client setup).
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// The OAuth endpoint refused to mint a token.
	#[error(transparent)]
	Auth(#[from] AuthError),
	/// A REST call returned an error status.
	#[error(transparent)]
	Http(#[from] HttpError),
	/// A tool argument is missing or malformed.
	#[error(transparent)]
	Argument(#[from] ArgumentError),
	/// Token persistence failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Transport failure (DNS, TCP, TLS, timeout).
	#[error(transparent)]
	Transport(#[from] TransportError),
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// The deployment target is not one of the known environments.
	#[error("Unsupported EBAY_ENV '{name}'. Valid options: {valid}.")]
	UnknownEnvironment {
		/// Normalized name that failed to resolve.
		name: String,
		/// Comma-separated list of accepted names.
		valid: String,
	},
	/// A credential required for the token grant is unset or blank.
	#[error("Missing {name} configuration value.")]
	MissingCredential {
		/// Configuration key of the missing credential.
		name: &'static str,
	},
	/// An endpoint URL could not be parsed or joined.
	#[error("Endpoint URL is invalid.")]
	InvalidUrl {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// The logging subscriber could not be installed or reloaded.
	#[error("Logging setup failed: {message}.")]
	Logging {
		/// Subscriber-supplied failure description.
		message: String,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
impl From<url::ParseError> for ConfigError {
	fn from(source: url::ParseError) -> Self {
		Self::InvalidUrl { source }
	}
}

/// Failures raised while minting a token.
#[derive(Debug, ThisError)]
pub enum AuthError {
	/// The OAuth endpoint answered with a non-success status.
	#[error("Error generating token: {status} {body}")]
	Rejected {
		/// HTTP status code returned by the OAuth endpoint.
		status: u16,
		/// Raw response body.
		body: String,
	},
	/// The OAuth endpoint answered 2xx with a body that is not a token response.
	#[error("Token endpoint returned a malformed response (status {status}).")]
	MalformedResponse {
		/// Structured parsing failure, including the offending field path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code of the response.
		status: u16,
	},
	/// The token response carried a zero or negative `expires_in`.
	#[error("The expires_in value must be positive.")]
	NonPositiveExpiresIn,
	/// The cached token could not be assembled.
	#[error("Unable to build cached token.")]
	TokenBuild(#[from] crate::auth::CachedTokenBuilderError),
}

/// Error statuses returned by REST calls.
#[derive(Debug, ThisError)]
pub enum HttpError {
	/// Any REST call answered with status 400 or above.
	#[error("eBay API error: {status} {body} (env={environment})")]
	Status {
		/// HTTP status code.
		status: u16,
		/// Raw response body.
		body: String,
		/// Name of the environment the call was made against.
		environment: String,
	},
}

/// Tool argument validation failures.
#[derive(Debug, ThisError)]
pub enum ArgumentError {
	/// A required argument is absent or empty.
	#[error("Missing {name}")]
	Missing {
		/// Argument name.
		name: &'static str,
	},
	/// An argument is present but unusable.
	#[error("Invalid {name}: {reason}")]
	Invalid {
		/// Argument name.
		name: &'static str,
		/// Why the value was rejected.
		reason: String,
	},
	/// The host asked for a tool this server does not expose.
	#[error("Unknown tool: {name}")]
	UnknownTool {
		/// Requested tool name.
		name: String,
	},
}
impl ArgumentError {
	/// Builds an [`ArgumentError::Invalid`] from any displayable reason.
	pub fn invalid(name: &'static str, reason: impl Display) -> Self {
		Self::Invalid { name, reason: reason.to_string() }
	}
}

/// Failures that end the MCP session.
#[derive(Debug, ThisError)]
pub enum ServerError {
	/// The host never completed the `initialize` handshake.
	#[error("MCP session failed to start: {message}")]
	Initialize {
		/// SDK-supplied failure description.
		message: String,
	},
	/// Reading from the host or writing to it failed.
	#[error("Tool server stream failed.")]
	Io(#[from] std::io::Error),
	/// The session or one of its pumps panicked or was cancelled.
	#[error("Tool server task failed.")]
	Task(#[from] tokio::task::JoinError),
}

/// Transport-level failures (network, IO, timeouts).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// The request exceeded the fixed timeout and was abandoned.
	#[error("Request timed out after {seconds} seconds.")]
	Timeout {
		/// Configured upper bound in seconds.
		seconds: u64,
	},
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling {url}.")]
	Network {
		/// Target URL (without query).
		url: String,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
}
impl TransportError {
	/// Classifies a reqwest failure against the configured timeout.
	pub fn from_reqwest(err: ReqwestError, timeout_secs: u64) -> Self {
		if err.is_timeout() {
			return Self::Timeout { seconds: timeout_secs };
		}

		let url = err.url().map(|url| {
			let mut url = url.clone();

			url.set_query(None);

			url.to_string()
		});

		Self::Network { url: url.unwrap_or_else(|| "<unknown>".into()), source: Box::new(err) }
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::error::Error as StdError;
	// self
	use super::*;
	use crate::store::StoreError;

	#[test]
	fn store_error_converts_into_error_with_source() {
		let store_error = StoreError::Backend { message: "disk full".into() };
		let error: Error = store_error.clone().into();

		assert!(matches!(error, Error::Storage(_)));
		assert!(error.to_string().contains("disk full"));

		let source =
			StdError::source(&error).expect("Error should expose the original store error.");

		assert_eq!(source.to_string(), store_error.to_string());
	}

	#[test]
	fn http_status_message_names_status_body_and_environment() {
		let error: Error = HttpError::Status {
			status: 404,
			body: "{\"errors\":[]}".into(),
			environment: "sandbox".into(),
		}
		.into();
		let message = error.to_string();

		assert!(message.contains("404"));
		assert!(message.contains("{\"errors\":[]}"));
		assert!(message.contains("env=sandbox"));
	}

	#[test]
	fn missing_credential_names_the_key() {
		let error: Error = ConfigError::MissingCredential { name: "CLIENT_SECRET" }.into();

		assert_eq!(error.to_string(), "Missing CLIENT_SECRET configuration value.");
	}
}
