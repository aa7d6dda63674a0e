//! Process configuration, read once at entry and passed down explicitly.

// self
use crate::{
	_prelude::*,
	auth::{CLIENT_ID_KEY, CLIENT_SECRET_KEY, Credentials},
	environment::Environment,
	error::ConfigError,
	obs::DEFAULT_LOG_FILTER,
	store::file::DEFAULT_TOKEN_FILE,
};

/// Configuration key selecting the deployment target.
pub const ENVIRONMENT_KEY: &str = "EBAY_ENV";
/// Configuration key overriding the token cache path.
pub const TOKEN_FILE_KEY: &str = "EBAY_TOKEN_FILE";
/// Configuration key overriding the OAuth scope.
pub const OAUTH_SCOPE_KEY: &str = "EBAY_OAUTH_SCOPE";
/// Configuration key holding the initial log filter.
pub const LOG_LEVEL_KEY: &str = "EBAY_LOG_LEVEL";
/// Scope requested when none is configured.
pub const DEFAULT_OAUTH_SCOPE: &str = "https://api.ebay.com/oauth/api_scope";

/// Resolved process configuration.
///
/// Credentials stay optional here: their absence fails individual tool calls through
/// [`Config::credentials`], not process start-up.
#[derive(Clone)]
pub struct Config {
	/// Deployment target and its endpoints.
	pub environment: Environment,
	/// Client identifier, if configured.
	pub client_id: Option<String>,
	/// Client secret, if configured.
	pub client_secret: Option<String>,
	/// Token cache file.
	pub token_file: PathBuf,
	/// OAuth scope requested by the client-credentials grant.
	pub oauth_scope: String,
	/// Initial log filter directive.
	pub log_filter: String,
}
impl Config {
	/// Reads the process environment.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|key| std::env::var(key).ok())
	}

	/// Builds the configuration from an arbitrary key lookup; the environment name is
	/// resolved eagerly so an unknown name fails here.
	pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let non_blank = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
		let environment = Environment::resolve(lookup(ENVIRONMENT_KEY).as_deref())?;

		Ok(Self {
			environment,
			client_id: lookup(CLIENT_ID_KEY),
			client_secret: lookup(CLIENT_SECRET_KEY),
			token_file: non_blank(TOKEN_FILE_KEY)
				.map(PathBuf::from)
				.unwrap_or_else(|| PathBuf::from(DEFAULT_TOKEN_FILE)),
			oauth_scope: non_blank(OAUTH_SCOPE_KEY)
				.map(|scope| scope.trim().to_owned())
				.unwrap_or_else(|| DEFAULT_OAUTH_SCOPE.into()),
			log_filter: non_blank(LOG_LEVEL_KEY).unwrap_or_else(|| DEFAULT_LOG_FILTER.into()),
		})
	}

	/// Validates the configured credential pair for one tool call.
	pub fn credentials(&self) -> Result<Credentials, ConfigError> {
		Credentials::new(self.client_id.as_deref(), self.client_secret.as_deref())
	}
}
impl Debug for Config {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Config")
			.field("environment", &self.environment.name)
			.field("client_id_set", &self.client_id.is_some())
			.field("client_secret_set", &self.client_secret.is_some())
			.field("token_file", &self.token_file)
			.field("oauth_scope", &self.oauth_scope)
			.field("log_filter", &self.log_filter)
			.finish()
	}
}
