//! Client id/secret pair used for the client-credentials grant.

// crates.io
use base64::{
	Engine as _,
	engine::general_purpose::{STANDARD, STANDARD_NO_PAD},
};
use sha2::{Digest, Sha256};
// self
use crate::{
	_prelude::*, auth::TokenSecret, environment::EnvironmentName, error::ConfigError,
};

/// Configuration key holding the client identifier.
pub const CLIENT_ID_KEY: &str = "CLIENT_ID";
/// Configuration key holding the client secret.
pub const CLIENT_SECRET_KEY: &str = "CLIENT_SECRET";

/// Validated client credentials. Never persisted; `Debug` redacts the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
	client_id: String,
	client_secret: TokenSecret,
}
impl Credentials {
	/// Validates both halves of the pair; blank values count as missing.
	pub fn new(client_id: Option<&str>, client_secret: Option<&str>) -> Result<Self, ConfigError> {
		let client_id = present(client_id)
			.ok_or(ConfigError::MissingCredential { name: CLIENT_ID_KEY })?;
		let client_secret = present(client_secret)
			.ok_or(ConfigError::MissingCredential { name: CLIENT_SECRET_KEY })?;

		Ok(Self { client_id: client_id.to_owned(), client_secret: TokenSecret::new(client_secret) })
	}

	/// Returns the client identifier.
	pub fn client_id(&self) -> &str {
		&self.client_id
	}

	/// Renders the HTTP Basic `Authorization` value, `base64(client_id:client_secret)`.
	pub fn basic_authorization(&self) -> String {
		let raw = format!("{}:{}", self.client_id, self.client_secret.expose());

		format!("Basic {}", STANDARD.encode(raw))
	}

	/// Stable cache key for tokens minted with this pair against `environment` and `scope`.
	///
	/// The key is a base64 (no padding) SHA-256 digest, so the file never holds the secret.
	pub fn cache_key(&self, environment: EnvironmentName, scope: &str) -> String {
		let mut hasher = Sha256::new();

		for part in [
			environment.as_str(),
			self.client_id.as_str(),
			self.client_secret.expose(),
			scope,
		] {
			hasher.update(part.as_bytes());
			hasher.update([0]);
		}

		STANDARD_NO_PAD.encode(hasher.finalize())
	}
}
impl Debug for Credentials {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Credentials")
			.field("client_id_set", &!self.client_id.is_empty())
			.field("client_secret_set", &!self.client_secret.expose().is_empty())
			.finish()
	}
}

fn present(value: Option<&str>) -> Option<&str> {
	value.filter(|value| !value.trim().is_empty())
}
