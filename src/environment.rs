//! Deployment targets (production/sandbox) and their OAuth + REST endpoints.

// self
use crate::{_prelude::*, error::ConfigError};

/// Closed set of deployment targets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvironmentName {
	#[default]
	/// Live marketplace.
	Production,
	/// eBay developer sandbox.
	Sandbox,
}
impl EnvironmentName {
	/// Every accepted environment, in the order error messages list them.
	pub const ALL: [EnvironmentName; 2] = [EnvironmentName::Production, EnvironmentName::Sandbox];

	/// Returns the configuration label for the environment.
	pub const fn as_str(self) -> &'static str {
		match self {
			EnvironmentName::Production => "production",
			EnvironmentName::Sandbox => "sandbox",
		}
	}

	const fn oauth_url(self) -> &'static str {
		match self {
			EnvironmentName::Production => "https://api.ebay.com/identity/v1/oauth2/token",
			EnvironmentName::Sandbox => "https://api.sandbox.ebay.com/identity/v1/oauth2/token",
		}
	}

	const fn api_base_url(self) -> &'static str {
		match self {
			EnvironmentName::Production => "https://api.ebay.com",
			EnvironmentName::Sandbox => "https://api.sandbox.ebay.com",
		}
	}
}
impl Display for EnvironmentName {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for EnvironmentName {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let normalized = s.trim().to_lowercase();

		Self::ALL.into_iter().find(|name| name.as_str() == normalized).ok_or_else(|| {
			ConfigError::UnknownEnvironment {
				name: normalized,
				valid: Self::ALL.map(EnvironmentName::as_str).join(", "),
			}
		})
	}
}

/// Immutable endpoint record for one deployment target.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
	/// Deployment target.
	pub name: EnvironmentName,
	/// OAuth token endpoint used for the client-credentials grant.
	pub oauth_url: Url,
	/// Base URL every REST path is appended to.
	pub api_base_url: Url,
}
impl Environment {
	/// Resolves an optional, case-insensitive environment name; unset means production.
	pub fn resolve(name: Option<&str>) -> Result<Self, ConfigError> {
		let name = match name {
			Some(raw) if !raw.trim().is_empty() => raw.parse()?,
			_ => EnvironmentName::default(),
		};

		Self::fixed(name)
	}

	/// Returns the built-in endpoints for `name`.
	pub fn fixed(name: EnvironmentName) -> Result<Self, ConfigError> {
		Ok(Self {
			name,
			oauth_url: Url::parse(name.oauth_url())?,
			api_base_url: Url::parse(name.api_base_url())?,
		})
	}

	/// Builds an environment whose endpoints point elsewhere (proxies, local mocks).
	pub fn with_endpoints(name: EnvironmentName, oauth_url: Url, api_base_url: Url) -> Self {
		Self { name, oauth_url, api_base_url }
	}

	/// Joins a REST path onto the base URL, adding the leading `/` when missing.
	pub fn api_url(&self, path: &str) -> Result<Url, ConfigError> {
		let base = self.api_base_url.as_str().trim_end_matches('/');

		Ok(Url::parse(&format!("{base}{}", normalize_path(path)))?)
	}
}

/// Ensures a REST path starts with a single leading separator.
pub fn normalize_path(path: &str) -> String {
	if path.starts_with('/') { path.to_owned() } else { format!("/{path}") }
}
