//! Client-credentials token cache with file-backed persistence and expiry-aware reuse.
//!
//! [`TokenCache::get_token`] reads the store once, returns the stored bearer token when it
//! was minted for the same environment/credential/scope key and is still strictly before its
//! expiry, and otherwise performs exactly one client-credentials grant. A fresh token
//! overwrites the store in full. Failed grants are terminal for the call; nothing retries.

// crates.io
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
// self
use crate::{
	_prelude::*,
	auth::{CachedToken, Credentials, TokenSecret},
	environment::Environment,
	error::AuthError,
	http::{ApiHttpClient, HttpReply},
	obs::{self, OperationKind},
	store::TokenStore,
};

const GRANT_TYPE: &str = "client_credentials";

#[derive(Deserialize)]
struct TokenResponse {
	access_token: String,
	expires_in: i64,
}

/// Process-local token cache bound to one environment and scope.
#[derive(Clone)]
pub struct TokenCache {
	store: Arc<dyn TokenStore>,
	http_client: ApiHttpClient,
	environment: Environment,
	scope: String,
}
impl TokenCache {
	/// Creates a cache over `store` that mints tokens from `environment`'s OAuth endpoint.
	pub fn new(
		store: Arc<dyn TokenStore>,
		http_client: ApiHttpClient,
		environment: Environment,
		scope: impl Into<String>,
	) -> Self {
		Self { store, http_client, environment, scope: scope.into() }
	}

	/// Environment the cache mints tokens for.
	pub fn environment(&self) -> &Environment {
		&self.environment
	}

	/// Returns a valid bearer token, minting and persisting a new one when needed.
	pub async fn get_token(&self, credentials: &Credentials) -> Result<TokenSecret> {
		obs::observe(OperationKind::Token, "get_token", async move {
			let key = credentials.cache_key(self.environment.name, &self.scope);
			let now = OffsetDateTime::now_utc();

			tracing::info!(
				env = %self.environment.name,
				oauth_url = %self.environment.oauth_url,
				client_id_set = !credentials.client_id().is_empty(),
				client_secret_set = true,
				"Resolving eBay access token."
			);

			if let Some(cached) = self
				.store
				.load()
				.await?
				.filter(|token| token.matches_key(&key) && token.is_valid_at(now))
			{
				tracing::debug!(expires_at = %cached.expires_at, "Reusing cached access token.");

				return Ok(cached.access_token);
			}

			let token = self.mint(credentials, key).await?;
			let access_token = token.access_token.clone();

			self.store.save(token).await?;

			Ok(access_token)
		})
		.await
	}

	async fn mint(&self, credentials: &Credentials, key: String) -> Result<CachedToken> {
		let form = [("grant_type", GRANT_TYPE), ("scope", self.scope.as_str())];
		let request = self
			.http_client
			.post(self.environment.oauth_url.clone())
			.header(AUTHORIZATION, credentials.basic_authorization())
			.header(CONTENT_TYPE, "application/x-www-form-urlencoded")
			.header(ACCEPT, "application/json")
			.form(&form);
		let reply = self.http_client.send(request).await?;

		if !(200..300).contains(&reply.status) {
			tracing::warn!(status = reply.status, "Token endpoint rejected the grant.");

			return Err(AuthError::Rejected { status: reply.status, body: reply.body }.into());
		}

		let issued_at = OffsetDateTime::now_utc();
		let response = decode_token_response(&reply)?;

		if response.expires_in <= 0 {
			return Err(AuthError::NonPositiveExpiresIn.into());
		}

		let token = CachedToken::builder()
			.access_token(response.access_token)
			.issued_at(issued_at)
			.expires_in(Duration::seconds(response.expires_in))
			.cache_key(key)
			.build()
			.map_err(AuthError::from)?;

		tracing::info!(expires_at = %token.expires_at, "Minted new eBay access token.");

		Ok(token)
	}
}
impl Debug for TokenCache {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenCache")
			.field("environment", &self.environment.name)
			.field("scope", &self.scope)
			.finish()
	}
}

fn decode_token_response(reply: &HttpReply) -> Result<TokenResponse, AuthError> {
	let mut de = serde_json::Deserializer::from_str(&reply.body);

	serde_path_to_error::deserialize(&mut de)
		.map_err(|source| AuthError::MalformedResponse { source, status: reply.status })
}
