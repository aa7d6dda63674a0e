//! Cached bearer token record, lifecycle helpers, and builder.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Lifecycle status for a cached token at a given instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenStatus {
	/// Token can still be presented.
	Active,
	/// Token reached its expiry instant.
	Expired,
}

/// Errors produced by [`CachedTokenBuilder`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum CachedTokenBuilderError {
	/// Issued when no access token value was provided.
	#[error("Access token is required.")]
	MissingAccessToken,
	/// Issued when no expiry (absolute or relative) was configured.
	#[error("Expiry must be supplied via expires_at or expires_in.")]
	MissingExpiry,
}

/// Bearer token persisted as the sole record of the cache file.
///
/// `expires_at` is always UTC and serialized as RFC 3339.
#[derive(Clone, Serialize, Deserialize)]
pub struct CachedToken {
	/// Access token secret; callers must avoid logging it.
	pub access_token: TokenSecret,
	/// Absolute expiry instant.
	#[serde(with = "time::serde::rfc3339")]
	pub expires_at: OffsetDateTime,
	/// Fingerprint of the environment + credential pair + scope that minted the token.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub cache_key: Option<String>,
}
impl CachedToken {
	/// Returns a builder for assembling a token record.
	pub fn builder() -> CachedTokenBuilder {
		CachedTokenBuilder::default()
	}

	/// Computes the lifecycle status at a given instant.
	pub fn status_at(&self, instant: OffsetDateTime) -> TokenStatus {
		if self.expires_at > instant { TokenStatus::Active } else { TokenStatus::Expired }
	}

	/// Returns `true` when `expires_at` is strictly after `instant`.
	pub fn is_valid_at(&self, instant: OffsetDateTime) -> bool {
		matches!(self.status_at(instant), TokenStatus::Active)
	}

	/// Returns `true` when the token was minted for `key`.
	///
	/// Records written without a key are accepted for any caller.
	pub fn matches_key(&self, key: &str) -> bool {
		self.cache_key.as_deref().is_none_or(|stored| stored == key)
	}
}
impl Debug for CachedToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CachedToken")
			.field("access_token", &"<redacted>")
			.field("expires_at", &self.expires_at)
			.field("cache_key", &self.cache_key)
			.finish()
	}
}

/// Builder for [`CachedToken`].
#[derive(Clone, Debug, Default)]
pub struct CachedTokenBuilder {
	access_token: Option<TokenSecret>,
	issued_at: Option<OffsetDateTime>,
	expires_at: Option<OffsetDateTime>,
	expires_in: Option<Duration>,
	cache_key: Option<String>,
}
impl CachedTokenBuilder {
	/// Provides the access token value.
	pub fn access_token(mut self, token: impl Into<String>) -> Self {
		self.access_token = Some(TokenSecret::new(token));

		self
	}

	/// Sets the instant relative expiries are measured from (defaults to now).
	pub fn issued_at(mut self, instant: OffsetDateTime) -> Self {
		self.issued_at = Some(instant);

		self
	}

	/// Sets an absolute expiry instant.
	pub fn expires_at(mut self, instant: OffsetDateTime) -> Self {
		self.expires_at = Some(instant);

		self
	}

	/// Sets a relative expiry duration from the issued instant.
	pub fn expires_in(mut self, duration: Duration) -> Self {
		self.expires_in = Some(duration);

		self
	}

	/// Tags the record with the minting caller's cache key.
	pub fn cache_key(mut self, key: impl Into<String>) -> Self {
		self.cache_key = Some(key.into());

		self
	}

	/// Consumes the builder and produces a [`CachedToken`] normalized to UTC.
	pub fn build(self) -> Result<CachedToken, CachedTokenBuilderError> {
		let access_token =
			self.access_token.ok_or(CachedTokenBuilderError::MissingAccessToken)?;
		let issued_at = self.issued_at.unwrap_or_else(OffsetDateTime::now_utc);
		let expires_at = match (self.expires_at, self.expires_in) {
			(Some(instant), _) => instant,
			(None, Some(delta)) => issued_at + delta,
			(None, None) => return Err(CachedTokenBuilderError::MissingExpiry),
		};

		Ok(CachedToken {
			access_token,
			expires_at: expires_at.to_offset(time::UtcOffset::UTC),
			cache_key: self.cache_key,
		})
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	#[test]
	fn validity_is_strictly_before_expiry() {
		let token = CachedToken::builder()
			.access_token("access")
			.expires_at(macros::datetime!(2025-01-01 01:00 UTC))
			.build()
			.expect("Token builder should succeed.");

		assert!(token.is_valid_at(macros::datetime!(2025-01-01 00:59:59 UTC)));
		assert!(!token.is_valid_at(macros::datetime!(2025-01-01 01:00 UTC)));
		assert_eq!(token.status_at(macros::datetime!(2025-01-01 02:00 UTC)), TokenStatus::Expired);
	}

	#[test]
	fn builder_handles_relative_expiry_and_normalizes_offset() {
		let token = CachedToken::builder()
			.access_token("access")
			.issued_at(macros::datetime!(2025-01-01 02:00 +02:00))
			.expires_in(Duration::seconds(7200))
			.build()
			.expect("Token builder should support relative expiry.");

		assert_eq!(token.expires_at, macros::datetime!(2025-01-01 02:00 UTC));
		assert_eq!(token.expires_at.offset(), time::UtcOffset::UTC);
	}

	#[test]
	fn builder_requires_token_and_expiry() {
		assert_eq!(
			CachedToken::builder().expires_in(Duration::MINUTE).build().err(),
			Some(CachedTokenBuilderError::MissingAccessToken)
		);
		assert_eq!(
			CachedToken::builder().access_token("a").build().err(),
			Some(CachedTokenBuilderError::MissingExpiry)
		);
	}

	#[test]
	fn keyless_records_match_any_caller() {
		let keyed = CachedToken::builder()
			.access_token("a")
			.expires_in(Duration::MINUTE)
			.cache_key("key-1")
			.build()
			.expect("Keyed token should build.");
		let legacy = CachedToken::builder()
			.access_token("a")
			.expires_in(Duration::MINUTE)
			.build()
			.expect("Keyless token should build.");

		assert!(keyed.matches_key("key-1"));
		assert!(!keyed.matches_key("key-2"));
		assert!(legacy.matches_key("key-2"));
	}

	#[test]
	fn persisted_shape_uses_rfc3339() {
		let token = CachedToken::builder()
			.access_token("v^1.1")
			.expires_at(macros::datetime!(2025-03-04 05:06:07 UTC))
			.build()
			.expect("Token builder should succeed.");
		let json = serde_json::to_value(&token).expect("Token should serialize.");

		assert_eq!(
			json,
			serde_json::json!({ "access_token": "v^1.1", "expires_at": "2025-03-04T05:06:07Z" })
		);
	}
}
