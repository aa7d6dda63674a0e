//! Thread-safe in-memory [`TokenStore`] implementation for embedding and tests.

// self
use crate::{
	_prelude::*,
	auth::CachedToken,
	store::{StoreFuture, TokenStore},
};

/// Storage backend that keeps the token in-process.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(Arc<RwLock<Option<CachedToken>>>);
impl MemoryStore {
	/// Creates a store pre-populated with `token`.
	pub fn with_token(token: CachedToken) -> Self {
		Self(Arc::new(RwLock::new(Some(token))))
	}

	/// Returns a copy of the stored token without going through the async contract.
	pub fn current(&self) -> Option<CachedToken> {
		self.0.read().clone()
	}
}
impl TokenStore for MemoryStore {
	fn save(&self, token: CachedToken) -> StoreFuture<'_, ()> {
		let slot = self.0.clone();

		Box::pin(async move {
			*slot.write() = Some(token);

			Ok(())
		})
	}

	fn load(&self) -> StoreFuture<'_, Option<CachedToken>> {
		let slot = self.0.clone();

		Box::pin(async move { Ok(slot.read().clone()) })
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[tokio::test]
	async fn save_replaces_previous_token() {
		let store = MemoryStore::default();

		assert!(store.load().await.expect("Empty load should succeed.").is_none());

		for value in ["first", "second"] {
			let token = CachedToken::builder()
				.access_token(value)
				.expires_in(Duration::hours(2))
				.build()
				.expect("Token fixture should build.");

			store.save(token).await.expect("Save should succeed.");
		}

		let stored = store.current().expect("Store should hold the last token.");

		assert_eq!(stored.access_token.expose(), "second");
	}
}
