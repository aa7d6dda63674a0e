//! Persistence contract and built-in stores for the cached bearer token.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{_prelude::*, auth::CachedToken};

/// Boxed future returned by [`TokenStore`] methods.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Storage backend holding at most one cached token.
///
/// Implementations provide no cross-process locking; the last writer wins.
pub trait TokenStore
where
	Self: Send + Sync,
{
	/// Replaces the stored token in full.
	fn save(&self, token: CachedToken) -> StoreFuture<'_, ()>;

	/// Returns the stored token, or `None` when nothing usable is stored.
	fn load(&self) -> StoreFuture<'_, Option<CachedToken>>;
}

/// Error type produced by [`TokenStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}
