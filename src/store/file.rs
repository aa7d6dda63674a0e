//! File-backed [`TokenStore`]: one JSON record, re-read on every load.

// std
use std::{
	fs::{self, File},
	io::{ErrorKind, Write},
};
// self
use crate::{
	_prelude::*,
	auth::CachedToken,
	store::{StoreError, StoreFuture, TokenStore},
};

/// Default cache file name, relative to the working directory.
pub const DEFAULT_TOKEN_FILE: &str = "ebay_token.json";

/// Persists the cached token to a JSON file, overwriting it in full on each save.
#[derive(Clone, Debug)]
pub struct FileStore {
	path: PathBuf,
}
impl FileStore {
	/// Creates a store at `path`. Nothing is read or created until the first call.
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	/// Location of the cache file.
	pub fn path(&self) -> &Path {
		&self.path
	}

	fn read_token(path: &Path) -> Result<Option<CachedToken>, StoreError> {
		let bytes = match fs::read(path) {
			Ok(bytes) => bytes,
			Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
			Err(e) =>
				return Err(StoreError::Backend {
					message: format!("Failed to read {}: {e}", path.display()),
				}),
		};

		if bytes.iter().all(u8::is_ascii_whitespace) {
			return Ok(None);
		}

		match serde_json::from_slice(&bytes) {
			Ok(token) => Ok(Some(token)),
			Err(e) => {
				tracing::warn!(
					path = %path.display(),
					error = %e,
					"Ignoring unreadable token cache file; a fresh token will replace it."
				);

				Ok(None)
			},
		}
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), StoreError> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| StoreError::Backend {
				message: format!("Failed to create token directory {}: {e}", parent.display()),
			})?;
		}

		Ok(())
	}

	fn write_token(path: &Path, token: &CachedToken) -> Result<(), StoreError> {
		Self::ensure_parent_exists(path)?;

		let serialized = serde_json::to_vec(token).map_err(|e| StoreError::Serialization {
			message: format!("Failed to serialize cached token: {e}"),
		})?;
		let mut tmp_path = path.to_path_buf();

		tmp_path.set_extension("tmp");

		{
			let mut file = File::create(&tmp_path).map_err(|e| StoreError::Backend {
				message: format!("Failed to create {}: {e}", tmp_path.display()),
			})?;

			file.write_all(&serialized).map_err(|e| StoreError::Backend {
				message: format!("Failed to write {}: {e}", tmp_path.display()),
			})?;
			file.sync_all().map_err(|e| StoreError::Backend {
				message: format!("Failed to sync {}: {e}", tmp_path.display()),
			})?;
		}

		fs::rename(&tmp_path, path).map_err(|e| StoreError::Backend {
			message: format!("Failed to replace {}: {e}", path.display()),
		})
	}
}
impl Default for FileStore {
	fn default() -> Self {
		Self::new(DEFAULT_TOKEN_FILE)
	}
}
impl TokenStore for FileStore {
	fn save(&self, token: CachedToken) -> StoreFuture<'_, ()> {
		Box::pin(async move { Self::write_token(&self.path, &token) })
	}

	fn load(&self) -> StoreFuture<'_, Option<CachedToken>> {
		Box::pin(async move { Self::read_token(&self.path) })
	}
}
