//! High-level eBay client facade combining the token cache, paginator and REST invoker.

// self
use crate::{
	_prelude::*,
	auth::Credentials,
	cache::TokenCache,
	config::Config,
	environment::Environment,
	http::ApiHttpClient,
	paginate::Paginator,
	project::{self, ListingRecord, SaleRecord},
	rest::{RestCall, RestInvoker, RestResponse},
	search::{
		ACTIVE_RESULTS_KEY, ACTIVE_SEARCH_PATH, SOLD_RESULTS_KEY, SOLD_SEARCH_PATH, SearchRequest,
	},
	store::{FileStore, TokenStore},
};

/// Coordinates every eBay call against a single environment.
///
/// The client owns the token cache, paginator and REST invoker so each operation is one
/// token lookup followed by the network work it needs. Credentials are supplied per call;
/// the client never reads process state.
#[derive(Clone, Debug)]
pub struct EbayClient {
	cache: TokenCache,
	paginator: Paginator,
	invoker: RestInvoker,
}
impl EbayClient {
	/// Builds a client backed by the configured token file and the default HTTP transport.
	pub fn from_config(config: &Config) -> Result<Self> {
		let http_client = ApiHttpClient::new()?;
		let store = Arc::new(FileStore::new(config.token_file.clone()));

		Ok(Self::with_parts(config.environment.clone(), store, http_client, &config.oauth_scope))
	}

	/// Builds a client from caller-provided parts.
	pub fn with_parts(
		environment: Environment,
		store: Arc<dyn TokenStore>,
		http_client: ApiHttpClient,
		scope: impl Into<String>,
	) -> Self {
		Self {
			cache: TokenCache::new(store, http_client.clone(), environment.clone(), scope),
			paginator: Paginator::new(http_client.clone(), environment.clone()),
			invoker: RestInvoker::new(http_client, environment),
		}
	}

	/// Environment every call targets.
	pub fn environment(&self) -> &Environment {
		self.cache.environment()
	}

	/// Searches active listings and returns at most `request.limit` records in API order.
	pub async fn search_active(
		&self,
		credentials: &Credentials,
		request: &SearchRequest,
	) -> Result<Vec<ListingRecord>> {
		let token = self.cache.get_token(credentials).await?;
		let items = self
			.paginator
			.fetch(
				&token,
				ACTIVE_SEARCH_PATH,
				&request.active_params(),
				ACTIVE_RESULTS_KEY,
				request.limit,
			)
			.await?;

		Ok(items.iter().map(project::project_active).collect())
	}

	/// Searches sold listings and returns at most `request.limit` records in API order.
	pub async fn search_sold(
		&self,
		credentials: &Credentials,
		request: &SearchRequest,
	) -> Result<Vec<SaleRecord>> {
		let token = self.cache.get_token(credentials).await?;
		let items = self
			.paginator
			.fetch(&token, SOLD_SEARCH_PATH, &request.sold_params(), SOLD_RESULTS_KEY, request.limit)
			.await?;

		Ok(items.iter().map(project::project_sold).collect())
	}

	/// Performs one arbitrary authenticated REST call.
	pub async fn request(&self, credentials: &Credentials, call: &RestCall) -> Result<RestResponse> {
		let token = self.cache.get_token(credentials).await?;

		self.invoker.invoke(&token, call).await
	}
}
