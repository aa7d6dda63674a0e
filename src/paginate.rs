//! Offset/limit pagination that flattens a multi-page search endpoint into one bounded list.

// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	environment::Environment,
	error::HttpError,
	http::{ApiHttpClient, QueryParams},
	obs::{self, OperationKind},
};

/// Page size used when the base parameters carry no usable `limit`.
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Issues sequential page requests against one environment.
#[derive(Clone, Debug)]
pub struct Paginator {
	http_client: ApiHttpClient,
	environment: Environment,
}
impl Paginator {
	/// Creates a paginator for `environment`.
	pub fn new(http_client: ApiHttpClient, environment: Environment) -> Self {
		Self { http_client, environment }
	}

	/// Fetches pages from `path` until `max_results` items are collected, a page comes back
	/// empty, or a page comes back short.
	///
	/// `base_params["limit"]` sets the page size (default [`DEFAULT_PAGE_SIZE`]); each request
	/// asks for `min(page_size, remaining)` items at the running offset. Any status of 400 or
	/// above aborts the whole fetch and discards the pages collected so far.
	pub async fn fetch(
		&self,
		token: &TokenSecret,
		path: &str,
		base_params: &QueryParams,
		results_key: &str,
		max_results: usize,
	) -> Result<Vec<Value>> {
		obs::observe(OperationKind::Paginate, "fetch", async move {
			let url = self.environment.api_url(path)?;
			let page_size = page_size(base_params);
			let mut collected = Vec::new();
			let mut offset: usize = 0;

			while collected.len() < max_results {
				let current_limit = page_size.min(max_results - collected.len());
				let mut params = base_params.clone();

				params.insert("limit".into(), current_limit.to_string());
				params.insert("offset".into(), offset.to_string());

				let request = self.http_client.bearer(Method::GET, url.clone(), token)?.query(&params);
				let reply = self.http_client.send(request).await?;

				if reply.is_error() {
					return Err(HttpError::Status {
						status: reply.status,
						body: reply.body,
						environment: self.environment.name.to_string(),
					}
					.into());
				}

				let page = match extract_page(&reply.body, results_key) {
					Some(page) if !page.is_empty() => page,
					_ => break,
				};
				let received = page.len();

				tracing::debug!(offset, requested = current_limit, received, "Fetched result page.");

				collected.extend(page);

				if received < current_limit {
					break;
				}

				offset += current_limit;
			}

			// A page larger than requested must not push the result past the target.
			collected.truncate(max_results);

			tracing::info!(path, collected = collected.len(), max_results, "Pagination finished.");

			Ok(collected)
		})
		.await
	}
}

fn page_size(base_params: &QueryParams) -> usize {
	base_params
		.get("limit")
		.and_then(|limit| limit.trim().parse::<usize>().ok())
		.filter(|limit| *limit > 0)
		.unwrap_or(DEFAULT_PAGE_SIZE)
}

fn extract_page(body: &str, results_key: &str) -> Option<Vec<Value>> {
	let mut payload = match serde_json::from_str::<Value>(body) {
		Ok(payload) => payload,
		Err(e) => {
			tracing::warn!(error = %e, "Page body is not JSON; treating it as the end of results.");

			return None;
		},
	};

	match payload.get_mut(results_key).map(Value::take) {
		Some(Value::Array(items)) => Some(items),
		_ => None,
	}
}
