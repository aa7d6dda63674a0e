//! Search request modeling and the Browse / Marketplace Insights endpoint parameters.

// self
use crate::{_prelude::*, error::ArgumentError, http::QueryParams};

/// Browse API endpoint for active listings.
pub const ACTIVE_SEARCH_PATH: &str = "/buy/browse/v1/item_summary/search";
/// Results key of [`ACTIVE_SEARCH_PATH`] responses.
pub const ACTIVE_RESULTS_KEY: &str = "itemSummaries";
/// Marketplace Insights endpoint for sold listings.
pub const SOLD_SEARCH_PATH: &str = "/buy/marketplace_insights/v1_beta/item_sales/search";
/// Results key of [`SOLD_SEARCH_PATH`] responses.
pub const SOLD_RESULTS_KEY: &str = "itemSales";
/// Largest page the search endpoints accept.
pub const MAX_PAGE_SIZE: usize = 200;
/// Result count used when a caller omits the limit or passes zero.
pub const DEFAULT_LIMIT: usize = 50;

/// Buying formats understood by the Browse API filter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BuyingOption {
	/// Bidding listing.
	Auction,
	/// Buy It Now listing.
	FixedPrice,
	/// Listing that accepts offers.
	BestOffer,
	/// Classified advertisement.
	ClassifiedAd,
}
impl BuyingOption {
	/// Options applied to active searches when the caller names none.
	pub const ACTIVE_DEFAULT: [BuyingOption; 2] = [BuyingOption::Auction, BuyingOption::FixedPrice];

	/// Returns the API label.
	pub const fn as_str(self) -> &'static str {
		match self {
			BuyingOption::Auction => "AUCTION",
			BuyingOption::FixedPrice => "FIXED_PRICE",
			BuyingOption::BestOffer => "BEST_OFFER",
			BuyingOption::ClassifiedAd => "CLASSIFIED_AD",
		}
	}
}
impl Display for BuyingOption {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for BuyingOption {
	type Err = ArgumentError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_uppercase().as_str() {
			"AUCTION" => Ok(BuyingOption::Auction),
			"FIXED_PRICE" => Ok(BuyingOption::FixedPrice),
			"BEST_OFFER" => Ok(BuyingOption::BestOffer),
			"CLASSIFIED_AD" => Ok(BuyingOption::ClassifiedAd),
			other => Err(ArgumentError::invalid(
				"buying_options",
				format!("unsupported buying option '{other}'"),
			)),
		}
	}
}

/// Validated search input shared by active and sold searches.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchRequest {
	/// Free-text query.
	pub query: String,
	/// Total number of records wanted.
	pub limit: usize,
	/// Buying formats to include (active searches only).
	pub buying_options: Vec<BuyingOption>,
	/// Category restriction.
	pub category_ids: Vec<u64>,
	/// Sort order, passed through verbatim.
	pub sort: Option<String>,
}
impl SearchRequest {
	/// Creates a request; the query must be non-blank and the limit positive.
	pub fn new(query: impl Into<String>, limit: usize) -> Result<Self, ArgumentError> {
		let query = query.into();

		if query.trim().is_empty() {
			return Err(ArgumentError::Missing { name: "query" });
		}
		if limit == 0 {
			return Err(ArgumentError::invalid("limit", "must be a positive integer"));
		}

		Ok(Self { query, limit, buying_options: Vec::new(), category_ids: Vec::new(), sort: None })
	}

	/// Restricts buying formats.
	pub fn with_buying_options(mut self, options: impl IntoIterator<Item = BuyingOption>) -> Self {
		self.buying_options = options.into_iter().collect();

		self
	}

	/// Restricts categories.
	pub fn with_category_ids(mut self, ids: impl IntoIterator<Item = u64>) -> Self {
		self.category_ids = ids.into_iter().collect();

		self
	}

	/// Sets the sort order.
	pub fn with_sort(mut self, sort: impl Into<String>) -> Self {
		self.sort = Some(sort.into());

		self
	}

	/// Query parameters for the Browse endpoint; buying options default to auction + fixed price.
	pub fn active_params(&self) -> QueryParams {
		let options = if self.buying_options.is_empty() {
			BuyingOption::ACTIVE_DEFAULT.to_vec()
		} else {
			self.buying_options.clone()
		};

		self.base_params(&options)
	}

	/// Query parameters for the Marketplace Insights endpoint (no buying-option filter).
	pub fn sold_params(&self) -> QueryParams {
		self.base_params(&[])
	}

	fn base_params(&self, buying_options: &[BuyingOption]) -> QueryParams {
		let mut params = QueryParams::new();

		params.insert("q".into(), self.query.clone());
		params.insert("limit".into(), self.limit.min(MAX_PAGE_SIZE).to_string());

		let filter = browse_filter(buying_options, &self.category_ids);

		if !filter.is_empty() {
			params.insert("filter".into(), filter);
		}
		if let Some(sort) = self.sort.as_ref().filter(|sort| !sort.is_empty()) {
			params.insert("sort".into(), sort.clone());
		}

		params
	}
}

/// Renders the Browse filter expression, e.g. `buyingOptions:{AUCTION},categoryIds:{1|2}`.
pub fn browse_filter(buying_options: &[BuyingOption], category_ids: &[u64]) -> String {
	let mut filters = Vec::new();

	if !buying_options.is_empty() {
		let joined = buying_options.iter().map(|o| o.as_str()).collect::<Vec<_>>().join("|");

		filters.push(format!("buyingOptions:{{{joined}}}"));
	}
	if !category_ids.is_empty() {
		let joined = category_ids.iter().map(u64::to_string).collect::<Vec<_>>().join("|");

		filters.push(format!("categoryIds:{{{joined}}}"));
	}

	filters.join(",")
}
