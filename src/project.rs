//! Projections from raw search items into flat, fully optional records.
//!
//! Missing source fields stay `None`; nothing is defaulted to zero or an empty string.

// self
use crate::_prelude::*;

/// Normalized active listing (Browse API `itemSummaries` entry).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingRecord {
	/// Listing title.
	pub title: Option<String>,
	/// Current bid when present, else the fixed price, as decimal text.
	pub price: Option<String>,
	/// Currency of `price`.
	pub currency: Option<String>,
	/// Listing end instant as sent by the API.
	pub end_date: Option<String>,
	/// Public listing URL.
	pub item_url: Option<String>,
	/// Buying options (`AUCTION`, `FIXED_PRICE`, ...).
	pub buying_options: Option<Vec<String>>,
	/// Item condition label.
	pub condition: Option<String>,
	/// Seller account name.
	pub seller_username: Option<String>,
	/// Item location postal code.
	pub location: Option<String>,
}

/// Normalized sold listing (Marketplace Insights `itemSales` entry).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleRecord {
	/// Listing title.
	pub title: Option<String>,
	/// Sale price as decimal text.
	pub price: Option<String>,
	/// Currency of `price`.
	pub currency: Option<String>,
	/// Sale instant as sent by the API.
	pub sold_date: Option<String>,
	/// Item resource URL.
	pub item_url: Option<String>,
	/// Item condition label.
	pub condition: Option<String>,
	/// Seller account name.
	pub seller_username: Option<String>,
}

/// Maps an active search item; the price prefers `currentBidPrice` over `price`.
pub fn project_active(item: &Value) -> ListingRecord {
	let (price, currency) = price_fields(item, &["currentBidPrice", "price"]);

	ListingRecord {
		title: text(item, &["title"]),
		price,
		currency,
		end_date: text(item, &["itemEndDate"]),
		item_url: text(item, &["itemWebUrl"]),
		buying_options: item.get("buyingOptions").and_then(Value::as_array).map(|options| {
			options.iter().filter_map(Value::as_str).map(str::to_owned).collect()
		}),
		condition: text(item, &["condition"]),
		seller_username: text(item, &["seller", "username"]),
		location: text(item, &["itemLocation", "postalCode"]),
	}
}

/// Maps a sold search item.
pub fn project_sold(item: &Value) -> SaleRecord {
	let (price, currency) = price_fields(item, &["price"]);

	SaleRecord {
		title: text(item, &["title"]),
		price,
		currency,
		sold_date: text(item, &["soldDate"]),
		item_url: text(item, &["itemHref"]),
		condition: text(item, &["condition"]),
		seller_username: text(item, &["seller", "username"]),
	}
}

// First candidate holding a non-empty object wins; value and currency come from it alone.
fn price_fields(item: &Value, candidates: &[&str]) -> (Option<String>, Option<String>) {
	candidates
		.iter()
		.filter_map(|key| item.get(*key))
		.find(|price| price.as_object().is_some_and(|fields| !fields.is_empty()))
		.map(|price| (text(price, &["value"]), text(price, &["currency"])))
		.unwrap_or_default()
}

fn text(value: &Value, path: &[&str]) -> Option<String> {
	let leaf = path.iter().try_fold(value, |current, key| current.get(*key))?;

	match leaf {
		Value::String(s) => Some(s.clone()),
		Value::Number(n) => Some(n.to_string()),
		Value::Bool(b) => Some(b.to_string()),
		_ => None,
	}
}
