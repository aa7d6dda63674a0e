// std
use std::{
	fs,
	path::PathBuf,
	sync::Arc,
	time::{SystemTime, UNIX_EPOCH},
};
// crates.io
use httpmock::prelude::*;
use serde_json::{Map, Value, json};
// self
use ebay_broker::{
	auth::{CachedToken, Credentials},
	client::EbayClient,
	config::Config,
	environment::{Environment, EnvironmentName},
	http::ApiHttpClient,
	project::ListingRecord,
	search::SearchRequest,
	store::{FileStore, MemoryStore, TokenStore},
	tools::ToolDispatcher,
	url::Url,
};

const TOKEN_PATH: &str = "/identity/v1/oauth2/token";
const ACTIVE_PATH: &str = "/buy/browse/v1/item_summary/search";
const SOLD_PATH: &str = "/buy/marketplace_insights/v1_beta/item_sales/search";
const SCOPE: &str = "https://api.ebay.com/oauth/api_scope";

fn environment(server: &MockServer) -> Environment {
	Environment::with_endpoints(
		EnvironmentName::Sandbox,
		Url::parse(&server.url(TOKEN_PATH)).expect("Mock OAuth URL should parse."),
		Url::parse(&server.base_url()).expect("Mock base URL should parse."),
	)
}

fn client(server: &MockServer, store: Arc<dyn TokenStore>) -> EbayClient {
	EbayClient::with_parts(
		environment(server),
		store,
		ApiHttpClient::new().expect("HTTP client should build."),
		SCOPE,
	)
}

fn dispatcher(server: &MockServer, secret: Option<&'static str>) -> ToolDispatcher {
	let mut config = Config::from_lookup(move |key| match key {
		"CLIENT_ID" => Some("tool-client".into()),
		"CLIENT_SECRET" => secret.map(str::to_owned),
		_ => None,
	})
	.expect("Fixture configuration should load.");

	config.environment = environment(server);

	ToolDispatcher::new(client(server, Arc::new(MemoryStore::default())), config)
}

fn credentials() -> Credentials {
	Credentials::new(Some("tool-client"), Some("tool-secret")).expect("Fixture pair should be valid.")
}

fn arguments(value: Value) -> Map<String, Value> {
	match value {
		Value::Object(map) => map,
		other => panic!("Fixture must be an object, got {other}."),
	}
}

fn temp_token_file(label: &str) -> PathBuf {
	let nanos = SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.expect("Clock should be after the epoch.")
		.as_nanos();

	std::env::temp_dir()
		.join(format!("ebay-broker-{label}-{}-{nanos}", std::process::id()))
		.join("token.json")
}

async fn mock_token<'a>(server: &'a MockServer, access_token: &str) -> httpmock::Mock<'a> {
	let body = json!({
		"access_token": access_token,
		"expires_in": 7200,
		"token_type": "Application Access Token"
	});

	server
		.mock_async(|when, then| {
			when.method(POST)
				.path(TOKEN_PATH)
				.header("content-type", "application/x-www-form-urlencoded");
			then.status(200).json_body(body.clone());
		})
		.await
}

#[tokio::test]
async fn active_search_returns_projected_records_in_order() {
	let server = MockServer::start_async().await;
	let token = mock_token(&server, "search-token").await;
	let search = server
		.mock_async(|when, then| {
			when.method(GET)
				.path(ACTIVE_PATH)
				.header("authorization", "Bearer search-token")
				.query_param("q", "vintage camera")
				.query_param("limit", "3")
				.query_param("offset", "0")
				.query_param("filter", "buyingOptions:{AUCTION|FIXED_PRICE}");
			then.status(200).json_body(json!({
				"total": 3,
				"itemSummaries": [
					{
						"title": "Leica M3",
						"currentBidPrice": { "value": "900.00", "currency": "USD" },
						"price": { "value": "1500.00", "currency": "USD" },
						"itemWebUrl": "https://www.ebay.com/itm/1",
						"buyingOptions": ["AUCTION"]
					},
					{
						"title": "Canon AE-1",
						"price": { "value": "180.00", "currency": "USD" },
						"itemWebUrl": "https://www.ebay.com/itm/2"
					},
					{
						"title": "Rolleiflex",
						"price": { "value": "640.00", "currency": "EUR" },
						"itemWebUrl": "https://www.ebay.com/itm/3"
					}
				]
			}));
		})
		.await;
	let request = SearchRequest::new("vintage camera", 3).expect("Request should be valid.");
	let records = client(&server, Arc::new(MemoryStore::default()))
		.search_active(&credentials(), &request)
		.await
		.expect("Search should succeed.");
	let summary = records
		.iter()
		.map(|r: &ListingRecord| {
			(r.title.as_deref(), r.price.as_deref(), r.currency.as_deref(), r.item_url.is_some())
		})
		.collect::<Vec<_>>();

	assert_eq!(
		summary,
		vec![
			(Some("Leica M3"), Some("900.00"), Some("USD"), true),
			(Some("Canon AE-1"), Some("180.00"), Some("USD"), true),
			(Some("Rolleiflex"), Some("640.00"), Some("EUR"), true),
		]
	);

	token.assert_calls_async(1).await;
	search.assert_calls_async(1).await;
}

#[tokio::test]
async fn sold_tool_renders_sale_records() {
	let server = MockServer::start_async().await;

	mock_token(&server, "sold-token").await;

	let sold = server
		.mock_async(|when, then| {
			when.method(GET)
				.path(SOLD_PATH)
				.header("authorization", "Bearer sold-token")
				.query_param("q", "lens")
				.query_param("limit", "50")
				.query_param("filter", "categoryIds:{625}");
			then.status(200).json_body(json!({
				"itemSales": [{
					"title": "Summicron 50mm",
					"price": { "value": "1100.00", "currency": "USD" },
					"soldDate": "2025-02-02T10:00:00.000Z",
					"itemHref": "https://api.ebay.com/buy/browse/v1/item/v1|9|0"
				}]
			}));
		})
		.await;
	let output = dispatcher(&server, Some("tool-secret"))
		.call(
			"list-sold-listings",
			Some(&arguments(json!({ "query": "lens", "category_ids": [625] }))),
		)
		.await;

	assert!(!output.is_error, "Unexpected failure: {}", output.text);

	let rendered = serde_json::from_str::<Value>(&output.text).expect("Output should be JSON.");

	assert_eq!(rendered[0]["title"], json!("Summicron 50mm"));
	assert_eq!(rendered[0]["sold_date"], json!("2025-02-02T10:00:00.000Z"));
	assert_eq!(rendered[0]["seller_username"], Value::Null);

	sold.assert_calls_async(1).await;
}

#[tokio::test]
async fn generic_request_surfaces_http_status() {
	let server = MockServer::start_async().await;

	mock_token(&server, "rest-token").await;

	let missing = server
		.mock_async(|when, then| {
			when.method(GET).path(ACTIVE_PATH).header("authorization", "Bearer rest-token");
			then.status(404).body("{\"errors\":[{\"errorId\":11001}]}");
		})
		.await;
	let output = dispatcher(&server, Some("tool-secret"))
		.call(
			"ebay-api-request",
			Some(&arguments(json!({ "method": "GET", "path": ACTIVE_PATH, "params": { "q": "x" } }))),
		)
		.await;

	assert!(output.is_error);
	assert!(output.text.starts_with("Error: "));
	assert!(output.text.contains("404"));
	assert!(output.text.contains("env=sandbox"));

	missing.assert_calls_async(1).await;
}

#[tokio::test]
async fn generic_request_returns_decoded_or_raw_body() {
	let server = MockServer::start_async().await;

	mock_token(&server, "rest-token").await;
	server
		.mock_async(|when, then| {
			when.method(POST).path("/sell/inventory/v1/bulk_create").json_body(json!({ "sku": "A-1" }));
			then.status(201).json_body(json!({ "created": true }));
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(DELETE).path("/sell/inventory/v1/inventory_item/A-1");
			then.status(204);
		})
		.await;

	let dispatcher = dispatcher(&server, Some("tool-secret"));
	let created = dispatcher
		.call(
			"ebay-api-request",
			Some(&arguments(json!({
				"method": "post",
				"path": "sell/inventory/v1/bulk_create",
				"json_body": { "sku": "A-1" }
			}))),
		)
		.await;

	assert!(!created.is_error, "Unexpected failure: {}", created.text);
	assert_eq!(
		serde_json::from_str::<Value>(&created.text).expect("Output should be JSON."),
		json!({ "created": true })
	);

	let deleted = dispatcher
		.call(
			"ebay-api-request",
			Some(&arguments(json!({
				"method": "DELETE",
				"path": "/sell/inventory/v1/inventory_item/A-1"
			}))),
		)
		.await;

	assert_eq!(deleted.text, "No content");
	assert!(!deleted.is_error);
}

#[tokio::test]
async fn missing_secret_fails_without_network() {
	let server = MockServer::start_async().await;
	let token = mock_token(&server, "never").await;
	let output = dispatcher(&server, None)
		.call("list-active-listings", Some(&arguments(json!({ "query": "lens", "limit": 3 }))))
		.await;

	assert!(output.is_error);
	assert_eq!(output.text, "Error: Missing CLIENT_SECRET configuration value.");

	token.assert_calls_async(0).await;
}

#[tokio::test]
async fn file_cache_is_shared_across_clients() {
	let server = MockServer::start_async().await;
	let token = mock_token(&server, "persisted-token").await;
	let search = server
		.mock_async(|when, then| {
			when.method(GET).path(ACTIVE_PATH).header("authorization", "Bearer persisted-token");
			then.status(200).json_body(json!({ "itemSummaries": [] }));
		})
		.await;
	let path = temp_token_file("shared");
	let request = SearchRequest::new("lens", 5).expect("Request should be valid.");

	for _ in 0..2 {
		let records = client(&server, Arc::new(FileStore::new(&path)))
			.search_active(&credentials(), &request)
			.await
			.expect("Search should succeed.");

		assert!(records.is_empty());
	}

	token.assert_calls_async(1).await;
	search.assert_calls_async(2).await;

	let stored = serde_json::from_str::<CachedToken>(
		&fs::read_to_string(&path).expect("Token file should exist."),
	)
	.expect("Token file should hold a cached token.");

	assert_eq!(stored.access_token.expose(), "persisted-token");
	assert!(stored.cache_key.is_some());

	let raw = serde_json::from_str::<Value>(
		&fs::read_to_string(&path).expect("Token file should exist."),
	)
	.expect("Token file should be JSON.");

	assert!(raw["expires_at"].as_str().is_some_and(|at| at.ends_with('Z')));

	if let Some(dir) = path.parent() {
		let _ = fs::remove_dir_all(dir);
	}
}

#[tokio::test]
async fn legacy_tool_uses_amount_as_limit() {
	let server = MockServer::start_async().await;

	mock_token(&server, "legacy-token").await;

	let search = server
		.mock_async(|when, then| {
			when.method(GET)
				.path(ACTIVE_PATH)
				.query_param("limit", "2")
				.query_param("filter", "buyingOptions:{AUCTION}");
			then.status(200).json_body(json!({
				"itemSummaries": [{ "title": "a" }, { "title": "b" }]
			}));
		})
		.await;
	let dispatcher = dispatcher(&server, Some("tool-secret"));
	let output = dispatcher
		.call(
			"list-auction",
			Some(&arguments(json!({ "query": "watch", "ammount": 2, "buying_options": ["AUCTION"] }))),
		)
		.await;

	assert!(!output.is_error, "Unexpected failure: {}", output.text);

	let rendered = serde_json::from_str::<Value>(&output.text).expect("Output should be JSON.");

	assert_eq!(rendered.as_array().map(Vec::len), Some(2));
	assert_eq!(rendered[1]["title"], json!("b"));

	search.assert_calls_async(1).await;

	let missing = dispatcher.call("list-auction", Some(&arguments(json!({ "query": "watch" })))).await;

	assert_eq!(missing.text, "Error: Missing ammount");
}

#[tokio::test]
async fn legacy_tool_reports_empty_results_as_text() {
	let server = MockServer::start_async().await;

	mock_token(&server, "legacy-token").await;

	let search = server
		.mock_async(|when, then| {
			when.method(GET).path(ACTIVE_PATH).query_param("limit", "5");
			then.status(200).json_body(json!({ "total": 0 }));
		})
		.await;
	let output = dispatcher(&server, Some("tool-secret"))
		.call("list-auction", Some(&arguments(json!({ "query": "nothing", "ammount": 5 }))))
		.await;

	assert!(!output.is_error, "Unexpected failure: {}", output.text);
	assert_eq!(output.text, "No auctions found");

	search.assert_calls_async(1).await;

	let active = dispatcher(&server, Some("tool-secret"))
		.call("list-active-listings", Some(&arguments(json!({ "query": "nothing", "limit": 5 }))))
		.await;

	assert_eq!(active.text, "[]");
}
