// std
use std::ops::Range;
// crates.io
use httpmock::prelude::*;
use serde_json::{Map, Value, json};
// self
use ebay_broker::{
	auth::TokenSecret,
	environment::{Environment, EnvironmentName},
	error::{Error, HttpError},
	http::{ApiHttpClient, QueryParams},
	paginate::Paginator,
	url::Url,
};

const PATH: &str = "/buy/browse/v1/item_summary/search";
const RESULTS_KEY: &str = "itemSummaries";

fn paginator(server: &MockServer) -> Paginator {
	let environment = Environment::with_endpoints(
		EnvironmentName::Sandbox,
		Url::parse(&server.url("/identity/v1/oauth2/token")).expect("Mock OAuth URL should parse."),
		Url::parse(&server.base_url()).expect("Mock base URL should parse."),
	);

	Paginator::new(ApiHttpClient::new().expect("HTTP client should build."), environment)
}

fn params(page_size: usize) -> QueryParams {
	QueryParams::from([
		("q".to_owned(), "lens".to_owned()),
		("limit".to_owned(), page_size.to_string()),
	])
}

fn items(range: Range<usize>) -> Value {
	let page = range.map(|i| json!({ "title": format!("item-{i}") })).collect::<Vec<_>>();

	Value::Object(Map::from_iter([(RESULTS_KEY.to_owned(), Value::Array(page))]))
}

fn titles(items: &[Value]) -> Vec<String> {
	items.iter().filter_map(|item| item["title"].as_str().map(str::to_owned)).collect()
}

#[tokio::test]
async fn fetch_returns_min_of_target_and_available() {
	let server = MockServer::start_async().await;
	let first = server
		.mock_async(|when, then| {
			when.method(GET)
				.path(PATH)
				.header("authorization", "Bearer page-token")
				.query_param("q", "lens")
				.query_param("limit", "2")
				.query_param("offset", "0");
			then.status(200).json_body(items(0..2));
		})
		.await;
	let second = server
		.mock_async(|when, then| {
			when.method(GET).path(PATH).query_param("limit", "2").query_param("offset", "2");
			then.status(200).json_body(items(2..4));
		})
		.await;
	let third = server
		.mock_async(|when, then| {
			when.method(GET).path(PATH).query_param("limit", "2").query_param("offset", "4");
			then.status(200).json_body(items(4..5));
		})
		.await;
	let token = TokenSecret::new("page-token");
	let all = paginator(&server)
		.fetch(&token, PATH, &params(2), RESULTS_KEY, 10)
		.await
		.expect("Paging should succeed.");

	assert_eq!(titles(&all), ["item-0", "item-1", "item-2", "item-3", "item-4"]);

	first.assert_calls_async(1).await;
	second.assert_calls_async(1).await;
	third.assert_calls_async(1).await;
}

#[tokio::test]
async fn last_page_asks_only_for_the_remainder() {
	let server = MockServer::start_async().await;
	let first = server
		.mock_async(|when, then| {
			when.method(GET).path(PATH).query_param("limit", "2").query_param("offset", "0");
			then.status(200).json_body(items(0..2));
		})
		.await;
	let remainder = server
		.mock_async(|when, then| {
			when.method(GET).path(PATH).query_param("limit", "1").query_param("offset", "2");
			then.status(200).json_body(items(2..3));
		})
		.await;
	let token = TokenSecret::new("page-token");
	let some = paginator(&server)
		.fetch(&token, PATH, &params(2), RESULTS_KEY, 3)
		.await
		.expect("Paging should succeed.");

	assert_eq!(titles(&some), ["item-0", "item-1", "item-2"]);

	first.assert_calls_async(1).await;
	remainder.assert_calls_async(1).await;
}

#[tokio::test]
async fn short_page_stops_paging() {
	let server = MockServer::start_async().await;
	let short = server
		.mock_async(|when, then| {
			when.method(GET).path(PATH).query_param("offset", "0");
			then.status(200).json_body(items(0..1));
		})
		.await;
	let next = server
		.mock_async(|when, then| {
			when.method(GET).path(PATH).query_param("offset", "2");
			then.status(200).json_body(items(1..3));
		})
		.await;
	let token = TokenSecret::new("page-token");
	let got = paginator(&server)
		.fetch(&token, PATH, &params(2), RESULTS_KEY, 10)
		.await
		.expect("Paging should succeed.");

	assert_eq!(got.len(), 1);

	short.assert_calls_async(1).await;
	next.assert_calls_async(0).await;
}

#[tokio::test]
async fn empty_or_missing_results_end_paging() {
	let server = MockServer::start_async().await;
	let empty = server
		.mock_async(|when, then| {
			when.method(GET).path(PATH);
			then.status(200).json_body(json!({ "total": 0 }));
		})
		.await;
	let token = TokenSecret::new("page-token");
	let got = paginator(&server)
		.fetch(&token, PATH, &params(50), RESULTS_KEY, 10)
		.await
		.expect("Paging should succeed.");

	assert!(got.is_empty());

	empty.assert_calls_async(1).await;
}

#[tokio::test]
async fn error_page_discards_collected_results() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(GET).path(PATH).query_param("offset", "0");
			then.status(200).json_body(items(0..2));
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path(PATH).query_param("offset", "2");
			then.status(500).body("{\"errors\":[{\"message\":\"boom\"}]}");
		})
		.await;

	let token = TokenSecret::new("page-token");
	let err = paginator(&server)
		.fetch(&token, PATH, &params(2), RESULTS_KEY, 10)
		.await
		.expect_err("A failing page should abort the fetch.");

	match &err {
		Error::Http(HttpError::Status { status, body, environment }) => {
			assert_eq!(*status, 500);
			assert!(body.contains("boom"));
			assert_eq!(environment, "sandbox");
		},
		other => panic!("Unexpected error variant: {other:?}."),
	}
	assert!(err.to_string().contains("500"));
}
