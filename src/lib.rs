//! Credential-caching, paginating eBay REST client exposed to agent hosts as callable tools.
//!
//! The core is a client-credentials [`cache::TokenCache`] with file-backed persistence and an
//! offset-based [`paginate::Paginator`] that flattens multi-page search endpoints into bounded
//! result lists. [`tools`] and [`server`] wire those verbs to an MCP host over stdio.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod cache;
pub mod client;
pub mod config;
pub mod environment;
pub mod error;
pub mod http;
pub mod obs;
pub mod paginate;
pub mod project;
pub mod rest;
pub mod search;
pub mod server;
pub mod store;
pub mod tools;

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		path::{Path, PathBuf},
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::RwLock;
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError, Method};
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::{Map, Value};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::Result;
}

pub use reqwest;
pub use url;
// Only the binary target links these.
use {color_eyre as _, dotenvy as _};
#[cfg(test)] use httpmock as _;
