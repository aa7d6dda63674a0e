//! Serves the eBay tools to an agent host over stdio.

// crates.io
use color_eyre::Result;
// self
use ebay_broker::{config::Config, obs, server::ToolServer, tools::ToolDispatcher};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
	color_eyre::install()?;

	// A missing `.env` is normal; real environment variables still apply.
	dotenvy::dotenv().ok();

	let config = Config::from_env()?;
	let log_handle = obs::init_logging(&config.log_filter)?;

	tracing::info!(?config, "Starting eBay tool server.");

	let dispatcher = ToolDispatcher::from_config(config)?;

	ToolServer::new(dispatcher, Some(log_handle)).run_stdio().await?;

	Ok(())
}
