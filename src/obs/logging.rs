//! Subscriber installation and the runtime log-level capability.

// crates.io
use tracing_subscriber::{
	EnvFilter, Registry, fmt, layer::SubscriberExt, reload, util::SubscriberInitExt,
};
// self
use crate::{_prelude::*, error::ConfigError};

/// Default filter when neither `RUST_LOG` nor the configured level is usable.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Severity names accepted by [`LogHandle::set_level`] (syslog-style, as agent hosts send them).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
	/// Most verbose.
	Trace,
	/// Diagnostic detail.
	Debug,
	/// Routine progress.
	Info,
	/// Normal but significant.
	Notice,
	/// Recoverable problem.
	Warning,
	/// Failed operation.
	Error,
	/// Critical condition.
	Critical,
	/// Action required immediately.
	Alert,
	/// System unusable.
	Emergency,
}
impl LogLevel {
	/// Maps the severity onto the closest `tracing` filter directive.
	pub const fn as_filter(self) -> &'static str {
		match self {
			LogLevel::Trace => "trace",
			LogLevel::Debug => "debug",
			LogLevel::Info | LogLevel::Notice => "info",
			LogLevel::Warning => "warn",
			LogLevel::Error | LogLevel::Critical | LogLevel::Alert | LogLevel::Emergency =>
				"error",
		}
	}
}
impl FromStr for LogLevel {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_lowercase().as_str() {
			"trace" => Ok(LogLevel::Trace),
			"debug" => Ok(LogLevel::Debug),
			"info" => Ok(LogLevel::Info),
			"notice" => Ok(LogLevel::Notice),
			"warn" | "warning" => Ok(LogLevel::Warning),
			"error" => Ok(LogLevel::Error),
			"critical" => Ok(LogLevel::Critical),
			"alert" => Ok(LogLevel::Alert),
			"emergency" => Ok(LogLevel::Emergency),
			other => Err(format!("unknown log level '{other}'")),
		}
	}
}

/// Handle to the installed filter; the only way to change verbosity after start-up.
#[derive(Clone)]
pub struct LogHandle {
	handle: reload::Handle<EnvFilter, Registry>,
}
impl LogHandle {
	/// Replaces the active filter with `level`.
	pub fn set_level(&self, level: LogLevel) -> Result<(), ConfigError> {
		self.handle
			.reload(EnvFilter::new(level.as_filter()))
			.map_err(|e| ConfigError::Logging { message: e.to_string() })?;

		tracing::info!(level = level.as_filter(), "Log level updated.");

		Ok(())
	}

	/// Renders the active filter directives.
	pub fn current_filter(&self) -> Option<String> {
		self.handle.with_current(|filter| filter.to_string()).ok()
	}
}
impl Debug for LogHandle {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("LogHandle").field("filter", &self.current_filter()).finish()
	}
}

/// Installs the global subscriber: reloadable `EnvFilter` + `fmt` layer on stderr.
///
/// `RUST_LOG` takes precedence over `default_filter`. Stdout is left untouched because the
/// tool server speaks its protocol there.
pub fn init_logging(default_filter: &str) -> Result<LogHandle, ConfigError> {
	let filter = EnvFilter::try_from_default_env()
		.or_else(|_| EnvFilter::try_new(default_filter))
		.unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
	let (filter, handle) = reload::Layer::new(filter);

	tracing_subscriber::registry()
		.with(filter)
		.with(fmt::layer().with_writer(std::io::stderr).with_target(false))
		.try_init()
		.map_err(|e| ConfigError::Logging { message: e.to_string() })?;

	Ok(LogHandle { handle })
}
