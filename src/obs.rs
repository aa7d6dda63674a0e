//! Logging and observability helpers.
//!
//! - [`logging`] installs the `tracing-subscriber` stack and hands out the [`LogHandle`] used to
//!   change the level at runtime.
//! - Every core operation runs inside an `ebay_broker.operation` span carrying `operation` and
//!   `stage` fields.
//! - Enable the `metrics` feature to increment the `ebay_broker_operation_total` counter for
//!   every attempt/success/failure, labeled by `operation` + `outcome`.

pub mod logging;

mod metrics;
mod tracing;

pub use self::{logging::*, metrics::*, tracing::*};

// self
use crate::_prelude::*;

/// Operations observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationKind {
	/// Token lookup or client-credentials grant.
	Token,
	/// Multi-page fetch against a search endpoint.
	Paginate,
	/// Single arbitrary REST call.
	Request,
}
impl OperationKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OperationKind::Token => "token",
			OperationKind::Paginate => "paginate",
			OperationKind::Request => "request",
		}
	}
}
impl Display for OperationKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationOutcome {
	/// Entry to an operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl OperationOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OperationOutcome::Attempt => "attempt",
			OperationOutcome::Success => "success",
			OperationOutcome::Failure => "failure",
		}
	}
}
impl Display for OperationOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Runs `fut` inside an operation span and records attempt + outcome.
pub async fn observe<T, Fut>(kind: OperationKind, stage: &'static str, fut: Fut) -> Result<T>
where
	Fut: Future<Output = Result<T>>,
{
	let span = OperationSpan::new(kind, stage);

	record_operation_outcome(kind, OperationOutcome::Attempt);

	let result = span.instrument(fut).await;

	match &result {
		Ok(_) => record_operation_outcome(kind, OperationOutcome::Success),
		Err(e) => {
			record_operation_outcome(kind, OperationOutcome::Failure);
			::tracing::debug!(operation = kind.as_str(), stage, error = %e, "Operation failed.");
		},
	}

	result
}
