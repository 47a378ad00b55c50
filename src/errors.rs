//! The error types surfaced by trace construction, the OSRM engines and the
//! cleaning operators.
//!
//! Construction errors ([`PayloadError`]) are fatal: the trace is not
//! created. Batch errors ([`OsrmBatchError`]) are non-fatal: the affected
//! batch is left unchanged and the operator records a warning. Operator
//! errors ([`OperatorError`]) are returned before any mutation is applied.

use thiserror::Error;

/// Errors raised while validating a trace payload. The engine is not
/// created when one of these is returned; validation stops at the first
/// violation.
#[derive(Error, Debug)]
pub enum PayloadError {
    /// A ping (or payload) field violates its type or range contract.
    #[error("Invalid {field} at trace[{index}]: {reason}")]
    Validation {
        field: &'static str,
        index: usize,
        reason: String,
    },
    /// Input timestamps are not non-decreasing.
    #[error("Timestamps decrease at trace[{index}]")]
    Order { index: usize },
}

/// Errors from a single match or route call against an OSRM engine.
///
/// These are never fatal to the trace: the operator leaves the affected
/// batch or pair unchanged, records a warning and continues.
#[derive(Error, Debug)]
pub enum OsrmBatchError {
    /// Transport-level failure or a non-2xx status.
    #[error("Endpoint error: {0}")]
    Endpoint(String),
    /// Failed to parse the OSRM response.
    #[error("Failed to parse OSRM response: {0}")]
    JsonParse(#[from] serde_json::Error),
    /// The response parsed but contained no usable route.
    #[error("Response contained no route")]
    EmptyRoute,
    /// The tracepoints array does not line up with the request batch, so
    /// index alignment cannot be trusted.
    #[error("Expected {expected} tracepoints, response carried {got}")]
    TracepointMismatch { expected: usize, got: usize },
}

/// Errors returned by a cleaning operator before it mutates any state.
#[derive(Error, Debug)]
pub enum OperatorError {
    /// The operator's precondition is unmet, e.g. interpolation before map
    /// matching. Recoverable: run the missing operator and retry.
    #[error("{operator} requires {requirement}")]
    Precondition {
        operator: &'static str,
        requirement: &'static str,
    },
    /// Applying the operator's result would break a trace invariant.
    /// Indicates a bug or adversarial input; the trace is left untouched.
    #[error("Operator result would violate a trace invariant: {0}")]
    Invariant(String),
}
