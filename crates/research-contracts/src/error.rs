//! Workspace-wide error kind, matching the propagation policy in the
//! error-handling design: `NotFound`, `InvalidArgument`, `Conflict`,
//! `Unavailable` (with `BreakerOpen`/`Timeout` folded in as reasons),
//! and `Internal`.

use thiserror::Error;

/// The reason an external dependency was unavailable. Kept separate from
/// the message so callers (stage recovery, breaker accounting) can match on
/// it without parsing strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnavailableReason {
    /// The dependency itself returned a failure.
    DependencyFailure,
    /// The call exceeded its deadline.
    Timeout,
    /// The circuit breaker for this service was OPEN; the call was never attempted.
    BreakerOpen,
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("{service} unavailable ({reason:?}): {message}")]
    Unavailable {
        service: String,
        reason: UnavailableReason,
        message: String,
    },

    #[error("internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn not_found(what: impl Into<String>) -> Self {
        CoreError::NotFound(what.into())
    }

    pub fn invalid_argument(what: impl Into<String>) -> Self {
        CoreError::InvalidArgument(what.into())
    }

    pub fn conflict(what: impl Into<String>) -> Self {
        CoreError::Conflict(what.into())
    }

    pub fn unavailable(
        service: impl Into<String>,
        reason: UnavailableReason,
        message: impl Into<String>,
    ) -> Self {
        CoreError::Unavailable {
            service: service.into(),
            reason,
            message: message.into(),
        }
    }

    pub fn internal(what: impl Into<String>) -> Self {
        CoreError::Internal(what.into())
    }

    /// The boundary-facing error kind tag from the external-interfaces
    /// contract (`not_found`, `conflict`, `invalid_argument`, `unavailable`,
    /// `internal`).
    pub fn kind(&self) -> &'static str {
        match self {
            CoreError::NotFound(_) => "not_found",
            CoreError::InvalidArgument(_) => "invalid_argument",
            CoreError::Conflict(_) => "conflict",
            CoreError::Unavailable { .. } => "unavailable",
            CoreError::Internal(_) => "internal",
        }
    }

    /// Whether this error is eligible to be treated as unavailable for
    /// breaker-accounting and stage-recovery purposes.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, CoreError::Unavailable { .. })
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
