//! Session error taxonomy.
//!
//! Classified so callers can pick the right surface: blocking notice and
//! module shutdown for data problems, inline retained-input messages for
//! validation, inline retryable messages for remote grading, and
//! swallow-and-log for focus operations. None of these may take down the
//! host process.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    /// Missing or malformed vocabulary/test data. Blocking notice, then the
    /// affected module shuts down; the host keeps running.
    #[error("data error: {0}")]
    Data(String),

    /// Empty input or missing required selection. Reported inline, input
    /// retained, non-fatal.
    #[error("{0}")]
    Validation(String),

    /// Sentence-grading collaborator unreachable or its response was
    /// malformed. Reported inline; the user may resubmit manually.
    #[error("grading service error: {0}")]
    RemoteCall(String),

    /// An OS-level focus/topmost operation failed. Swallowed and logged at
    /// the call site, never propagated to the session.
    #[error("focus operation failed: {0}")]
    FocusOperation(String),
}

impl SessionError {
    /// True when the error leaves session state untouched and the user can
    /// simply retry the triggering action.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SessionError::Validation(_) | SessionError::RemoteCall(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_classification() {
        assert!(SessionError::Validation("empty".into()).is_retryable());
        assert!(SessionError::RemoteCall("timeout".into()).is_retryable());
        assert!(!SessionError::Data("missing file".into()).is_retryable());
        assert!(!SessionError::FocusOperation("raise failed".into()).is_retryable());
    }
}
