use thiserror::Error;

/// Failures surfaced to the end user. Both are caught at the boundary where
/// the external call is made and converted to a non-fatal inline notice;
/// neither is allowed to terminate the session.
#[derive(Error, Debug, Clone)]
pub enum InsightError {
    /// The article store could not be reached or queried. The feed renders
    /// an empty-state message instead of crashing.
    #[error("article store unavailable: {0}")]
    StoreUnavailable(String),

    /// The completion service failed for any reason (network, auth, quota,
    /// malformed response). Reported inline in the chat pane; the
    /// conversation is not advanced.
    #[error("completion failed: {0}")]
    CompletionFailed(String),
}
