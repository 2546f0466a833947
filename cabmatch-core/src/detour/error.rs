use thiserror::Error;

/// Errors from [`crate::detour::DetourProvider::detour_metrics`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DetourError {
    /// No cabs or no riders were provided.
    ///
    /// A detour table needs at least one row and one column. Callers should
    /// reject empty batches before asking for detours.
    #[error("at least one cab and one rider are required")]
    EmptyInput,
    /// The routing backend failed to produce metrics.
    #[error("routing backend failed: {message}")]
    Routing {
        /// Backend-specific description.
        message: String,
    },
}
