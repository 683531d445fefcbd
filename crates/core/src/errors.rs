use thiserror::Error;

/// Unified error type for the entire token-pulse-core library.
///
/// Ignored conditions (price update for an unknown id, an empty feed tick)
/// are not errors and never surface here.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Lifecycle ───────────────────────────────────────────────────
    #[error("Dashboard core is not mounted")]
    NotMounted,

    #[error("Dashboard core is already mounted")]
    AlreadyMounted,

    #[error("Dashboard core has been torn down")]
    TornDown,

    #[error("No tokio runtime available to mount the dashboard core")]
    NoRuntime,

    // ── Configuration ───────────────────────────────────────────────
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Data Source ─────────────────────────────────────────────────
    #[error("Data source error ({source_name}): {message}")]
    DataSource {
        source_name: String,
        message: String,
    },

    // ── Export ──────────────────────────────────────────────────────
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl CoreError {
    /// Returns `true` for errors caused by using the core outside its
    /// mounted lifecycle.
    #[must_use]
    pub fn is_lifecycle(&self) -> bool {
        matches!(
            self,
            CoreError::NotMounted | CoreError::AlreadyMounted | CoreError::TornDown
        )
    }
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Serialization(e.to_string())
    }
}
