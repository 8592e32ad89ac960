use thiserror::Error;

/// Error taxonomy for the discovery pipeline.
///
/// Cache, feedback, and dish-extraction failures never reach this enum —
/// they're absorbed and logged at the call site. This only models errors
/// that propagate to a run or abort construction.
#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("search credential pool exhausted")]
    QuotaExhausted,

    #[error("search transport error: status {status}")]
    SearchTransport { status: u16 },

    #[error("dish extraction failed for {url}")]
    Extraction { url: String },

    #[error("persistence error: {0}")]
    Persistence(String),

    #[error("run cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, DiscoveryError>;
