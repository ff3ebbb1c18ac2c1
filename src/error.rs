/// Failures raised by the timing core.
///
/// Both variants are recoverable: a bad kickoff only spoils the evaluation of
/// that one fixture, and a bad policy is rejected before any evaluation runs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StatusError {
    /// A kickoff or comparison instant could not be parsed or represented.
    #[error("invalid timestamp: {raw:?}")]
    InvalidTimestamp { raw: String },

    /// The configured match window is empty, negative or longer than
    /// `MAX_TOTAL_MINUTES`.
    #[error("invalid duration policy: total {total_minutes} minutes")]
    InvalidDurationPolicy { total_minutes: i64 },
}

impl StatusError {
    pub(crate) fn timestamp(raw: impl Into<String>) -> Self {
        Self::InvalidTimestamp { raw: raw.into() }
    }
}
