use thiserror::Error;

/// Failures surfaced by the explorer engine.
///
/// None of these are fatal to a host: the presentation layer decides whether to
/// show the message or silently skip the refresh, leaving prior view state as-is.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExplorerError {
    /// No workspace folder (or no file context) was available for the request.
    #[error("No workspace folder open")]
    NoWorkspace,

    /// The compiler ran but its output carried no SSA region for the function.
    #[error("No SSA output found for: {function}")]
    SsaNotFound { function: String },

    /// The toolchain could not be launched or its output could not be read.
    #[error("toolchain failure: {0}")]
    Toolchain(String),
}

impl ExplorerError {
    pub fn not_found(function: impl Into<String>) -> Self {
        Self::SsaNotFound {
            function: function.into(),
        }
    }

    /// True when the error should be reported as "nothing to show" rather than a hard failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::SsaNotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, ExplorerError>;
