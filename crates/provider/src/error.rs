use std::time::Duration;

use helmrp_core::action::JobAction;
use helmrp_core::error::CoreError;

use crate::backend::BackendError;

/// Errors surfaced by the orchestration core.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// A job or task payload could not be decoded. Indicates a producer bug;
    /// resubmitting the same payload will fail the same way.
    #[error("Malformed directive: {0}")]
    MalformedDirective(String),

    /// The action is not handled by this provider.
    #[error("The action [{0}] is not supported")]
    UnsupportedAction(String),

    /// A backend capability failed. Passed through unmodified.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// The release reached its failed state.
    #[error("Release [{cluster_name}] failed")]
    ReleaseFailed { cluster_name: String },

    /// The wait budget elapsed before a terminal state was observed.
    #[error("Wait timeout [{}s]", .timeout.as_secs())]
    Timeout { timeout: Duration },

    /// The wait was stopped by an external cancellation signal.
    #[error("Wait cancelled")]
    Cancelled,

    /// Invalid process configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A task's wait phase failed; carries the detail operators need.
    #[error("Task [{task_id}] {action} of cluster [{cluster_name}] failed: {source}")]
    TaskFailed {
        task_id: String,
        action: JobAction,
        cluster_name: String,
        #[source]
        source: Box<ProviderError>,
    },
}

/// Convenience alias for orchestration results.
pub type ProviderResult<T> = Result<T, ProviderError>;

impl ProviderError {
    /// The underlying error, looking through [`ProviderError::TaskFailed`].
    pub fn root(&self) -> &ProviderError {
        match self {
            Self::TaskFailed { source, .. } => source.root(),
            other => other,
        }
    }

    /// Whether the caller may re-poll with a fresh budget.
    ///
    /// Only timeouts and connection-class backend failures qualify; every
    /// other variant is terminal for the task. Connection-class here means
    /// [`BackendError::Unavailable`]; use [`ProviderError::is_retryable_with`]
    /// to apply a backend's own classification.
    pub fn is_retryable(&self) -> bool {
        self.is_retryable_with(|e| matches!(e, BackendError::Unavailable(_)))
    }

    /// Like [`ProviderError::is_retryable`], with `is_transient` deciding
    /// which backend errors are connection-class.
    pub fn is_retryable_with<F>(&self, is_transient: F) -> bool
    where
        F: Fn(&BackendError) -> bool,
    {
        match self.root() {
            Self::Timeout { .. } => true,
            Self::Backend(e) => is_transient(e),
            _ => false,
        }
    }

    pub(crate) fn unsupported(action: JobAction) -> Self {
        Self::UnsupportedAction(action.to_string())
    }
}

impl From<CoreError> for ProviderError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::MalformedDirective(msg) => Self::MalformedDirective(msg),
            CoreError::UnknownAction(name) => Self::UnsupportedAction(name),
        }
    }
}
