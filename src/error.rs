//! Error types used by the kegcore runtime, its collaborators and queued tasks.
//!
//! - [`CoreError`] errors raised by the orchestration runtime itself.
//! - [`ApiError`] failures reported by the remote-API collaborator.
//! - [`BindError`] failures to establish a collaborator connection.
//! - [`TaskError`] outcome of a single queued task; logged and swallowed by the queue.
//! - [`SubmitError`] a task could not be placed on the serialized queue.
//!
//! Every enum provides `as_label` (stable snake_case label for logs).

use std::time::Duration;
use thiserror::Error;

/// # Errors produced by the kegcore runtime.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum CoreError {
    /// `run` was called while another `run` is still driving the core.
    #[error("core is already running")]
    AlreadyRunning,

    /// The builder was asked to build without a mandatory collaborator.
    #[error("missing collaborator: {name}")]
    MissingCollaborator {
        /// Name of the builder slot left empty.
        name: &'static str,
    },

    /// Installing OS signal handlers failed.
    #[error("signal handler registration failed: {0}")]
    Signal(#[from] std::io::Error),

    /// Installing the global tracing subscriber failed.
    #[error("logging init failed: {reason}")]
    Logging {
        /// Underlying message.
        reason: String,
    },
}

impl CoreError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use kegcore::CoreError;
    ///
    /// let err = CoreError::MissingCollaborator { name: "flow_manager" };
    /// assert_eq!(err.as_label(), "core_missing_collaborator");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            CoreError::AlreadyRunning => "core_already_running",
            CoreError::MissingCollaborator { .. } => "core_missing_collaborator",
            CoreError::Signal(_) => "core_signal",
            CoreError::Logging { .. } => "core_logging",
        }
    }
}

/// # Errors reported by the remote-API collaborator.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The token did not resolve to a user.
    #[error("authentication failed: {reason}")]
    Auth {
        /// Server or client supplied reason.
        reason: String,
    },

    /// Transport or server failure of an otherwise valid request.
    #[error("api request failed: {reason}")]
    Request {
        /// Server or client supplied reason.
        reason: String,
    },

    /// Base address or credential missing.
    #[error("api not configured: {reason}")]
    NotConfigured {
        /// What is missing.
        reason: String,
    },
}

impl ApiError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ApiError::Auth { .. } => "api_auth",
            ApiError::Request { .. } => "api_request",
            ApiError::NotConfigured { .. } => "api_not_configured",
        }
    }
}

/// # Errors raised while binding a collaborator.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BindError {
    /// The platform refused to hand out a connection.
    #[error("{service} refused binding: {reason}")]
    Refused {
        /// Collaborator name.
        service: &'static str,
        /// Platform supplied reason.
        reason: String,
    },

    /// The connection did not come up within `Config::bind_timeout`.
    #[error("{service} binding timed out after {timeout:?}")]
    Timeout {
        /// Collaborator name.
        service: &'static str,
        /// The timeout that elapsed.
        timeout: Duration,
    },
}

impl BindError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            BindError::Refused { .. } => "bind_refused",
            BindError::Timeout { .. } => "bind_timeout",
        }
    }
}

/// # Outcome of a queued task.
///
/// Returned by [`Task::spawn`](crate::Task::spawn) futures. The serialized queue
/// logs every error and moves on to the next task; nothing is rethrown.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum TaskError {
    /// The collaborator needed by the task is not `Bound`.
    #[error("{service} is not bound")]
    Unbound {
        /// Collaborator name.
        service: &'static str,
    },

    /// A synchronous API call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Bootstrap (tap fetch/registration) failed; the core stays bound but unconfigured.
    #[error("bootstrap failed: {source}")]
    Bootstrap {
        /// The API failure that aborted bootstrap.
        source: ApiError,
    },

    /// Generic task failure.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// The queue was stopped while the task was in flight.
    #[error("queue stopped")]
    Canceled,
}

impl TaskError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use kegcore::TaskError;
    ///
    /// let err = TaskError::Unbound { service: "api" };
    /// assert_eq!(err.as_label(), "task_unbound");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Unbound { .. } => "task_unbound",
            TaskError::Api(_) => "task_api",
            TaskError::Bootstrap { .. } => "task_bootstrap",
            TaskError::Fail { .. } => "task_failed",
            TaskError::Canceled => "task_canceled",
        }
    }
}

/// Error returned when a task cannot be placed on the serialized queue.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitError {
    /// No queue exists (API collaborator not yet bound, or core stopped).
    #[error("no active queue")]
    NoQueue,

    /// The bounded queue is full.
    #[error("queue full")]
    Full,

    /// The queue worker has exited.
    #[error("queue closed")]
    Closed,
}

impl SubmitError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            SubmitError::NoQueue => "submit_no_queue",
            SubmitError::Full => "submit_full",
            SubmitError::Closed => "submit_closed",
        }
    }
}
