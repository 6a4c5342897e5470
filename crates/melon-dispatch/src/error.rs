//! Error types for procedure dispatch
//!
//! [`DispatchError`] surfaces to the calling program. [`BridgeError`] never
//! leaves the automation bridge: it is logged and turned into the `BAD`
//! sentinel or an unavailable binding.

/// Errors raised while encoding, decoding or invoking a dispatch request
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// Active screen is not the request's target screen
    #[error("cannot dispatch procedure: application is on screen '{actual}', not '{expected}'")]
    ScreenMismatch {
        /// Screen the request targets
        expected: String,
        /// Screen currently active
        actual: String,
    },

    /// No procedure with that name is registered
    #[error("could not find procedure '{0}'")]
    ProcedureNotFound(String),

    /// Procedure ran and reported failure
    #[error("procedure '{name}' failed: {message}")]
    ProcedureFailed {
        /// Procedure name
        name: String,
        /// Failure message
        message: String,
    },

    /// Payload lacks a required field
    #[error("dispatch payload missing field '{0}'")]
    MissingField(&'static str),

    /// Argument payload is not a list
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    /// JSON codec failure
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Background delivery requested without an automation provider
    #[error("background dispatch requires an automation provider")]
    AutomationUnavailable,
}

impl DispatchError {
    /// Create screen mismatch error
    pub fn screen_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::ScreenMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create procedure failure error
    pub fn procedure_failed(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ProcedureFailed {
            name: name.into(),
            message: message.into(),
        }
    }
}

/// Failures inside the automation bridge
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BridgeError {
    /// No provider is registered under the requested name
    #[error("automation provider '{0}' is not registered")]
    NotRegistered(String),

    /// Bridge was never bound to a framework
    #[error("automation bridge is not bound")]
    Unbound,

    /// Provider factory failed
    #[error("automation factory failed: {0}")]
    Factory(String),

    /// Provider reported success without a framework handle
    #[error("automation result carried no framework")]
    MissingFramework,

    /// Framework call failed
    #[error("automation call '{procedure}' failed: {message}")]
    Call {
        /// Procedure name
        procedure: String,
        /// Failure message
        message: String,
    },

    /// Framework teardown failed
    #[error("automation close failed: {0}")]
    Close(String),

    /// Provider code panicked
    #[error("automation provider panicked: {0}")]
    Panicked(String),
}

/// Result type alias for dispatch operations
pub type DispatchResult<T> = Result<T, DispatchError>;
