//! Procedure invoker
//!
//! Runs a named procedure only while its target screen is the active one.

use crate::error::{DispatchError, DispatchResult};
use crate::registry::{Lookup, ProcedureRegistry};
use crate::request::DispatchRequest;
use crate::screen::ScreenDirectory;
use serde_json::Value;
use std::sync::Arc;

/// Resolves procedure names against the active program and calls them
#[derive(Debug, Clone)]
pub struct ProcedureInvoker {
    screens: Arc<dyn ScreenDirectory>,
    registry: Arc<ProcedureRegistry>,
}

impl ProcedureInvoker {
    /// Create invoker over a screen directory and registry
    #[inline]
    #[must_use]
    pub fn new(screens: Arc<dyn ScreenDirectory>, registry: Arc<ProcedureRegistry>) -> Self {
        Self { screens, registry }
    }

    /// Invoke procedure on screen
    ///
    /// The procedure's return value is discarded.
    ///
    /// # Errors
    /// - `DispatchError::ScreenMismatch` if `screen` is not active; nothing runs
    /// - `DispatchError::ProcedureNotFound` if no procedure has that name
    /// - `DispatchError::ProcedureFailed` if the procedure reports failure
    pub fn invoke(&self, screen: &str, procedure: &str, args: &[Value]) -> DispatchResult<()> {
        let active = self.screens.current_screen_id();
        if active != screen {
            return Err(DispatchError::screen_mismatch(screen, active));
        }

        match self.registry.invoke(procedure, args)? {
            Lookup::Found(_) => {
                tracing::debug!(%screen, %procedure, args = args.len(), "procedure invoked");
                Ok(())
            }
            Lookup::NotFound => Err(DispatchError::ProcedureNotFound(procedure.to_string())),
        }
    }

    /// Invoke a decoded request
    ///
    /// # Errors
    /// See [`invoke`](Self::invoke).
    pub fn invoke_request(&self, request: &DispatchRequest) -> DispatchResult<()> {
        self.invoke(&request.screen, &request.procedure, &request.arguments)
    }

    /// Get registry reference
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &Arc<ProcedureRegistry> {
        &self.registry
    }
}
