//! Procedure registry
//!
//! The generated program registers its procedures by name at startup. Names
//! keep registration order and the first registration of a name wins.

use crate::error::{DispatchError, DispatchResult};
use indexmap::IndexMap;
use parking_lot::RwLock;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// A registered procedure: variadic, positional, JSON-valued
pub type Procedure = Arc<dyn Fn(&[Value]) -> Result<Value, String> + Send + Sync>;

/// Outcome of a registry lookup-and-call
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    /// Procedure ran and returned a value
    Found(Value),
    /// No procedure with that name
    NotFound,
}

impl Lookup {
    /// Check if a procedure ran
    #[inline]
    #[must_use]
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}

/// Name → procedure environment of the active program
#[derive(Default)]
pub struct ProcedureRegistry {
    procedures: RwLock<IndexMap<String, Procedure>>,
}

impl ProcedureRegistry {
    /// Create new empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a procedure
    ///
    /// Returns `false` if the name was already registered; the earlier
    /// procedure stays in place.
    pub fn register<F>(&self, name: impl Into<String>, procedure: F) -> bool
    where
        F: Fn(&[Value]) -> Result<Value, String> + Send + Sync + 'static,
    {
        let name = name.into();
        let mut procedures = self.procedures.write();
        if procedures.contains_key(&name) {
            tracing::debug!(procedure = %name, "procedure already registered, keeping first");
            return false;
        }
        procedures.insert(name, Arc::new(procedure));
        true
    }

    /// Look up and call a procedure
    ///
    /// The registry lock is not held while the procedure runs.
    ///
    /// # Errors
    /// - `DispatchError::ProcedureFailed` if the procedure reports failure
    pub fn invoke(&self, name: &str, args: &[Value]) -> DispatchResult<Lookup> {
        let Some(procedure) = self.procedures.read().get(name).cloned() else {
            return Ok(Lookup::NotFound);
        };
        procedure(args)
            .map(Lookup::Found)
            .map_err(|message| DispatchError::procedure_failed(name, message))
    }

    /// Check if procedure exists
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.procedures.read().contains_key(name)
    }

    /// Remove procedure
    #[inline]
    pub fn remove(&self, name: &str) -> bool {
        self.procedures.write().shift_remove(name).is_some()
    }

    /// Registered names in registration order
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.procedures.read().keys().cloned().collect()
    }

    /// Get number of registered procedures
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.procedures.read().len()
    }

    /// Check if registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.procedures.read().is_empty()
    }
}

impl fmt::Debug for ProcedureRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcedureRegistry")
            .field("names", &self.names())
            .finish()
    }
}
