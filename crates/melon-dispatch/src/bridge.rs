//! Automation bridge
//!
//! Optional hand-off of procedure calls to an external automation component.
//! The component may be absent from a deployment, so every step is
//! degrade-safe: binding failures leave the bridge unavailable, and call
//! failures return [`CallResult::Bad`] instead of raising.
//!
//! # Binding contract
//!
//! ```text
//! provider.get(context, screen) → FrameworkResult
//!     success == false          → unavailable
//!     success == true           → framework handle → call / close
//! ```

use crate::error::BridgeError;
use dashmap::DashMap;
use serde_json::Value;
use std::any::Any;
use std::fmt::Debug;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

/// Opaque host context handed to automation providers
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HostContext {
    /// Application package id
    pub package: String,
}

impl HostContext {
    /// Create context for package
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
        }
    }
}

/// A bound automation framework
pub trait AutomationFramework: Send + Sync + Debug {
    /// Call a procedure by name
    ///
    /// # Errors
    /// Any failure of the external component.
    fn call(&self, procedure: &str, args: &[Value]) -> Result<Value, BridgeError>;

    /// Tear the framework down
    ///
    /// # Errors
    /// Any failure of the external component.
    fn close(&self) -> Result<bool, BridgeError>;
}

/// Result object returned by a provider factory
#[derive(Debug, Clone)]
pub struct FrameworkResult {
    /// Whether the framework was obtained
    pub success: bool,
    /// Framework handle, present on success
    pub framework: Option<Arc<dyn AutomationFramework>>,
}

impl FrameworkResult {
    /// Successful result
    #[must_use]
    pub fn ok(framework: Arc<dyn AutomationFramework>) -> Self {
        Self {
            success: true,
            framework: Some(framework),
        }
    }

    /// Unsuccessful result
    #[must_use]
    pub fn failed() -> Self {
        Self {
            success: false,
            framework: None,
        }
    }
}

/// Entry point of an external automation component
pub trait AutomationProvider: Send + Sync + Debug {
    /// Provider name used for selection
    fn name(&self) -> &str;

    /// Factory: obtain a framework for `(context, screen)`
    ///
    /// # Errors
    /// Any failure of the external component.
    fn get(&self, context: &HostContext, screen: &str) -> Result<FrameworkResult, BridgeError>;

    /// Register the active screen with the component
    ///
    /// # Errors
    /// Any failure of the external component.
    fn activate(&self, _context: &HostContext, _screen: &str) -> Result<(), BridgeError> {
        Ok(())
    }
}

/// Uniform call outcome; `Bad` means the call did not happen
#[derive(Debug, Clone, PartialEq)]
pub enum CallResult {
    /// Call completed with a value
    Value(Value),
    /// Call did not happen
    Bad,
}

impl CallResult {
    /// Check for the `BAD` sentinel
    #[inline]
    #[must_use]
    pub fn is_bad(&self) -> bool {
        matches!(self, Self::Bad)
    }
}

/// Providers available to this process, selected by name
#[derive(Debug, Default, Clone)]
pub struct AutomationRegistry {
    providers: Arc<DashMap<String, Arc<dyn AutomationProvider>>>,
}

impl AutomationRegistry {
    /// Create new empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider under its name
    pub fn register(&self, provider: Arc<dyn AutomationProvider>) {
        self.providers.insert(provider.name().to_string(), provider);
    }

    /// Check if provider exists
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.providers.contains_key(name)
    }

    /// Get provider by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn AutomationProvider>> {
        self.providers.get(name).map(|p| Arc::clone(p.value()))
    }
}

/// Result of probing for an automation provider
///
/// Absence is not an error; it is recorded as unavailable.
#[derive(Debug, Clone, Default)]
pub struct AutomationLink {
    provider: Option<Arc<dyn AutomationProvider>>,
}

impl AutomationLink {
    /// Probe registry for the configured provider
    #[must_use]
    pub fn probe(registry: &AutomationRegistry, name: Option<&str>) -> Self {
        let provider = name.and_then(|n| registry.get(n));
        match (name, &provider) {
            (Some(name), None) => {
                tracing::debug!(provider = name, "automation provider not registered");
            }
            (None, _) => tracing::debug!("no automation provider configured"),
            (Some(name), Some(_)) => tracing::debug!(provider = name, "automation provider found"),
        }
        Self { provider }
    }

    /// Link to a specific provider
    #[must_use]
    pub fn with_provider(provider: Arc<dyn AutomationProvider>) -> Self {
        Self {
            provider: Some(provider),
        }
    }

    /// Link with no provider
    #[inline]
    #[must_use]
    pub fn unavailable() -> Self {
        Self::default()
    }

    /// Check if a provider is present
    #[inline]
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.provider.is_some()
    }

    /// Bind a bridge for `(context, screen)`
    ///
    /// Any failure is logged and yields an unbound bridge.
    #[must_use]
    pub fn bind(&self, context: &HostContext, screen: &str) -> AutomationBridge {
        let Some(provider) = &self.provider else {
            return AutomationBridge::unbound();
        };
        match guarded(|| bind_framework(provider.as_ref(), context, screen)) {
            Ok(framework) => AutomationBridge {
                framework: Some(framework),
            },
            Err(e) => {
                tracing::warn!(provider = provider.name(), %screen, error = %e, "automation bind failed");
                AutomationBridge::unbound()
            }
        }
    }

    /// Register the active screen with the provider, best effort
    pub fn activate(&self, context: &HostContext, screen: &str) {
        let Some(provider) = &self.provider else {
            return;
        };
        if let Err(e) = guarded(|| provider.activate(context, screen)) {
            tracing::warn!(provider = provider.name(), %screen, error = %e, "automation activation failed");
        }
    }
}

fn bind_framework(
    provider: &dyn AutomationProvider,
    context: &HostContext,
    screen: &str,
) -> Result<Arc<dyn AutomationFramework>, BridgeError> {
    let result = provider.get(context, screen)?;
    if !result.success {
        return Err(BridgeError::Factory(format!(
            "provider reported no framework for screen '{screen}'"
        )));
    }
    result.framework.ok_or(BridgeError::MissingFramework)
}

/// Handle to a bound automation framework
#[derive(Debug, Clone, Default)]
pub struct AutomationBridge {
    framework: Option<Arc<dyn AutomationFramework>>,
}

impl AutomationBridge {
    /// Bridge with no framework
    #[inline]
    #[must_use]
    pub fn unbound() -> Self {
        Self::default()
    }

    /// Check if bound to a framework
    #[inline]
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.framework.is_some()
    }

    /// Call a procedure through the framework
    ///
    /// Never raises: any failure, including an unbound bridge, is `Bad`.
    #[must_use]
    pub fn call(&self, procedure: &str, args: &[Value]) -> CallResult {
        let outcome = match &self.framework {
            Some(framework) => guarded(|| framework.call(procedure, args)),
            None => Err(BridgeError::Unbound),
        };
        match outcome {
            Ok(value) => CallResult::Value(value),
            Err(e) => {
                tracing::trace!(%procedure, error = %e, "automation call did not happen");
                CallResult::Bad
            }
        }
    }

    /// Tear down the framework, best effort
    #[must_use]
    pub fn close(&self) -> bool {
        let outcome = match &self.framework {
            Some(framework) => guarded(|| framework.close()),
            None => Err(BridgeError::Unbound),
        };
        outcome.unwrap_or_else(|e| {
            tracing::debug!(error = %e, "automation close failed");
            false
        })
    }
}

fn guarded<T>(f: impl FnOnce() -> Result<T, BridgeError>) -> Result<T, BridgeError> {
    catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|payload| Err(BridgeError::Panicked(panic_message(&*payload))))
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}
