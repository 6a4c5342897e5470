//! Melon Procedure Dispatch
//!
//! Lets a notification action invoke a named procedure of the host program,
//! possibly in a different lifecycle state than when the action was created.
//!
//! # Core Concepts
//!
//! - [`DispatchRequest`]: screen + procedure + arguments + [`DeliveryMode`]
//! - [`DispatchPayload`]: transit form attached to an action handle
//! - [`MessageBus`]: receives payloads, relays foreground ones, runs background ones
//! - [`ProcedureInvoker`]: screen-affine call into the [`ProcedureRegistry`]
//! - [`AutomationBridge`]: degrade-safe handle to an optional automation component
//!
//! # Flow
//!
//! ```text
//! action fired → MessageBus::deliver(payload)
//!                  ├─ Foreground → relay → ForegroundListener → ProcedureInvoker
//!                  └─ Background → AutomationLink::bind → AutomationBridge::call
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod bridge;
pub mod bus;
pub mod error;
pub mod invoker;
pub mod payload;
pub mod registry;
pub mod request;
pub mod screen;

// Re-exports for convenience
pub use bridge::{
    AutomationBridge, AutomationFramework, AutomationLink, AutomationProvider,
    AutomationRegistry, CallResult, FrameworkResult, HostContext,
};
pub use bus::{
    Delivery, ForegroundListener, ForegroundScope, ListenerReport, MessageBus,
    DEFAULT_RELAY_CAPACITY,
};
pub use error::{BridgeError, DispatchError, DispatchResult};
pub use invoker::ProcedureInvoker;
pub use payload::{ArgumentsPayload, DispatchPayload, Transit};
pub use registry::{Lookup, Procedure, ProcedureRegistry};
pub use request::{canonical_procedure, DeliveryMode, DispatchRequest, PROCEDURE_MARKER};
pub use screen::{ActiveScreen, ScreenDirectory};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
