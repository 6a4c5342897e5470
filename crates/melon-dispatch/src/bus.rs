//! Message bus delivery
//!
//! Dispatch payloads arrive on the always-registered background handler
//! ([`MessageBus::deliver`]). Background requests go straight to the
//! automation bridge. Foreground requests are re-published on a process-local
//! relay; a [`ForegroundListener`] attached while the host is in the
//! foreground hands them to the [`ProcedureInvoker`]. With no listener
//! attached the relay drops the message.
//!
//! Delivery is fire-and-forget: failures are logged, never raised.

use crate::bridge::{panic_message, AutomationLink, CallResult, HostContext};
use crate::error::{DispatchError, DispatchResult};
use crate::invoker::ProcedureInvoker;
use crate::payload::DispatchPayload;
use crate::request::{DeliveryMode, DispatchRequest};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

/// Default relay buffer size
pub const DEFAULT_RELAY_CAPACITY: usize = 64;

/// What happened to a delivered payload
#[derive(Debug, Clone, PartialEq)]
pub enum Delivery {
    /// Re-published to this many foreground listeners
    Relayed(usize),
    /// Foreground payload with no listener attached
    Dropped,
    /// Handed to the automation bridge
    Background(CallResult),
    /// Payload could not be decoded
    Rejected,
}

/// Process-local dispatch hub
#[derive(Debug)]
pub struct MessageBus {
    relay: broadcast::Sender<DispatchPayload>,
    automation: AutomationLink,
    context: HostContext,
}

impl MessageBus {
    /// Create bus with relay capacity
    #[must_use]
    pub fn new(relay_capacity: usize, automation: AutomationLink, context: HostContext) -> Self {
        let (relay, _) = broadcast::channel(relay_capacity.max(1));
        Self {
            relay,
            automation,
            context,
        }
    }

    /// Deliver a payload received from the host's message mechanism
    pub fn deliver(&self, payload: &DispatchPayload) -> Delivery {
        let request = match payload.decode() {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!(error = %e, "dispatch payload rejected");
                return Delivery::Rejected;
            }
        };

        match request.mode {
            DeliveryMode::Foreground => self.republish(payload, &request),
            DeliveryMode::Background => Delivery::Background(self.call_background(&request)),
        }
    }

    fn republish(&self, payload: &DispatchPayload, request: &DispatchRequest) -> Delivery {
        match self.relay.send(payload.clone()) {
            Ok(listeners) => {
                tracing::debug!(procedure = %request.procedure, listeners, "dispatch relayed to foreground");
                Delivery::Relayed(listeners)
            }
            Err(_) => {
                tracing::debug!(procedure = %request.procedure, "no foreground listener, dispatch dropped");
                Delivery::Dropped
            }
        }
    }

    /// Exactly one event is logged per call, warn on `Bad`.
    fn call_background(&self, request: &DispatchRequest) -> CallResult {
        let bridge = self.automation.bind(&self.context, &request.screen);
        let result = bridge.call(&request.procedure, &request.arguments);
        if result.is_bad() {
            tracing::warn!(
                procedure = %request.procedure,
                screen = %request.screen,
                args = request.arguments.len(),
                "failed to call background procedure"
            );
        } else {
            tracing::info!(
                procedure = %request.procedure,
                screen = %request.screen,
                args = request.arguments.len(),
                "background procedure dispatched"
            );
        }
        result
    }

    /// Subscribe to the foreground relay
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<DispatchPayload> {
        self.relay.subscribe()
    }

    /// Number of attached foreground listeners
    #[inline]
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.relay.receiver_count()
    }

    /// Automation link used for background delivery
    #[inline]
    #[must_use]
    pub fn automation(&self) -> &AutomationLink {
        &self.automation
    }

    /// Host context handed to automation providers
    #[inline]
    #[must_use]
    pub fn context(&self) -> &HostContext {
        &self.context
    }
}

/// Outcome of a relayed request, reported to an optional observer
pub type ListenerReport = (DispatchRequest, DispatchResult<()>);

/// Foreground relay subscriber bound to an invoker
///
/// Detaches when dropped.
#[derive(Debug)]
pub struct ForegroundListener {
    task: JoinHandle<()>,
}

impl ForegroundListener {
    /// Attach a listener to the bus
    ///
    /// Subscribes immediately. A procedure that panics is reported as
    /// `DispatchError::ProcedureFailed` and the listener keeps running.
    ///
    /// # Panics
    /// Panics if called outside a tokio runtime.
    #[must_use]
    pub fn attach(bus: &MessageBus, invoker: ProcedureInvoker) -> Self {
        Self::spawn(bus.subscribe(), invoker, None)
    }

    /// Attach a listener that also reports each outcome
    ///
    /// # Panics
    /// Panics if called outside a tokio runtime.
    #[must_use]
    pub fn attach_with_reports(
        bus: &MessageBus,
        invoker: ProcedureInvoker,
        reports: mpsc::UnboundedSender<ListenerReport>,
    ) -> Self {
        Self::spawn(bus.subscribe(), invoker, Some(reports))
    }

    fn spawn(
        mut rx: broadcast::Receiver<DispatchPayload>,
        invoker: ProcedureInvoker,
        reports: Option<mpsc::UnboundedSender<ListenerReport>>,
    ) -> Self {
        let task = tokio::spawn(async move {
            loop {
                let payload = match rx.recv().await {
                    Ok(payload) => payload,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "foreground listener lagged");
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                };
                let request = match payload.decode() {
                    Ok(request) => request,
                    Err(e) => {
                        tracing::warn!(error = %e, "relayed payload rejected");
                        continue;
                    }
                };
                let outcome = catch_unwind(AssertUnwindSafe(|| invoker.invoke_request(&request)))
                    .unwrap_or_else(|panic| {
                        Err(DispatchError::procedure_failed(
                            request.procedure.as_str(),
                            panic_message(&*panic),
                        ))
                    });
                if let Err(e) = &outcome {
                    tracing::warn!(procedure = %request.procedure, error = %e, "foreground dispatch failed");
                }
                if let Some(reports) = &reports {
                    let _ = reports.send((request, outcome));
                }
            }
        });
        Self { task }
    }

    /// Detach from the bus
    pub fn detach(self) {
        drop(self);
    }
}

impl Drop for ForegroundListener {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Lifecycle-gated foreground listener registration
#[derive(Debug)]
pub struct ForegroundScope {
    bus: Arc<MessageBus>,
    invoker: ProcedureInvoker,
    listener: Option<ForegroundListener>,
}

impl ForegroundScope {
    /// Create scope; no listener is attached until the host enters the foreground
    #[must_use]
    pub fn new(bus: Arc<MessageBus>, invoker: ProcedureInvoker) -> Self {
        Self {
            bus,
            invoker,
            listener: None,
        }
    }

    /// Host entered the foreground
    ///
    /// # Panics
    /// Panics if called outside a tokio runtime.
    pub fn on_foreground_enter(&mut self) {
        if self.listener.is_none() {
            self.listener = Some(ForegroundListener::attach(&self.bus, self.invoker.clone()));
            tracing::debug!("foreground listener attached");
        }
    }

    /// Host left the foreground
    pub fn on_foreground_exit(&mut self) {
        if let Some(listener) = self.listener.take() {
            listener.detach();
            tracing::debug!("foreground listener detached");
        }
    }

    /// Check if a listener is attached
    #[inline]
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.listener.is_some()
    }
}
