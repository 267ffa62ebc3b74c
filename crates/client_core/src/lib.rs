//! Event bridge between the UI and its host.
//!
//! Inbound host messages are routed through two independent tables:
//! `type` keys map to a single callback that later registrations replace,
//! `action` keys map to an ordered list of listeners. Outbound requests go
//! through a [`HostTransport`] and resolve to the decoded response body.

use std::{
    panic::{catch_unwind, AssertUnwindSafe},
    sync::Arc,
};

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use shared::{
    error::{BridgeError, HandlerError, SerializationError, TransportError},
    protocol::{requests, sounds, InboundMessage, SoundCue, DEFAULT_SOUND_SET},
};
use tokio::{runtime::Handle, sync::mpsc, task::JoinHandle};
use tracing::{debug, error, warn};

pub mod config;
mod registry;
pub mod transport;

pub use registry::{Handler, ListenerGuard};
pub use transport::{HostResponse, HostTransport, HttpTransport, MissingHostTransport};

use registry::{CallbackTable, ListenerTable};

/// Keys the bridge binds globally, independent of any component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Escape,
    Other(String),
}

impl Key {
    pub fn from_name(name: &str) -> Self {
        match name {
            "Escape" | "Esc" | "escape" => Self::Escape,
            other => Self::Other(other.to_string()),
        }
    }
}

/// What a single dispatch did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub callback_invoked: bool,
    pub listeners_invoked: usize,
    pub failures: Vec<HandlerError>,
}

impl DispatchReport {
    pub fn handled(&self) -> bool {
        self.callback_invoked || self.listeners_invoked > 0
    }
}

struct BridgeInner {
    callbacks: CallbackTable,
    listeners: Arc<ListenerTable>,
    transport: Arc<dyn HostTransport>,
    default_sound_set: String,
}

/// Cheap to clone; clones share registrations and transport.
#[derive(Clone)]
pub struct EventBridge {
    inner: Arc<BridgeInner>,
}

impl EventBridge {
    pub fn new(transport: Arc<dyn HostTransport>) -> Self {
        Self::with_sound_set(transport, DEFAULT_SOUND_SET)
    }

    pub fn with_sound_set(transport: Arc<dyn HostTransport>, default_sound_set: &str) -> Self {
        Self {
            inner: Arc::new(BridgeInner {
                callbacks: CallbackTable::default(),
                listeners: Arc::new(ListenerTable::default()),
                transport,
                default_sound_set: default_sound_set.to_string(),
            }),
        }
    }

    /// A bridge with no host attached; outbound requests fail.
    pub fn detached() -> Self {
        Self::new(Arc::new(MissingHostTransport))
    }

    /// Registers the `type` handler for `key`, replacing any previous one.
    pub fn on<F>(&self, key: &str, handler: F)
    where
        F: Fn(&Value) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.on_shared(key, Arc::new(handler));
    }

    /// Registers an already shared handler, so the caller can later remove
    /// exactly this registration with [`EventBridge::off_if`].
    pub fn on_shared(&self, key: &str, handler: Handler) {
        let replaced = self.inner.callbacks.insert(key, handler);
        debug!(key, replaced, "callback registered");
    }

    /// Removes the callback for `key` only if it is still `handler`.
    pub fn off_if(&self, key: &str, handler: &Handler) -> bool {
        let removed = self.inner.callbacks.remove_if(key, handler);
        if removed {
            debug!(key, "callback removed");
        }
        removed
    }

    pub fn off(&self, key: &str) {
        if self.inner.callbacks.remove(key) {
            debug!(key, "callback removed");
        }
    }

    pub fn has_callback(&self, key: &str) -> bool {
        self.inner.callbacks.contains(key)
    }

    /// Appends a listener for `action`. It stays registered until the
    /// returned guard is disposed or dropped.
    pub fn subscribe<F>(&self, action: &str, handler: F) -> ListenerGuard
    where
        F: Fn(&Value) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let id = self.inner.listeners.add(action, Arc::new(handler));
        debug!(action, "listener subscribed");
        ListenerGuard::new(&self.inner.listeners, action, id)
    }

    /// Drops every listener of `action`. Outstanding guards become no-ops.
    pub fn unsubscribe_all(&self, action: &str) -> usize {
        let removed = self.inner.listeners.clear(action);
        debug!(action, removed, "listeners cleared");
        removed
    }

    pub fn listener_count(&self, action: &str) -> usize {
        self.inner.listeners.count(action)
    }

    pub fn has_listeners(&self, action: &str) -> bool {
        self.inner.listeners.has_key(action)
    }

    pub fn dispatch(&self, message: &InboundMessage) -> DispatchReport {
        let mut report = DispatchReport::default();

        if let Some(kind) = message.kind.as_deref() {
            if let Some(handler) = self.inner.callbacks.get(kind) {
                report.callback_invoked = true;
                if let Err(err) = invoke(kind, &handler, &message.data) {
                    report.failures.push(err);
                }
            }
        }

        if let Some(action) = message.action.as_deref() {
            for handler in self.inner.listeners.snapshot(action) {
                report.listeners_invoked += 1;
                if let Err(err) = invoke(action, &handler, &message.data) {
                    report.failures.push(err);
                }
            }
        }

        if !report.handled() {
            debug!(
                kind = message.kind.as_deref(),
                action = message.action.as_deref(),
                "inbound message had no registered handler"
            );
        }
        report
    }

    /// Parses and dispatches a raw inbound payload.
    pub fn dispatch_raw(&self, raw: &str) -> Result<DispatchReport, SerializationError> {
        let message: InboundMessage = serde_json::from_str(raw).map_err(|err| {
            let err = SerializationError::new("inbound message", err);
            warn!(error = %err, "dropping malformed inbound message");
            err
        })?;
        Ok(self.dispatch(&message))
    }

    /// Dispatches raw payloads in arrival order until every sender is gone.
    pub async fn run_inbound(&self, mut inbound: mpsc::Receiver<String>) {
        while let Some(raw) = inbound.recv().await {
            let _ = self.dispatch_raw(&raw);
        }
        debug!("inbound channel closed");
    }

    /// Posts `payload` to the host request `name` and decodes the reply.
    pub async fn send<P, R>(&self, name: &str, payload: &P) -> Result<R, BridgeError>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let result = self.send_inner(name, payload).await;
        if let Err(err) = &result {
            error!(request = name, error = %err, "host request failed");
        }
        result
    }

    pub async fn send_value(&self, name: &str, payload: Value) -> Result<Value, BridgeError> {
        self.send(name, &payload).await
    }

    /// `send` with the default empty-object payload.
    pub async fn send_empty(&self, name: &str) -> Result<Value, BridgeError> {
        self.send_value(name, Value::Object(Default::default())).await
    }

    async fn send_inner<P, R>(&self, name: &str, payload: &P) -> Result<R, BridgeError>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let body = serde_json::to_vec(payload)
            .map_err(|err| SerializationError::new(format!("{name} request"), err))?;
        debug!(request = name, bytes = body.len(), "posting host request");

        let response = self.inner.transport.post(name, body).await?;
        if !response.is_success() {
            return Err(TransportError::status(name, response.status).into());
        }
        serde_json::from_slice(&response.body)
            .map_err(|err| SerializationError::new(format!("{name} response"), err).into())
    }

    /// Fire-and-forget sound cue. Failures are logged, never returned.
    /// Returns `None`, and sends nothing, when called outside a tokio runtime.
    pub fn play_sound(&self, sound: &str, sound_set: Option<&str>) -> Option<JoinHandle<()>> {
        let Ok(runtime) = Handle::try_current() else {
            warn!(sound, "no tokio runtime to play sound cue; skipped");
            return None;
        };
        let sound_set = sound_set.unwrap_or(self.inner.default_sound_set.as_str());
        let cue = SoundCue::new(sound, Some(sound_set));
        let bridge = self.clone();
        Some(runtime.spawn(async move {
            let _ = bridge.send::<_, Value>(requests::PLAY_SOUND, &cue).await;
        }))
    }

    /// Runs the global binding for `key`; returns whether one exists.
    pub async fn handle_key(&self, key: &Key) -> Result<bool, BridgeError> {
        match key {
            Key::Escape => {
                let _ = self.play_sound(sounds::BACK, None);
                self.send_empty(requests::CLOSE_TOURNAMENT).await?;
                Ok(true)
            }
            Key::Other(_) => Ok(false),
        }
    }
}

fn invoke(key: &str, handler: &Handler, data: &Value) -> Result<(), HandlerError> {
    let outcome = catch_unwind(AssertUnwindSafe(|| handler(data)));
    let err = match outcome {
        Ok(Ok(())) => return Ok(()),
        Ok(Err(err)) => HandlerError::new(key, format!("{err:#}")),
        Err(panic) => HandlerError::new(key, format!("panicked: {}", panic_message(&*panic))),
    };
    warn!(key, error = %err, "inbound handler failed");
    Err(err)
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
