//! Bus connection abstraction
//!
//! [`Bus`] is the part of a message-bus connection the daemon needs: object
//! (un)registration and signal emission. [`DBusConnection`] serves it on a
//! real D-Bus connection; [`LocalBus`] implements it in-process, dispatching
//! inbound calls itself and fanning signals out to subscribers through a
//! `tokio::sync::broadcast` channel.
//!
//! [`DBusConnection`]: super::connection::DBusConnection

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{broadcast, RwLock};

use super::error::BusError;
use zvariant::OwnedValue;

use super::path::is_valid_object_path;
use super::value::{MethodReply, PropertyBag};

/// Handle of a registered object
///
/// Ids start at 1; 0 is never handed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegistrationId(u32);

impl RegistrationId {
    pub(crate) fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for RegistrationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-object dispatch table
///
/// Unknown properties and methods fall through to typed errors.
#[async_trait]
pub trait ObjectHandler: Send + Sync {
    /// Interface implemented by the object
    fn interface(&self) -> &'static str;

    async fn get_property(&self, name: &str) -> Result<OwnedValue, BusError> {
        Err(BusError::NoSuchProperty(name.to_string()))
    }

    async fn get_all_properties(&self) -> Result<PropertyBag, BusError> {
        Ok(PropertyBag::new())
    }

    async fn call_method(&self, method: &str) -> Result<MethodReply, BusError> {
        Err(BusError::NoSuchMethod(method.to_string()))
    }
}

/// Signals emitted by the Manager object
#[derive(Debug, Clone, PartialEq)]
pub enum Signal {
    /// A PCM became available
    PcmAdded {
        path: String,
        properties: Arc<PropertyBag>,
    },
    /// A PCM went away
    PcmRemoved { path: String },
}

impl Signal {
    /// Path of the object the signal refers to
    pub fn path(&self) -> &str {
        match self {
            Signal::PcmAdded { path, .. } | Signal::PcmRemoved { path } => path,
        }
    }

    /// Signal name
    pub fn member(&self) -> &'static str {
        match self {
            Signal::PcmAdded { .. } => "PCMAdded",
            Signal::PcmRemoved { .. } => "PCMRemoved",
        }
    }
}

/// Message bus connection
///
/// Implementations must be safe to call from any number of tasks at once.
#[async_trait]
pub trait Bus: Send + Sync + 'static {
    /// Register an object
    ///
    /// Once this returns, inbound calls for `path` reach `handler`.
    async fn register_object(
        &self,
        path: &str,
        handler: Arc<dyn ObjectHandler>,
    ) -> Result<RegistrationId, BusError>;

    /// Unregister an object
    ///
    /// Once this returns, inbound calls for the object's path fail with
    /// [`BusError::NoSuchObject`].
    async fn unregister_object(&self, id: RegistrationId) -> Result<(), BusError>;

    /// Broadcast a signal to all subscribers
    async fn emit_signal(&self, signal: Signal) -> Result<(), BusError>;

    /// Whether an object is registered at `path`
    async fn is_registered(&self, path: &str) -> bool;
}

struct LocalObject {
    id: RegistrationId,
    handler: Arc<dyn ObjectHandler>,
}

#[derive(Default)]
struct ObjectTable {
    by_path: HashMap<String, LocalObject>,
    by_id: HashMap<RegistrationId, String>,
}

/// Default capacity of the signal channel
pub const DEFAULT_SIGNAL_CAPACITY: usize = 256;

/// In-process bus
pub struct LocalBus {
    objects: RwLock<ObjectTable>,
    signals: broadcast::Sender<Signal>,
    next_id: AtomicU32,
    connected: AtomicBool,
}

impl LocalBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_SIGNAL_CAPACITY)
    }

    /// Create a bus whose subscribers may lag at most `capacity` signals
    pub fn with_capacity(capacity: usize) -> Self {
        let (signals, _) = broadcast::channel(capacity);

        Self {
            objects: RwLock::new(ObjectTable::default()),
            signals,
            next_id: AtomicU32::new(1),
            connected: AtomicBool::new(true),
        }
    }

    /// Subscribe to signals emitted from now on
    pub fn subscribe(&self) -> broadcast::Receiver<Signal> {
        self.signals.subscribe()
    }

    /// Drop the connection; every later call fails with `Disconnected`
    pub fn close(&self) {
        self.connected.store(false, Ordering::Release);
        tracing::warn!("Bus connection closed");
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    fn check_connected(&self) -> Result<(), BusError> {
        if self.is_connected() {
            Ok(())
        } else {
            Err(BusError::Disconnected)
        }
    }

    /// Number of registered objects
    pub async fn object_count(&self) -> usize {
        self.objects.read().await.by_path.len()
    }

    /// Resolve the handler for an inbound call
    ///
    /// The table lock is released before the handler runs, so a slow handler
    /// never blocks registration.
    async fn handler(
        &self,
        path: &str,
        interface: &str,
    ) -> Result<Arc<dyn ObjectHandler>, BusError> {
        self.check_connected()?;

        let handler = {
            let objects = self.objects.read().await;
            let object = objects
                .by_path
                .get(path)
                .ok_or_else(|| BusError::NoSuchObject(path.to_string()))?;
            Arc::clone(&object.handler)
        };

        if handler.interface() != interface {
            return Err(BusError::NoSuchInterface {
                path: path.to_string(),
                interface: interface.to_string(),
            });
        }

        Ok(handler)
    }

    /// Inbound `org.freedesktop.DBus.Properties.Get`
    pub async fn get_property(
        &self,
        path: &str,
        interface: &str,
        name: &str,
    ) -> Result<OwnedValue, BusError> {
        let handler = self.handler(path, interface).await?;
        handler.get_property(name).await
    }

    /// Inbound `org.freedesktop.DBus.Properties.GetAll`
    pub async fn get_all_properties(
        &self,
        path: &str,
        interface: &str,
    ) -> Result<PropertyBag, BusError> {
        let handler = self.handler(path, interface).await?;
        handler.get_all_properties().await
    }

    /// Inbound method call
    pub async fn call_method(
        &self,
        path: &str,
        interface: &str,
        method: &str,
    ) -> Result<MethodReply, BusError> {
        tracing::debug!(path = path, interface = interface, method = method, "Method call");
        let handler = self.handler(path, interface).await?;
        handler.call_method(method).await
    }
}

impl Default for LocalBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Bus for LocalBus {
    async fn register_object(
        &self,
        path: &str,
        handler: Arc<dyn ObjectHandler>,
    ) -> Result<RegistrationId, BusError> {
        self.check_connected()?;

        if !is_valid_object_path(path) {
            return Err(BusError::InvalidObjectPath(path.to_string()));
        }

        let mut objects = self.objects.write().await;

        if objects.by_path.contains_key(path) {
            return Err(BusError::ObjectPathInUse(path.to_string()));
        }

        let id = RegistrationId(self.next_id.fetch_add(1, Ordering::Relaxed));
        objects
            .by_path
            .insert(path.to_string(), LocalObject { id, handler });
        objects.by_id.insert(id, path.to_string());

        tracing::trace!(path = path, id = id.get(), "Object registered");

        Ok(id)
    }

    async fn unregister_object(&self, id: RegistrationId) -> Result<(), BusError> {
        self.check_connected()?;

        let mut objects = self.objects.write().await;

        let path = objects
            .by_id
            .remove(&id)
            .ok_or(BusError::NotRegistered(id.get()))?;
        objects.by_path.remove(&path);

        tracing::trace!(path = %path, id = id.get(), "Object unregistered");

        Ok(())
    }

    async fn emit_signal(&self, signal: Signal) -> Result<(), BusError> {
        self.check_connected()?;

        tracing::trace!(member = signal.member(), path = signal.path(), "Signal emitted");

        // Err only means there are no subscribers right now
        let _ = self.signals.send(signal);
        Ok(())
    }

    async fn is_registered(&self, path: &str) -> bool {
        self.objects.read().await.by_path.contains_key(path)
    }
}
