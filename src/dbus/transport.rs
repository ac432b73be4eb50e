//! Transport (PCM) exposure
//!
//! Binds a live transport to a bus object and keeps bus state in step with
//! the transport's lifetime. Per transport the order is always:
//!
//! ```text
//! register object ──► PCMAdded ··· unregister object ──► PCMRemoved ──► reclaim
//! ```
//!
//! Both halves run under the transport's publish lock, so a concurrent
//! unpublish cannot overtake a publish that is still emitting `PCMAdded`.
//! The published state itself is readable without that lock.

use std::sync::{Arc, Weak};

use async_trait::async_trait;
use zvariant::OwnedValue;

use crate::error::{Error, Result};
use crate::registry::Transport;

use super::bus::{Bus, ObjectHandler, RegistrationId, Signal};
use super::error::BusError;
use super::path::PCM_INTERFACE;
use super::value::PropertyBag;

/// Properties announced for a PCM
///
/// No properties are exposed yet, so announcements carry an empty set.
pub fn pcm_properties(_transport: &Transport) -> PropertyBag {
    PropertyBag::new()
}

/// Bus handler for one transport
///
/// Holds the transport weakly: once the transport is reclaimed, calls that
/// were already in flight get `NoSuchObject` instead of stale data.
pub struct PcmObject {
    path: String,
    transport: Weak<Transport>,
}

impl PcmObject {
    pub fn new(transport: &Arc<Transport>) -> Self {
        Self {
            path: transport.path().to_string(),
            transport: Arc::downgrade(transport),
        }
    }

    fn transport(&self) -> std::result::Result<Arc<Transport>, BusError> {
        self.transport
            .upgrade()
            .ok_or_else(|| BusError::NoSuchObject(self.path.clone()))
    }
}

#[async_trait]
impl ObjectHandler for PcmObject {
    fn interface(&self) -> &'static str {
        PCM_INTERFACE
    }

    async fn get_property(&self, name: &str) -> std::result::Result<OwnedValue, BusError> {
        let transport = self.transport()?;
        pcm_properties(&transport)
            .remove(name)
            .ok_or_else(|| BusError::NoSuchProperty(name.to_string()))
    }

    async fn get_all_properties(&self) -> std::result::Result<PropertyBag, BusError> {
        let transport = self.transport()?;
        Ok(pcm_properties(&transport))
    }
}

/// Publish a transport on the bus
///
/// Publishing an already published transport returns its existing
/// registration and emits nothing. A path already owned by another object is
/// rejected with [`Error::PathCollision`]; the existing object is left alone.
pub async fn publish<B: Bus + ?Sized>(bus: &B, transport: &Arc<Transport>) -> Result<RegistrationId> {
    let _guard = transport.publish_lock.lock().await;

    if let Some(id) = transport.registration() {
        tracing::debug!(path = transport.path(), id = id.get(), "PCM already published");
        return Ok(id);
    }

    let path = transport.path();
    let handler = Arc::new(PcmObject::new(transport));

    let id = match bus.register_object(path, handler).await {
        Ok(id) => id,
        Err(BusError::ObjectPathInUse(_)) => {
            tracing::error!(path = path, "PCM object path already registered");
            return Err(Error::PathCollision(path.to_string()));
        }
        Err(e) => {
            tracing::warn!(path = path, error = %e, "Couldn't register PCM");
            return Err(Error::Ipc {
                path: path.to_string(),
                source: e,
            });
        }
    };

    transport.set_registration(Some(id));

    let signal = Signal::PcmAdded {
        path: path.to_string(),
        properties: Arc::new(pcm_properties(transport)),
    };
    if let Err(e) = bus.emit_signal(signal).await {
        // The object is reachable; only the announcement was lost
        tracing::warn!(path = path, error = %e, "Couldn't emit PCMAdded");
    }

    tracing::info!(path = path, id = id.get(), "PCM published");

    Ok(id)
}

/// Remove a transport from the bus
///
/// No-op for a transport that is not published. The object is unregistered
/// before `PCMRemoved` is emitted, so a client reacting to the signal can no
/// longer reach it.
pub async fn unpublish<B: Bus + ?Sized>(bus: &B, transport: &Transport) -> Result<()> {
    let _guard = transport.publish_lock.lock().await;

    let Some(id) = transport.registration() else {
        return Ok(());
    };

    let path = transport.path();

    if let Err(e) = bus.unregister_object(id).await {
        tracing::warn!(path = path, error = %e, "Couldn't unregister PCM");
        return Err(Error::Ipc {
            path: path.to_string(),
            source: e,
        });
    }

    transport.set_registration(None);

    let signal = Signal::PcmRemoved {
        path: path.to_string(),
    };
    if let Err(e) = bus.emit_signal(signal).await {
        tracing::warn!(path = path, error = %e, "Couldn't emit PCMRemoved");
        return Err(Error::Ipc {
            path: path.to_string(),
            source: e,
        });
    }

    tracing::info!(path = path, id = id.get(), "PCM unpublished");

    Ok(())
}
