//! Daemon facade
//!
//! Ties the configuration, the registry and the bus together and offers the
//! entry points used by the profile layers: controllers coming and going,
//! transports created when a profile handshake completes and destroyed on
//! disconnect.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::{Codec, Config};
use crate::dbus::{self, Bus, ManagerObject, PathProperties, RegistrationId, MANAGER_PATH};
use crate::error::{Error, Result};
use crate::registry::{Adapter, BdAddr, Registry, RegistryError, Transport, TransportProfile};

/// Bluetooth audio daemon
pub struct Daemon<B: Bus> {
    config: Arc<Config>,
    registry: Arc<Registry>,
    bus: Arc<B>,
    manager: Mutex<Option<RegistrationId>>,
}

impl<B: Bus> Daemon<B> {
    /// Create a daemon on top of an initialized configuration
    pub fn new(config: Arc<Config>, bus: Arc<B>) -> Self {
        Self {
            config,
            registry: Arc::new(Registry::new()),
            bus,
            manager: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn bus(&self) -> &Arc<B> {
        &self.bus
    }

    /// Register the Manager object
    ///
    /// Calling it again while the Manager is registered does nothing.
    pub async fn start(&self) -> Result<()> {
        let mut manager = self.manager.lock().await;

        if manager.is_some() {
            return Ok(());
        }

        let handler = Arc::new(ManagerObject::new(Arc::clone(&self.registry)));
        let id = self
            .bus
            .register_object(MANAGER_PATH, handler)
            .await
            .map_err(|source| Error::Ipc {
                path: MANAGER_PATH.to_string(),
                source,
            })?;
        *manager = Some(id);

        tracing::info!(path = MANAGER_PATH, "Manager registered");

        Ok(())
    }

    /// Tear down every adapter and unregister the Manager
    pub async fn stop(&self) -> Result<()> {
        for adapter in self.registry.adapters().await {
            if let Err(e) = self.remove_adapter(adapter.index()).await {
                tracing::warn!(adapter = %adapter.name(), error = %e, "Couldn't remove adapter");
            }
        }

        let mut manager = self.manager.lock().await;
        if let Some(id) = manager.take() {
            self.bus
                .unregister_object(id)
                .await
                .map_err(|source| Error::Ipc {
                    path: MANAGER_PATH.to_string(),
                    source,
                })?;
            tracing::info!(path = MANAGER_PATH, "Manager unregistered");
        }

        Ok(())
    }

    /// A controller appeared
    pub async fn add_adapter(&self, index: u16) -> Result<Arc<Adapter>> {
        self.add_adapter_with_address(index, None).await
    }

    /// A controller with a known address appeared
    ///
    /// The address lets address entries of the HCI filter match.
    pub async fn add_adapter_with_address(
        &self,
        index: u16,
        address: Option<BdAddr>,
    ) -> Result<Arc<Adapter>> {
        if !self.config.is_adapter_allowed(index, address.as_ref()) {
            tracing::debug!(index = index, address = ?address, "Adapter skipped by HCI filter");
            return Err(RegistryError::AdapterFiltered(index).into());
        }
        Ok(self.registry.insert_adapter(index).await?)
    }

    /// A controller went away
    ///
    /// Every transport left on the adapter is unpublished and removed before
    /// the slot is freed, so a controller re-appearing with the same index
    /// starts from a clean slate. A transport whose unpublish fails stays in
    /// the hierarchy; the slot is then kept (and the adapter stays closed)
    /// until a later call finishes the teardown.
    pub async fn remove_adapter(&self, index: u16) -> Result<()> {
        let adapter = self
            .registry
            .lookup_adapter(index)
            .await
            .ok_or(RegistryError::AdapterNotFound(index))?;

        let devices = adapter.close().await;

        for device in devices {
            for transport in device.transports().await {
                if let Err(e) = self.destroy_transport(&transport).await {
                    tracing::warn!(
                        path = transport.path(),
                        error = %e,
                        "Transport kept, unpublish failed"
                    );
                }
            }
        }

        self.registry.remove_adapter(&adapter).await?;

        Ok(())
    }

    /// A profile handshake completed
    ///
    /// Creates the device on its first transport, inserts the transport and
    /// publishes it. A publish failure is logged and leaves the transport
    /// tracked but invisible to clients (see [`Transport::is_published`]);
    /// hierarchy failures are returned.
    pub async fn create_transport(
        &self,
        index: u16,
        addr: BdAddr,
        profile: TransportProfile,
        codec: Codec,
    ) -> Result<Arc<Transport>> {
        if !self.config.is_profile_enabled(profile) {
            return Err(RegistryError::ProfileDisabled(profile).into());
        }

        let adapter = self
            .registry
            .lookup_adapter(index)
            .await
            .ok_or(RegistryError::AdapterNotFound(index))?;

        let transport = adapter
            .attach_transport(addr, profile, codec)
            .await
            .map_err(|e| match e {
                RegistryError::TransportExists { addr, profile } => {
                    let path = dbus::transport_path(index, &addr, profile);
                    tracing::error!(path = %path, "Transport already exists");
                    Error::PathCollision(path)
                }
                e => e.into(),
            })?;

        if let Err(e) = self.publish(&transport).await {
            tracing::warn!(
                path = transport.path(),
                error = %e,
                "Transport tracked without bus object"
            );
        }

        Ok(transport)
    }

    /// A profile disconnected or was torn down
    ///
    /// Unpublishes the transport, then removes it from its device (and the
    /// device from its adapter if it was the last transport). The transport
    /// is reclaimed once the caller drops its handle.
    ///
    /// If the unpublish fails, the error is returned and the transport stays
    /// in the hierarchy, still registered, so the call can be retried.
    pub async fn destroy_transport(&self, transport: &Arc<Transport>) -> Result<()> {
        self.unpublish(transport).await?;

        let adapter = transport.device().and_then(|device| device.adapter());
        if let Some(adapter) = adapter {
            adapter.detach_transport(transport).await;
        }

        Ok(())
    }

    /// Publish a transport on the bus
    pub async fn publish(&self, transport: &Arc<Transport>) -> Result<RegistrationId> {
        dbus::publish(self.bus.as_ref(), transport).await
    }

    /// Remove a transport from the bus
    pub async fn unpublish(&self, transport: &Transport) -> Result<()> {
        dbus::unpublish(self.bus.as_ref(), transport).await
    }

    /// Published audio transports, as answered to `GetPCMs`
    pub async fn list_active_transports(&self) -> Vec<PathProperties> {
        dbus::list_active_transports(&self.registry).await
    }
}
