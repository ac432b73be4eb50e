//! Local controller entry

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::config::Codec;

use super::address::BdAddr;
use super::device::Device;
use super::error::RegistryError;
use super::profile::TransportProfile;
use super::transport::Transport;

#[derive(Debug, Default)]
pub(super) struct DeviceTable {
    pub(super) map: HashMap<BdAddr, Arc<Device>>,
    /// Set once teardown has started; no device may be added afterwards
    pub(super) closed: bool,
}

/// A local Bluetooth controller
#[derive(Debug)]
pub struct Adapter {
    index: u16,
    name: String,
    pub(super) devices: RwLock<DeviceTable>,
}

impl Adapter {
    pub(super) fn new(index: u16) -> Self {
        Self {
            index,
            name: format!("hci{}", index),
            devices: RwLock::new(DeviceTable::default()),
        }
    }

    /// Controller index
    pub fn index(&self) -> u16 {
        self.index
    }

    /// Controller name, e.g. `hci0`
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up a device by address
    pub async fn device(&self, addr: &BdAddr) -> Option<Arc<Device>> {
        self.devices.read().await.map.get(addr).cloned()
    }

    /// Snapshot of the adapter's devices
    pub async fn devices(&self) -> Vec<Arc<Device>> {
        self.devices.read().await.map.values().cloned().collect()
    }

    pub async fn device_count(&self) -> usize {
        self.devices.read().await.map.len()
    }

    /// Whether teardown has started
    pub async fn is_closed(&self) -> bool {
        self.devices.read().await.closed
    }

    /// Create a transport and insert it into the hierarchy
    ///
    /// The device is created on its first transport. Both the device table
    /// and the device's transport map stay write-locked for the whole
    /// insertion, so a concurrent [`detach_transport`](Self::detach_transport)
    /// can never drop a device that is about to receive a transport.
    pub async fn attach_transport(
        self: &Arc<Self>,
        addr: BdAddr,
        profile: TransportProfile,
        codec: Codec,
    ) -> Result<Arc<Transport>, RegistryError> {
        let mut devices = self.devices.write().await;

        if devices.closed {
            return Err(RegistryError::AdapterClosed(self.index));
        }

        let device = match devices.map.get(&addr) {
            Some(device) => Arc::clone(device),
            None => {
                let device = Arc::new(Device::new(self, addr));
                devices.map.insert(addr, Arc::clone(&device));
                tracing::debug!(adapter = %self.name, device = %addr, "Device created");
                device
            }
        };

        let mut transports = device.transports.write().await;

        if transports.contains_key(&profile) {
            return Err(RegistryError::TransportExists { addr, profile });
        }

        let transport = Arc::new(Transport::new(&device, profile, codec));
        transports.insert(profile, Arc::clone(&transport));

        tracing::info!(
            adapter = %self.name,
            device = %addr,
            profile = %profile,
            codec = %codec,
            "Transport created"
        );

        Ok(transport)
    }

    /// Remove a transport from the hierarchy
    ///
    /// Only the given transport is removed: if its slot already holds a newer
    /// transport, nothing happens. The device is dropped together with its
    /// last transport. Returns whether the transport was removed.
    pub async fn detach_transport(&self, transport: &Arc<Transport>) -> bool {
        let addr = transport.addr();
        let mut devices = self.devices.write().await;

        let Some(device) = devices.map.get(&addr).cloned() else {
            return false;
        };

        let mut transports = device.transports.write().await;

        match transports.get(&transport.profile()) {
            Some(current) if Arc::ptr_eq(current, transport) => {}
            _ => return false,
        }

        transports.remove(&transport.profile());

        tracing::info!(
            adapter = %self.name,
            device = %addr,
            profile = %transport.profile(),
            "Transport removed"
        );

        if transports.is_empty() {
            drop(transports);
            devices.map.remove(&addr);
            tracing::debug!(adapter = %self.name, device = %addr, "Device destroyed");
        }

        true
    }

    /// Stop accepting devices and return what is left
    ///
    /// The caller is expected to detach every remaining transport before
    /// freeing the adapter slot.
    pub async fn close(&self) -> Vec<Arc<Device>> {
        let mut devices = self.devices.write().await;
        devices.closed = true;
        devices.map.values().cloned().collect()
    }
}
