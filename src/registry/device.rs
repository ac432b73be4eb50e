//! Remote device entry

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use tokio::sync::RwLock;

use super::adapter::Adapter;
use super::address::BdAddr;
use super::profile::TransportProfile;
use super::transport::Transport;

/// A remote Bluetooth peer known to an adapter
///
/// Owns at most one transport per profile.
#[derive(Debug)]
pub struct Device {
    addr: BdAddr,
    adapter_index: u16,
    adapter: Weak<Adapter>,
    pub(super) transports: RwLock<HashMap<TransportProfile, Arc<Transport>>>,
}

impl Device {
    pub(super) fn new(adapter: &Arc<Adapter>, addr: BdAddr) -> Self {
        Self {
            addr,
            adapter_index: adapter.index(),
            adapter: Arc::downgrade(adapter),
            transports: RwLock::new(HashMap::new()),
        }
    }

    pub fn addr(&self) -> BdAddr {
        self.addr
    }

    /// Index of the owning adapter
    pub fn adapter_index(&self) -> u16 {
        self.adapter_index
    }

    /// Owning adapter, if it is still alive
    pub fn adapter(&self) -> Option<Arc<Adapter>> {
        self.adapter.upgrade()
    }

    /// Look up the transport for a profile
    ///
    /// Used e.g. by the HFP handler to find the SCO transport paired with an
    /// RFCOMM channel on the same device.
    pub async fn transport(&self, profile: TransportProfile) -> Option<Arc<Transport>> {
        self.transports.read().await.get(&profile).cloned()
    }

    /// Snapshot of the device's transports
    ///
    /// Returned entries stay valid even if they are removed from the device
    /// while the caller still holds them.
    pub async fn transports(&self) -> Vec<Arc<Transport>> {
        self.transports.read().await.values().cloned().collect()
    }

    pub async fn transport_count(&self) -> usize {
        self.transports.read().await.len()
    }
}
