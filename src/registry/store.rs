//! Adapter slot table
//!
//! The root of the hierarchy: one slot per possible controller index.

use std::sync::Arc;

use tokio::sync::RwLock;

use super::adapter::Adapter;
use super::error::RegistryError;

/// Maximum number of controllers (and so adapter slots)
pub const HCI_MAX_DEV: usize = 16;

/// Root of the adapter → device → transport hierarchy
///
/// Each slot has its own lock, so lookups on one controller never wait for
/// changes on another.
#[derive(Debug)]
pub struct Registry {
    adapters: [RwLock<Option<Arc<Adapter>>>; HCI_MAX_DEV],
}

impl Registry {
    pub fn new() -> Self {
        Self {
            adapters: std::array::from_fn(|_| RwLock::new(None)),
        }
    }

    fn slot(&self, index: u16) -> Result<&RwLock<Option<Arc<Adapter>>>, RegistryError> {
        self.adapters
            .get(index as usize)
            .ok_or(RegistryError::InvalidAdapterIndex(index))
    }

    /// Look up an adapter by controller index
    pub async fn lookup_adapter(&self, index: u16) -> Option<Arc<Adapter>> {
        let slot = self.slot(index).ok()?;
        slot.read().await.clone()
    }

    /// Create the adapter for a newly discovered controller
    ///
    /// Fails if the slot still holds the previous adapter for this index.
    pub async fn insert_adapter(&self, index: u16) -> Result<Arc<Adapter>, RegistryError> {
        let mut slot = self.slot(index)?.write().await;

        if slot.is_some() {
            return Err(RegistryError::AdapterExists(index));
        }

        let adapter = Arc::new(Adapter::new(index));
        *slot = Some(Arc::clone(&adapter));

        tracing::info!(adapter = %adapter.name(), "Adapter added");

        Ok(adapter)
    }

    /// Free the slot of a removed controller
    ///
    /// Only frees the slot if it still holds `adapter`: a newer adapter that
    /// took over the index in the meantime is left alone. The adapter must be
    /// closed and have no devices left.
    pub async fn remove_adapter(&self, adapter: &Arc<Adapter>) -> Result<(), RegistryError> {
        let index = adapter.index();
        let mut slot = self.slot(index)?.write().await;

        match slot.as_ref() {
            Some(current) if Arc::ptr_eq(current, adapter) => {}
            _ => return Err(RegistryError::AdapterNotFound(index)),
        }

        {
            let devices = adapter.devices.read().await;
            if !devices.closed {
                return Err(RegistryError::AdapterOpen(index));
            }
            if !devices.map.is_empty() {
                return Err(RegistryError::AdapterBusy {
                    index,
                    devices: devices.map.len(),
                });
            }
        }

        *slot = None;

        tracing::info!(adapter = %adapter.name(), "Adapter removed");

        Ok(())
    }

    /// Snapshot of all present adapters, in index order
    pub async fn adapters(&self) -> Vec<Arc<Adapter>> {
        let mut adapters = Vec::new();
        for slot in &self.adapters {
            if let Some(adapter) = slot.read().await.as_ref() {
                adapters.push(Arc::clone(adapter));
            }
        }
        adapters
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Codec;
    use crate::registry::{BdAddr, TransportProfile};

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let registry = Registry::new();

        assert!(registry.lookup_adapter(0).await.is_none());

        let adapter = registry.insert_adapter(0).await.unwrap();
        let found = registry.lookup_adapter(0).await.unwrap();
        assert!(Arc::ptr_eq(&adapter, &found));
        assert_eq!(found.name(), "hci0");

        assert!(registry.lookup_adapter(1).await.is_none());
    }

    #[tokio::test]
    async fn test_index_out_of_range() {
        let registry = Registry::new();

        assert!(registry.lookup_adapter(HCI_MAX_DEV as u16).await.is_none());
        assert_eq!(
            registry.insert_adapter(HCI_MAX_DEV as u16).await.unwrap_err(),
            RegistryError::InvalidAdapterIndex(HCI_MAX_DEV as u16)
        );
    }

    #[tokio::test]
    async fn test_slot_reuse_requires_removal() {
        let registry = Registry::new();

        let adapter = registry.insert_adapter(2).await.unwrap();
        assert_eq!(
            registry.insert_adapter(2).await.unwrap_err(),
            RegistryError::AdapterExists(2)
        );

        adapter.close().await;
        registry.remove_adapter(&adapter).await.unwrap();
        assert!(registry.lookup_adapter(2).await.is_none());

        registry.insert_adapter(2).await.unwrap();
        assert!(registry.lookup_adapter(2).await.is_some());
    }

    #[tokio::test]
    async fn test_remove_busy_adapter_fails() {
        let registry = Registry::new();
        let adapter = registry.insert_adapter(0).await.unwrap();

        let addr: BdAddr = "00:11:22:33:44:55".parse().unwrap();
        let transport = adapter
            .attach_transport(addr, TransportProfile::A2dpSource, Codec::Sbc)
            .await
            .unwrap();

        adapter.close().await;
        assert_eq!(
            registry.remove_adapter(&adapter).await.unwrap_err(),
            RegistryError::AdapterBusy {
                index: 0,
                devices: 1
            }
        );

        adapter.detach_transport(&transport).await;
        registry.remove_adapter(&adapter).await.unwrap();
    }

    #[tokio::test]
    async fn test_remove_open_adapter_fails() {
        let registry = Registry::new();
        let adapter = registry.insert_adapter(0).await.unwrap();

        assert_eq!(
            registry.remove_adapter(&adapter).await.unwrap_err(),
            RegistryError::AdapterOpen(0)
        );
        assert!(registry.lookup_adapter(0).await.is_some());
    }

    #[tokio::test]
    async fn test_stale_remove_leaves_newer_adapter() {
        let registry = Registry::new();

        let old = registry.insert_adapter(0).await.unwrap();
        old.close().await;
        registry.remove_adapter(&old).await.unwrap();

        // Controller came back before the first teardown finished
        let new = registry.insert_adapter(0).await.unwrap();
        new.close().await;

        assert_eq!(
            registry.remove_adapter(&old).await.unwrap_err(),
            RegistryError::AdapterNotFound(0)
        );
        let current = registry.lookup_adapter(0).await.unwrap();
        assert!(Arc::ptr_eq(&current, &new));
    }

    #[tokio::test]
    async fn test_adapters_snapshot_skips_empty_slots() {
        let registry = Registry::new();
        registry.insert_adapter(3).await.unwrap();
        registry.insert_adapter(1).await.unwrap();

        let indices: Vec<u16> = registry
            .adapters()
            .await
            .iter()
            .map(|a| a.index())
            .collect();
        assert_eq!(indices, vec![1, 3]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_insert_visible_to_other_tasks() {
        let registry = Arc::new(Registry::new());

        let writer = {
            let registry = Arc::clone(&registry);
            tokio::spawn(async move { registry.insert_adapter(5).await.unwrap() })
        };
        let inserted = writer.await.unwrap();

        let reader = {
            let registry = Arc::clone(&registry);
            tokio::spawn(async move { registry.lookup_adapter(5).await })
        };
        let found = reader.await.unwrap().unwrap();
        assert!(Arc::ptr_eq(&inserted, &found));
    }
}
