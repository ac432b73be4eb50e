//! Manager object (`/org/bluealsa`)
//!
//! Answers `GetPCMs` by walking the registry. The walk works on snapshots
//! (see [`crate::registry`]) and reads each transport's published state
//! without taking its publish lock, so it never waits on a publish or
//! unpublish in flight. Its result is best-effort: a PCM added or removed
//! during the walk may or may not be listed.

use std::sync::Arc;

use async_trait::async_trait;

use crate::registry::Registry;

use super::bus::ObjectHandler;
use super::error::BusError;
use super::path::MANAGER_INTERFACE;
use super::transport::pcm_properties;
use super::value::{MethodReply, PathProperties};

/// List every published audio transport
///
/// Skips empty adapter slots, RFCOMM control channels, and transports that
/// are tracked but not (or no longer) visible on the bus. No ordering is
/// guaranteed.
pub async fn list_active_transports(registry: &Registry) -> Vec<PathProperties> {
    let mut pcms = Vec::new();

    for adapter in registry.adapters().await {
        for device in adapter.devices().await {
            for transport in device.transports().await {
                if !transport.is_audio() {
                    continue;
                }
                if !transport.is_published() {
                    continue;
                }
                pcms.push((transport.path().to_string(), pcm_properties(&transport)));
            }
        }
    }

    pcms
}

/// Bus handler of the Manager object
pub struct ManagerObject {
    registry: Arc<Registry>,
}

impl ManagerObject {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl ObjectHandler for ManagerObject {
    fn interface(&self) -> &'static str {
        MANAGER_INTERFACE
    }

    async fn call_method(&self, method: &str) -> Result<MethodReply, BusError> {
        match method {
            "GetPCMs" => {
                let pcms = list_active_transports(&self.registry).await;
                tracing::debug!(count = pcms.len(), "GetPCMs");
                Ok(MethodReply::ObjectDict(pcms))
            }
            _ => {
                tracing::debug!(method = method, "Unsupported Manager method");
                Err(BusError::NoSuchMethod(method.to_string()))
            }
        }
    }
}
