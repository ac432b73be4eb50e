//! Registry error types
//!
//! Error types for adapter/device/transport hierarchy operations.

use thiserror::Error;

use super::address::BdAddr;
use super::profile::TransportProfile;

/// Error type for hierarchy operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Controller index outside of the slot table
    #[error("Invalid adapter index: {0}")]
    InvalidAdapterIndex(u16),

    /// No adapter occupies the slot
    #[error("Adapter not found: hci{0}")]
    AdapterNotFound(u16),

    /// Slot is still held by a previous adapter
    #[error("Adapter already exists: hci{0}")]
    AdapterExists(u16),

    /// Adapter still owns devices
    #[error("Adapter hci{index} still has {devices} device(s)")]
    AdapterBusy { index: u16, devices: usize },

    /// Adapter is being torn down and accepts no new devices
    #[error("Adapter closed: hci{0}")]
    AdapterClosed(u16),

    /// Adapter slot freed before teardown started
    #[error("Adapter still open: hci{0}")]
    AdapterOpen(u16),

    /// Adapter rejected by the HCI filter
    #[error("Adapter filtered out: hci{0}")]
    AdapterFiltered(u16),

    /// Device already has a transport for this profile
    #[error("Transport {profile} already exists on {addr}")]
    TransportExists {
        addr: BdAddr,
        profile: TransportProfile,
    },

    /// Profile is not enabled in the configuration
    #[error("Profile disabled: {0}")]
    ProfileDisabled(TransportProfile),

    /// Malformed Bluetooth address string
    #[error("Invalid Bluetooth address: {0:?}")]
    InvalidAddress(String),
}
