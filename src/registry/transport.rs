//! Transport entry
//!
//! A transport is one negotiated stream for one profile on one device. It is
//! owned by its device's transport map; everything else (bus handlers,
//! enumeration snapshots) holds either a temporary `Arc` clone or a `Weak`.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Weak};

use tokio::sync::Mutex;

use crate::config::Codec;
use crate::dbus::path::transport_path;
use crate::dbus::RegistrationId;

use super::address::BdAddr;
use super::device::Device;
use super::profile::TransportProfile;

/// A negotiated audio or control stream
#[derive(Debug)]
pub struct Transport {
    profile: TransportProfile,
    codec: Codec,
    adapter_index: u16,
    addr: BdAddr,
    path: String,
    device: Weak<Device>,

    /// Held by publish and unpublish of this transport for their whole
    /// duration, so they are serialized against each other
    pub(crate) publish_lock: Mutex<()>,

    /// Bus registration id, 0 while not published
    ///
    /// Only written under `publish_lock`. Readers never take the lock, so
    /// enumeration does not wait for a publish that is still talking to the
    /// bus.
    registration: AtomicU32,
}

impl Transport {
    /// Create a transport for a device
    ///
    /// The transport is not inserted into the device; see
    /// [`Adapter::attach_transport`](super::Adapter::attach_transport).
    pub fn new(device: &Arc<Device>, profile: TransportProfile, codec: Codec) -> Self {
        let adapter_index = device.adapter_index();
        let addr = device.addr();

        Self {
            profile,
            codec,
            adapter_index,
            addr,
            path: transport_path(adapter_index, &addr, profile),
            device: Arc::downgrade(device),
            publish_lock: Mutex::new(()),
            registration: AtomicU32::new(0),
        }
    }

    pub fn profile(&self) -> TransportProfile {
        self.profile
    }

    pub fn codec(&self) -> Codec {
        self.codec
    }

    /// Bus object path, fixed for the lifetime of the transport
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn adapter_index(&self) -> u16 {
        self.adapter_index
    }

    /// Address of the remote device
    pub fn addr(&self) -> BdAddr {
        self.addr
    }

    /// Owning device, if it is still alive
    pub fn device(&self) -> Option<Arc<Device>> {
        self.device.upgrade()
    }

    /// Current bus registration
    pub fn registration(&self) -> Option<RegistrationId> {
        match self.registration.load(Ordering::Acquire) {
            0 => None,
            id => Some(RegistrationId::new(id)),
        }
    }

    pub(crate) fn set_registration(&self, id: Option<RegistrationId>) {
        let raw = id.map_or(0, |id| id.get());
        self.registration.store(raw, Ordering::Release);
    }

    /// Whether the transport is currently visible on the bus
    pub fn is_published(&self) -> bool {
        self.registration().is_some()
    }

    /// Whether this transport is an audio endpoint (as opposed to the RFCOMM
    /// control channel)
    pub fn is_audio(&self) -> bool {
        !self.profile.is_rfcomm()
    }
}
