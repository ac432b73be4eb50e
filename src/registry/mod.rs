//! Adapter → device → transport hierarchy
//!
//! The registry tracks every local controller, the remote devices connected
//! through it, and the negotiated transports of each device.
//!
//! # Architecture
//!
//! ```text
//!                        Arc<Registry>
//!              ┌──────────────────────────────┐
//!              │ adapters: [RwLock<Option<    │
//!              │   Arc<Adapter>>>; 16]        │
//!              └──────────────┬───────────────┘
//!                             │
//!                             ▼
//!        Adapter { devices: RwLock<HashMap<BdAddr, Arc<Device>>> }
//!                             │
//!                             ▼
//!   Device { transports: RwLock<HashMap<TransportProfile, Arc<Transport>>> }
//!                             │
//!                             ▼
//!             Transport { path, registration, .. }
//! ```
//!
//! # Reclamation
//!
//! Every level hands out `Arc` clones taken under a read guard, and the guard
//! is released before the caller descends further. A removed entry is freed
//! only when the last snapshot holding it is dropped, so a walk that races
//! with removal sees either the live entry or a retired-but-valid one, never
//! freed memory. Back-references (transport → device → adapter) are `Weak`.
//!
//! Locks are always taken in slot → device table → transport map order.

pub mod adapter;
pub mod address;
pub mod device;
pub mod error;
pub mod profile;
pub mod store;
pub mod transport;

pub use adapter::Adapter;
pub use address::BdAddr;
pub use device::Device;
pub use error::RegistryError;
pub use profile::TransportProfile;
pub use store::{Registry, HCI_MAX_DEV};
pub use transport::Transport;
