//! # bluealsa
//!
//! Bluetooth audio transport registry with D-Bus PCM exposure.
//!
//! The profile layers (A2DP, HFP, HSP) report transports as their handshakes
//! complete and as connections drop. This crate keeps them in a concurrent
//! adapter → device → transport hierarchy, publishes each audio transport as
//! a PCM object on the bus, and answers the Manager's `GetPCMs` query.
//!
//! ```text
//!  profile layer ── create_transport ──► Registry ──► publish ──► bus object + PCMAdded
//!  bus client   ─── GetPCMs ───────────► Manager walks Registry
//!  profile layer ── destroy_transport ─► unpublish ──► PCMRemoved ──► reclaim
//! ```
//!
//! The bus is a trait: [`dbus::DBusConnection`] serves the objects on the
//! system or session bus through `zbus`, [`dbus::LocalBus`] keeps everything
//! in-process.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use bluealsa::config::{Codec, Config};
//! use bluealsa::dbus::LocalBus;
//! use bluealsa::registry::{BdAddr, TransportProfile};
//! use bluealsa::Daemon;
//!
//! # async fn run() -> bluealsa::Result<()> {
//! let config = Config::default().init()?;
//! let daemon = Daemon::new(config, Arc::new(LocalBus::new()));
//! daemon.start().await?;
//!
//! daemon.add_adapter(0).await?;
//! let addr: BdAddr = "AA:BB:CC:DD:EE:FF".parse().map_err(bluealsa::Error::from)?;
//! let transport = daemon
//!     .create_transport(0, addr, TransportProfile::A2dpSource, Codec::Sbc)
//!     .await?;
//!
//! println!("{:?}", daemon.list_active_transports().await);
//! daemon.destroy_transport(&transport).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod daemon;
pub mod dbus;
pub mod error;
pub mod registry;

pub use config::Config;
pub use daemon::Daemon;
pub use error::{Error, Result};
