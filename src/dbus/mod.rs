//! Bus exposure of transports
//!
//! Published transports appear as PCM objects under the Manager:
//!
//! ```text
//! /org/bluealsa                                   Manager1: GetPCMs(), PCMAdded, PCMRemoved
//! /org/bluealsa/hci0/dev_AA_BB_CC_DD_EE_FF/a2dpsrc   PCM1 (read-only properties)
//! ```

pub mod bus;
pub mod connection;
pub mod error;
pub mod manager;
pub mod path;
pub mod transport;
pub mod value;

pub use bus::{Bus, LocalBus, ObjectHandler, RegistrationId, Signal};
pub use connection::DBusConnection;
pub use error::BusError;
pub use manager::{list_active_transports, ManagerObject};
pub use path::{transport_path, MANAGER_INTERFACE, MANAGER_PATH, PCM_INTERFACE, SERVICE};
pub use transport::{publish, unpublish, PcmObject};
pub use value::{MethodReply, PathProperties, PropertyBag};
