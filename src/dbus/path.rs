//! Object path construction
//!
//! A transport's path is a pure function of (adapter index, device address,
//! profile). Path uniqueness among registered objects rests entirely on this.

use crate::registry::{BdAddr, TransportProfile};

/// Well-known bus name of the daemon
pub const SERVICE: &str = "org.bluealsa";

/// Path of the Manager object
pub const MANAGER_PATH: &str = "/org/bluealsa";

/// Manager interface
pub const MANAGER_INTERFACE: &str = "org.bluealsa.Manager1";

/// PCM (transport) interface
pub const PCM_INTERFACE: &str = "org.bluealsa.PCM1";

/// Build the object path of a transport
///
/// `/org/bluealsa/hci<index>/dev_<AA_BB_CC_DD_EE_FF>/<profile tag>`
pub fn transport_path(adapter_index: u16, addr: &BdAddr, profile: TransportProfile) -> String {
    format!(
        "{}/hci{}/dev_{}/{}",
        MANAGER_PATH,
        adapter_index,
        addr.path_component(),
        profile.tag()
    )
}

/// Check an object path against the D-Bus path grammar
pub fn is_valid_object_path(path: &str) -> bool {
    if path == "/" {
        return true;
    }
    let Some(rest) = path.strip_prefix('/') else {
        return false;
    };
    rest.split('/').all(|element| {
        !element.is_empty()
            && element
                .bytes()
                .all(|c| c.is_ascii_alphanumeric() || c == b'_')
    })
}
