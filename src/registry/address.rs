//! Bluetooth device address

use std::fmt;
use std::str::FromStr;

use super::error::RegistryError;

/// 48-bit Bluetooth hardware address
///
/// Stored most-significant byte first, i.e. in the same order it is written
/// in the canonical `AA:BB:CC:DD:EE:FF` form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BdAddr([u8; 6]);

impl BdAddr {
    /// Create an address from its six bytes
    pub const fn new(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }

    /// Raw address bytes
    pub fn bytes(&self) -> [u8; 6] {
        self.0
    }

    /// Address as it appears inside an object path (`AA_BB_CC_DD_EE_FF`)
    ///
    /// Object path elements may only contain `[A-Za-z0-9_]`.
    pub fn path_component(&self) -> String {
        let b = self.0;
        format!(
            "{:02X}_{:02X}_{:02X}_{:02X}_{:02X}_{:02X}",
            b[0], b[1], b[2], b[3], b[4], b[5]
        )
    }
}

impl fmt::Display for BdAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = self.0;
        write!(
            f,
            "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
            b[0], b[1], b[2], b[3], b[4], b[5]
        )
    }
}

impl FromStr for BdAddr {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || RegistryError::InvalidAddress(s.to_string());

        let mut bytes = [0u8; 6];
        let mut parts = s.split(':');

        for byte in bytes.iter_mut() {
            let part = parts.next().ok_or_else(invalid)?;
            if part.len() != 2 || !part.bytes().all(|c| c.is_ascii_hexdigit()) {
                return Err(invalid());
            }
            *byte = u8::from_str_radix(part, 16).map_err(|_| invalid())?;
        }

        if parts.next().is_some() {
            return Err(invalid());
        }

        Ok(Self(bytes))
    }
}
