//! Crate error type

use thiserror::Error;

use crate::config::ConfigInitError;
use crate::dbus::BusError;
use crate::registry::RegistryError;

/// Error type for daemon operations
///
/// Everything except [`Error::Config`] is scoped to the failing operation;
/// none of them should bring the daemon down.
#[derive(Debug, Error)]
pub enum Error {
    /// Startup configuration failed
    #[error("Configuration init failed: {0}")]
    Config(#[from] ConfigInitError),

    /// Hierarchy operation failed
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Another transport already owns the object path
    #[error("Object path collision: {0}")]
    PathCollision(String),

    /// Bus (un)registration or notification failed
    #[error("Bus registration failed for {path}: {source}")]
    Ipc {
        path: String,
        #[source]
        source: BusError,
    },

    /// Bus error outside of transport exposure
    #[error(transparent)]
    Bus(#[from] BusError),
}

/// Result alias for daemon operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::PathCollision("/org/bluealsa/hci0/dev_00_11_22_33_44_55/a2dpsrc".into());
        assert!(err.to_string().contains("collision"));
        assert!(err.to_string().contains("a2dpsrc"));

        let err = Error::Ipc {
            path: "/org/bluealsa/hci0".into(),
            source: BusError::Disconnected,
        };
        assert!(err.to_string().contains("/org/bluealsa/hci0"));
        assert!(err.to_string().contains("closed"));
    }

    #[test]
    fn test_registry_error_conversion() {
        let err: Error = RegistryError::AdapterNotFound(3).into();
        assert!(matches!(err, Error::Registry(RegistryError::AdapterNotFound(3))));
        assert_eq!(err.to_string(), "Adapter not found: hci3");
    }
}
