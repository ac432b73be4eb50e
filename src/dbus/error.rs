//! Bus error types

use thiserror::Error;

/// Error type for bus operations and client calls
///
/// The `NoSuch*` variants are protocol errors returned to the calling client;
/// they never affect daemon state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BusError {
    /// No object is registered at the path (or it has just been removed)
    #[error("No such object: {0}")]
    NoSuchObject(String),

    /// The object does not implement the interface
    #[error("No such interface '{interface}' at {path}")]
    NoSuchInterface { path: String, interface: String },

    #[error("No such property '{0}'")]
    NoSuchProperty(String),

    #[error("No such method '{0}'")]
    NoSuchMethod(String),

    /// Another object is already registered at the path
    #[error("Object path already in use: {0}")]
    ObjectPathInUse(String),

    #[error("Invalid object path: {0:?}")]
    InvalidObjectPath(String),

    /// Unknown registration id
    #[error("Object not registered: {0}")]
    NotRegistered(u32),

    /// Connection to the bus is gone
    #[error("Bus connection closed")]
    Disconnected,

    /// The bus connection reported an error
    #[error("D-Bus error: {0}")]
    Connection(String),
}

impl BusError {
    /// D-Bus error name sent to the client
    pub fn name(&self) -> &'static str {
        match self {
            BusError::NoSuchObject(_) => "org.freedesktop.DBus.Error.UnknownObject",
            BusError::NoSuchInterface { .. } => "org.freedesktop.DBus.Error.UnknownInterface",
            BusError::NoSuchProperty(_) => "org.freedesktop.DBus.Error.UnknownProperty",
            BusError::NoSuchMethod(_) => "org.freedesktop.DBus.Error.UnknownMethod",
            BusError::ObjectPathInUse(_) => "org.freedesktop.DBus.Error.ObjectPathInUse",
            BusError::InvalidObjectPath(_) => "org.freedesktop.DBus.Error.InvalidArgs",
            BusError::NotRegistered(_) => "org.freedesktop.DBus.Error.Failed",
            BusError::Disconnected => "org.freedesktop.DBus.Error.Disconnected",
            BusError::Connection(_) => "org.freedesktop.DBus.Error.Failed",
        }
    }
}
