//! D-Bus connection
//!
//! [`DBusConnection`] serves the daemon's objects on a real message bus
//! through `zbus`. Each registered [`ObjectHandler`] is served by the
//! `#[zbus::interface]` type matching its interface name, and `PCMAdded` /
//! `PCMRemoved` go out as real signals from the Manager object.
//!
//! ```text
//! DBusConnection
//!   ├── zbus Connection (system or session bus, owns "org.bluealsa")
//!   ├── ObjectServer
//!   │     ├── /org/bluealsa            Manager   → ManagerObject
//!   │     └── /org/bluealsa/hci0/...   Pcm
//!   └── registrations: RegistrationId → (path, interface)
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use zbus::names::BusName;
use zbus::{fdo, Connection};
use zvariant::{ObjectPath, OwnedObjectPath};

use super::bus::{Bus, ObjectHandler, RegistrationId, Signal};
use super::error::BusError;
use super::path::{is_valid_object_path, MANAGER_INTERFACE, MANAGER_PATH, PCM_INTERFACE, SERVICE};
use super::value::{MethodReply, PropertyBag};

/// `org.bluealsa.Manager1`
struct Manager {
    handler: Arc<dyn ObjectHandler>,
}

#[zbus::interface(name = "org.bluealsa.Manager1")]
impl Manager {
    #[zbus(name = "GetPCMs")]
    async fn get_pcms(&self) -> fdo::Result<HashMap<OwnedObjectPath, PropertyBag>> {
        let MethodReply::ObjectDict(pcms) = self
            .handler
            .call_method("GetPCMs")
            .await
            .map_err(to_fdo)?;

        pcms.into_iter()
            .map(|(path, properties)| {
                OwnedObjectPath::try_from(path)
                    .map(|path| (path, properties))
                    .map_err(|e| fdo::Error::Failed(e.to_string()))
            })
            .collect()
    }
}

/// `org.bluealsa.PCM1`
///
/// The PCM property set is empty, so zbus answers every `Get` with
/// `UnknownProperty` on its own.
struct Pcm;

#[zbus::interface(name = "org.bluealsa.PCM1")]
impl Pcm {}

/// Map a handler error onto the standard D-Bus error names
fn to_fdo(e: BusError) -> fdo::Error {
    let message = e.to_string();
    match e {
        BusError::NoSuchObject(_) => fdo::Error::UnknownObject(message),
        BusError::NoSuchInterface { .. } => fdo::Error::UnknownInterface(message),
        BusError::NoSuchProperty(_) => fdo::Error::UnknownProperty(message),
        BusError::NoSuchMethod(_) => fdo::Error::UnknownMethod(message),
        _ => fdo::Error::Failed(message),
    }
}

fn connection_error(e: zbus::Error) -> BusError {
    BusError::Connection(e.to_string())
}

/// Bus backed by a D-Bus connection
pub struct DBusConnection {
    connection: Connection,
    registrations: Mutex<HashMap<RegistrationId, (String, &'static str)>>,
    next_id: AtomicU32,
}

impl DBusConnection {
    /// Connect to the system bus and claim `org.bluealsa`
    pub async fn system() -> Result<Self, BusError> {
        let connection = zbus::connection::Builder::system()
            .and_then(|builder| builder.name(SERVICE))
            .map_err(connection_error)?
            .build()
            .await
            .map_err(connection_error)?;

        tracing::info!(service = SERVICE, "Connected to system bus");

        Ok(Self::with_connection(connection))
    }

    /// Connect to the session bus and claim `org.bluealsa`
    pub async fn session() -> Result<Self, BusError> {
        let connection = zbus::connection::Builder::session()
            .and_then(|builder| builder.name(SERVICE))
            .map_err(connection_error)?
            .build()
            .await
            .map_err(connection_error)?;

        tracing::info!(service = SERVICE, "Connected to session bus");

        Ok(Self::with_connection(connection))
    }

    /// Serve objects on an existing connection
    pub fn with_connection(connection: Connection) -> Self {
        Self {
            connection,
            registrations: Mutex::new(HashMap::new()),
            next_id: AtomicU32::new(1),
        }
    }

    /// Underlying zbus connection
    pub fn connection(&self) -> &Connection {
        &self.connection
    }
}

#[async_trait]
impl Bus for DBusConnection {
    async fn register_object(
        &self,
        path: &str,
        handler: Arc<dyn ObjectHandler>,
    ) -> Result<RegistrationId, BusError> {
        if !is_valid_object_path(path) {
            return Err(BusError::InvalidObjectPath(path.to_string()));
        }

        let interface = handler.interface();
        let server = self.connection.object_server();

        let added = match interface {
            MANAGER_INTERFACE => server.at(path, Manager { handler }).await,
            PCM_INTERFACE => server.at(path, Pcm).await,
            _ => {
                return Err(BusError::NoSuchInterface {
                    path: path.to_string(),
                    interface: interface.to_string(),
                })
            }
        }
        .map_err(connection_error)?;

        if !added {
            return Err(BusError::ObjectPathInUse(path.to_string()));
        }

        let id = RegistrationId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.registrations
            .lock()
            .await
            .insert(id, (path.to_string(), interface));

        tracing::trace!(path = path, interface = interface, id = id.get(), "Object served");

        Ok(id)
    }

    async fn unregister_object(&self, id: RegistrationId) -> Result<(), BusError> {
        let (path, interface) = self
            .registrations
            .lock()
            .await
            .get(&id)
            .cloned()
            .ok_or(BusError::NotRegistered(id.get()))?;

        let server = self.connection.object_server();
        let removed = match interface {
            MANAGER_INTERFACE => server.remove::<Manager, _>(path.as_str()).await,
            _ => server.remove::<Pcm, _>(path.as_str()).await,
        }
        .map_err(connection_error)?;

        // Kept until the server let go of the object, so a failure can be retried
        self.registrations.lock().await.remove(&id);

        if !removed {
            tracing::debug!(path = %path, id = id.get(), "Object was already gone");
        }
        tracing::trace!(path = %path, id = id.get(), "Object removed");

        Ok(())
    }

    async fn emit_signal(&self, signal: Signal) -> Result<(), BusError> {
        let object = ObjectPath::try_from(signal.path())
            .map_err(|_| BusError::InvalidObjectPath(signal.path().to_string()))?;

        let result = match &signal {
            Signal::PcmAdded { properties, .. } => {
                self.connection
                    .emit_signal(
                        None::<BusName<'_>>,
                        MANAGER_PATH,
                        MANAGER_INTERFACE,
                        signal.member(),
                        &(object, properties.as_ref()),
                    )
                    .await
            }
            Signal::PcmRemoved { .. } => {
                self.connection
                    .emit_signal(
                        None::<BusName<'_>>,
                        MANAGER_PATH,
                        MANAGER_INTERFACE,
                        signal.member(),
                        &object,
                    )
                    .await
            }
        };

        tracing::trace!(member = signal.member(), path = signal.path(), "Signal emitted");

        result.map_err(connection_error)
    }

    async fn is_registered(&self, path: &str) -> bool {
        self.registrations
            .lock()
            .await
            .values()
            .any(|(registered, _)| registered == path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Codec;
    use crate::dbus::{publish, unpublish, ManagerObject};
    use crate::registry::{BdAddr, Registry, TransportProfile};

    #[test]
    fn test_handler_errors_map_to_standard_names() {
        assert!(matches!(
            to_fdo(BusError::NoSuchMethod("Reset".to_string())),
            fdo::Error::UnknownMethod(_)
        ));
        assert!(matches!(
            to_fdo(BusError::NoSuchProperty("Volume".to_string())),
            fdo::Error::UnknownProperty(_)
        ));
        assert!(matches!(
            to_fdo(BusError::NoSuchObject("/org/bluealsa/hci0".to_string())),
            fdo::Error::UnknownObject(_)
        ));
        assert!(matches!(
            to_fdo(BusError::Disconnected),
            fdo::Error::Failed(_)
        ));
    }

    #[tokio::test]
    #[ignore = "needs a D-Bus session bus"]
    async fn test_pcm_lifecycle_on_session_bus() {
        let bus = DBusConnection::session().await.unwrap();
        let registry = Arc::new(Registry::new());

        let manager = bus
            .register_object(MANAGER_PATH, Arc::new(ManagerObject::new(Arc::clone(&registry))))
            .await
            .unwrap();

        let adapter = registry.insert_adapter(0).await.unwrap();
        let addr: BdAddr = "AA:BB:CC:DD:EE:FF".parse().unwrap();
        let transport = adapter
            .attach_transport(addr, TransportProfile::A2dpSource, Codec::Sbc)
            .await
            .unwrap();
        publish(&bus, &transport).await.unwrap();
        assert!(bus.is_registered(transport.path()).await);

        let reply = bus
            .connection()
            .call_method(
                Some(SERVICE),
                MANAGER_PATH,
                Some(MANAGER_INTERFACE),
                "GetPCMs",
                &(),
            )
            .await
            .unwrap();
        let pcms: HashMap<OwnedObjectPath, PropertyBag> = reply.body().deserialize().unwrap();
        let path = OwnedObjectPath::try_from(transport.path()).unwrap();
        assert!(pcms[&path].is_empty());

        // Same path cannot be served twice
        let duplicate = bus
            .register_object(
                transport.path(),
                Arc::new(crate::dbus::PcmObject::new(&transport)),
            )
            .await;
        assert_eq!(
            duplicate,
            Err(BusError::ObjectPathInUse(transport.path().to_string()))
        );

        unpublish(&bus, &transport).await.unwrap();
        assert!(!bus.is_registered(transport.path()).await);

        bus.unregister_object(manager).await.unwrap();
    }
}
