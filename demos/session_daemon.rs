//! Daemon served on the D-Bus session bus
//!
//! Run with: cargo run --example session_daemon
//!
//! Claims `org.bluealsa` on the session bus, adds hci0 and a couple of
//! simulated transports, then waits for Ctrl-C. From another terminal:
//!
//!   busctl --user call org.bluealsa /org/bluealsa org.bluealsa.Manager1 GetPCMs
//!   dbus-monitor --session "interface='org.bluealsa.Manager1'"

use std::sync::Arc;

use bluealsa::config::{Codec, Config};
use bluealsa::dbus::DBusConnection;
use bluealsa::registry::{BdAddr, TransportProfile};
use bluealsa::Daemon;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("bluealsa=debug")),
        )
        .init();

    let config = Config::default().init()?;
    let bus = Arc::new(DBusConnection::session().await?);
    let daemon = Daemon::new(config, bus);
    daemon.start().await?;
    daemon.add_adapter(0).await?;

    let speaker = BdAddr::new([0x00, 0x1A, 0x7D, 0xDA, 0x71, 0x13]);
    let headset = BdAddr::new([0x00, 0x1A, 0x7D, 0xDA, 0x71, 0x14]);

    daemon
        .create_transport(0, speaker, TransportProfile::A2dpSource, Codec::Sbc)
        .await?;
    daemon
        .create_transport(0, headset, TransportProfile::Rfcomm, Codec::None)
        .await?;
    daemon
        .create_transport(0, headset, TransportProfile::HfpAg, Codec::Cvsd)
        .await?;

    for (path, _) in daemon.list_active_transports().await {
        println!("Serving {}", path);
    }
    println!("Press Ctrl-C to stop");

    tokio::signal::ctrl_c().await?;

    daemon.stop().await?;
    println!("Stopped");

    Ok(())
}
