//! Simulated daemon with connection churn
//!
//! Run with: cargo run --example simulated_daemon [DEVICES]
//!
//! Examples:
//!   cargo run --example simulated_daemon          # 4 simulated devices
//!   cargo run --example simulated_daemon 16       # 16 simulated devices
//!   RUST_LOG=bluealsa=debug cargo run --example simulated_daemon
//!
//! Every simulated device connects on hci0, negotiates an RFCOMM channel plus
//! one audio profile, stays up briefly and disconnects. Meanwhile a client
//! task keeps calling GetPCMs and another prints PCMAdded/PCMRemoved signals.

use std::sync::Arc;
use std::time::Duration;

use bluealsa::config::{Codec, Config};
use bluealsa::dbus::{LocalBus, Signal, MANAGER_INTERFACE, MANAGER_PATH};
use bluealsa::registry::{BdAddr, TransportProfile};
use bluealsa::Daemon;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("bluealsa=info")),
        )
        .init();

    let devices: u8 = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(4);

    let config = Config::default()
        .enable_profile(TransportProfile::A2dpSink)
        .init()?;
    println!("Audio group id: {:?}", config.gid_audio);

    let bus = Arc::new(LocalBus::new());
    let daemon = Arc::new(Daemon::new(config, Arc::clone(&bus)));
    daemon.start().await?;
    daemon.add_adapter(0).await?;

    // Signal monitor
    let mut signals = bus.subscribe();
    let monitor = tokio::spawn(async move {
        while let Ok(signal) = signals.recv().await {
            match signal {
                Signal::PcmAdded { path, .. } => println!("+ {}", path),
                Signal::PcmRemoved { path } => println!("- {}", path),
            }
        }
    });

    // Client polling GetPCMs
    let client = {
        let bus = Arc::clone(&bus);
        tokio::spawn(async move {
            for _ in 0..10 {
                match bus
                    .call_method(MANAGER_PATH, MANAGER_INTERFACE, "GetPCMs")
                    .await
                {
                    Ok(reply) => println!("GetPCMs: {} PCM(s)", reply.into_object_dict().len()),
                    Err(e) => println!("GetPCMs failed: {} ({})", e, e.name()),
                }
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
        })
    };

    // Simulated connections
    let mut connections = Vec::new();
    for i in 0..devices {
        let daemon = Arc::clone(&daemon);
        connections.push(tokio::spawn(async move {
            let addr = BdAddr::new([0x00, 0x1A, 0x7D, 0xDA, 0x71, i]);
            let profile = if i % 2 == 0 {
                TransportProfile::A2dpSource
            } else {
                TransportProfile::A2dpSink
            };

            let rfcomm = daemon
                .create_transport(0, addr, TransportProfile::Rfcomm, Codec::None)
                .await?;
            let audio = daemon.create_transport(0, addr, profile, Codec::Sbc).await?;

            tokio::time::sleep(Duration::from_millis(50 + 10 * i as u64)).await;

            daemon.destroy_transport(&audio).await?;
            daemon.destroy_transport(&rfcomm).await?;
            Ok::<_, bluealsa::Error>(())
        }));
    }

    for connection in connections {
        if let Err(e) = connection.await? {
            println!("Connection failed: {}", e);
        }
    }
    client.await?;

    daemon.stop().await?;
    monitor.abort();

    println!("Remaining PCMs: {}", daemon.list_active_transports().await.len());

    Ok(())
}
