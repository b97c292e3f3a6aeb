//! Strength control example
//!
//! Drives the in-memory simulated device through the basic session
//! operations.

use std::time::Duration;

use coyote::{Channel, Device, DeviceConfig, MemoryTransport, convert_frequency};
use tokio::time::sleep;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = DeviceConfig::from_env();
    let transport = MemoryTransport::new(config.device_name.clone());
    let simulated = transport.handle();

    let mut device = Device::new(transport, config);
    device.connect().await?;

    println!("Device connected!");

    let result = async {
        // Same waveform on both channels
        let frequencies = [10, 20, 30, 40].map(convert_frequency);
        device.set_waveform(&frequencies, &[20, 40, 60, 80]).await?;

        device.set_absolute_strength(20).await?;
        println!("Strength: {}", device.get_current_strength());
        sleep(Duration::from_secs(5)).await;

        device.adjust_strength(10).await?;
        println!("Strength: {}", device.get_current_strength());

        // Let the acknowledgment arrive, then compare
        sleep(Duration::from_millis(50)).await;
        println!(
            "Device reports A={:?} B={:?}",
            device.reported_strength(Channel::A),
            device.reported_strength(Channel::B)
        );
        println!("Battery: {}%", device.battery_level().await?);
        anyhow::Ok(())
    }
    .await;

    if let Err(e) = &result {
        eprintln!("Error: {e:#}");
    }

    device.disconnect().await?;
    println!("{} frames written", simulated.write_count());

    result
}
