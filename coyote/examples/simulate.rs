//! Perception loop example
//!
//! Feeds a scripted sequence of game screens to the controller and lets it
//! drive the in-memory simulated device until Ctrl-C or the script ends.

use std::time::Duration;

use async_trait::async_trait;
use coyote::{
    Controller, ControllerConfig, Device, DeviceConfig, Load, MemoryTransport, Observation,
    Observer, Recognition,
};
use tokio::sync::oneshot;
use tracing_subscriber::EnvFilter;

/// Plays back a short run through a stage
struct Replay {
    frames: std::vec::IntoIter<Observation>,
    done: Option<oneshot::Sender<()>>,
}

impl Replay {
    fn new(done: oneshot::Sender<()>) -> Self {
        let map = |life: &str, load| Observation::Map {
            life: vec![Recognition::new(life, 0.93)],
            load,
        };
        let battle = |misses: &str| Observation::Battle {
            misses: vec![Recognition::new("X", 0.71), Recognition::new(misses, 0.88)],
        };

        let frames = vec![
            map("20/20", Load::Normal),
            battle("0"),
            battle("1"),
            battle("3"),
            map("12/20", Load::Confused),
            Observation::Idle,
            map("1/20", Load::Stalled),
        ];

        Self {
            frames: frames.into_iter(),
            done: Some(done),
        }
    }
}

#[async_trait]
impl Observer for Replay {
    async fn observe(&mut self) -> anyhow::Result<Observation> {
        match self.frames.next() {
            Some(frame) => Ok(frame),
            None => {
                if let Some(done) = self.done.take() {
                    let _ = done.send(());
                }
                Ok(Observation::Idle)
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = DeviceConfig::from_env();
    let device = Device::new(MemoryTransport::new(config.device_name.clone()), config);

    let (done_tx, done_rx) = oneshot::channel();
    let mut controller = Controller::new(
        device,
        Replay::new(done_tx),
        ControllerConfig::default().with_poll_interval(Duration::from_millis(500)),
    );

    controller.start().await?;

    let shutdown = async {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = done_rx => {}
        }
    };
    controller.run(shutdown).await?;

    println!("Final state: {}", controller.state());
    println!("Stats: {}", controller.stats());
    Ok(())
}
