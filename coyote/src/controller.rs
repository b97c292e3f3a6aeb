//! Perception/decision loop
//!
//! Each poll asks an [`Observer`] what the game screen shows, folds the
//! answer into a [`GameState`] and sets both channels to the strength that
//! state maps to. Capture and OCR stay behind the trait.

use std::future::Future;

use async_trait::async_trait;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use coyote_types::{GameState, Observation, PollStats};

use crate::config::ControllerConfig;
use crate::device::Device;
use crate::error::{Error, Result};

/// Source of game-screen observations
#[async_trait]
pub trait Observer: Send {
    /// Capture and recognise the screen once
    async fn observe(&mut self) -> anyhow::Result<Observation>;
}

/// Drives a [`Device`] from game-screen observations
pub struct Controller<O> {
    device: Device,
    observer: O,
    config: ControllerConfig,
    state: GameState,
    stats: PollStats,
}

impl<O: Observer> Controller<O> {
    pub fn new(device: Device, observer: O, config: ControllerConfig) -> Self {
        Self {
            device,
            observer,
            config,
            state: GameState::default(),
            stats: PollStats::default(),
        }
    }

    /// Connect and send the start-up waveform and strength
    pub async fn start(&mut self) -> Result<()> {
        if !self.device.is_connected() {
            self.device.connect().await?;
        }

        self.device
            .set_waveform(
                &self.config.startup_frequencies,
                &self.config.startup_intensities,
            )
            .await?;
        self.device
            .set_absolute_strength(self.config.startup_strength)
            .await?;

        info!(
            "Controller started at strength {}",
            self.config.startup_strength
        );
        Ok(())
    }

    /// Observe once and apply the resulting strength
    ///
    /// Returns the strength that was sent.
    pub async fn poll_once(&mut self) -> Result<i32> {
        let started = Instant::now();

        let observation = self.observer.observe().await.map_err(Error::Observation)?;
        self.state.apply(&observation);

        let target = self.state.target_strength();
        self.device.set_absolute_strength(target).await?;

        self.stats.record(started.elapsed());
        debug!(strength = target, state = %self.state, "Poll complete");
        Ok(target)
    }

    /// Poll until `shutdown` resolves, then disconnect
    ///
    /// Failed polls are logged and followed by the configured back-off; a
    /// lost link is re-established before the next attempt. `shutdown` is
    /// checked between polls, never in the middle of one.
    pub async fn run(&mut self, shutdown: impl Future<Output = ()>) -> Result<()> {
        tokio::pin!(shutdown);

        loop {
            let started = Instant::now();

            let pause = match self.poll_once().await {
                Ok(_) => self.config.poll_interval.saturating_sub(started.elapsed()),
                Err(e) => {
                    warn!("Poll failed: {}", e);
                    if e.requires_reconnect() {
                        self.reconnect().await;
                    }
                    self.config.error_backoff
                }
            };

            tokio::select! {
                _ = &mut shutdown => break,
                _ = tokio::time::sleep(pause) => {}
            }
        }

        info!("Controller stopping after {}", self.stats);
        self.device.disconnect().await
    }

    async fn reconnect(&mut self) {
        info!("Link lost, reconnecting");
        if let Err(e) = self.device.connect().await {
            warn!("Reconnect failed: {}", e);
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn stats(&self) -> &PollStats {
        &self.stats
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut Device {
        &mut self.device
    }

    /// Tear down the controller, returning the device
    pub fn into_device(self) -> Device {
        self.device
    }
}
