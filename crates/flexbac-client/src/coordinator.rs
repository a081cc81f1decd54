//! Fixed-interval refresh driver.

use crate::device::Device;
use crate::error::DeviceError;
use crate::session::Transport;
use crate::state::DeviceState;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

/// What subscribers see after every refresh attempt.
#[derive(Debug, Clone, Default)]
pub struct CoordinatorUpdate {
    /// Last good snapshot, kept across failed refreshes.
    pub snapshot: Option<Arc<DeviceState>>,
    /// Whether the latest attempt succeeded.
    pub available: bool,
    /// Message of the latest failure, cleared by the next success.
    pub last_error: Option<String>,
}

/// Calls [`Device::refresh`] every `interval` and publishes the outcome on a
/// watch channel. A failed refresh is logged and the loop carries on; the
/// next tick is the retry.
#[derive(Debug)]
pub struct Coordinator<T> {
    device: Arc<Device<T>>,
    interval: Duration,
    updates: watch::Sender<CoordinatorUpdate>,
}

impl<T: Transport> Coordinator<T> {
    /// Intervals below one millisecond are raised to one. Nothing runs until
    /// [`Coordinator::first_refresh`] or [`Coordinator::run`].
    pub fn new(device: Arc<Device<T>>, interval: Duration) -> Self {
        let (updates, _) = watch::channel(CoordinatorUpdate::default());
        Self {
            device,
            interval: interval.max(Duration::from_millis(1)),
            updates,
        }
    }

    /// Device this coordinator refreshes.
    pub fn device(&self) -> &Arc<Device<T>> {
        &self.device
    }

    /// Refresh cadence.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Receiver that sees every published update. The current value is
    /// available immediately.
    pub fn subscribe(&self) -> watch::Receiver<CoordinatorUpdate> {
        self.updates.subscribe()
    }

    /// Copy of the most recently published update.
    pub fn latest(&self) -> CoordinatorUpdate {
        self.updates.borrow().clone()
    }

    /// Refresh run during setup. The error is returned, not logged, so the
    /// caller can abort setup with it.
    pub async fn first_refresh(&self) -> Result<Arc<DeviceState>, DeviceError> {
        let result = self.device.refresh().await;
        self.publish(&result);
        result
    }

    /// Refreshes out of cadence, e.g. right after a write.
    pub async fn request_refresh(&self) -> Result<Arc<DeviceState>, DeviceError> {
        let result = self.device.refresh().await;
        if let Err(err) = &result {
            log::warn!(
                "refresh of device {} at {} failed: {err}",
                self.device.device_id(),
                self.device.peer()
            );
        }
        self.publish(&result);
        result
    }

    /// Ticks until `shutdown` turns true or its sender is dropped. The first
    /// refresh happens one interval after start.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut tick = tokio::time::interval(self.interval);
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tick.tick().await;

        loop {
            if *shutdown.borrow() {
                return;
            }
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        return;
                    }
                }
                _ = tick.tick() => {
                    let _ = self.request_refresh().await;
                }
            }
        }
    }

    fn publish(&self, result: &Result<Arc<DeviceState>, DeviceError>) {
        let (snapshot, available) = self.device.status();
        self.updates.send_replace(CoordinatorUpdate {
            snapshot,
            available,
            last_error: result.as_ref().err().map(ToString::to_string),
        });
    }
}
