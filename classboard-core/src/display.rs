//! Display watchdog: keeps an activated tablet in sync with its registry record.
//!
//! Once paired, the tablet re-checks its status on a slower cadence. A room
//! reassignment moves the display to the new route; a device that was reset
//! to PENDING or deleted by an administrator goes back to pairing.

use crate::pairing::{DisplayRoute, Navigator};
use crate::registry::{RegistryApi, StatusReport};
use crate::{ClassboardError, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Default period between display checks.
pub const DEFAULT_WATCH_INTERVAL: Duration = Duration::from_secs(10);

/// What the display should do after one status check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reroute {
    Stay,
    Display(DisplayRoute),
    Pairing,
}

/// Decide the next display action from one status check.
///
/// Transport failures and malformed payloads keep the current display;
/// only an explicit PENDING record or a missing record leave it.
pub fn watch_decision(current: &DisplayRoute, result: &Result<StatusReport>) -> Reroute {
    match result {
        Ok(StatusReport::Active(config)) => {
            let route = DisplayRoute::from(config);
            if &route == current {
                Reroute::Stay
            } else {
                Reroute::Display(route)
            }
        }
        Ok(StatusReport::Pending) => Reroute::Pairing,
        Err(ClassboardError::NotFound(_)) => Reroute::Pairing,
        Ok(StatusReport::Malformed(_)) | Err(_) => Reroute::Stay,
    }
}

pub struct DisplayWatchdog {
    api: Arc<dyn RegistryApi>,
    navigator: Arc<dyn Navigator>,
    device_id: String,
    interval: Duration,
}

impl DisplayWatchdog {
    pub fn new(
        api: Arc<dyn RegistryApi>,
        navigator: Arc<dyn Navigator>,
        device_id: impl Into<String>,
    ) -> Self {
        Self {
            api,
            navigator,
            device_id: device_id.into(),
            interval: DEFAULT_WATCH_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Watch until the device must pair again. Returns the route that was
    /// on screen at that point. Cancel by dropping the future.
    pub async fn run(&self, mut current: DisplayRoute) -> DisplayRoute {
        let mut ticker = time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let result = self.api.status(&self.device_id).await;

            match &result {
                Ok(StatusReport::Malformed(reason)) => {
                    warn!("Ignoring malformed registry response: {}", reason);
                }
                Err(ClassboardError::NotFound(_)) => {}
                Err(e) => warn!("Display check for {} failed: {}", self.device_id, e),
                Ok(_) => {}
            }

            match watch_decision(&current, &result) {
                Reroute::Stay => debug!("Display for {} unchanged", self.device_id),
                Reroute::Display(route) => {
                    info!("Device {} reassigned to {}", self.device_id, route);
                    self.navigator.navigate(&route);
                    current = route;
                }
                Reroute::Pairing => {
                    info!("Device {} is no longer active, returning to pairing", self.device_id);
                    self.navigator.leave();
                    return current;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::DeviceConfig;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn route(room: &str, secret: &str) -> DisplayRoute {
        DisplayRoute {
            room: room.to_string(),
            secret_url: secret.to_string(),
        }
    }

    fn active(room: &str, secret: &str) -> Result<StatusReport> {
        Ok(StatusReport::Active(DeviceConfig {
            room: room.to_string(),
            secret_url: secret.to_string(),
        }))
    }

    #[test]
    fn same_config_stays() {
        let current = route("WI1-100", "abc123");
        assert_eq!(
            watch_decision(&current, &active("WI1-100", "abc123")),
            Reroute::Stay
        );
    }

    #[test]
    fn new_room_or_secret_reroutes() {
        let current = route("WI1-100", "abc123");
        assert_eq!(
            watch_decision(&current, &active("WI2-200", "abc123")),
            Reroute::Display(route("WI2-200", "abc123"))
        );
        assert_eq!(
            watch_decision(&current, &active("WI1-100", "rotated")),
            Reroute::Display(route("WI1-100", "rotated"))
        );
    }

    #[test]
    fn pending_or_missing_returns_to_pairing() {
        let current = route("WI1-100", "abc123");
        assert_eq!(
            watch_decision(&current, &Ok(StatusReport::Pending)),
            Reroute::Pairing
        );
        assert_eq!(
            watch_decision(&current, &Err(ClassboardError::NotFound("482193".into()))),
            Reroute::Pairing
        );
    }

    #[test]
    fn failures_keep_display() {
        let current = route("WI1-100", "abc123");
        assert_eq!(
            watch_decision(&current, &Err(ClassboardError::Status(502))),
            Reroute::Stay
        );
        assert_eq!(
            watch_decision(&current, &Ok(StatusReport::Malformed("bad".into()))),
            Reroute::Stay
        );
    }

    struct ScriptedStatus {
        responses: Mutex<VecDeque<Result<StatusReport>>>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl RegistryApi for ScriptedStatus {
        async fn handshake(&self, _device_id: &str) -> Result<StatusReport> {
            unreachable!("the watchdog never re-announces")
        }

        async fn status(&self, _device_id: &str) -> Result<StatusReport> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Ok(StatusReport::Pending))
        }
    }

    #[derive(Default)]
    struct RecordingNavigator {
        routes: Mutex<Vec<DisplayRoute>>,
        leaves: AtomicUsize,
    }

    impl Navigator for RecordingNavigator {
        fn navigate(&self, route: &DisplayRoute) {
            self.routes.lock().unwrap().push(route.clone());
        }

        fn leave(&self) {
            self.leaves.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn follows_reassignment_then_returns_to_pairing() {
        let api = Arc::new(ScriptedStatus {
            responses: Mutex::new(
                vec![
                    active("WI1-100", "abc123"),
                    Err(ClassboardError::Http("timeout".into())),
                    active("WI2-200", "def456"),
                    active("WI2-200", "def456"),
                    Err(ClassboardError::NotFound("482193".into())),
                ]
                .into(),
            ),
            calls: AtomicUsize::new(0),
        });
        let navigator = Arc::new(RecordingNavigator::default());
        let watchdog = DisplayWatchdog::new(api.clone(), navigator.clone(), "482193");
        let start = Instant::now();

        let last = watchdog.run(route("WI1-100", "abc123")).await;

        assert_eq!(last, route("WI2-200", "def456"));
        assert_eq!(start.elapsed(), Duration::from_secs(50));
        assert_eq!(api.calls.load(Ordering::SeqCst), 5);
        assert_eq!(
            *navigator.routes.lock().unwrap(),
            vec![route("WI2-200", "def456")]
        );
        assert_eq!(navigator.leaves.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn reassignment_keeps_display_up() {
        let api = Arc::new(ScriptedStatus {
            responses: Mutex::new(
                vec![
                    active("WI2-200", "def456"),
                    Ok(StatusReport::Malformed("bad".into())),
                    Ok(StatusReport::Pending),
                ]
                .into(),
            ),
            calls: AtomicUsize::new(0),
        });
        let navigator = Arc::new(RecordingNavigator::default());
        let watchdog = DisplayWatchdog::new(api.clone(), navigator.clone(), "482193");

        let watch = tokio::spawn(async move { watchdog.run(route("WI1-100", "abc123")).await });

        time::sleep(Duration::from_secs(25)).await;
        assert_eq!(navigator.routes.lock().unwrap().len(), 1);
        assert_eq!(navigator.leaves.load(Ordering::SeqCst), 0);

        let last = watch.await.unwrap();
        assert_eq!(last, route("WI2-200", "def456"));
        assert_eq!(navigator.leaves.load(Ordering::SeqCst), 1);
    }
}
