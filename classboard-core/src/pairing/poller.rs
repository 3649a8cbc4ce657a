//! Pairing session: handshake, periodic status poll, one-time navigation.

use crate::pairing::route::DisplayRoute;
use crate::pairing::state::{Effect, PairingEvent, PairingMachine, PollState};
use crate::registry::{RegistryApi, StatusReport};
use crate::{ClassboardError, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

/// Default period between status polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Puts display routes on screen. A pairing session navigates at most once;
/// the display watchdog may navigate again on reassignment.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: &DisplayRoute);

    /// Take the current display down, back to the pairing screen.
    fn leave(&self) {}
}

/// How a pairing session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PairingOutcome {
    Activated(DisplayRoute),
    Cancelled,
}

/// Snapshot of the session for status displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairingView {
    pub state: PollState,
    pub error: Option<String>,
}

enum Reply {
    Handshake(Result<StatusReport>),
    Poll(Result<StatusReport>),
}

/// Drives a [`PairingMachine`] against the registry.
pub struct PairingSession {
    api: Arc<dyn RegistryApi>,
    navigator: Arc<dyn Navigator>,
    device_id: String,
    poll_interval: Duration,
}

impl PairingSession {
    pub fn new(
        api: Arc<dyn RegistryApi>,
        navigator: Arc<dyn Navigator>,
        device_id: impl Into<String>,
    ) -> Self {
        Self {
            api,
            navigator,
            device_id: device_id.into(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Start the session on the current runtime.
    pub fn spawn(self) -> PairingHandle {
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let (view_tx, view_rx) = watch::channel(PairingView {
            state: PollState::Loading,
            error: None,
        });

        let task = tokio::spawn(self.run(shutdown_rx, view_tx));

        PairingHandle {
            shutdown: Some(shutdown_tx),
            task: Some(task),
            view: view_rx,
        }
    }

    async fn run(
        self,
        mut shutdown: oneshot::Receiver<()>,
        view: watch::Sender<PairingView>,
    ) -> PairingOutcome {
        let mut machine = PairingMachine::new();
        let (reply_tx, mut reply_rx) = mpsc::channel::<Reply>(4);

        info!("Announcing device {} to registry", self.device_id);
        self.spawn_request(reply_tx.clone(), true);

        let mut ticker: Option<Interval> = None;
        let mut in_flight: Option<JoinHandle<()>> = None;
        let mut activated: Option<DisplayRoute> = None;

        loop {
            let event = tokio::select! {
                _ = &mut shutdown => PairingEvent::Unmount,
                _ = next_tick(&mut ticker) => {
                    if in_flight.as_ref().is_some_and(|task| !task.is_finished()) {
                        debug!("Previous status poll still in flight, skipping tick");
                        continue;
                    }
                    in_flight = Some(self.spawn_request(reply_tx.clone(), false));
                    continue;
                }
                Some(reply) = reply_rx.recv() => self.to_event(reply),
            };

            let mut stop = false;
            for effect in machine.apply(event) {
                match effect {
                    Effect::StartPolling => {
                        let mut interval = time::interval_at(
                            Instant::now() + self.poll_interval,
                            self.poll_interval,
                        );
                        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                        ticker = Some(interval);
                    }
                    Effect::Navigate(route) => {
                        info!("Device {} activated, opening {}", self.device_id, route);
                        self.navigator.navigate(&route);
                        activated = Some(route);
                    }
                    Effect::StopPolling => {
                        ticker = None;
                        stop = true;
                    }
                    Effect::ShowError(message) => {
                        error!("Registry handshake failed: {}", message);
                    }
                }
            }

            view.send_replace(PairingView {
                state: machine.state().clone(),
                error: machine.error().map(str::to_string),
            });

            if stop {
                if let Some(task) = in_flight.take() {
                    task.abort();
                }
                return match activated {
                    Some(route) => PairingOutcome::Activated(route),
                    None => PairingOutcome::Cancelled,
                };
            }
        }
    }

    fn spawn_request(&self, reply_tx: mpsc::Sender<Reply>, handshake: bool) -> JoinHandle<()> {
        let api = self.api.clone();
        let device_id = self.device_id.clone();
        tokio::spawn(async move {
            let reply = if handshake {
                Reply::Handshake(api.handshake(&device_id).await)
            } else {
                Reply::Poll(api.status(&device_id).await)
            };
            // The session may already be gone
            let _ = reply_tx.send(reply).await;
        })
    }

    fn to_event(&self, reply: Reply) -> PairingEvent {
        match reply {
            Reply::Handshake(Ok(report)) => PairingEvent::HandshakeCompleted(report),
            Reply::Handshake(Err(e)) => {
                warn!("Handshake for {} failed: {}", self.device_id, e);
                PairingEvent::HandshakeFailed(handshake_hint(&e).to_string())
            }
            Reply::Poll(Ok(report)) => PairingEvent::PollCompleted(report),
            Reply::Poll(Err(ClassboardError::NotFound(_))) => {
                debug!("Registry does not know {} yet", self.device_id);
                PairingEvent::PollNotFound
            }
            Reply::Poll(Err(e)) => {
                warn!("Status poll for {} failed: {}", self.device_id, e);
                PairingEvent::PollFailed(e.to_string())
            }
        }
    }
}

/// Short message suitable for the pairing screen.
fn handshake_hint(error: &ClassboardError) -> &'static str {
    match error {
        ClassboardError::Status(_)
        | ClassboardError::NotFound(_)
        | ClassboardError::InvalidInput(_) => "Handshake failed",
        _ => "Connection error",
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

/// Owner of a running pairing session. Dropping the handle cancels it.
pub struct PairingHandle {
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<PairingOutcome>>,
    view: watch::Receiver<PairingView>,
}

impl PairingHandle {
    /// Current state and error hint.
    pub fn view(&self) -> PairingView {
        self.view.borrow().clone()
    }

    /// Subscribe to state changes.
    pub fn subscribe(&self) -> watch::Receiver<PairingView> {
        self.view.clone()
    }

    /// Stop polling without waiting for the session to finish.
    pub fn cancel(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }

    /// Wait for the session to end.
    pub async fn wait(mut self) -> PairingOutcome {
        let Some(task) = self.task.take() else {
            return PairingOutcome::Cancelled;
        };
        match task.await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Pairing session aborted: {}", e);
                PairingOutcome::Cancelled
            }
        }
    }
}
