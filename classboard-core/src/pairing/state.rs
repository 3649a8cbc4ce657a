//! Pairing state machine: pure `apply(event) -> effects` transitions.
//!
//! The machine owns no timers and performs no I/O. The driver in
//! [`crate::pairing::poller`] feeds it registry responses and executes the
//! returned effects.

use crate::pairing::route::DisplayRoute;
use crate::registry::{DeviceConfig, StatusReport};

/// Client view of the registry record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollState {
    /// No registry response yet.
    Loading,
    /// Announced, waiting for an administrator.
    Pending,
    /// Config received. Terminal for the pairing flow.
    Active(DeviceConfig),
}

impl PollState {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active(_))
    }
}

/// Inputs to the machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PairingEvent {
    HandshakeCompleted(StatusReport),
    HandshakeFailed(String),
    PollCompleted(StatusReport),
    PollFailed(String),
    /// The registry no longer knows the device.
    PollNotFound,
    /// The owning view is going away.
    Unmount,
}

/// Side effects requested by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    StartPolling,
    Navigate(DisplayRoute),
    StopPolling,
    ShowError(String),
}

/// Pairing state machine for one tablet view.
#[derive(Debug)]
pub struct PairingMachine {
    state: PollState,
    error: Option<String>,
    polling_started: bool,
    finished: bool,
}

impl Default for PairingMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl PairingMachine {
    pub fn new() -> Self {
        Self {
            state: PollState::Loading,
            error: None,
            polling_started: false,
            finished: false,
        }
    }

    pub fn state(&self) -> &PollState {
        &self.state
    }

    /// Non-fatal error hint from the last failed handshake.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// True once the machine reached ACTIVE or was unmounted.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Apply one event and return the effects to execute, in order.
    pub fn apply(&mut self, event: PairingEvent) -> Vec<Effect> {
        if self.finished {
            return Vec::new();
        }

        let mut effects = Vec::new();
        match event {
            PairingEvent::HandshakeCompleted(report) => {
                self.on_report(report, &mut effects);
                self.start_polling(&mut effects);
            }
            PairingEvent::HandshakeFailed(message) => {
                self.error = Some(message.clone());
                effects.push(Effect::ShowError(message));
                self.start_polling(&mut effects);
            }
            PairingEvent::PollCompleted(report) => self.on_report(report, &mut effects),
            PairingEvent::PollNotFound => self.on_report(StatusReport::Pending, &mut effects),
            PairingEvent::PollFailed(_) => {}
            PairingEvent::Unmount => {
                self.finished = true;
                effects.push(Effect::StopPolling);
            }
        }
        effects
    }

    fn on_report(&mut self, report: StatusReport, effects: &mut Vec<Effect>) {
        match report {
            StatusReport::Pending => {
                self.state = PollState::Pending;
                self.error = None;
            }
            StatusReport::Malformed(reason) => {
                tracing::warn!("Ignoring malformed registry response: {}", reason);
                self.state = PollState::Pending;
            }
            StatusReport::Active(config) => {
                let route = DisplayRoute::from(&config);
                self.state = PollState::Active(config);
                self.error = None;
                self.finished = true;
                effects.push(Effect::Navigate(route));
                effects.push(Effect::StopPolling);
            }
        }
    }

    fn start_polling(&mut self, effects: &mut Vec<Effect>) {
        if self.finished || self.polling_started {
            return;
        }
        self.polling_started = true;
        effects.push(Effect::StartPolling);
    }
}
