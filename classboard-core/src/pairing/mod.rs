//! Tablet pairing protocol
//!
//! A tablet announces its device code, polls the registry until an
//! administrator assigns it to a room, then navigates to the room's
//! display route exactly once.

pub mod poller;
pub mod route;
pub mod state;

pub use poller::{
    Navigator, PairingHandle, PairingOutcome, PairingSession, PairingView,
    DEFAULT_POLL_INTERVAL,
};
pub use route::DisplayRoute;
pub use state::{Effect, PairingEvent, PairingMachine, PollState};
