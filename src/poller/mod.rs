mod service;
mod state;

pub use service::{LiveStatusPoller, PollerHandle, StatusSource};
pub use state::{PollPhase, StatusSnapshot};
