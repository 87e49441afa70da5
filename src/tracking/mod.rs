mod provider;
mod service;
mod simulated;

pub use provider::{Accuracy, LocationProvider, LocationStream, PermissionStatus, WatchOptions};
pub use service::{LocationSink, PositionAcquisitionService};
pub use simulated::SimulatedProvider;
