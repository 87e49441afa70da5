mod location;
pub mod number;
mod status;
mod van;

pub use location::{LocationSample, ServerLocationRecord};
pub use status::{LiveIndicator, RECENCY_WINDOW_MS, is_recent};
pub use van::{
    ChildAssignment, DriverLocationResponse, GpsToggleResponse, LocationHistoryResponse,
    UpdateLocationResponse, VanAssignment, VanStatus,
};
