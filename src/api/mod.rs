mod auth;
mod client;
pub mod response;

pub use auth::{StaticToken, TokenSource};
pub use client::ApiClient;

pub mod endpoints {
    pub const TEST_CONNECTION: &str = "/test/";
    pub const UPDATE_LOCATION: &str = "/locations/update-location/";
    pub const DRIVER_LOCATION: &str = "/locations/driver-location/";
    pub const VAN_LOCATION: &str = "/locations/van-location/";
    pub const LOCATION_HISTORY: &str = "/locations/location-history/";
    pub const TOGGLE_GPS: &str = "/locations/toggle-gps/";
}
