use serde::{Deserialize, Serialize};

use super::location::ServerLocationRecord;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VanAssignment {
    pub id: i64,
    pub van_number: String,
    #[serde(default)]
    pub van_model: String,
    #[serde(default)]
    pub capacity: u32,
    #[serde(default)]
    pub route_name: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub driver_name: String,
    #[serde(default)]
    pub driver_phone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildAssignment {
    pub id: i64,
    pub child_name: String,
    #[serde(default)]
    pub child_grade: String,
    #[serde(default)]
    pub school_name: String,
    #[serde(default)]
    pub admission_number: String,
    pub pickup_time: Option<String>,
    pub dropoff_time: Option<String>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub van_number: String,
    #[serde(default)]
    pub driver_name: String,
    #[serde(default)]
    pub driver_phone: String,
}

/// `GET /locations/van-location/` 的响应
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VanStatus {
    #[serde(default)]
    pub location: Option<ServerLocationRecord>,
    #[serde(default)]
    pub van_assignment: Option<VanAssignment>,
    #[serde(default)]
    pub children: Vec<ChildAssignment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateLocationResponse {
    #[serde(default)]
    pub message: String,
    pub location: Option<ServerLocationRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverLocationResponse {
    pub location: ServerLocationRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationHistoryResponse {
    #[serde(default)]
    pub locations: Vec<ServerLocationRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpsToggleResponse {
    #[serde(default)]
    pub message: String,
    pub enabled: bool,
}
