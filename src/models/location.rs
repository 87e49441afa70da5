use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::number::{number, optional_number};
use super::status::is_recent;
use crate::error::TrackError;
use crate::utils::format_coordinates;

/// 单次定位结果，产生后不可变，转发给回调或服务端后即丢弃
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationSample {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altitude: Option<f64>,
}

impl LocationSample {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, TrackError> {
        let sample = LocationSample {
            latitude,
            longitude,
            accuracy: None,
            speed: None,
            heading: None,
            altitude: None,
        };
        if sample.is_valid() {
            Ok(sample)
        } else {
            Err(TrackError::InvalidCoordinate {
                latitude,
                longitude,
            })
        }
    }

    pub fn with_accuracy(mut self, accuracy: f64) -> Self {
        self.accuracy = Some(accuracy);
        self
    }

    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = Some(speed);
        self
    }

    pub fn with_heading(mut self, heading: f64) -> Self {
        self.heading = Some(heading);
        self
    }

    pub fn with_altitude(mut self, altitude: f64) -> Self {
        self.altitude = Some(altitude);
        self
    }

    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }

    pub fn display_coordinates(&self) -> String {
        format_coordinates(self.latitude, self.longitude)
    }
}

/// 服务端返回的司机位置记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerLocationRecord {
    pub id: i64,
    #[serde(deserialize_with = "number")]
    pub latitude: f64,
    #[serde(deserialize_with = "number")]
    pub longitude: f64,
    #[serde(default, deserialize_with = "optional_number")]
    pub accuracy: Option<f64>,
    #[serde(default, deserialize_with = "optional_number")]
    pub speed: Option<f64>,
    #[serde(default, deserialize_with = "optional_number")]
    pub heading: Option<f64>,
    #[serde(default, deserialize_with = "optional_number")]
    pub altitude: Option<f64>,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub driver_name: String,
    #[serde(default)]
    pub driver_phone: String,
}

impl ServerLocationRecord {
    pub fn sample(&self) -> LocationSample {
        LocationSample {
            latitude: self.latitude,
            longitude: self.longitude,
            accuracy: self.accuracy,
            speed: self.speed,
            heading: self.heading,
            altitude: self.altitude,
        }
    }

    pub fn display_coordinates(&self) -> String {
        if !self.sample().is_valid() {
            return "Invalid location data".to_string();
        }
        format_coordinates(self.latitude, self.longitude)
    }

    pub fn is_recent_at(&self, now: DateTime<Utc>) -> bool {
        is_recent(self.timestamp, now)
    }

    pub fn is_recent(&self) -> bool {
        self.is_recent_at(Utc::now())
    }
}
