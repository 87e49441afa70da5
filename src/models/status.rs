use chrono::{DateTime, TimeDelta, Utc};

use crate::utils::time_ago;

/// 位置在两分钟内视为实时
pub const RECENCY_WINDOW_MS: i64 = 120_000;

pub fn is_recent(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now.signed_duration_since(timestamp) < TimeDelta::milliseconds(RECENCY_WINDOW_MS)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiveIndicator {
    Live,
    Offline,
}

impl LiveIndicator {
    pub fn from_timestamp(timestamp: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Self {
        match timestamp {
            Some(ts) if is_recent(ts, now) => LiveIndicator::Live,
            _ => LiveIndicator::Offline,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            LiveIndicator::Live => "Live Tracking",
            LiveIndicator::Offline => "Location Offline",
        }
    }

    pub fn subtitle(&self, timestamp: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
        match (self, timestamp) {
            (LiveIndicator::Live, _) => "Real-time updates active".to_string(),
            (LiveIndicator::Offline, Some(ts)) => format!("Last seen: {}", time_ago(ts, now)),
            (LiveIndicator::Offline, None) => "Last seen: Unknown".to_string(),
        }
    }

    /// 实时状态下指示灯做脉冲动画
    pub fn pulses(&self) -> bool {
        matches!(self, LiveIndicator::Live)
    }
}
