use chrono::{DateTime, Utc};

use crate::error::TrackError;
use crate::models::{ChildAssignment, LiveIndicator, ServerLocationRecord, VanAssignment, VanStatus};

#[derive(Debug, Clone, Default, PartialEq)]
pub enum PollPhase {
    #[default]
    Idle,
    Loading,
    Refreshing,
    Success,
    Error(String),
}

/// 展示层看到的轮询状态
#[derive(Debug, Clone, Default)]
pub struct StatusSnapshot {
    pub phase: PollPhase,
    pub location: Option<ServerLocationRecord>,
    pub van_assignment: Option<VanAssignment>,
    pub children: Vec<ChildAssignment>,
    /// 最近一次成功拉取的本地时间
    pub last_update: Option<DateTime<Utc>>,
    applied_seq: u64,
    in_flight: u32,
    /// 最近一次落定的阶段，拉取被取消时回退到这里
    settled: PollPhase,
}

impl StatusSnapshot {
    /// 首次加载显示整页 loading，刷新时保留原有内容
    pub fn is_loading(&self) -> bool {
        self.phase == PollPhase::Loading
    }

    pub fn is_refreshing(&self) -> bool {
        self.phase == PollPhase::Refreshing
    }

    pub fn error(&self) -> Option<&str> {
        match &self.phase {
            PollPhase::Error(message) => Some(message),
            _ => None,
        }
    }

    pub fn is_location_recent_at(&self, now: DateTime<Utc>) -> bool {
        self.location
            .as_ref()
            .map(|l| l.is_recent_at(now))
            .unwrap_or(false)
    }

    pub fn indicator_at(&self, now: DateTime<Utc>) -> LiveIndicator {
        LiveIndicator::from_timestamp(self.location.as_ref().map(|l| l.timestamp), now)
    }

    pub(crate) fn begin(&mut self, is_refresh: bool) {
        self.in_flight += 1;
        self.phase = if is_refresh {
            PollPhase::Refreshing
        } else {
            PollPhase::Loading
        };
    }

    /// 应用一次拉取结果；比已应用结果更早发出的响应会被丢弃
    pub(crate) fn apply(
        &mut self,
        seq: u64,
        outcome: Result<VanStatus, TrackError>,
        now: DateTime<Utc>,
    ) -> bool {
        self.in_flight = self.in_flight.saturating_sub(1);
        if seq <= self.applied_seq {
            return false;
        }
        self.applied_seq = seq;

        match outcome {
            Ok(status) => {
                self.location = status.location;
                self.van_assignment = status.van_assignment;
                self.children = status.children;
                self.last_update = Some(now);
                self.phase = PollPhase::Success;
            }
            Err(e) => {
                self.phase = PollPhase::Error(e.to_string());
            }
        }
        self.settled = self.phase.clone();
        true
    }

    /// 拉取在完成前被取消；没有其他进行中的请求时恢复到上一个落定状态
    pub(crate) fn abandon(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
        if self.in_flight == 0 && matches!(self.phase, PollPhase::Loading | PollPhase::Refreshing) {
            self.phase = self.settled.clone();
        }
    }
}
