use futures_util::stream;
use tokio::sync::watch;
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{info, warn};

use super::provider::{
    Accuracy, LocationProvider, LocationStream, MIN_WATCH_INTERVAL, PermissionStatus, WatchOptions,
};
use crate::error::TrackError;
use crate::models::LocationSample;
use crate::utils::calculate_distance;

/// 模拟定位源，用于命令行演示和本地联调
pub struct SimulatedProvider {
    position: watch::Sender<LocationSample>,
    foreground: PermissionStatus,
    background: PermissionStatus,
}

impl SimulatedProvider {
    pub fn new(start: LocationSample) -> Self {
        let (position, _) = watch::channel(start);
        Self {
            position,
            foreground: PermissionStatus::Granted,
            background: PermissionStatus::Granted,
        }
    }

    pub fn with_permissions(
        mut self,
        foreground: PermissionStatus,
        background: PermissionStatus,
    ) -> Self {
        self.foreground = foreground;
        self.background = background;
        self
    }

    pub fn set_position(&self, sample: LocationSample) {
        self.position.send_replace(sample);
    }

    pub fn position(&self) -> LocationSample {
        *self.position.borrow()
    }
}

struct WatchState {
    rx: watch::Receiver<LocationSample>,
    ticker: Interval,
    last: Option<LocationSample>,
    min_distance_m: f64,
}

impl WatchState {
    fn moved_enough(&self, sample: &LocationSample) -> bool {
        match self.last {
            Some(last) => {
                calculate_distance(last.latitude, last.longitude, sample.latitude, sample.longitude)
                    >= self.min_distance_m
            }
            None => true,
        }
    }
}

impl LocationProvider for SimulatedProvider {
    async fn request_foreground_permission(&self) -> Result<PermissionStatus, TrackError> {
        Ok(self.foreground)
    }

    async fn request_background_permission(&self) -> Result<PermissionStatus, TrackError> {
        Ok(self.background)
    }

    fn open_settings_prompt(&self, title: &str, message: &str) {
        warn!("{}: {}", title, message);
    }

    async fn current_position(&self, _accuracy: Accuracy) -> Result<LocationSample, TrackError> {
        Ok(self.position())
    }

    async fn watch_position(&self, options: WatchOptions) -> Result<LocationStream, TrackError> {
        let mut ticker = tokio::time::interval(options.min_interval.max(MIN_WATCH_INTERVAL));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let state = WatchState {
            rx: self.position.subscribe(),
            ticker,
            last: None,
            min_distance_m: options.min_distance_m,
        };
        info!(
            "Simulated watch opened ({:?}, {}s / {}m)",
            options.accuracy,
            options.min_interval.as_secs(),
            options.min_distance_m
        );

        // 时间间隔与位移阈值，先到者触发
        let updates = stream::unfold(state, |mut st| async move {
            loop {
                tokio::select! {
                    _ = st.ticker.tick() => {
                        let sample = *st.rx.borrow_and_update();
                        st.last = Some(sample);
                        return Some((Ok(sample), st));
                    }
                    changed = st.rx.changed() => {
                        if changed.is_err() {
                            return None;
                        }
                        let sample = *st.rx.borrow_and_update();
                        if st.moved_enough(&sample) {
                            st.ticker.reset();
                            st.last = Some(sample);
                            return Some((Ok(sample), st));
                        }
                    }
                }
            }
        });

        Ok(Box::pin(updates))
    }
}
