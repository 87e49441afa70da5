use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use futures_util::Stream;

use crate::config::Config;
use crate::error::TrackError;
use crate::models::LocationSample;

/// 平台位置订阅。丢弃该流即释放底层订阅。
pub type LocationStream = Pin<Box<dyn Stream<Item = Result<LocationSample, TrackError>> + Send>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
    Undetermined,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accuracy {
    Balanced,
    High,
}

/// 订阅的最小推送间隔下限，零间隔会让计时器失效
pub const MIN_WATCH_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WatchOptions {
    pub accuracy: Accuracy,
    pub min_interval: Duration,
    pub min_distance_m: f64,
}

impl WatchOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            accuracy: Accuracy::High,
            min_interval: config.watch_interval().max(MIN_WATCH_INTERVAL),
            min_distance_m: config.watch_distance_m,
        }
    }
}

/// 设备定位能力的抽象，由宿主平台实现
pub trait LocationProvider: Send + Sync + 'static {
    fn request_foreground_permission(
        &self,
    ) -> impl Future<Output = Result<PermissionStatus, TrackError>> + Send;

    fn request_background_permission(
        &self,
    ) -> impl Future<Output = Result<PermissionStatus, TrackError>> + Send;

    /// 提示用户前往系统设置开启定位权限
    fn open_settings_prompt(&self, title: &str, message: &str);

    fn current_position(
        &self,
        accuracy: Accuracy,
    ) -> impl Future<Output = Result<LocationSample, TrackError>> + Send;

    /// 满足最小时间间隔或最小位移任一条件即推送新的定位
    fn watch_position(
        &self,
        options: WatchOptions,
    ) -> impl Future<Output = Result<LocationStream, TrackError>> + Send;
}
