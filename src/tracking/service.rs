use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use futures_util::StreamExt;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::provider::{Accuracy, LocationProvider, LocationStream, PermissionStatus, WatchOptions};
use crate::api::TokenSource;
use crate::config::Config;
use crate::error::TrackError;
use crate::models::LocationSample;

const PERMISSION_TITLE: &str = "Permission Required";
const PERMISSION_MESSAGE: &str =
    "Location permission is required to track your van. Please enable it in settings.";
const START_FAILED: &str = "Failed to start location tracking";
const SUBSCRIPTION_ENDED: &str = "Location subscription ended";

/// 位置上报的目标，通常是后端 HTTP 接口
pub trait LocationSink: Send + Sync + 'static {
    fn push_location(
        &self,
        token: &str,
        sample: &LocationSample,
    ) -> impl Future<Output = Result<(), TrackError>> + Send;
}

struct Shared<P, S, T> {
    provider: P,
    sink: S,
    tokens: T,
    watch_options: WatchOptions,
    push_interval: Duration,
    fix_timeout: Duration,
}

impl<P, S, T> Shared<P, S, T>
where
    P: LocationProvider,
    S: LocationSink,
    T: TokenSource,
{
    async fn request_permissions(&self) -> bool {
        match self.provider.request_foreground_permission().await {
            Ok(PermissionStatus::Granted) => {}
            Ok(status) => {
                warn!("Foreground location permission not granted: {:?}", status);
                self.provider
                    .open_settings_prompt(PERMISSION_TITLE, PERMISSION_MESSAGE);
                return false;
            }
            Err(e) => {
                error!("Error requesting location permissions: {}", e.detail());
                return false;
            }
        }

        // 后台权限是尽力而为，拒绝时仅降级为前台定位
        match self.provider.request_background_permission().await {
            Ok(PermissionStatus::Granted) => {}
            Ok(_) => warn!("Background location permission not granted. Tracking will be limited."),
            Err(e) => warn!(
                "Error requesting background location permission: {}",
                e.detail()
            ),
        }

        true
    }

    async fn current_location(&self) -> Option<LocationSample> {
        let fix = self.provider.current_position(Accuracy::High);
        match tokio::time::timeout(self.fix_timeout, fix).await {
            Ok(Ok(sample)) if sample.is_valid() => Some(sample),
            Ok(Ok(sample)) => {
                error!(
                    "Discarding out-of-range fix: {}",
                    sample.display_coordinates()
                );
                None
            }
            Ok(Err(e)) => {
                error!("Error getting current location: {}", e.detail());
                None
            }
            Err(_) => {
                error!(
                    "Timed out getting current location after {}s",
                    self.fix_timeout.as_secs()
                );
                None
            }
        }
    }

    async fn push_current_location(&self) {
        let Some(sample) = self.current_location().await else {
            return;
        };
        let Some(token) = self.tokens.auth_token().await else {
            warn!("No auth token available, skipping location push");
            return;
        };

        // 失败的样本直接丢弃，等待下一次定时上报
        match self.sink.push_location(&token, &sample).await {
            Ok(()) => debug!("Location sent to server: {}", sample.display_coordinates()),
            Err(e) => error!("Failed to send location to server: {}", e.detail()),
        }
    }
}

struct TrackingSession {
    cancel: CancellationToken,
    watch_task: JoinHandle<()>,
    push_task: JoinHandle<()>,
}

impl TrackingSession {
    async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.watch_task.await {
            warn!("Location watch task ended abnormally: {}", e);
        }
        if let Err(e) = self.push_task.await {
            warn!("Location push task ended abnormally: {}", e);
        }
    }
}

/// 司机端定位服务：订阅设备位置变化，同时按固定周期向服务端上报
pub struct PositionAcquisitionService<P, S, T> {
    shared: Arc<Shared<P, S, T>>,
    session: Mutex<Option<TrackingSession>>,
    tracking: Arc<AtomicBool>,
}

impl<P, S, T> PositionAcquisitionService<P, S, T>
where
    P: LocationProvider,
    S: LocationSink,
    T: TokenSource,
{
    pub fn new(provider: P, sink: S, tokens: T, config: &Config) -> Self {
        Self {
            shared: Arc::new(Shared {
                provider,
                sink,
                tokens,
                watch_options: WatchOptions::from_config(config),
                push_interval: config.push_interval().max(Duration::from_secs(1)),
                fix_timeout: config.fix_timeout(),
            }),
            session: Mutex::new(None),
            tracking: Arc::new(AtomicBool::new(false)),
        }
    }

    pub async fn request_permissions(&self) -> bool {
        self.shared.request_permissions().await
    }

    pub async fn get_current_location(&self) -> Option<LocationSample> {
        self.shared.current_location().await
    }

    pub async fn start_tracking<U, E>(&self, on_update: U, on_error: E) -> bool
    where
        U: Fn(LocationSample) + Send + Sync + 'static,
        E: Fn(&TrackError) + Send + Sync + 'static,
    {
        let mut session = self.session.lock().await;
        if session.as_ref().is_some_and(|s| !s.cancel.is_cancelled()) {
            warn!("Location tracking is already active");
            return true;
        }
        // 平台订阅已自行结束的会话，先回收再重新订阅
        if let Some(ended) = session.take() {
            ended.shutdown().await;
        }

        if !self.shared.request_permissions().await {
            on_error(&TrackError::PermissionDenied);
            return false;
        }

        let stream = match self
            .shared
            .provider
            .watch_position(self.shared.watch_options)
            .await
        {
            Ok(stream) => stream,
            Err(e) => {
                error!("Error starting location tracking: {}", e.detail());
                on_error(&TrackError::Acquisition(START_FAILED.to_string()));
                return false;
            }
        };

        let cancel = CancellationToken::new();
        self.tracking.store(true, Ordering::SeqCst);
        let watch_task = tokio::spawn(watch_loop(
            stream,
            cancel.clone(),
            Arc::clone(&self.tracking),
            on_update,
            on_error,
        ));
        let push_task = tokio::spawn(push_loop(Arc::clone(&self.shared), cancel.clone()));

        *session = Some(TrackingSession {
            cancel,
            watch_task,
            push_task,
        });

        info!(
            "Location tracking started (watch every {}s / {}m, push every {}s)",
            self.shared.watch_options.min_interval.as_secs(),
            self.shared.watch_options.min_distance_m,
            self.shared.push_interval.as_secs()
        );
        true
    }

    /// 取消订阅与定时器，并等待两个任务退出后返回
    pub async fn stop_tracking(&self) {
        let session = self.session.lock().await.take();
        self.tracking.store(false, Ordering::SeqCst);

        if let Some(session) = session {
            session.shutdown().await;
            info!("Location tracking stopped");
        }
    }

    pub fn is_currently_tracking(&self) -> bool {
        self.tracking.load(Ordering::SeqCst)
    }

    pub async fn dispose(self) {
        self.stop_tracking().await;
    }
}

impl<P, S, T> Drop for PositionAcquisitionService<P, S, T> {
    fn drop(&mut self) {
        if let Some(session) = self.session.get_mut().take() {
            debug!("Tracking service dropped with an active session, cancelling");
            session.cancel.cancel();
        }
    }
}

async fn watch_loop<U, E>(
    mut stream: LocationStream,
    cancel: CancellationToken,
    tracking: Arc<AtomicBool>,
    on_update: U,
    on_error: E,
) where
    U: Fn(LocationSample) + Send + Sync + 'static,
    E: Fn(&TrackError) + Send + Sync + 'static,
{
    loop {
        tokio::select! {
            biased;

            _ = cancel.cancelled() => break,

            next = stream.next() => match next {
                Some(Ok(sample)) if sample.is_valid() => on_update(sample),
                Some(Ok(sample)) => {
                    let e = TrackError::InvalidCoordinate {
                        latitude: sample.latitude,
                        longitude: sample.longitude,
                    };
                    warn!("Location watch produced an invalid fix: {}", e);
                    on_error(&e);
                }
                Some(Err(e)) => {
                    warn!("Location watch error: {}", e.detail());
                    on_error(&e);
                }
                None => {
                    warn!("Location subscription ended, stopping session");
                    tracking.store(false, Ordering::SeqCst);
                    cancel.cancel();
                    on_error(&TrackError::Acquisition(SUBSCRIPTION_ENDED.to_string()));
                    break;
                }
            },
        }
    }
    // stream 在此处被丢弃，平台订阅随之释放
}

async fn push_loop<P, S, T>(shared: Arc<Shared<P, S, T>>, cancel: CancellationToken)
where
    P: LocationProvider,
    S: LocationSink,
    T: TokenSource,
{
    let period = shared.push_interval;
    // 与 setInterval 一致：第一次上报发生在一个周期之后
    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = interval.tick() => {}
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = shared.push_current_location() => {}
        }
    }
}
