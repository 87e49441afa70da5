use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::state::StatusSnapshot;
use crate::api::TokenSource;
use crate::config::Config;
use crate::error::TrackError;
use crate::models::VanStatus;

/// 家长端查看的车辆状态来源
pub trait StatusSource: Send + Sync + 'static {
    fn fetch_van_status(
        &self,
        token: &str,
    ) -> impl Future<Output = Result<VanStatus, TrackError>> + Send;
}

/// 家长端轮询器：定时拉取车辆位置，并通过 watch 通道发布最新状态
pub struct LiveStatusPoller<S, T> {
    source: S,
    tokens: T,
    poll_interval: Duration,
    state: watch::Sender<StatusSnapshot>,
    next_seq: AtomicU64,
}

impl<S, T> LiveStatusPoller<S, T>
where
    S: StatusSource,
    T: TokenSource,
{
    pub fn new(source: S, tokens: T, config: &Config) -> Self {
        let (state, _) = watch::channel(StatusSnapshot::default());
        Self {
            source,
            tokens,
            poll_interval: config.poll_interval().max(Duration::from_secs(1)),
            state,
            next_seq: AtomicU64::new(0),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<StatusSnapshot> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        self.state.borrow().clone()
    }

    pub fn is_location_recent(&self) -> bool {
        self.state.borrow().is_location_recent_at(Utc::now())
    }

    pub async fn fetch_status(&self, is_refresh: bool) {
        let Some(token) = self.tokens.auth_token().await else {
            debug!("No auth token, skipping van status fetch");
            return;
        };

        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_modify(|s| s.begin(is_refresh));
        let mut pending = PendingFetch {
            state: &self.state,
            seq,
            finished: false,
        };

        let outcome = self.source.fetch_van_status(&token).await;
        match &outcome {
            Ok(status) => debug!(
                "Van status #{} received, location present: {}, children: {}",
                seq,
                status.location.is_some(),
                status.children.len()
            ),
            Err(e) => error!("Van tracking error: {}", e.detail()),
        }

        let now = Utc::now();
        let mut applied = false;
        self.state.send_modify(|s| applied = s.apply(seq, outcome, now));
        pending.finished = true;
        if !applied {
            debug!("Discarding out-of-order van status response #{}", seq);
        }
    }

    pub async fn refresh(&self) {
        self.fetch_status(true).await;
    }

    /// 错误页上的手动重试
    pub async fn retry(&self) {
        self.fetch_status(false).await;
    }

    /// 挂载：立即拉取一次，此后每个周期刷新，直到卸载
    pub fn mount(self: &Arc<Self>) -> PollerHandle {
        let cancel = CancellationToken::new();
        let task = tokio::spawn(poll_loop(Arc::clone(self), cancel.clone()));
        info!(
            "Van status polling mounted (every {}s)",
            self.poll_interval.as_secs()
        );
        PollerHandle {
            cancel,
            task: Some(task),
        }
    }
}

/// 拉取 future 在完成前被丢弃时（例如卸载），撤销 begin 设置的加载状态
struct PendingFetch<'a> {
    state: &'a watch::Sender<StatusSnapshot>,
    seq: u64,
    finished: bool,
}

impl Drop for PendingFetch<'_> {
    fn drop(&mut self) {
        if !self.finished {
            debug!("Van status request #{} cancelled before completion", self.seq);
            self.state.send_modify(|s| s.abandon());
        }
    }
}

pub struct PollerHandle {
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl PollerHandle {
    pub fn is_mounted(&self) -> bool {
        !self.cancel.is_cancelled()
    }

    pub async fn unmount(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!("Van status poll task ended abnormally: {}", e);
            }
        }
        info!("Van status polling unmounted");
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn poll_loop<S, T>(poller: Arc<LiveStatusPoller<S, T>>, cancel: CancellationToken)
where
    S: StatusSource,
    T: TokenSource,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => return,
        _ = poller.fetch_status(false) => {}
    }

    let period = poller.poll_interval;
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
            _ = poller.fetch_status(true) => {}
        }
    }
}
