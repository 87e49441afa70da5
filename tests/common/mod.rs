//! Test doubles shared by the integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use futures_util::stream;
use tokio::sync::mpsc;

use vantrack::TrackError;
use vantrack::models::{LocationSample, ServerLocationRecord, VanAssignment, VanStatus};
use vantrack::poller::StatusSource;
use vantrack::tracking::{
    Accuracy, LocationProvider, LocationSink, LocationStream, PermissionStatus, WatchOptions,
};

pub const DELHI: (f64, f64) = (28.6139, 77.2090);

pub fn delhi() -> LocationSample {
    LocationSample::new(DELHI.0, DELHI.1)
        .unwrap()
        .with_accuracy(15.0)
        .with_speed(8.3)
}

// ============================================================================
// Location provider
// ============================================================================

struct SubscriptionGuard(Arc<AtomicUsize>);

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

type Update = Result<LocationSample, TrackError>;

struct ProviderState {
    foreground: Mutex<Result<PermissionStatus, TrackError>>,
    background: Mutex<Result<PermissionStatus, TrackError>>,
    fix: Mutex<Result<LocationSample, TrackError>>,
    fix_delay: Mutex<Option<Duration>>,
    fail_watch: AtomicBool,
    prompts: AtomicUsize,
    foreground_requests: AtomicUsize,
    watch_calls: AtomicUsize,
    last_watch_options: Mutex<Option<WatchOptions>>,
    active_subscriptions: Arc<AtomicUsize>,
    senders: Mutex<Vec<mpsc::UnboundedSender<Update>>>,
}

/// Scriptable platform location API that counts live subscriptions.
#[derive(Clone)]
pub struct MockProvider {
    state: Arc<ProviderState>,
}

impl MockProvider {
    pub fn granted(fix: LocationSample) -> Self {
        Self {
            state: Arc::new(ProviderState {
                foreground: Mutex::new(Ok(PermissionStatus::Granted)),
                background: Mutex::new(Ok(PermissionStatus::Granted)),
                fix: Mutex::new(Ok(fix)),
                fix_delay: Mutex::new(None),
                fail_watch: AtomicBool::new(false),
                prompts: AtomicUsize::new(0),
                foreground_requests: AtomicUsize::new(0),
                watch_calls: AtomicUsize::new(0),
                last_watch_options: Mutex::new(None),
                active_subscriptions: Arc::new(AtomicUsize::new(0)),
                senders: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn set_foreground(&self, answer: Result<PermissionStatus, TrackError>) {
        *self.state.foreground.lock().unwrap() = answer;
    }

    pub fn set_background(&self, answer: Result<PermissionStatus, TrackError>) {
        *self.state.background.lock().unwrap() = answer;
    }

    pub fn set_fix(&self, fix: Result<LocationSample, TrackError>) {
        *self.state.fix.lock().unwrap() = fix;
    }

    pub fn set_fix_delay(&self, delay: Duration) {
        *self.state.fix_delay.lock().unwrap() = Some(delay);
    }

    pub fn fail_watch(&self) {
        self.state.fail_watch.store(true, Ordering::SeqCst);
    }

    /// Pushes an update into every open subscription.
    pub fn emit(&self, update: Update) {
        let senders = self.state.senders.lock().unwrap();
        for tx in senders.iter() {
            let _ = tx.send(update.clone());
        }
    }

    /// Closes every open subscription from the platform side.
    pub fn end_subscriptions(&self) {
        self.state.senders.lock().unwrap().clear();
    }

    pub fn prompts(&self) -> usize {
        self.state.prompts.load(Ordering::SeqCst)
    }

    pub fn foreground_requests(&self) -> usize {
        self.state.foreground_requests.load(Ordering::SeqCst)
    }

    pub fn watch_calls(&self) -> usize {
        self.state.watch_calls.load(Ordering::SeqCst)
    }

    pub fn last_watch_options(&self) -> Option<WatchOptions> {
        *self.state.last_watch_options.lock().unwrap()
    }

    pub fn active_subscriptions(&self) -> usize {
        self.state.active_subscriptions.load(Ordering::SeqCst)
    }
}

impl LocationProvider for MockProvider {
    async fn request_foreground_permission(&self) -> Result<PermissionStatus, TrackError> {
        self.state.foreground_requests.fetch_add(1, Ordering::SeqCst);
        self.state.foreground.lock().unwrap().clone()
    }

    async fn request_background_permission(&self) -> Result<PermissionStatus, TrackError> {
        self.state.background.lock().unwrap().clone()
    }

    fn open_settings_prompt(&self, _title: &str, _message: &str) {
        self.state.prompts.fetch_add(1, Ordering::SeqCst);
    }

    async fn current_position(&self, _accuracy: Accuracy) -> Result<LocationSample, TrackError> {
        let delay = *self.state.fix_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.state.fix.lock().unwrap().clone()
    }

    async fn watch_position(&self, options: WatchOptions) -> Result<LocationStream, TrackError> {
        self.state.watch_calls.fetch_add(1, Ordering::SeqCst);
        *self.state.last_watch_options.lock().unwrap() = Some(options);
        if self.state.fail_watch.load(Ordering::SeqCst) {
            return Err(TrackError::Acquisition("location services disabled".into()));
        }

        let (tx, rx) = mpsc::unbounded_channel();
        self.state.senders.lock().unwrap().push(tx);

        let active = Arc::clone(&self.state.active_subscriptions);
        active.fetch_add(1, Ordering::SeqCst);
        let guard = SubscriptionGuard(active);

        let updates = stream::unfold((rx, guard), |(mut rx, guard)| async move {
            rx.recv().await.map(|update| (update, (rx, guard)))
        });
        Ok(Box::pin(updates))
    }
}

// ============================================================================
// Location sink
// ============================================================================

#[derive(Clone, Default)]
pub struct MockSink {
    pushed: Arc<Mutex<Vec<(String, LocationSample)>>>,
    attempts: Arc<AtomicUsize>,
    failing: Arc<AtomicBool>,
}

impl MockSink {
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn pushed(&self) -> Vec<(String, LocationSample)> {
        self.pushed.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl LocationSink for MockSink {
    async fn push_location(&self, token: &str, sample: &LocationSample) -> Result<(), TrackError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(TrackError::Network("connection refused".into()));
        }
        self.pushed
            .lock()
            .unwrap()
            .push((token.to_string(), *sample));
        Ok(())
    }
}

// ============================================================================
// Status source
// ============================================================================

type Scripted = (Duration, Result<VanStatus, TrackError>);

#[derive(Clone, Default)]
pub struct MockSource {
    script: Arc<Mutex<VecDeque<Scripted>>>,
    fallback: Arc<Mutex<Option<Result<VanStatus, TrackError>>>>,
    calls: Arc<AtomicUsize>,
    tokens: Arc<Mutex<Vec<String>>>,
}

impl MockSource {
    pub fn always(outcome: Result<VanStatus, TrackError>) -> Self {
        let source = MockSource::default();
        *source.fallback.lock().unwrap() = Some(outcome);
        source
    }

    pub fn push(&self, delay: Duration, outcome: Result<VanStatus, TrackError>) {
        self.script.lock().unwrap().push_back((delay, outcome));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn tokens(&self) -> Vec<String> {
        self.tokens.lock().unwrap().clone()
    }
}

impl StatusSource for MockSource {
    async fn fetch_van_status(&self, token: &str) -> Result<VanStatus, TrackError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.tokens.lock().unwrap().push(token.to_string());

        let scripted = self.script.lock().unwrap().pop_front();
        let (delay, outcome) = match scripted {
            Some(next) => next,
            None => {
                let fallback = self.fallback.lock().unwrap().clone();
                (
                    Duration::ZERO,
                    fallback.unwrap_or_else(|| Ok(VanStatus::default())),
                )
            }
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        outcome
    }
}

pub fn record_at(timestamp: DateTime<Utc>) -> ServerLocationRecord {
    ServerLocationRecord {
        id: 1,
        latitude: DELHI.0,
        longitude: DELHI.1,
        accuracy: Some(15.0),
        speed: Some(8.3),
        heading: Some(90.0),
        altitude: None,
        timestamp,
        is_active: true,
        driver_name: "Ramesh Kumar".into(),
        driver_phone: "+919876543210".into(),
    }
}

pub fn status_seen_ago(ago: TimeDelta) -> VanStatus {
    VanStatus {
        location: Some(record_at(Utc::now() - ago)),
        van_assignment: Some(VanAssignment {
            id: 1,
            van_number: "DL-01-AB-1234".into(),
            van_model: "Force Traveller".into(),
            capacity: 20,
            route_name: "Route A".into(),
            is_active: true,
            driver_name: "Ramesh Kumar".into(),
            driver_phone: "+919876543210".into(),
        }),
        children: Vec::new(),
    }
}
