use std::env;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

// 默认节奏，与移动端保持一致
pub const DEFAULT_PUSH_INTERVAL_SECS: u64 = 30;
pub const DEFAULT_WATCH_INTERVAL_SECS: u64 = 10;
pub const DEFAULT_WATCH_DISTANCE_M: f64 = 10.0;
pub const DEFAULT_FIX_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub api_base_url: String,
    pub auth_token: Option<String>,
    pub session_file: Option<PathBuf>,
    pub push_interval_secs: u64,
    pub watch_interval_secs: u64,
    pub watch_distance_m: f64,
    pub fix_timeout_secs: u64,
    pub poll_interval_secs: u64,
    pub probe_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub sim_latitude: Option<f64>,
    pub sim_longitude: Option<f64>,
}

impl Config {
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Config {
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
            auth_token: None,
            session_file: None,
            push_interval_secs: DEFAULT_PUSH_INTERVAL_SECS,
            watch_interval_secs: DEFAULT_WATCH_INTERVAL_SECS,
            watch_distance_m: DEFAULT_WATCH_DISTANCE_M,
            fix_timeout_secs: DEFAULT_FIX_TIMEOUT_SECS,
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            probe_timeout_secs: DEFAULT_PROBE_TIMEOUT_SECS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            sim_latitude: None,
            sim_longitude: None,
        }
    }

    pub fn from_env() -> Result<Self, env::VarError> {
        dotenv::dotenv().ok();

        let mut config = Config::new(env::var("API_BASE_URL")?);
        config.auth_token = env::var("AUTH_TOKEN").ok().filter(|t| !t.trim().is_empty());
        config.session_file = env::var("SESSION_FILE").ok().map(PathBuf::from);
        config.push_interval_secs = parse_or("PUSH_INTERVAL", DEFAULT_PUSH_INTERVAL_SECS);
        config.watch_interval_secs = parse_or("WATCH_INTERVAL", DEFAULT_WATCH_INTERVAL_SECS);
        config.watch_distance_m = parse_or("WATCH_DISTANCE", DEFAULT_WATCH_DISTANCE_M);
        config.fix_timeout_secs = parse_or("FIX_TIMEOUT", DEFAULT_FIX_TIMEOUT_SECS);
        config.poll_interval_secs = parse_or("POLL_INTERVAL", DEFAULT_POLL_INTERVAL_SECS);
        config.probe_timeout_secs = parse_or("PROBE_TIMEOUT", DEFAULT_PROBE_TIMEOUT_SECS);
        config.request_timeout_secs = parse_or("REQUEST_TIMEOUT", DEFAULT_REQUEST_TIMEOUT_SECS);
        config.sim_latitude = env::var("SIM_LATITUDE").ok().and_then(|v| v.parse().ok());
        config.sim_longitude = env::var("SIM_LONGITUDE").ok().and_then(|v| v.parse().ok());

        Ok(config)
    }

    pub fn push_interval(&self) -> Duration {
        Duration::from_secs(self.push_interval_secs)
    }

    pub fn watch_interval(&self) -> Duration {
        Duration::from_secs(self.watch_interval_secs)
    }

    pub fn fix_timeout(&self) -> Duration {
        Duration::from_secs(self.fix_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim_end_matches('s').parse::<T>().ok())
        .unwrap_or(default)
}
