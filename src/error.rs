use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrackError {
    #[error("Location permission denied")]
    PermissionDenied,

    #[error("{0}")]
    Acquisition(String),

    // 细节只写日志，界面上统一显示 "Network error"
    #[error("Network error")]
    Network(String),

    #[error("{message}")]
    Server { status: u16, message: String },

    #[error("{0}")]
    MalformedResponse(String),

    #[error("coordinate out of range: {latitude}, {longitude}")]
    InvalidCoordinate { latitude: f64, longitude: f64 },

    #[error("unparseable numeric value: {value:?}")]
    Unparseable { value: String },

    #[error("session storage error: {0}")]
    Storage(String),
}

impl TrackError {
    /// 供日志使用的完整描述，网络错误会带上底层原因
    pub fn detail(&self) -> String {
        match self {
            TrackError::Network(detail) => format!("Network error: {}", detail),
            TrackError::Server { status, message } => format!("{} ({})", message, status),
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for TrackError {
    fn from(e: reqwest::Error) -> Self {
        TrackError::Network(e.to_string())
    }
}

impl From<std::io::Error> for TrackError {
    fn from(e: std::io::Error) -> Self {
        TrackError::Storage(e.to_string())
    }
}
