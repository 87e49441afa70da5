//! 响应分类：先看 content-type，再决定是否解析 JSON。
//!
//! 非 JSON 的响应体（通常是反向代理或框架返回的 HTML 错误页）无论状态码如何都视为错误。

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::error;

use crate::error::TrackError;

pub const INVALID_FORMAT: &str = "Server returned invalid response format";
pub const INVALID_DATA: &str = "Server returned invalid data format";

const PREVIEW_CHARS: usize = 200;

pub fn is_json(content_type: Option<&str>) -> bool {
    content_type
        .map(|ct| ct.to_ascii_lowercase().contains("application/json"))
        .unwrap_or(false)
}

pub fn classify<T: DeserializeOwned>(
    status: StatusCode,
    content_type: Option<&str>,
    body: &[u8],
) -> Result<T, TrackError> {
    let json = is_json(content_type);

    if status.is_success() {
        if !json {
            error!("Non-JSON response received: {}", preview(body));
            return Err(TrackError::MalformedResponse(INVALID_FORMAT.to_string()));
        }
        return serde_json::from_slice(body).map_err(|e| {
            error!("Failed to decode response body: {}", e);
            TrackError::MalformedResponse(INVALID_DATA.to_string())
        });
    }

    let message = if json {
        error_message(body).unwrap_or_else(|| format!("Server error: {}", status.as_u16()))
    } else {
        error!("Error response (non-JSON): {}", preview(body));
        format!(
            "Server error: {} - {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown")
        )
    };

    Err(TrackError::Server {
        status: status.as_u16(),
        message,
    })
}

// 优先取 error 字段，其次是框架认证失败时的 detail 字段
fn error_message(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    ["error", "detail"]
        .iter()
        .find_map(|key| value.get(*key).and_then(|v| v.as_str()))
        .filter(|msg| !msg.is_empty())
        .map(str::to_string)
}

fn preview(body: &[u8]) -> String {
    String::from_utf8_lossy(body)
        .chars()
        .take(PREVIEW_CHARS)
        .collect()
}
