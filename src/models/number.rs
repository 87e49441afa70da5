//! 服务端 DecimalField 会以字符串形式返回数值，这里统一在反序列化边界归一化为 `f64`。

use serde::{Deserialize, Deserializer, de};

use crate::error::TrackError;

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

pub fn parse_decimal(raw: &str) -> Result<f64, TrackError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| TrackError::Unparseable {
            value: raw.to_string(),
        })
}

pub fn number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match NumberOrText::deserialize(deserializer)? {
        NumberOrText::Number(n) => Ok(n),
        NumberOrText::Text(s) => parse_decimal(&s).map_err(de::Error::custom),
    }
}

/// 缺失、`null` 与空字符串都视为未知
pub fn optional_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrText>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrText::Number(n)) => Ok(Some(n)),
        Some(NumberOrText::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(NumberOrText::Text(s)) => parse_decimal(&s).map(Some).map_err(de::Error::custom),
    }
}
