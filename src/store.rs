use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::api::TokenSource;
use crate::error::TrackError;

/// 本地持久化的登录信息：令牌与缓存的用户资料
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredSession {
    pub auth_token: Option<String>,
    #[serde(default)]
    pub user: Option<serde_json::Value>,
    #[serde(default)]
    pub profile: Option<serde_json::Value>,
}

#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 文件不存在时返回空会话
    pub async fn load(&self) -> Result<StoredSession, TrackError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(StoredSession::default());
            }
            Err(e) => return Err(e.into()),
        };
        serde_json::from_slice(&bytes).map_err(|e| TrackError::Storage(e.to_string()))
    }

    pub async fn save(&self, session: &StoredSession) -> Result<(), TrackError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let bytes =
            serde_json::to_vec_pretty(session).map_err(|e| TrackError::Storage(e.to_string()))?;
        tokio::fs::write(&self.path, bytes).await?;
        debug!("Session saved to {}", self.path.display());
        Ok(())
    }

    /// 退出登录时清除
    pub async fn clear(&self) -> Result<(), TrackError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl TokenSource for SessionStore {
    async fn auth_token(&self) -> Option<String> {
        match self.load().await {
            Ok(session) => session.auth_token.filter(|t| !t.trim().is_empty()),
            Err(e) => {
                error!("Error getting auth token: {}", e);
                None
            }
        }
    }
}
