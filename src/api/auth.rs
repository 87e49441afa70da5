use std::future::Future;

/// 认证令牌来源，每次请求前读取一次
pub trait TokenSource: Send + Sync + 'static {
    fn auth_token(&self) -> impl Future<Output = Option<String>> + Send;
}

#[derive(Debug, Clone, Default)]
pub struct StaticToken(Option<String>);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        let token = token.into();
        if token.trim().is_empty() {
            StaticToken(None)
        } else {
            StaticToken(Some(token))
        }
    }

    pub fn none() -> Self {
        StaticToken(None)
    }
}

impl From<Option<String>> for StaticToken {
    fn from(token: Option<String>) -> Self {
        token.map(StaticToken::new).unwrap_or_default()
    }
}

impl TokenSource for StaticToken {
    async fn auth_token(&self) -> Option<String> {
        self.0.clone()
    }
}
