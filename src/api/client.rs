use std::time::Duration;

use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use super::endpoints;
use super::response::classify;
use crate::config::Config;
use crate::error::TrackError;
use crate::models::{
    DriverLocationResponse, GpsToggleResponse, LocationHistoryResponse, LocationSample,
    ServerLocationRecord, UpdateLocationResponse, VanStatus,
};
use crate::poller::StatusSource;
use crate::tracking::LocationSink;

/// 后端位置接口的 HTTP 客户端
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    probe_timeout: Duration,
}

impl ApiClient {
    pub fn new(config: &Config) -> Result<Self, TrackError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .timeout(config.request_timeout())
            .default_headers(headers)
            .build()
            .map_err(|e| TrackError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.api_base_url.clone(),
            probe_timeout: config.probe_timeout(),
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    fn authorized(&self, request: RequestBuilder, token: &str) -> RequestBuilder {
        request.header(AUTHORIZATION, format!("Token {}", token))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, TrackError> {
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                TrackError::Network(format!("request timed out: {}", e))
            } else {
                TrackError::from(e)
            }
        })?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        debug!(
            "Response status: {}, content-type: {:?}",
            status, content_type
        );

        let body = response.bytes().await?;
        classify(status, content_type.as_deref(), &body)
    }

    /// 连通性探测，超时或任何失败都返回 false
    pub async fn test_connection(&self) -> bool {
        let url = self.url(endpoints::TEST_CONNECTION);
        debug!("Testing connection to: {}", url);

        let probe = self.send::<serde_json::Value>(self.http.get(&url));
        match tokio::time::timeout(self.probe_timeout, probe).await {
            Ok(Ok(body)) => {
                info!("Connection test result: {}", body);
                true
            }
            Ok(Err(e)) => {
                warn!("Connection test failed: {}", e.detail());
                false
            }
            Err(_) => {
                warn!(
                    "Connection test aborted after {}s",
                    self.probe_timeout.as_secs()
                );
                false
            }
        }
    }

    pub async fn update_location(
        &self,
        token: &str,
        sample: &LocationSample,
    ) -> Result<UpdateLocationResponse, TrackError> {
        let request = self
            .authorized(self.http.post(self.url(endpoints::UPDATE_LOCATION)), token)
            .json(sample);
        self.send(request).await
    }

    pub async fn van_location(&self, token: &str) -> Result<VanStatus, TrackError> {
        let request = self.authorized(self.http.get(self.url(endpoints::VAN_LOCATION)), token);
        self.send(request).await
    }

    pub async fn driver_location(&self, token: &str) -> Result<ServerLocationRecord, TrackError> {
        let request = self.authorized(self.http.get(self.url(endpoints::DRIVER_LOCATION)), token);
        let resp: DriverLocationResponse = self.send(request).await?;
        Ok(resp.location)
    }

    pub async fn location_history(
        &self,
        token: &str,
    ) -> Result<Vec<ServerLocationRecord>, TrackError> {
        let request =
            self.authorized(self.http.get(self.url(endpoints::LOCATION_HISTORY)), token);
        let resp: LocationHistoryResponse = self.send(request).await?;
        Ok(resp.locations)
    }

    pub async fn toggle_gps(
        &self,
        token: &str,
        enabled: bool,
    ) -> Result<GpsToggleResponse, TrackError> {
        let request = self
            .authorized(self.http.post(self.url(endpoints::TOGGLE_GPS)), token)
            .json(&serde_json::json!({ "enabled": enabled }));
        self.send(request).await
    }
}

impl LocationSink for ApiClient {
    async fn push_location(&self, token: &str, sample: &LocationSample) -> Result<(), TrackError> {
        let resp = self.update_location(token, sample).await?;
        debug!("Location pushed: {}", resp.message);
        Ok(())
    }
}

impl StatusSource for ApiClient {
    async fn fetch_van_status(&self, token: &str) -> Result<VanStatus, TrackError> {
        self.van_location(token).await
    }
}
