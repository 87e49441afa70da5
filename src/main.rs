use std::sync::Arc;

use chrono::Utc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vantrack::{
    api::{ApiClient, StaticToken},
    config::Config,
    models::LocationSample,
    poller::LiveStatusPoller,
    store::SessionStore,
    tracking::{PositionAcquisitionService, SimulatedProvider},
    utils::{accuracy_meters, speed_kmh},
};

#[tokio::main]
async fn main() {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 加载配置
    let config = Config::from_env().expect("Failed to load configuration");
    let client = ApiClient::new(&config).expect("Failed to create API client");

    // 令牌优先取环境变量，其次读取本地会话文件
    let token = match (&config.auth_token, &config.session_file) {
        (Some(token), _) => Some(token.clone()),
        (None, Some(path)) => SessionStore::new(path)
            .load()
            .await
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to read session file: {}", e);
                Default::default()
            })
            .auth_token,
        (None, None) => None,
    };
    let tokens = StaticToken::from(token);

    let mode = std::env::args().nth(1).unwrap_or_else(|| "probe".into());
    match mode.as_str() {
        "probe" => {
            if client.test_connection().await {
                tracing::info!("Connected to {}", config.api_base_url);
            } else {
                tracing::error!("Cannot connect to server. Please check your internet connection.");
                std::process::exit(1);
            }
        }
        "parent" => run_parent(client, tokens, &config).await,
        "driver" => run_driver(client, tokens, &config).await,
        other => {
            tracing::error!("Unknown mode '{}', expected probe | parent | driver", other);
            std::process::exit(2);
        }
    }
}

async fn run_parent(client: ApiClient, tokens: StaticToken, config: &Config) {
    let poller = Arc::new(LiveStatusPoller::new(client, tokens, config));
    let mut updates = poller.subscribe();
    let handle = poller.mount();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = updates.borrow_and_update().clone();
                let now = Utc::now();
                if let Some(message) = snapshot.error() {
                    tracing::warn!("Van status unavailable: {}", message);
                    continue;
                }
                if let Some(location) = &snapshot.location {
                    let indicator = snapshot.indicator_at(now);
                    tracing::info!(
                        "{} | {} | {} | van {}",
                        indicator.title(),
                        indicator.subtitle(Some(location.timestamp), now),
                        location.display_coordinates(),
                        snapshot
                            .van_assignment
                            .as_ref()
                            .map(|v| v.van_number.as_str())
                            .unwrap_or("-")
                    );
                }
            }
        }
    }

    handle.unmount().await;
}

async fn run_driver(client: ApiClient, tokens: StaticToken, config: &Config) {
    let start = match LocationSample::new(
        config.sim_latitude.unwrap_or(28.6139),
        config.sim_longitude.unwrap_or(77.2090),
    ) {
        Ok(sample) => sample,
        Err(e) => {
            tracing::error!("Invalid simulated start position: {}", e);
            std::process::exit(2);
        }
    };

    let service =
        PositionAcquisitionService::new(SimulatedProvider::new(start), client, tokens, config);

    let started = service
        .start_tracking(
            |sample| {
                tracing::info!(
                    "Position {} accuracy {:?}m speed {:?}km/h",
                    sample.display_coordinates(),
                    accuracy_meters(sample.accuracy),
                    speed_kmh(sample.speed)
                );
            },
            |e| tracing::error!("GPS Error: {}", e),
        )
        .await;
    if !started {
        std::process::exit(1);
    }

    // 启动后立即取一次初始定位
    if let Some(initial) = service.get_current_location().await {
        tracing::info!("Initial fix {}", initial.display_coordinates());
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    service.dispose().await;
}
