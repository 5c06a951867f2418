use tracing_subscriber::EnvFilter;

use homework_common::config::AppConfig;
use homework_notifier::TelegramNotifier;
use homework_poller::client::PracticumClient;
use homework_poller::poller::StatusPoller;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("homework_poller=debug,homework_engine=debug,homework_notifier=debug")
    });
    if std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json")) {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    tracing::info!("Homework poller starting...");

    // Load configuration; missing secrets abort before any network call
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(
                critical = e.is_fatal(),
                error = %e,
                "Invalid configuration, aborting"
            );
            return Err(e.into());
        }
    };

    let http = reqwest::Client::new();
    let source = PracticumClient::new(
        http.clone(),
        config.practicum_endpoint.clone(),
        config.practicum_token.clone(),
    );
    let notifier = TelegramNotifier::new(
        http,
        config.telegram_api_url.clone(),
        config.telegram_token.clone(),
        config.telegram_chat_id.clone(),
    );

    tracing::info!(endpoint = source.endpoint(), "Polling homework statuses");

    let mut poller = StatusPoller::new(source, notifier, config.retry_period());

    tokio::select! {
        _ = poller.run() => {}
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received shutdown signal, stopping...");
        }
    }

    tracing::info!("Homework poller stopped.");
    Ok(())
}
