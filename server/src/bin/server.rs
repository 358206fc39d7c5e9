use relief_core::telemetry::{init_tracing, with_bootstrap_logging};
use relief_core::ReliefConfig;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Local overrides; missing .env is fine
    let _ = dotenvy::dotenv();

    // Config problems are reported before the configured subscriber exists
    let config = with_bootstrap_logging(ReliefConfig::load);
    init_tracing(&config.logging);

    info!(
        target: "http",
        database = %config.database.path.display(),
        trust_identity_headers = config.auth.trust_identity_headers,
        "Starting relief server"
    );

    relief_server::start_server(config).await
}
