use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{AppState, serve};
use yorisoi_core::{
    CoreConfig, Session,
    constants::{DEFAULT_REST_ADDR, ENV_FIXTURES, ENV_NOTIFICATION_TTL_MS, ENV_REST_ADDR},
};

/// Main entry point for the Yorisoi application
///
/// Loads the configured dataset into a single session and serves it over REST.
///
/// # Environment Variables
/// - `YORISOI_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `YORISOI_FIXTURES`: YAML dataset replacing the bundled demo data
/// - `YORISOI_NOTIFICATION_TTL_MS`: notification display time (default: 3000)
///
/// # Returns
/// * `Ok(())` - If the server starts and runs successfully
/// * `Err(anyhow::Error)` - If configuration, dataset loading or the server fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("yorisoi=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var(ENV_REST_ADDR).unwrap_or_else(|_| DEFAULT_REST_ADDR.into());

    let cfg = CoreConfig::from_env_values(
        std::env::var(ENV_FIXTURES).ok(),
        std::env::var(ENV_NOTIFICATION_TTL_MS).ok(),
    )?;
    let session = Session::load(&cfg)?;
    tracing::info!(
        "++ Loaded {} patients and {} rounds",
        session.patients.patients().len(),
        session.rounds.rounds().len()
    );

    serve(AppState::new(session), &rest_addr).await
}
