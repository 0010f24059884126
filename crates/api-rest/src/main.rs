//! Standalone REST API server binary.
//!
//! ## Purpose
//! Runs the REST API server on its own, with OpenAPI/Swagger UI at `/swagger-ui`.
//!
//! ## Environment Variables
//! - `YORISOI_REST_ADDR`: listen address (default: "0.0.0.0:3000")
//! - `YORISOI_FIXTURES`: YAML dataset to load instead of the bundled demo data
//! - `YORISOI_NOTIFICATION_TTL_MS`: notification display time in milliseconds

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{serve, AppState};
use yorisoi_core::{
    constants::{DEFAULT_REST_ADDR, ENV_FIXTURES, ENV_NOTIFICATION_TTL_MS, ENV_REST_ADDR},
    CoreConfig, Session,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?)
                .add_directive("yorisoi_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var(ENV_REST_ADDR).unwrap_or_else(|_| DEFAULT_REST_ADDR.into());

    // Resolve configuration once at startup.
    let cfg = CoreConfig::from_env_values(
        std::env::var(ENV_FIXTURES).ok(),
        std::env::var(ENV_NOTIFICATION_TTL_MS).ok(),
    )?;
    let session = Session::load(&cfg)?;

    serve(AppState::new(session), &rest_addr).await
}
