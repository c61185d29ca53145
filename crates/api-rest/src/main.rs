//! Standalone REST API server binary.
//!
//! ## Purpose
//! Runs the consultation REST API on its own.
//!
//! ## Intended use
//! Useful for development and debugging when you only want the REST server (with
//! OpenAPI/Swagger UI). The workspace's main `consult-run` binary serves the same router.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{router, AppState};
use consult_core::{
    config::{kasp_enabled_from_env_value, kasp_string_from_env_value},
    ConsultationValidator, ValidatorConfig,
};

/// Main entry point for the consultation REST API server
///
/// # Environment Variables
/// - `CONSULT_REST_ADDR`: Server address (default: "0.0.0.0:3000")
/// - `CONSULT_KASP_ENABLED`: Require the insurance-scheme field (default: false)
/// - `CONSULT_KASP_STRING`: Display label of the insurance scheme (default: "KASP")
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the validator configuration is invalid,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("CONSULT_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let config = ValidatorConfig::new(
        kasp_enabled_from_env_value(std::env::var("CONSULT_KASP_ENABLED").ok())?,
        kasp_string_from_env_value(std::env::var("CONSULT_KASP_STRING").ok()),
    )?;

    tracing::info!("-- Starting consultation REST API on {}", addr);

    let app = router(AppState::new(ConsultationValidator::new(config)));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
