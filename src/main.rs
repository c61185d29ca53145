use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{router, AppState};
use consult_core::{
    config::{kasp_enabled_from_env_value, kasp_string_from_env_value},
    ConsultationValidator, ValidatorConfig,
};

/// Main entry point for the consultation service
///
/// Resolves the validator configuration once and serves the REST API.
///
/// # Environment Variables
/// - `CONSULT_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `CONSULT_KASP_ENABLED`: Require the insurance-scheme field (default: false)
/// - `CONSULT_KASP_STRING`: Display label of the insurance scheme (default: "KASP")
///
/// # Returns
/// * `Ok(())` - If the server starts and runs successfully
/// * `Err(anyhow::Error)` - If configuration, startup or the server fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("consult_run=info".parse()?)
                .add_directive("consult_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("CONSULT_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let config = ValidatorConfig::new(
        kasp_enabled_from_env_value(std::env::var("CONSULT_KASP_ENABLED").ok())?,
        kasp_string_from_env_value(std::env::var("CONSULT_KASP_STRING").ok()),
    )?;

    tracing::info!(
        kasp_enabled = config.kasp_enabled(),
        kasp_string = config.kasp_string(),
        "++ Starting consultation REST on {}",
        rest_addr
    );

    let rest_app = router(AppState::new(ConsultationValidator::new(config)));

    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, rest_app).await?;

    Ok(())
}
