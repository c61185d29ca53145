//! # API REST
//!
//! REST API for the consultation form engine.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS)
//!
//! Validation itself lives in `consult-core`; handlers only parse, delegate and shape responses.

#![warn(rust_2018_idioms)]

use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

use consult_core::{parse_draft_document, ConsultationValidator, FormField, ValidationResult};

/// Application state for the REST API server
///
/// Holds the validator built from configuration resolved at startup.
#[derive(Clone)]
pub struct AppState {
    validator: Arc<ConsultationValidator>,
}

impl AppState {
    pub fn new(validator: ConsultationValidator) -> Self {
        Self {
            validator: Arc::new(validator),
        }
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

/// Request body for `POST /consultations/validate`.
///
/// Documentation only: the handler parses the raw body itself so schema errors can name the
/// offending path.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ValidateConsultationReq {
    /// Consultation draft snapshot.
    #[schema(value_type = Object)]
    pub draft: serde_json::Value,
    /// Prescription, PRN, investigation and procedure lists.
    #[schema(value_type = Object)]
    pub plan: serde_json::Value,
}

/// Response body for `POST /consultations/validate`.
///
/// Documentation only: the handler returns the core `ValidationResult`, whose `errors` object
/// lists fields in evaluation order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ValidateConsultationRes {
    pub valid: bool,
    /// Field the UI should scroll to and focus.
    pub first_error_field: Option<String>,
    /// Violated fields mapped to their message.
    pub errors: BTreeMap<String, String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FieldsRes {
    /// Field names in evaluation order.
    pub fields: Vec<String>,
}

#[derive(OpenApi)]
#[openapi(
    paths(health, validate_consultation, list_fields),
    components(schemas(
        HealthRes,
        ValidateConsultationReq,
        ValidateConsultationRes,
        FieldsRes,
    ))
)]
pub struct ApiDoc;

// ============================================================================
// Router
// ============================================================================

/// Build the REST router with Swagger UI and permissive CORS.
///
/// # Arguments
/// * `state` - Shared handler state
///
/// # Returns
/// A `Router` ready to be served by `axum::serve`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/consultations/validate", post(validate_consultation))
        .route("/consultations/fields", get(list_fields))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
///
/// # Returns
/// * `Json<HealthRes>` - Health status response containing service status
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthRes {
        ok: true,
        message: "Consultation REST API is alive".into(),
    })
}

#[utoipa::path(
    post,
    path = "/consultations/validate",
    request_body = ValidateConsultationReq,
    responses(
        (status = 200, description = "Validation result, valid or not", body = ValidateConsultationRes),
        (status = 400, description = "Body is not a consultation draft document")
    )
)]
/// Validate a consultation draft and its treatment plan
///
/// A draft that breaks rules is still a successful request: the violations are returned as
/// data with `valid: false`.
///
/// # Arguments
/// * `body` - JSON document with `draft` and `plan`
///
/// # Errors
/// Returns `400 Bad Request` if the body is not JSON or does not match the draft schema.
#[axum::debug_handler]
async fn validate_consultation(
    State(state): State<AppState>,
    body: String,
) -> Result<Json<ValidationResult>, (StatusCode, &'static str)> {
    let document = parse_draft_document(&body).map_err(|e| {
        tracing::error!("Validate consultation error: {}", e);
        (StatusCode::BAD_REQUEST, "Invalid consultation draft")
    })?;

    Ok(Json(state.validator.validate(&document.draft, &document.plan)))
}

#[utoipa::path(
    get,
    path = "/consultations/fields",
    responses(
        (status = 200, description = "Form fields in evaluation order", body = FieldsRes)
    )
)]
/// List the form fields in the order the validator reports them
#[axum::debug_handler]
async fn list_fields(State(_state): State<AppState>) -> Json<FieldsRes> {
    Json(FieldsRes {
        fields: FormField::ALL
            .iter()
            .map(|field| field.as_str().to_owned())
            .collect(),
    })
}
