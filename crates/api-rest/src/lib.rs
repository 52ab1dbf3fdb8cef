//! # API REST
//!
//! REST API implementation for MedBot.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS)
//!
//! Uses `api-shared` for request and response bodies and `medbot-core` for every decision.
//! Core calls block on SQLite, so handlers run them on the blocking thread pool.

#![warn(rust_2018_idioms)]

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use api_shared::{
    ChatReq, ChatRes, ConditionRes, FeedbackReq, FeedbackRes, HealthRes, HealthService, RemedyRes,
};
use medbot_core::{ChatService, TriageError, TriageResult};
use medbot_types::{MessageText, UserId};

type ApiError = (StatusCode, &'static str);

/// Application state shared across REST API handlers.
#[derive(Clone)]
pub struct AppState {
    pub chat_service: Arc<ChatService>,
}

impl AppState {
    pub fn new(chat_service: Arc<ChatService>) -> Self {
        Self { chat_service }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(health, chat, feedback, list_conditions, list_remedies),
    components(schemas(
        HealthRes,
        ChatReq,
        ChatRes,
        FeedbackReq,
        FeedbackRes,
        ConditionRes,
        RemedyRes
    ))
)]
pub struct ApiDoc;

/// Builds the MedBot router with Swagger UI and permissive CORS.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/chat", post(chat))
        .route("/feedback", post(feedback))
        .route("/conditions", get(list_conditions))
        .route("/remedies/:condition_id", get(list_remedies))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn error_response(context: &str, err: TriageError) -> ApiError {
    tracing::error!("{context} error: {:?}", err);
    match err {
        TriageError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "Invalid input"),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "Internal error"),
    }
}

async fn run_blocking<T, F>(context: &'static str, f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce() -> TriageResult<T> + Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(result) => result.map_err(|e| error_response(context, e)),
        Err(e) => {
            tracing::error!("{context} task failed: {:?}", e);
            Err((StatusCode::INTERNAL_SERVER_ERROR, "Internal error"))
        }
    }
}

fn message_text(raw: String) -> Result<MessageText, ApiError> {
    MessageText::new(raw).map_err(|_| (StatusCode::BAD_REQUEST, "message must not be empty"))
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Liveness check.
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    post,
    path = "/chat",
    request_body = ChatReq,
    responses(
        (status = 200, description = "Bot reply for this turn", body = ChatRes),
        (status = 400, description = "Empty message"),
        (status = 500, description = "Internal server error")
    )
)]
/// Runs one conversation turn.
///
/// # Errors
/// Returns `400 Bad Request` if the message is blank and `500 Internal Server Error` if the
/// session or conversation log cannot be read or written.
#[axum::debug_handler]
async fn chat(
    State(state): State<AppState>,
    Json(req): Json<ChatReq>,
) -> Result<Json<ChatRes>, ApiError> {
    let message = message_text(req.message)?;
    let user_id = UserId::or_default(req.user_id.as_deref(), UserId::ANONYMOUS);

    let service = state.chat_service.clone();
    let reply = run_blocking("Chat", move || service.chat(&user_id, &message)).await?;
    Ok(Json(ChatRes {
        response: reply.response,
        disclaimer: reply.disclaimer,
    }))
}

#[utoipa::path(
    post,
    path = "/feedback",
    request_body = FeedbackReq,
    responses(
        (status = 200, description = "Feedback recorded", body = FeedbackRes),
        (status = 400, description = "Empty message"),
        (status = 500, description = "Internal server error")
    )
)]
#[axum::debug_handler]
async fn feedback(
    State(state): State<AppState>,
    Json(req): Json<FeedbackReq>,
) -> Result<Json<FeedbackRes>, ApiError> {
    let message = message_text(req.message)?;
    let user_id = UserId::or_default(req.user_id.as_deref(), UserId::FEEDBACK);

    let service = state.chat_service.clone();
    run_blocking("Feedback", move || service.record_feedback(&user_id, &message)).await?;
    Ok(Json(FeedbackRes::success()))
}

#[utoipa::path(
    get,
    path = "/conditions",
    responses(
        (status = 200, description = "All known conditions", body = [ConditionRes]),
        (status = 500, description = "Internal server error")
    )
)]
#[axum::debug_handler]
async fn list_conditions(
    State(state): State<AppState>,
) -> Result<Json<Vec<ConditionRes>>, ApiError> {
    let service = state.chat_service.clone();
    let conditions = run_blocking("List conditions", move || service.list_conditions()).await?;
    Ok(Json(
        conditions
            .into_iter()
            .map(|c| ConditionRes {
                id: c.id,
                name: c.name,
                description: c.description,
                severity_level: c.severity_level.to_string(),
            })
            .collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/remedies/{condition_id}",
    params(
        ("condition_id" = i64, Path, description = "Condition identifier")
    ),
    responses(
        (status = 200, description = "Remedies for the condition; empty if unknown", body = [RemedyRes]),
        (status = 500, description = "Internal server error")
    )
)]
#[axum::debug_handler]
async fn list_remedies(
    State(state): State<AppState>,
    Path(condition_id): Path<i64>,
) -> Result<Json<Vec<RemedyRes>>, ApiError> {
    let service = state.chat_service.clone();
    let remedies =
        run_blocking("List remedies", move || service.remedies_for(condition_id)).await?;
    Ok(Json(
        remedies
            .into_iter()
            .map(|r| RemedyRes {
                id: r.id,
                remedy_text: r.remedy_text,
                safety_notes: r.safety_notes,
            })
            .collect(),
    ))
}
