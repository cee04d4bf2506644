use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::{
        dto::{MagicLinkRequest, MeResponse, MessageResponse},
        jwt::Viewer,
        services::request_login,
    },
    error::AppError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new().route("/auth/magic-link", post(magic_link))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

#[instrument(skip(state, payload))]
pub async fn magic_link(
    State(state): State<AppState>,
    Json(payload): Json<MagicLinkRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    request_login(&state, &payload.email).await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(MessageResponse {
            message: "Check your email for the magic link!".into(),
        }),
    ))
}

pub async fn get_me(viewer: Viewer) -> Json<MeResponse> {
    Json(match viewer {
        Viewer::Authenticated { user_id, email } => MeResponse {
            authenticated: true,
            user_id: Some(user_id),
            email: Some(email),
        },
        Viewer::Anonymous => MeResponse {
            authenticated: false,
            user_id: None,
            email: None,
        },
    })
}
