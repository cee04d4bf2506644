use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{header, StatusCode},
    routing::{get, post},
    Json, Router,
};
use tracing::{instrument, warn};

use super::dto::{feed_path, FeedLinks, FeedView, SubmissionResponse};
use super::feed::render_feed;
use super::photos::PhotoFile;
use super::repo_types::ItemStatus;
use super::services::{PostForm, POSTED_MESSAGE};
use crate::{auth::jwt::Viewer, error::AppError, state::AppState};

pub fn read_routes() -> Router<AppState> {
    Router::new().route("/items/:status", get(get_feed))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/items", post(create_item))
        .layer(DefaultBodyLimit::max(20 * 1024 * 1024)) // 20MB
}

#[instrument(skip(state))]
pub async fn get_feed(
    State(state): State<AppState>,
    Path(status): Path<String>,
) -> Result<(StatusCode, Json<FeedView>), AppError> {
    let status: ItemStatus = status.parse()?;
    let view = render_feed(state.store.as_ref(), status, state.config.verbose_diagnostics).await;
    let code = match view {
        FeedView::Error { .. } => StatusCode::BAD_GATEWAY,
        _ => StatusCode::OK,
    };
    Ok((code, Json(view)))
}

/// Fields of the multipart posting form.
#[derive(Default)]
struct FormFields {
    title: Option<String>,
    description: Option<String>,
    status: Option<String>,
    photo: Option<PhotoFile>,
    photo_url: Option<String>,
}

async fn read_form(mut mp: Multipart) -> Result<FormFields, AppError> {
    let bad = |e: axum::extract::multipart::MultipartError| AppError::Validation(e.to_string());
    let mut fields = FormFields::default();

    while let Some(field) = mp.next_field().await.map_err(bad)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "photo" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field
                    .content_type()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "application/octet-stream".into());
                let body = field.bytes().await.map_err(bad)?;
                // browsers send an empty part when no file is chosen
                if !body.is_empty() || !file_name.is_empty() {
                    fields.photo = Some(PhotoFile {
                        file_name,
                        content_type,
                        body,
                    });
                }
            }
            "title" => fields.title = Some(field.text().await.map_err(bad)?),
            "description" => fields.description = Some(field.text().await.map_err(bad)?),
            "status" => fields.status = Some(field.text().await.map_err(bad)?),
            "photo_url" => fields.photo_url = Some(field.text().await.map_err(bad)?),
            other => warn!(field = other, "ignoring unknown form field"),
        }
    }
    Ok(fields)
}

/// POST /items (multipart): title, description, status, and either photo or photo_url.
#[instrument(skip(state, mp))]
pub async fn create_item(
    State(state): State<AppState>,
    viewer: Viewer,
    mp: Multipart,
) -> Result<(StatusCode, [(header::HeaderName, String); 1], Json<SubmissionResponse>), AppError>
{
    let posted_by = viewer
        .poster_email(state.config.test_poster_email.as_deref())
        .ok_or_else(|| {
            AppError::Unauthorized(format!(
                "Log in with your @{} email to post",
                state.config.identity.allowed_domain
            ))
        })?;

    let fields = read_form(mp).await?;
    let status: ItemStatus = fields
        .status
        .ok_or_else(|| AppError::Validation("status is required".into()))?
        .trim()
        .parse()?;

    let mut form = PostForm::new(posted_by);
    form.set_title(fields.title.unwrap_or_default());
    form.set_description(fields.description.unwrap_or_default());
    form.set_status(status);
    let typed_url = fields.photo_url.filter(|u| !u.trim().is_empty());
    match (fields.photo, typed_url) {
        (Some(_), Some(_)) => {
            return Err(AppError::Validation(
                "choose either a photo file or a photo URL, not both".into(),
            ))
        }
        (Some(file), None) => form.select_file(file),
        (None, Some(url)) => form.type_photo_url(url),
        (None, None) => {}
    }

    let item = form
        .submit(state.store.as_ref(), state.storage.as_ref())
        .await?;

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, feed_path(item.status))],
        Json(SubmissionResponse {
            message: form.message().unwrap_or(POSTED_MESSAGE).to_string(),
            item,
            links: FeedLinks::default(),
            form: form.snapshot(),
        }),
    ))
}
