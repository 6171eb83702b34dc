use std::io;
use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::StatusCode,
    Json,
};
use futures::TryStreamExt;
use tokio_util::io::StreamReader;
use tubely_core::constants::VIDEO_FORM_FIELD;
use tubely_core::models::VideoRecord;
use tubely_core::AppError;
use tubely_processing::{BodyLimitExceeded, UploadRequest};
use uuid::Uuid;

use crate::auth::AuthenticatedUser;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

fn body_error(err: MultipartError) -> io::Error {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        io::Error::other(BodyLimitExceeded)
    } else {
        io::Error::other(err)
    }
}

/// Ingest the `video` form field and attach the stored video to the record.
#[utoipa::path(
    post,
    path = "/api/video_upload/{video_id}",
    tag = "videos",
    params(
        ("video_id" = String, Path, description = "Video record ID")
    ),
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Video uploaded successfully", body = VideoRecord),
        (status = 400, description = "Invalid input or unsupported video", body = ErrorResponse),
        (status = 401, description = "Missing token or not the record owner", body = ErrorResponse),
        (status = 404, description = "Video record not found", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, multipart), fields(user_id = %user.user_id))]
pub async fn upload_video(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(video_id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<VideoRecord>, HttpAppError> {
    let video_id = Uuid::parse_str(&video_id)
        .map_err(|_| AppError::InvalidInput("Invalid ID".to_string()))?;

    loop {
        let field = multipart
            .next_field()
            .await
            .map_err(|e| match e.status() {
                StatusCode::PAYLOAD_TOO_LARGE => AppError::PayloadTooLarge(e.body_text()),
                _ => AppError::InvalidInput(format!("Unable to parse form: {}", e.body_text())),
            })?
            .ok_or_else(|| {
                AppError::InvalidInput(format!("Missing '{}' form field", VIDEO_FORM_FIELD))
            })?;

        if field.name() != Some(VIDEO_FORM_FIELD) {
            continue;
        }

        let content_type = field.content_type().unwrap_or_default().to_string();
        let body = StreamReader::new(Box::pin(field.map_err(body_error)));

        let video = state
            .pipeline
            .ingest(UploadRequest {
                video_id,
                principal: user.user_id,
                content_type,
                body: Box::new(body),
            })
            .await?;

        return Ok(Json(video));
    }
}

