//! Video upload route handler.
//!
//! `POST /api/videos` persists the multipart `video` field under the
//! uploads directory, then hands it to the transcoder for HLS and DASH
//! packaging. The response only comes back once both encodes are done.

use std::path::{Path, PathBuf};
use std::time::Instant;

use axum::extract::multipart::{Field, MultipartError};
use axum::extract::{Multipart, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;

use vp_core::{Codec, Error, JobKind, VideoId};

use crate::context::AppContext;
use crate::error::AppError;
use crate::middleware::request_id::RequestId;

/// Multipart field carrying the video.
const VIDEO_FIELD: &str = "video";

/// Query parameters for an upload.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UploadParams {
    /// One of `av1`, `hevc`, `avc` (default).
    pub codec: Option<String>,
}

/// Response body of a completed upload.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub id: String,
    pub hls_url: String,
    pub dash_url: String,
    pub timings: UploadTimings,
}

/// Timing breakdown, in fractional seconds.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadTimings {
    pub upload_duration: f64,
    pub hls_transcode: f64,
    pub dash_transcode: f64,
    pub total_duration: f64,
}

/// POST /api/videos
///
/// Expects `multipart/form-data` with the file in the `video` field.
#[utoipa::path(
    post,
    path = "/api/videos",
    params(UploadParams),
    responses(
        (status = 200, description = "Video packaged as HLS and DASH", body = UploadResponse),
        (status = 400, description = "Invalid codec or missing file"),
        (status = 413, description = "Video exceeds the upload size limit"),
        (status = 500, description = "Saving or transcoding failed")
    )
)]
pub async fn upload_video(
    State(ctx): State<AppContext>,
    Extension(request_id): Extension<RequestId>,
    Query(params): Query<UploadParams>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let with_id = |e: Error| AppError::new(e).with_request_id(request_id.0.clone());
    let started = Instant::now();

    // Reject bad codecs before reading the body.
    let codec: Codec = match params.codec.as_deref() {
        Some(c) => c.parse().map_err(with_id)?,
        None => Codec::default(),
    };

    let id = VideoId::new();
    let upload_started = Instant::now();
    let saved = save_upload(multipart, &ctx.config.storage.uploads_dir(), id)
        .await
        .map_err(with_id)?;
    let upload_duration = upload_started.elapsed().as_secs_f64();

    tracing::info!(
        video_id = %id,
        codec = %codec,
        path = %saved.display(),
        upload_secs = upload_duration,
        "Upload stored"
    );

    let result = ctx
        .transcoder
        .transcode(&saved, id, codec)
        .await
        .map_err(with_id)?;

    let url = |kind| result.url(kind).unwrap_or_default().to_string();
    let secs = |kind| result.elapsed_secs(kind).unwrap_or_default();

    Ok(Json(UploadResponse {
        id: id.to_string(),
        hls_url: url(JobKind::Hls),
        dash_url: url(JobKind::Dash),
        timings: UploadTimings {
            upload_duration,
            hls_transcode: secs(JobKind::Hls),
            dash_transcode: secs(JobKind::Dash),
            total_duration: started.elapsed().as_secs_f64(),
        },
    }))
}

/// Stream the `video` file field to `<uploads>/<id><ext>` and return that
/// path. On any failure nothing is left in `uploads`.
async fn save_upload(mut multipart: Multipart, uploads: &Path, id: VideoId) -> vp_core::Result<PathBuf> {
    while let Some(field) = multipart.next_field().await.map_err(no_video)? {
        if field.name() != Some(VIDEO_FIELD) {
            continue;
        }
        // Plain form values named `video` are not uploads.
        let Some(file_name) = field.file_name() else {
            continue;
        };

        let path = uploads.join(format!("{id}{}", extension_of(file_name)));
        if let Err(e) = write_field(field, &path).await {
            discard(&path).await;
            return Err(e);
        }
        return Ok(path);
    }

    Err(Error::Validation("No video file uploaded".into()))
}

async fn write_field(mut field: Field<'_>, path: &Path) -> vp_core::Result<()> {
    let persist = |e: std::io::Error| Error::Persistence(format!("{}: {e}", path.display()));

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(persist)?;
    }
    let mut file = tokio::fs::File::create(path).await.map_err(persist)?;

    while let Some(chunk) = field.chunk().await.map_err(interrupted)? {
        file.write_all(&chunk).await.map_err(persist)?;
    }
    file.flush().await.map_err(persist)?;

    Ok(())
}

/// Remove a partially written upload.
async fn discard(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => tracing::debug!("Removed partial upload {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!("Failed to remove partial upload {}: {e}", path.display()),
    }
}

/// Body error before the video field was found.
fn no_video(e: MultipartError) -> Error {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return Error::TooLarge(e.body_text());
    }
    tracing::debug!("Multipart error: {e}");
    Error::Validation("No video file uploaded".into())
}

/// Body error while the video was being written.
fn interrupted(e: MultipartError) -> Error {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return Error::TooLarge(e.body_text());
    }
    Error::Persistence(format!("upload interrupted: {}", e.body_text()))
}

/// `.ext` of a client-supplied file name, or empty when it has none or it
/// contains anything but ASCII alphanumerics.
fn extension_of(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.len() <= 8 && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| format!(".{e}"))
        .unwrap_or_default()
}
