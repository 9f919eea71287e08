use axum::body::Body;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::Response;
use axum::Json;
use serde_json::{json, Value};
use tokio_util::io::ReaderStream;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use docstore::{Collection, Document, NewDocument};
use filestore::StoredVideoFile;

use crate::error::{ApiError, ApiResult};
use crate::handlers::{AppState, ListQuery};
use crate::schema::{self, ValidationErrors};

const DOWNLOAD_CHUNK_SIZE: usize = 64 * 1024;

/// Create a vlog that references an externally hosted video.
#[instrument(skip(state, payload))]
pub async fn create_vlog(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let Json(raw) = payload.map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
    let vlog = schema::validate_vlog(&raw).map_err(ApiError::Validation)?;

    let doc = state
        .store
        .insert(Collection::Vlogs, vlog.into_document())
        .await?;

    info!(id = %doc.id, "vlog created");
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Vlog created successfully",
            "id": doc.id,
            "record": doc,
        })),
    ))
}

/// Create a vlog from a multipart form carrying the video file itself.
///
/// The file is accepted (streamed to the file store) as soon as its part
/// arrives; metadata validation follows. A validation failure after
/// acceptance deletes the file immediately. A store failure after
/// acceptance leaves the file for the orphan sweep.
#[instrument(skip(state, multipart))]
pub async fn upload_vlog(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let mut user_id: Option<String> = None;
    let mut title: Option<String> = None;
    let mut description: Option<String> = None;
    let mut original_filename: Option<String> = None;
    let mut stored: Option<StoredVideoFile> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "user_id" => user_id = Some(field.text().await?),
            "title" => title = Some(field.text().await?),
            "description" => description = Some(field.text().await?),
            "video" => {
                let filename = field
                    .file_name()
                    .map(str::to_string)
                    .ok_or_else(|| {
                        ApiError::InvalidRequest("video part has no filename".to_string())
                    })?;
                let stream = futures::stream::try_unfold(field, |mut field| async move {
                    match field.chunk().await {
                        Ok(Some(chunk)) => Ok(Some((chunk, field))),
                        Ok(None) => Ok(None),
                        Err(e) => Err(std::io::Error::new(std::io::ErrorKind::Other, e)),
                    }
                });
                stored = Some(state.files.accept(stream, &filename).await?);
                original_filename = Some(filename);
            }
            other => {
                warn!(part = %other, "ignoring unknown multipart field");
            }
        }
    }

    let stored = stored.ok_or_else(|| {
        ApiError::Validation(ValidationErrors::single("video", "file part is required"))
    })?;

    let raw = json!({"user_id": user_id, "title": title, "description": description});
    let meta = match schema::validate_vlog_upload(&raw) {
        Ok(meta) => meta,
        Err(errors) => {
            // The file was accepted but the request is rejected; do not
            // leave it behind.
            if let Err(e) = state.files.remove(&stored.identifier).await {
                warn!(identifier = %stored.identifier, error = %e, "failed to remove rejected upload");
            }
            return Err(ApiError::Validation(errors));
        }
    };

    let video_url = format!("/uploads/videos/{}", stored.identifier);
    let download_url = format!("/api/vlogs/download/{}", stored.identifier);
    let doc = NewDocument {
        user_id: meta.user_id,
        fields: json!({
            "video_url": video_url,
            "download_url": download_url,
            "file_identifier": stored.identifier,
            "original_filename": original_filename,
            "file_size": stored.size,
            "title": meta.title,
            "description": meta.description,
        }),
    };

    let doc = match state.store.insert(Collection::Vlogs, doc).await {
        Ok(doc) => doc,
        Err(e) => {
            warn!(
                identifier = %stored.identifier,
                error = %e,
                "file accepted but metadata insert failed; orphan left for sweep"
            );
            return Err(e.into());
        }
    };

    info!(id = %doc.id, identifier = %stored.identifier, size = stored.size, "vlog uploaded");
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Vlog uploaded successfully",
            "id": doc.id,
            "video_url": video_url,
            "download_url": download_url,
            "file_size": stored.size,
        })),
    ))
}

/// Stream a stored video back as an attachment.
pub async fn download_vlog(
    State(state): State<AppState>,
    Path(identifier): Path<String>,
) -> ApiResult<Response> {
    let download = state.files.open(&identifier).await?;
    let stream = ReaderStream::with_capacity(download.file, DOWNLOAD_CHUNK_SIZE);

    // The identifier passed resolve(), so it is header-safe.
    Response::builder()
        .header(header::CONTENT_TYPE, download.content_type)
        .header(header::CONTENT_LENGTH, download.len)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{identifier}\""),
        )
        .body(Body::from_stream(stream))
        .map_err(|e| ApiError::Internal(e.to_string()))
}

pub async fn list_vlogs(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<Document>>> {
    let limit = state.clamp_limit(query.limit);
    let docs = state
        .store
        .list(Collection::Vlogs, query.user_id.as_deref(), limit)
        .await?;
    Ok(Json(docs))
}

pub async fn get_vlog(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Document>> {
    let id = Uuid::parse_str(&id)
        .map_err(|_| ApiError::InvalidRequest(format!("invalid record id {id:?}")))?;
    state
        .store
        .get(Collection::Vlogs, id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("vlog {id}")))
}
