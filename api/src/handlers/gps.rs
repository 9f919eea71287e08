use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};
use tracing::{info, instrument};
use uuid::Uuid;

use docstore::{Collection, Document};

use crate::error::{ApiError, ApiResult};
use crate::handlers::{AppState, ListQuery};
use crate::schema;

#[instrument(skip(state, payload))]
pub async fn create_gps_coordinate(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let Json(raw) = payload.map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
    let gps = schema::validate_gps(&raw).map_err(ApiError::Validation)?;

    let doc = state
        .store
        .insert(Collection::GpsCoordinates, gps.into_document())
        .await?;

    info!(id = %doc.id, "gps coordinate created");
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "GPS coordinate created successfully",
            "id": doc.id,
            "record": doc,
        })),
    ))
}

pub async fn list_gps_coordinates(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<Document>>> {
    let limit = state.clamp_limit(query.limit);
    let docs = state
        .store
        .list(Collection::GpsCoordinates, query.user_id.as_deref(), limit)
        .await?;
    Ok(Json(docs))
}

pub async fn get_gps_coordinate(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Document>> {
    let id = Uuid::parse_str(&id)
        .map_err(|_| ApiError::InvalidRequest(format!("invalid record id {id:?}")))?;
    state
        .store
        .get(Collection::GpsCoordinates, id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("gps coordinate {id}")))
}
