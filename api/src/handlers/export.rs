use axum::extract::State;
use axum::response::Html;
use axum::Json;
use chrono::Utc;
use serde_json::{json, Value};
use tracing::instrument;

use docstore::Collection;

use crate::error::ApiResult;
use crate::handlers::AppState;

/// Dump all three collections plus per-kind totals as one JSON document.
/// The dump reads are bounded by the hard list cap; totals come from
/// `count` so they stay truthful even when a dump is truncated.
#[instrument(skip(state))]
pub async fn export_all(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let limit = state.config.list_limit_max;

    let vlogs = state.store.list(Collection::Vlogs, None, limit).await?;
    let sentiments = state.store.list(Collection::Sentiments, None, limit).await?;
    let gps = state
        .store
        .list(Collection::GpsCoordinates, None, limit)
        .await?;

    Ok(Json(json!({
        "export_date": Utc::now().to_rfc3339(),
        "total_vlogs": state.store.count(Collection::Vlogs).await?,
        "total_sentiments": state.store.count(Collection::Sentiments).await?,
        "total_gps_coordinates": state.store.count(Collection::GpsCoordinates).await?,
        "data": {
            "vlogs": vlogs,
            "sentiments": sentiments,
            "gps_coordinates": gps,
        },
    })))
}

/// Human-facing export page: per-kind counts with links to the JSON
/// endpoints. Presentation only; all data comes from the same store
/// calls the JSON export uses.
pub async fn export_page(State(state): State<AppState>) -> ApiResult<Html<String>> {
    let vlogs = state.store.count(Collection::Vlogs).await?;
    let sentiments = state.store.count(Collection::Sentiments).await?;
    let gps = state.store.count(Collection::GpsCoordinates).await?;

    let sections = [
        ("Vlogs", vlogs, "/api/vlogs"),
        ("Sentiments", sentiments, "/api/sentiments"),
        ("GPS Coordinates", gps, "/api/gps"),
    ]
    .map(|(label, count, href)| {
        format!(
            r#"    <div class="section">
      <h2>{label}</h2>
      <p class="count">Total: {count} entries</p>
      <a href="{href}">View JSON</a>
    </div>"#
        )
    })
    .join("\n");

    Ok(Html(format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <title>Lifelog Data Export</title>
  <style>
    body {{ font-family: Arial, sans-serif; max-width: 800px; margin: 50px auto; padding: 20px; }}
    .section {{ background: #f4f4f4; padding: 10px 20px; margin: 10px 0; border-radius: 5px; }}
    .count {{ font-weight: bold; }}
    a {{ color: #007bff; text-decoration: none; }}
  </style>
</head>
<body>
  <h1>Lifelog Data Export</h1>
  <p>View and download all collected data.</p>
{sections}
  <p><a href="/api/export/all">Download all data (JSON)</a></p>
  <p><a href="/">Back to home</a></p>
</body>
</html>
"#
    )))
}

/// Landing page listing the available endpoints.
pub async fn index() -> Html<&'static str> {
    Html(
        r#"<!DOCTYPE html>
<html>
<head>
  <title>Lifelog Backend API</title>
  <style>
    body { font-family: Arial, sans-serif; max-width: 800px; margin: 50px auto; padding: 20px; }
    .endpoint { background: #f4f4f4; padding: 10px; margin: 10px 0; border-radius: 5px; }
    .method { font-weight: bold; color: #007bff; }
  </style>
</head>
<body>
  <h1>Lifelog Backend API</h1>
  <p>Collects and manages vlogs, sentiments, and GPS coordinates.</p>
  <h2>Endpoints</h2>
  <div class="endpoint"><span class="method">POST</span> /api/vlogs &mdash; create a vlog (JSON, external video URL)</div>
  <div class="endpoint"><span class="method">POST</span> /api/vlogs/upload &mdash; create a vlog with a video file (multipart)</div>
  <div class="endpoint"><span class="method">GET</span> /api/vlogs/download/{identifier} &mdash; download a stored video</div>
  <div class="endpoint"><span class="method">POST</span> /api/sentiments &mdash; record sentiment data</div>
  <div class="endpoint"><span class="method">POST</span> /api/gps &mdash; record GPS coordinates</div>
  <div class="endpoint"><span class="method">GET</span> /api/vlogs | /api/sentiments | /api/gps &mdash; list records</div>
  <div class="endpoint"><span class="method">GET</span> <a href="/api/export/all">/api/export/all</a> &mdash; bulk JSON export</div>
  <div class="endpoint"><span class="method">GET</span> <a href="/export">/export</a> &mdash; data export page</div>
  <div class="endpoint"><span class="method">GET</span> <a href="/health">/health</a> &mdash; health check</div>
</body>
</html>
"#,
    )
}
