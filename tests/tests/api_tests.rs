use lifelog_tests::start_test_server;
use serde_json::{json, Value};

#[tokio::test]
async fn sentiment_intensity_boundaries() {
    let server = start_test_server().await;
    let client = reqwest::Client::new();

    for intensity in [0.0, 0.5, 1.0] {
        let resp = client
            .post(format!("{}/api/sentiments", server.base_url))
            .json(&json!({"user_id": "u1", "emotion": "happy", "intensity": intensity}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 201, "intensity {intensity} should be accepted");
    }

    for intensity in [-0.01, 1.01] {
        let resp = client
            .post(format!("{}/api/sentiments", server.base_url))
            .json(&json!({"user_id": "u1", "emotion": "happy", "intensity": intensity}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 400, "intensity {intensity} should be rejected");
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["error"], "ValidationError");
        let fields: Vec<&str> = body["fields"]
            .as_array()
            .unwrap()
            .iter()
            .map(|f| f["field"].as_str().unwrap())
            .collect();
        assert_eq!(fields, vec!["intensity"]);
    }
}

#[tokio::test]
async fn gps_coordinate_bounds() {
    let server = start_test_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/api/gps", server.base_url))
        .json(&json!({"user_id": "u1", "latitude": -90.0, "longitude": 180.0}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);

    for (latitude, longitude) in [(91.0, 0.0), (-90.5, 0.0), (0.0, 180.5), (0.0, -181.0)] {
        let resp = client
            .post(format!("{}/api/gps", server.base_url))
            .json(&json!({"user_id": "u1", "latitude": latitude, "longitude": longitude}))
            .send()
            .await
            .unwrap();
        assert_eq!(
            resp.status(),
            400,
            "({latitude}, {longitude}) should be rejected"
        );
    }
}

#[tokio::test]
async fn every_violated_field_reported() {
    let server = start_test_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/api/sentiments", server.base_url))
        .json(&json!({"emotion": 3, "intensity": 9.0}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    let fields: Vec<&str> = body["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["user_id", "emotion", "intensity"]);
}

#[tokio::test]
async fn vlog_round_trip_preserves_fields() {
    let server = start_test_server().await;
    let client = reqwest::Client::new();

    let submitted = json!({
        "user_id": "user123",
        "video_url": "https://example.com/video.mp4",
        "title": "My Day",
        "description": "A great day!",
        "duration": 120.5,
    });
    let resp = client
        .post(format!("{}/api/vlogs", server.base_url))
        .json(&submitted)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);
    let created: Value = resp.json().await.unwrap();
    let id = created["id"].as_str().unwrap();

    let fetched: Value = client
        .get(format!("{}/api/vlogs/{id}", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    for key in ["user_id", "video_url", "title", "description", "duration"] {
        assert_eq!(fetched[key], submitted[key], "field {key}");
    }
    assert_eq!(fetched["id"].as_str().unwrap(), id);
    assert!(fetched["created_at"].is_string());
}

#[tokio::test]
async fn get_unknown_and_malformed_ids() {
    let server = start_test_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!(
            "{}/api/sentiments/{}",
            server.base_url,
            uuid::Uuid::new_v4()
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    let resp = client
        .get(format!("{}/api/sentiments/not-a-uuid", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn malformed_json_body_rejected() {
    let server = start_test_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/api/gps", server.base_url))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "InvalidRequest");
}

#[tokio::test]
async fn list_filters_by_user_and_respects_limit() {
    let server = start_test_server().await;
    let client = reqwest::Client::new();

    for user in ["u1", "u1", "u1", "u2"] {
        let resp = client
            .post(format!("{}/api/gps", server.base_url))
            .json(&json!({"user_id": user, "latitude": 25.0, "longitude": 121.5}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 201);
    }

    let all: Vec<Value> = client
        .get(format!("{}/api/gps", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(all.len(), 4);

    let mine: Vec<Value> = client
        .get(format!("{}/api/gps?user_id=u1", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(mine.len(), 3);
    assert!(mine.iter().all(|d| d["user_id"] == "u1"));

    let capped: Vec<Value> = client
        .get(format!("{}/api/gps?limit=2", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(capped.len(), 2);

    // Requests above the hard cap are clamped, not honored.
    let resp = client
        .get(format!("{}/api/gps?limit=999999", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn unknown_route_returns_json_404() {
    let server = start_test_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("{}/api/nope", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}
