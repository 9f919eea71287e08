use lifelog_tests::start_test_server;
use serde_json::{json, Value};

#[tokio::test]
async fn export_all_reflects_one_record_of_each_kind() {
    let server = start_test_server().await;
    let client = reqwest::Client::new();

    let created = [
        ("vlogs", json!({"user_id": "u1", "video_url": "https://x/v.mp4"})),
        ("sentiments", json!({"user_id": "u1", "emotion": "happy", "intensity": 0.9})),
        ("gps", json!({"user_id": "u1", "latitude": 25.03, "longitude": 121.56})),
    ];
    for (kind, body) in &created {
        let resp = client
            .post(format!("{}/api/{kind}", server.base_url))
            .json(body)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 201, "{kind}");
    }

    let export: Value = client
        .get(format!("{}/api/export/all", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(export["total_vlogs"], 1);
    assert_eq!(export["total_sentiments"], 1);
    assert_eq!(export["total_gps_coordinates"], 1);
    for kind in ["vlogs", "sentiments", "gps_coordinates"] {
        assert_eq!(
            export["data"][kind].as_array().unwrap().len(),
            1,
            "exactly one {kind} record"
        );
    }
    assert!(export["export_date"].is_string());
}

#[tokio::test]
async fn export_page_and_index_render() {
    let server = start_test_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("{}/export", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let html = resp.text().await.unwrap();
    assert!(html.contains("Total: 0 entries"));

    let resp = client.get(&server.base_url).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    assert!(resp.text().await.unwrap().contains("/api/vlogs/upload"));
}

#[tokio::test]
async fn health_reports_store_connectivity() {
    let server = start_test_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("{}/health", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "connected");

    server.store.set_available(false);
    let resp = client
        .get(format!("{}/health", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 503);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "unhealthy");
    assert_eq!(body["database"], "disconnected");
}

#[tokio::test]
async fn store_outage_fails_requests_with_503() {
    let server = start_test_server().await;
    let client = reqwest::Client::new();
    server.store.set_available(false);

    let resp = client
        .post(format!("{}/api/sentiments", server.base_url))
        .json(&json!({"user_id": "u1", "emotion": "calm", "intensity": 0.1}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 503);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "StoreUnavailable");
}
