use lifelog_tests::start_test_server;
use reqwest::multipart::{Form, Part};
use serde_json::Value;

fn video_form(user_id: &str, filename: &str, bytes: &[u8]) -> Form {
    Form::new()
        .text("user_id", user_id.to_string())
        .text("title", "Uploaded clip")
        .part(
            "video",
            Part::bytes(bytes.to_vec()).file_name(filename.to_string()),
        )
}

#[tokio::test]
async fn upload_then_download_round_trips() {
    let server = start_test_server().await;
    let client = reqwest::Client::new();

    let payload = b"\x00\x00\x00\x18ftypmp42 fake video bytes".to_vec();
    let resp = client
        .post(format!("{}/api/vlogs/upload", server.base_url))
        .multipart(video_form("u1", "clip.mp4", &payload))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["file_size"], payload.len() as u64);
    let download_url = body["download_url"].as_str().unwrap();
    assert!(download_url.starts_with("/api/vlogs/download/"));

    let download = client
        .get(format!("{}{download_url}", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(download.status(), 200);
    assert_eq!(
        download.headers()["content-type"].to_str().unwrap(),
        "video/mp4"
    );
    assert!(download.headers()["content-disposition"]
        .to_str()
        .unwrap()
        .starts_with("attachment"));
    assert_eq!(download.bytes().await.unwrap().as_ref(), &payload[..]);

    // The stored record carries the file reference and metadata.
    let id = body["id"].as_str().unwrap();
    let record: Value = client
        .get(format!("{}/api/vlogs/{id}", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(record["original_filename"], "clip.mp4");
    assert_eq!(record["download_url"], download_url);
    assert!(record["file_identifier"].as_str().unwrap().ends_with(".mp4"));
}

#[tokio::test]
async fn identical_filenames_get_distinct_identifiers() {
    let server = start_test_server().await;
    let client = reqwest::Client::new();

    let mut urls = Vec::new();
    for content in [b"first".to_vec(), b"second".to_vec()] {
        let resp = client
            .post(format!("{}/api/vlogs/upload", server.base_url))
            .multipart(video_form("u1", "same-name.mov", &content))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 201);
        let body: Value = resp.json().await.unwrap();
        urls.push(body["download_url"].as_str().unwrap().to_string());
    }
    assert_ne!(urls[0], urls[1]);

    let first = client
        .get(format!("{}{}", server.base_url, urls[0]))
        .send()
        .await
        .unwrap();
    assert_eq!(first.bytes().await.unwrap().as_ref(), b"first");
    let second = client
        .get(format!("{}{}", server.base_url, urls[1]))
        .send()
        .await
        .unwrap();
    assert_eq!(second.bytes().await.unwrap().as_ref(), b"second");
}

#[tokio::test]
async fn disallowed_extension_rejected_regardless_of_content() {
    let server = start_test_server().await;
    let client = reqwest::Client::new();

    for filename in ["notes.txt", "script.sh", "movie.mp4.exe", "noextension"] {
        let resp = client
            .post(format!("{}/api/vlogs/upload", server.base_url))
            .multipart(video_form("u1", filename, b"\x00\x00\x00\x18ftypmp42"))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 415, "{filename} should be rejected");
    }

    // Nothing may be left on disk after rejections.
    let leftover = std::fs::read_dir(server.videos_dir()).unwrap().count();
    assert_eq!(leftover, 0);
}

#[tokio::test]
async fn missing_video_part_is_a_validation_error() {
    let server = start_test_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/api/vlogs/upload", server.base_url))
        .multipart(Form::new().text("user_id", "u1"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["fields"][0]["field"], "video");
}

#[tokio::test]
async fn missing_user_id_rejects_upload_and_removes_file() {
    let server = start_test_server().await;
    let client = reqwest::Client::new();

    let form = Form::new().part(
        "video",
        Part::bytes(b"orphan bytes".to_vec()).file_name("clip.webm"),
    );
    let resp = client
        .post(format!("{}/api/vlogs/upload", server.base_url))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["fields"][0]["field"], "user_id");

    let leftover = std::fs::read_dir(server.videos_dir()).unwrap().count();
    assert_eq!(leftover, 0, "rejected upload must not leave a file behind");
}

#[tokio::test]
async fn download_never_escapes_the_storage_root() {
    let server = start_test_server().await;
    let client = reqwest::Client::new();

    for identifier in [
        "..%2F..%2Fetc%2Fpasswd",
        "..%5C..%5Cwindows",
        "not-a-uuid.mp4",
        "cafebabe.mp4",
    ] {
        let resp = client
            .get(format!(
                "{}/api/vlogs/download/{identifier}",
                server.base_url
            ))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 404, "{identifier} must yield NotFound");
    }

    // Well-formed but unknown identifiers are also NotFound.
    let ghost = format!("{}.mp4", uuid::Uuid::new_v4());
    let resp = client
        .get(format!("{}/api/vlogs/download/{ghost}", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}
