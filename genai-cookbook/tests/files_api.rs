use std::io::Write;
use std::sync::atomic::Ordering;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use genai_cookbook::types::enums::FileState;
use genai_cookbook::types::files::{ListFilesConfig, UploadFileConfig};
use genai_cookbook::{Error, PollOptions};

mod support;
use support::{build_client, mount_file_states, mount_upload};

fn fast_poll() -> PollOptions {
    PollOptions::new()
        .interval(Duration::from_millis(10))
        .timeout(Duration::from_secs(5))
}

#[tokio::test]
async fn upload_then_wait_until_active() {
    let server = MockServer::start().await;
    mount_upload(
        &server,
        json!({"name": "files/video1", "mimeType": "video/mp4", "state": "PROCESSING"}),
    )
    .await;
    let calls =
        mount_file_states(&server, "files/video1", &["PROCESSING", "PROCESSING", "ACTIVE"]).await;

    let client = build_client(&server.uri());
    let files = client.files();
    let uploaded = files.upload(vec![0u8; 64], "video/mp4").await.unwrap();
    assert_eq!(uploaded.name.as_deref(), Some("files/video1"));
    assert_eq!(uploaded.state, Some(FileState::Processing));

    let ready = files.wait_until_active(&uploaded, fast_poll()).await.unwrap();
    assert_eq!(ready.state, Some(FileState::Active));
    assert!(ready.uri.is_some());
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn wait_for_active_queries_even_when_handle_is_active() {
    let server = MockServer::start().await;
    let calls = mount_file_states(&server, "files/ready", &["ACTIVE"]).await;

    let client = build_client(&server.uri());
    let file = client
        .files()
        .wait_for_active("files/ready", fast_poll())
        .await
        .unwrap();
    assert!(file.is_active());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn wait_for_active_reports_failed_state() {
    let server = MockServer::start().await;
    let calls = mount_file_states(&server, "files/broken", &["PROCESSING", "FAILED"]).await;

    let client = build_client(&server.uri());
    let err = client
        .files()
        .wait_for_active("broken", fast_poll())
        .await
        .unwrap_err();
    match err {
        Error::ResourceProcessingFailed { name, state, .. } => {
            assert_eq!(name, "files/broken");
            assert_eq!(state, "FAILED");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn wait_for_active_stops_at_attempt_budget() {
    let server = MockServer::start().await;
    let calls = mount_file_states(&server, "files/slow", &["PROCESSING"]).await;

    let client = build_client(&server.uri());
    let options = PollOptions::new()
        .interval(Duration::from_millis(5))
        .no_timeout()
        .max_attempts(2);
    let err = client
        .files()
        .wait_for_active("files/slow", options)
        .await
        .unwrap_err();
    match err {
        Error::ResourceProcessingTimedOut {
            name,
            attempts,
            last_state,
            ..
        } => {
            assert_eq!(name, "files/slow");
            assert_eq!(attempts, 2);
            assert_eq!(last_state, "PROCESSING");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn wait_for_active_times_out_within_budget() {
    let server = MockServer::start().await;
    let calls = mount_file_states(&server, "files/stuck", &["PROCESSING"]).await;

    let client = build_client(&server.uri());
    let options = PollOptions::new()
        .interval(Duration::from_millis(20))
        .timeout(Duration::from_millis(50));
    let err = client
        .files()
        .wait_for_active("files/stuck", options)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ResourceProcessingTimedOut { .. }));
    let calls = calls.load(Ordering::SeqCst);
    assert!((1..=3).contains(&calls), "queried {calls} times");
}

#[tokio::test]
async fn wait_for_active_wraps_query_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1beta/files/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .mount(&server)
        .await;

    let client = build_client(&server.uri());
    let err = client
        .files()
        .wait_for_active("files/missing", fast_poll())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::TransientQuery { ref name, .. } if name == "files/missing"));
    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn upload_from_path_guesses_mime_type() {
    let server = MockServer::start().await;
    mount_upload(
        &server,
        json!({"name": "files/poem", "mimeType": "text/plain", "state": "ACTIVE",
               "uri": "https://generativelanguage.googleapis.com/v1beta/files/poem"}),
    )
    .await;

    let mut temp = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
    temp.write_all(b"Roses are red").unwrap();

    let client = build_client(&server.uri());
    let file = client.files().upload_from_path(temp.path()).await.unwrap();
    assert_eq!(file.name.as_deref(), Some("files/poem"));

    let requests = server.received_requests().await.unwrap();
    let start = requests
        .iter()
        .find(|req| req.url.path() == "/upload/v1beta/files")
        .unwrap();
    assert_eq!(
        start.headers.get("x-goog-upload-header-content-type").unwrap(),
        "text/plain"
    );
    assert_eq!(
        start.headers.get("x-goog-upload-header-content-length").unwrap(),
        "13"
    );
    let chunk = requests
        .iter()
        .find(|req| req.url.path() == "/upload-session")
        .unwrap();
    assert_eq!(chunk.body, b"Roses are red");
    assert_eq!(chunk.headers.get("x-goog-upload-offset").unwrap(), "0");
}

#[tokio::test]
async fn upload_from_path_prefers_explicit_mime_type() {
    let server = MockServer::start().await;
    mount_upload(&server, json!({"name": "files/clip", "state": "ACTIVE"})).await;

    let mut temp = tempfile::Builder::new().suffix(".bin").tempfile().unwrap();
    temp.write_all(&[1, 2, 3]).unwrap();

    let client = build_client(&server.uri());
    let config = UploadFileConfig {
        mime_type: Some("audio/mpeg".into()),
        display_name: Some("clip".into()),
        ..Default::default()
    };
    client
        .files()
        .upload_from_path_with_config(temp.path(), config)
        .await
        .unwrap();

    let bodies = support::request_bodies(&server, "POST", "/upload/v1beta/files").await;
    assert_eq!(bodies[0]["file"]["mimeType"], "audio/mpeg");
    assert_eq!(bodies[0]["file"]["displayName"], "clip");
}

#[tokio::test]
async fn upload_from_missing_path_fails_before_any_request() {
    let server = MockServer::start().await;
    let client = build_client(&server.uri());
    let err = client
        .files()
        .upload_from_path("/definitely/not/here.mp4")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Io { .. }));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn list_get_and_delete() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1beta/files"))
        .and(query_param_is_missing("pageToken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "files": [{"name": "files/a"}],
            "nextPageToken": "next"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1beta/files"))
        .and(query_param("pageToken", "next"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "files": [{"name": "files/b"}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1beta/files/a"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "files/a",
            "state": "ACTIVE"
        })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/v1beta/files/a"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let client = build_client(&server.uri());
    let files = client.files();

    let page = files
        .list_with_config(ListFilesConfig {
            page_size: Some(1),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(page.next_page_token.as_deref(), Some("next"));

    let names: Vec<_> = files
        .all()
        .await
        .unwrap()
        .into_iter()
        .filter_map(|file| file.name)
        .collect();
    assert_eq!(names, vec!["files/a", "files/b"]);

    let file = files
        .get("https://generativelanguage.googleapis.com/v1beta/files/a")
        .await
        .unwrap();
    assert!(file.is_active());

    files.delete("a").await.unwrap();
}
