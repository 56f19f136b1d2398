#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde_json::{json, Value};
use wiremock::matchers::{header, method, path, path_regex};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use genai_cookbook::Client;

pub fn build_client(base_url: &str) -> Client {
    Client::builder()
        .api_key("test-key")
        .base_url(base_url)
        .build()
        .unwrap()
}

/// 模拟两步式断点续传上传：`start` 返回上传地址，随后一次性 finalize。
pub async fn mount_upload(server: &MockServer, file: Value) {
    let upload_url = format!("{}/upload-session", server.uri());
    Mock::given(method("POST"))
        .and(path("/upload/v1beta/files"))
        .and(header("x-goog-upload-command", "start"))
        .respond_with(ResponseTemplate::new(200).insert_header("x-goog-upload-url", upload_url))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/upload-session"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-goog-upload-status", "final")
                .set_body_json(json!({ "file": file })),
        )
        .mount(server)
        .await;
}

/// 依次返回 `states` 中的状态，最后一个状态一直重复。
pub async fn mount_file_states(server: &MockServer, name: &str, states: &[&str]) -> Arc<AtomicUsize> {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let states: Vec<String> = states.iter().map(ToString::to_string).collect();
    let file_name = name.to_string();
    Mock::given(method("GET"))
        .and(path(format!("/v1beta/{name}")))
        .respond_with(move |_: &Request| {
            let index = counter.fetch_add(1, Ordering::SeqCst);
            let state = states
                .get(index)
                .or_else(|| states.last())
                .cloned()
                .unwrap_or_default();
            ResponseTemplate::new(200).set_body_json(json!({
                "name": file_name,
                "uri": format!("https://generativelanguage.googleapis.com/v1beta/{file_name}"),
                "mimeType": "video/mp4",
                "state": state,
            }))
        })
        .mount(server)
        .await;
    calls
}

pub fn text_response(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "finishReason": "STOP"
        }],
        "usageMetadata": {
            "promptTokenCount": 10,
            "candidatesTokenCount": 5,
            "totalTokenCount": 15
        },
        "modelVersion": "gemini-2.0-flash"
    })
}

pub async fn mount_generate(server: &MockServer, model: &str, text: &str) {
    Mock::given(method("POST"))
        .and(path(format!("/v1beta/models/{model}:generateContent")))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_response(text)))
        .mount(server)
        .await;
}

pub async fn mount_count_tokens(server: &MockServer, model: &str, total: i32) {
    Mock::given(method("POST"))
        .and(path(format!("/v1beta/models/{model}:countTokens")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "totalTokens": total })))
        .mount(server)
        .await;
}

/// 为每条请求返回一个固定维度的向量。
pub async fn mount_batch_embed(server: &MockServer, model: &str) {
    Mock::given(method("POST"))
        .and(path(format!("/v1beta/models/{model}:batchEmbedContents")))
        .respond_with(|req: &Request| {
            let body: Value = serde_json::from_slice(&req.body).unwrap_or_default();
            let embeddings: Vec<Value> = body["requests"]
                .as_array()
                .map(|requests| {
                    requests
                        .iter()
                        .enumerate()
                        .map(|(index, request)| {
                            let dims = request["outputDimensionality"].as_u64().unwrap_or(3);
                            let values: Vec<f64> =
                                (0..dims).map(|i| (index as f64) + (i as f64) / 10.0).collect();
                            json!({ "values": values })
                        })
                        .collect()
                })
                .unwrap_or_default();
            ResponseTemplate::new(200).set_body_json(json!({ "embeddings": embeddings }))
        })
        .mount(server)
        .await;
}

pub fn cached_content(name: &str, expire_time: &str) -> Value {
    json!({
        "name": name,
        "model": "models/gemini-1.5-flash-001",
        "createTime": "2026-10-17T00:00:00Z",
        "updateTime": "2026-10-17T00:00:00Z",
        "expireTime": expire_time,
        "usageMetadata": {"totalTokenCount": 32000}
    })
}

/// 完整的 cachedContents 资源：create/get/list/patch/delete。
pub async fn mount_caches(server: &MockServer, name: &str) {
    Mock::given(method("POST"))
        .and(path("/v1beta/cachedContents"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(cached_content(name, "2026-10-17T01:00:00Z")),
        )
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/v1beta/{name}")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(cached_content(name, "2026-10-17T01:00:00Z")),
        )
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1beta/cachedContents"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "cachedContents": [cached_content(name, "2026-10-17T01:00:00Z")]
        })))
        .mount(server)
        .await;
    Mock::given(method("PATCH"))
        .and(path(format!("/v1beta/{name}")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(cached_content(name, "2026-10-17T02:00:00Z")),
        )
        .mount(server)
        .await;
    Mock::given(method("DELETE"))
        .and(path_regex(r"^/v1beta/cachedContents/[^/]+$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(server)
        .await;
}

/// 取出某个路径上收到的全部 JSON 请求体。
pub async fn request_bodies(server: &MockServer, http_method: &str, request_path: &str) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|req| req.method.as_str() == http_method && req.url.path() == request_path)
        .filter_map(|req| serde_json::from_slice(&req.body).ok())
        .collect()
}
