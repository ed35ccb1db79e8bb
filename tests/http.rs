mod common;

use std::num::NonZeroUsize;
use std::sync::Arc;

use common::{Entry, archive, replay, sample_replay, spawn_server, upload_form};
use replay_ingest::{DissectDecoder, ServerConfig, UploadBuffer, decode_single};
use reqwest::StatusCode;
use serde_json::{Value, json};

async fn post(base: &str, path: &str, field: &str, file_name: &str, bytes: Vec<u8>) -> reqwest::Response {
    reqwest::Client::new()
        .post(format!("{base}{path}"))
        .multipart(upload_form(field, file_name, bytes))
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn liveness_probe_greets() {
    let base = spawn_server(ServerConfig::default()).await;
    let resp = reqwest::get(format!("{base}/test")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()["access-control-allow-origin"], "*");
    assert_eq!(resp.json::<Value>().await.unwrap(), json!({"message": "Hello, World!"}));
}

#[tokio::test]
async fn single_replay_matches_direct_decode() {
    let base = spawn_server(ServerConfig::default()).await;
    let resp = post(&base, "/round", "file", "r1.rec", sample_replay()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();

    let direct = decode_single(UploadBuffer::new(sample_replay()), Arc::new(DissectDecoder))
        .await
        .unwrap();
    assert_eq!(body, serde_json::to_value(direct).unwrap());
    assert_eq!(body["header"]["map"], "Chalet");
    assert_eq!(body["events"].as_array().unwrap().len(), 3);
    assert_eq!(body["events"][0]["type"], "kill");
}

#[tokio::test]
async fn undecodable_single_replay_is_rejected() {
    let base = spawn_server(ServerConfig::default()).await;

    let resp = post(&base, "/round", "file", "r1.rec", b"not a replay".to_vec()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert!(!body["error"].as_str().unwrap().is_empty());

    let mut truncated = sample_replay();
    truncated.truncate(truncated.len() - 2);
    let resp = post(&base, "/round", "file", "r1.rec", truncated).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "malformed replay: unexpected end of match feedback");
    assert_eq!(body["context"], "Error decoding replay");
}

#[tokio::test]
async fn missing_upload_field_is_rejected() {
    let base = spawn_server(ServerConfig::default()).await;

    for path in ["/round", "/replay"] {
        let resp = post(&base, path, "attachment", "r1.rec", sample_replay()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["context"], "Error fetching form file");
    }

    let resp = reqwest::Client::new()
        .post(format!("{base}/replay"))
        .body("plain text")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn batch_isolates_corrupt_entries() {
    let base = spawn_server(ServerConfig::default()).await;
    let bundle = archive(vec![
        Entry::File("r1.rec", sample_replay()),
        Entry::Dir("notes/"),
        Entry::File("r2.rec", b"corrupt bytes".to_vec()),
    ]);

    let resp = post(&base, "/replay", "file", "match.zip", bundle).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    let results = body.as_array().unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["fileName"], "r1.rec");
    assert_eq!(results[0]["round"]["map"], "Chalet");
    assert_eq!(results[0]["activities"].as_array().unwrap().len(), 3);
    assert!(results[0].get("error").is_none());

    assert_eq!(results[1]["fileName"], "r2.rec");
    assert_eq!(
        results[1]["error"],
        "unrecognized replay container: missing dissect magic"
    );
    assert!(results[1].get("round").is_none());
    assert!(results[1].get("activities").is_none());
}

#[tokio::test]
async fn batch_counts_successes_and_failures() {
    let base = spawn_server(ServerConfig::default()).await;
    let short = replay(&[("map", "Bank")], &[]);
    let bundle = archive(vec![
        Entry::File("a.rec", sample_replay()),
        Entry::Deflated("b.rec", b"garbage".to_vec()),
        Entry::Deflated("c.rec", short),
        Entry::File("d.rec", Vec::new()),
        Entry::File("e.rec", b"dissect\x07".to_vec()),
    ]);

    let resp = post(&base, "/replay", "file", "match.zip", bundle).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    let names: Vec<_> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["fileName"].as_str().unwrap().to_string())
        .collect();
    let failures = body
        .as_array()
        .unwrap()
        .iter()
        .filter(|r| r.get("error").is_some())
        .count();

    assert_eq!(names, ["a.rec", "b.rec", "c.rec", "d.rec", "e.rec"]);
    assert_eq!(failures, 3);
    assert_eq!(body[4]["error"], "unsupported replay version 7");
}

#[tokio::test]
async fn archive_without_files_yields_empty_array() {
    let base = spawn_server(ServerConfig::default()).await;
    let bundle = archive(vec![Entry::Dir("notes/"), Entry::Dir("notes/old/")]);

    let resp = post(&base, "/replay", "file", "empty.zip", bundle).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.json::<Value>().await.unwrap(), json!([]));
}

#[tokio::test]
async fn corrupt_archive_is_rejected_without_partial_results() {
    let base = spawn_server(ServerConfig::default()).await;
    let mut bundle = archive(vec![Entry::File("r1.rec", sample_replay())]);
    bundle.truncate(bundle.len() - 10);

    let resp = post(&base, "/replay", "file", "broken.zip", bundle).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert!(body.is_object());
    assert_eq!(body["context"], "Error creating zip reader");
    assert!(!body["error"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn same_archive_gives_identical_bytes() {
    let base = spawn_server(ServerConfig::default()).await;
    let bundle = archive(vec![
        Entry::File("r1.rec", sample_replay()),
        Entry::File("r2.rec", b"bad".to_vec()),
    ]);

    let first = post(&base, "/replay", "file", "m.zip", bundle.clone())
        .await
        .bytes()
        .await
        .unwrap();
    let second = post(&base, "/replay", "file", "m.zip", bundle)
        .await
        .bytes()
        .await
        .unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn parallel_workers_keep_archive_order() {
    let config = ServerConfig {
        workers: NonZeroUsize::new(4).unwrap(),
        ..ServerConfig::default()
    };
    let base = spawn_server(config).await;

    let names: Vec<String> = (0..20).map(|i| format!("round-{i:02}.rec")).collect();
    let entries = names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            if i % 4 == 1 {
                Entry::File(name, b"junk".to_vec())
            } else {
                Entry::Deflated(name, sample_replay())
            }
        })
        .collect();

    let resp = post(&base, "/replay", "file", "many.zip", archive(entries)).await;
    let body: Value = resp.json().await.unwrap();
    let got: Vec<_> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["fileName"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(got, names);
}

#[tokio::test]
async fn preflight_gets_no_content() {
    let base = spawn_server(ServerConfig::default()).await;
    let resp = reqwest::Client::new()
        .request(reqwest::Method::OPTIONS, format!("{base}/replay"))
        .header("Origin", "https://example.org")
        .header("Access-Control-Request-Method", "POST")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert_eq!(resp.headers()["access-control-allow-origin"], "*");
    assert!(
        resp.headers()["access-control-allow-methods"]
            .to_str()
            .unwrap()
            .contains("POST")
    );
    assert!(resp.bytes().await.unwrap().is_empty());
}

#[tokio::test]
async fn cors_can_be_disabled() {
    let config = ServerConfig {
        cors: false,
        ..ServerConfig::default()
    };
    let base = spawn_server(config).await;
    let resp = reqwest::get(format!("{base}/test")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().get("access-control-allow-origin").is_none());
}

#[tokio::test]
async fn oversized_upload_is_rejected() {
    let config = ServerConfig {
        max_upload_bytes: 1024,
        ..ServerConfig::default()
    };
    let base = spawn_server(config).await;

    let resp = post(&base, "/round", "file", "big.rec", vec![0u8; 4096]).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["context"], "Error copying file to buffer");
}
