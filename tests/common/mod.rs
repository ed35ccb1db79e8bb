#![allow(dead_code)]

use std::io::{Cursor, Write};
use std::sync::Arc;

use replay_ingest::{DissectDecoder, ServerConfig, router};
use reqwest::multipart::{Form, Part};
use tokio::net::TcpListener;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Start the service on an ephemeral port and return its base URL.
pub async fn spawn_server(config: ServerConfig) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = router(&config, Arc::new(DissectDecoder));

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{addr}")
}

pub fn upload_form(field: &str, file_name: &str, bytes: Vec<u8>) -> Form {
    Form::new().part(
        field.to_string(),
        Part::bytes(bytes).file_name(file_name.to_string()),
    )
}

fn put_string(out: &mut Vec<u8>, s: &str) {
    out.extend_from_slice(&(s.len() as u16).to_le_bytes());
    out.extend_from_slice(s.as_bytes());
}

/// A replay in the `dissect` container layout.
pub fn replay(header: &[(&str, &str)], events: &[(u8, u32, &str, &str)]) -> Vec<u8> {
    let mut out = b"dissect\x01".to_vec();
    for (key, value) in header {
        put_string(&mut out, key);
        put_string(&mut out, value);
    }
    put_string(&mut out, "");
    for (kind, time, username, message) in events {
        out.push(*kind);
        out.extend_from_slice(&time.to_le_bytes());
        put_string(&mut out, username);
        put_string(&mut out, message);
    }
    out
}

pub fn sample_replay() -> Vec<u8> {
    replay(
        &[("map", "Chalet"), ("gamemode", "Bomb"), ("roundNumber", "1")],
        &[
            (0, 35, "Ash", "Ash killed Kapkan"),
            (2, 120, "Thermite", ""),
            (3, 127, "Thermite", ""),
        ],
    )
}

pub enum Entry<'a> {
    File(&'a str, Vec<u8>),
    Deflated(&'a str, Vec<u8>),
    Dir(&'a str),
}

pub fn archive(entries: Vec<Entry<'_>>) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for entry in entries {
        match entry {
            Entry::File(name, data) => {
                writer.start_file(name, stored).unwrap();
                writer.write_all(&data).unwrap();
            }
            Entry::Deflated(name, data) => {
                writer.start_file(name, deflated).unwrap();
                writer.write_all(&data).unwrap();
            }
            Entry::Dir(name) => {
                writer.add_directory(name, stored).unwrap();
            }
        }
    }

    writer.finish().unwrap().into_inner()
}
