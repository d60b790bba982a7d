#![allow(dead_code)]

use std::io;
use std::ops::Range;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use adsfetch::config::Config;
use adsfetch::request::SearchClient;
use serde_json::{json, Value};
use tempfile::TempDir;
use tracing::subscriber::DefaultGuard;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockBuilder, MockServer, ResponseTemplate};

pub const SEARCH_PATH: &str = "/api/search/";

pub fn client(server: &MockServer, rows: u32, max_retries: u32) -> SearchClient {
    let config = Config::default()
        .with_base_url(format!("{}{SEARCH_PATH}", server.uri()))
        .with_dev_key("test-key")
        .with_rows(rows)
        .with_timeout(Duration::from_secs(5))
        .with_retries(max_retries, Duration::ZERO);
    SearchClient::new(config).expect("valid test config")
}

pub fn bibcode(i: u64) -> String {
    format!("2011ApJ...{i:04}S")
}

/// A success body with documents `range` out of `hits`.
pub fn page_body(hits: u64, range: Range<u64>) -> Value {
    let docs: Vec<Value> = range
        .map(|i| {
            json!({
                "bibcode": bibcode(i),
                "title": [format!("Title {i}")],
                "pub": "The Astrophysical Journal",
                "author": ["Smith, J.", "Doe, A."]
            })
        })
        .collect();
    json!({
        "meta": {"hits": hits, "count": docs.len()},
        "results": {"docs": docs}
    })
}

/// GET on the search path for the page starting at `start`.
pub fn page_request(start: u64) -> MockBuilder {
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("start", start.to_string()))
}

pub async fn mount_page(server: &MockServer, q: &str, start: u64, body: Value) {
    page_request(start)
        .and(query_param("q", q))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(server)
        .await;
}

/// Writes `content` to a file inside a fresh temp dir.
pub fn input_file(content: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("create temp dir");
    let file = dir.path().join("input.txt");
    std::fs::write(&file, content).expect("write input file");
    (dir, file)
}

/// Log lines written by the fmt subscriber installed with `capture_logs`.
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Routes tracing output of the current thread into a buffer until the guard is dropped.
/// `#[tokio::test]` runs on a single thread, so everything the test awaits is captured.
pub fn capture_logs() -> (LogBuffer, DefaultGuard) {
    let logs = LogBuffer::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::INFO)
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);
    (logs, guard)
}
