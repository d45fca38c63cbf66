#![allow(dead_code)]

use serde_json::Value;
use std::fs;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub const MOCKED_REPLY: &str = "mocked reply";
pub const UPLOAD_SESSION_PATH: &str = "/upload/session/1";

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("request body should be JSON")
    }

    pub fn is_upload_start(&self) -> bool {
        self.path.starts_with("/upload/v1beta/files")
    }

    pub fn is_generate(&self) -> bool {
        self.path.ends_with(":generateContent")
    }
}

#[derive(Debug, Clone)]
pub struct CannedResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl CannedResponse {
    pub fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }
}

pub fn text_reply(text: &str) -> CannedResponse {
    CannedResponse::json(
        200,
        serde_json::json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": text}]},
                "finishReason": "STOP"
            }]
        }),
    )
}

/// Answers the resumable upload protocol and `generateContent` the way the
/// real service does on success.
pub fn happy_path(request: &RecordedRequest, addr: SocketAddr) -> CannedResponse {
    if request.is_upload_start() {
        return CannedResponse::json(200, serde_json::json!({})).with_header(
            "x-goog-upload-url",
            format!("http://{addr}{UPLOAD_SESSION_PATH}"),
        );
    }

    if request.path == UPLOAD_SESSION_PATH {
        return CannedResponse::json(
            200,
            serde_json::json!({
                "file": {
                    "name": "files/abc123",
                    "uri": format!("http://{addr}/v1beta/files/abc123"),
                    "mimeType": "image/png"
                }
            }),
        );
    }

    text_reply(MOCKED_REPLY)
}

pub struct FakeGemini {
    pub addr: SocketAddr,
    requests: Receiver<RecordedRequest>,
}

impl FakeGemini {
    pub fn start<F>(handler: F) -> Self
    where
        F: Fn(&RecordedRequest, SocketAddr) -> CannedResponse + Send + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind should succeed");
        let addr = listener.local_addr().expect("address should be available");
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else {
                    continue;
                };
                let Some(request) = read_request(&mut stream) else {
                    continue;
                };
                let response = handler(&request, addr);
                if tx.send(request).is_err() {
                    break;
                }
                write_response(&mut stream, &response);
            }
        });

        Self { addr, requests: rx }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        let mut collected = Vec::new();
        while let Ok(request) = self.requests.recv_timeout(Duration::from_millis(50)) {
            collected.push(request);
        }
        collected
    }
}

fn read_request(stream: &mut TcpStream) -> Option<RecordedRequest> {
    let mut reader = BufReader::new(stream);
    let mut request_line = String::new();
    reader.read_line(&mut request_line).ok()?;
    let mut parts = request_line.split_whitespace();
    let method = parts.next()?.to_string();
    let path = parts.next()?.to_string();

    let mut headers = Vec::new();
    loop {
        let mut line = String::new();
        reader.read_line(&mut line).ok()?;
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            headers.push((name.trim().to_ascii_lowercase(), value.trim().to_string()));
        }
    }

    let content_length = headers
        .iter()
        .find(|(name, _)| name == "content-length")
        .and_then(|(_, value)| value.parse::<usize>().ok())
        .unwrap_or(0);
    let mut body = vec![0; content_length];
    reader.read_exact(&mut body).ok()?;

    Some(RecordedRequest {
        method,
        path,
        headers,
        body,
    })
}

fn write_response(stream: &mut TcpStream, response: &CannedResponse) {
    let reason = if response.status < 400 { "OK" } else { "Error" };
    let mut head = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n",
        response.status,
        reason,
        response.body.len()
    );
    for (name, value) in &response.headers {
        head.push_str(&format!("{name}: {value}\r\n"));
    }
    head.push_str("\r\n");

    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(response.body.as_bytes());
    let _ = stream.flush();
}

pub fn free_local_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind should succeed");
    let addr = listener.local_addr().expect("address should be available");
    drop(listener);
    addr
}

pub fn unique_temp_dir(suffix: &str) -> PathBuf {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock should be after unix epoch")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!(
        "gemini-ask-{suffix}-{stamp}-{}",
        std::process::id()
    ));
    fs::create_dir_all(&dir).expect("failed to create temp directory");
    dir
}
