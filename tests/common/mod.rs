//! Minimal HTTP stub of the backend query service for integration tests.
//!
//! Every connection is answered with the same canned response; each request is
//! recorded before the response is written, so once a client call returns its
//! request is already visible through `requests()`.

#![allow(dead_code)]

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

/// A request as seen by the stub.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    /// Header names lowercased
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == &name.to_ascii_lowercase())
            .map(|(_, v)| v.as_str())
    }
}

/// How the stub answers.
#[derive(Debug, Clone)]
pub enum Reply {
    Json { status: u16, body: String },
    /// 200 with `{"answer": "answer to <question>"}` built from the request body
    Echo,
    /// Read the request, then hold the connection open without answering
    Hang(Duration),
}

pub struct StubServer {
    base_url: String,
    requests: Receiver<RecordedRequest>,
}

impl StubServer {
    /// Starts a stub answering every request with `status` and a JSON `body`.
    pub fn json(status: u16, body: &str) -> Self {
        Self::start(Reply::Json {
            status,
            body: body.to_string(),
        })
    }

    /// Starts a stub whose answer names the question it was asked.
    pub fn echo() -> Self {
        Self::start(Reply::Echo)
    }

    /// Starts a stub that never answers.
    pub fn hanging(hold: Duration) -> Self {
        Self::start(Reply::Hang(hold))
    }

    fn start(reply: Reply) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub server");
        let addr = listener.local_addr().expect("stub address");
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { break };
                let tx = tx.clone();
                let reply = reply.clone();
                thread::spawn(move || handle(stream, &reply, &tx));
            }
        });

        Self {
            base_url: format!("http://{addr}"),
            requests: rx,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns every request received so far.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.try_iter().collect()
    }
}

fn handle(stream: TcpStream, reply: &Reply, tx: &Sender<RecordedRequest>) {
    let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));

    let mut request_line = String::new();
    if reader.read_line(&mut request_line).is_err() {
        return;
    }
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let path = parts.next().unwrap_or_default().to_string();

    let mut headers = Vec::new();
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).is_err() {
            return;
        }
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            headers.push((name.trim().to_ascii_lowercase(), value.trim().to_string()));
        }
    }

    let length = headers
        .iter()
        .find(|(k, _)| k == "content-length")
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);
    let mut body = vec![0; length];
    if reader.read_exact(&mut body).is_err() {
        return;
    }

    let body = String::from_utf8_lossy(&body).into_owned();
    let _ = tx.send(RecordedRequest {
        method,
        path,
        headers,
        body: body.clone(),
    });

    let mut stream = stream;
    match reply {
        Reply::Json { status, body } => respond(&mut stream, *status, body),
        Reply::Echo => {
            let question = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v["question"].as_str().map(str::to_string))
                .unwrap_or_default();
            let answer = serde_json::json!({ "answer": format!("answer to {question}") });
            respond(&mut stream, 200, &answer.to_string());
        }
        Reply::Hang(hold) => thread::sleep(*hold),
    }
}

fn respond(stream: &mut TcpStream, status: u16, body: &str) {
    let response = format!(
        "HTTP/1.1 {status} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        reason(status),
        body.len()
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        422 => "Unprocessable Entity",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Status",
    }
}
