//! Minimal HTTP/1.1 stub serving canned responses keyed by request target.

#![allow(dead_code)]

use bingdaily::Client;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

pub const METADATA_TARGET: &str = "/HPImageArchive.aspx?format=js&idx=0&n=8&mkt=en-CA";

#[derive(Debug, Clone)]
pub struct Request {
    pub target: String,
    pub accept: Option<String>,
}

#[derive(Default)]
pub struct Routes(HashMap<String, (u16, Vec<u8>)>);

impl Routes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn metadata(self, urls: &[&str]) -> Self {
        let images: Vec<_> = urls
            .iter()
            .map(|url| serde_json::json!({ "url": url, "title": "stub" }))
            .collect();
        let body = serde_json::json!({ "images": images, "tooltips": {} }).to_string();
        self.route(METADATA_TARGET, 200, body.into_bytes())
    }

    pub fn route(mut self, target: &str, status: u16, body: impl Into<Vec<u8>>) -> Self {
        self.0.insert(target.to_string(), (status, body.into()));
        self
    }
}

pub struct Stub {
    pub base_url: String,
    requests: Arc<Mutex<Vec<Request>>>,
}

impl Stub {
    pub async fn start(routes: Routes) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind stub");
        let addr = listener.local_addr().expect("stub address");
        let routes = Arc::new(routes.0);
        let requests = Arc::new(Mutex::new(Vec::new()));

        let log = Arc::clone(&requests);
        tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                let routes = Arc::clone(&routes);
                let log = Arc::clone(&log);
                tokio::spawn(async move { respond(socket, &routes, &log).await });
            }
        });

        Self {
            base_url: format!("http://{addr}"),
            requests,
        }
    }

    pub fn client(&self) -> Client {
        let http = reqwest::Client::builder()
            .no_proxy()
            .build()
            .expect("build http client");
        Client::with_http_client(http).with_base_url(self.base_url.as_str())
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }

    pub fn image_requests(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .map(|r| r.target)
            .filter(|target| target != METADATA_TARGET)
            .collect()
    }
}

async fn respond(
    mut socket: TcpStream,
    routes: &HashMap<String, (u16, Vec<u8>)>,
    log: &Mutex<Vec<Request>>,
) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = socket.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if buf.windows(4).any(|w| w == b"\r\n\r\n") {
            break;
        }
    }

    let head = String::from_utf8_lossy(&buf).into_owned();
    let mut lines = head.lines();
    let target = lines
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or_default()
        .to_string();
    let accept = lines.find_map(|line| {
        let (name, value) = line.split_once(':')?;
        name.eq_ignore_ascii_case("accept")
            .then(|| value.trim().to_string())
    });
    log.lock().unwrap().push(Request {
        target: target.clone(),
        accept,
    });

    let (status, body) = routes
        .get(&target)
        .cloned()
        .unwrap_or((404, b"not found".to_vec()));
    let reason = match status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    };
    let head = format!(
        "HTTP/1.1 {status} {reason}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        body.len()
    );
    let _ = socket.write_all(head.as_bytes()).await;
    let _ = socket.write_all(&body).await;
    let _ = socket.shutdown().await;
}
