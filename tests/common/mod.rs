//! Loopback HTTP stub for client tests.
//!
//! Serves canned responses by path, one request per connection, and records
//! every request it sees so tests can assert on query strings and headers.

#![allow(dead_code, clippy::expect_used)]

use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use capedge_client::{CapEdgeClient, ClientOptions, CookieJar};

#[derive(Clone)]
pub struct Route {
    pub path: String,
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl Route {
    pub fn json(path: &str, body: impl Into<String>) -> Self {
        Self {
            path: path.to_string(),
            status: 200,
            content_type: "application/json",
            body: body.into(),
        }
    }

    pub fn html(path: &str, body: impl Into<String>) -> Self {
        Self {
            path: path.to_string(),
            status: 200,
            content_type: "text/html; charset=utf-8",
            body: body.into(),
        }
    }

    pub fn status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }
}

/// One request as received: request target plus lowercased header lines.
#[derive(Debug, Clone)]
pub struct Seen {
    pub target: String,
    pub headers: Vec<(String, String)>,
}

impl Seen {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

pub struct Stub {
    pub base: String,
    seen: Arc<Mutex<Vec<Seen>>>,
}

impl Stub {
    /// Bind a loopback port and serve the routes built for its base URL.
    pub fn start(routes: impl FnOnce(&str) -> Vec<Route>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
        let base = format!("http://{}", listener.local_addr().expect("local addr"));
        let routes = routes(&base);
        let seen = Arc::new(Mutex::new(Vec::new()));

        let log = Arc::clone(&seen);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                handle(stream, &routes, &log);
            }
        });

        Self { base, seen }
    }

    pub fn requests(&self) -> Vec<Seen> {
        self.seen.lock().expect("lock").clone()
    }

    pub fn client(&self, cookies: &str) -> CapEdgeClient {
        let options = ClientOptions {
            api_base: format!("{}/v1/api/", self.base),
            site_base: format!("{}/", self.base),
            timeout: Some(Duration::from_secs(5)),
            ..ClientOptions::default()
        };
        CapEdgeClient::with_options(&CookieJar::parse(cookies), &options).expect("client")
    }
}

fn handle(stream: TcpStream, routes: &[Route], log: &Mutex<Vec<Seen>>) {
    let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));
    let mut request_line = String::new();
    if reader.read_line(&mut request_line).is_err() {
        return;
    }
    let target = request_line
        .split_whitespace()
        .nth(1)
        .unwrap_or_default()
        .to_string();

    let mut headers = Vec::new();
    loop {
        let mut line = String::new();
        match reader.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) if line.trim().is_empty() => break,
            Ok(_) => {
                if let Some((k, v)) = line.trim_end().split_once(':') {
                    headers.push((k.trim().to_ascii_lowercase(), v.trim().to_string()));
                }
            }
        }
    }

    let path = target.split('?').next().unwrap_or_default();
    let route = routes.iter().find(|r| r.path == path).cloned().unwrap_or(Route {
        path: path.to_string(),
        status: 404,
        content_type: "text/plain",
        body: "not found".to_string(),
    });
    log.lock().expect("lock").push(Seen { target, headers });

    let reason = match route.status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Status",
    };
    let response = format!(
        "HTTP/1.1 {} {reason}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        route.status,
        route.content_type,
        route.body.len(),
        route.body
    );
    let mut stream = stream;
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}
