//! Common test utilities and helpers
#![allow(dead_code)]

use autocorrelate::capture::{Request, Response, Trace};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};

pub const RECORDED_TOKEN: &str = "459581b0";
pub const REPLAYED_TOKEN: &str = "a1b2c3d4";

/// One exchange: `POST /login` sends the token that its own response
/// announces in a header.
pub fn single_exchange_trace(token: &str) -> Trace {
    let mut trace = Trace::default();
    trace.push(
        Request::new("login", "POST", "https://app.example.com/login")
            .with_header("Content-Type", "application/x-www-form-urlencoded")
            .with_body(format!("csrf={token}")),
        Some(
            Response::new("login")
                .with_headers(format!("HTTP/1.1 200 OK\nX-CSRF-Token: {token}\nServer: nginx")),
        ),
    );
    trace
}

/// Login page announcing the token, then the form post sending it.
pub fn login_trace(token: &str, login_status: u16) -> Trace {
    let mut trace = Trace::default();
    trace.push(
        Request::new("001 GET /login", "GET", "https://app.example.com/login"),
        Some(
            Response::new("001 GET /login")
                .with_headers(format!("HTTP/1.1 200 OK\nX-CSRF-Token: {token}\nServer: nginx")),
        ),
    );
    trace.push(
        Request::new("002 POST /login", "POST", "https://app.example.com/login")
            .with_header("Content-Type", "application/x-www-form-urlencoded")
            .with_body(format!("csrf={token}&user=ann")),
        Some(Response::new("002 POST /login").with_status(login_status)),
    );
    trace
}

/// HTTP Archive equivalent of [`login_trace`].
pub fn login_har(token: &str, login_status: u16) -> serde_json::Value {
    json!({
        "log": {
            "version": "1.2",
            "entries": [
                {
                    "request": {
                        "method": "GET",
                        "url": "https://app.example.com/login",
                        "headers": []
                    },
                    "response": {
                        "status": 200,
                        "statusText": "OK",
                        "httpVersion": "HTTP/1.1",
                        "headers": [
                            {"name": "X-CSRF-Token", "value": token},
                            {"name": "Server", "value": "nginx"}
                        ],
                        "content": {"mimeType": "text/html", "text": "<form></form>"}
                    }
                },
                {
                    "request": {
                        "method": "POST",
                        "url": "https://app.example.com/login",
                        "headers": [],
                        "postData": {
                            "mimeType": "application/x-www-form-urlencoded",
                            "params": [
                                {"name": "csrf", "value": token},
                                {"name": "user", "value": "ann"}
                            ]
                        }
                    },
                    "response": {
                        "status": login_status,
                        "statusText": "",
                        "httpVersion": "HTTP/1.1",
                        "headers": [],
                        "content": {"mimeType": "text/html", "text": ""}
                    }
                }
            ]
        }
    })
}

/// Writes `trace` in the crate's own JSON format.
pub fn write_trace(dir: &Path, name: &str, trace: &Trace) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, serde_json::to_string_pretty(trace).unwrap()).unwrap();
    path
}

pub fn write_json(dir: &Path, name: &str, value: &serde_json::Value) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, serde_json::to_string_pretty(value).unwrap()).unwrap();
    path
}
