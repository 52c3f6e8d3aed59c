#![allow(dead_code)]

use std::io::Read;
use std::sync::{Arc, Mutex};
use std::thread;

use alloy::primitives::Address;
use serde_json::{json, Value};
use tiny_http::{Response, Server, StatusCode};

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub body: Value,
}

pub struct MockServer {
    pub url: String,
    pub requests: Arc<Mutex<Vec<RecordedRequest>>>,
    _join: thread::JoinHandle<()>,
}

impl MockServer {
    pub fn recorded(&self) -> Vec<RecordedRequest> {
        self.requests.lock().expect("requests lock").clone()
    }
}

/// Serves up to 32 requests, answering each with `handler(request) -> (status, body)`.
pub fn spawn_mock_server<F>(handler: F) -> MockServer
where
    F: Fn(&RecordedRequest) -> (u16, Value) + Send + 'static,
{
    let server = Server::http("127.0.0.1:0").expect("start server");
    let url = format!("http://{}", server.server_addr());
    let requests = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&requests);

    let join = thread::spawn(move || {
        for _ in 0..32 {
            let mut req = match server.recv() {
                Ok(r) => r,
                Err(_) => break,
            };
            let mut raw = String::new();
            let _ = req.as_reader().read_to_string(&mut raw);
            let recorded = RecordedRequest {
                method: req.method().to_string(),
                path: req.url().to_owned(),
                body: serde_json::from_str(&raw).unwrap_or(Value::Null),
            };
            let (code, payload) = handler(&recorded);
            if let Ok(mut g) = log.lock() {
                g.push(recorded);
            }
            let response =
                Response::from_string(payload.to_string()).with_status_code(StatusCode(code));
            let _ = req.respond(response);
        }
    });

    MockServer {
        url,
        requests,
        _join: join,
    }
}

/// JSON-RPC wallet that answers from a fixed table keyed by method name.
pub fn spawn_rpc_wallet(answers: Vec<(&'static str, Value)>) -> MockServer {
    spawn_mock_server(move |req| {
        let id = req.body.get("id").cloned().unwrap_or(Value::Null);
        let method = req.body["method"].as_str().unwrap_or_default();
        match answers.iter().find(|(m, _)| *m == method) {
            Some((_, answer)) if answer.get("code").is_some() => {
                (200, json!({"jsonrpc": "2.0", "id": id, "error": answer}))
            }
            Some((_, answer)) => (200, json!({"jsonrpc": "2.0", "id": id, "result": answer})),
            None => (
                200,
                json!({"jsonrpc": "2.0", "id": id, "error": {"code": -32601, "message": "method not found"}}),
            ),
        }
    })
}

pub fn account_a() -> Address {
    "0x1000000000000000000000000000000000000001"
        .parse()
        .expect("account a")
}

pub fn account_b() -> Address {
    "0x2000000000000000000000000000000000000002"
        .parse()
        .expect("account b")
}

pub fn sample_cards() -> Value {
    json!({
        "success": true,
        "eventcards": [
            {
                "id": 1,
                "name": "Jazz Night",
                "likes_number": "[7]",
                "picture_small": "jazz.png",
                "creator": {"name": "Blue Note", "avatar": null},
                "collection": {"name": "Live"},
                "totoal_ticekts": 100,
                "buy_count": 100,
                "price": "0.05"
            },
            {
                "id": 2,
                "name": "Rock Fest",
                "likes_number": null,
                "picture_small": null,
                "totoal_ticekts": 500,
                "buy_count": 12,
                "price": 1.5
            }
        ]
    })
}
