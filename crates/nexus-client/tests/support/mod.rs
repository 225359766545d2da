//! In-process JSON-RPC mock server for client integration tests.

use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use nexus_protocol::{JsonRpcError, JsonRpcRequest};
use serde_json::{json, Value};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

/// What the handler wants sent back for one request.
#[allow(dead_code)]
pub enum Reply {
    /// A successful JSON-RPC response with this result value.
    Result(Value),
    /// A JSON-RPC error response.
    Error(JsonRpcError),
    /// A bare HTTP status with an empty body.
    Status(u16),
    /// Sleep before answering with this result value.
    Delay(Duration, Value),
    /// Raw response body, verbatim, with a 200 status.
    Raw(String),
}

/// The decoded request handed to a test handler.
pub struct Received {
    pub authorization: Option<String>,
    pub request: JsonRpcRequest,
}

type Handler = Arc<dyn Fn(&Received) -> Reply + Send + Sync>;

/// One mock server bound to an ephemeral port, counting every RPC call.
pub struct MockServer {
    addr: SocketAddr,
    calls: Arc<AtomicUsize>,
}

impl MockServer {
    /// Start a server whose responses come from `handler`.
    pub async fn start<F>(handler: F) -> Self
    where
        F: Fn(&Received) -> Reply + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let handler: Handler = Arc::new(handler);

        let accept_calls = calls.clone();
        tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    break;
                };
                let io = TokioIo::new(stream);
                let handler = handler.clone();
                let calls = accept_calls.clone();
                tokio::spawn(async move {
                    let service = service_fn(move |req: Request<Incoming>| {
                        let handler = handler.clone();
                        let calls = calls.clone();
                        async move { Ok::<_, Infallible>(respond(req, &handler, &calls).await) }
                    });
                    let _ = http1::Builder::new().serve_connection(io, service).await;
                });
            }
        });

        Self { addr, calls }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Total RPC requests the server has received.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

async fn respond(
    req: Request<Incoming>,
    handler: &Handler,
    calls: &Arc<AtomicUsize>,
) -> Response<Full<Bytes>> {
    let authorization = req
        .headers()
        .get(hyper::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = req.into_body().collect().await.unwrap().to_bytes();
    let request: JsonRpcRequest = serde_json::from_slice(&body).unwrap();
    let id = request.id;
    calls.fetch_add(1, Ordering::SeqCst);

    let received = Received {
        authorization,
        request,
    };
    match handler(&received) {
        Reply::Result(value) => json_response(success_body(value, id)),
        Reply::Error(error) => json_response(error_body(error, id)),
        Reply::Status(code) => Response::builder()
            .status(StatusCode::from_u16(code).unwrap())
            .body(Full::new(Bytes::new()))
            .unwrap(),
        Reply::Delay(duration, value) => {
            tokio::time::sleep(duration).await;
            json_response(success_body(value, id))
        }
        Reply::Raw(text) => json_response(text),
    }
}

fn success_body(result: Value, id: u64) -> String {
    json!({ "jsonrpc": "2.0", "result": result, "error": null, "id": id }).to_string()
}

fn error_body(error: JsonRpcError, id: u64) -> String {
    json!({ "jsonrpc": "2.0", "result": null, "error": error, "id": id }).to_string()
}

fn json_response(body: String) -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::OK)
        .header(hyper::header::CONTENT_TYPE, "application/json")
        .body(Full::new(Bytes::from(body)))
        .unwrap()
}
