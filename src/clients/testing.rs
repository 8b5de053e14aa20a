// Loopback HTTP server answering every request with one canned response

use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

/// What the server saw of one request
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub method: String,
    pub path: String,
    pub invocation_type: Option<String>,
    pub body: Bytes,
}

pub struct CannedServer {
    addr: SocketAddr,
    seen: Arc<Mutex<Vec<SeenRequest>>>,
}

impl CannedServer {
    pub async fn start(status: u16, headers: &[(&'static str, &'static str)], body: &'static str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let headers = headers.to_vec();

        let recorded = Arc::clone(&seen);
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let recorded = Arc::clone(&recorded);
                let headers = headers.clone();
                tokio::spawn(async move {
                    let service = service_fn(move |req: Request<Incoming>| {
                        let recorded = Arc::clone(&recorded);
                        let headers = headers.clone();
                        async move {
                            let (parts, incoming) = req.into_parts();
                            let request_body = incoming.collect().await.unwrap().to_bytes();
                            recorded.lock().unwrap().push(SeenRequest {
                                method: parts.method.to_string(),
                                path: parts.uri.path().to_string(),
                                invocation_type: parts
                                    .headers
                                    .get("x-amz-invocation-type")
                                    .and_then(|v| v.to_str().ok())
                                    .map(ToString::to_string),
                                body: request_body,
                            });

                            let mut builder = Response::builder().status(status);
                            for (name, value) in &headers {
                                builder = builder.header(*name, *value);
                            }
                            Ok::<_, Infallible>(builder.body(Full::new(Bytes::from_static(body.as_bytes()))).unwrap())
                        }
                    });
                    let _ = http1::Builder::new()
                        .serve_connection(TokioIo::new(stream), service)
                        .await;
                });
            }
        });

        Self { addr, seen }
    }

    /// An address nothing is listening on
    pub async fn unused_addr() -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<SeenRequest> {
        self.seen.lock().unwrap().clone()
    }
}
