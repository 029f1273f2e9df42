#![allow(dead_code, missing_docs, clippy::expect_used)]
use std::collections::{BTreeMap, HashMap};
use std::future::IntoFuture;
use std::net::{Ipv4Addr, SocketAddr, TcpListener};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::Context;
use axum::extract::{Path, Query};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde_json::Value;
use tokio::sync::oneshot;
use tracing::{debug, info};

/// A local HTTP server for the actor to talk to.
///
/// The actor transport is blocking, so the server runs on its own runtime in
/// a dedicated thread. Dropping the server stops it.
#[derive(Debug)]
pub struct TestServer {
    local_addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl TestServer {
    pub fn start() -> anyhow::Result<Self> {
        let listener = TcpListener::bind(SocketAddr::from((Ipv4Addr::LOCALHOST, 0)))
            .context("bind test server")?;
        let local_addr = listener.local_addr()?;
        listener.set_nonblocking(true).context("set non-blocking")?;

        let (shutdown, stop) = oneshot::channel();
        let handle = thread::Builder::new()
            .name(format!("test-server-{}", local_addr.port()))
            .spawn(move || {
                let runtime = tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                    .expect("test server runtime");
                runtime.block_on(async move {
                    let listener =
                        tokio::net::TcpListener::from_std(listener).expect("valid listener");
                    info!(?listener, "launching server");
                    tokio::select! {
                        result = axum::serve(listener, router()).into_future() => {
                            result.expect("server launched");
                        }
                        _ = stop => debug!("stopping server"),
                    }
                });
            })
            .context("spawn test server thread")?;

        Ok(Self {
            local_addr,
            shutdown: Some(shutdown),
            handle: Some(handle),
        })
    }

    /// The base URL to give to the actor, without trailing slash.
    pub fn url(&self) -> String {
        format!("http://{}", self.local_addr)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn router() -> Router {
    Router::new()
        .route("/status", get(forbidden))
        .route("/echo", post(echo).patch(echo).put(echo))
        .route("/query", get(query))
        .route("/headers", get(custom_headers))
        .route("/items/{id}", delete(delete_item))
        .route("/ping", get(ping))
        .route("/slow", get(slow))
}

async fn forbidden() -> StatusCode {
    StatusCode::FORBIDDEN
}

async fn echo(Json(body): Json<Value>) -> Json<Value> {
    Json(body)
}

async fn query(Query(params): Query<HashMap<String, String>>) -> Json<HashMap<String, String>> {
    Json(params)
}

// Only `x-` headers, the others depend on the client
async fn custom_headers(headers: HeaderMap) -> Json<BTreeMap<String, String>> {
    let custom = headers
        .iter()
        .filter(|(name, _)| name.as_str().starts_with("x-"))
        .filter_map(|(name, value)| {
            let value = value.to_str().ok()?;
            Some((name.to_string(), value.to_string()))
        })
        .collect();
    Json(custom)
}

async fn delete_item(Path(id): Path<u32>) -> StatusCode {
    debug!(id, "deleting item");
    StatusCode::NO_CONTENT
}

async fn ping() -> &'static str {
    "pong"
}

async fn slow() -> &'static str {
    tokio::time::sleep(Duration::from_secs(2)).await;
    "too late"
}
