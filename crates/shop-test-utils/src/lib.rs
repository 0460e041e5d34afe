//! Testing utilities for the storefront workspace
//!
//! Shared fixtures and a stub JSON backend served by `warp` on an ephemeral
//! port, so HTTP behaviour can be exercised end to end through `reqwest`.

#![allow(missing_docs)]
#![allow(clippy::cast_precision_loss)]

use serde_json::{json, Value};
use shop_model::RecordId;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::ops::RangeInclusive;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, Mutex};
use warp::http::header::{HeaderValue, CONTENT_TYPE};
use warp::http::StatusCode;
use warp::hyper::body::Bytes;
use warp::hyper::Body;
use warp::path::FullPath;
use warp::Filter;

pub use warp::http::Method;

/// Canned response for one route
#[derive(Debug, Clone)]
pub struct StubReply {
    status: u16,
    // `None` echoes the request body
    body: Option<String>,
    delay: Option<Duration>,
}

impl StubReply {
    pub fn json(value: &Value) -> Self {
        Self::raw(200, value.to_string())
    }

    pub fn status(status: u16) -> Self {
        Self::raw(status, json!({"error": format!("stub status {status}")}).to_string())
    }

    pub fn raw(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: Some(body.into()),
            delay: None,
        }
    }

    /// Echo the request body back with status 200
    pub fn echo() -> Self {
        Self {
            status: 200,
            body: None,
            delay: None,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

/// A request the stub received
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: String,
    pub body: Value,
}

struct StubState {
    routes: Vec<(Method, String, StubReply)>,
    requests: Mutex<Vec<RecordedRequest>>,
}

/// Route table for a [`StubServer`]
#[derive(Debug, Default)]
pub struct StubBuilder {
    routes: Vec<(Method, String, StubReply)>,
}

impl StubBuilder {
    pub fn route(mut self, method: Method, path: &str, reply: StubReply) -> Self {
        self.routes.push((method, path.to_string(), reply));
        self
    }

    pub fn get(self, path: &str, reply: StubReply) -> Self {
        self.route(Method::GET, path, reply)
    }

    pub fn post(self, path: &str, reply: StubReply) -> Self {
        self.route(Method::POST, path, reply)
    }

    pub fn put(self, path: &str, reply: StubReply) -> Self {
        self.route(Method::PUT, path, reply)
    }

    pub fn delete(self, path: &str, reply: StubReply) -> Self {
        self.route(Method::DELETE, path, reply)
    }

    /// Bind to an ephemeral localhost port and serve in the background
    pub async fn start(self) -> StubServer {
        let state = Arc::new(StubState {
            routes: self.routes,
            requests: Mutex::new(Vec::new()),
        });

        let shared = state.clone();
        let filter = warp::any()
            .map(move || shared.clone())
            .and(warp::method())
            .and(warp::path::full())
            .and(
                warp::query::raw()
                    .or(warp::any().map(String::new))
                    .unify(),
            )
            .and(warp::body::bytes())
            .and_then(handle);

        let (shutdown, signal) = oneshot::channel::<()>();
        let (addr, server) = warp::serve(filter)
            .bind_with_graceful_shutdown(([127, 0, 0, 1], 0), async move {
                let _ = signal.await;
            });
        tokio::spawn(server);

        StubServer {
            addr,
            state,
            shutdown: Some(shutdown),
        }
    }
}

async fn handle(
    state: Arc<StubState>,
    method: Method,
    path: FullPath,
    query: String,
    body: Bytes,
) -> Result<warp::reply::Response, Infallible> {
    let body = serde_json::from_slice(&body).unwrap_or(Value::Null);
    state.requests.lock().await.push(RecordedRequest {
        method: method.clone(),
        path: path.as_str().to_string(),
        query,
        body: body.clone(),
    });

    let reply = state
        .routes
        .iter()
        .find(|(m, p, _)| *m == method && p == path.as_str())
        .map(|(_, _, reply)| reply.clone())
        .unwrap_or_else(|| StubReply::status(404));

    if let Some(delay) = reply.delay {
        tokio::time::sleep(delay).await;
    }

    let payload = reply.body.unwrap_or_else(|| body.to_string());
    let mut response = warp::reply::Response::new(Body::from(payload));
    *response.status_mut() =
        StatusCode::from_u16(reply.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    Ok(response)
}

/// Stub JSON backend; stops serving when dropped
pub struct StubServer {
    addr: SocketAddr,
    state: Arc<StubState>,
    shutdown: Option<oneshot::Sender<()>>,
}

impl StubServer {
    pub fn builder() -> StubBuilder {
        StubBuilder::default()
    }

    /// Base URL, e.g. `http://127.0.0.1:54321`
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().await.clone()
    }

    /// Number of requests received for one route
    pub async fn hits(&self, method: Method, path: &str) -> usize {
        self.state
            .requests
            .lock()
            .await
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}

pub fn product_json(id: i64, name: &str, price: f64) -> Value {
    json!({
        "id": id,
        "name": name,
        "price": price,
        "category": if id % 2 == 0 { "Kitchen" } else { "Home" },
        "stock": id % 15
    })
}

/// Seed catalog in the wrapped shape, ids in `ids`
pub fn seed_products(ids: RangeInclusive<i64>) -> Value {
    let products: Vec<Value> = ids
        .map(|id| product_json(id, &format!("Seed product {id}"), 100.0 + id as f64))
        .collect();
    json!({ "products": products })
}

/// Live catalog in the bare-array shape, ids in `ids`
pub fn live_products(ids: RangeInclusive<i64>) -> Value {
    Value::Array(
        ids.map(|id| product_json(id, &format!("Live product {id}"), 200.0 + id as f64))
            .collect(),
    )
}

pub fn order_json(id: &RecordId, status: &str, total: f64) -> Value {
    json!({
        "id": id,
        "createAt": "2026-10-19T03:00:00Z",
        "items": [{"productId": 1, "qty": 1, "price": total}],
        "total": total,
        "status": status,
        "customerInfo": {
            "name": "Test Buyer",
            "email": "buyer@example.com",
            "phone": "0812345678",
            "address": "Bangkok"
        }
    })
}

/// Seed orders `ORD-00001` through `ORD-<count>`, wrapped
pub fn seed_orders(count: u32) -> Value {
    let orders: Vec<Value> = (1..=count)
        .map(|n| order_json(&RecordId::seed_order(n), "success", f64::from(n) * 10.0))
        .collect();
    json!({ "orders": orders })
}

/// Write seed fixtures in the layout of the default seed paths
pub fn write_seed_fixtures(dir: &Path, products: &Value, orders: &Value) -> std::io::Result<()> {
    std::fs::write(dir.join("ecomerce.json"), products.to_string())?;
    std::fs::write(dir.join("ecommerce-orders.json"), orders.to_string())
}
