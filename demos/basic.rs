//! Minimal reqwatch example — an echo endpoint behind both middlewares.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example basic
//!
//! Try:
//!   curl http://localhost:3000/ok
//!   curl -X POST http://localhost:3000/users \
//!        -H 'x-forwarded-for: 203.0.113.7' \
//!        -H 'cookie: session=alice; theme=dark' \
//!        -d '{"name":"alice"}'

use reqwatch::middleware::{AccessLog, RequestTracker};
use reqwatch::{Request, Response, Server, StatusCode};
use tracing::{info, warn};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let tracker = RequestTracker::new()
        .on_request(|record| {
            info!(method = %record.method, url = %record.url, ip = %record.client_ip, bytes = record.body.len(), "request observed");
        })
        .on_request_complete(|record| {
            info!(url = %record.url, user = %record.identity_id, took = ?record.time_taken, "request completed");
        })
        .on_error(|err| warn!("request tracking: {err}"))
        // A real app would ask its session store; the demo trusts the cookie.
        .identify(|record| {
            record.cookies.get("session").and_then(|v| v.first()).cloned().unwrap_or_default()
        });

    let app = AccessLog::wrap(tracker.wrap(route));

    Server::bind("0.0.0.0:3000")
        .serve(app)
        .await
        .expect("server error");
}

async fn route(req: Request) -> Response {
    match req.path() {
        "/ok" => Response::text("OK"),
        "/users" => create_user(req).await,
        _ => Response::status(StatusCode::NOT_FOUND),
    }
}

// POST /users — echoes the body the tracker already read once.
async fn create_user(mut req: Request) -> Response {
    let body = match req.read_body().await {
        Ok(body) if !body.is_empty() => body,
        _ => return Response::status(StatusCode::BAD_REQUEST),
    };

    Response::builder()
        .status(StatusCode::CREATED)
        .header("location", "/users/99")
        .json(body.to_vec())
}
