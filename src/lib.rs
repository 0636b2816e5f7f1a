//! # reqwatch
//!
//! Observation middleware for HTTP services behind a reverse proxy.
//!
//! ## The contract
//!
//! reqwatch watches requests. It does not route them, store what it saw, or
//! decide anything about them. Two decorators wrap any [`Handler`]:
//!
//! - [`middleware::AccessLog`] — one `METHOD URL STATUS ELAPSED` line per
//!   request, status colored by class, emitted through `tracing`.
//! - [`middleware::RequestTracker`] — captures method, URL, forwarded client
//!   IP, headers, cookies and body into a [`middleware::RequestRecord`], calls
//!   your hooks before and after the handler, resolves the caller's identity
//!   and measures how long the handler took.
//!
//! What happens with the captured data (a database, a queue, a dashboard) is
//! up to the hooks you install.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use reqwatch::{Request, Response, Server, StatusCode};
//! use reqwatch::middleware::{AccessLog, RequestTracker};
//!
//! #[tokio::main]
//! async fn main() {
//!     let tracker = RequestTracker::new()
//!         .on_request_complete(|record| {
//!             tracing::info!(ip = %record.client_ip, took = ?record.time_taken, "{}", record.url);
//!         });
//!
//!     let app = AccessLog::wrap(tracker.wrap(create_user));
//!     Server::bind("0.0.0.0:3000").serve(app).await.unwrap();
//! }
//!
//! async fn create_user(mut req: Request) -> Response {
//!     // The tracker already read the body once; the handler still gets it.
//!     let body = req.read_body().await.unwrap_or_default();
//!     if body.is_empty() {
//!         return Response::status(StatusCode::BAD_REQUEST);
//!     }
//!     Response::builder()
//!         .status(StatusCode::CREATED)
//!         .header("location", "/users/99")
//!         .json(body.to_vec())
//! }
//! ```

mod error;
mod handler;
mod request;
mod response;
mod server;

pub mod middleware;

pub use error::{BoxError, Error};
pub use handler::Handler;
pub use http::{Method, StatusCode};
pub use request::Request;
pub use response::{IntoResponse, Response, ResponseBuilder};
pub use server::Server;
