//! Middleware layer.
//!
//! Both middlewares are decorators: they take a [`Handler`](crate::Handler)
//! and return a new one that behaves the same from the outside, with
//! observation added around the call. They compose by plain nesting and the
//! caller picks the order:
//!
//! ```rust,no_run
//! use reqwatch::{Request, Server};
//! use reqwatch::middleware::{AccessLog, RequestTracker};
//!
//! # async fn run() -> Result<(), reqwatch::Error> {
//! async fn app(_req: Request) -> &'static str { "ok" }
//!
//! let tracker = RequestTracker::new()
//!     .on_request_complete(|record| tracing::info!(took = ?record.time_taken, "{}", record.url));
//!
//! // client → AccessLog → RequestTracker → app
//! Server::bind("0.0.0.0:3000")
//!     .serve(AccessLog::wrap(tracker.wrap(app)))
//!     .await
//! # }
//! ```
//!
//! - [`AccessLog`] — one colored `METHOD URL STATUS ELAPSED` line per request.
//! - [`RequestTracker`] — full request capture with before / after hooks and
//!   caller identity resolution.

mod access_log;
mod record;
mod request_tracker;

pub use access_log::AccessLog;
pub use record::{FORWARDED_FOR, RequestRecord};
pub use request_tracker::RequestTracker;
