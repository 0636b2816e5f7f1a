//! Per-request access log line.
//!
//! ```text
//! GET /users/42 200 1.873ms
//! ```
//!
//! The status is painted by class: 2xx green, 3xx cyan, anything else red.
//! The colors are raw ANSI escapes inside the message; setting a non-empty
//! `NO_COLOR` in the environment before [`AccessLog::wrap`] runs turns them
//! off for that wrapper.
//! Lines are emitted as `INFO` events with target `reqwatch::access_log`, so a
//! host can route or silence them with an `EnvFilter` directive.

use std::sync::Arc;
use std::time::Instant;

use http::StatusCode;
use nu_ansi_term::Color;
use tracing::info;

use crate::handler::Handler;
use crate::request::Request;
use crate::response::Response;

/// Access-log decorator.
///
/// ```rust,no_run
/// use reqwatch::{Request, Server};
/// use reqwatch::middleware::AccessLog;
///
/// # async fn run() -> Result<(), reqwatch::Error> {
/// async fn hello(_req: Request) -> &'static str { "hello" }
///
/// Server::bind("0.0.0.0:3000").serve(AccessLog::wrap(hello)).await
/// # }
/// ```
pub struct AccessLog;

impl AccessLog {
    /// Wraps `inner` so every request it serves produces one log line.
    ///
    /// Nothing about the request or the response is altered.
    pub fn wrap(inner: impl Handler) -> impl Handler {
        let inner = inner.into_boxed_handler();
        let colored = !no_color();
        move |req: Request| {
            let inner = Arc::clone(&inner);
            async move {
                let start = Instant::now();
                let method = req.method().clone();
                let url = req.url().to_owned();

                let mut observer = ResponseObserver::default();
                let response = observer.observe(inner.call(req).await);

                info!(
                    target: "reqwatch::access_log",
                    "{} {} {} {:?}",
                    method,
                    url,
                    paint(observer.status, colored),
                    start.elapsed(),
                );
                response
            }
        }
    }
}

/// Records the status of the response passing through it.
///
/// Responses are returned values here, so "observing" means reading the status
/// off the value and handing the same value back. A response that never had
/// its status set explicitly reports `200`.
#[derive(Debug)]
struct ResponseObserver {
    status: StatusCode,
}

impl Default for ResponseObserver {
    fn default() -> Self {
        Self { status: StatusCode::OK }
    }
}

impl ResponseObserver {
    fn observe(&mut self, response: Response) -> Response {
        self.status = response.status_code();
        response
    }
}

fn no_color() -> bool {
    std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty())
}

fn paint(status: StatusCode, colored: bool) -> String {
    if !colored {
        return status.as_str().to_owned();
    }
    let color = if status.is_success() {
        Color::Green
    } else if status.is_redirection() {
        Color::Cyan
    } else {
        Color::Red
    };
    color.paint(status.as_str()).to_string()
}
