//! Request capture with lifecycle hooks.
//!
//! [`RequestTracker`] builds a [`RequestRecord`] for every request it wraps and
//! hands it to the host application at two points:
//!
//! | Hook | When | Record state |
//! |---|---|---|
//! | `on_request` | before the inner handler runs | identity empty, `time_taken` zero |
//! | `on_request_complete` | after the inner handler returned | identity resolved, `time_taken` set |
//!
//! The body is read in full to fill the record and then put back, so the
//! inner handler reads exactly the bytes the client sent.
//!
//! Hooks run inline on the request's task. They must be cheap, and they must
//! be safe to call from many requests at once. A panicking hook is not caught:
//! it unwinds through the wrapped handler like any other handler panic.

use std::sync::Arc;
use std::time::Instant;

use tracing::warn;

use crate::error::Error;
use crate::handler::{BoxedHandler, Handler};
use crate::request::Request;
use crate::response::Response;

use super::record::RequestRecord;

type RecordHook = Arc<dyn Fn(&RequestRecord) + Send + Sync>;
type ErrorHook = Arc<dyn Fn(&Error) + Send + Sync>;
type Identify = Arc<dyn Fn(&RequestRecord) -> String + Send + Sync>;

/// Request-tracking decorator and its hook configuration.
///
/// Configure once at startup, then wrap handlers with it. Every hook is
/// optional; a missing hook is simply not called.
///
/// ```rust,no_run
/// use reqwatch::{Request, Response, Server};
/// use reqwatch::middleware::RequestTracker;
///
/// # async fn run() -> Result<(), reqwatch::Error> {
/// async fn echo(mut req: Request) -> Response {
///     let body = req.read_body().await.unwrap_or_default();
///     Response::json(body.to_vec())
/// }
///
/// let tracker = RequestTracker::new()
///     .on_request(|record| tracing::info!(url = %record.url, "request observed"))
///     .on_request_complete(|record| {
///         tracing::info!(url = %record.url, took = ?record.time_taken, user = %record.identity_id, "request done")
///     })
///     .on_error(|err| tracing::warn!("tracking failed: {err}"));
///
/// Server::bind("0.0.0.0:3000").serve(tracker.wrap(echo)).await
/// # }
/// ```
#[derive(Clone, Default)]
pub struct RequestTracker {
    on_request: Option<RecordHook>,
    on_request_complete: Option<RecordHook>,
    on_error: Option<ErrorHook>,
    identify: Option<Identify>,
}

impl RequestTracker {
    /// A tracker with no hooks. It still buffers and restores the body.
    pub fn new() -> Self {
        Self::default()
    }

    /// Called with the freshly captured record, before the inner handler runs.
    pub fn on_request(mut self, hook: impl Fn(&RequestRecord) + Send + Sync + 'static) -> Self {
        self.on_request = Some(Arc::new(hook));
        self
    }

    /// Called with the completed record after the inner handler returned.
    pub fn on_request_complete(
        mut self,
        hook: impl Fn(&RequestRecord) + Send + Sync + 'static,
    ) -> Self {
        self.on_request_complete = Some(Arc::new(hook));
        self
    }

    /// Called when tracking itself fails. Today that is only
    /// [`Error::BodyRead`]; the request is still handed to the inner handler.
    pub fn on_error(mut self, hook: impl Fn(&Error) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Arc::new(hook));
        self
    }

    /// Resolves the caller's identity once the inner handler has returned.
    ///
    /// Running after the handler lets auth or session code further down the
    /// chain establish who the caller is and publish it somewhere the resolver
    /// can read. An empty string means "unknown" and leaves
    /// [`RequestRecord::identity_id`] empty.
    pub fn identify(
        mut self,
        resolver: impl Fn(&RequestRecord) -> String + Send + Sync + 'static,
    ) -> Self {
        self.identify = Some(Arc::new(resolver));
        self
    }

    /// Wraps `inner` with request tracking.
    ///
    /// The hook set is shared by every request the returned handler serves;
    /// configuring the tracker further does not affect handlers already
    /// wrapped.
    pub fn wrap<H: Handler>(&self, inner: H) -> impl Handler + use<H> {
        let tracker = Arc::new(self.clone());
        let inner = inner.into_boxed_handler();
        move |req: Request| {
            let tracker = Arc::clone(&tracker);
            let inner = Arc::clone(&inner);
            async move { tracker.track(req, inner).await }
        }
    }

    async fn track(&self, mut req: Request, inner: BoxedHandler) -> Response {
        let started = Instant::now();
        let mut record = RequestRecord::capture(&req);

        match req.read_body().await {
            Ok(body) => {
                req.set_body(body.clone());
                record.body = body;
            }
            Err(err) => {
                warn!(method = %record.method, url = %record.url, "{err}");
                if let Some(on_error) = &self.on_error {
                    on_error(&err);
                }
            }
        }

        if let Some(on_request) = &self.on_request {
            on_request(&record);
        }

        let response = inner.call(req).await;

        if let Some(identify) = &self.identify {
            let identity = identify(&record);
            if !identity.is_empty() {
                record.identity_id = identity;
            }
        }
        record.time_taken = started.elapsed();

        if let Some(on_request_complete) = &self.on_request_complete {
            on_request_complete(&record);
        }

        response
    }
}
