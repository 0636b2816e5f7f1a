//! Incoming HTTP request type.

use bytes::Bytes;
use http::{HeaderMap, Method, Uri};
use http_body::Body;
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Full};

use crate::error::{BoxError, Error};

type BoxBody = UnsyncBoxBody<Bytes, BoxError>;

/// An incoming HTTP request.
///
/// The head (method, URI, headers) is parsed up front. The body
/// is a stream that is read at most once: [`read_body`](Request::read_body)
/// drains it, and [`set_body`](Request::set_body) puts a fresh, fully
/// buffered body back for whoever runs next.
pub struct Request {
    parts: http::request::Parts,
    body: BoxBody,
}

impl Request {
    /// Builds a request from any `http::Request` whose body yields [`Bytes`].
    ///
    /// The server does this for every `hyper::body::Incoming` request; tests
    /// and embedders can pass `Full`, `Empty` or their own body types.
    pub fn new<B>(req: http::Request<B>) -> Self
    where
        B: Body<Data = Bytes> + Send + 'static,
        B::Error: Into<BoxError>,
    {
        let (parts, body) = req.into_parts();
        Self { parts, body: body.map_err(Into::into).boxed_unsync() }
    }

    pub fn method(&self) -> &Method { &self.parts.method }
    pub fn uri(&self) -> &Uri { &self.parts.uri }
    pub fn path(&self) -> &str { self.parts.uri.path() }

    /// Request target as the client asked for it: path and query only.
    ///
    /// HTTP/2 requests carry scheme and authority in `uri()`; they are left
    /// out here so the same request reads the same on either protocol.
    pub fn url(&self) -> &str {
        self.parts.uri.path_and_query().map_or("/", |pq| pq.as_str())
    }
    pub fn headers(&self) -> &HeaderMap { &self.parts.headers }

    /// Case-insensitive header lookup. Returns the first value only, and only
    /// if it is visible ASCII.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.parts.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Reads the whole body stream into memory.
    ///
    /// The stream is consumed either way: afterwards the request carries an
    /// empty body until [`set_body`](Request::set_body) installs a new one.
    pub async fn read_body(&mut self) -> Result<Bytes, Error> {
        let body = std::mem::replace(&mut self.body, full(Bytes::new()));
        body.collect()
            .await
            .map(|collected| collected.to_bytes())
            .map_err(Error::BodyRead)
    }

    /// Replaces the body with an independent reader over `bytes`.
    pub fn set_body(&mut self, bytes: Bytes) {
        self.body = full(bytes);
    }

    #[cfg(test)]
    pub(crate) fn empty(method: &str, uri: &str) -> Self {
        let req = http::Request::builder()
            .method(method)
            .uri(uri)
            .body(http_body_util::Empty::<Bytes>::new())
            .expect("valid test request");
        Self::new(req)
    }
}

fn full(bytes: Bytes) -> BoxBody {
    Full::new(bytes).map_err(|never| match never {}).boxed_unsync()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_body(body: &'static str) -> Request {
        let req = http::Request::post("/users?page=2")
            .header("content-type", "application/json")
            .body(Full::new(Bytes::from_static(body.as_bytes())))
            .unwrap();
        Request::new(req)
    }

    #[test]
    fn exposes_the_request_head() {
        let req = with_body("");
        assert_eq!(req.method(), Method::POST);
        assert_eq!(req.path(), "/users");
        assert_eq!(req.uri().to_string(), "/users?page=2");
        assert_eq!(req.header("Content-Type"), Some("application/json"));
        assert_eq!(req.header("x-missing"), None);
    }

    #[test]
    fn url_drops_scheme_and_authority() {
        let req = Request::empty("GET", "http://example.com:8080/user?x=1");
        assert_eq!(req.url(), "/user?x=1");

        assert_eq!(Request::empty("GET", "/user").url(), "/user");
    }

    #[tokio::test]
    async fn body_is_consumed_by_the_first_read() {
        let mut req = with_body("hello");
        assert_eq!(req.read_body().await.unwrap(), "hello");
        assert_eq!(req.read_body().await.unwrap(), "");
    }

    #[tokio::test]
    async fn set_body_makes_the_bytes_readable_again() {
        let mut req = with_body("hello");
        let bytes = req.read_body().await.unwrap();
        req.set_body(bytes.clone());

        assert_eq!(req.read_body().await.unwrap(), bytes);
    }
}
