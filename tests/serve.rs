//! End-to-end: both middlewares stacked in front of an app, driven over TCP.

use std::fmt;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::client::conn::{http1, http2};
use hyper_util::rt::{TokioExecutor, TokioIo};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

use reqwatch::middleware::{AccessLog, RequestRecord, RequestTracker};
use reqwatch::{Request, Response, Server, StatusCode};

/// Collects the message of every `reqwatch::access_log` event.
#[derive(Clone, Default)]
struct AccessLines(Arc<Mutex<Vec<String>>>);

struct Message(String);

impl Visit for Message {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{value:?}");
        }
    }
}

impl<S: Subscriber> Layer<S> for AccessLines {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if event.metadata().target() != "reqwatch::access_log" {
            return;
        }
        let mut message = Message(String::new());
        event.record(&mut message);
        self.0.lock().unwrap().push(message.0);
    }
}

async fn app(mut req: Request) -> Response {
    match req.path() {
        "/user" => match req.read_body().await {
            Ok(body) => Response::json(body.to_vec()),
            Err(_) => Response::status(StatusCode::BAD_REQUEST),
        },
        "/ok" => Response::text("OK"),
        _ => Response::status(StatusCode::NOT_FOUND),
    }
}

type Completed = Arc<Mutex<Vec<RequestRecord>>>;

struct Running {
    addr: SocketAddr,
    completed: Completed,
    stop: oneshot::Sender<()>,
    serving: JoinHandle<Result<(), reqwatch::Error>>,
}

impl Running {
    async fn start() -> Self {
        let completed: Completed = Arc::default();
        let sink = Arc::clone(&completed);
        let tracker = RequestTracker::new()
            .identify(|record| {
                record.cookies.get("user").and_then(|v| v.first()).cloned().unwrap_or_default()
            })
            .on_request_complete(move |record| sink.lock().unwrap().push(record.clone()));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let server = Server::from_listener(listener).unwrap();
        let addr = server.local_addr();
        let (stop, stopped) = oneshot::channel::<()>();
        let serving = tokio::spawn(server.serve_with_shutdown(
            AccessLog::wrap(tracker.wrap(app)),
            async move {
                let _ = stopped.await;
            },
        ));

        Self { addr, completed, stop, serving }
    }

    async fn shut_down(self) -> Vec<RequestRecord> {
        self.stop.send(()).unwrap();
        tokio::time::timeout(Duration::from_secs(5), self.serving)
            .await
            .expect("server drains")
            .unwrap()
            .unwrap();
        std::mem::take(&mut *self.completed.lock().unwrap())
    }
}

#[tokio::test]
async fn tracked_requests_round_trip_over_tcp() {
    let lines = AccessLines::default();
    let _guard = tracing::subscriber::set_default(tracing_subscriber::registry().with(lines.clone()));
    let running = Running::start().await;
    let addr = running.addr;

    let stream = TcpStream::connect(addr).await.unwrap();
    let (mut sender, conn) = http1::handshake(TokioIo::new(stream)).await.unwrap();
    let client = tokio::spawn(conn);

    let body = r#"{"name":"Joanne","email":"jo@nne.my"}"#;
    let req = http::Request::post("/user")
        .header("host", addr.to_string())
        .header("user-agent", "test-client")
        .header("x-forwarded-for", "192.168.0.1")
        .header("cookie", "user=jo@nne.my; theme=dark")
        .body(Full::new(Bytes::from_static(body.as_bytes())))
        .unwrap();
    let res = sender.send_request(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["content-type"], "application/json");
    let echoed = res.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(echoed, body);

    let req = http::Request::get("/missing")
        .header("host", addr.to_string())
        .body(Full::new(Bytes::new()))
        .unwrap();
    let res = sender.send_request(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    drop(sender);
    client.await.unwrap().unwrap();
    let completed = running.shut_down().await;
    assert_eq!(completed.len(), 2);

    let user = &completed[0];
    assert_eq!(user.method, "POST");
    assert_eq!(user.url, "/user");
    assert_eq!(user.client_ip, "192.168.0.1");
    assert_eq!(user.body, body);
    assert_eq!(user.identity_id, "jo@nne.my");
    assert_eq!(user.cookies["theme"], ["dark"]);
    assert!(user.time_taken > Duration::ZERO);

    let missing = &completed[1];
    assert_eq!(missing.url, "/missing");
    assert_eq!(missing.identity_id, "");
    assert_eq!(missing.client_ip, "");

    // Stacking the tracker under the access log still yields one line per
    // request, in order.
    let lines = std::mem::take(&mut *lines.0.lock().unwrap());
    assert_eq!(lines.len(), 2, "{lines:?}");
    assert!(lines[0].starts_with("POST /user "), "{:?}", lines[0]);
    assert!(lines[0].contains("200"), "{:?}", lines[0]);
    assert!(lines[1].starts_with("GET /missing "), "{:?}", lines[1]);
    assert!(lines[1].contains("404"), "{:?}", lines[1]);
}

#[tokio::test]
async fn http2_requests_record_path_and_query_only() {
    let lines = AccessLines::default();
    let _guard = tracing::subscriber::set_default(tracing_subscriber::registry().with(lines.clone()));
    let running = Running::start().await;
    let addr = running.addr;

    let stream = TcpStream::connect(addr).await.unwrap();
    let (mut sender, conn) = http2::handshake(TokioExecutor::new(), TokioIo::new(stream))
        .await
        .unwrap();
    let client = tokio::spawn(conn);

    // h2 sends scheme and authority as pseudo-headers, so the server-side
    // URI is absolute.
    let req = http::Request::get(format!("http://{addr}/user?x=1"))
        .header("cookie", "user=h2-client")
        .body(Full::new(Bytes::new()))
        .unwrap();
    let res = sender.send_request(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    res.into_body().collect().await.unwrap();

    drop(sender);
    client.await.unwrap().unwrap();
    let completed = running.shut_down().await;
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].url, "/user?x=1");
    assert_eq!(completed[0].identity_id, "h2-client");

    let lines = std::mem::take(&mut *lines.0.lock().unwrap());
    assert_eq!(lines.len(), 1, "{lines:?}");
    assert!(lines[0].starts_with("GET /user?x=1 "), "{:?}", lines[0]);
}
