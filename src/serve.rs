use std::io;
use std::net::TcpListener;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    response::Response,
    routing::get,
    Router,
};
use tokio::signal;
use tower_http::compression::CompressionLayer;

/// Maximum number of consecutive ports to try before giving up.
const MAX_PORT_ATTEMPTS: u16 = 100;

/// Shared application state passed to all request handlers via `Arc<AppState>`.
///
/// The page is rendered once before the server starts and never changes, so
/// handlers only read from it.
pub struct AppState {
    /// The complete HTML document.
    pub page: String,
    /// Strong validator for conditional requests.
    pub etag: String,
    /// Startup time, truncated to whole seconds (HTTP dates have no fraction).
    pub last_modified: SystemTime,
}

impl AppState {
    pub fn new(page: String) -> Self {
        let now_secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let last_modified = UNIX_EPOCH + std::time::Duration::from_secs(now_secs);
        let etag = format!("\"{:x}-{:x}\"", page.len(), now_secs);
        Self {
            page,
            etag,
            last_modified,
        }
    }
}

/// Attempt to bind a TCP listener on `bind_addr` starting at `start_port`.
///
/// On `EADDRINUSE` the port is incremented by one and the attempt is retried up
/// to `MAX_PORT_ATTEMPTS` times.  Any other OS error causes an immediate failure
/// without further retries.
///
/// Returns the bound `TcpListener` and the actual port on success, or a
/// descriptive `String` error on failure.
pub fn bind_with_retry(bind_addr: &str, start_port: u16) -> Result<(TcpListener, u16), String> {
    let mut port = start_port;
    eprintln!("[bind] trying port={}", port);
    for _ in 0..MAX_PORT_ATTEMPTS {
        let addr = format!("{}:{}", bind_addr, port);
        match TcpListener::bind(&addr) {
            Ok(listener) => {
                eprintln!("[bind] success port={}", port);
                return Ok((listener, port));
            }
            Err(e) if e.kind() == io::ErrorKind::AddrInUse => {
                let next = port.wrapping_add(1);
                eprintln!("[bind] EADDRINUSE, trying {}", next);
                port = next;
            }
            Err(e) => {
                return Err(format!("bind {}:{} failed: {}", bind_addr, port, e));
            }
        }
    }
    Err(format!(
        "exhausted {} port candidates starting at {}; all ports in use",
        MAX_PORT_ATTEMPTS, start_port,
    ))
}

// ---------------------------------------------------------------------------
// Conditional request helpers
// ---------------------------------------------------------------------------

/// `If-None-Match` matches when any listed tag equals ours, or on `*`.
fn etag_matches(if_none_match: &str, etag: &str) -> bool {
    if_none_match
        .split(',')
        .map(|t| t.trim())
        .any(|t| t == "*" || t == etag || t.strip_prefix("W/") == Some(etag))
}

/// Decide whether the client's cached copy is still current.
///
/// `If-None-Match` takes precedence over `If-Modified-Since` when both are
/// present (RFC 9110 §13.2.2).
fn is_not_modified(headers: &HeaderMap, state: &AppState) -> bool {
    if let Some(inm) = headers
        .get(header::IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok())
    {
        return etag_matches(inm, &state.etag);
    }
    if let Some(ims) = headers
        .get(header::IF_MODIFIED_SINCE)
        .and_then(|v| v.to_str().ok())
    {
        if let Ok(since) = httpdate::parse_http_date(ims) {
            return state.last_modified <= since;
        }
    }
    false
}

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

/// 404 Not Found with mandatory security headers.
fn not_found_response() -> Response {
    Response::builder()
        .status(StatusCode::NOT_FOUND)
        .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
        .header("X-Content-Type-Options", "nosniff")
        .body(Body::from("Not Found"))
        .expect("not_found_response builder is infallible")
}

fn not_modified_response(state: &AppState) -> Response {
    Response::builder()
        .status(StatusCode::NOT_MODIFIED)
        .header(header::ETAG, state.etag.as_str())
        .header(
            header::LAST_MODIFIED,
            httpdate::fmt_http_date(state.last_modified),
        )
        .header("X-Content-Type-Options", "nosniff")
        .body(Body::empty())
        .expect("not_modified_response builder is infallible")
}

// ---------------------------------------------------------------------------
// Axum request handlers
// ---------------------------------------------------------------------------

/// Serve the prerendered page, honoring conditional request headers.
async fn page_handler(State(state): State<Arc<AppState>>, req: Request) -> Response {
    let path = req.uri().path().to_owned();

    if is_not_modified(req.headers(), &state) {
        eprintln!("[request] path={path} mode=not-modified");
        return not_modified_response(&state);
    }

    eprintln!("[request] path={path} mode=page size={}", state.page.len());
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/html; charset=utf-8")
        .header(header::ETAG, state.etag.as_str())
        .header(
            header::LAST_MODIFIED,
            httpdate::fmt_http_date(state.last_modified),
        )
        .header(header::CACHE_CONTROL, "no-cache")
        .header("X-Content-Type-Options", "nosniff")
        .body(Body::from(state.page.clone()))
        .expect("page response builder is infallible")
}

async fn fallback_handler(req: Request) -> Response {
    eprintln!("[request] path={} mode=not-found", req.uri().path());
    not_found_response()
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(page_handler))
        .route("/index.html", get(page_handler))
        .fallback(fallback_handler)
        .layer(CompressionLayer::new())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Server entry point
// ---------------------------------------------------------------------------

/// Serve `page` over HTTP.
///
/// Binds to `bind_addr` starting at `start_port`, retrying on `EADDRINUSE` up
/// to 100 times.  The server shuts down cleanly when SIGINT (Ctrl+C) is
/// received.
pub async fn run_serve(page: String, bind_addr: String, start_port: u16) -> io::Result<()> {
    let state = Arc::new(AppState::new(page));

    let (std_listener, bound_port) =
        bind_with_retry(&bind_addr, start_port).map_err(|msg| {
            eprintln!("Error: {}", msg);
            io::Error::new(io::ErrorKind::AddrInUse, msg)
        })?;

    std_listener.set_nonblocking(true)?;
    let listener = tokio::net::TcpListener::from_std(std_listener)?;

    let app = router(state);

    println!("Serving on http://{}:{}/", bind_addr, bound_port);
    eprintln!("[serve] listening on {}:{}", bind_addr, bound_port);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            signal::ctrl_c()
                .await
                .expect("failed to install SIGINT handler");
            eprintln!("[shutdown] complete");
        })
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use std::time::Duration;

    fn state() -> AppState {
        AppState::new("<!DOCTYPE html><p>hi</p>".to_owned())
    }

    // --- AppState ---

    #[test]
    fn etag_is_quoted_and_stable() {
        let s = state();
        assert!(s.etag.starts_with('"') && s.etag.ends_with('"'));
        assert!(s.etag.starts_with("\"18-"), "len 24 = 0x18, got {}", s.etag);
    }

    #[test]
    fn last_modified_has_whole_seconds() {
        let s = state();
        let nanos = s
            .last_modified
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .subsec_nanos();
        assert_eq!(nanos, 0);
    }

    // --- etag_matches ---

    #[test]
    fn etag_exact_match() {
        assert!(etag_matches("\"abc\"", "\"abc\""));
    }

    #[test]
    fn etag_list_match() {
        assert!(etag_matches("\"x\", \"abc\"", "\"abc\""));
    }

    #[test]
    fn etag_weak_and_wildcard_match() {
        assert!(etag_matches("W/\"abc\"", "\"abc\""));
        assert!(etag_matches("*", "\"abc\""));
    }

    #[test]
    fn etag_mismatch() {
        assert!(!etag_matches("\"other\"", "\"abc\""));
        assert!(!etag_matches("", "\"abc\""));
    }

    // --- is_not_modified ---

    #[test]
    fn no_conditional_headers_is_modified() {
        assert!(!is_not_modified(&HeaderMap::new(), &state()));
    }

    #[test]
    fn if_none_match_takes_precedence() {
        let s = state();
        let mut headers = HeaderMap::new();
        headers.insert(header::IF_NONE_MATCH, HeaderValue::from_static("\"stale\""));
        let future = httpdate::fmt_http_date(s.last_modified + Duration::from_secs(3600));
        headers.insert(
            header::IF_MODIFIED_SINCE,
            HeaderValue::from_str(&future).unwrap(),
        );
        assert!(!is_not_modified(&headers, &s));
    }

    #[test]
    fn modified_since_now_or_later_is_not_modified() {
        let s = state();
        let mut headers = HeaderMap::new();
        headers.insert(
            header::IF_MODIFIED_SINCE,
            HeaderValue::from_str(&httpdate::fmt_http_date(s.last_modified)).unwrap(),
        );
        assert!(is_not_modified(&headers, &s));
    }

    #[test]
    fn modified_since_earlier_is_modified() {
        let s = state();
        let mut headers = HeaderMap::new();
        let earlier = httpdate::fmt_http_date(s.last_modified - Duration::from_secs(3600));
        headers.insert(
            header::IF_MODIFIED_SINCE,
            HeaderValue::from_str(&earlier).unwrap(),
        );
        assert!(!is_not_modified(&headers, &s));
    }

    #[test]
    fn unparseable_modified_since_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(header::IF_MODIFIED_SINCE, HeaderValue::from_static("yesterday"));
        assert!(!is_not_modified(&headers, &state()));
    }

    // --- bind_with_retry ---

    #[test]
    fn bind_skips_port_in_use() {
        let blocker = TcpListener::bind("127.0.0.1:0").unwrap();
        let busy = blocker.local_addr().unwrap().port();
        let (_listener, port) = bind_with_retry("127.0.0.1", busy).unwrap();
        assert_ne!(port, busy);
    }

    // --- handlers ---

    #[tokio::test]
    async fn page_handler_serves_page() {
        let s = Arc::new(state());
        let req = Request::builder().uri("/").body(Body::empty()).unwrap();
        let resp = page_handler(State(s.clone()), req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get(header::ETAG).unwrap().to_str().unwrap(),
            s.etag
        );
        assert_eq!(
            resp.headers().get("X-Content-Type-Options").unwrap(),
            "nosniff"
        );
    }

    #[tokio::test]
    async fn page_handler_returns_304_on_etag() {
        let s = Arc::new(state());
        let req = Request::builder()
            .uri("/")
            .header(header::IF_NONE_MATCH, s.etag.as_str())
            .body(Body::empty())
            .unwrap();
        let resp = page_handler(State(s), req).await;
        assert_eq!(resp.status(), StatusCode::NOT_MODIFIED);
    }

    #[tokio::test]
    async fn fallback_is_404() {
        let req = Request::builder()
            .uri("/mohw_logo.png")
            .body(Body::empty())
            .unwrap();
        let resp = fallback_handler(req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            resp.headers().get("X-Content-Type-Options").unwrap(),
            "nosniff"
        );
    }
}
