use bytes::Bytes;
use http::header::{AUTHORIZATION, COOKIE, PROXY_AUTHORIZATION, SET_COOKIE};
use http::{HeaderMap, Request, Response};
use kit_std::{GetElapsed, GetNow, SystemClock};
use tracing::{Level, error, warn};

use crate::{RoundTrip, TransportError};

const REDACTED: &str = "[REDACTED]";

macro_rules! event_at {
    ($level:expr, $($arg:tt)+) => {
        if $level == Level::ERROR {
            ::tracing::error!($($arg)+)
        } else if $level == Level::WARN {
            ::tracing::warn!($($arg)+)
        } else if $level == Level::INFO {
            ::tracing::info!($($arg)+)
        } else if $level == Level::DEBUG {
            ::tracing::debug!($($arg)+)
        } else {
            ::tracing::trace!($($arg)+)
        }
    };
}

/// Logs every exchange: method, uri, status and elapsed time.
///
/// Server errors are logged at `warn` and transport failures at `error`
/// regardless of the configured level. Credentials are redacted from
/// header dumps.
#[derive(Debug, Clone)]
pub struct Logging<T, C = SystemClock> {
    inner: T,
    clock: C,
    level: Level,
    log_headers: bool,
    max_body_bytes: usize,
}

impl<T> Logging<T, SystemClock> {
    pub fn new(inner: T) -> Self {
        Self::with_clock(inner, SystemClock)
    }
}

impl<T, C> Logging<T, C> {
    pub fn with_clock(inner: T, clock: C) -> Self {
        Self {
            inner,
            clock,
            level: Level::DEBUG,
            log_headers: false,
            max_body_bytes: 0,
        }
    }

    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn log_headers(mut self, enabled: bool) -> Self {
        self.log_headers = enabled;
        self
    }

    /// Log up to `max` bytes of each response body. Zero disables it.
    pub fn log_body(mut self, max: usize) -> Self {
        self.max_body_bytes = max;
        self
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }
}

fn is_sensitive(name: &http::HeaderName) -> bool {
    name == AUTHORIZATION || name == PROXY_AUTHORIZATION || name == COOKIE || name == SET_COOKIE
}

pub(crate) fn format_headers(headers: &HeaderMap) -> String {
    headers
        .iter()
        .map(|(name, value)| {
            let value = if is_sensitive(name) {
                REDACTED
            } else {
                value.to_str().unwrap_or("<binary>")
            };
            format!("{name}: {value}")
        })
        .collect::<Vec<_>>()
        .join(", ")
}

pub(crate) fn body_preview(body: &[u8], max: usize) -> String {
    if body.len() <= max {
        return String::from_utf8_lossy(body).into_owned();
    }
    format!("{}… ({} bytes)", String::from_utf8_lossy(&body[..max]), body.len())
}

impl<T, C> RoundTrip for Logging<T, C>
where
    T: RoundTrip,
    C: GetNow + GetElapsed + Send + Sync,
{
    async fn round_trip(&self, request: Request<Bytes>) -> Result<Response<Bytes>, TransportError> {
        let method = request.method().clone();
        let uri = request.uri().clone();
        let request_headers = self.log_headers.then(|| format_headers(request.headers()));

        let start = self.clock.now();
        let result = self.inner.round_trip(request).await;
        let elapsed_ms = self.clock.elapsed(start).as_millis() as u64;

        let response = match &result {
            Ok(response) => response,
            Err(e) => {
                error!(%method, %uri, elapsed_ms, error = %e, "http request failed");
                return result;
            }
        };

        let status = response.status().as_u16();
        if response.status().is_server_error() {
            warn!(%method, %uri, status, elapsed_ms, "http request");
        } else {
            event_at!(self.level, %method, %uri, status, elapsed_ms, "http request");
        }

        if let Some(request_headers) = request_headers {
            let response_headers = format_headers(response.headers());
            event_at!(
                self.level,
                %method,
                %uri,
                request_headers = %request_headers,
                response_headers = %response_headers,
                "http headers"
            );
        }
        if self.max_body_bytes > 0 {
            let body = body_preview(response.body(), self.max_body_bytes);
            event_at!(self.level, %method, %uri, body = %body, "http body");
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use http::HeaderValue;
    use kit_std::MockClock;

    use super::*;
    use crate::testing::{Canned, Recorder};

    #[test]
    fn test_credentials_are_redacted() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer secret"));
        headers.insert(PROXY_AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        headers.insert(COOKIE, HeaderValue::from_static("session=1"));
        headers.insert(SET_COOKIE, HeaderValue::from_static("session=2"));
        headers.insert("x-request-id", HeaderValue::from_static("req-1"));

        let dump = format_headers(&headers);
        assert!(!dump.contains("secret"));
        assert!(!dump.contains("session="));
        assert!(!dump.contains("abc"));
        assert!(dump.contains("x-request-id: req-1"));
        assert_eq!(dump.matches(REDACTED).count(), 4);
    }

    #[test]
    fn test_body_preview_truncates() {
        assert_eq!(body_preview(b"short", 10), "short");
        assert_eq!(body_preview(b"0123456789", 4), "0123… (10 bytes)");
    }

    #[tokio::test]
    async fn test_passes_response_through() {
        let canned = Canned::new(503).header("x-upstream", "a").body("down");
        let clock = MockClock::new();
        let logging = Logging::with_clock(&canned, clock.clone())
            .level(Level::INFO)
            .log_headers(true)
            .log_body(16);

        let response = logging.round_trip(Request::new(Bytes::new())).await.unwrap();
        assert_eq!(response.status(), 503);
        assert_eq!(response.body().as_ref(), b"down");
        assert_eq!(response.headers().get("x-upstream").unwrap(), "a");
        assert_eq!(canned.requests(), 1);
    }

    #[tokio::test]
    async fn test_passes_errors_through() {
        let canned = Canned::failing();
        let err = Logging::new(&canned)
            .round_trip(Request::new(Bytes::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_success_logs_at_configured_level() {
        let (recorder, _guard) = Recorder::install();
        let canned = Canned::new(200).body("ok");
        let clock = MockClock::new();
        let logging = Logging::with_clock(&canned, clock.clone()).level(Level::INFO);

        let request = Request::get("https://a.test/path").body(Bytes::new()).unwrap();
        logging.round_trip(request).await.unwrap();

        let events = recorder.with_message("http request");
        assert_eq!(events.len(), 1);
        let event = &events[0];
        assert_eq!(event.level, Level::INFO);
        assert_eq!(event.field("method"), Some("GET"));
        assert_eq!(event.field("uri"), Some("https://a.test/path"));
        assert_eq!(event.field("status"), Some("200"));
        assert!(event.field("elapsed_ms").is_some());
    }

    #[tokio::test]
    async fn test_server_errors_log_at_warn() {
        let (recorder, _guard) = Recorder::install();
        let canned = Canned::new(503);
        Logging::new(&canned)
            .level(Level::DEBUG)
            .round_trip(Request::new(Bytes::new()))
            .await
            .unwrap();

        let events = recorder.with_message("http request");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].level, Level::WARN);
        assert_eq!(events[0].field("status"), Some("503"));
    }

    #[tokio::test]
    async fn test_failures_log_at_error() {
        let (recorder, _guard) = Recorder::install();
        let canned = Canned::failing();
        Logging::new(&canned)
            .round_trip(Request::new(Bytes::new()))
            .await
            .unwrap_err();

        let events = recorder.with_message("http request failed");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].level, Level::ERROR);
        assert!(events[0].field("error").unwrap().contains("canned failure"));
        assert!(events[0].field("elapsed_ms").is_some());
        assert!(events[0].field("status").is_none());
    }

    #[tokio::test]
    async fn test_header_events_redact_credentials() {
        let (recorder, _guard) = Recorder::install();
        let canned = Canned::new(200).header("set-cookie", "session=abc");
        let request = Request::get("https://a.test/")
            .header(AUTHORIZATION, "Bearer hunter2")
            .header("x-request-id", "req-7")
            .body(Bytes::new())
            .unwrap();
        Logging::new(&canned)
            .log_headers(true)
            .round_trip(request)
            .await
            .unwrap();

        let events = recorder.with_message("http headers");
        assert_eq!(events.len(), 1);
        let request_headers = events[0].field("request_headers").unwrap();
        let response_headers = events[0].field("response_headers").unwrap();
        assert!(!request_headers.contains("hunter2"));
        assert!(request_headers.contains(REDACTED));
        assert!(request_headers.contains("x-request-id: req-7"));
        assert!(!response_headers.contains("session=abc"));
        assert!(response_headers.contains(REDACTED));
    }

    #[tokio::test]
    async fn test_headers_are_not_logged_by_default() {
        let (recorder, _guard) = Recorder::install();
        let canned = Canned::new(200);
        Logging::new(&canned)
            .round_trip(Request::new(Bytes::new()))
            .await
            .unwrap();

        assert!(recorder.with_message("http headers").is_empty());
        assert_eq!(recorder.with_message("http request").len(), 1);
    }
}
