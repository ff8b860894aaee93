//! Audit sinks.
//!
//! A [`Sink`] records one completed request: what was asked, what was
//! answered, how long it took and, if it failed, the [`HttpError`].
//!
//! ```text
//! with_logging ──record──▶ FanoutSink ─┬─▶ SegregatedFileSink ─┬─▶ logs/http-request.log
//!                                      │                       ├─▶ logs/bad-request.log
//!                                      │                       └─▶ logs/internal-server-error.log
//!                                      └─▶ ConsoleSink ──────────▶ tracing (teller::access)
//! ```
//!
//! The installed sink is chosen once, at startup, by [`install`], and is
//! read-only afterwards. Sinks are best-effort: they swallow their own I/O
//! failures and must never fail or block the request beyond the write itself.

mod console;
mod fanout;
mod file;

use std::fmt::{self, Write as _};
use std::sync::Arc;
use std::time::Duration;

use http::{Method, StatusCode, Uri};

use crate::config::Config;
use crate::http_error::HttpError;
use crate::request::Request;
use crate::response::Response;

pub use console::{ACCESS_TARGET, ConsoleSink};
pub use fanout::FanoutSink;
pub use file::{
    BAD_REQUEST_LOG_FILE, HTTP_REQUEST_LOG_FILE, INTERNAL_SERVER_ERROR_LOG_FILE, SegregatedFileSink,
};

/// Records one completed request.
///
/// Implementations must not panic and must not propagate I/O failures.
pub trait Sink: Send + Sync {
    fn record(
        &self,
        response: &ResponseHead,
        request: &RequestHead,
        error: Option<&HttpError>,
        elapsed: Duration,
    );
}

/// The shared, process-wide sink handle.
pub type SharedSink = Arc<dyn Sink>;

/// Snapshot of the request taken before the handler consumes it.
#[derive(Clone, Debug)]
pub struct RequestHead {
    pub method: Method,
    pub uri: Uri,
    pub headers: Vec<(String, String)>,
}

impl From<&Request> for RequestHead {
    fn from(req: &Request) -> Self {
        Self {
            method: req.method().clone(),
            uri: req.uri().clone(),
            headers: req.headers().to_vec(),
        }
    }
}

/// What the handler had answered when the record was taken.
///
/// `status` is `None` when the handler failed: the error envelope is written
/// later, by `with_errors`.
#[derive(Clone, Debug, Default)]
pub struct ResponseHead {
    pub status: Option<StatusCode>,
    pub headers: Vec<(String, String)>,
}

impl From<&Response> for ResponseHead {
    fn from(res: &Response) -> Self {
        Self { status: Some(res.status_code()), headers: res.headers().to_vec() }
    }
}

/// Builds the sink installed for this process.
///
/// Returns `None` when auditing is disabled. Otherwise a fan-out of the
/// segregated file sink and the console sink; a file sink that fails to
/// open leaves an empty slot and auditing continues on the console.
pub fn install(config: &Config) -> Option<SharedSink> {
    if !config.logging_enabled() {
        tracing::info!("request audit disabled");
        return None;
    }

    let file = match file::prepare_storage(&config.files_dir)
        .and_then(|()| SegregatedFileSink::open(&config.log_dir))
    {
        Ok(sink) => Some(Arc::new(sink) as SharedSink),
        Err(e) => {
            tracing::error!(error = %e, "file audit sink unavailable");
            None
        }
    };

    let console = Some(Arc::new(ConsoleSink::new()) as SharedSink);
    let fanout = FanoutSink::new(vec![file, console]);

    tracing::info!(
        log_dir = %config.log_dir.display(),
        sinks = fanout.active(),
        "request audit enabled"
    );

    Some(Arc::new(fanout) as SharedSink)
}

// ── Line format ───────────────────────────────────────────────────────────────

/// Renders the audit line shared by the console and file sinks:
///
/// ```text
/// POST /login 1.2ms error 400 username or password is empty headers request{accept: */*} response{}
/// ```
pub(crate) fn format_line(
    response: &ResponseHead,
    request: &RequestHead,
    error: Option<&HttpError>,
    elapsed: Duration,
) -> String {
    // Writing into a String cannot fail.
    let mut line = format!("{} {} {:?}", request.method, request.uri, elapsed);
    if let Some(e) = error {
        let _ = write!(line, " error {} {}", e.status_code(), e.message());
        if let Some(cause) = e.cause() {
            let _ = write!(line, " (cause: {cause})");
        }
    }
    let _ = write!(
        line,
        " headers request{{{}}} response{{{}}}",
        HeaderSnapshot(&request.headers),
        HeaderSnapshot(&response.headers),
    );
    line
}

/// `name: value, name: value`: header lists as they appear in audit lines.
pub(crate) struct HeaderSnapshot<'a>(pub(crate) &'a [(String, String)]);

impl fmt::Display for HeaderSnapshot<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}: {value}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Mutex;

    use super::*;

    /// One captured `record` call.
    #[derive(Clone, Debug)]
    pub(crate) struct Recorded {
        pub(crate) status: Option<StatusCode>,
        pub(crate) uri: String,
        pub(crate) error: Option<HttpError>,
        pub(crate) elapsed: Duration,
    }

    /// Sink that keeps every call in memory.
    #[derive(Default)]
    pub(crate) struct MemorySink {
        pub(crate) calls: Mutex<Vec<Recorded>>,
    }

    impl MemorySink {
        pub(crate) fn calls(&self) -> Vec<Recorded> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl Sink for MemorySink {
        fn record(
            &self,
            response: &ResponseHead,
            request: &RequestHead,
            error: Option<&HttpError>,
            elapsed: Duration,
        ) {
            self.calls.lock().unwrap().push(Recorded {
                status: response.status,
                uri: request.uri.to_string(),
                error: error.cloned(),
                elapsed,
            });
        }
    }

    pub(crate) fn head(method: Method, uri: &str) -> RequestHead {
        RequestHead {
            method,
            uri: uri.parse().unwrap(),
            headers: vec![("accept".to_owned(), "*/*".to_owned())],
        }
    }
}
