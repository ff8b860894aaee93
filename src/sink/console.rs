//! Human-readable audit lines on the process console.

use std::time::Duration;

use super::{RequestHead, ResponseHead, Sink, format_line};
use crate::http_error::HttpError;

/// `tracing` target carrying audit lines, so they can be filtered
/// separately (`RUST_LOG=teller::access=off`).
pub const ACCESS_TARGET: &str = "teller::access";

/// Emits one `tracing` event per request on the [`ACCESS_TARGET`] target.
///
/// Successes log at `INFO`, client errors at `WARN`, server errors at
/// `ERROR`. The installed subscriber decides where the line ends up
/// (stderr with the default setup).
#[derive(Clone, Copy, Debug, Default)]
pub struct ConsoleSink;

impl ConsoleSink {
    pub fn new() -> Self {
        Self
    }
}

impl Sink for ConsoleSink {
    fn record(
        &self,
        response: &ResponseHead,
        request: &RequestHead,
        error: Option<&HttpError>,
        elapsed: Duration,
    ) {
        let line = format_line(response, request, error, elapsed);
        match error {
            None => tracing::info!(target: ACCESS_TARGET, "{line}"),
            Some(e) if e.is_server_error() => {
                tracing::error!(target: ACCESS_TARGET, status = e.status_code(), "{line}")
            }
            Some(e) => tracing::warn!(target: ACCESS_TARGET, status = e.status_code(), "{line}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use http::{Method, StatusCode};

    use super::super::test_support::head;
    use super::*;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn capture(f: impl FnOnce()) -> String {
        let out = Captured::default();
        let writer = out.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        let bytes = out.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn success_line_at_info() {
        let response = ResponseHead {
            status: Some(StatusCode::OK),
            headers: vec![("content-type".to_owned(), "text/plain".to_owned())],
        };
        let out = capture(|| {
            ConsoleSink::new().record(&response, &head(Method::GET, "/user"), None, Duration::from_millis(5));
        });

        assert_eq!(out.lines().count(), 1);
        assert!(out.contains("INFO"));
        assert!(out.contains(ACCESS_TARGET));
        assert!(out.contains("GET /user 5ms headers request{accept: */*} response{content-type: text/plain}"));
    }

    #[test]
    fn error_lines_carry_code_and_level() {
        let bad = HttpError::bad_request("username or password is empty");
        let out = capture(|| {
            ConsoleSink::new().record(&ResponseHead::default(), &head(Method::POST, "/login"), Some(&bad), Duration::ZERO);
        });
        assert!(out.contains("WARN"));
        assert!(out.contains("error 400 username or password is empty"));

        let internal = HttpError::internal_server_error("template missing");
        let out = capture(|| {
            ConsoleSink::new().record(&ResponseHead::default(), &head(Method::GET, "/admin"), Some(&internal), Duration::ZERO);
        });
        assert!(out.contains("ERROR"));
        assert!(out.contains("status=500"));
        assert!(out.contains("cause: template missing"));
    }
}
