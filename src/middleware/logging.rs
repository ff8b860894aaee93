//! Request timing and audit delivery.

use std::sync::Arc;
use std::time::Instant;

use crate::handler::{AppHandler, BoxHandlerFuture};
use crate::request::Request;
use crate::sink::{RequestHead, ResponseHead, SharedSink};

/// Wraps `handler` so every call is timed and reported to `sink`.
///
/// With `sink = None` the wrapper only forwards the call.
pub fn with_logging<H: AppHandler>(sink: Option<SharedSink>, handler: H) -> Logged<H> {
    Logged { inner: Arc::new(handler), sink }
}

/// An [`AppHandler`] that reports each outcome to the installed sink.
///
/// The record is written exactly once per call, after the inner handler has
/// resolved and before the result is handed back, so the caller renders
/// errors only after the audit line is down. The result itself is never
/// altered.
pub struct Logged<H> {
    inner: Arc<H>,
    sink: Option<SharedSink>,
}

impl<H: AppHandler> AppHandler for Logged<H> {
    fn call(&self, req: Request) -> BoxHandlerFuture {
        let inner = Arc::clone(&self.inner);
        let Some(sink) = self.sink.clone() else {
            return Box::pin(async move { inner.call(req).await });
        };

        let request = RequestHead::from(&req);
        Box::pin(async move {
            let start = Instant::now();
            let result = inner.call(req).await;
            let elapsed = start.elapsed();

            let response = result.as_ref().map(ResponseHead::from).unwrap_or_default();
            sink.record(&response, &request, result.as_ref().err(), elapsed);
            result
        })
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use http::{Method, StatusCode};

    use super::*;
    use crate::handler::HandlerResult;
    use crate::http_error::HttpError;
    use crate::request::test_support::request;
    use crate::response::Response;
    use crate::sink::test_support::MemorySink;

    async fn slow_ok(_req: Request) -> HandlerResult {
        tokio::time::sleep(Duration::from_millis(20)).await;
        Ok(Response::builder().header("x-served", "1").text("hi"))
    }

    async fn rejected(_req: Request) -> HandlerResult {
        Err(HttpError::forbidden("admins only"))
    }

    #[tokio::test]
    async fn one_record_per_call_with_bracketing_duration() {
        let sink = Arc::new(MemorySink::default());
        let logged = with_logging(Some(sink.clone() as SharedSink), slow_ok);

        let res = logged.call(request(Method::GET, "/user?x=1", &[], "")).await.unwrap();
        assert_eq!(res.body(), b"hi");

        let calls = sink.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].uri, "/user?x=1");
        assert_eq!(calls[0].status, Some(StatusCode::OK));
        assert!(calls[0].error.is_none());
        assert!(calls[0].elapsed >= Duration::from_millis(20));
    }

    #[tokio::test]
    async fn error_is_recorded_and_returned_unchanged() {
        let sink = Arc::new(MemorySink::default());
        let logged = with_logging(Some(sink.clone() as SharedSink), rejected);

        let err = logged.call(request(Method::GET, "/admin", &[], "")).await.unwrap_err();
        assert_eq!(err, HttpError::forbidden("admins only"));

        let calls = sink.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].error.as_ref(), Some(&err));
        assert_eq!(calls[0].status, None);
    }

    #[tokio::test]
    async fn without_sink_result_is_untouched() {
        let logged = with_logging(None, rejected);
        let err = logged.call(request(Method::GET, "/admin", &[], "")).await.unwrap_err();
        assert_eq!(err.status_code(), 403);
    }

    #[test]
    fn name_reports_wrapped_handler() {
        let logged = with_logging(None, rejected);
        assert!(logged.name().ends_with("rejected"));
    }
}
