//! Error rendering and panic isolation.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use serde::Serialize;

use crate::handler::{AppHandler, Handler};
use crate::http_error::HttpError;
use crate::request::Request;
use crate::response::Response;

/// The wire shape of every error answer: the error's own fields plus
/// `"error": true`.
#[derive(Serialize)]
struct Envelope<'a> {
    #[serde(flatten)]
    inner: &'a HttpError,
    #[serde(rename = "error")]
    is_error: bool,
}

/// Turns an [`AppHandler`] into a router [`Handler`].
///
/// This is the single recovery-and-reporting boundary of a request:
///
/// - `Ok(response)` is passed through untouched.
/// - `Err(e)` becomes `e.status_code()` with an `application/json` body
///   `{"statusCode":..,"message":..,"error":true}`.
/// - A panic anywhere in the wrapped chain is caught, logged together with
///   the handler's name, and answered with a generic 500 envelope. Nothing is
///   written to the connection before the chain returns, so the fallback
///   never collides with a partial response.
pub fn with_errors<H: AppHandler>(handler: H) -> impl Handler {
    let handler = Arc::new(handler);
    move |req: Request| {
        let handler = Arc::clone(&handler);
        async move {
            let name = handler.name();
            // The call itself sits inside the guarded future so a handler
            // that panics before returning its future is caught too.
            let outcome = AssertUnwindSafe(async move { handler.call(req).await })
                .catch_unwind()
                .await;

            match outcome {
                Ok(Ok(response)) => response,
                Ok(Err(e)) => render(&e),
                Err(payload) => {
                    tracing::error!(
                        handler = %name,
                        panic = %panic_message(payload.as_ref()),
                        "recovered from panic"
                    );
                    render(&HttpError::internal_server_error(format!("panic in {name}")))
                }
            }
        }
    }
}

/// Serializes `e` into its JSON envelope response.
pub(crate) fn render(e: &HttpError) -> Response {
    let envelope = Envelope { inner: e, is_error: true };
    match serde_json::to_vec(&envelope) {
        Ok(body) => Response::builder().status(e.status()).json(body),
        Err(err) => {
            tracing::error!(error = %err, "failed to encode error envelope");
            Response::status(e.status())
        }
    }
}

/// Best-effort text of a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::Mutex;

    use http::{Method, StatusCode};

    use super::*;
    use crate::handler::HandlerResult;
    use crate::request::test_support::request;

    async fn call(handler: impl Handler) -> Response {
        handler
            .into_boxed_handler()
            .call(request(Method::POST, "/login", &[], ""))
            .await
    }

    async fn empty_credentials(_req: Request) -> HandlerResult {
        Err(HttpError::bad_request("username or password is empty"))
    }

    async fn fine(_req: Request) -> HandlerResult {
        Ok(Response::builder()
            .status(StatusCode::ACCEPTED)
            .header("x-trace", "abc")
            .text("done"))
    }

    async fn explodes(_req: Request) -> HandlerResult {
        panic!("ledger exploded");
    }

    #[tokio::test]
    async fn error_becomes_json_envelope() {
        let res = call(with_errors(empty_credentials)).await;

        assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(res.header("content-type"), Some("application/json"));
        assert_eq!(
            res.body(),
            br#"{"statusCode":400,"message":"username or password is empty","error":true}"#
        );
    }

    #[tokio::test]
    async fn success_passes_through_unchanged() {
        let res = call(with_errors(fine)).await;

        assert_eq!(res.status_code(), StatusCode::ACCEPTED);
        assert_eq!(res.header("x-trace"), Some("abc"));
        assert_eq!(res.header("content-type"), Some("text/plain; charset=utf-8"));
        assert_eq!(res.body(), b"done");
    }

    #[tokio::test]
    async fn panic_is_contained() {
        let res = call(with_errors(explodes)).await;

        assert_eq!(res.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: serde_json::Value = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(body["statusCode"], 500);
        assert_eq!(body["message"], "internal server error");
        assert_eq!(body["error"], true);
    }

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

    #[tokio::test]
    async fn panic_is_reported_with_payload_and_handler() {
        let out = Captured::default();
        let writer = out.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        // Current-thread runtime: the thread-local default covers the await.
        let guard = tracing::subscriber::set_default(subscriber);
        call(with_errors(explodes)).await;
        drop(guard);

        let log = String::from_utf8(out.0.lock().unwrap().clone()).unwrap();
        let line = log
            .lines()
            .find(|l| l.contains("recovered from panic"))
            .unwrap();
        assert!(line.contains("panic=ledger exploded"));
        let handler = line
            .split_whitespace()
            .find_map(|field| field.strip_prefix("handler="))
            .unwrap();
        assert!(handler.ends_with("explodes"));
    }

    #[tokio::test]
    async fn synchronous_panic_is_contained() {
        let handler = |_req: Request| -> std::future::Ready<HandlerResult> { panic!("before the future") };
        let res = call(with_errors(handler)).await;
        assert_eq!(res.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn envelope_hides_internal_cause() {
        let handler = |_req: Request| async {
            Err::<Response, _>(HttpError::internal_server_error("db password wrong"))
        };
        let res = call(with_errors(handler)).await;

        let text = String::from_utf8(res.body().to_vec()).unwrap();
        assert!(!text.contains("db password"));
        assert_eq!(text, r#"{"statusCode":500,"message":"internal server error","error":true}"#);
    }

    #[test]
    fn panic_payload_text() {
        let boxed: Box<dyn Any + Send> = Box::new("static");
        assert_eq!(panic_message(boxed.as_ref()), "static");
        let boxed: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(boxed.as_ref()), "owned");
        let boxed: Box<dyn Any + Send> = Box::new(42_u8);
        assert_eq!(panic_message(boxed.as_ref()), "non-string panic payload");
    }
}
