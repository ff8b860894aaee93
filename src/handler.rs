//! Handler traits and type erasure.
//!
//! Two kinds of handler live here:
//!
//! - [`Handler`]: what the router stores. Infallible: it always produces a
//!   [`Response`]. You rarely write one by hand; the pipeline
//!   ([`with_errors`](crate::middleware::with_errors)) produces it for you.
//! - [`AppHandler`]: business logic. Fallible: it returns
//!   `Result<Response, HttpError>` and leaves error rendering, panic
//!   isolation and auditing to the middleware wrapped around it.
//!
//! # How async handlers are stored
//!
//! The router needs to hold handlers of *different* types in a single
//! `HashMap<Method, Tree>`, so each one is hidden behind a trait object:
//!
//! ```text
//! with_errors(with_logging(sink, login))        ← user composes this
//!        ↓ router.on(Method::POST, "/login", …)
//! handler.into_boxed_handler()                  ← Handler blanket impl
//!        ↓  stored as BoxedHandler = Arc<dyn ErasedHandler>
//! handler.call(req)  at request time            ← one vtable dispatch
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::http_error::HttpError;
use crate::request::Request;
use crate::response::{IntoResponse, Response};

// ── Internal types ────────────────────────────────────────────────────────────

/// A heap-allocated, type-erased future that resolves to a [`Response`].
pub(crate) type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// What every [`AppHandler`] resolves to.
pub type HandlerResult = Result<Response, HttpError>;

/// A heap-allocated, type-erased future that resolves to a [`HandlerResult`].
pub type BoxHandlerFuture = Pin<Box<dyn Future<Output = HandlerResult> + Send + 'static>>;

/// Internal dispatch interface.
///
/// `#[doc(hidden)] pub` rather than `pub(crate)` because it appears in the
/// return type of the public `Handler` trait's `into_boxed_handler` method.
#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, req: Request) -> BoxFuture;
}

/// A heap-allocated, type-erased handler shared across concurrent requests.
#[doc(hidden)]
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

// ── Router-facing Handler trait ───────────────────────────────────────────────

/// Implemented for every handler the router can register.
///
/// Automatically satisfied for any function with the signature:
///
/// ```text
/// async fn name(req: Request) -> impl IntoResponse
/// ```
///
/// The trait is **sealed**: only the blanket impl below can satisfy it.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

mod private {
    pub trait Sealed {}
}

impl<F, Fut, R> private::Sealed for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
}

impl<F, Fut, R> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

/// Newtype bridging a concrete handler `F` to [`ErasedHandler`].
struct FnHandler<F>(F);

impl<F, Fut, R> ErasedHandler for FnHandler<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture {
        let fut = (self.0)(req);
        Box::pin(async move { fut.await.into_response() })
    }
}

// ── Business-logic AppHandler trait ───────────────────────────────────────────

/// A unit of business logic.
///
/// Implemented for any function with the signature:
///
/// ```text
/// async fn name(req: Request) -> Result<Response, HttpError>
/// ```
///
/// Routed path parameters are read with [`Request::param`]. A handler
/// reports failure only through `Err(HttpError)` (or, exceptionally, a
/// panic); it never renders errors or writes audit records itself.
pub trait AppHandler: Send + Sync + 'static {
    fn call(&self, req: Request) -> BoxHandlerFuture;

    /// Identity reported when this handler panics. Wrappers forward the name
    /// of the handler they wrap.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

impl<F, Fut> AppHandler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    fn call(&self, req: Request) -> BoxHandlerFuture {
        Box::pin((self)(req))
    }
}
