//! Middleware layer.
//!
//! Cross-cutting concerns wrap business handlers without touching their
//! logic. Every route is registered as
//!
//! ```text
//! with_errors( with_logging( sink, handler ) )
//!     │             │                └─ AppHandler: Request → Result<Response, HttpError>
//!     │             └─ times the call, reports it to the audit sink, returns the result unchanged
//!     └─ catches panics, renders Err(HttpError) as a JSON envelope → router Handler
//! ```
//!
//! [`Pipeline`] holds the process-wide sink handle and applies both layers:
//!
//! ```rust,no_run
//! use http::Method;
//! use teller::middleware::Pipeline;
//! use teller::{HandlerResult, HttpError, Request, Response, Router};
//!
//! async fn login(req: Request) -> HandlerResult {
//!     let (Some(user), Some(_pass)) = (req.form_value("username"), req.form_value("pass")) else {
//!         return Err(HttpError::bad_request("username or password is empty"));
//!     };
//!     Ok(Response::text(format!("welcome {user}")))
//! }
//!
//! let pipeline = Pipeline::new(None);
//! let app = Router::new().on(Method::POST, "/login", pipeline.wrap(login));
//! ```

mod errors;
mod logging;

pub use errors::with_errors;
pub use logging::{Logged, with_logging};

pub(crate) use errors::panic_message;

use crate::handler::{AppHandler, Handler};
use crate::sink::SharedSink;

/// The per-process handler chain.
///
/// Built once at startup around the sink returned by
/// [`sink::install`](crate::sink::install) and cloned freely; the sink is
/// never swapped afterwards.
#[derive(Clone, Default)]
pub struct Pipeline {
    sink: Option<SharedSink>,
}

impl Pipeline {
    pub fn new(sink: Option<SharedSink>) -> Self {
        Self { sink }
    }

    /// Whether requests through this pipeline are audited.
    pub fn is_audited(&self) -> bool {
        self.sink.is_some()
    }

    /// `with_errors(with_logging(sink, handler))`.
    pub fn wrap<H: AppHandler>(&self, handler: H) -> impl Handler + use<H> {
        with_errors(with_logging(self.sink.clone(), handler))
    }
}
