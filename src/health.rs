//! Built-in lifecycle and version handlers.
//!
//! | Path | Handler | Answer |
//! |---|---|---|
//! | `/_ah/start` | [`start`] | `Success`, instance is up |
//! | `/_ah/stop` | [`stop`] | `Success`, instance acknowledges shutdown |
//! | `/version` | [`version`] | `Version:<CURRENT_VERSION_ID>` |
//!
//! The lifecycle probes are plain router handlers: they bypass the audit
//! pipeline so platform polling does not flood the request log. `version`
//! is an [`AppHandler`](crate::AppHandler) and goes through the pipeline
//! like any business route.
//!
//! ```rust,no_run
//! use http::Method;
//! use teller::{Router, health, middleware::Pipeline};
//!
//! let pipeline = Pipeline::default();
//! let app = Router::new()
//!     .on(Method::GET, "/_ah/start", health::start)
//!     .on(Method::GET, "/_ah/stop", health::stop)
//!     .on(Method::GET, "/version", pipeline.wrap(health::version));
//! ```

use crate::{HandlerResult, Request, Response};

/// Environment variable holding the deployed version identifier.
pub const VERSION_ENV: &str = "CURRENT_VERSION_ID";

/// Instance start probe. Always `200 OK` with body `"Success"`.
pub async fn start(_req: Request) -> Response {
    Response::text("Success")
}

/// Instance stop probe. Always `200 OK` with body `"Success"`.
pub async fn stop(_req: Request) -> Response {
    Response::text("Success")
}

/// Reports the deployed version; empty when the variable is unset.
pub async fn version(_req: Request) -> HandlerResult {
    let id = std::env::var(VERSION_ENV).unwrap_or_default();
    Ok(Response::text(format!("Version:{id}")))
}

#[cfg(test)]
mod tests {
    use http::Method;

    use super::*;
    use crate::request::test_support::request;

    #[tokio::test]
    async fn probes_answer_success() {
        let res = start(request(Method::GET, "/_ah/start", &[], "")).await;
        assert_eq!(res.body(), b"Success");
        let res = stop(request(Method::GET, "/_ah/stop", &[], "")).await;
        assert_eq!(res.body(), b"Success");
    }

    #[tokio::test]
    async fn version_is_prefixed() {
        let res = version(request(Method::GET, "/version", &[], "")).await.unwrap();
        assert!(res.body().starts_with(b"Version:"));
    }
}
