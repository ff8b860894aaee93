//! # teller
//!
//! A small web service core whose every route runs through the same
//! pipeline:
//!
//! - **Panic isolation**: a panicking handler is contained at one boundary
//!   and answered with a generic 500.
//! - **Uniform errors**: handlers return [`HttpError`]; clients get
//!   `{"statusCode":..,"message":..,"error":true}` with the matching status.
//! - **Auditing**: every completed request is timed and recorded to the
//!   installed [`Sink`](sink::Sink): console, status-segregated files, or a
//!   fan-out of both.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use clap::Parser;
//! use http::Method;
//! use teller::middleware::Pipeline;
//! use teller::{Config, HandlerResult, HttpError, Request, Response, Router, Server, sink};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), teller::Error> {
//!     let config = Config::parse();
//!     let pipeline = Pipeline::new(sink::install(&config));
//!
//!     let app = Router::new()
//!         .on(Method::GET, "/user/{id}", pipeline.wrap(get_user));
//!
//!     Server::bind(&config.bind_addr)?.serve(app).await
//! }
//!
//! async fn get_user(req: Request) -> HandlerResult {
//!     let id = req.param("id").unwrap_or_default();
//!     if id.is_empty() {
//!         return Err(HttpError::bad_request("missing user id"));
//!     }
//!     Ok(Response::success_json(format!(r#"{{"id":"{id}"}}"#).into_bytes()))
//! }
//! ```

mod error;
mod handler;
mod http_error;
mod request;
mod response;
mod router;

pub mod config;
pub mod health;
pub mod middleware;
pub mod server;
pub mod sink;
pub mod telemetry;

pub use config::Config;
pub use error::{Error, SinkError};
pub use handler::{AppHandler, BoxHandlerFuture, Handler, HandlerResult};
pub use http_error::{HttpError, INTERNAL_SERVER_ERROR_MESSAGE};
pub use request::Request;
pub use response::{ContentType, IntoResponse, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;
