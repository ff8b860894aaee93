//! Infrastructure error types.

use std::path::PathBuf;

/// The error type returned by teller's fallible operations.
///
/// Application-level failures (400, 500, etc.) are expressed as
/// [`HttpError`](crate::HttpError) values returned from handlers, not as
/// `Error`s. This type surfaces infrastructure failures: parsing the bind
/// address, binding to a port or accepting a connection.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid socket address `{addr}`: {source}")]
    Addr {
        addr: String,
        #[source]
        source: std::net::AddrParseError,
    },
}

/// Why an audit sink could not be brought up.
///
/// Returned once, at startup. Callers treat it as "no sink installed" and
/// never retry per request.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("unable to create {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error opening {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
