//! Status-segregated append-only log files.

use std::fs::{DirBuilder, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use http::StatusCode;

use super::{RequestHead, ResponseHead, Sink, format_line};
use crate::error::SinkError;
use crate::http_error::HttpError;

pub const HTTP_REQUEST_LOG_FILE: &str = "http-request.log";
pub const BAD_REQUEST_LOG_FILE: &str = "bad-request.log";
pub const INTERNAL_SERVER_ERROR_LOG_FILE: &str = "internal-server-error.log";

const LOG_DIR_MODE: u32 = 0o774;
const FILES_DIR_MODE: u32 = 0o770;

/// Which file a record lands in.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Stream {
    General,
    BadRequest,
    InternalError,
}

impl Stream {
    /// Fixed three-way routing: 500 and 400 get their own files, everything
    /// else (successes and any other error code) goes to the general file.
    pub(crate) fn for_outcome(error: Option<&HttpError>) -> Self {
        match error.map(HttpError::status) {
            Some(StatusCode::INTERNAL_SERVER_ERROR) => Self::InternalError,
            Some(StatusCode::BAD_REQUEST) => Self::BadRequest,
            Some(_) | None => Self::General,
        }
    }

    pub(crate) fn file_name(self) -> &'static str {
        match self {
            Self::General => HTTP_REQUEST_LOG_FILE,
            Self::BadRequest => BAD_REQUEST_LOG_FILE,
            Self::InternalError => INTERNAL_SERVER_ERROR_LOG_FILE,
        }
    }
}

/// One append-only file. The mutex makes every line a single uninterrupted
/// write.
struct LogFile {
    path: PathBuf,
    file: Mutex<File>,
}

impl LogFile {
    fn open(dir: &Path, stream: Stream) -> Result<Self, SinkError> {
        let path = dir.join(stream.file_name());
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| SinkError::Open { path: path.clone(), source })?;
        Ok(Self { path, file: Mutex::new(file) })
    }

    fn append(&self, line: &str) {
        // Stamp under the lock so lines land in timestamp order.
        let mut file = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        let stamped = format!("{} {line}\n", chrono::Local::now().format("%Y/%m/%d %H:%M:%S"));
        if let Err(e) = file.write_all(stamped.as_bytes()) {
            tracing::warn!(path = %self.path.display(), error = %e, "audit write failed");
        }
    }
}

/// Writes each record to one of three files chosen by outcome.
///
/// | Outcome | File |
/// |---|---|
/// | success | `http-request.log` |
/// | `400` | `bad-request.log` |
/// | `500` | `internal-server-error.log` |
/// | any other error | `http-request.log` |
pub struct SegregatedFileSink {
    general: LogFile,
    bad_request: LogFile,
    internal_error: LogFile,
}

impl SegregatedFileSink {
    /// Creates `dir` if needed and opens the three files for appending.
    ///
    /// Idempotent: opening again over an existing directory reuses the files.
    /// Any failure yields no sink at all, never a partial one.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, SinkError> {
        let dir = dir.as_ref();
        create_dir(dir, LOG_DIR_MODE)?;
        Ok(Self {
            general: LogFile::open(dir, Stream::General)?,
            bad_request: LogFile::open(dir, Stream::BadRequest)?,
            internal_error: LogFile::open(dir, Stream::InternalError)?,
        })
    }

    fn stream(&self, stream: Stream) -> &LogFile {
        match stream {
            Stream::General => &self.general,
            Stream::BadRequest => &self.bad_request,
            Stream::InternalError => &self.internal_error,
        }
    }
}

impl Sink for SegregatedFileSink {
    fn record(
        &self,
        response: &ResponseHead,
        request: &RequestHead,
        error: Option<&HttpError>,
        elapsed: Duration,
    ) {
        let line = format_line(response, request, error, elapsed);
        self.stream(Stream::for_outcome(error)).append(&line);
    }
}

/// Creates the file-storage directory that sits next to the logs.
pub(crate) fn prepare_storage(dir: &Path) -> Result<(), SinkError> {
    create_dir(dir, FILES_DIR_MODE)
}

fn create_dir(dir: &Path, mode: u32) -> Result<(), SinkError> {
    let mut builder = DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(mode);
    }
    #[cfg(not(unix))]
    let _ = mode;

    builder
        .create(dir)
        .map_err(|source| SinkError::CreateDir { path: dir.to_owned(), source })
}
