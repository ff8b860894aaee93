//! Delivery of one record to several sinks.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;

use super::{RequestHead, ResponseHead, SharedSink, Sink};
use crate::http_error::HttpError;
use crate::middleware::panic_message;

/// Forwards every record to an ordered list of sinks.
///
/// Empty slots stand for sinks that failed to come up and are skipped. Each
/// delivery is isolated: a sink that panics is reported and the remaining
/// sinks still receive the record.
pub struct FanoutSink {
    sinks: Vec<Option<SharedSink>>,
}

impl FanoutSink {
    pub fn new(sinks: Vec<Option<SharedSink>>) -> Self {
        Self { sinks }
    }

    /// Number of slots actually holding a sink.
    pub fn active(&self) -> usize {
        self.sinks.iter().flatten().count()
    }
}

impl Sink for FanoutSink {
    fn record(
        &self,
        response: &ResponseHead,
        request: &RequestHead,
        error: Option<&HttpError>,
        elapsed: Duration,
    ) {
        for (slot, sink) in self.sinks.iter().enumerate() {
            let Some(sink) = sink else { continue };
            let delivered = catch_unwind(AssertUnwindSafe(|| {
                sink.record(response, request, error, elapsed);
            }));
            if let Err(payload) = delivered {
                tracing::error!(
                    slot,
                    panic = %panic_message(payload.as_ref()),
                    "audit sink panicked, record dropped for this sink"
                );
            }
        }
    }
}
