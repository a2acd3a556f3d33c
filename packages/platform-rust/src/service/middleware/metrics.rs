//! Metrics middleware for plugin operations.
//!
//! Every call gets a `tracing` span carrying the operation name, outcome and
//! duration, and is recorded through the `metrics` facade so whichever
//! recorder the host installs can collect it.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Instant;

use metrics::{describe_counter, describe_histogram};
use tower::{Layer, Service};
use tracing::{info_span, Instrument};

use crate::error::PluginError;
use crate::operation::{Operation, OperationResponse};

pub const OPERATIONS_TOTAL: &str = "dvp_operations_total";
pub const OPERATION_DURATION_SECONDS: &str = "dvp_operation_duration_seconds";

/// Register the metric descriptions. Call once after installing a recorder.
pub fn describe_metrics() {
    describe_counter!(OPERATIONS_TOTAL, "Plugin operations dispatched, by operation and outcome");
    describe_histogram!(
        OPERATION_DURATION_SECONDS,
        metrics::Unit::Seconds,
        "Time spent dispatching a plugin operation"
    );
}

// ---------------------------------------------------------------------------
// MetricsLayer
// ---------------------------------------------------------------------------

/// Tower layer that times and counts operations.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsLayer;

impl<S> Layer<S> for MetricsLayer {
    type Service = MetricsService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MetricsService { inner }
    }
}

// ---------------------------------------------------------------------------
// MetricsService
// ---------------------------------------------------------------------------

/// Service wrapper that records duration and outcome of each operation.
///
/// The outcome label is `ok`, or the failure's [`PluginError::kind`].
#[derive(Debug, Clone)]
pub struct MetricsService<S> {
    inner: S,
}

impl<S> Service<Operation> for MetricsService<S>
where
    S: Service<Operation, Response = OperationResponse, Error = PluginError> + Send,
    S::Future: Send + 'static,
{
    type Response = OperationResponse;
    type Error = PluginError;
    type Future = Pin<Box<dyn Future<Output = Result<OperationResponse, PluginError>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, op: Operation) -> Self::Future {
        let operation = op.name();

        let span = info_span!(
            "operation",
            operation,
            duration_ms = tracing::field::Empty,
            outcome = tracing::field::Empty,
        );

        let fut = self.inner.call(op);

        Box::pin(
            async move {
                let start = Instant::now();
                let result = fut.await;
                let elapsed = start.elapsed();

                let outcome = match &result {
                    Ok(_) => "ok",
                    Err(err) => err.kind(),
                };

                #[allow(clippy::cast_possible_truncation)]
                let duration_ms = elapsed.as_millis() as u64;
                tracing::Span::current().record("duration_ms", duration_ms);
                tracing::Span::current().record("outcome", outcome);

                metrics::counter!(OPERATIONS_TOTAL, "operation" => operation, "outcome" => outcome)
                    .increment(1);
                metrics::histogram!(OPERATION_DURATION_SECONDS, "operation" => operation)
                    .record(elapsed.as_secs_f64());

                match &result {
                    Ok(_) => tracing::debug!(operation, duration_ms, "operation complete"),
                    Err(err) => tracing::warn!(operation, duration_ms, outcome, error = %err, "operation failed"),
                }

                result
            }
            .instrument(span),
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
