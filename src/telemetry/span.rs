//! Injected tracing capability.
//!
//! Handlers receive a [`Telemetry`] handle and call it unconditionally. The
//! disabled handle hands out inert spans, so there is a single code path
//! whether or not spans are exported.

use std::fmt;

use opentelemetry::trace::{Span as _, SpanKind, Status, Tracer as _};
use opentelemetry::KeyValue;
use opentelemetry_sdk::trace::{SdkTracer, Span as SdkSpan};
use tokio::runtime::{Handle, RuntimeFlavor};
use tracing_opentelemetry::OpenTelemetrySpanExt;

use crate::store::{Statement, StoreTarget};

use super::attributes::{db_attributes, http_attributes, HTTP_STATUS_CODE};

/// Handle for creating operation spans.
#[derive(Clone, Default)]
pub struct Telemetry {
    tracer: Option<SdkTracer>,
}

impl Telemetry {
    /// A handle that records nothing.
    pub fn disabled() -> Self {
        Self { tracer: None }
    }

    /// A handle that records spans with the given tracer.
    pub fn from_tracer(tracer: SdkTracer) -> Self {
        Self {
            tracer: Some(tracer),
        }
    }

    /// Whether spans are recorded.
    pub fn is_enabled(&self) -> bool {
        self.tracer.is_some()
    }

    /// Client span around one statement against the store.
    pub fn db_span(
        &self,
        name: &'static str,
        target: &StoreTarget,
        statement: &Statement,
    ) -> OperationSpan {
        self.start(name, || db_attributes(target, statement))
    }

    /// Client span around one call to the data-access service.
    pub fn http_span(&self, name: &'static str, method: &str, url: &str) -> OperationSpan {
        self.start(name, || http_attributes(method, url))
    }

    fn start(
        &self,
        name: &'static str,
        attributes: impl FnOnce() -> Vec<KeyValue>,
    ) -> OperationSpan {
        let Some(tracer) = &self.tracer else {
            return OperationSpan { inner: None };
        };

        // Parent on the request span when the tracing bridge is installed.
        let parent = tracing::Span::current().context();
        let span = tracer
            .span_builder(name)
            .with_kind(SpanKind::Client)
            .with_attributes(attributes())
            .start_with_context(tracer, &parent);

        OperationSpan { inner: Some(span) }
    }
}

impl fmt::Debug for Telemetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Telemetry")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

/// A started span. Ends when finished or dropped.
#[derive(Debug)]
pub struct OperationSpan {
    inner: Option<SdkSpan>,
}

impl OperationSpan {
    /// Record the HTTP status of the response.
    pub fn record_status_code(&mut self, status: u16) {
        if let Some(span) = self.inner.as_mut() {
            span.set_attribute(KeyValue::new(HTTP_STATUS_CODE, i64::from(status)));
        }
    }

    /// Record the outcome and end the span.
    pub fn finish<T, E>(mut self, result: &Result<T, E>)
    where
        E: std::error::Error,
    {
        if let Some(mut span) = self.inner.take() {
            if let Err(e) = result {
                span.record_error(e);
                span.set_status(Status::error(e.to_string()));
            }
            end(span);
        }
    }
}

/// Under the simple export policy ending a span exports inline. On a
/// multi-thread runtime that export runs outside the worker so the exporter's
/// channel tasks keep being polled.
fn end(mut span: SdkSpan) {
    match Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(|| span.end())
        }
        _ => span.end(),
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{attribute, CapturedSpans};
    use super::*;
    use crate::store::LIST_PROFESSIONALS;

    #[test]
    fn disabled_handle_records_nothing() {
        let telemetry = Telemetry::disabled();
        let target = StoreTarget::from_url("mysql://root@mysql/testdb").unwrap();

        let mut span = telemetry.db_span("index_query", &target, &LIST_PROFESSIONALS);
        span.record_status_code(200);
        span.finish(&Ok::<(), std::io::Error>(()));

        assert!(!telemetry.is_enabled());
    }

    #[test]
    fn db_span_is_exported_with_attributes() {
        let captured = CapturedSpans::new();
        let telemetry = captured.telemetry();
        let target = StoreTarget::from_url("mysql://root@mysql:3306/testdb").unwrap();

        telemetry
            .db_span("index_query", &target, &LIST_PROFESSIONALS)
            .finish(&Ok::<(), std::io::Error>(()));

        let spans = captured.named("index_query");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].span_kind, SpanKind::Client);
        assert_eq!(
            attribute(&spans[0], "db.operation").unwrap().as_str(),
            "SELECT"
        );
    }

    #[test]
    fn failed_operation_marks_span_as_error() {
        let captured = CapturedSpans::new();
        let telemetry = captured.telemetry();

        let mut span = telemetry.http_span("index_request", "GET", "http://api/x");
        span.record_status_code(503);
        span.finish(&Err::<(), _>(std::io::Error::other("boom")));

        let spans = captured.named("index_request");
        assert_eq!(spans.len(), 1);
        assert!(matches!(spans[0].status, Status::Error { .. }));
        assert_eq!(
            attribute(&spans[0], "http.status_code"),
            Some(opentelemetry::Value::I64(503))
        );
    }
}
