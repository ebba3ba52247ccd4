//! Logging and OTLP span export.
//!
//! [`init`] is called once at process start. It installs the global log
//! subscriber and, when telemetry is enabled, builds the tracer pipeline:
//!
//! - always-on sampling
//! - a service-name resource
//! - an OTLP gRPC exporter carrying the configured static headers, over TLS
//!   with the webpki roots when the endpoint is `https://`
//! - batch or simple export per `OTEL_SPAN_EXPORT`
//!
//! The returned [`TelemetryGuard`] owns the provider and flushes it on drop.
//! Its [`Telemetry`] handle is what request handlers receive.

pub mod attributes;
mod span;

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::tonic_types::transport::ClientTlsConfig;
use opentelemetry_otlp::{SpanExporter, WithExportConfig, WithTonicConfig};
use opentelemetry_sdk::trace::{Sampler, SdkTracerProvider};
use opentelemetry_sdk::Resource;
use tonic::metadata::{MetadataKey, MetadataMap, MetadataValue};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::{Config, LogFormat, SpanExport};
use crate::error::TelemetryError;

pub use span::{OperationSpan, Telemetry};

#[cfg(test)]
pub(crate) use span::testing;

const TRACER_NAME: &str = "professionals";

/// Keeps the tracer provider alive; flushes and shuts it down on drop.
pub struct TelemetryGuard {
    provider: Option<SdkTracerProvider>,
    telemetry: Telemetry,
}

impl TelemetryGuard {
    /// Handle to inject into request handlers.
    pub fn telemetry(&self) -> Telemetry {
        self.telemetry.clone()
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.provider.take() {
            // The subscriber may already be gone here.
            if let Err(e) = provider.force_flush() {
                eprintln!("OTEL trace flush error: {:?}", e);
            }
            if let Err(e) = provider.shutdown() {
                eprintln!("OTEL trace shutdown error: {:?}", e);
            }
        }
    }
}

/// Install the log subscriber and, if enabled, the span pipeline.
///
/// Must run inside the Tokio runtime: the gRPC exporter spawns its channel
/// worker onto it.
pub fn init(
    config: &Config,
    service_name: &str,
    verbose: bool,
) -> Result<TelemetryGuard, TelemetryError> {
    let filter = env_filter(config, verbose);

    let provider = if config.telemetry_enabled {
        Some(build_provider(config, service_name)?)
    } else {
        None
    };

    let otel_layer = provider
        .as_ref()
        .map(|p| tracing_opentelemetry::layer().with_tracer(p.tracer(TRACER_NAME)));

    let fmt_layer = match config.log_format {
        LogFormat::Text => fmt::layer().boxed(),
        LogFormat::Json => fmt::layer().json().boxed(),
    };

    tracing_subscriber::registry()
        .with(otel_layer)
        .with(fmt_layer)
        .with(filter)
        .try_init()
        .map_err(|e| TelemetryError::Subscriber(e.to_string()))?;

    let telemetry = match &provider {
        Some(p) => {
            info!(
                service = service_name,
                export = %config.otel_span_export,
                "Span export enabled"
            );
            Telemetry::from_tracer(p.tracer(TRACER_NAME))
        }
        None => Telemetry::disabled(),
    };

    Ok(TelemetryGuard {
        provider,
        telemetry,
    })
}

/// Log and span filter. Request spans from the HTTP trace layer are emitted
/// at INFO, so the default filter keeps them.
pub(crate) fn env_filter(config: &Config, verbose: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new("professionals=debug,info")
    } else {
        EnvFilter::try_new(&config.rust_log).unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

/// Build the tracer provider for the configured collector.
pub fn build_provider(
    config: &Config,
    service_name: &str,
) -> Result<SdkTracerProvider, TelemetryError> {
    let endpoint = config
        .otel_exporter_otlp_endpoint
        .as_deref()
        .filter(|e| !e.is_empty())
        .ok_or(TelemetryError::MissingEndpoint)?;

    let headers = parse_headers(config.otel_exporter_otlp_headers.as_deref().unwrap_or_default())?;
    let metadata = to_metadata(&headers)?;

    let mut exporter = SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .with_metadata(metadata);
    if endpoint.starts_with("https://") {
        exporter = exporter.with_tls_config(ClientTlsConfig::new().with_webpki_roots());
    }
    let exporter = exporter
        .build()
        .map_err(|e| TelemetryError::Exporter(e.to_string()))?;

    let resource = Resource::builder()
        .with_service_name(service_name.to_string())
        .build();

    let builder = SdkTracerProvider::builder()
        .with_sampler(Sampler::AlwaysOn)
        .with_resource(resource);

    let provider = match config.otel_span_export {
        SpanExport::Batch => builder.with_batch_exporter(exporter),
        SpanExport::Simple => builder.with_simple_exporter(exporter),
    }
    .build();

    Ok(provider)
}

/// Parse `key=value,key=value` exporter headers. Values are percent-decoded,
/// so `Authorization=Bearer%20token` yields `Bearer token`.
pub fn parse_headers(raw: &str) -> Result<Vec<(String, String)>, TelemetryError> {
    let mut headers = Vec::new();

    for pair in raw.split(',') {
        let pair = pair.trim();
        if pair.is_empty() {
            continue;
        }

        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| TelemetryError::InvalidHeader(pair.to_string()))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(TelemetryError::InvalidHeader(pair.to_string()));
        }

        let value = urlencoding::decode(value.trim())
            .map_err(|_| TelemetryError::InvalidHeader(key.to_string()))?;
        headers.push((key.to_string(), value.into_owned()));
    }

    Ok(headers)
}

fn to_metadata(headers: &[(String, String)]) -> Result<MetadataMap, TelemetryError> {
    let mut metadata = MetadataMap::with_capacity(headers.len());
    for (key, value) in headers {
        let name = MetadataKey::from_bytes(key.to_ascii_lowercase().as_bytes())
            .map_err(|_| TelemetryError::InvalidHeader(key.clone()))?;
        let value = MetadataValue::try_from(value.as_str())
            .map_err(|_| TelemetryError::InvalidHeader(key.clone()))?;
        metadata.insert(name, value);
    }
    Ok(metadata)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_headers_decodes_values() {
        let headers = parse_headers(
            "Authorization=Bearer%20abc, CX-Application-Name=Instrumentation,CX-Subsystem-Name=Instrumentation-API",
        )
        .unwrap();

        assert_eq!(
            headers,
            vec![
                ("Authorization".to_string(), "Bearer abc".to_string()),
                ("CX-Application-Name".to_string(), "Instrumentation".to_string()),
                ("CX-Subsystem-Name".to_string(), "Instrumentation-API".to_string()),
            ]
        );
    }

    #[test]
    fn parse_headers_skips_empty_entries() {
        assert!(parse_headers("").unwrap().is_empty());
        assert_eq!(parse_headers("a=1,,").unwrap().len(), 1);
    }

    #[test]
    fn parse_headers_rejects_missing_separator() {
        assert!(matches!(
            parse_headers("Authorization"),
            Err(TelemetryError::InvalidHeader(_))
        ));
        assert!(parse_headers("=value").is_err());
    }

    #[test]
    fn metadata_keys_are_lowercased() {
        let metadata =
            to_metadata(&[("CX-Application-Name".to_string(), "Instrumentation".to_string())])
                .unwrap();
        assert_eq!(
            metadata.get("cx-application-name").and_then(|v| v.to_str().ok()),
            Some("Instrumentation")
        );
    }

    #[test]
    fn build_provider_requires_endpoint() {
        let config = Config {
            telemetry_enabled: true,
            ..Config::default()
        };
        assert!(matches!(
            build_provider(&config, "Instrumentation-API"),
            Err(TelemetryError::MissingEndpoint)
        ));
    }

    #[tokio::test]
    async fn build_provider_accepts_tls_endpoint() {
        let config = Config {
            telemetry_enabled: true,
            otel_exporter_otlp_endpoint: Some("https://ingress.coralogix.com:443".to_string()),
            otel_exporter_otlp_headers: Some(
                "Authorization=Bearer%20abc,CX-Application-Name=Instrumentation".to_string(),
            ),
            ..Config::default()
        };

        let provider = build_provider(&config, "Instrumentation-API").unwrap();
        let _ = provider.shutdown();
    }

    #[tokio::test]
    async fn build_provider_accepts_collector_endpoint() {
        let config = Config {
            telemetry_enabled: true,
            otel_exporter_otlp_endpoint: Some("http://127.0.0.1:4317".to_string()),
            otel_exporter_otlp_headers: Some("Authorization=Bearer%20abc".to_string()),
            ..Config::default()
        };

        let provider = build_provider(&config, "Instrumentation-API").unwrap();
        let _ = provider.shutdown();
    }
}
