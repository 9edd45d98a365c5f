//! Metrics export setup for the `dripcam` binary.
//!
//! Pipeline instruments record against the global meter provider. This
//! module installs that provider according to [`ObservabilitySettings`].
//! Export defaults to off because stdout carries command output.

use crate::{MetricsExporter, ObservabilitySettings};
use dripcam_error::ConfigError;
#[cfg(feature = "metrics")]
use opentelemetry::{KeyValue, global};
#[cfg(feature = "metrics")]
use opentelemetry_otlp::{MetricExporter as OtlpExporter, WithExportConfig};
#[cfg(feature = "metrics")]
use opentelemetry_sdk::{
    Resource,
    metrics::{PeriodicReader, SdkMeterProvider},
};
#[cfg(feature = "metrics")]
use opentelemetry_stdout::MetricExporter as StdoutExporter;
#[cfg(feature = "metrics")]
use std::time::Duration;
use tracing::{info, instrument};

#[cfg(feature = "metrics")]
const OTLP_METRICS_PATH: &str = "/v1/metrics";

/// Installed metrics pipeline. Call [`shutdown`](Self::shutdown) before exit
/// so the last interval is flushed.
#[derive(Debug, Default)]
pub struct Observability {
    #[cfg(feature = "metrics")]
    provider: Option<SdkMeterProvider>,
}

impl Observability {
    /// True when a meter provider was installed.
    pub fn is_exporting(&self) -> bool {
        #[cfg(feature = "metrics")]
        {
            self.provider.is_some()
        }
        #[cfg(not(feature = "metrics"))]
        {
            false
        }
    }

    /// Flush and stop the meter provider, if one was installed.
    #[instrument(skip_all)]
    pub fn shutdown(self) {
        #[cfg(feature = "metrics")]
        if let Some(provider) = self.provider {
            match provider.shutdown() {
                Ok(()) => info!("Metrics provider shut down"),
                Err(e) => tracing::warn!(error = %e, "Metrics provider shutdown failed"),
            }
        }
    }
}

/// Install the global meter provider for `service_name`.
///
/// Without the `metrics` feature, or with the exporter set to `none`,
/// nothing is installed and instruments stay no-ops.
///
/// # Errors
///
/// A configuration error when the OTLP exporter cannot be built.
#[instrument(skip(settings), fields(exporter = %settings.exporter))]
pub fn init_observability(
    service_name: &'static str,
    settings: &ObservabilitySettings,
) -> Result<Observability, ConfigError> {
    if settings.exporter == MetricsExporter::None {
        info!("Metrics export disabled");
        return Ok(Observability::default());
    }

    #[cfg(not(feature = "metrics"))]
    {
        info!(
            service_name,
            "Built without the metrics feature, ignoring exporter setting"
        );
        Ok(Observability::default())
    }

    #[cfg(feature = "metrics")]
    {
        let resource = Resource::builder_empty()
            .with_attributes([
                KeyValue::new("service.name", service_name),
                KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
            ])
            .build();
        let interval = settings.export_interval();

        let builder = SdkMeterProvider::builder().with_resource(resource);
        let provider = match settings.exporter {
            MetricsExporter::Otlp => {
                let endpoint = otlp_metrics_url(&settings.otlp_endpoint);
                let exporter = OtlpExporter::builder()
                    .with_http()
                    .with_endpoint(&endpoint)
                    .with_timeout(Duration::from_secs(10))
                    .build()
                    .map_err(|e| ConfigError::new(format!("Failed to create OTLP exporter: {}", e)))?;
                info!(endpoint = %endpoint, interval_secs = interval.as_secs(), "Exporting metrics over OTLP");
                builder
                    .with_reader(PeriodicReader::builder(exporter).with_interval(interval).build())
                    .build()
            }
            _ => {
                info!(interval_secs = interval.as_secs(), "Exporting metrics to stdout");
                builder
                    .with_reader(
                        PeriodicReader::builder(StdoutExporter::default())
                            .with_interval(interval)
                            .build(),
                    )
                    .build()
            }
        };

        global::set_meter_provider(provider.clone());
        Ok(Observability {
            provider: Some(provider),
        })
    }
}

/// Signal-specific OTLP URL for a collector base endpoint.
#[cfg(feature = "metrics")]
fn otlp_metrics_url(endpoint: &str) -> String {
    let base = endpoint.trim_end_matches('/');
    if base.ends_with(OTLP_METRICS_PATH) {
        base.to_string()
    } else {
        format!("{}{}", base, OTLP_METRICS_PATH)
    }
}
