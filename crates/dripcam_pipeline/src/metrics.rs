//! Pipeline metrics.
//!
//! With the `metrics` feature these are OpenTelemetry instruments on the
//! global meter provider (see `dripcam_core::init_observability`). Without
//! it, `PipelineMetrics` is a zero-sized no-op so call sites need no
//! feature gates.

#[cfg(feature = "metrics")]
use opentelemetry::{
    KeyValue, global,
    metrics::{Counter, Histogram, Meter},
};

/// Counters and timings for submissions, generations and reconciliation.
#[cfg(feature = "metrics")]
#[derive(Clone)]
pub struct PipelineMetrics {
    /// Meter handle kept alive for metric instruments
    _meter: Meter,
    /// Captures submitted
    pub submissions: Counter<u64>,
    /// Generations that reached `completed`
    pub completions: Counter<u64>,
    /// Generations that reached `failed`
    pub failures: Counter<u64>,
    /// Records force-failed by the reconciler
    pub reconciled: Counter<u64>,
    /// Time from claim to terminal update, in seconds
    pub generation_duration: Histogram<f64>,
}

#[cfg(feature = "metrics")]
impl PipelineMetrics {
    /// Create instruments on the global `dripcam_pipeline` meter.
    pub fn new() -> Self {
        tracing::debug!("Building pipeline metrics instruments");
        let meter = global::meter("dripcam_pipeline");

        let submissions = meter
            .u64_counter("dripcam.submissions")
            .with_description("Captures submitted for generation")
            .build();
        let completions = meter
            .u64_counter("dripcam.completions")
            .with_description("Generations completed")
            .build();
        let failures = meter
            .u64_counter("dripcam.failures")
            .with_description("Generations failed")
            .build();
        let reconciled = meter
            .u64_counter("dripcam.reconciled")
            .with_description("Stuck jobs marked failed by the reconciler")
            .build();
        let generation_duration = meter
            .f64_histogram("dripcam.generation.duration")
            .with_unit("seconds")
            .with_description("Claim to terminal update")
            .build();

        Self {
            _meter: meter,
            submissions,
            completions,
            failures,
            reconciled,
            generation_duration,
        }
    }

    /// Record an accepted capture.
    pub fn record_submission(&self) {
        self.submissions.add(1, &[]);
    }

    /// Record a finished generation.
    pub fn record_generation(&self, provider: &str, completed: bool, duration_secs: f64) {
        let labels = &[KeyValue::new("provider", provider.to_string())];
        if completed {
            self.completions.add(1, labels);
        } else {
            self.failures.add(1, labels);
        }
        self.generation_duration.record(duration_secs, labels);
    }

    /// Record records force-failed in one sweep.
    pub fn record_reconciled(&self, count: usize) {
        self.reconciled
            .add(u64::try_from(count).unwrap_or(u64::MAX), &[]);
    }
}

#[cfg(feature = "metrics")]
impl std::fmt::Debug for PipelineMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineMetrics").finish_non_exhaustive()
    }
}

/// No-op metrics used when the `metrics` feature is disabled.
#[cfg(not(feature = "metrics"))]
#[derive(Debug, Clone, Copy)]
pub struct PipelineMetrics;

#[cfg(not(feature = "metrics"))]
impl PipelineMetrics {
    /// Create the no-op recorder.
    pub fn new() -> Self {
        Self
    }

    /// Record an accepted capture.
    pub fn record_submission(&self) {}

    /// Record a finished generation.
    pub fn record_generation(&self, _provider: &str, _completed: bool, _duration_secs: f64) {}

    /// Record records force-failed in one sweep.
    pub fn record_reconciled(&self, _count: usize) {}
}

impl Default for PipelineMetrics {
    fn default() -> Self {
        Self::new()
    }
}
