//! Query metrics and tracing spans.
//!
//! Metrics are exported through OpenTelemetry's Prometheus exporter into a
//! dedicated registry; call [`TidepoolMetrics::gather`] to scrape them.

#[cfg(feature = "metrics")]
use once_cell::sync::Lazy;
#[cfg(feature = "metrics")]
use opentelemetry::metrics::{Counter, Histogram, MeterProvider};
#[cfg(feature = "metrics")]
use opentelemetry_sdk::metrics::SdkMeterProvider;
#[cfg(feature = "metrics")]
use prometheus::{Encoder, Registry, TextEncoder};

#[cfg(feature = "metrics")]
pub static METRICS: Lazy<TidepoolMetrics> = Lazy::new(TidepoolMetrics::init);

#[cfg(feature = "metrics")]
pub struct TidepoolMetrics {
    registry: Registry,
    // Keeps the reader registered for the life of the process.
    _provider: SdkMeterProvider,
    pub queries_total: Counter<u64>,
    pub query_errors_total: Counter<u64>,
    pub query_duration: Histogram<f64>,
}

#[cfg(feature = "metrics")]
impl TidepoolMetrics {
    pub fn init() -> Self {
        let registry = Registry::new();
        let provider = match opentelemetry_prometheus::exporter()
            .with_registry(registry.clone())
            .build()
        {
            Ok(exporter) => SdkMeterProvider::builder().with_reader(exporter).build(),
            Err(e) => {
                log::warn!("prometheus exporter unavailable, metrics are not exported: {e}");
                SdkMeterProvider::builder().build()
            }
        };
        let meter = provider.meter("tidepool");

        let queries_total = meter
            .u64_counter("tidepool_queries_total")
            .with_description("Total statements executed")
            .build();

        let query_errors_total = meter
            .u64_counter("tidepool_query_errors_total")
            .with_description("Statements that failed in the backend")
            .build();

        let query_duration = meter
            .f64_histogram("tidepool_query_duration_seconds")
            .with_description("Time from submission until the stream was closed")
            .build();

        Self {
            registry,
            _provider: provider,
            queries_total,
            query_errors_total,
            query_duration,
        }
    }

    pub fn record_query(&self, elapsed: std::time::Duration) {
        self.queries_total.add(1, &[]);
        self.query_duration.record(elapsed.as_secs_f64(), &[]);
    }

    pub fn record_query_error(&self) {
        self.query_errors_total.add(1, &[]);
    }

    /// Render the registry in the Prometheus text format.
    pub fn gather(&self) -> String {
        let mut buffer = Vec::new();
        if let Err(e) = TextEncoder::new().encode(&self.registry.gather(), &mut buffer) {
            log::warn!("failed to encode metrics: {e}");
        }
        String::from_utf8(buffer).unwrap_or_default()
    }
}

#[cfg(feature = "tracing")]
pub mod tracing_helpers {
    use tracing::{info_span, Span};

    /// Span around one statement, from submission until its stream is closed.
    pub fn execute_query_span(sql: &str) -> Span {
        info_span!("tidepool.query", db.statement = %sql)
    }

    pub fn acquire_connection_span() -> Span {
        info_span!("tidepool.connect")
    }
}
