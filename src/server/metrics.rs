use axum::{http::StatusCode, response::IntoResponse};
use lazy_static::lazy_static;
use prometheus::{
    CounterVec, Encoder, Gauge, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};
use std::time::Duration;

/// Metric name prefix for all Bookshelf metrics
const PREFIX: &str = "bookshelf";

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // HTTP Request Metrics
    pub static ref HTTP_REQUESTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_http_requests_total"), "Total number of HTTP requests"),
        &["method", "path", "status"]
    ).expect("Failed to create http_requests_total metric");

    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            format!("{PREFIX}_http_request_duration_seconds"),
            "HTTP request duration in seconds"
        )
        .buckets(vec![0.001, 0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0]),
        &["method", "path"]
    ).expect("Failed to create http_request_duration_seconds metric");

    // Upload Metrics
    pub static ref UPLOADS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_uploads_total"), "Total book uploads by format and outcome"),
        &["format", "outcome"]
    ).expect("Failed to create uploads_total metric");

    pub static ref UPLOAD_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            format!("{PREFIX}_upload_duration_seconds"),
            "Time spent storing and enriching an upload"
        )
        .buckets(vec![0.05, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0]),
        &["format"]
    ).expect("Failed to create upload_duration_seconds metric");

    pub static ref ENRICHMENT_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_enrichment_total"), "Enrichment branch results"),
        &["branch", "outcome"]
    ).expect("Failed to create enrichment_total metric");

    // Error Metrics
    pub static ref ERRORS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_errors_total"), "Total errors by type and endpoint"),
        &["error_type", "endpoint"]
    ).expect("Failed to create errors_total metric");

    pub static ref PROCESS_MEMORY_BYTES: Gauge = Gauge::new(
        format!("{PREFIX}_process_memory_bytes"),
        "Process memory usage in bytes"
    ).expect("Failed to create process_memory_bytes metric");
}

/// Initialize all metrics and register them with the Prometheus registry
pub fn init_metrics() {
    // Ignore errors if already registered (for tests)
    let _ = REGISTRY.register(Box::new(HTTP_REQUESTS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()));
    let _ = REGISTRY.register(Box::new(UPLOADS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(UPLOAD_DURATION_SECONDS.clone()));
    let _ = REGISTRY.register(Box::new(ENRICHMENT_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(ERRORS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(PROCESS_MEMORY_BYTES.clone()));

    tracing::info!("Metrics system initialized successfully");
}

/// Collapses ids out of request paths so label cardinality stays bounded.
pub fn normalize_path(path: &str) -> String {
    let mut normalized: Vec<&str> = Vec::new();
    let mut previous = "";
    for segment in path.split('/') {
        if previous == "books" && !segment.is_empty() {
            normalized.push("{id}");
        } else {
            normalized.push(segment);
        }
        previous = segment;
    }
    normalized.join("/")
}

/// Record an HTTP request
pub fn record_http_request(method: &str, path: &str, status: u16, duration: Duration) {
    let path = normalize_path(path);
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, &path, &status.to_string()])
        .inc();

    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, &path])
        .observe(duration.as_secs_f64());
}

/// Record a finished upload
pub fn record_upload(format: &str, outcome: &str, duration: Duration) {
    UPLOADS_TOTAL.with_label_values(&[format, outcome]).inc();
    UPLOAD_DURATION_SECONDS
        .with_label_values(&[format])
        .observe(duration.as_secs_f64());
}

/// Record the result of one enrichment branch
pub fn record_enrichment(branch: &str, outcome: &str) {
    ENRICHMENT_TOTAL.with_label_values(&[branch, outcome]).inc();
}

/// Record an error
pub fn record_error(error_type: &str, endpoint: &str) {
    ERRORS_TOTAL
        .with_label_values(&[error_type, endpoint])
        .inc();
}

/// Update process memory usage
pub fn update_memory_usage() {
    #[cfg(target_os = "linux")]
    {
        if let Ok(status) = std::fs::read_to_string("/proc/self/status") {
            let rss_kb = status
                .lines()
                .find(|line| line.starts_with("VmRSS:"))
                .and_then(|line| line.split_whitespace().nth(1))
                .and_then(|kb| kb.parse::<f64>().ok());
            if let Some(kb) = rss_kb {
                PROCESS_MEMORY_BYTES.set(kb * 1024.0);
            }
        }
    }
}

/// Handler for the /metrics endpoint
pub async fn metrics_handler() -> impl IntoResponse {
    update_memory_usage();

    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();

    let mut buffer = vec![];
    match encoder.encode(&metric_families, &mut buffer) {
        Ok(()) => {
            let response = String::from_utf8(buffer).unwrap_or_default();
            (StatusCode::OK, response)
        }
        Err(e) => {
            tracing::error!("Failed to encode metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to encode metrics: {}", e),
            )
        }
    }
}
