use crate::repair::RepairReport;
use axum::{http::StatusCode, response::IntoResponse};
use lazy_static::lazy_static;
use prometheus::{
    CounterVec, Encoder, Gauge, GaugeVec, Histogram, HistogramOpts, HistogramVec, IntCounter, Opts,
    Registry, TextEncoder,
};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Metric name prefix for all catalog server metrics
const PREFIX: &str = "catalog";

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

    // Relation Metrics
    pub static ref RELATION_OPERATIONS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(
            format!("{PREFIX}_relation_operations_total"),
            "Relation writes by target kind, operation and outcome"
        ),
        &["kind", "op", "outcome"]
    ).expect("Failed to create relation_operations_total metric");

    // Repair Metrics
    pub static ref REPAIR_RUNS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_repair_runs_total"), "Cache repair runs by status"),
        &["status"]
    ).expect("Failed to create repair_runs_total metric");

    pub static ref REPAIR_DURATION_SECONDS: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            format!("{PREFIX}_repair_duration_seconds"),
            "Cache repair duration in seconds"
        )
        .buckets(vec![0.01, 0.1, 0.5, 1.0, 5.0, 30.0, 120.0, 600.0])
    ).expect("Failed to create repair_duration_seconds metric");

    pub static ref REPAIR_ERRORS_TOTAL: IntCounter = IntCounter::new(
        format!("{PREFIX}_repair_errors_total"),
        "Per-entity failures encountered by cache repair"
    ).expect("Failed to create repair_errors_total metric");

    pub static ref REPAIR_LAST_RUN_TIMESTAMP: Gauge = Gauge::new(
        format!("{PREFIX}_repair_last_run_timestamp_seconds"),
        "Unix time at which the last cache repair finished"
    ).expect("Failed to create repair_last_run_timestamp_seconds metric");

    pub static ref REPAIR_LAST_RUN_UPDATED: GaugeVec = GaugeVec::new(
        Opts::new(
            format!("{PREFIX}_repair_last_run_updated"),
            "Entities written by the last cache repair, by phase"
        ),
        &["phase"]
    ).expect("Failed to create repair_last_run_updated metric");

    // Catalog Metrics
    pub static ref CATALOG_ITEMS_TOTAL: GaugeVec = GaugeVec::new(
        Opts::new(format!("{PREFIX}_catalog_items_total"), "Total items in catalog"),
        &["type"]
    ).expect("Failed to create catalog_items_total metric");

    // Background Job Metrics
    pub static ref BACKGROUND_JOB_EXECUTIONS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(
            format!("{PREFIX}_background_job_executions_total"),
            "Background job executions by job and status"
        ),
        &["job_id", "status"]
    ).expect("Failed to create background_job_executions_total metric");

    pub static ref BACKGROUND_JOB_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            format!("{PREFIX}_background_job_duration_seconds"),
            "Background job duration in seconds"
        )
        .buckets(vec![0.1, 1.0, 10.0, 60.0, 300.0, 1800.0]),
        &["job_id"]
    ).expect("Failed to create background_job_duration_seconds metric");

    pub static ref BACKGROUND_JOB_RUNNING: GaugeVec = GaugeVec::new(
        Opts::new(
            format!("{PREFIX}_background_job_running"),
            "Whether a background job is currently running (1) or not (0)"
        ),
        &["job_id"]
    ).expect("Failed to create background_job_running metric");
}

/// Initialize all metrics and register them with the Prometheus registry
pub fn init_metrics() {
    // Already-registered errors are expected when tests initialize repeatedly
    let _ = REGISTRY.register(Box::new(HTTP_REQUESTS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()));
    let _ = REGISTRY.register(Box::new(RELATION_OPERATIONS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(REPAIR_RUNS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(REPAIR_DURATION_SECONDS.clone()));
    let _ = REGISTRY.register(Box::new(REPAIR_ERRORS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(REPAIR_LAST_RUN_TIMESTAMP.clone()));
    let _ = REGISTRY.register(Box::new(REPAIR_LAST_RUN_UPDATED.clone()));
    let _ = REGISTRY.register(Box::new(CATALOG_ITEMS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(BACKGROUND_JOB_EXECUTIONS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(BACKGROUND_JOB_DURATION_SECONDS.clone()));
    let _ = REGISTRY.register(Box::new(BACKGROUND_JOB_RUNNING.clone()));

    tracing::info!("Metrics system initialized successfully");
}

/// Initialize catalog-specific metrics
pub fn init_catalog_metrics(
    num_artists: usize,
    num_albums: usize,
    num_artist_links: usize,
    num_album_links: usize,
) {
    for (kind, count) in [
        ("artist", num_artists),
        ("album", num_albums),
        ("artist_link", num_artist_links),
        ("album_link", num_album_links),
    ] {
        CATALOG_ITEMS_TOTAL
            .with_label_values(&[kind])
            .set(count as f64);
    }

    tracing::info!(
        "Catalog metrics initialized: {} artists, {} albums, {} artist links, {} album links",
        num_artists,
        num_albums,
        num_artist_links,
        num_album_links
    );
}

/// Record an HTTP request
pub fn record_http_request(method: &str, path: &str, status: u16, duration: Duration) {
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, path, &status.to_string()])
        .inc();

    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, path])
        .observe(duration.as_secs_f64());
}

/// Record a relation add/remove attempt
pub fn record_relation_operation(kind: &str, op: &str, outcome: &str) {
    RELATION_OPERATIONS_TOTAL
        .with_label_values(&[kind, op, outcome])
        .inc();
}

/// Record a finished cache repair run
pub fn record_repair_run(report: &RepairReport, duration: Duration) {
    let status = if report.success { "success" } else { "failed" };
    REPAIR_RUNS_TOTAL.with_label_values(&[status]).inc();
    REPAIR_DURATION_SECONDS.observe(duration.as_secs_f64());
    REPAIR_ERRORS_TOTAL.inc_by(report.errors.len() as u64);

    for (phase, count) in [
        ("artists", report.artists_updated),
        ("albums", report.albums_updated),
        ("artist_refs", report.artist_refs_updated),
    ] {
        REPAIR_LAST_RUN_UPDATED
            .with_label_values(&[phase])
            .set(count as f64);
    }

    if let Ok(now) = SystemTime::now().duration_since(UNIX_EPOCH) {
        REPAIR_LAST_RUN_TIMESTAMP.set(now.as_secs_f64());
    }
}

/// Record a background job execution
pub fn record_background_job_execution(job_id: &str, status: &str, duration: Duration) {
    BACKGROUND_JOB_EXECUTIONS_TOTAL
        .with_label_values(&[job_id, status])
        .inc();

    BACKGROUND_JOB_DURATION_SECONDS
        .with_label_values(&[job_id])
        .observe(duration.as_secs_f64());
}

pub fn set_background_job_running(job_id: &str, running: bool) {
    BACKGROUND_JOB_RUNNING
        .with_label_values(&[job_id])
        .set(if running { 1.0 } else { 0.0 });
}

/// Handler for the /metrics endpoint
pub async fn metrics_handler() -> impl IntoResponse {
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
