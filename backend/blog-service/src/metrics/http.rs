use lazy_static::lazy_static;
use prometheus::{register_histogram_vec, register_int_counter_vec, HistogramVec, IntCounterVec};

/// Route label for requests that matched no registered resource.
pub const UNMATCHED_ROUTE: &str = "unmatched";

lazy_static! {
    /// Completed API requests by method, route pattern and status code.
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "blog_http_requests_total",
        "HTTP requests handled by the blog API",
        &["method", "route", "status"]
    )
    .expect("failed to register blog_http_requests_total");

    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "blog_http_request_duration_seconds",
        "Blog API request latency in seconds",
        &["method", "route"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5]
    )
    .expect("failed to register blog_http_request_duration_seconds");
}

/// Record one finished request.
///
/// `route` is the matched pattern (`/api/v1/blogs/{id}`), never the raw path,
/// so ids do not create new series.
pub fn observe_request(method: &str, route: &str, status: u16, elapsed_secs: f64) {
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, route, &status.to_string()])
        .inc();
    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, route])
        .observe(elapsed_secs);
}
