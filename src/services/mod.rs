//! Upstream client adapters.
//!
//! Each client performs exactly one outbound call per operation and returns
//! the decoded envelope. None of them inspects upstream content beyond what
//! is needed to decode it; that is the normalizers' job.

pub mod completion;
pub mod places;
pub mod prompts;
pub mod vision;
pub mod weather;

pub use completion::{ChatMessage, CompletionClient};
pub use places::PlacesClient;
pub use vision::VisionClient;
pub use weather::WeatherClient;

use crate::core::metrics::record_upstream_call;
use crate::core::AppError;
use std::error::Error;
use std::future::Future;
use std::time::Instant;

/// Run one upstream call, recording its outcome and latency.
pub(crate) async fn observe<T, F>(service: &'static str, call: F) -> crate::core::Result<T>
where
    F: Future<Output = crate::core::Result<T>>,
{
    let start = Instant::now();
    let result = call.await;
    let outcome = match &result {
        Ok(_) => "success",
        Err(AppError::Request(e)) if e.is_timeout() => "timeout",
        Err(_) => "error",
    };
    record_upstream_call(service, outcome, start.elapsed().as_secs_f64());
    result
}

/// Log a transport-level failure and convert it.
///
/// `endpoint` must not carry credentials; weather and places keys travel in
/// the query string, so callers pass the bare path.
pub(crate) fn transport_error(service: &'static str, endpoint: &str, e: reqwest::Error) -> AppError {
    let e = e.without_url();
    tracing::error!(
        request_id = %crate::core::logging::get_request_id(),
        service,
        endpoint = %endpoint,
        error = %e,
        error_source = ?e.source(),
        is_timeout = e.is_timeout(),
        is_connect = e.is_connect(),
        "HTTP request failed to upstream"
    );
    AppError::from(e)
}
