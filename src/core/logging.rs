//! Logging setup and request-scoped context.
//!
//! Request IDs are held in tokio task-local storage so that any log line
//! emitted while serving a request can include them without threading the
//! value through every call.

use chrono::Local;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

tokio::task_local! {
    /// Task-local storage for the current request ID.
    pub static REQUEST_ID: String;
}

/// Get the current request ID from context, if set.
///
/// Returns an empty string if no request ID is set.
pub fn get_request_id() -> String {
    REQUEST_ID.try_with(|id| id.clone()).unwrap_or_default()
}

/// Generate a new unique request ID using UUID v4.
pub fn generate_request_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Custom time formatter that uses local timezone (respects TZ environment variable)
struct LocalTime;

impl tracing_subscriber::fmt::time::FormatTime for LocalTime {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        let now = Local::now();
        write!(w, "{}", now.format("%Y-%m-%d %H:%M:%S"))
    }
}

/// Build the log filter directives.
///
/// Noise suppression for the HTTP stack is always appended, otherwise a bare
/// `RUST_LOG=trace` would flood the output with connection-level logs.
fn filter_directives(base: Option<String>) -> String {
    let base_filter = base.unwrap_or_else(|| "info,travel_relay=debug".to_string());
    format!(
        "{},hyper=warn,hyper::proto=warn,h2=warn,reqwest=warn",
        base_filter
    )
}

/// Initialize the global tracing subscriber.
///
/// - `RUST_LOG` overrides the default filter
/// - `LOG_FORMAT=json` switches to JSON lines
/// - `NO_COLOR` disables ANSI colors (for file logging)
pub fn init_tracing() {
    let filter = EnvFilter::new(filter_directives(std::env::var("RUST_LOG").ok()));
    let json = std::env::var("LOG_FORMAT")
        .map(|f| f.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    let no_color = std::env::var("NO_COLOR").is_ok();

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_timer(LocalTime))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_timer(LocalTime)
                    .with_ansi(!no_color),
            )
            .init();
    }
}
