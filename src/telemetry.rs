// src/telemetry.rs
use metrics::{describe_counter, describe_histogram};
use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const DEFAULT_LOG_FILTER: &str = "bank_sentiment_client=info,warn";

/// One-time metrics registration (so series carry descriptions once a recorder exists).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "analysis_submissions_total",
            "Submissions received, including ones rejected by validation."
        );
        describe_counter!(
            "analysis_outcomes_total",
            "Committed submission outcomes, labelled by outcome."
        );
        describe_counter!(
            "analysis_superseded_total",
            "Resolutions discarded because a newer submission took over."
        );
        describe_histogram!(
            "analysis_request_ms",
            "Wall time from dispatch to resolution, in milliseconds."
        );
    });
}

/// Compact fmt logging for the CLI. `json = true` switches to one JSON object per line.
/// Respects `RUST_LOG`; falls back to `DEFAULT_LOG_FILTER`.
pub fn init_tracing(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let registry = tracing_subscriber::registry().with(filter);
    let res = if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .try_init()
    };
    if let Err(e) = res {
        eprintln!("tracing already initialised: {e}");
    }
}
