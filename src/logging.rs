use std::str::FromStr;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Install the global subscriber.
///
/// A bare level such as `debug` gets the HTTP stack clamped to `info`; a full
/// directive string (anything with `,` or `=`) is used as-is.
pub fn setup_logging(log_level: &str, json_format: bool) {
    let filter_spec = filter_spec(log_level);
    let filter = EnvFilter::from_str(&filter_spec).unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::registry().with(filter);

    if json_format {
        let json_layer = fmt::layer().json().with_target(false).with_current_span(true);
        subscriber.with(json_layer).init();
    } else {
        let fmt_layer = fmt::layer().with_target(false).compact();
        subscriber.with(fmt_layer).init();
    }

    tracing::debug!(
        filter = %filter_spec,
        format = if json_format { "json" } else { "compact" },
        "Logging initialized"
    );
}

fn filter_spec(log_level: &str) -> String {
    let normalized = log_level.trim();
    if normalized.contains(',') || normalized.contains('=') {
        normalized.to_string()
    } else {
        format!(
            "{},h2=info,hyper=info,hyper_util=info,reqwest=info,alloy_transport_http=info,alloy_rpc_client=info",
            normalized
        )
    }
}
