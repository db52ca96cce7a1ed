//! Logging setup.
//!
//! The crate emits `tracing` events while serializing: a `debug` event for
//! every `filtered` wrapper, a `warn` event when a filter attached to a node
//! without a query is dropped, and `trace` events for compound filters.
//!
//! # Environment Variables
//!
//! - `ESDSL_DEBUG=true|1|yes` - Enable debug logging
//! - `ESDSL_LOG_LEVEL=trace|debug|info|warn|error` - Set a specific log level
//! - `ESDSL_LOG_FORMAT=json|pretty|compact` - Output format (default: json)
//!
//! ```rust,no_run
//! use esdsl_query::logging;
//!
//! // Call once at startup; a no-op unless logging was requested.
//! logging::init();
//! ```

use std::env;
use std::sync::Once;

static INIT: Once = Once::new();

/// Check if `ESDSL_DEBUG` enables debug logging.
#[inline]
pub fn is_debug_enabled() -> bool {
    env::var("ESDSL_DEBUG")
        .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(false)
}

/// Log level from `ESDSL_LOG_LEVEL`.
///
/// Falls back to "debug" when `ESDSL_DEBUG` is set and "warn" otherwise.
pub fn get_log_level() -> &'static str {
    let fallback = if is_debug_enabled() { "debug" } else { "warn" };
    match env::var("ESDSL_LOG_LEVEL") {
        Ok(level) => match level.to_lowercase().as_str() {
            "trace" => "trace",
            "debug" => "debug",
            "info" => "info",
            "warn" => "warn",
            "error" => "error",
            _ => fallback,
        },
        Err(_) => fallback,
    }
}

/// Log format from `ESDSL_LOG_FORMAT`, defaulting to "json".
pub fn get_log_format() -> &'static str {
    env::var("ESDSL_LOG_FORMAT")
        .map(|f| match f.to_lowercase().as_str() {
            "pretty" => "pretty",
            "compact" => "compact",
            _ => "json",
        })
        .unwrap_or("json")
}

/// Install a global subscriber for this crate's events.
///
/// Does nothing unless `ESDSL_DEBUG` or `ESDSL_LOG_LEVEL` is set, or when the
/// `tracing-subscriber` feature is disabled. Subsequent calls are no-ops.
pub fn init() {
    INIT.call_once(|| {
        if !is_debug_enabled() && env::var("ESDSL_LOG_LEVEL").is_err() {
            return;
        }

        #[cfg(feature = "tracing-subscriber")]
        {
            use tracing_subscriber::{EnvFilter, fmt, prelude::*};

            let level = get_log_level();
            let filter = EnvFilter::try_new(format!("esdsl={},esdsl_query={}", level, level))
                .unwrap_or_else(|_| EnvFilter::new("warn"));

            let registry = tracing_subscriber::registry().with(filter);
            let installed = match get_log_format() {
                "json" => registry.with(fmt::layer().json()).try_init(),
                "compact" => registry.with(fmt::layer().compact()).try_init(),
                _ => registry.with(fmt::layer().pretty()).try_init(),
            };

            if installed.is_ok() {
                tracing::info!(
                    level = level,
                    format = get_log_format(),
                    "esdsl logging initialized"
                );
            }
        }
    });
}
