//! Tracing subscriber setup for harness runs.

use std::sync::Once;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

static INIT: Once = Once::new();

/// Initialize the tracing subscriber. Later calls are no-ops.
///
/// Behavior:
/// - Log level is read from `TESTRAIL_LOG_LEVEL` if set, otherwise falls back to `RUST_LOG`,
///   then to `info`.
/// - `TESTRAIL_LOG_FORMAT=json` switches to JSON output. Any other value uses the
///   human-readable formatter.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = match std::env::var("TESTRAIL_LOG_LEVEL") {
            Ok(lvl) => EnvFilter::new(lvl),
            Err(_) => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        };

        let use_json = std::env::var("TESTRAIL_LOG_FORMAT")
            .map(|v| v.to_lowercase() == "json")
            .unwrap_or(false);

        let registry = Registry::default().with(filter);
        let installed = if use_json {
            registry
                .with(fmt::layer().json().with_target(false))
                .try_init()
        } else {
            registry
                .with(
                    fmt::layer()
                        .with_target(false)
                        .with_file(true)
                        .with_line_number(true)
                        .with_test_writer(),
                )
                .try_init()
        };
        if let Err(err) = installed {
            tracing::debug!(%err, "keeping the already installed subscriber");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn existing_subscriber_is_kept() {
        let _ = tracing::subscriber::set_global_default(Registry::default());
        init_tracing();
        init_tracing();
        assert!(INIT.is_completed());
    }
}
