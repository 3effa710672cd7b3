//! Subscriber setup shared by the binaries and by tests that want output.
//!
//! Events go to stderr in compact form so stdout stays reserved for the JSON
//! the helpers print.

use std::sync::Once;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable holding the `EnvFilter` directive.
pub const LOG_ENV: &str = "OGCAPI_LOG";

const DEFAULT_FILTER: &str = "warn";

static INIT: Once = Once::new();

/// Install the global subscriber. Later calls are no-ops.
pub fn init_logging() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

        let console = fmt::layer()
            .compact()
            .with_target(false)
            .with_writer(std::io::stderr);

        // A subscriber installed by the embedding application wins.
        if tracing_subscriber::registry()
            .with(filter)
            .with(console)
            .try_init()
            .is_err()
        {
            return;
        }

        tracing::debug!(filter_env = LOG_ENV, "logging initialised");
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        init_logging();
        init_logging();
    }
}
