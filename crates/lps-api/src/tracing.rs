//! Log output of the progress service.
//!
//! Locally the engine's own crates log at debug in a pretty format. Deployed
//! instances emit flattened JSON, one object per event, carrying the span of
//! the request it belongs to.

use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Environment;

/// Directives used when `RUST_LOG` is unset.
///
/// Dependencies stay quiet in both modes; sqlx would otherwise log every
/// statement of the attempt scans.
pub const fn default_filter(env: &Environment) -> &'static str {
    match env {
        Environment::Development => "info,lps_api=debug,lps_db=debug,tower_http=debug,sqlx=warn",
        Environment::Production => "warn,lps_api=info,lps_db=info,tower_http=info,sqlx=warn",
    }
}

/// Install the global subscriber. `RUST_LOG` overrides [`default_filter`].
pub fn init_tracing(env: &Environment) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(env)));

    let layer = if env.is_development() {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_line_number(true)
            .pretty()
            .with_filter(env_filter)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .flatten_event(true)
            .with_target(true)
            .with_filter(env_filter)
            .boxed()
    };

    tracing_subscriber::registry().with(layer).init();

    tracing::info!(
        environment = ?env,
        filter = default_filter(env),
        "Progress service logging ready"
    );
}
