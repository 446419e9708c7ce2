//! Sentry integration, reports panics of the running service
use sentry;
use sentry::integrations::panic::register_panic_handler;
use sentry::internals::ClientInitGuard;

use config::SentryConfig;

pub fn init(config: Option<&SentryConfig>) -> Option<ClientInitGuard> {
    config.map(|sentry_config| {
        info!("Sentry integration enabled.");
        let guard = sentry::init(sentry_config.dsn.as_str());
        register_panic_handler();
        guard
    })
}
