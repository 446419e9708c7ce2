//! Marketplace is a microservice responsible for the b2b catalog.
//! This create is for running the service from `marketplace_lib`. See `marketplace_lib` for details.

extern crate env_logger;
extern crate marketplace_lib;

fn main() {
    // Prepare logger
    env_logger::init();

    let config = marketplace_lib::config::Config::new().expect("Can't load app config!");

    // Prepare sentry integration
    let _sentry = marketplace_lib::sentry_integration::init(config.sentry.as_ref());

    marketplace_lib::start_server(config, &None, || ());
}
