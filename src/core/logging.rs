//! Logging initialization and utilities

/// Initialize the logging system
///
/// Uses env_logger with a default filter level of `info`; override with the
/// RUST_LOG environment variable.
///
/// # Example
/// ```
/// voxide::core::logging::init();
/// log::info!("world ready");
/// ```
pub fn init() {
    init_with("info");
}

/// Initialize with an explicit default filter, e.g. `"voxide=debug"`.
/// RUST_LOG still takes precedence when set.
pub fn init_with(default_filter: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}
