//! Logging utilities and structured logging support

pub use log::{debug, info, warn, error, trace};
use log::LevelFilter;

/// Initialize the logging system from `RUST_LOG`
///
/// Safe to call more than once; later calls are ignored.
pub fn init() {
    let _ = env_logger::Builder::from_default_env().try_init();
}

/// Initialize the logging system with a fixed default level
///
/// `RUST_LOG` still overrides the level when it is set.
pub fn init_with_level(level: LevelFilter) {
    let _ = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .try_init();
}

/// Initialize logging for unit tests (captured by the test harness)
pub fn init_for_tests() {
    let _ = env_logger::Builder::new()
        .filter_level(LevelFilter::Trace)
        .is_test(true)
        .try_init();
}
