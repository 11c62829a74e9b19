//! Logging utilities and structured logging support

use env_logger::{Builder, Env};

pub use log::{debug, info, warn, error, trace};

/// Initialize the logging system from `RUST_LOG`
pub fn init() {
    env_logger::init();
}

/// Initialize logging from `RUST_LOG`, falling back to `default_level`
/// (e.g. `"info"`) when the variable is unset
pub fn init_with_default(default_level: &str) {
    builder(Env::default(), default_level).init();
}

/// Initialize logging for tests; safe to call from every test
pub fn init_for_tests() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn builder<'a>(env: Env<'a>, default_level: &'a str) -> Builder {
    Builder::from_env(env.default_filter_or(default_level))
}
