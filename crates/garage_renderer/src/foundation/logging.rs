//! Logging utilities and structured logging support

/// Initialize the logging system with a fallback level
///
/// `RUST_LOG` still wins when set; otherwise `level` (e.g. "info") is used.
/// Calling this more than once is harmless.
pub fn init_with_level(level: &str) {
    let env = env_logger::Env::default().default_filter_or(level);
    let _ = env_logger::Builder::from_env(env).try_init();
}
