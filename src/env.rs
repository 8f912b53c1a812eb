//! Environment variable names used by this crate.
//!
//! These are purely helpers; the formatter itself never reads the
//! environment.

/// Severity threshold override, e.g. `debug`.
pub const STRUCTURED_LOG_LEVEL_ENV: &str = "STRUCTURED_LOG_LEVEL";

/// Deployment environment name, exposed as `env.NODE_ENV`.
pub const NODE_ENV: &str = "NODE_ENV";

/// Compute / application name, exposed as `env.CONFIG_COMPUTE`.
pub const CONFIG_COMPUTE_ENV: &str = "CONFIG_COMPUTE";

/// Platform name, exposed as `env.CONFIG_PLATFORM`.
pub const CONFIG_PLATFORM_ENV: &str = "CONFIG_PLATFORM";

/// Variables copied into `env` by
/// [`LoggerConfig::with_process_context`](crate::config::LoggerConfig::with_process_context).
pub const APP_CONTEXT_VARS: [&str; 3] = [NODE_ENV, CONFIG_COMPUTE_ENV, CONFIG_PLATFORM_ENV];

/// Read an environment variable or fall back to a provided default.
pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
