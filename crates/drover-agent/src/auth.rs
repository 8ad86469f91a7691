//! Authentication for the model completion API
//!
//! The key is resolved from the configured environment variable first,
//! falling back to `ANTHROPIC_API_KEY` so standard setups work without any
//! Drover-specific configuration.

use drover_core::{DroverError, Result};
use std::env;

const FALLBACK_KEY_ENV: &str = "ANTHROPIC_API_KEY";

/// Resolve the model API key.
///
/// Priority:
/// 1. The environment variable named by the configuration
/// 2. `ANTHROPIC_API_KEY`
pub fn get_api_key(configured_env: &str) -> Result<String> {
    if let Ok(key) = env::var(configured_env) {
        tracing::debug!("Using model API key from {}", configured_env);
        return Ok(key);
    }

    if configured_env != FALLBACK_KEY_ENV {
        if let Ok(key) = env::var(FALLBACK_KEY_ENV) {
            tracing::debug!("Using model API key from {}", FALLBACK_KEY_ENV);
            return Ok(key);
        }
    }

    Err(DroverError::Auth(format!(
        "No model API key found. Set {} (or {}) to an API key.",
        configured_env, FALLBACK_KEY_ENV
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Mutex to prevent concurrent env var modifications
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn with_env_vars<F, R>(vars: &[(&str, Option<&str>)], f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let _guard = ENV_LOCK.lock().unwrap();

        let originals: Vec<_> = vars.iter().map(|(k, _)| (*k, env::var(k).ok())).collect();

        for (key, value) in vars {
            match value {
                Some(v) => env::set_var(key, v),
                None => env::remove_var(key),
            }
        }

        let result = f();

        for (key, original) in originals {
            match original {
                Some(v) => env::set_var(key, v),
                None => env::remove_var(key),
            }
        }

        result
    }

    #[test]
    fn test_configured_env_has_priority() {
        with_env_vars(
            &[
                ("DROVER_TEST_KEY", Some("configured")),
                ("ANTHROPIC_API_KEY", Some("fallback")),
            ],
            || {
                let key = get_api_key("DROVER_TEST_KEY").unwrap();
                assert_eq!(key, "configured");
            },
        );
    }

    #[test]
    fn test_fallback_env() {
        with_env_vars(
            &[
                ("DROVER_TEST_KEY", None),
                ("ANTHROPIC_API_KEY", Some("fallback")),
            ],
            || {
                let key = get_api_key("DROVER_TEST_KEY").unwrap();
                assert_eq!(key, "fallback");
            },
        );
    }

    #[test]
    fn test_no_key() {
        with_env_vars(
            &[("DROVER_TEST_KEY", None), ("ANTHROPIC_API_KEY", None)],
            || {
                assert!(get_api_key("DROVER_TEST_KEY").is_err());
            },
        );
    }
}
