//! Demo configuration read from `TILLCACHE_*` environment variables.

use std::env::VarError;
use std::num::ParseIntError;
use std::time::Duration;

use thiserror::Error;

pub const WORKERS_VAR: &str = "TILLCACHE_WORKERS";
pub const KEYS_PER_WORKER_VAR: &str = "TILLCACHE_KEYS_PER_WORKER";
pub const TTL_MS_VAR: &str = "TILLCACHE_TTL_MS";

/// Errors raised while reading the demo configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A variable was set to something that is not a number
    #[error("invalid value {value:?} for {name}: {source}")]
    Invalid {
        name: &'static str,
        value: String,
        #[source]
        source: ParseIntError,
    },

    /// A variable was set to bytes that are not valid unicode
    #[error("{name} is not valid unicode: {value:?}")]
    NotUnicode { name: &'static str, value: String },

    /// A variable that must be positive was set to zero
    #[error("{name} must be greater than zero")]
    Zero { name: &'static str },

    /// Workers times keys per worker does not fit in a `usize`
    #[error("{workers} workers with {keys_per_worker} keys each is too many keys")]
    TooManyKeys {
        workers: usize,
        keys_per_worker: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoConfig {
    /// Number of concurrent writer tasks
    pub workers: usize,
    /// Keys written by each task; half never expire, half expire after `ttl`
    pub keys_per_worker: usize,
    /// `workers * keys_per_worker`
    pub total_keys: usize,
    /// Lifetime of the expiring keys
    pub ttl: Duration,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            workers: 8,
            keys_per_worker: 500,
            total_keys: 8 * 500,
            ttl: Duration::from_millis(200),
        }
    }
}

impl DemoConfig {
    /// Reads the configuration from the process environment.
    ///
    /// Unset variables fall back to the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name))
    }

    /// Reads the configuration through `lookup`, which behaves like `std::env::var`
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Result<String, VarError>,
    {
        let defaults = Self::default();

        let workers = parse_positive(&lookup, WORKERS_VAR)?.unwrap_or(defaults.workers);
        let keys_per_worker =
            parse_positive(&lookup, KEYS_PER_WORKER_VAR)?.unwrap_or(defaults.keys_per_worker);
        let ttl = parse_positive(&lookup, TTL_MS_VAR)?
            .map(|ms| Duration::from_millis(ms as u64))
            .unwrap_or(defaults.ttl);

        let total_keys = workers
            .checked_mul(keys_per_worker)
            .ok_or(ConfigError::TooManyKeys {
                workers,
                keys_per_worker,
            })?;

        Ok(Self {
            workers,
            keys_per_worker,
            total_keys,
            ttl,
        })
    }
}

fn parse_positive<F>(lookup: &F, name: &'static str) -> Result<Option<usize>, ConfigError>
where
    F: Fn(&str) -> Result<String, VarError>,
{
    let raw = match lookup(name) {
        Ok(raw) => raw,
        Err(VarError::NotPresent) => return Ok(None),
        Err(VarError::NotUnicode(os)) => {
            return Err(ConfigError::NotUnicode {
                name,
                value: os.to_string_lossy().into_owned(),
            })
        }
    };

    let parsed: usize = raw.trim().parse().map_err(|source| ConfigError::Invalid {
        name,
        value: raw.clone(),
        source,
    })?;

    if parsed == 0 {
        return Err(ConfigError::Zero { name });
    }

    Ok(Some(parsed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Result<String, VarError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned().ok_or(VarError::NotPresent)
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = DemoConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, DemoConfig::default());
        assert_eq!(config.total_keys, config.workers * config.keys_per_worker);
    }

    #[test]
    fn test_overrides() {
        let config = DemoConfig::from_lookup(lookup_from(&[
            (WORKERS_VAR, "4"),
            (KEYS_PER_WORKER_VAR, " 10 "),
            (TTL_MS_VAR, "50"),
        ]))
        .unwrap();

        assert_eq!(config.workers, 4);
        assert_eq!(config.keys_per_worker, 10);
        assert_eq!(config.total_keys, 40);
        assert_eq!(config.ttl, Duration::from_millis(50));
    }

    #[test]
    fn test_invalid_value_is_rejected() {
        let err = DemoConfig::from_lookup(lookup_from(&[(WORKERS_VAR, "many")])).unwrap_err();

        assert!(matches!(err, ConfigError::Invalid { name: WORKERS_VAR, .. }));
        assert!(err.to_string().contains("\"many\""));
    }

    #[test]
    fn test_zero_is_rejected() {
        let err = DemoConfig::from_lookup(lookup_from(&[(TTL_MS_VAR, "0")])).unwrap_err();

        assert!(matches!(err, ConfigError::Zero { name: TTL_MS_VAR }));
        assert_eq!(err.to_string(), "TILLCACHE_TTL_MS must be greater than zero");
    }

    #[cfg(unix)]
    #[test]
    fn test_non_unicode_value_is_rejected() {
        use std::ffi::OsString;
        use std::os::unix::ffi::OsStringExt;

        let lookup = |name: &str| -> Result<String, VarError> {
            if name == WORKERS_VAR {
                Err(VarError::NotUnicode(OsString::from_vec(vec![0x34, 0xff])))
            } else {
                Err(VarError::NotPresent)
            }
        };

        let err = DemoConfig::from_lookup(lookup).unwrap_err();

        assert!(matches!(err, ConfigError::NotUnicode { name: WORKERS_VAR, .. }));
        assert!(err.to_string().starts_with("TILLCACHE_WORKERS is not valid unicode"));
    }

    #[test]
    fn test_key_count_overflow_is_rejected() {
        let max = usize::MAX.to_string();
        let err = DemoConfig::from_lookup(lookup_from(&[
            (WORKERS_VAR, max.as_str()),
            (KEYS_PER_WORKER_VAR, max.as_str()),
        ]))
        .unwrap_err();

        assert!(matches!(
            err,
            ConfigError::TooManyKeys {
                workers: usize::MAX,
                keys_per_worker: usize::MAX,
            }
        ));
    }

    #[test]
    fn test_key_count_at_limit_is_accepted() {
        let max = usize::MAX.to_string();
        let config = DemoConfig::from_lookup(lookup_from(&[
            (WORKERS_VAR, "1"),
            (KEYS_PER_WORKER_VAR, max.as_str()),
        ]))
        .unwrap();

        assert_eq!(config.total_keys, usize::MAX);
    }
}
