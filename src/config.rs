use std::net::SocketAddr;
use std::time::Duration;

/// Runtime settings, read from the environment (and `.env` when present).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub sync_interval: Duration,
    pub remote_timeout: Duration,
    pub seed_default_columns: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite:data.db?mode=rwc".to_string(),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            sync_interval: Duration::from_millis(5000),
            remote_timeout: Duration::from_millis(10_000),
            seed_default_columns: false,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup; unset keys keep defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = Self::default();

        let bind_addr = match lookup("BIND_ADDR") {
            Some(raw) => raw
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid BIND_ADDR {:?}: {}", raw, e))?,
            None => defaults.bind_addr,
        };

        Ok(Self {
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            bind_addr,
            sync_interval: millis(&lookup, "SYNC_INTERVAL_MS")?.unwrap_or(defaults.sync_interval),
            remote_timeout: millis(&lookup, "REMOTE_TIMEOUT_MS")?
                .unwrap_or(defaults.remote_timeout),
            seed_default_columns: match lookup("SEED_DEFAULT_COLUMNS") {
                Some(raw) => matches!(raw.to_lowercase().as_str(), "1" | "true" | "yes"),
                None => defaults.seed_default_columns,
            },
        })
    }
}

fn millis(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> anyhow::Result<Option<Duration>> {
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };

    let ms: u64 = raw
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid {} {:?}: {}", key, raw, e))?;
    if ms == 0 {
        anyhow::bail!("{} must be greater than zero", key);
    }

    Ok(Some(Duration::from_millis(ms)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> anyhow::Result<Config> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.sync_interval, Duration::from_secs(5));
        assert_eq!(config.bind_addr.port(), 3000);
        assert!(!config.seed_default_columns);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("SYNC_INTERVAL_MS", "250"),
            ("BIND_ADDR", "0.0.0.0:8080"),
            ("SEED_DEFAULT_COLUMNS", "true"),
        ])
        .unwrap();
        assert_eq!(config.sync_interval, Duration::from_millis(250));
        assert_eq!(config.bind_addr.port(), 8080);
        assert!(config.seed_default_columns);
    }

    #[test]
    fn test_rejects_zero_interval() {
        assert!(config_from(&[("SYNC_INTERVAL_MS", "0")]).is_err());
        assert!(config_from(&[("REMOTE_TIMEOUT_MS", "soon")]).is_err());
    }
}
