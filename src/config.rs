use crate::errors::DashboardError;
use crate::timemath::{parse_clock, DEFAULT_DAY_END, DEFAULT_DAY_START};
use std::{env, path::PathBuf, time::Duration};

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_path: PathBuf,
    pub remote_url: Option<String>,
    pub remote_timeout: Duration,
    pub schedule_refresh: Duration,
    pub ledger_refresh: Duration,
    pub ledger_today_only: bool,
    pub day_start: u32,
    pub day_end: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            data_path: PathBuf::from("data/completions.json"),
            remote_url: None,
            remote_timeout: Duration::from_secs(10),
            schedule_refresh: Duration::from_secs(5 * 60),
            ledger_refresh: Duration::from_secs(10 * 60),
            ledger_today_only: false,
            day_start: DEFAULT_DAY_START,
            day_end: DEFAULT_DAY_END,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, DashboardError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from any key lookup. Unparseable numbers keep their
    /// defaults; bad day bounds are an error.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, DashboardError> {
        let defaults = Self::default();
        let secs = |key: &str, default: Duration| {
            lookup(key)
                .and_then(|value| value.trim().parse::<u64>().ok())
                .filter(|&secs| secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(default)
        };

        let day_start = match lookup("DAY_START") {
            Some(value) => parse_clock(value.trim())?,
            None => defaults.day_start,
        };
        let day_end = match lookup("DAY_END") {
            Some(value) => parse_clock(value.trim())?,
            None => defaults.day_end,
        };
        if day_end <= day_start {
            return Err(DashboardError::Format("DAY_END must be after DAY_START".into()));
        }

        Ok(Self {
            port: lookup("PORT")
                .and_then(|value| value.parse::<u16>().ok())
                .unwrap_or(defaults.port),
            data_path: lookup("APP_DATA_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_path),
            remote_url: lookup("DASHBOARD_REMOTE_URL")
                .map(|url| url.trim().to_string())
                .filter(|url| !url.is_empty()),
            remote_timeout: secs("REMOTE_TIMEOUT_SECS", defaults.remote_timeout),
            schedule_refresh: secs("SCHEDULE_REFRESH_SECS", defaults.schedule_refresh),
            ledger_refresh: secs("LEDGER_REFRESH_SECS", defaults.ledger_refresh),
            ledger_today_only: lookup("LEDGER_TODAY_ONLY")
                .map(|value| matches!(value.trim(), "1" | "true" | "yes"))
                .unwrap_or(defaults.ledger_today_only),
            day_start,
            day_end,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Result<Config, DashboardError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.port, 8080);
        assert!(cfg.remote_url.is_none());
        assert_eq!(cfg.schedule_refresh, Duration::from_secs(300));
        assert_eq!(cfg.ledger_refresh, Duration::from_secs(600));
        assert_eq!((cfg.day_start, cfg.day_end), (350, 1390));
    }

    #[test]
    fn reads_overrides_and_ignores_garbage_numbers() {
        let cfg = config(&[
            ("PORT", "9000"),
            ("DASHBOARD_REMOTE_URL", " https://example.invalid/ "),
            ("SCHEDULE_REFRESH_SECS", "soon"),
            ("LEDGER_REFRESH_SECS", "30"),
            ("LEDGER_TODAY_ONLY", "true"),
            ("DAY_START", "06:00"),
        ])
        .unwrap();
        assert_eq!(cfg.port, 9000);
        assert_eq!(cfg.remote_url.as_deref(), Some("https://example.invalid/"));
        assert_eq!(cfg.schedule_refresh, Duration::from_secs(300));
        assert_eq!(cfg.ledger_refresh, Duration::from_secs(30));
        assert!(cfg.ledger_today_only);
        assert_eq!(cfg.day_start, 360);
    }

    #[test]
    fn rejects_bad_day_bounds() {
        assert!(config(&[("DAY_START", "6am")]).is_err());
        assert!(config(&[("DAY_START", "22:00"), ("DAY_END", "21:00")]).is_err());
    }
}
