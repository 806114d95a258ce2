use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::{Error, Result};

/// Default length of the trailing trend window, in days.
pub const DEFAULT_WINDOW_DAYS: u32 = 180;

/// Default number of tickets per LLM prompt batch.
pub const DEFAULT_BATCH_SIZE: usize = 50;

/// Run configuration, passed explicitly into the entry point.
///
/// Everything the run depends on lives here: no environment reads or
/// process-wide defaults happen past construction. The `now` override
/// makes trend output reproducible in tests and re-runs.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the JSON ticket source.
    pub source: PathBuf,
    /// Directory where per-company report folders are created.
    pub output_dir: PathBuf,
    /// Trailing window for temporal trends, in days.
    pub window_days: u32,
    /// Reference timestamp for the trailing window; wall clock when unset.
    pub now: Option<NaiveDateTime>,
    /// LLM provider: "bedrock" or "anthropic".
    pub llm_provider: String,
    /// LLM model name.
    pub llm_model: String,
    /// Tickets per prompt batch when a company group is split.
    pub batch_size: usize,
    /// Retry bound for transient LLM failures.
    pub max_retries: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: PathBuf::from("data.json"),
            output_dir: PathBuf::from("summaries"),
            window_days: DEFAULT_WINDOW_DAYS,
            now: None,
            llm_provider: "bedrock".to_string(),
            llm_model: "claude-sonnet-4-5".to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
            max_retries: 3,
        }
    }
}

impl Config {
    /// The reference timestamp this run's trailing window is anchored to.
    pub fn reference_now(&self) -> NaiveDateTime {
        self.now
            .unwrap_or_else(|| chrono::Local::now().naive_local())
    }
}

/// Parse a `--now` override: "YYYY-MM-DD HH:MM" or bare "YYYY-MM-DD".
pub fn parse_now(s: &str) -> Result<NaiveDateTime> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M") {
        return Ok(dt);
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map(|d| d.and_time(chrono::NaiveTime::MIN))
        .map_err(|_| Error::Config(format!("invalid reference timestamp: {s}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_now_with_time() {
        let dt = parse_now("2024-04-01 09:30").unwrap();
        assert_eq!(dt.to_string(), "2024-04-01 09:30:00");
    }

    #[test]
    fn test_parse_now_date_only() {
        let dt = parse_now("2024-04-01").unwrap();
        assert_eq!(dt.to_string(), "2024-04-01 00:00:00");
    }

    #[test]
    fn test_parse_now_invalid() {
        assert!(parse_now("april 1st").is_err());
    }

    #[test]
    fn test_reference_now_override() {
        let config = Config {
            now: Some(parse_now("2024-04-01").unwrap()),
            ..Config::default()
        };
        assert_eq!(config.reference_now().to_string(), "2024-04-01 00:00:00");
    }
}
