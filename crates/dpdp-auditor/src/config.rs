use std::path::{Path, PathBuf};

use crate::error::AppError;
use crate::matcher::DEFAULT_THRESHOLD;

const DEFAULT_RULES_PATH: &str = "data/dpdp_rules.txt";

/// Application configuration loaded explicitly from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Redis connection URL (e.g. "redis://127.0.0.1:6379"). `None` disables caching.
    pub redis_url: Option<String>,
    /// Path to the `<id>:<text>` rule file.
    pub rules_path: String,
    /// Threshold used when a caller does not supply one.
    pub default_threshold: f32,
}

impl Config {
    /// Optional:
    /// - `DPDP_RULES_PATH`: rule file (default: "data/dpdp_rules.txt")
    /// - `AUDIT_DEFAULT_THRESHOLD`: number in [0, 1] (default: 0.5)
    /// - `REDIS_URL`: Redis connection string
    ///
    /// The rule file is deliberately not checked here. A missing file leaves the server
    /// running with zero rules and every audit reports `rules_missing`.
    pub fn from_env() -> Result<Self, AppError> {
        let rules_path =
            std::env::var("DPDP_RULES_PATH").unwrap_or_else(|_| DEFAULT_RULES_PATH.to_string());

        let default_threshold = match std::env::var("AUDIT_DEFAULT_THRESHOLD") {
            Ok(raw) => parse_threshold(&raw)?,
            Err(_) => DEFAULT_THRESHOLD,
        };

        Ok(Self {
            redis_url: std::env::var("REDIS_URL").ok(),
            rules_path,
            default_threshold,
        })
    }

    pub fn rules_path(&self) -> PathBuf {
        Path::new(&self.rules_path).to_path_buf()
    }
}

fn parse_threshold(raw: &str) -> Result<f32, AppError> {
    let value: f32 = raw.trim().parse().map_err(|_| {
        AppError::Config(format!("AUDIT_DEFAULT_THRESHOLD is not a number: {raw:?}"))
    })?;
    if !(0.0..=1.0).contains(&value) {
        return Err(AppError::Config(format!(
            "AUDIT_DEFAULT_THRESHOLD must be within [0, 1], got {value}"
        )));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_parsing() {
        assert_eq!(parse_threshold("0.45").unwrap(), 0.45);
        assert_eq!(parse_threshold(" 1 ").unwrap(), 1.0);
        assert_eq!(parse_threshold("0").unwrap(), 0.0);
        assert!(matches!(parse_threshold("high"), Err(AppError::Config(_))));
        assert!(matches!(parse_threshold("1.2"), Err(AppError::Config(_))));
        assert!(matches!(parse_threshold("NaN"), Err(AppError::Config(_))));
    }
}
