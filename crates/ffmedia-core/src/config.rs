//! Configuration module
//!
//! Runtime settings for the media tools, read from environment variables
//! (optionally seeded from a `.env` file).

use std::env;
use std::time::Duration;

const TRANSCODE_TIMEOUT_SECS: u64 = 3600;
const PROBE_TIMEOUT_SECS: u64 = 60;
const AVAILABILITY_TIMEOUT_SECS: u64 = 10;
const BATCH_CONCURRENCY: usize = 1;

/// Output format of the log subscriber
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
    /// `None` leaves transcodes unbounded.
    pub transcode_timeout_secs: Option<u64>,
    pub probe_timeout_secs: Option<u64>,
    pub availability_timeout_secs: u64,
    pub batch_concurrency: usize,
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
            transcode_timeout_secs: Some(TRANSCODE_TIMEOUT_SECS),
            probe_timeout_secs: Some(PROBE_TIMEOUT_SECS),
            availability_timeout_secs: AVAILABILITY_TIMEOUT_SECS,
            batch_concurrency: BATCH_CONCURRENCY,
            log_format: LogFormat::Text,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Config {
            ffmpeg_path: lookup("FFMPEG_PATH").unwrap_or_else(|| "ffmpeg".to_string()),
            ffprobe_path: lookup("FFPROBE_PATH").unwrap_or_else(|| "ffprobe".to_string()),
            transcode_timeout_secs: optional_timeout(
                &lookup,
                "TRANSCODE_TIMEOUT_SECS",
                TRANSCODE_TIMEOUT_SECS,
            )?,
            probe_timeout_secs: optional_timeout(&lookup, "PROBE_TIMEOUT_SECS", PROBE_TIMEOUT_SECS)?,
            availability_timeout_secs: parse_or(
                &lookup,
                "AVAILABILITY_TIMEOUT_SECS",
                AVAILABILITY_TIMEOUT_SECS,
            )?,
            batch_concurrency: parse_or(&lookup, "BATCH_CONCURRENCY", BATCH_CONCURRENCY)?,
            log_format: match lookup("LOG_FORMAT")
                .map(|s| s.trim().to_lowercase())
                .as_deref()
            {
                None | Some("") | Some("text") | Some("pretty") => LogFormat::Text,
                Some("json") => LogFormat::Json,
                Some(other) => {
                    return Err(anyhow::anyhow!(
                        "LOG_FORMAT must be 'text' or 'json', got '{}'",
                        other
                    ))
                }
            },
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        validate_binary_path("FFMPEG_PATH", &self.ffmpeg_path)?;
        validate_binary_path("FFPROBE_PATH", &self.ffprobe_path)?;
        if self.batch_concurrency == 0 {
            return Err(anyhow::anyhow!("BATCH_CONCURRENCY must be at least 1"));
        }
        if self.availability_timeout_secs == 0 {
            return Err(anyhow::anyhow!("AVAILABILITY_TIMEOUT_SECS must be at least 1"));
        }
        Ok(())
    }

    pub fn transcode_timeout(&self) -> Option<Duration> {
        self.transcode_timeout_secs.map(Duration::from_secs)
    }

    pub fn probe_timeout(&self) -> Option<Duration> {
        self.probe_timeout_secs.map(Duration::from_secs)
    }

    pub fn availability_timeout(&self) -> Duration {
        Duration::from_secs(self.availability_timeout_secs)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, anyhow::Error>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("{} must be a valid number, got '{}'", key, raw)),
        _ => Ok(default),
    }
}

// 0 disables the timeout
fn optional_timeout<F>(lookup: &F, key: &str, default: u64) -> Result<Option<u64>, anyhow::Error>
where
    F: Fn(&str) -> Option<String>,
{
    let secs: u64 = parse_or(lookup, key, default)?;
    Ok((secs > 0).then_some(secs))
}

fn validate_binary_path(key: &str, path: &str) -> Result<(), anyhow::Error> {
    let dangerous_chars = [';', '|', '&', '$', '`', '(', ')', '<', '>', '\n', '\r'];
    if path.trim().is_empty() {
        return Err(anyhow::anyhow!("{} must not be empty", key));
    }
    if path.chars().any(|c| dangerous_chars.contains(&c)) {
        return Err(anyhow::anyhow!("Invalid {}: contains dangerous characters", key));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.ffmpeg_path, "ffmpeg");
        assert_eq!(config.ffprobe_path, "ffprobe");
        assert_eq!(config.transcode_timeout(), Some(Duration::from_secs(3600)));
        assert_eq!(config.availability_timeout(), Duration::from_secs(10));
        assert_eq!(config.batch_concurrency, 1);
        assert_eq!(config.log_format, LogFormat::Text);
    }

    #[test]
    fn test_zero_timeout_disables() {
        let config = Config::from_lookup(lookup(&[
            ("TRANSCODE_TIMEOUT_SECS", "0"),
            ("PROBE_TIMEOUT_SECS", "15"),
        ]))
        .unwrap();
        assert_eq!(config.transcode_timeout(), None);
        assert_eq!(config.probe_timeout(), Some(Duration::from_secs(15)));
    }

    #[test]
    fn test_invalid_number_is_rejected() {
        let err = Config::from_lookup(lookup(&[("BATCH_CONCURRENCY", "many")])).unwrap_err();
        assert!(err.to_string().contains("BATCH_CONCURRENCY"));

        let err = Config::from_lookup(lookup(&[("BATCH_CONCURRENCY", "0")])).unwrap_err();
        assert!(err.to_string().contains("at least 1"));
    }

    #[test]
    fn test_dangerous_binary_path_rejected() {
        let err = Config::from_lookup(lookup(&[("FFMPEG_PATH", "ffmpeg; rm -rf /")])).unwrap_err();
        assert!(err.to_string().contains("dangerous"));
    }

    #[test]
    fn test_log_format() {
        let config = Config::from_lookup(lookup(&[("LOG_FORMAT", "JSON")])).unwrap();
        assert_eq!(config.log_format, LogFormat::Json);
        assert!(Config::from_lookup(lookup(&[("LOG_FORMAT", "xml")])).is_err());
    }
}
