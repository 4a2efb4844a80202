use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub s3_bucket: String,
    pub s3_endpoint: String,
    /// Base URL stored résumés are served from. Defaults to the S3 endpoint.
    pub s3_public_url: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub llm_api_key: String,
    pub llm_timeout: Duration,
    /// Idle interview sessions are swept after this long. `None` disables the sweep.
    pub session_idle_ttl: Option<Duration>,
    pub mail: Option<MailSettings>,
    pub port: u16,
    pub rust_log: String,
}

/// Transactional mail API credentials. All three variables must be set to enable mail.
#[derive(Debug, Clone)]
pub struct MailSettings {
    pub api_url: String,
    pub api_key: String,
    pub from: String,
}

const DEFAULT_LLM_TIMEOUT_SECS: u64 = 30;

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let s3_endpoint = require_env("S3_ENDPOINT")?;

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            s3_bucket: require_env("S3_BUCKET")?,
            s3_public_url: optional_env("S3_PUBLIC_URL").unwrap_or_else(|| s3_endpoint.clone()),
            s3_endpoint,
            aws_access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            llm_api_key: require_env("LLM_API_KEY")?,
            llm_timeout: llm_timeout(parse_env("LLM_TIMEOUT_SECS")?)?,
            session_idle_ttl: parse_env::<u64>("SESSION_IDLE_TTL_SECS")?
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
            mail: mail_settings(
                optional_env("MAIL_API_URL"),
                optional_env("MAIL_API_KEY"),
                optional_env("MAIL_FROM"),
            ),
            port: parse_env("PORT")?.unwrap_or(8080),
            rust_log: optional_env("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

/// Unset means the default; zero would time out every model call and is rejected.
fn llm_timeout(secs: Option<u64>) -> Result<Duration> {
    match secs.unwrap_or(DEFAULT_LLM_TIMEOUT_SECS) {
        0 => anyhow::bail!("LLM_TIMEOUT_SECS must be greater than zero"),
        secs => Ok(Duration::from_secs(secs)),
    }
}

fn mail_settings(
    api_url: Option<String>,
    api_key: Option<String>,
    from: Option<String>,
) -> Option<MailSettings> {
    Some(MailSettings {
        api_url: api_url?,
        api_key: api_key?,
        from: from?,
    })
}

fn require_env(key: &str) -> Result<String> {
    optional_env(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Unset and blank values are both treated as absent.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    optional_env(key)
        .map(|raw| {
            raw.parse::<T>()
                .with_context(|| format!("{key} must be a valid number, got '{raw}'"))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_llm_timeout_defaults_and_rejects_zero() {
        assert_eq!(llm_timeout(None).unwrap(), Duration::from_secs(30));
        assert_eq!(llm_timeout(Some(90)).unwrap(), Duration::from_secs(90));

        let err = llm_timeout(Some(0)).unwrap_err();
        assert!(err.to_string().contains("LLM_TIMEOUT_SECS"));
    }

    #[test]
    fn test_mail_requires_all_three_settings() {
        let s = |v: &str| Some(v.to_string());
        assert!(mail_settings(s("https://mail.test"), s("key"), s("jobs@acme.test")).is_some());
        assert!(mail_settings(s("https://mail.test"), None, s("jobs@acme.test")).is_none());
        assert!(mail_settings(None, None, None).is_none());
    }
}
