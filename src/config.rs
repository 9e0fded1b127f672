use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

/// Credentials and endpoint of the outbound SMS provider.
#[derive(Debug, Clone, Deserialize)]
pub struct SmsConfig {
    pub api_url: String,
    pub username: String,
    pub api_key: String,
    pub sender_id: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub sms: Option<SmsConfig>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET is not set")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "reminder".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "reminder-users".into()),
            ttl_minutes: parse_env("JWT_TTL_MINUTES").unwrap_or(5),
            refresh_ttl_minutes: parse_env("JWT_REFRESH_TTL_MINUTES").unwrap_or(60 * 24),
        };
        Ok(Self {
            database_url,
            jwt,
            sms: SmsConfig::from_env(),
        })
    }
}

impl SmsConfig {
    /// Returns `None` unless both the username and the API key are provided.
    pub fn from_env() -> Option<Self> {
        let username = std::env::var("SMS_USERNAME").ok().filter(|v| !v.is_empty())?;
        let api_key = std::env::var("SMS_API_KEY").ok().filter(|v| !v.is_empty())?;
        Some(Self {
            api_url: std::env::var("SMS_API_URL")
                .unwrap_or_else(|_| "https://api.africastalking.com/version1/messaging".into()),
            username,
            api_key,
            sender_id: std::env::var("SMS_SENDER_ID").ok().filter(|v| !v.is_empty()),
            timeout_secs: parse_env("SMS_TIMEOUT_SECS").unwrap_or(10),
        })
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse::<T>().ok())
}
