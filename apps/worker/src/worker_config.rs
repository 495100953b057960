use std::env;
use std::str::FromStr;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use warden_application::{InvitationPolicy, StoragePolicy};
use warden_core::{AppError, AppResult};
use warden_infrastructure::SmtpEmailConfig;

const DEFAULT_ACCEPT_URL: &str = "http://localhost:3000/accept-invite";
const MAX_INVITATION_TTL_HOURS: i64 = InvitationPolicy::MAX_TTL_DAYS * 24;
const MAX_INVITATION_RETENTION_HOURS: i64 = 10 * 365 * 24;
const MAX_SWEEP_INTERVAL_SECONDS: u64 = 24 * 60 * 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailProviderConfig {
    Console,
    Smtp(SmtpEmailConfig),
}

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub invitation_policy: InvitationPolicy,
    pub storage_policy: StoragePolicy,
    pub sweep_interval: Duration,
    pub invitation_retention: chrono::Duration,
    pub bootstrap_admin_email: Option<String>,
    pub email_provider: EmailProviderConfig,
}

impl WorkerConfig {
    pub fn load() -> AppResult<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        let ttl_hours = parse_var::<i64>(&lookup, "INVITATION_TTL_HOURS", 168)?;
        if !(1..=MAX_INVITATION_TTL_HOURS).contains(&ttl_hours) {
            return Err(AppError::Validation(format!(
                "INVITATION_TTL_HOURS must be between 1 and {MAX_INVITATION_TTL_HOURS}"
            )));
        }
        let accept_url =
            lookup("INVITATION_ACCEPT_URL").unwrap_or_else(|| DEFAULT_ACCEPT_URL.to_owned());
        let invitation_policy = InvitationPolicy::new(hours(ttl_hours)?, accept_url)
            .map_err(|error| AppError::Validation(format!("invalid invitation settings: {error}")))?;

        let timeout_ms = parse_var::<u64>(&lookup, "STORAGE_TIMEOUT_MS", 5000)?;
        let max_write_attempts = parse_var::<u32>(&lookup, "STORAGE_MAX_WRITE_ATTEMPTS", 5)?;
        let storage_policy =
            StoragePolicy::new(Duration::from_millis(timeout_ms), max_write_attempts)
                .map_err(|error| AppError::Validation(format!("invalid storage settings: {error}")))?;

        let sweep_interval_seconds =
            parse_var::<u64>(&lookup, "INVITATION_SWEEP_INTERVAL_SECONDS", 300)?;
        if !(1..=MAX_SWEEP_INTERVAL_SECONDS).contains(&sweep_interval_seconds) {
            return Err(AppError::Validation(format!(
                "INVITATION_SWEEP_INTERVAL_SECONDS must be between 1 and {MAX_SWEEP_INTERVAL_SECONDS}"
            )));
        }

        let retention_hours = parse_var::<i64>(&lookup, "INVITATION_RETENTION_HOURS", 720)?;
        if !(0..=MAX_INVITATION_RETENTION_HOURS).contains(&retention_hours) {
            return Err(AppError::Validation(format!(
                "INVITATION_RETENTION_HOURS must be between 0 and {MAX_INVITATION_RETENTION_HOURS}"
            )));
        }

        let bootstrap_admin_email = lookup("BOOTSTRAP_ADMIN_EMAIL")
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty());

        let email_provider = match lookup("EMAIL_PROVIDER")
            .unwrap_or_else(|| "console".to_owned())
            .as_str()
        {
            "console" => EmailProviderConfig::Console,
            "smtp" => {
                let port = required_non_empty_var(&lookup, "SMTP_PORT")?
                    .parse::<u16>()
                    .map_err(|error| AppError::Validation(format!("invalid SMTP_PORT: {error}")))?;
                EmailProviderConfig::Smtp(SmtpEmailConfig {
                    host: required_non_empty_var(&lookup, "SMTP_HOST")?,
                    port,
                    username: required_non_empty_var(&lookup, "SMTP_USERNAME")?,
                    password: required_non_empty_var(&lookup, "SMTP_PASSWORD")?,
                    from_address: required_non_empty_var(&lookup, "SMTP_FROM_ADDRESS")?,
                })
            }
            other => {
                return Err(AppError::Validation(format!(
                    "EMAIL_PROVIDER must be either 'console' or 'smtp', got '{other}'"
                )));
            }
        };

        Ok(Self {
            invitation_policy,
            storage_policy,
            sweep_interval: Duration::from_secs(sweep_interval_seconds),
            invitation_retention: hours(retention_hours)?,
            bootstrap_admin_email,
            email_provider,
        })
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> AppResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(value) => value.trim().parse::<T>().map_err(|error| {
            AppError::Validation(format!("invalid {name} value '{value}': {error}"))
        }),
        None => Ok(default),
    }
}

fn hours(value: i64) -> AppResult<chrono::Duration> {
    chrono::Duration::try_hours(value)
        .ok_or_else(|| AppError::Validation(format!("{value} hours is out of range")))
}

fn required_non_empty_var(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
) -> AppResult<String> {
    let value = lookup(name).ok_or_else(|| AppError::Validation(format!("{name} is required")))?;
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{name} must not be empty")));
    }

    Ok(value)
}
