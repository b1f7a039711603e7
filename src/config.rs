use anyhow::{Context, Result, bail};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;
use strum::IntoEnumIterator;

use crate::model::leave_request::LeaveType;

#[derive(Clone, Debug)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from: String,
    pub tls: bool,
}

/// Days granted per leave type at the start of each accounting period.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Allotments {
    pub casual: i64,
    pub sick: i64,
    pub earned: i64,
}

impl Default for Allotments {
    fn default() -> Self {
        Self {
            casual: 12,
            sick: 10,
            earned: 15,
        }
    }
}

/// Environment variable overriding the allotment of `leave_type`.
fn allotment_var(leave_type: LeaveType) -> &'static str {
    match leave_type {
        LeaveType::Casual => "CASUAL_LEAVE_ALLOTMENT",
        LeaveType::Sick => "SICK_LEAVE_ALLOTMENT",
        LeaveType::Earned => "EARNED_LEAVE_ALLOTMENT",
    }
}

impl Allotments {
    pub fn for_type(&self, leave_type: LeaveType) -> i64 {
        match leave_type {
            LeaveType::Casual => self.casual,
            LeaveType::Sick => self.sick,
            LeaveType::Earned => self.earned,
        }
    }

    fn from_env(defaults: Allotments) -> Result<Self> {
        let allotments = Allotments {
            casual: parsed(allotment_var(LeaveType::Casual), defaults.casual)?,
            sick: parsed(allotment_var(LeaveType::Sick), defaults.sick)?,
            earned: parsed(allotment_var(LeaveType::Earned), defaults.earned)?,
        };
        allotments.validate()?;
        Ok(allotments)
    }

    /// Balances are counted down from these values and may never go negative.
    pub fn validate(&self) -> Result<()> {
        for leave_type in LeaveType::iter() {
            let days = self.for_type(leave_type);
            if days < 0 {
                bail!(
                    "{} must not be negative (got {days})",
                    allotment_var(leave_type)
                );
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub db_max_connections: u32,
    pub jwt_secret: String,
    pub server_addr: String,
    pub access_token_ttl: usize,
    pub refresh_token_ttl: usize,

    // Rate limiting
    pub rate_login_per_min: u32,
    pub rate_register_per_min: u32,
    pub rate_refresh_per_min: u32,
    pub rate_protected_per_min: u32,

    pub api_prefix: String,
    pub allotments: Allotments,
    pub smtp: Option<SmtpConfig>,

    pub bootstrap_admin: Option<(String, String)>,
    pub log_dir: String,
}

impl Config {
    /// Defaults for everything but the three required settings.
    pub fn new(server_addr: &str, database_url: &str, jwt_secret: &str) -> Self {
        Self {
            server_addr: server_addr.to_string(),
            database_url: database_url.to_string(),
            db_max_connections: 5,
            jwt_secret: jwt_secret.to_string(),
            access_token_ttl: 900,     // 15 min
            refresh_token_ttl: 604800, // 7 days
            rate_login_per_min: 60,
            rate_register_per_min: 30,
            rate_refresh_per_min: 30,
            rate_protected_per_min: 1000,
            api_prefix: "/api".to_string(),
            allotments: Allotments::default(),
            smtp: None,
            bootstrap_admin: None,
            log_dir: "logs".to_string(),
        }
    }

    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let mut config = Self::new(
            &required("SERVER_ADDR")?,
            &required("DATABASE_URL")?,
            &required("JWT_SECRET")?,
        );

        config.db_max_connections = parsed("DB_MAX_CONNECTIONS", config.db_max_connections)?;
        config.access_token_ttl = parsed("ACCESS_TOKEN_TTL", config.access_token_ttl)?;
        config.refresh_token_ttl = parsed("REFRESH_TOKEN_TTL", config.refresh_token_ttl)?;

        config.rate_login_per_min = parsed("RATE_LOGIN_PER_MIN", config.rate_login_per_min)?;
        config.rate_register_per_min =
            parsed("RATE_REGISTER_PER_MIN", config.rate_register_per_min)?;
        config.rate_refresh_per_min = parsed("RATE_REFRESH_PER_MIN", config.rate_refresh_per_min)?;
        config.rate_protected_per_min =
            parsed("RATE_PROTECTED_PER_MIN", config.rate_protected_per_min)?;

        if let Ok(prefix) = env::var("API_PREFIX") {
            config.api_prefix = prefix;
        }

        config.allotments = Allotments::from_env(config.allotments)?;

        config.smtp = match (optional("SMTP_HOST"), optional("SMTP_FROM")) {
            (Some(host), Some(from)) => Some(SmtpConfig {
                host,
                port: parsed("SMTP_PORT", 587)?,
                username: optional("SMTP_USERNAME"),
                password: optional("SMTP_PASSWORD"),
                from,
                tls: parsed("SMTP_TLS", true)?,
            }),
            _ => None,
        };

        config.bootstrap_admin = match (
            optional("BOOTSTRAP_ADMIN_EMAIL"),
            optional("BOOTSTRAP_ADMIN_PASSWORD"),
        ) {
            (Some(email), Some(password)) => Some((email, password)),
            _ => None,
        };

        if let Some(dir) = optional("LOG_DIR") {
            config.log_dir = dir;
        }

        Ok(config)
    }
}

fn required(key: &str) -> Result<String> {
    env::var(key).with_context(|| format!("{key} must be set"))
}

fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parsed<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match optional(key) {
        Some(raw) => parse_value(key, &raw),
        None => Ok(default),
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| anyhow::anyhow!("{key} has invalid value {raw:?}: {e}"))
}
