//! Process configuration
//!
//! Read once at startup from the environment (after `.env` is loaded).

use anyhow::{Context, bail};
use auth::IdentityConfig;
use platform::crypto::MIN_SECRET_LEN;
use platform::mail::SmtpConfig;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_SMTP_PORT: u16 = 587;
const DEFAULT_FRONTEND_URL: &str = "http://localhost:3000";

#[derive(Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub port: u16,
    pub identity: IdentityConfig,
    /// `None` when `SMTP_HOST` is unset; mail is then only logged
    pub smtp: Option<SmtpConfig>,
    pub frontend_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url = var("DATABASE_URL").context("DATABASE_URL must be set")?;

        let port = match var("PORT") {
            Some(raw) => raw.trim().parse().context("PORT must be a port number")?,
            None => DEFAULT_PORT,
        };

        let token_secret = var("JWT_SECRET").context("JWT_SECRET must be set")?.into_bytes();
        if token_secret.len() < MIN_SECRET_LEN {
            bail!("JWT_SECRET must be at least {MIN_SECRET_LEN} bytes");
        }

        let support_email =
            var("MINDDRIFT_EMAIL").unwrap_or_else(|| "support@minddrift.local".to_string());

        let frontend_url = var("FRONTEND_URL")
            .or_else(|| var("BASE_URL"))
            .unwrap_or_else(|| DEFAULT_FRONTEND_URL.to_string());

        let frontend_origins = var("FRONTEND_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_else(|| vec![frontend_url.trim_end_matches('/').to_string()]);

        let defaults = IdentityConfig::default();
        let identity = IdentityConfig {
            token_secret,
            issuer: var("JWT_ISSUER").unwrap_or(defaults.issuer.clone()),
            audience: var("JWT_AUDIENCE").unwrap_or(defaults.audience.clone()),
            frontend_url,
            support_email: support_email.clone(),
            password_pepper: var("PASSWORD_PEPPER").map(String::into_bytes),
            ..defaults
        };

        let smtp = match var("SMTP_HOST") {
            Some(host) => Some(SmtpConfig {
                host,
                port: match var("SMTP_PORT") {
                    Some(raw) => raw.trim().parse().context("SMTP_PORT must be a port number")?,
                    None => DEFAULT_SMTP_PORT,
                },
                username: var("SMTP_USER"),
                password: var("SMTP_PASSWORD"),
                from: support_email,
            }),
            None => None,
        };

        Ok(Self {
            database_url,
            port,
            identity,
            smtp,
            frontend_origins,
        })
    }
}
