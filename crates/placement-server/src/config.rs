use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use anyhow::{Context, Result, bail};
use tracing::info;

/// Secrets that ship in sample files and must never reach production.
const PLACEHOLDER_SECRETS: &[&str] = &[
    "",
    "secret",
    "changeme",
    "change-me",
    "dev-secret-change-me",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifierKind {
    Log,
    Resend { api_key: String, from: String },
}

/// Admin account created at startup when it does not exist yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminSeed {
    pub email: String,
    pub password: String,
}

pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub upload_dir: PathBuf,
    pub jwt_secret: String,
    pub notifier: NotifierKind,
    pub admin: Option<AdminSeed>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let jwt_secret = env::var("PLACEMENT_JWT_SECRET")
            .context("PLACEMENT_JWT_SECRET must be set")?;
        check_secret(&jwt_secret)?;

        let notifier = match try_load::<String>("PLACEMENT_NOTIFIER", "log")?
            .to_lowercase()
            .as_str()
        {
            "log" => NotifierKind::Log,
            "resend" => NotifierKind::Resend {
                api_key: env::var("RESEND_API_KEY")
                    .context("RESEND_API_KEY must be set when PLACEMENT_NOTIFIER=resend")?,
                from: try_load("PLACEMENT_MAIL_FROM", "Internship Portal <noreply@resend.dev>")?,
            },
            other => bail!("Unknown PLACEMENT_NOTIFIER '{}', expected 'log' or 'resend'", other),
        };

        Ok(Self {
            host: try_load("PLACEMENT_HOST", "0.0.0.0")?,
            port: try_load("PLACEMENT_PORT", "5000")?,
            db_path: try_load("PLACEMENT_DB_PATH", "placement.db")?,
            upload_dir: try_load("PLACEMENT_UPLOAD_DIR", "./uploads")?,
            jwt_secret,
            notifier,
            admin: admin_seed(
                env::var("PLACEMENT_ADMIN_EMAIL").ok(),
                env::var("PLACEMENT_ADMIN_PASSWORD").ok(),
            )?,
        })
    }
}

fn check_secret(secret: &str) -> Result<()> {
    if PLACEHOLDER_SECRETS.contains(&secret.trim()) {
        bail!("PLACEMENT_JWT_SECRET is a placeholder value; set a real secret");
    }
    Ok(())
}

fn admin_seed(email: Option<String>, password: Option<String>) -> Result<Option<AdminSeed>> {
    let email = email.filter(|e| !e.trim().is_empty());
    let password = password.filter(|p| !p.is_empty());
    match (email, password) {
        (None, None) => Ok(None),
        (Some(email), Some(password)) => Ok(Some(AdminSeed { email, password })),
        _ => bail!("PLACEMENT_ADMIN_EMAIL and PLACEMENT_ADMIN_PASSWORD must be set together"),
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> Result<T>
where
    T::Err: Display,
{
    let raw = env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });
    raw.parse()
        .map_err(|e| anyhow::anyhow!("Invalid {key} value '{raw}': {e}"))
}
