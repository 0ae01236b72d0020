use std::{env, fmt::Display, net::SocketAddr, str::FromStr};

use anyhow::{Context, Result};
use tracing::info;

const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:3001";
const DEFAULT_JWT_EXPIRY_DAYS: &str = "7";
const DEFAULT_STRIPE_API_BASE: &str = "https://api.stripe.com";
const DEFAULT_FRONTEND_URL: &str = "http://localhost:3000";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_address: SocketAddr,
    pub jwt_secret: String,
    pub jwt_expiry_days: i64,
    pub admin_emails: Vec<String>,
    pub stripe: StripeConfig,
}

#[derive(Debug, Clone, Default)]
pub struct StripeConfig {
    pub secret_key: Option<String>,
    pub webhook_secret: Option<String>,
    pub monthly_price_id: Option<String>,
    pub yearly_price_id: Option<String>,
    pub api_base: String,
    pub frontend_url: String,
}

impl Config {
    pub fn load() -> Result<Self> {
        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            bind_address: try_load("BIND_ADDRESS", DEFAULT_BIND_ADDRESS)?,
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            jwt_expiry_days: try_load("JWT_EXPIRY_DAYS", DEFAULT_JWT_EXPIRY_DAYS)?,
            admin_emails: parse_email_list(&optional("ADMIN_EMAILS").unwrap_or_default()),
            stripe: StripeConfig {
                secret_key: optional("STRIPE_SECRET_KEY"),
                webhook_secret: optional("STRIPE_WEBHOOK_SECRET"),
                monthly_price_id: optional("STRIPE_MONTHLY_PRICE_ID"),
                yearly_price_id: optional("STRIPE_YEARLY_PRICE_ID"),
                api_base: try_load("STRIPE_API_BASE", DEFAULT_STRIPE_API_BASE)?,
                frontend_url: try_load("FRONTEND_URL", DEFAULT_FRONTEND_URL)?,
            },
        })
    }

    pub fn is_admin_email(&self, email: &str) -> bool {
        self.admin_emails
            .iter()
            .any(|admin| admin.eq_ignore_ascii_case(email.trim()))
    }
}

fn optional(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Some(value.trim().to_string()),
        _ => {
            info!("{key} not set");
            None
        }
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> Result<T>
where
    T::Err: Display,
{
    let value = env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });
    value
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid {key} value: {e}"))
}

fn parse_email_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|email| email.trim().to_lowercase())
        .filter(|email| !email.is_empty())
        .collect()
}
