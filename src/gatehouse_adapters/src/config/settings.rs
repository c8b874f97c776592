use std::env;
use std::time::Duration;

use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use secrecy::Secret;
use serde::Deserialize;

use gatehouse_application::TokenConfig;

/// Deployment environment. Anything but `Production` routes outbound mail to
/// the debug redirect address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppEnv {
    Development,
    Staging,
    Production,
}

impl AppEnv {
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub environment: AppEnv,
    pub tokens: TokenSettings,
    pub bcrypt_cost: u32,
    pub mailer: MailerSettings,
    pub postgres: PostgresSettings,
    pub redis: RedisSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenSettings {
    pub signing_secret: Secret<String>,
    pub access_ttl_secs: u64,
    pub password_reset_ttl_secs: u64,
    pub email_verification_ttl_secs: u64,
}

impl TokenSettings {
    pub fn to_token_config(&self) -> TokenConfig {
        TokenConfig {
            access_ttl: Duration::from_secs(self.access_ttl_secs),
            password_reset_ttl: Duration::from_secs(self.password_reset_ttl_secs),
            email_verification_ttl: Duration::from_secs(self.email_verification_ttl_secs),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MailerSettings {
    /// Postmark API origin.
    pub server_url: String,
    pub auth_token: Secret<String>,
    pub sender: String,
    /// Application origin the action links in mail bodies point at.
    pub link_base_url: String,
    /// Recipient override used outside production.
    pub debug_redirect: Option<String>,
    pub timeout_millis: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostgresSettings {
    pub url: Secret<String>,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedisSettings {
    pub url: String,
}

impl Settings {
    /// Load configuration, lowest priority first:
    /// 1. `config/default.toml`
    /// 2. `config/{GATEHOUSE_ENV}.toml`
    /// 3. `GATEHOUSE__`-prefixed environment variables
    ///    (e.g. `GATEHOUSE__POSTGRES__URL` overrides `postgres.url`)
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let run_env = env::var("GATEHOUSE_ENV").unwrap_or_else(|_| "development".to_owned());

        ConfigBuilder::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{run_env}")).required(false))
            .add_source(Environment::with_prefix("GATEHOUSE").separator("__"))
            .set_default("environment", run_env.as_str())?
            .set_default("bcrypt_cost", 10)?
            .set_default("tokens.access_ttl_secs", 3600)?
            .set_default("tokens.password_reset_ttl_secs", 900)?
            .set_default("tokens.email_verification_ttl_secs", 86400)?
            .set_default("mailer.server_url", "https://api.postmarkapp.com")?
            .set_default("mailer.debug_redirect", None::<String>)?
            .set_default("mailer.timeout_millis", 10_000)?
            .set_default("postgres.max_connections", 5)?
            .build()?
            .try_deserialize()
    }
}
