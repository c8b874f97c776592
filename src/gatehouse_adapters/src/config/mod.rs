mod settings;

pub use settings::{
    AppEnv, MailerSettings, PostgresSettings, RedisSettings, Settings, TokenSettings,
};
