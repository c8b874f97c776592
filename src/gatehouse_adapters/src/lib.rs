//! Gateway adapters: concrete implementations of the `gatehouse_core` ports
//! backed by Redis, Postgres, Postmark, bcrypt and JWT, plus in-memory
//! stand-ins for tests and local runs.

pub mod config;
pub mod email;
pub mod hashing;
pub mod observability;
pub mod persistence;
pub mod tokens;

pub use config::Settings;
pub use email::{PostmarkMailer, RecordingMailer};
pub use hashing::BcryptHasher;
pub use observability::{TracingErrorSink, init_tracing};
pub use persistence::{
    InMemoryBlobStore, InMemorySessionCache, InMemoryUserStore, PostgresUserStore,
    RedisSessionCache,
};
pub use tokens::JwtTokenCodec;
