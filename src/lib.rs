//! Gatehouse - identity and session service core.
//!
//! This crate re-exports the public APIs of the workspace members so that
//! consumers can depend on `gatehouse` alone:
//! - `gatehouse_core`: domain types, error taxonomy, and gateway ports
//! - `gatehouse_application`: the auth, user, and token services
//! - `gatehouse_adapters`: Redis/Postgres/mail/bcrypt/JWT gateway adapters

pub use gatehouse_core as core;

pub use gatehouse_core::{
    AuthError, DisplayName, EmailAddress, Password, PasswordHash, Role, User, UserDraft, UserId,
    Username,
    domain::token::{AccessTokenClaims, OneTimeKind, OneTimeToken, TokenKind},
    ports::{
        blobs::BlobStore,
        cache::{CacheError, SessionCache},
        clock::{Clock, ManualClock, SystemClock},
        codec::TokenCodec,
        hasher::PasswordHasher,
        mailer::{MailTemplate, Mailer},
        sink::ErrorSink,
        store::UserStore,
    },
};

pub use gatehouse_application::{
    AuthService, LoginResponse, RateLimiter, TokenConfig, TokenService, UserService,
    rate_limiter::RateLimitDecision,
};

pub use gatehouse_adapters::{
    config::Settings,
    email::{PostmarkMailer, RecordingMailer},
    hashing::BcryptHasher,
    observability::{TracingErrorSink, init_tracing},
    persistence::{
        InMemoryBlobStore, InMemorySessionCache, InMemoryUserStore, PostgresUserStore,
        RedisSessionCache,
    },
    tokens::JwtTokenCodec,
};

// Commonly needed third-party types
pub use async_trait::async_trait;
pub use secrecy::{ExposeSecret, Secret};
