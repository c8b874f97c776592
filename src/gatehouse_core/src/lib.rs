pub mod domain;
pub mod error;
pub mod ports;

// Re-export commonly used types for convenience
pub use domain::{
    display_name::DisplayName,
    email::EmailAddress,
    password::{Password, PasswordHash},
    token::{AccessTokenClaims, OneTimeKind, OneTimeToken, TokenKind},
    user::{Role, User, UserDraft, UserId},
    username::Username,
};

pub use error::AuthError;

pub use ports::{
    blobs::{BlobStore, BlobStoreError},
    cache::{CacheError, SessionCache},
    clock::{Clock, ManualClock, SystemClock},
    codec::{TokenCodec, TokenCodecError},
    hasher::{HasherError, PasswordHasher},
    mailer::{MailTemplate, Mailer, MailerError},
    sink::{ErrorSink, NullSink},
    store::{UserStore, UserStoreError},
};
