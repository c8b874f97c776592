use thiserror::Error;

/// Transport-neutral domain errors. The HTTP collaborator maps these to
/// status codes once, at the edge; services never surface gateway errors
/// directly.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    // Generic
    #[error("Internal error")]
    Internal,
    #[error("Bad request")]
    BadRequest,
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Forbidden")]
    Forbidden,

    // Credentials and tokens
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Invalid token")]
    InvalidToken,

    // Users
    #[error("User not found")]
    UserNotFound,
    #[error("Invalid user id")]
    InvalidUserId,
    #[error("Username is already taken")]
    UsernameConflict,
    #[error("Email is already taken")]
    EmailConflict,
    #[error("Email is already verified")]
    EmailAlreadyVerified,

    // Validation
    #[error("Name is required")]
    NameRequired,
    #[error("Name must be at most 50 characters")]
    NameTooLong,
    #[error("Username is required")]
    UsernameRequired,
    #[error("Username must be at least 4 characters")]
    UsernameTooShort,
    #[error("Username must be at most 15 characters")]
    UsernameTooLong,
    #[error("Username may only contain letters, digits and underscores")]
    UsernameInvalid,
    #[error("Password is required")]
    PasswordRequired,
    #[error("Password must be at least 8 characters")]
    PasswordTooShort,
    #[error("Password confirmation is required")]
    PasswordConfirmationRequired,
    #[error("Passwords do not match")]
    PasswordsNotMatch,
    #[error("Email is required")]
    EmailRequired,
    #[error("Email is invalid")]
    EmailInvalid,
}
