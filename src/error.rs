use thiserror::Error;

/// Input rejected before any hashing or storage work happens.
///
/// These are permanent: retrying with the same input fails the same way.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Username is required")]
    MissingUsername,

    #[error("Invalid email address")]
    InvalidEmail,

    #[error("Password too short (minimum {min} characters)")]
    PasswordTooShort { min: usize },
}
