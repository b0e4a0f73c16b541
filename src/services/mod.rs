pub mod password_hasher;
pub mod user_service;

pub use password_hasher::{
    Argon2Hasher, BcryptHasher, CredentialHasher, HashAlgorithm, HashingError,
    DEFAULT_BCRYPT_COST,
};
pub use user_service::{UserService, UserServiceError};
