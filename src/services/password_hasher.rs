use argon2::{
    password_hash::{PasswordHash, PasswordHasher, SaltString},
    Argon2, PasswordVerifier,
};
use rand::rngs::OsRng;
use std::{fmt, str::FromStr};

pub const DEFAULT_BCRYPT_COST: u32 = 10;
pub const MIN_BCRYPT_COST: u32 = 4;
pub const MAX_BCRYPT_COST: u32 = 31;

const BCRYPT_HASH_LEN: usize = 60;
const BCRYPT_PREFIXES: [&str; 4] = ["$2a$", "$2b$", "$2x$", "$2y$"];

#[derive(Debug, thiserror::Error)]
pub enum HashingError {
    #[error("Unsupported bcrypt cost {0} (allowed 4..=31)")]
    InvalidCost(u32),
    #[error("Unknown hash algorithm: {0}")]
    UnknownAlgorithm(String),
    #[error("Hash computation failed: {0}")]
    Compute(String),
    #[error("Malformed password hash: {0}")]
    MalformedHash(String),
}

/// One-way, salted password hashing.
///
/// Implementations are CPU-bound on purpose. Call them from a blocking
/// context, never directly on an async executor thread.
pub trait CredentialHasher: Send + Sync {
    fn algorithm(&self) -> HashAlgorithm;

    /// Hash `password` with a fresh random salt.
    fn hash(&self, password: &str) -> Result<String, HashingError>;

    /// Check `password` against a hash produced by [`CredentialHasher::hash`],
    /// reusing the salt embedded in the hash.
    fn verify(&self, password: &str, password_hash: &str) -> Result<bool, HashingError>;

    /// Whether `value` has the shape of a hash this hasher produces.
    fn is_hash(&self, value: &str) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HashAlgorithm {
    #[default]
    Bcrypt,
    Argon2,
}

impl FromStr for HashAlgorithm {
    type Err = HashingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bcrypt" => Ok(HashAlgorithm::Bcrypt),
            "argon2" | "argon2id" => Ok(HashAlgorithm::Argon2),
            other => Err(HashingError::UnknownAlgorithm(other.to_string())),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HashAlgorithm::Bcrypt => write!(f, "bcrypt"),
            HashAlgorithm::Argon2 => write!(f, "argon2"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BcryptHasher {
    cost: u32,
}

impl BcryptHasher {
    pub fn new(cost: u32) -> Result<Self, HashingError> {
        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&cost) {
            return Err(HashingError::InvalidCost(cost));
        }
        Ok(Self { cost })
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }
}

impl Default for BcryptHasher {
    fn default() -> Self {
        Self {
            cost: DEFAULT_BCRYPT_COST,
        }
    }
}

impl CredentialHasher for BcryptHasher {
    fn algorithm(&self) -> HashAlgorithm {
        HashAlgorithm::Bcrypt
    }

    fn hash(&self, password: &str) -> Result<String, HashingError> {
        bcrypt::hash(password, self.cost).map_err(|e| HashingError::Compute(e.to_string()))
    }

    fn verify(&self, password: &str, password_hash: &str) -> Result<bool, HashingError> {
        if !self.is_hash(password_hash) {
            return Err(HashingError::MalformedHash("not a bcrypt hash".to_string()));
        }
        bcrypt::verify(password, password_hash)
            .map_err(|e| HashingError::MalformedHash(e.to_string()))
    }

    fn is_hash(&self, value: &str) -> bool {
        // $2b$10$<53 chars of salt and digest>
        value.len() == BCRYPT_HASH_LEN
            && BCRYPT_PREFIXES.iter().any(|p| value.starts_with(p))
            && value.as_bytes()[6] == b'$'
            && value.get(4..6).is_some_and(|cost| cost.parse::<u32>().is_ok())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2Hasher;

impl CredentialHasher for Argon2Hasher {
    fn algorithm(&self) -> HashAlgorithm {
        HashAlgorithm::Argon2
    }

    fn hash(&self, password: &str) -> Result<String, HashingError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| HashingError::Compute(e.to_string()))
    }

    fn verify(&self, password: &str, password_hash: &str) -> Result<bool, HashingError> {
        let parsed_hash = PasswordHash::new(password_hash)
            .map_err(|e| HashingError::MalformedHash(e.to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    fn is_hash(&self, value: &str) -> bool {
        value.starts_with("$argon2") && PasswordHash::new(value).is_ok()
    }
}
