use std::{env, sync::Arc};

use tracing::warn;

use crate::services::password_hasher::{
    Argon2Hasher, BcryptHasher, CredentialHasher, HashAlgorithm, HashingError,
    DEFAULT_BCRYPT_COST,
};

const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("Invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub hash_algorithm: HashAlgorithm,
    pub bcrypt_cost: u32,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from any key/value source. `from_env` is this over
    /// the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|url| !url.trim().is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
            Some(value) => match value.trim().parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "DATABASE_MAX_CONNECTIONS",
                        value,
                    })
                }
            },
            None => DEFAULT_MAX_CONNECTIONS,
        };

        let hash_algorithm = match lookup("PASSWORD_HASH_ALGORITHM") {
            Some(value) => value
                .parse::<HashAlgorithm>()
                .map_err(|_| ConfigError::Invalid {
                    name: "PASSWORD_HASH_ALGORITHM",
                    value,
                })?,
            None => HashAlgorithm::default(),
        };

        let bcrypt_cost = match lookup("BCRYPT_COST") {
            Some(value) => {
                let cost = value.trim().parse::<u32>().ok();
                match cost.map(BcryptHasher::new) {
                    Some(Ok(hasher)) => hasher.cost(),
                    _ => {
                        return Err(ConfigError::Invalid {
                            name: "BCRYPT_COST",
                            value,
                        })
                    }
                }
            }
            None => DEFAULT_BCRYPT_COST,
        };

        if hash_algorithm == HashAlgorithm::Argon2 && lookup("BCRYPT_COST").is_some() {
            warn!("BCRYPT_COST is ignored when PASSWORD_HASH_ALGORITHM=argon2");
        }

        Ok(Self {
            database_url,
            max_connections,
            hash_algorithm,
            bcrypt_cost,
        })
    }

    pub fn build_hasher(&self) -> Result<Arc<dyn CredentialHasher>, HashingError> {
        Ok(match self.hash_algorithm {
            HashAlgorithm::Bcrypt => Arc::new(BcryptHasher::new(self.bcrypt_cost)?),
            HashAlgorithm::Argon2 => Arc::new(Argon2Hasher),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup_from(&[("DATABASE_URL", "sqlite::memory:")]))
            .expect("config");
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.hash_algorithm, HashAlgorithm::Bcrypt);
        assert_eq!(config.bcrypt_cost, 10);

        let hasher = config.build_hasher().expect("hasher");
        assert_eq!(hasher.algorithm(), HashAlgorithm::Bcrypt);
    }

    #[test]
    fn test_missing_database_url() {
        let result = AppConfig::from_lookup(lookup_from(&[]));
        assert!(matches!(result, Err(ConfigError::Missing("DATABASE_URL"))));
    }

    #[test]
    fn test_invalid_values() {
        let result = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("BCRYPT_COST", "40"),
        ]));
        assert!(matches!(
            result,
            Err(ConfigError::Invalid {
                name: "BCRYPT_COST",
                ..
            })
        ));

        let result = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("PASSWORD_HASH_ALGORITHM", "md5"),
        ]));
        assert!(matches!(
            result,
            Err(ConfigError::Invalid {
                name: "PASSWORD_HASH_ALGORITHM",
                ..
            })
        ));

        let result = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("DATABASE_MAX_CONNECTIONS", "0"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn test_argon2_selection() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("PASSWORD_HASH_ALGORITHM", "argon2"),
        ]))
        .expect("config");
        let hasher = config.build_hasher().expect("hasher");
        assert_eq!(hasher.algorithm(), HashAlgorithm::Argon2);
    }

    #[test]
    #[serial]
    fn test_from_env() {
        env::set_var("DATABASE_URL", "sqlite://data/test.db");
        env::set_var("BCRYPT_COST", "6");
        let config = AppConfig::from_env();
        env::remove_var("DATABASE_URL");
        env::remove_var("BCRYPT_COST");

        let config = config.expect("config from env");
        assert_eq!(config.database_url, "sqlite://data/test.db");
        assert_eq!(config.bcrypt_cost, 6);
    }
}
