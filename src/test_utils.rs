pub mod test_helpers {
    use crate::db;
    use crate::repositories::user_repository::SqliteUserRepository;
    use crate::services::password_hasher::{BcryptHasher, CredentialHasher, MIN_BCRYPT_COST};
    use crate::services::user_service::UserService;
    use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
    use std::sync::Arc;
    use tempfile::NamedTempFile;

    /// Create a new in-memory SQLite database for testing
    pub async fn create_test_db() -> Result<SqlitePool, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        db::run_migrations(&pool).await?;

        Ok(pool)
    }

    /// Create a temporary file-based SQLite database for testing.
    /// Unlike the in-memory variant this one can be shared by several
    /// connections, so writes from concurrent tasks really race.
    pub async fn create_test_db_file() -> Result<(SqlitePool, NamedTempFile), sqlx::Error> {
        let temp_file = NamedTempFile::new().map_err(sqlx::Error::Io)?;
        let db_path = temp_file
            .path()
            .to_str()
            .ok_or_else(|| sqlx::Error::Configuration("Invalid database path".into()))?;
        let database_url = format!("sqlite://{}", db_path);

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect(&database_url)
            .await?;

        db::run_migrations(&pool).await?;

        Ok((pool, temp_file))
    }

    /// Cheapest bcrypt cost; keeps test suites fast.
    pub fn test_hasher() -> Arc<dyn CredentialHasher> {
        match BcryptHasher::new(MIN_BCRYPT_COST) {
            Ok(hasher) => Arc::new(hasher),
            Err(e) => panic!("minimum bcrypt cost rejected: {}", e),
        }
    }

    pub fn test_user_service(pool: &SqlitePool) -> UserService {
        let repository = Arc::new(SqliteUserRepository::new(pool.clone()));
        UserService::new(repository, test_hasher())
    }

    /// Insert a user row directly, bypassing validation but not hashing
    pub async fn insert_test_user(
        pool: &SqlitePool,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<i64, sqlx::Error> {
        let password_hash = test_hasher().hash(password).map_err(|e| {
            sqlx::Error::Configuration(format!("Password hashing failed: {}", e).into())
        })?;

        let result = sqlx::query(r#"INSERT INTO "user" (username, email, password) VALUES (?, ?, ?)"#)
            .bind(username)
            .bind(email)
            .bind(password_hash)
            .execute(pool)
            .await?;

        Ok(result.last_insert_rowid())
    }
}
