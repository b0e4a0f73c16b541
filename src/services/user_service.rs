use crate::error::ValidationError;
use crate::models::user::{NewUser, User, UserChanges};
use crate::repositories::user_repository::{RepositoryError, UserRepository};
use crate::services::password_hasher::{CredentialHasher, HashingError};
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, thiserror::Error)]
pub enum UserServiceError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error("A user with this {field} already exists")]
    UniquenessViolation { field: String },
    #[error("Password hashing failed: {0}")]
    HashingFailure(#[from] HashingError),
    #[error("User not found")]
    UserNotFound,
    #[error("Repository error: {0}")]
    RepositoryError(#[from] RepositoryError),
}

/// Validates and hashes user records on their way into storage.
///
/// Holds no per-request state; every call stands on its own.
pub struct UserService {
    repository: Arc<dyn UserRepository>,
    hasher: Arc<dyn CredentialHasher>,
}

impl UserService {
    pub fn new(repository: Arc<dyn UserRepository>, hasher: Arc<dyn CredentialHasher>) -> Self {
        Self { repository, hasher }
    }

    pub async fn create_user(&self, new_user: NewUser) -> Result<User, UserServiceError> {
        new_user.validate()?;

        let password_hash = self.hash_password(new_user.password).await?;

        let user = self
            .repository
            .create_user(&new_user.username, &new_user.email, &password_hash)
            .await
            .map_err(map_repository_error)?;

        info!(user_id = user.id, email = %user.email, "user created");
        Ok(user)
    }

    /// Applies `changes` to user `id`.
    ///
    /// The password is re-hashed only when the payload carries one and it
    /// differs from the stored hash, so writing back a record that was just
    /// read never hashes a hash.
    pub async fn update_user(
        &self,
        id: i64,
        changes: UserChanges,
    ) -> Result<User, UserServiceError> {
        changes.validate()?;

        let current = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(UserServiceError::UserNotFound)?;

        if changes.is_empty() {
            return Ok(current);
        }

        let password_changed = changes
            .password
            .as_deref()
            .is_some_and(|p| p != current.password);

        if password_changed
            && changes
                .password
                .as_deref()
                .is_some_and(|p| self.hasher.is_hash(p))
        {
            warn!(
                user_id = id,
                "new password has the shape of a stored hash; hashing it as plaintext"
            );
        }

        let password_hash = match changes.password {
            Some(plaintext) if password_changed => self.hash_password(plaintext).await?,
            _ => current.password,
        };
        let username = changes.username.unwrap_or(current.username);
        let email = changes.email.unwrap_or(current.email);

        let user = self
            .repository
            .update_user(id, &username, &email, &password_hash)
            .await
            .map_err(map_repository_error)?;

        info!(user_id = id, password_changed, "user updated");
        Ok(user)
    }

    pub async fn update_password(
        &self,
        id: i64,
        new_password: &str,
    ) -> Result<User, UserServiceError> {
        self.update_user(id, UserChanges::default().password(new_password))
            .await
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, UserServiceError> {
        Ok(self.repository.find_by_email(email).await?)
    }

    pub async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, UserServiceError> {
        Ok(self.repository.find_by_id(id).await?)
    }

    pub async fn list_users(
        &self,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<User>, UserServiceError> {
        Ok(self.repository.list_users(limit, offset).await?)
    }

    pub async fn delete_user(&self, id: i64) -> Result<(), UserServiceError> {
        self.repository
            .delete_user(id)
            .await
            .map_err(map_repository_error)?;
        info!(user_id = id, "user deleted");
        Ok(())
    }

    /// Checks `password` against a stored hash using the hasher's own
    /// comparison.
    pub async fn verify_password(
        &self,
        password: &str,
        password_hash: &str,
    ) -> Result<bool, UserServiceError> {
        let hasher = Arc::clone(&self.hasher);
        let password = password.to_owned();
        let password_hash = password_hash.to_owned();
        let verified = tokio::task::spawn_blocking(move || hasher.verify(&password, &password_hash))
            .await
            .map_err(|e| HashingError::Compute(e.to_string()))??;
        Ok(verified)
    }

    // Hashing is deliberately slow; keep it off the async workers.
    async fn hash_password(&self, password: String) -> Result<String, UserServiceError> {
        let hasher = Arc::clone(&self.hasher);
        debug!(algorithm = %hasher.algorithm(), "hashing password");
        let hash = tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| HashingError::Compute(e.to_string()))?
            .inspect_err(|e| warn!(error = %e, "password hashing failed"))?;
        Ok(hash)
    }
}

fn map_repository_error(err: RepositoryError) -> UserServiceError {
    match err {
        RepositoryError::NotFound => UserServiceError::UserNotFound,
        RepositoryError::UniqueViolation(field) => UserServiceError::UniquenessViolation { field },
        other => UserServiceError::RepositoryError(other),
    }
}
