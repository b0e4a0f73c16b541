use user_records::{config::AppConfig, models::NewUser, services::HashAlgorithm, AppState};

fn config_for(database_url: String, algorithm: &str) -> AppConfig {
    AppConfig::from_lookup(|key| match key {
        "DATABASE_URL" => Some(database_url.clone()),
        "PASSWORD_HASH_ALGORITHM" => Some(algorithm.to_string()),
        "BCRYPT_COST" => Some("4".to_string()),
        _ => None,
    })
    .unwrap()
}

#[tokio::test]
async fn test_init_creates_database_and_schema() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("nested").join("users.db");
    let config = config_for(format!("sqlite://{}", db_path.display()), "bcrypt");

    let state = AppState::init(&config).await.unwrap();
    assert!(db_path.exists());

    let user = state
        .user_service
        .create_user(NewUser::new("alice", "alice@example.com", "password"))
        .await
        .unwrap();
    assert!(user.password.starts_with("$2b$04$"));
}

#[tokio::test]
async fn test_init_with_argon2() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("users.db");
    let config = config_for(format!("sqlite://{}", db_path.display()), "argon2");
    assert_eq!(config.hash_algorithm, HashAlgorithm::Argon2);

    let state = AppState::init(&config).await.unwrap();
    let user = state
        .user_service
        .create_user(NewUser::new("bob", "bob@example.com", "password"))
        .await
        .unwrap();

    assert!(user.password.starts_with("$argon2"));
    assert!(state
        .user_service
        .verify_password("password", &user.password)
        .await
        .unwrap());
}
