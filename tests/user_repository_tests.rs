use user_records::{
    repositories::{RepositoryError, SqliteUserRepository, UserRepository},
    test_utils::test_helpers,
};

#[tokio::test]
async fn test_create_and_find() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let repository = SqliteUserRepository::new(pool);

    let created = repository
        .create_user("alice", "alice@example.com", "$2b$04$notreallyahash")
        .await
        .unwrap();
    assert!(created.id > 0);

    let by_id = repository.find_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(by_id.email, "alice@example.com");
    assert_eq!(by_id.password, "$2b$04$notreallyahash");

    let by_email = repository
        .find_by_email("alice@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_email.id, created.id);
}

#[tokio::test]
async fn test_ids_are_assigned_in_order() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let repository = SqliteUserRepository::new(pool);

    let first = repository.create_user("a", "a@example.com", "h").await.unwrap();
    let second = repository.create_user("b", "b@example.com", "h").await.unwrap();
    assert!(second.id > first.id);
}

#[tokio::test]
async fn test_unique_email_reports_column() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let repository = SqliteUserRepository::new(pool);

    repository.create_user("a", "same@example.com", "h").await.unwrap();
    let err = repository
        .create_user("b", "same@example.com", "h")
        .await
        .unwrap_err();
    match err {
        RepositoryError::UniqueViolation(column) => assert_eq!(column, "email"),
        other => panic!("expected unique violation, got {:?}", other),
    }
}

#[tokio::test]
async fn test_update_and_delete_missing_rows() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let repository = SqliteUserRepository::new(pool);

    assert!(matches!(
        repository.update_user(404, "x", "x@example.com", "h").await,
        Err(RepositoryError::NotFound)
    ));
    assert!(matches!(
        repository.delete_user(404).await,
        Err(RepositoryError::NotFound)
    ));
}

#[tokio::test]
async fn test_update_rewrites_row() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let repository = SqliteUserRepository::new(pool);

    let user = repository.create_user("a", "a@example.com", "h1").await.unwrap();
    let updated = repository
        .update_user(user.id, "b", "b@example.com", "h2")
        .await
        .unwrap();

    assert_eq!(updated.id, user.id);
    assert_eq!(updated.username, "b");
    assert_eq!(updated.email, "b@example.com");
    assert_eq!(updated.password, "h2");
}

#[tokio::test]
async fn test_migrations_are_idempotent() {
    let pool = test_helpers::create_test_db().await.unwrap();
    user_records::db::run_migrations(&pool).await.unwrap();

    let columns: Vec<String> = sqlx::query_scalar(r#"SELECT name FROM pragma_table_info('user')"#)
        .fetch_all(&pool)
        .await
        .unwrap();
    assert_eq!(columns, vec!["id", "username", "email", "password"]);
}
