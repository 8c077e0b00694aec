use feedback::config::SecurityConfig;
use feedback::db::{CreateUserError, NewUserRecord, Store};
use feedback::services::{
    AccountError, AccountService, AuthError, AuthService, CredentialHasher, FeedbackDraft,
    FeedbackError, FeedbackService, Registration, SeaOrmAccountService, SeaOrmAuthService,
    SeaOrmFeedbackService,
};
use sea_orm::{ConnectionTrait, Statement};

async fn temp_store() -> Store {
    let db_path =
        std::env::temp_dir().join(format!("feedback-store-test-{}.db", uuid::Uuid::new_v4()));
    Store::new(&format!("sqlite:{}", db_path.display()))
        .await
        .expect("failed to open store")
}

fn fast_hasher() -> CredentialHasher {
    CredentialHasher::new(&SecurityConfig {
        argon2_memory_cost_kib: 1024,
        argon2_time_cost: 1,
        argon2_parallelism: 1,
        ..SecurityConfig::default()
    })
    .unwrap()
}

fn record(username: &str, email: &str) -> NewUserRecord {
    NewUserRecord {
        username: username.to_string(),
        password_hash: "$argon2id$placeholder".to_string(),
        email: email.to_string(),
        first_name: "Test".to_string(),
        last_name: "User".to_string(),
    }
}

fn registration(username: &str, email: &str) -> Registration {
    Registration {
        username: username.to_string(),
        password: "secret1".to_string(),
        email: email.to_string(),
        first_name: "Test".to_string(),
        last_name: "User".to_string(),
    }
}

fn draft(title: &str) -> FeedbackDraft {
    FeedbackDraft {
        title: title.to_string(),
        content: "Body".to_string(),
    }
}

#[tokio::test]
async fn test_uniqueness_is_enforced_by_the_store() {
    let store = temp_store().await;
    store.create_user(record("alice", "a@x.com")).await.unwrap();

    let err = store
        .create_user(record("alice", "other@x.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, CreateUserError::UsernameTaken), "{err:?}");

    let err = store
        .create_user(record("bob", "a@x.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, CreateUserError::EmailTaken), "{err:?}");

    assert_eq!(store.list_users().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_registration_stores_a_digest() {
    let store = temp_store().await;
    let auth = SeaOrmAuthService::new(store.clone(), fast_hasher());

    auth.register(registration("alice", "a@x.com")).await.unwrap();

    let (_, digest) = store
        .find_user_with_password("alice")
        .await
        .unwrap()
        .unwrap();
    assert_ne!(digest, "secret1");
    assert!(digest.starts_with("$argon2id$"));

    let user = auth.authenticate("alice", "secret1").await.unwrap();
    assert_eq!(user.username, "alice");

    assert!(matches!(
        auth.authenticate("alice", "nope").await,
        Err(AuthError::InvalidCredentials)
    ));
    assert!(matches!(
        auth.authenticate("ghost", "secret1").await,
        Err(AuthError::InvalidCredentials)
    ));
    assert!(matches!(
        auth.register(registration("alice", "new@x.com")).await,
        Err(AuthError::UsernameTaken)
    ));
}

#[tokio::test]
async fn test_delete_account_removes_feedback() {
    let store = temp_store().await;
    store.create_user(record("alice", "a@x.com")).await.unwrap();
    store.create_user(record("bob", "b@x.com")).await.unwrap();

    let feedback = SeaOrmFeedbackService::new(store.clone());
    feedback.create("alice", "alice", draft("one")).await.unwrap();
    feedback.create("alice", "alice", draft("two")).await.unwrap();
    let kept = feedback.create("bob", "bob", draft("bob's")).await.unwrap();

    let accounts = SeaOrmAccountService::new(store.clone());
    assert!(matches!(
        accounts.delete_account("bob", "alice").await,
        Err(AccountError::Forbidden)
    ));
    assert_eq!(store.count_feedback_for_user("alice").await.unwrap(), 2);

    accounts.delete_account("alice", "alice").await.unwrap();

    assert!(store.find_user_by_username("alice").await.unwrap().is_none());
    assert_eq!(store.count_feedback_for_user("alice").await.unwrap(), 0);
    assert!(store.find_feedback_by_id(kept.id).await.unwrap().is_some());

    assert!(matches!(
        accounts.delete_account("alice", "alice").await,
        Err(AccountError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_missing_and_foreign_accounts_are_indistinguishable() {
    let store = temp_store().await;
    store.create_user(record("alice", "a@x.com")).await.unwrap();
    store.create_user(record("bob", "b@x.com")).await.unwrap();

    let accounts = SeaOrmAccountService::new(store.clone());
    for target in ["bob", "ghost"] {
        assert!(matches!(
            accounts.profile("alice", target).await,
            Err(AccountError::Forbidden)
        ));
        assert!(matches!(
            accounts.delete_account("alice", target).await,
            Err(AccountError::Forbidden)
        ));
    }
    assert!(store.find_user_by_username("bob").await.unwrap().is_some());
}

#[tokio::test]
async fn test_feedback_requires_existing_owner() {
    let store = temp_store().await;
    let result = store.create_feedback("ghost", "t", "c").await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_schema_cascades_feedback_rows() {
    let store = temp_store().await;
    store.create_user(record("alice", "a@x.com")).await.unwrap();
    store.create_feedback("alice", "t", "c").await.unwrap();

    // Bypass the repository to check the foreign key action itself
    let backend = store.conn.get_database_backend();
    store
        .conn
        .execute(Statement::from_string(
            backend,
            "DELETE FROM users WHERE username = 'alice'".to_string(),
        ))
        .await
        .unwrap();

    assert_eq!(store.count_feedback_for_user("alice").await.unwrap(), 0);
}

#[tokio::test]
async fn test_feedback_ownership_rules() {
    let store = temp_store().await;
    store.create_user(record("alice", "a@x.com")).await.unwrap();
    store.create_user(record("bob", "b@x.com")).await.unwrap();

    let feedback = SeaOrmFeedbackService::new(store.clone());
    let entry = feedback.create("bob", "bob", draft("mine")).await.unwrap();

    assert!(matches!(
        feedback.create("alice", "bob", draft("spam")).await,
        Err(FeedbackError::Forbidden)
    ));
    assert!(matches!(
        feedback.update("alice", entry.id, draft("hacked")).await,
        Err(FeedbackError::Forbidden)
    ));
    assert!(matches!(
        feedback.delete("alice", entry.id).await,
        Err(FeedbackError::Forbidden)
    ));

    let stored = store.find_feedback_by_id(entry.id).await.unwrap().unwrap();
    assert_eq!(stored.title, "mine");

    let updated = feedback.update("bob", entry.id, draft("edited")).await.unwrap();
    assert_eq!(updated.title, "edited");
    assert_eq!(updated.username, "bob");

    let removed = feedback.delete("bob", entry.id).await.unwrap();
    assert_eq!(removed.id, entry.id);
    assert!(matches!(
        feedback.get_owned("bob", entry.id).await,
        Err(FeedbackError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_feedback_is_listed_in_insertion_order() {
    let store = temp_store().await;
    store.create_user(record("alice", "a@x.com")).await.unwrap();

    for title in ["first", "second", "third"] {
        store.create_feedback("alice", title, "c").await.unwrap();
    }

    let titles: Vec<String> = store
        .list_feedback_for_user("alice")
        .await
        .unwrap()
        .into_iter()
        .map(|entry| entry.title)
        .collect();
    assert_eq!(titles, ["first", "second", "third"]);
}
