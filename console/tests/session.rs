//! Session lifecycle behavior

mod common;

use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;
use uuid::Uuid;
use weaver_models::TokenResponse;

use common::FakeApi;
use confweaver::authn::session::{SessionPhase, SessionStore};
use confweaver::filesys::file::File;
use confweaver::notify::Notifier;
use confweaver::views::login::LoginView;

fn scratch_file() -> File {
    File::new(
        std::env::temp_dir()
            .join(format!("confweaver-test-{}", Uuid::new_v4()))
            .join("session.json"),
    )
}

#[tokio::test]
async fn login_establishes_and_persists_the_session() {
    let file = scratch_file();
    let session = Arc::new(SessionStore::load(file.clone()).await);
    assert!(!session.is_authenticated().await);

    let api = Arc::new(FakeApi::default());
    api.login_responses.lock().unwrap().push_back(Ok(TokenResponse {
        access_token: "tok-123".to_string(),
        token_type: "bearer".to_string(),
    }));

    let view = LoginView::new(
        Arc::clone(&api) as _,
        Arc::clone(&session),
        Arc::new(Notifier::new(Duration::from_secs(5))),
    );
    view.submit("admin", &SecretString::from("pw".to_string()))
        .await
        .unwrap();

    assert!(session.is_authenticated().await);
    assert_eq!(session.username().await.as_deref(), Some("admin"));
    assert_eq!(*session.subscribe().borrow(), SessionPhase::Authenticated);

    // A new store picks the session up from disk
    let reloaded = SessionStore::load(file.clone()).await;
    assert!(reloaded.is_authenticated().await);
    assert_eq!(reloaded.username().await.as_deref(), Some("admin"));

    file.delete().await.unwrap();
}

#[tokio::test]
async fn failed_login_leaves_the_session_anonymous() {
    let file = scratch_file();
    let session = Arc::new(SessionStore::load(file).await);

    let api = Arc::new(FakeApi::default());
    api.login_responses
        .lock()
        .unwrap()
        .push_back(Err(FakeApi::api_error(401, "Incorrect username or password")));

    let view = LoginView::new(
        Arc::clone(&api) as _,
        Arc::clone(&session),
        Arc::new(Notifier::new(Duration::from_secs(5))),
    );
    let err = view
        .submit("admin", &SecretString::from("wrong".to_string()))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(401));
    assert!(!session.is_authenticated().await);
}

#[tokio::test]
async fn invalidate_is_idempotent() {
    let file = scratch_file();
    let session = SessionStore::load(file.clone()).await;
    session
        .establish("admin", SecretString::from("tok".to_string()))
        .await
        .unwrap();
    assert!(file.exists().await);

    session.invalidate().await;
    assert!(!session.is_authenticated().await);
    assert!(!file.exists().await);
    assert_eq!(*session.subscribe().borrow(), SessionPhase::Anonymous);

    // A second invalidation is a no-op
    session.invalidate().await;
    assert!(!session.is_authenticated().await);
}

#[tokio::test]
async fn corrupt_session_file_is_discarded() {
    let file = scratch_file();
    file.write_string("{ not json").await.unwrap();

    let session = SessionStore::load(file.clone()).await;
    assert!(!session.is_authenticated().await);

    file.delete().await.unwrap();
}
