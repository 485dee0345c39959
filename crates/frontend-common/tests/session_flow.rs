//! End-to-end session lifecycle against a mock backend

use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tracker_frontend_common::services::AuthError;
use tracker_frontend_common::{
    App, AuthConfig, ClientConfig, FileStorage, MemoryStorage, Notifier, RouteName, Storage,
};
use tracker_http::ClientError;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

#[derive(Debug, Default)]
struct CountingNotifier {
    count: AtomicUsize,
}

impl Notifier for CountingNotifier {
    fn notify(&self, _message: &str) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }
}

fn config(server: &MockServer) -> ClientConfig {
    ClientConfig {
        api_base_url: server.uri(),
        ..ClientConfig::default()
    }
}

fn login_body(token: &str) -> serde_json::Value {
    json!({
        "user": {"id": 1, "username": "testuser", "email": "testuser@example.com"},
        "accessToken": token
    })
}

async fn mount_login(server: &MockServer, token: &str) {
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(login_body(token)))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_anonymous_rejection_scenario() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/labels"))
        .and(|request: &Request| !request.headers.contains_key("authorization"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let notifier = Arc::new(CountingNotifier::default());
    let app = App::bootstrap(
        config(&server),
        Arc::new(MemoryStorage::new()),
        notifier.clone(),
    )
    .unwrap();
    app.router.push("/").unwrap();

    let result = app.client.list_labels().await;
    assert!(matches!(result, Err(ClientError::AuthenticationFailed(_))));
    assert!(app.store.expiry_notice_shown());
    assert_eq!(notifier.count.load(Ordering::SeqCst), 1);
    assert!(!app.store.is_authenticated());
    assert_eq!(app.router.current().unwrap().name, RouteName::Login);

    let landed = app.router.push("/labels").unwrap();
    assert_eq!(landed.name, RouteName::Login);
}

#[tokio::test]
async fn test_login_attaches_bearer_token() {
    let server = MockServer::start().await;
    mount_login(&server, "token-1").await;

    Mock::given(method("GET"))
        .and(path("/api/issues/7"))
        .and(header("authorization", "Bearer token-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 7,
            "title": "Crash on save",
            "description": "Steps inside",
            "status": "OPEN",
            "authorId": 1,
            "assigneeId": 1,
            "labelIds": [],
            "createdAt": "2024-05-01T10:00:00",
            "updatedAt": "2024-05-02T10:00:00"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let app = App::bootstrap(
        config(&server),
        Arc::new(MemoryStorage::new()),
        Arc::new(CountingNotifier::default()),
    )
    .unwrap();
    app.router.push("/login").unwrap();

    let user = app.auth.login("testuser", "password123").await.unwrap();
    assert_eq!(user.username, "testuser");
    assert!(app.store.is_authenticated());
    assert_eq!(app.router.current().unwrap().name, RouteName::Home);

    let issue = app.client.get_issue(7).await.unwrap();
    assert_eq!(issue.title, "Crash on save");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_rejections_notify_once() {
    let server = MockServer::start().await;
    mount_login(&server, "token-1").await;

    Mock::given(method("GET"))
        .and(path("/api/labels"))
        .respond_with(ResponseTemplate::new(401).set_delay(Duration::from_millis(100)))
        .expect(9)
        .mount(&server)
        .await;

    let notifier = Arc::new(CountingNotifier::default());
    let app = App::bootstrap(
        config(&server),
        Arc::new(MemoryStorage::new()),
        notifier.clone(),
    )
    .unwrap();
    app.auth.login("testuser", "password123").await.unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let client = app.client.clone();
            tokio::spawn(async move { client.list_labels().await })
        })
        .collect();

    for handle in handles {
        let result = handle.await.unwrap();
        assert!(matches!(result, Err(ClientError::AuthenticationFailed(_))));
    }

    assert_eq!(notifier.count.load(Ordering::SeqCst), 1);
    assert!(app.store.expiry_notice_shown());
    assert!(!app.store.is_authenticated());

    // Logging in again re-arms the notice for the next episode
    app.auth.login("testuser", "password123").await.unwrap();
    assert!(!app.store.expiry_notice_shown());
    let _ = app.client.list_labels().await;
    assert_eq!(notifier.count.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_other_statuses_keep_session() {
    let server = MockServer::start().await;
    mount_login(&server, "token-1").await;

    Mock::given(method("GET"))
        .and(path("/api/labels"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let notifier = Arc::new(CountingNotifier::default());
    let app = App::bootstrap(
        config(&server),
        Arc::new(MemoryStorage::new()),
        notifier.clone(),
    )
    .unwrap();
    app.auth.login("testuser", "password123").await.unwrap();

    let result = app.client.list_labels().await;
    assert!(matches!(result, Err(ClientError::Forbidden(_))));
    assert!(app.store.is_authenticated());
    assert_eq!(notifier.count.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_session_survives_reload() {
    let server = MockServer::start().await;
    mount_login(&server, "token-1").await;

    let temp_dir = TempDir::new().unwrap();
    let storage_path = temp_dir.path().join("session.json");

    let app = App::bootstrap(
        config(&server),
        Arc::new(FileStorage::new(&storage_path)),
        Arc::new(CountingNotifier::default()),
    )
    .unwrap();
    app.auth.login("testuser", "password123").await.unwrap();
    let before = app.store.session().snapshot();
    drop(app);

    let reloaded = App::bootstrap(
        config(&server),
        Arc::new(FileStorage::new(&storage_path)),
        Arc::new(CountingNotifier::default()),
    )
    .unwrap();
    assert_eq!(reloaded.store.session().snapshot(), before);
    assert!(reloaded.store.is_authenticated());

    reloaded.auth.logout();
    let after_logout = App::bootstrap(
        config(&server),
        Arc::new(FileStorage::new(&storage_path)),
        Arc::new(CountingNotifier::default()),
    )
    .unwrap();
    assert!(!after_logout.store.is_authenticated());
}

#[tokio::test]
async fn test_wrong_password_keeps_current_session() {
    let server = MockServer::start().await;
    mount_login(&server, "token-1").await;

    let notifier = Arc::new(CountingNotifier::default());
    let app = App::bootstrap(
        config(&server),
        Arc::new(MemoryStorage::new()),
        notifier.clone(),
    )
    .unwrap();
    app.auth.login("testuser", "password123").await.unwrap();
    server.reset().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad credentials"))
        .mount(&server)
        .await;

    let result = app.auth.login("testuser", "wrong").await;
    assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    assert_eq!(notifier.count.load(Ordering::SeqCst), 0);
    assert!(!app.store.expiry_notice_shown());
    assert_eq!(app.store.access_token().as_deref(), Some("token-1"));
    assert_eq!(app.router.current().unwrap().name, RouteName::Home);
}

#[tokio::test]
async fn test_reload_mid_expiry_still_expires_dead_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/labels"))
        .and(header("authorization", "Bearer dead"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    // What a crash between claiming the notice and clearing the session
    // used to leave behind
    let storage = MemoryStorage::new();
    storage
        .set_item(
            AuthConfig::USER_KEY,
            &json!({"id": 1, "username": "testuser", "email": "testuser@example.com"}).to_string(),
        )
        .unwrap();
    storage.set_item(AuthConfig::ACCESS_TOKEN_KEY, "dead").unwrap();
    storage.set_item(AuthConfig::EXPIRY_NOTICE_KEY, "true").unwrap();

    let notifier = Arc::new(CountingNotifier::default());
    let app = App::bootstrap(config(&server), Arc::new(storage), notifier.clone()).unwrap();

    for _ in 0..3 {
        let result = app.client.list_labels().await;
        assert!(matches!(result, Err(ClientError::AuthenticationFailed(_))));
    }

    assert_eq!(notifier.count.load(Ordering::SeqCst), 1);
    assert!(!app.store.is_authenticated());
    assert_eq!(app.router.push("/labels").unwrap().name, RouteName::Login);
}

#[tokio::test]
async fn test_late_rejection_of_previous_session_is_ignored() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/labels"))
        .respond_with(ResponseTemplate::new(401).set_delay(Duration::from_millis(300)))
        .expect(1)
        .mount(&server)
        .await;

    let notifier = Arc::new(CountingNotifier::default());
    let app = App::bootstrap(
        ClientConfig {
            use_mock: true,
            ..config(&server)
        },
        Arc::new(MemoryStorage::new()),
        notifier.clone(),
    )
    .unwrap();
    app.auth.login("testuser", "password123").await.unwrap();

    // Sent with the first session's token
    let client = app.client.clone();
    let in_flight = tokio::spawn(async move { client.list_labels().await });
    tokio::time::sleep(Duration::from_millis(50)).await;

    app.auth.logout();
    app.auth
        .register("second", "second@example.com", "secret")
        .await
        .unwrap();
    app.auth.login("second", "secret").await.unwrap();

    let result = in_flight.await.unwrap();
    assert!(matches!(result, Err(ClientError::AuthenticationFailed(_))));

    // The new session is untouched and no notice was shown
    assert_eq!(app.store.access_token().as_deref(), Some("mock-token-2"));
    assert_eq!(notifier.count.load(Ordering::SeqCst), 0);
    assert_eq!(app.router.current().unwrap().name, RouteName::Home);
}

#[tokio::test]
async fn test_mock_directory_login_and_register() {
    let server = MockServer::start().await;
    let config = ClientConfig {
        use_mock: true,
        ..config(&server)
    };

    let app = App::bootstrap(
        config,
        Arc::new(MemoryStorage::new()),
        Arc::new(CountingNotifier::default()),
    )
    .unwrap();

    app.auth
        .register("alice", "alice@example.com", "secret")
        .await
        .unwrap();
    assert!(matches!(
        app.auth.register("alice", "a@example.com", "x").await,
        Err(AuthError::UsernameTaken(_))
    ));

    let user = app.auth.login("alice", "secret").await.unwrap();
    assert_eq!(user.id, 2);
    assert_eq!(app.store.access_token().as_deref(), Some("mock-token-2"));

    // Nothing reached the backend
    assert!(server.received_requests().await.unwrap().is_empty());
}
