//! End-to-end flows through the real router, carrying the session cookie
//! between requests the way a browser would.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use feedback::config::{Config, SessionBackend};
use feedback::domain::FeedbackId;
use feedback::web::AppState;
use http_body_util::BodyExt;
use sea_orm::{ConnectionTrait, Statement, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn test_config() -> Config {
    let db_path =
        std::env::temp_dir().join(format!("feedback-web-test-{}.db", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}", db_path.display());
    config.server.session_backend = SessionBackend::Sqlite;
    config.security.argon2_memory_cost_kib = 1024;
    config.security.argon2_time_cost = 1;
    config.security.argon2_parallelism = 1;
    config.security.csrf_enabled = false;
    config
}

async fn spawn_app_with(config: Config) -> (Arc<AppState>, Router) {
    let state = feedback::web::create_app_state_from_config(config, None)
        .await
        .expect("failed to create app state");
    let router = feedback::web::router(state.clone())
        .await
        .expect("failed to build router");
    (state, router)
}

async fn spawn_app() -> (Arc<AppState>, Router) {
    spawn_app_with(test_config()).await
}

struct TestResponse {
    status: StatusCode,
    location: Option<String>,
    body: String,
}

/// A browser stand-in: one cookie jar slot for the session cookie.
struct TestClient {
    app: Router,
    cookie: Option<String>,
}

impl TestClient {
    fn new(app: &Router) -> Self {
        Self {
            app: app.clone(),
            cookie: None,
        }
    }

    async fn send(&mut self, builder: axum::http::request::Builder, body: Body) -> TestResponse {
        let builder = match &self.cookie {
            Some(cookie) => builder.header(header::COOKIE, cookie),
            None => builder,
        };

        let response = self
            .app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
            let pair = set_cookie
                .to_str()
                .unwrap()
                .split(';')
                .next()
                .unwrap()
                .to_string();
            self.cookie = if pair.ends_with('=') { None } else { Some(pair) };
        }

        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = response.into_body().collect().await.unwrap().to_bytes();

        TestResponse {
            status,
            location,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    async fn get(&mut self, uri: &str) -> TestResponse {
        self.send(Request::builder().uri(uri), Body::empty()).await
    }

    async fn post_form(&mut self, uri: &str, fields: &[(&str, &str)]) -> TestResponse {
        let body = fields
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        self.send(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(
                    header::CONTENT_TYPE,
                    mime::APPLICATION_WWW_FORM_URLENCODED.as_ref(),
                ),
            Body::from(body),
        )
        .await
    }

    /// Follows one redirect and returns the rendered page.
    async fn follow(&mut self, response: &TestResponse) -> TestResponse {
        assert_eq!(response.status, StatusCode::FOUND, "expected a redirect");
        let location = response.location.clone().expect("redirect without location");
        self.get(&location).await
    }

    async fn register(&mut self, username: &str, email: &str) -> TestResponse {
        self.post_form(
            "/register",
            &[
                ("username", username),
                ("password", "secret1"),
                ("email", email),
                ("first_name", "Test"),
                ("last_name", "User"),
            ],
        )
        .await
    }
}

async fn add_feedback(client: &mut TestClient, username: &str, title: &str) -> TestResponse {
    client
        .post_form(
            &format!("/users/{username}/feedback/add"),
            &[("title", title), ("content", "Some content")],
        )
        .await
}

async fn only_feedback_id(state: &AppState, username: &str) -> FeedbackId {
    let entries = state.store().list_feedback_for_user(username).await.unwrap();
    assert_eq!(entries.len(), 1);
    entries[0].id
}

#[tokio::test]
async fn test_landing_page_renders() {
    let (_state, app) = spawn_app().await;
    let mut client = TestClient::new(&app);

    let response = client.get("/").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("href=\"/register\""));
    assert!(response.body.contains("href=\"/login\""));
}

#[tokio::test]
async fn test_register_logs_in_and_redirects_to_profile() {
    let (state, app) = spawn_app().await;
    let mut client = TestClient::new(&app);

    let page = client.get("/register").await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("name=\"first_name\""));

    let response = client.register("alice", "a@x.com").await;
    assert_eq!(response.status, StatusCode::FOUND);
    assert_eq!(response.location.as_deref(), Some("/users/alice"));

    let profile = client.follow(&response).await;
    assert_eq!(profile.status, StatusCode::OK);
    assert!(profile.body.contains("Welcome! Successfully Created Your Account!"));
    assert!(profile.body.contains("a@x.com"));

    // Flash is shown once
    let again = client.get("/users/alice").await;
    assert!(!again.body.contains("Successfully Created"));

    let user = state.store().find_user_by_username("alice").await.unwrap();
    assert!(user.is_some());
}

#[tokio::test]
async fn test_register_duplicate_username_rerenders_form() {
    let (state, app) = spawn_app().await;
    let mut first = TestClient::new(&app);
    first.register("alice", "a@x.com").await;

    let mut second = TestClient::new(&app);
    let response = second.register("alice", "other@x.com").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Username taken. Please pick another username"));
    assert!(!response.body.contains("secret1"));
    assert_eq!(state.store().list_users().await.unwrap().len(), 1);

    // Still anonymous
    let profile = second.get("/users/alice").await;
    assert_eq!(profile.location.as_deref(), Some("/"));
}

#[tokio::test]
async fn test_register_duplicate_email_rerenders_form() {
    let (state, app) = spawn_app().await;
    TestClient::new(&app).register("alice", "a@x.com").await;

    let response = TestClient::new(&app).register("bob", "a@x.com").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Email already registered. Please use another email"));
    assert!(
        state
            .store()
            .find_user_by_username("bob")
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_register_missing_and_overlong_fields() {
    let (state, app) = spawn_app().await;
    let mut client = TestClient::new(&app);

    let long_name = "a".repeat(21);
    let response = client
        .post_form(
            "/register",
            &[("username", long_name.as_str()), ("password", "secret1")],
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("This field is required."));
    assert!(response.body.contains("Field cannot be longer than 20 characters."));
    assert!(response.body.contains(&long_name));
    assert!(state.store().list_users().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_login_success_and_failure() {
    let (_state, app) = spawn_app().await;
    TestClient::new(&app).register("alice", "a@x.com").await;

    let mut client = TestClient::new(&app);

    let response = client
        .post_form("/login", &[("username", "alice"), ("password", "wrong")])
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Invalid username"));

    let response = client
        .post_form("/login", &[("username", "nobody"), ("password", "wrong")])
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Invalid username"));

    // Failed logins leave the session anonymous
    let response = client.get("/users/alice").await;
    assert_eq!(response.location.as_deref(), Some("/"));
    let home = client.follow(&response).await;
    assert!(home.body.contains("Please login first!"));

    let response = client
        .post_form("/login", &[("username", "alice"), ("password", "secret1")])
        .await;
    assert_eq!(response.status, StatusCode::FOUND);
    assert_eq!(response.location.as_deref(), Some("/users/alice"));

    let profile = client.follow(&response).await;
    assert_eq!(profile.status, StatusCode::OK);
    assert!(profile.body.contains("Welcome Back, alice!"));
}

#[tokio::test]
async fn test_logout_clears_session() {
    let (_state, app) = spawn_app().await;
    let mut client = TestClient::new(&app);
    client.register("alice", "a@x.com").await;

    let response = client.get("/logout").await;
    assert_eq!(response.status, StatusCode::FOUND);
    assert_eq!(response.location.as_deref(), Some("/"));

    let home = client.follow(&response).await;
    assert!(home.body.contains("Goodbye!"));

    let profile = client.get("/users/alice").await;
    assert_eq!(profile.location.as_deref(), Some("/"));

    // Logging out twice is fine
    let response = client.get("/logout").await;
    assert_eq!(response.status, StatusCode::FOUND);
}

#[tokio::test]
async fn test_profile_of_other_user_is_forbidden() {
    let (_state, app) = spawn_app().await;
    TestClient::new(&app).register("bob", "b@x.com").await;

    let mut alice = TestClient::new(&app);
    alice.register("alice", "a@x.com").await;

    let response = alice.get("/users/bob").await;
    assert_eq!(response.status, StatusCode::FOUND);
    assert_eq!(response.location.as_deref(), Some("/"));

    let home = alice.follow(&response).await;
    assert!(home.body.contains("have permission to do that!"));
    assert!(!home.body.contains("b@x.com"));
}

#[tokio::test]
async fn test_unknown_user_looks_like_another_account() {
    let (_state, app) = spawn_app().await;
    let mut client = TestClient::new(&app);
    client.register("alice", "a@x.com").await;

    let response = client.get("/users/ghost").await;
    assert_eq!(response.status, StatusCode::FOUND);
    assert_eq!(response.location.as_deref(), Some("/"));
    let home = client.follow(&response).await;
    assert!(home.body.contains("have permission to do that!"));

    let response = client.post_form("/users/ghost/delete", &[]).await;
    assert_eq!(response.status, StatusCode::FOUND);
    assert_eq!(response.location.as_deref(), Some("/"));
}

#[tokio::test]
async fn test_session_of_deleted_account_is_logged_out() {
    let (state, app) = spawn_app().await;
    let mut first = TestClient::new(&app);
    first.register("alice", "a@x.com").await;

    let mut second = TestClient::new(&app);
    let response = second
        .post_form("/login", &[("username", "alice"), ("password", "secret1")])
        .await;
    assert_eq!(response.location.as_deref(), Some("/users/alice"));
    let response = second.post_form("/users/alice/delete", &[]).await;
    assert_eq!(response.location.as_deref(), Some("/login"));

    let response = add_feedback(&mut first, "alice", "Orphan").await;
    assert_eq!(response.status, StatusCode::FOUND);
    assert_eq!(response.location.as_deref(), Some("/"));
    let home = first.follow(&response).await;
    assert!(home.body.contains("Please login first!"));
    assert!(!home.body.contains("Logout"));
    assert_eq!(state.store().count_feedback_for_user("alice").await.unwrap(), 0);

    // The identity was cleared, not just ignored once
    let response = first.get("/users/alice").await;
    assert_eq!(response.location.as_deref(), Some("/"));
}

#[tokio::test]
async fn test_account_removed_outside_the_web_logs_session_out() {
    let (state, app) = spawn_app().await;
    let mut client = TestClient::new(&app);
    client.register("alice", "a@x.com").await;

    assert!(state.store().delete_user("alice").await.unwrap());

    let response = client.get("/users/alice").await;
    assert_eq!(response.status, StatusCode::FOUND);
    assert_eq!(response.location.as_deref(), Some("/"));

    // Re-registering the name works from the same browser
    let response = client.register("alice", "a@x.com").await;
    assert_eq!(response.location.as_deref(), Some("/users/alice"));
}

#[tokio::test]
async fn test_feedback_lifecycle() {
    let (state, app) = spawn_app().await;
    let mut client = TestClient::new(&app);
    client.register("alice", "a@x.com").await;

    let form = client.get("/users/alice/feedback/add").await;
    assert_eq!(form.status, StatusCode::OK);
    assert!(form.body.contains("name=\"title\""));

    let response = add_feedback(&mut client, "alice", "Great app").await;
    assert_eq!(response.location.as_deref(), Some("/users/alice"));
    let profile = client.follow(&response).await;
    assert!(profile.body.contains("New feedback has been added!"));
    assert!(profile.body.contains("Great app"));

    let id = only_feedback_id(&state, "alice").await;

    let edit = client.get(&format!("/feedback/{id}/update")).await;
    assert_eq!(edit.status, StatusCode::OK);
    assert!(edit.body.contains("Great app"));

    let response = client
        .post_form(
            &format!("/feedback/{id}/update"),
            &[("title", "Even better"), ("content", "Changed")],
        )
        .await;
    assert_eq!(response.location.as_deref(), Some("/users/alice"));
    let profile = client.follow(&response).await;
    assert!(profile.body.contains("Feedback updated!"));
    assert!(profile.body.contains("Even better"));

    let entry = state.store().find_feedback_by_id(id).await.unwrap().unwrap();
    assert_eq!(entry.title, "Even better");
    assert_eq!(entry.content, "Changed");
    assert_eq!(entry.username, "alice");

    let response = client
        .post_form(&format!("/feedback/{id}/delete"), &[])
        .await;
    assert_eq!(response.location.as_deref(), Some("/users/alice"));
    let profile = client.follow(&response).await;
    assert!(profile.body.contains("Feedback deleted!"));
    assert!(state.store().find_feedback_by_id(id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_feedback_validation_errors_rerender() {
    let (state, app) = spawn_app().await;
    let mut client = TestClient::new(&app);
    client.register("alice", "a@x.com").await;

    let long_title = "t".repeat(101);
    let response = client
        .post_form(
            "/users/alice/feedback/add",
            &[("title", long_title.as_str()), ("content", "")],
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Field cannot be longer than 100 characters."));
    assert!(response.body.contains("This field is required."));
    assert_eq!(state.store().count_feedback_for_user("alice").await.unwrap(), 0);
}

#[tokio::test]
async fn test_non_owner_cannot_touch_feedback() {
    let (state, app) = spawn_app().await;

    let mut bob = TestClient::new(&app);
    bob.register("bob", "b@x.com").await;
    add_feedback(&mut bob, "bob", "Bob's note").await;
    let id = only_feedback_id(&state, "bob").await;

    let mut alice = TestClient::new(&app);
    alice.register("alice", "a@x.com").await;

    let response = alice
        .post_form(
            &format!("/feedback/{id}/update"),
            &[("title", "Hacked"), ("content", "Hacked")],
        )
        .await;
    assert_eq!(response.status, StatusCode::FOUND);
    assert_eq!(response.location.as_deref(), Some("/"));
    let home = alice.follow(&response).await;
    assert!(home.body.contains("have permission to do that!"));

    let response = alice.get(&format!("/feedback/{id}/update")).await;
    assert_eq!(response.location.as_deref(), Some("/"));

    let response = alice
        .post_form(&format!("/feedback/{id}/delete"), &[])
        .await;
    assert_eq!(response.location.as_deref(), Some("/"));

    let entry = state.store().find_feedback_by_id(id).await.unwrap().unwrap();
    assert_eq!(entry.title, "Bob's note");
    assert_eq!(entry.content, "Some content");

    // Filing feedback under someone else's name
    let response = add_feedback(&mut alice, "bob", "Spam").await;
    assert_eq!(response.location.as_deref(), Some("/"));
    assert_eq!(state.store().count_feedback_for_user("bob").await.unwrap(), 1);

    // Deleting someone else's account
    let response = alice.post_form("/users/bob/delete", &[]).await;
    assert_eq!(response.location.as_deref(), Some("/"));
    assert!(
        state
            .store()
            .find_user_by_username("bob")
            .await
            .unwrap()
            .is_some()
    );
}

#[tokio::test]
async fn test_missing_or_malformed_feedback_id_is_not_found() {
    let (_state, app) = spawn_app().await;
    let mut client = TestClient::new(&app);
    client.register("alice", "a@x.com").await;

    let response = client.get("/feedback/9999/update").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = client.get("/feedback/abc/update").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = client.post_form("/feedback/9999/delete", &[]).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_protected_routes_require_login() {
    let (_state, app) = spawn_app().await;
    let mut client = TestClient::new(&app);

    for uri in ["/users/alice", "/users/alice/feedback/add", "/feedback/1/update"] {
        let response = client.get(uri).await;
        assert_eq!(response.status, StatusCode::FOUND, "{uri}");
        assert_eq!(response.location.as_deref(), Some("/"), "{uri}");
    }

    for uri in ["/users/alice/delete", "/feedback/1/delete"] {
        let response = client.post_form(uri, &[]).await;
        assert_eq!(response.location.as_deref(), Some("/"), "{uri}");
    }

    let home = client.get("/").await;
    assert!(home.body.contains("Please login first!"));
}

#[tokio::test]
async fn test_bodyless_posts_follow_the_login_check() {
    let (_state, app) = spawn_app().await;
    let mut client = TestClient::new(&app);

    for uri in ["/users/alice/feedback/add", "/feedback/1/update"] {
        let response = client
            .send(Request::builder().method("POST").uri(uri), Body::empty())
            .await;
        assert_eq!(response.status, StatusCode::FOUND, "{uri}");
        assert_eq!(response.location.as_deref(), Some("/"), "{uri}");
    }

    client.register("alice", "a@x.com").await;
    let response = client
        .send(
            Request::builder()
                .method("POST")
                .uri("/users/alice/feedback/add"),
            Body::empty(),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("This field is required."));
}

#[tokio::test]
async fn test_delete_account_cascades_and_logs_out() {
    let (state, app) = spawn_app().await;
    let mut client = TestClient::new(&app);
    client.register("alice", "a@x.com").await;
    add_feedback(&mut client, "alice", "First").await;
    add_feedback(&mut client, "alice", "Second").await;
    assert_eq!(state.store().count_feedback_for_user("alice").await.unwrap(), 2);

    let response = client.post_form("/users/alice/delete", &[]).await;
    assert_eq!(response.status, StatusCode::FOUND);
    assert_eq!(response.location.as_deref(), Some("/login"));

    let login = client.follow(&response).await;
    assert!(login.body.contains("The user and their feedback have been deleted!"));

    assert!(
        state
            .store()
            .find_user_by_username("alice")
            .await
            .unwrap()
            .is_none()
    );
    assert_eq!(state.store().count_feedback_for_user("alice").await.unwrap(), 0);

    let response = client.get("/users/alice").await;
    assert_eq!(response.location.as_deref(), Some("/"));
}

#[tokio::test]
async fn test_usernames_are_escaped_and_encoded() {
    let (_state, app) = spawn_app().await;
    let mut client = TestClient::new(&app);

    let response = client.register("<b>o b", "x@x.com").await;
    assert_eq!(response.location.as_deref(), Some("/users/%3Cb%3Eo%20b"));

    let profile = client.follow(&response).await;
    assert_eq!(profile.status, StatusCode::OK);
    assert!(!profile.body.contains("<b>o b"));
    assert!(profile.body.contains("&lt;b&gt;o b"));
}

#[tokio::test]
async fn test_csrf_token_is_enforced() {
    let mut config = test_config();
    config.security.csrf_enabled = true;
    let (state, app) = spawn_app_with(config).await;
    let mut client = TestClient::new(&app);

    let page = client.get("/register").await;
    let token = extract_csrf_token(&page.body);

    let response = client
        .post_form(
            "/register",
            &[
                ("username", "alice"),
                ("password", "secret1"),
                ("email", "a@x.com"),
                ("first_name", "Alice"),
                ("last_name", "A"),
            ],
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("The CSRF token is missing or invalid."));
    assert!(state.store().list_users().await.unwrap().is_empty());

    let response = client
        .post_form(
            "/register",
            &[
                ("csrf_token", token.as_str()),
                ("username", "alice"),
                ("password", "secret1"),
                ("email", "a@x.com"),
                ("first_name", "Alice"),
                ("last_name", "A"),
            ],
        )
        .await;
    assert_eq!(response.status, StatusCode::FOUND);

    // Login rotates the token; deletes without one are bounced home
    let profile = client.follow(&response).await;
    let token = extract_csrf_token(&profile.body);

    let response = client.post_form("/users/alice/delete", &[]).await;
    assert_eq!(response.location.as_deref(), Some("/"));
    assert!(
        state
            .store()
            .find_user_by_username("alice")
            .await
            .unwrap()
            .is_some()
    );

    let response = client
        .post_form("/users/alice/delete", &[("csrf_token", token.as_str())])
        .await;
    assert_eq!(response.location.as_deref(), Some("/login"));
}

fn extract_csrf_token(body: &str) -> String {
    let marker = "name=\"csrf-token\" content=\"";
    let start = body.find(marker).expect("page has no csrf meta tag") + marker.len();
    let end = body[start..].find('"').unwrap() + start;
    body[start..end].to_string()
}

#[tokio::test]
async fn test_ambient_endpoints() {
    let (_state, app) = spawn_app().await;
    let mut client = TestClient::new(&app);

    let live = client.get("/health/live").await;
    assert_eq!(live.status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&live.body).unwrap();
    assert_eq!(json["status"], "alive");

    let ready = client.get("/health/ready").await;
    assert_eq!(ready.status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&ready.body).unwrap();
    assert_eq!(json["checks"]["database"], true);

    let css = client.get("/static/style.css").await;
    assert_eq!(css.status, StatusCode::OK);

    let missing = client.get("/static/nope.css").await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);

    let unknown = client.get("/no/such/page").await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_security_headers_are_set() {
    let (_state, app) = spawn_app().await;

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("x-frame-options").unwrap(),
        "DENY"
    );
    assert!(response.headers().get("content-security-policy").is_some());
}

#[tokio::test]
async fn test_memory_session_backend() {
    let mut config = test_config();
    config.server.session_backend = SessionBackend::Memory;
    let (_state, app) = spawn_app_with(config).await;
    let mut client = TestClient::new(&app);

    let response = client.register("alice", "a@x.com").await;
    let profile = client.follow(&response).await;
    assert_eq!(profile.status, StatusCode::OK);
}

async fn session_rows(state: &AppState, id: &str) -> i64 {
    let backend = state.store().conn.get_database_backend();
    let row = state
        .store()
        .conn
        .query_one(Statement::from_sql_and_values(
            backend,
            "SELECT COUNT(*) AS n FROM tower_sessions WHERE id = ?",
            [Value::from(id)],
        ))
        .await
        .unwrap()
        .unwrap();
    row.try_get::<i64>("", "n").unwrap()
}

async fn insert_session_row(state: &AppState, id: &str, expiry_date: i64) {
    let backend = state.store().conn.get_database_backend();
    state
        .store()
        .conn
        .execute(Statement::from_sql_and_values(
            backend,
            "INSERT INTO tower_sessions (id, data, expiry_date) VALUES (?, x'80', ?)",
            [Value::from(id), Value::from(expiry_date)],
        ))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_expired_sessions_are_pruned() {
    let (state, _app) = spawn_app().await;
    let far_future = i64::from(i32::MAX);

    insert_session_row(&state, "stale", 0).await;
    insert_session_row(&state, "live", far_future).await;

    feedback::web::prune_expired_sessions(state.store())
        .await
        .unwrap();
    assert_eq!(session_rows(&state, "stale").await, 0);
    assert_eq!(session_rows(&state, "live").await, 1);

    // Building the router prunes on startup as well
    insert_session_row(&state, "stale-again", 0).await;
    feedback::web::router(state.clone()).await.unwrap();
    assert_eq!(session_rows(&state, "stale-again").await, 0);
    assert_eq!(session_rows(&state, "live").await, 1);
}
