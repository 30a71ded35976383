use chrono::NaiveDate;
use harvest_client::storage::{KeyValueStore, MemoryStore, PENDING_REGISTRATION_KEY, TOKEN_KEY, USER_KEY};
use harvest_client::session::LANDING_ROUTE;
use harvest_client::{auth::LOGIN_FAILED, ApiClient, ClientError, RegistrationMode, Session};
use harvest_common::registration::RegistrationForm;
use harvest_common::role::UserRole;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn user_json() -> serde_json::Value {
    json!({
        "id": 3,
        "username": "nimal",
        "email": "nimal@farm.lk",
        "firstName": "Nimal",
        "lastName": "Silva",
        "role": "FARMER",
        "permissions": ["CREATE_PRODUCT"]
    })
}

fn session(server: &MockServer, mode: RegistrationMode) -> (Session<MemoryStore>, MemoryStore) {
    let store = MemoryStore::new();
    let api = ApiClient::new(format!("{}/api", server.uri()));
    (Session::new(api, store.clone(), mode), store)
}

fn valid_form() -> RegistrationForm {
    RegistrationForm {
        username: "nimal".into(),
        email: "nimal@farm.lk".into(),
        password: "green-tea-42".into(),
        confirm_password: "green-tea-42".into(),
        first_name: "Nimal".into(),
        last_name: "Silva".into(),
        role: Some(UserRole::Distributor),
        ..Default::default()
    }
}

fn now() -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 4, 2)
        .unwrap()
        .and_hms_opt(10, 30, 0)
        .unwrap()
}

#[tokio::test]
async fn login_stores_token_and_user() {
    let server = MockServer::start().await;
    let mut body = user_json();
    body["token"] = json!("jwt-123");
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({"username": "nimal", "password": "secret-pass"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(&server)
        .await;

    let (session, store) = session(&server, RegistrationMode::Pending);
    let user = session.login(" nimal ", "secret-pass").await.unwrap();

    assert_eq!(user.role(), Some(UserRole::Farmer));
    assert!(session.is_authenticated());
    assert_eq!(store.get(TOKEN_KEY).unwrap().as_deref(), Some("jwt-123"));
    assert!(store.get(USER_KEY).unwrap().unwrap().contains("\"firstName\":\"Nimal\""));
    assert_eq!(session.user().map(|u| u.id), Some(3));
    assert_eq!(LANDING_ROUTE, "/dashboard");
}

/// Memory store that refuses to save the user profile.
#[derive(Clone, Default)]
struct UserWriteFails(MemoryStore);

impl KeyValueStore for UserWriteFails {
    fn get(&self, key: &str) -> harvest_client::Result<Option<String>> {
        self.0.get(key)
    }

    fn set(&self, key: &str, value: &str) -> harvest_client::Result<()> {
        if key == USER_KEY {
            return Err(ClientError::Storage("disk full".into()));
        }
        self.0.set(key, value)
    }

    fn remove(&self, key: &str) -> harvest_client::Result<()> {
        self.0.remove(key)
    }
}

#[tokio::test]
async fn failed_user_write_leaves_no_token_behind() {
    let server = MockServer::start().await;
    let mut body = user_json();
    body["token"] = json!("jwt-123");
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(&server)
        .await;

    let store = UserWriteFails::default();
    let api = ApiClient::new(format!("{}/api", server.uri()));
    let session = Session::new(api, store.clone(), RegistrationMode::Pending);

    let err = session.login("nimal", "secret-pass").await.unwrap_err();
    assert!(matches!(err, ClientError::Storage(_)), "{err:?}");
    assert!(!session.is_authenticated());
    assert_eq!(session.api().token(), None);
    assert_eq!(store.get(TOKEN_KEY).unwrap(), None);
    assert_eq!(store.get(USER_KEY).unwrap(), None);
}

#[tokio::test]
async fn login_failure_shows_server_message_or_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_string(""))
        .mount(&server)
        .await;

    let (session, store) = session(&server, RegistrationMode::Pending);
    let err = session.login("nimal", "wrong").await.unwrap_err();
    assert_eq!(err.status(), Some(401));
    assert_eq!(err.user_message(LOGIN_FAILED), LOGIN_FAILED);
    assert!(!session.is_authenticated());
    assert_eq!(store.get(TOKEN_KEY).unwrap(), None);
}

#[tokio::test]
async fn init_confirms_stored_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .and(header("Authorization", "Bearer stored-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json()))
        .expect(1)
        .mount(&server)
        .await;

    let (session, store) = session(&server, RegistrationMode::Pending);
    store.set(TOKEN_KEY, "stored-token").unwrap();

    let user = session.init().await.unwrap().unwrap();
    assert_eq!(user.username, "nimal");
    assert!(store.get(USER_KEY).unwrap().is_some());
}

#[tokio::test]
async fn init_with_rejected_token_signs_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let (session, store) = session(&server, RegistrationMode::Pending);
    store.set(TOKEN_KEY, "expired").unwrap();
    store.set(USER_KEY, &user_json().to_string()).unwrap();

    assert_eq!(session.init().await.unwrap(), None);
    assert!(!session.is_authenticated());
    assert_eq!(store.get(TOKEN_KEY).unwrap(), None);
    assert_eq!(store.get(USER_KEY).unwrap(), None);
}

#[tokio::test]
async fn init_without_token_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (session, _) = session(&server, RegistrationMode::Pending);
    assert_eq!(session.init().await.unwrap(), None);
}

#[tokio::test]
async fn pending_registration_is_parked_locally() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/register"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (session, store) = session(&server, RegistrationMode::Pending);
    let request = valid_form().into_request().unwrap();
    let outcome = session.register(request, now()).await.unwrap();

    assert!(matches!(
        outcome,
        harvest_client::session::RegistrationOutcome::PendingApproval { .. }
    ));
    let parked = store.get(PENDING_REGISTRATION_KEY).unwrap().unwrap();
    assert!(!parked.contains("green-tea-42"));
    let pending = session.pending_registration().unwrap().unwrap();
    assert_eq!(pending.role, UserRole::Distributor);
    assert_eq!(pending.submitted_at, now());
}

#[tokio::test]
async fn direct_registration_posts_the_form() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/register"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"message": "User registered successfully"})))
        .expect(1)
        .mount(&server)
        .await;

    let (session, store) = session(&server, RegistrationMode::Direct);
    let outcome = session
        .register(valid_form().into_request().unwrap(), now())
        .await
        .unwrap();
    assert_eq!(outcome, harvest_client::session::RegistrationOutcome::Registered);
    assert_eq!(store.get(PENDING_REGISTRATION_KEY).unwrap(), None);

    let requests = server.received_requests().await.unwrap();
    let sent: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(sent["role"], "DISTRIBUTOR");
    assert!(sent.get("confirmPassword").is_none());
}

#[tokio::test]
async fn registration_validation_errors_surface_per_field() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/register"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "message": "Validation failed",
            "errors": {"username": "Username is already taken"},
            "errorCode": "VALIDATION_ERROR"
        })))
        .mount(&server)
        .await;

    let (session, _) = session(&server, RegistrationMode::Direct);
    let err = session
        .register(valid_form().into_request().unwrap(), now())
        .await
        .unwrap_err();
    assert_eq!(err.user_message("Registration failed"), "Validation failed");
    assert_eq!(err.field_errors().unwrap()["username"], "Username is already taken");
}

#[tokio::test]
async fn logout_clears_everything() {
    let server = MockServer::start().await;
    let (session, store) = session(&server, RegistrationMode::Pending);
    store.set(TOKEN_KEY, "t").unwrap();
    store.set(USER_KEY, &user_json().to_string()).unwrap();
    assert_eq!(session.restore().unwrap().map(|u| u.id), Some(3));

    session.logout().unwrap();
    assert!(session.user().is_none());
    assert!(!session.is_authenticated());
    assert_eq!(store.get(TOKEN_KEY).unwrap(), None);
}
