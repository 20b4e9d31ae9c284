use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use engine::{Argon2Hasher, Engine};
use jsonwebtoken::{EncodingKey, Header, get_current_timestamp};
use server::ServerConfig;

const SECRET: &str = "test-secret";

fn app(enable_register: bool) -> Router {
    let engine = Engine::builder()
        .hasher(Argon2Hasher::with_cost(8, 1).unwrap())
        .build();
    server::router(
        engine,
        ServerConfig {
            enable_register,
            jwt_secret: SECRET.to_string(),
        },
    )
}

fn sign(secret: &str, sub: &str, exp: u64) -> String {
    jsonwebtoken::encode(
        &Header::default(),
        &json!({ "sub": sub, "exp": exp }),
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    auth: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = auth {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn register(app: &Router, first_name: &str, email: &str) {
    let (status, _) = send(
        app,
        "POST",
        "/register",
        None,
        Some(json!({
            "first_name": first_name,
            "last_name": "Doe",
            "email": email,
            "password": "password123",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

async fn login(app: &Router, email: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/login",
        None,
        Some(json!({ "email": email, "password": "password123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

async fn user_id(app: &Router, token: &str) -> String {
    let (status, user) = send(app, "GET", "/user", Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
    user["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_check_is_public() {
    let (status, _) = send(&app(false), "GET", "/health-check", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn register_is_hidden_when_disabled() {
    let (status, _) = send(
        &app(false),
        "POST",
        "/register",
        None,
        Some(json!({
            "first_name": "Alice",
            "last_name": "Doe",
            "email": "alice@doe.eu",
            "password": "password123",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn register_validates_fields() {
    let (status, body) = send(
        &app(true),
        "POST",
        "/register",
        None,
        Some(json!({
            "first_name": "A",
            "last_name": "Doe",
            "email": "not-an-email",
            "password": "short",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.get("first_name").is_some());
    assert!(body.get("email").is_some());
    assert!(body.get("password").is_some());
    assert!(body.get("last_name").is_none());
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let app = app(true);
    register(&app, "Alice", "alice@doe.eu").await;
    let (status, _) = send(
        &app,
        "POST",
        "/register",
        None,
        Some(json!({
            "first_name": "Alice",
            "last_name": "Doe",
            "email": "alice@doe.eu",
            "password": "password123",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn login_issues_bearer_token() {
    let app = app(true);
    register(&app, "Alice", "alice@doe.eu").await;

    let (status, body) = send(
        &app,
        "POST",
        "/login",
        None,
        Some(json!({ "email": "alice@doe.eu", "password": "password123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tokenType"], "Bearer");
    assert!(body["expiresIn"].as_u64().unwrap() > get_current_timestamp());
    let token = body["token"].as_str().unwrap();

    let (status, user) = send(&app, "GET", "/user", Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["first_name"], "Alice");
    assert!(user.get("password_hash").is_none());

    for (email, password) in [
        ("alice@doe.eu", "wrong-password"),
        ("bob@doe.eu", "password123"),
    ] {
        let (status, _) = send(
            &app,
            "POST",
            "/login",
            None,
            Some(json!({ "email": email, "password": password })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{email}");
    }
}

#[tokio::test]
async fn protected_routes_reject_bad_tokens() {
    let app = app(true);
    register(&app, "Alice", "alice@doe.eu").await;
    let token = login(&app, "alice@doe.eu").await;
    let alice_id = user_id(&app, &token).await;
    let tomorrow = get_current_timestamp() + 86_400;

    let (status, _) = send(&app, "GET", "/user", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let signature_at = token.rfind('.').unwrap() + 1;
    let flipped = if token[signature_at..].starts_with('A') { "B" } else { "A" };
    let mut tampered = token.clone();
    tampered.replace_range(signature_at..signature_at + 1, flipped);

    let rejected = [
        "not-a-jwt".to_string(),
        tampered,
        sign("other-secret", &alice_id, tomorrow),
        sign(SECRET, &alice_id, get_current_timestamp() - 3600),
        sign(SECRET, "no-such-user", tomorrow),
    ];
    for bad in &rejected {
        let (status, _) = send(&app, "GET", "/user", Some(bad.as_str()), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{bad}");
    }

    let fresh = sign(SECRET, &alice_id, tomorrow);
    let (status, _) = send(&app, "GET", "/user", Some(fresh.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn vault_and_category_flow() {
    let app = app(true);
    register(&app, "Alice", "alice@doe.eu").await;
    register(&app, "Bob", "bob@doe.eu").await;
    let alice = login(&app, "alice@doe.eu").await;
    let bob = login(&app, "bob@doe.eu").await;
    let bob_id = user_id(&app, &bob).await;

    let (status, created) = send(
        &app,
        "POST",
        "/vaults",
        Some(alice.as_str()),
        Some(json!({ "name": "Shared" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let vault_id = created["id"].as_str().unwrap().to_string();

    let (_, alice_user) = send(&app, "GET", "/user", Some(alice.as_str()), None).await;
    assert_eq!(alice_user["active_vault"], vault_id.as_str());

    let (status, vault) = send(
        &app,
        "GET",
        &format!("/vaults/{vault_id}"),
        Some(alice.as_str()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(vault["role"], "owner");

    let (status, _) = send(
        &app,
        "GET",
        &format!("/vaults/{vault_id}"),
        Some(bob.as_str()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, category) = send(
        &app,
        "POST",
        "/expense-categories",
        Some(alice.as_str()),
        Some(json!({ "vault_id": vault_id, "name": "Rent" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let category_id = category["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        "POST",
        &format!("/vaults/{vault_id}/users"),
        Some(alice.as_str()),
        Some(json!({ "user_id": bob_id, "role": "owner" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        &format!("/vaults/{vault_id}/users"),
        Some(alice.as_str()),
        Some(json!({ "user_id": bob_id, "role": "editor" })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(
        &app,
        "POST",
        "/expense-categories",
        Some(bob.as_str()),
        Some(json!({ "vault_id": vault_id, "name": "Rent" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        "POST",
        "/expense-categories",
        Some(alice.as_str()),
        Some(json!({ "vault_id": vault_id, "name": "Rent" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, listed) = send(
        &app,
        "GET",
        &format!("/vaults/{vault_id}/expense-categories"),
        Some(bob.as_str()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["categories"].as_array().unwrap().len(), 1);

    for body in [
        json!({ "status": "inactive", "priority": 3 }),
        json!({}),
    ] {
        let (status, errors) = send(
            &app,
            "PATCH",
            &format!("/expense-categories/{category_id}"),
            Some(alice.as_str()),
            Some(body),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(errors.get("status").is_some());
    }
    let (_, unchanged) = send(
        &app,
        "GET",
        &format!("/expense-categories/{category_id}"),
        Some(alice.as_str()),
        None,
    )
    .await;
    assert_eq!(unchanged["status"], "active");

    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/expense-categories/{category_id}"),
        Some(alice.as_str()),
        Some(json!({ "status": "inactive" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, updated) = send(
        &app,
        "PATCH",
        &format!("/expense-categories/{category_id}"),
        Some(alice.as_str()),
        Some(json!({ "priority": 3 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "inactive");
    assert_eq!(updated["priority"], 3);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/vaults/{vault_id}"),
        Some(bob.as_str()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/vaults/{vault_id}"),
        Some(alice.as_str()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(
        &app,
        "GET",
        &format!("/expense-categories/{category_id}"),
        Some(alice.as_str()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, alice_user) = send(&app, "GET", "/user", Some(alice.as_str()), None).await;
    assert!(alice_user["active_vault"].is_null());
}

#[tokio::test]
async fn set_active_vault() {
    let app = app(true);
    register(&app, "Alice", "alice@doe.eu").await;
    let alice = login(&app, "alice@doe.eu").await;
    let mut ids = Vec::new();
    for name in ["Home", "Work"] {
        let (_, created) = send(
            &app,
            "POST",
            "/vaults",
            Some(alice.as_str()),
            Some(json!({ "name": name })),
        )
        .await;
        ids.push(created["id"].as_str().unwrap().to_string());
    }

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/vaults/{}/active", ids[1]),
        Some(alice.as_str()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, alice_user) = send(&app, "GET", "/user", Some(alice.as_str()), None).await;
    assert_eq!(alice_user["active_vault"], ids[1].as_str());

    let (status, listed) = send(&app, "GET", "/vaults", Some(alice.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["vaults"].as_array().unwrap().len(), 2);
}
