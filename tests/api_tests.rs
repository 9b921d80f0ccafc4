// tests/api_tests.rs

mod common;

use common::{PASSWORD, spawn_app, unique_name};
use serde_json::{Value, json};

#[tokio::test]
async fn health_check_404() {
    // Arrange
    let app = spawn_app().await;

    // Act
    let response = app
        .client
        .get(format!("{}/random_path_that_does_not_exist", app.address))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn register_works() {
    let app = spawn_app().await;
    let username = unique_name("u");

    let response = app.register(&username).await;

    assert_eq!(response.status().as_u16(), 201);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["username"], username.as_str());
    assert_eq!(body["is_active"], true);
    // The hash never leaves the server.
    assert!(body.get("hashed_password").is_none());
}

#[tokio::test]
async fn register_fails_validation() {
    let app = spawn_app().await;

    // Username too short
    let response = app
        .client
        .post(app.url("/auth/register"))
        .json(&json!({
            "username": "yo",
            "email": "yo@example.com",
            "password": PASSWORD
        }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 422);

    // Malformed email
    let response = app
        .client
        .post(app.url("/auth/register"))
        .json(&json!({
            "username": "valid_name",
            "email": "not-an-email",
            "password": PASSWORD
        }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 422);
}

#[tokio::test]
async fn duplicate_username_conflicts() {
    let app = spawn_app().await;
    let username = unique_name("dup");

    assert_eq!(app.register(&username).await.status().as_u16(), 201);
    assert_eq!(app.register(&username).await.status().as_u16(), 409);
}

#[tokio::test]
async fn login_rejects_wrong_password() {
    let app = spawn_app().await;
    let username = unique_name("u");
    app.register(&username).await;

    let response = app
        .client
        .post(app.url("/auth/login"))
        .json(&json!({ "username": username, "password": "wrong-password" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 401);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn me_returns_the_token_owner() {
    let app = spawn_app().await;
    let username = unique_name("me");
    let token = app.signup(&username).await;

    let response = app.get(&token, "/auth/me").await;

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["username"], username.as_str());
    assert_eq!(body["email"], format!("{}@example.com", username));
}

#[tokio::test]
async fn protected_routes_require_a_valid_token() {
    let app = spawn_app().await;

    // No header at all
    let response = app
        .client
        .get(app.url("/plans"))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 401);

    // Garbage token
    let response = app.get("not-a-jwt", "/plans").await;
    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn inactive_user_is_rejected() {
    let app = spawn_app().await;
    let username = unique_name("off");
    let token = app.signup(&username).await;

    sqlx::query("UPDATE users SET is_active = 0 WHERE username = ?")
        .bind(&username)
        .execute(&app.pool)
        .await
        .unwrap();

    let response = app.get(&token, "/auth/me").await;
    assert_eq!(response.status().as_u16(), 401);
}
