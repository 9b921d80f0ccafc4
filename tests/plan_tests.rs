// tests/plan_tests.rs

mod common;

use common::{spawn_app, unique_name};
use gym_coach::coach::PLAN_APOLOGY;
use serde_json::{Value, json};

#[tokio::test]
async fn plan_crud_flow() {
    let app = spawn_app().await;
    let token = app.signup(&unique_name("p")).await;

    // Create
    let response = app
        .post(&token, "/plans", json!({ "type": "workout", "content": "Squats 5x5" }))
        .await;
    assert_eq!(response.status().as_u16(), 201);
    let plan: Value = response.json().await.unwrap();
    let id = plan["id"].as_i64().unwrap();
    assert_eq!(plan["type"], "workout");

    app.post(&token, "/plans", json!({ "type": "diet", "content": "More protein" }))
        .await;

    // List, with and without filter
    let all: Value = app.get(&token, "/plans").await.json().await.unwrap();
    assert_eq!(all["plans"].as_array().unwrap().len(), 2);

    let diets: Value = app
        .get(&token, "/plans?plan_type=diet")
        .await
        .json()
        .await
        .unwrap();
    let diets = diets["plans"].as_array().unwrap();
    assert_eq!(diets.len(), 1);
    assert_eq!(diets[0]["content"], "More protein");

    // Read
    let fetched: Value = app
        .get(&token, &format!("/plans/{}", id))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(fetched["content"], "Squats 5x5");

    // Delete
    let response = app.delete(&token, &format!("/plans/{}", id)).await;
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Plan deleted successfully");

    let response = app.get(&token, &format!("/plans/{}", id)).await;
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn partial_update_keeps_untouched_fields() {
    let app = spawn_app().await;
    let token = app.signup(&unique_name("p")).await;

    let plan: Value = app
        .post(&token, "/plans", json!({ "type": "diet", "content": "Old" }))
        .await
        .json()
        .await
        .unwrap();
    let path = format!("/plans/{}", plan["id"]);

    let updated: Value = app
        .put(&token, &path, json!({ "content": "x" }))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(updated["content"], "x");
    assert_eq!(updated["type"], "diet");

    // Explicit null is ignored, not written.
    let response = app.put(&token, &path, json!({ "type": null })).await;
    assert_eq!(response.status().as_u16(), 200);
    let updated: Value = response.json().await.unwrap();
    assert_eq!(updated["type"], "diet");
    assert_eq!(updated["content"], "x");
}

#[tokio::test]
async fn unknown_plan_type_is_rejected() {
    let app = spawn_app().await;
    let token = app.signup(&unique_name("p")).await;

    let response = app
        .post(&token, "/plans", json!({ "type": "meditation", "content": "Breathe" }))
        .await;

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn other_users_cannot_touch_a_plan() {
    let app = spawn_app().await;
    let owner = app.signup(&unique_name("a")).await;
    let intruder = app.signup(&unique_name("b")).await;

    let plan: Value = app
        .post(&owner, "/plans", json!({ "type": "workout", "content": "Mine" }))
        .await
        .json()
        .await
        .unwrap();
    let path = format!("/plans/{}", plan["id"]);

    assert_eq!(app.get(&intruder, &path).await.status().as_u16(), 403);
    assert_eq!(
        app.put(&intruder, &path, json!({ "content": "Yours" }))
            .await
            .status()
            .as_u16(),
        403
    );
    assert_eq!(app.delete(&intruder, &path).await.status().as_u16(), 403);
    assert_eq!(
        app.get(&intruder, &format!("{}/analyze", path))
            .await
            .status()
            .as_u16(),
        403
    );

    // Still intact for the owner.
    let fetched: Value = app.get(&owner, &path).await.json().await.unwrap();
    assert_eq!(fetched["content"], "Mine");

    // And the intruder's own list is empty.
    let list: Value = app.get(&intruder, "/plans").await.json().await.unwrap();
    assert!(list["plans"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn deleting_a_missing_plan_is_404() {
    let app = spawn_app().await;
    let token = app.signup(&unique_name("p")).await;

    let response = app.delete(&token, "/plans/999999").await;

    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn analyze_returns_the_coach_review() {
    let app = spawn_app().await;
    let token = app.signup(&unique_name("p")).await;
    app.coach.reply("Solid plan. Add a deload week.");

    let plan: Value = app
        .post(&token, "/plans", json!({ "type": "workout", "content": "Deadlift 3x5" }))
        .await
        .json()
        .await
        .unwrap();

    let response = app.get(&token, &format!("/plans/{}/analyze", plan["id"])).await;

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["plan_id"], plan["id"]);
    assert_eq!(body["analysis"], "Solid plan. Add a deload week.");
    assert!(body["analysis_id"].as_str().is_some_and(|id| !id.is_empty()));

    let requests = app.coach.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].messages[1].content.contains("Deadlift 3x5"));
}

#[tokio::test]
async fn analyze_falls_back_to_an_apology() {
    let app = spawn_app().await;
    let token = app.signup(&unique_name("p")).await;
    app.coach.fail();

    let plan: Value = app
        .post(&token, "/plans", json!({ "type": "diet", "content": "Rice and beans" }))
        .await
        .json()
        .await
        .unwrap();

    let response = app.get(&token, &format!("/plans/{}/analyze", plan["id"])).await;

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["analysis"], PLAN_APOLOGY);
}
