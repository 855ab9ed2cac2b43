mod common;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use lifepulse_entries::backend_router;
use serde_json::{json, Value};
use tower::ServiceExt;

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(v) => {
            req = req.header("content-type", "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };
    let resp = app.clone().oneshot(req.body(body).unwrap()).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn health(recorded_at: &str, wellbeing: i64) -> Value {
    json!({
        "recorded_at": recorded_at,
        "timezone": "Europe/Berlin",
        "sleep_hours": 7.5,
        "energy_level": 6,
        "wellbeing": wellbeing
    })
}

#[tokio::test]
async fn create_list_update_delete() {
    let app = backend_router(common::state());

    let (status, created) = call(&app, "POST", "/health", Some(health("2024-03-01T08:30:00+01:00", 7))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["id"], json!(1));
    assert_eq!(created["recorded_at"], json!("2024-03-01T07:30:00.000Z"));
    assert_eq!(created["local_date"], json!("2024-03-01"));
    assert_eq!(created["notes"], Value::Null);

    call(&app, "POST", "/health", Some(health("2024-03-02T08:30:00Z", 5))).await;
    let (_, rows) = call(&app, "GET", "/health", None).await;
    let ids: Vec<i64> = rows.as_array().unwrap().iter().map(|r| r["id"].as_i64().unwrap()).collect();
    assert_eq!(ids, vec![2, 1]);

    let (status, updated) = call(&app, "PUT", "/health/1", Some(json!({ "notes": "rested" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["notes"], json!("rested"));
    assert_eq!(updated["wellbeing"], json!(7));

    let (status, body) = call(&app, "DELETE", "/health/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "deleted" }));

    let (status, body) = call(&app, "DELETE", "/health/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "detail": "Health entry not found" }));
}

#[tokio::test]
async fn invalid_payload_answers_structured_422() {
    let app = backend_router(common::state());
    let (status, body) = call(
        &app,
        "POST",
        "/health",
        Some(json!({ "sleep_hours": 7, "energy_level": 11, "wellbeing": 5 })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body,
        json!({ "detail": [{
            "loc": ["body", "energy_level"],
            "msg": "Input should be less than or equal to 10",
            "type": "less_than_equal"
        }] })
    );
}

#[tokio::test]
async fn invalid_timezone_is_a_plain_422() {
    let app = backend_router(common::state());
    let mut body = health("2024-03-01T08:30:00Z", 5);
    body["timezone"] = json!("Mars");
    let (status, body) = call(&app, "POST", "/health", Some(body)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body, json!({ "detail": "Invalid timezone 'Mars'" }));
}

#[tokio::test]
async fn list_query_is_checked() {
    let app = backend_router(common::state());
    let (status, body) = call(&app, "GET", "/finance?limit=5000", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["detail"][0]["loc"], json!(["query", "limit"]));

    let (status, body) = call(&app, "GET", "/finance?start_date=2024-01-01&limit=10", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn unknown_resources_and_bad_ids() {
    let app = backend_router(common::state());
    let (status, body) = call(&app, "GET", "/sleep", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "detail": "Not Found" }));

    let (status, body) = call(&app, "PUT", "/health/abc", Some(json!({}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["detail"][0]["loc"], json!(["path", "id"]));
}

#[tokio::test]
async fn bearer_token_is_required_when_configured() {
    let app = backend_router(common::state().with_token("s3cret", 7));

    let (status, body) = call(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "detail": "Could not validate credentials" }));

    let req = Request::builder()
        .method("POST")
        .uri("/health")
        .header("authorization", "Bearer s3cret")
        .header("content-type", "application/json")
        .body(Body::from(health("2024-03-01T08:30:00Z", 5).to_string()))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let row: Value = serde_json::from_slice(&to_bytes(resp.into_body(), usize::MAX).await.unwrap()).unwrap();
    assert_eq!(row["user_id"], json!(7));
}

#[tokio::test]
async fn common_routes_answer() {
    let app = backend_router(common::state());
    let (status, body) = call(&app, "GET", "/healthz", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
    let (_, body) = call(&app, "GET", "/version", None).await;
    assert_eq!(body["name"], json!("lifepulse-entries"));
}
