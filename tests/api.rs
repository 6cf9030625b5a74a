/// HTTP surface of the sync protocol, driven through the router without a socket.

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use flowcanvas::{config::Config, server::build_router, workflow::database::connect_in_memory};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn app() -> Router {
    let pool = connect_in_memory().await.unwrap();
    let mut config = Config::default();
    config.auth.user_header = "x-user-id".to_string();
    build_router(pool, &config).await.unwrap()
}

async fn send(app: &Router, method: &str, uri: &str, user: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        request = request.header("x-user-id", user);
    }
    let body = match body {
        Some(value) => {
            request = request.header("content-type", "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let response = app.clone().oneshot(request.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, value)
}

fn greeting() -> Value {
    json!({
        "name": "Greeting",
        "nodes": [
            { "id": "a", "type": "start", "positionX": 0, "positionY": 0, "data": {} },
            { "id": "b", "type": "end", "positionX": 200, "positionY": 0, "data": { "outcome": "done" } }
        ],
        "edges": [{ "source": "a", "target": "b" }]
    })
}

#[tokio::test]
async fn health_check_responds() {
    let app = app().await;
    let (status, body) = send(&app, "GET", "/healthz", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!("ok"));
}

#[tokio::test]
async fn create_then_read() {
    let app = app().await;

    let (status, created) = send(&app, "POST", "/api/workflows", Some("alice"), Some(greeting())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["ownerId"], "alice");
    assert_eq!(created["nodes"][0]["type"], "start");
    assert_eq!(created["nodes"][1]["data"]["outcome"], "done");
    assert_eq!(created["edges"][0]["source"], created["nodes"][0]["id"]);
    assert_eq!(created["edges"][0]["target"], created["nodes"][1]["id"]);

    let id = created["id"].as_str().unwrap();
    let (status, read) = send(&app, "GET", &format!("/api/workflows/{}", id), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(read, created);
}

#[tokio::test]
async fn create_requires_caller() {
    let app = app().await;

    let (status, body) = send(&app, "POST", "/api/workflows", None, Some(greeting())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn malformed_graphs_are_bad_requests() {
    let app = app().await;

    let mut not_array = greeting();
    not_array["nodes"] = json!({ "a": {} });
    let (status, body) = send(&app, "POST", "/api/workflows", Some("alice"), Some(not_array)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("invalid workflow graph"));

    let mut dangling = greeting();
    dangling["edges"] = json!([{ "source": "a", "target": "zzz" }]);
    let (status, body) = send(&app, "POST", "/api/workflows", Some("alice"), Some(dangling)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("zzz"));

    let (status, listed) = send(&app, "GET", "/api/workflows", Some("alice"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["workflows"], json!([]));
}

#[tokio::test]
async fn read_unknown_is_not_found() {
    let app = app().await;
    let (status, body) = send(&app, "GET", "/api/workflows/nope", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn update_by_non_owner_is_forbidden() {
    let app = app().await;

    let (_, created) = send(&app, "POST", "/api/workflows", Some("alice"), Some(greeting())).await;
    let uri = format!("/api/workflows/{}", created["id"].as_str().unwrap());

    let (status, _) = send(&app, "PUT", &uri, Some("mallory"), Some(greeting())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, "PUT", &uri, None, Some(greeting())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, "PUT", "/api/workflows/nope", Some("alice"), Some(greeting())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, read) = send(&app, "GET", &uri, None, None).await;
    assert_eq!(read, created);
}

#[tokio::test]
async fn update_replaces_graph_and_list_counts_nodes() {
    let app = app().await;

    let (_, created) = send(&app, "POST", "/api/workflows", Some("alice"), Some(greeting())).await;
    let uri = format!("/api/workflows/{}", created["id"].as_str().unwrap());

    let replacement = json!({
        "name": "Just a delay",
        "nodes": [{ "localId": "d", "type": "DELAY", "positionX": 1.5, "positionY": 2.5, "data": { "duration": 0 } }],
        "edges": []
    });
    let (status, updated) = send(&app, "PUT", &uri, Some("alice"), Some(replacement)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Just a delay");
    assert_eq!(updated["nodes"].as_array().unwrap().len(), 1);
    assert_eq!(updated["nodes"][0]["type"], "delay");
    assert_eq!(updated["nodes"][0]["data"]["duration"], 1);
    assert_eq!(updated["edges"], json!([]));

    let (status, listed) = send(&app, "GET", "/api/workflows", Some("alice"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["workflows"][0]["id"], created["id"]);
    assert_eq!(listed["workflows"][0]["nodeCount"], 1);
}

#[tokio::test]
async fn invalid_json_body_is_bad_request() {
    let app = app().await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/workflows")
        .header("x-user-id", "alice")
        .body(Body::from("{ not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn stats_and_recent_workflows() {
    let app = app().await;

    let (status, stats) = send(&app, "GET", "/api/workflows/stats", Some("alice"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats, json!({ "workflowCount": 0, "activeWorkflows": 0, "totalNodes": 0 }));

    for _ in 0..3 {
        send(&app, "POST", "/api/workflows", Some("alice"), Some(greeting())).await;
    }
    send(&app, "POST", "/api/workflows", Some("bob"), Some(greeting())).await;

    let (_, stats) = send(&app, "GET", "/api/workflows/stats", Some("alice"), None).await;
    assert_eq!(stats, json!({ "workflowCount": 3, "activeWorkflows": 0, "totalNodes": 6 }));

    let (status, listed) = send(&app, "GET", "/api/workflows?limit=2", Some("alice"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["workflows"].as_array().unwrap().len(), 2);

    let (status, _) = send(&app, "GET", "/api/workflows/stats", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
