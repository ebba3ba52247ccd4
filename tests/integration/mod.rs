//! Integration tests for the split deployment.
//!
//! A real data-access server runs on an ephemeral port over a SQLite file;
//! the front-end router relays to it over HTTP.
//! Run with: cargo test --test integration

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::net::TcpListener;
use tower::ServiceExt;

use professionals::api::{self, ApiState};
use professionals::client::ApiClient;
use professionals::front::{self, FrontState};
use professionals::render::Renderer;
use professionals::store::{Professional, ProfessionalStore, SqliteStore};
use professionals::telemetry::Telemetry;

struct Deployment {
    _dir: TempDir,
    store: Arc<SqliteStore>,
    api_addr: SocketAddr,
    front: Router,
}

/// Start the data-access server and build a front-end pointed at it.
async fn deploy() -> Deployment {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(SqliteStore::from_path(dir.path().join("professionals.db")).unwrap());
    store.ensure_schema().await.unwrap();

    let api_router = api::create_router(ApiState::new(store.clone(), Telemetry::disabled()));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let api_addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, api_router).await.unwrap();
    });

    let client = ApiClient::new(
        &format!("http://{api_addr}/api/professionals"),
        Telemetry::disabled(),
    )
    .unwrap();
    let front = front::create_router(FrontState::new(
        Arc::new(client),
        Arc::new(Renderer::new().unwrap()),
    ));

    Deployment {
        _dir: dir,
        store,
        api_addr,
        front,
    }
}

fn post_form(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn page(front: &Router) -> String {
    let response = front
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn add_list_delete_through_relay() {
    let deployment = deploy().await;

    assert!(page(&deployment.front).await.contains("No professionals yet."));

    for form in [
        "name=Alice&profession=Engineer&years_of_experience=5",
        "name=Mary+Ann&profession=Nurse&years_of_experience=12",
    ] {
        let response = deployment
            .front
            .clone()
            .oneshot(post_form("/add", form))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/");
    }

    let html = page(&deployment.front).await;
    assert!(html.contains("<td>Alice</td>"));
    assert!(html.contains("<td>Mary Ann</td>"));
    assert!(html.contains(r#"action="/delete/Mary%20Ann""#));

    let response = deployment
        .front
        .clone()
        .oneshot(post_form("/delete/Mary%20Ann", ""))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);

    assert_eq!(
        deployment.store.list().await.unwrap(),
        vec![Professional::new("Alice", "Engineer", 5)]
    );
    assert!(!page(&deployment.front).await.contains("Mary Ann"));
}

#[tokio::test]
async fn api_serves_json_over_the_wire() {
    let deployment = deploy().await;
    let http = reqwest::Client::new();
    let url = format!("http://{}/api/professionals", deployment.api_addr);

    let created = http
        .post(&url)
        .json(&json!({"name": "Bob", "profession": "Chef", "years_of_experience": 3}))
        .send()
        .await
        .unwrap();
    assert_eq!(created.status(), reqwest::StatusCode::CREATED);
    assert_eq!(created.json::<Value>().await.unwrap(), json!({"status": "success"}));

    let listed: Value = http.get(&url).send().await.unwrap().json().await.unwrap();
    assert_eq!(
        listed,
        json!([{"name": "Bob", "profession": "Chef", "years_of_experience": 3}])
    );

    let deleted = http.delete(format!("{url}/Bob")).send().await.unwrap();
    assert_eq!(deleted.status(), reqwest::StatusCode::NO_CONTENT);

    let deleted_again = http.delete(format!("{url}/Bob")).send().await.unwrap();
    assert_eq!(deleted_again.status(), reqwest::StatusCode::NO_CONTENT);

    assert!(deployment.store.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn front_reports_unreachable_api() {
    let client =
        ApiClient::new("http://127.0.0.1:9/api/professionals", Telemetry::disabled()).unwrap();
    let front = front::create_router(FrontState::new(
        Arc::new(client),
        Arc::new(Renderer::new().unwrap()),
    ));

    let response = front
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert!(response.status().is_server_error());
}
