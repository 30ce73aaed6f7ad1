//! Events and blog rows against a mocked PostgREST server

use axum::body::to_bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use gdg_site::config::{SiteConfig, SupabaseConfig};
use gdg_site::remote::{fetch_blogs, fetch_events, RemoteError, SupabaseClient};
use gdg_site::server::{self, AppState};

const ANON_KEY: &str = "test-anon-key";

fn supabase_config(server: &MockServer) -> SupabaseConfig {
    SupabaseConfig {
        url: Some(server.uri()),
        anon_key: Some(ANON_KEY.to_string()),
        ..Default::default()
    }
}

fn app_state(server: &MockServer, dir: &TempDir) -> Arc<AppState> {
    let config = SiteConfig {
        supabase: supabase_config(server),
        ..Default::default()
    };
    Arc::new(AppState::new(dir.path(), config).unwrap())
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn mount_events(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/events"))
        .and(query_param(
            "select",
            "id,name,post_image,description,event_time,location,created_at,registrations:registrations(id,user_id)",
        ))
        .and(header("apikey", ANON_KEY))
        .and(header("authorization", format!("Bearer {}", ANON_KEY).as_str()))
        .respond_with(response)
        .mount(server)
        .await;
}

#[tokio::test]
async fn event_without_registrations() {
    let server = MockServer::start().await;
    mount_events(
        &server,
        ResponseTemplate::new(200).set_body_json(json!([{
            "id": 1,
            "name": "Build with AI",
            "post_image": "build-with-ai.png",
            "description": "Hands-on workshop",
            "event_time": "2024-04-20T10:00:00+05:30",
            "location": "Pune",
            "created_at": "2024-03-01T00:00:00+00:00",
            "registrations": []
        }])),
    )
    .await;

    let client = SupabaseClient::new(&supabase_config(&server)).unwrap();
    let events = fetch_events(&client).await.unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].registration_count(), 0);
    assert!(events[0].registered_users().is_empty());

    let dir = TempDir::new().unwrap();
    let response = server::events(State(app_state(&server, &dir))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains("Build with AI"));
    assert!(html.contains("0 registrations"));
    assert!(html.contains("<strong>Registered User IDs:</strong>\n<ul></ul>"));
    assert!(html.contains(&format!(
        "{}/storage/v1/object/public/events/build-with-ai.png",
        server.uri()
    )));
}

#[tokio::test]
async fn event_registrations_are_listed() {
    let server = MockServer::start().await;
    mount_events(
        &server,
        ResponseTemplate::new(200).set_body_json(json!([{
            "id": "0f6c",
            "name": "DevFest",
            "post_image": null,
            "description": null,
            "event_time": null,
            "location": null,
            "created_at": null,
            "registrations": [
                {"id": 10, "user_id": "alice"},
                {"id": 11, "user_id": "bob"}
            ]
        }])),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let html = body_text(server::events(State(app_state(&server, &dir))).await).await;
    assert!(html.contains("2 registrations"));
    assert!(html.contains("<li>alice</li><li>bob</li>"));
    assert!(!html.contains("<img"));
}

#[tokio::test]
async fn remote_error_is_reported() {
    let server = MockServer::start().await;
    mount_events(
        &server,
        ResponseTemplate::new(401).set_body_json(json!({
            "code": "PGRST301",
            "details": null,
            "hint": null,
            "message": "JWT expired"
        })),
    )
    .await;

    let client = SupabaseClient::new(&supabase_config(&server)).unwrap();
    match fetch_events(&client).await {
        Err(RemoteError::Api {
            status,
            code,
            message,
            ..
        }) => {
            assert_eq!(status, 401);
            assert_eq!(code.as_deref(), Some("PGRST301"));
            assert_eq!(message, "JWT expired");
        }
        other => panic!("expected API error, got {:?}", other),
    }

    let dir = TempDir::new().unwrap();
    let response = server::events(State(app_state(&server, &dir))).await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let html = body_text(response).await;
    assert!(html.contains("Could not load events"));
    assert!(html.contains("JWT expired"));
    assert!(!html.contains("No events yet."));
}

#[tokio::test]
async fn null_data_is_an_error_not_an_empty_list() {
    let server = MockServer::start().await;
    mount_events(
        &server,
        ResponseTemplate::new(200).set_body_string("null"),
    )
    .await;

    let client = SupabaseClient::new(&supabase_config(&server)).unwrap();
    assert!(matches!(
        fetch_events(&client).await,
        Err(RemoteError::Decode(_))
    ));
}

#[tokio::test]
async fn empty_table_renders_placeholder() {
    let server = MockServer::start().await;
    mount_events(&server, ResponseTemplate::new(200).set_body_json(json!([]))).await;

    let dir = TempDir::new().unwrap();
    let response = server::events(State(app_state(&server, &dir))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("No events yet."));
}

#[tokio::test]
async fn blogs_are_dumped_as_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/blogs"))
        .and(query_param("select", "*"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "title": "Hello & welcome"}
        ])))
        .mount(&server)
        .await;

    let client = SupabaseClient::new(&supabase_config(&server)).unwrap();
    let rows = fetch_blogs(&client).await.unwrap();
    assert_eq!(rows[0]["title"], "Hello & welcome");

    let dir = TempDir::new().unwrap();
    let html = body_text(server::blogs(State(app_state(&server, &dir))).await).await;
    assert!(html.contains("<pre>["));
    assert!(html.contains("&quot;title&quot;: &quot;Hello &amp; welcome&quot;"));
}
