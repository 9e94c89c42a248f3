//! Integration tests for the translation server
//!
//! These tests boot the real router on an ephemeral port, backed by a
//! scratch SQLite file, and talk to it over HTTP.

use serde_json::{json, Value};
use std::path::PathBuf;
use tempfile::TempDir;
use translation_server::{
    db::{Database, NewTranslation},
    provision::{self, AddLanguageRequest, ProvisionPaths},
    server,
};

// ==================== Test Helpers ====================

struct TestServer {
    base_url: String,
    database_url: String,
    db: Database,
    _temp_dir: TempDir,
}

async fn start_server() -> TestServer {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("integration.db");
    let database_url = format!("sqlite://{}", db_path.display());
    let db = Database::new(&database_url)
        .await
        .expect("Failed to create database");

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let address = listener.local_addr().expect("Should have address");

    let app = server::router(db.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    TestServer {
        base_url: format!("http://{}", address),
        database_url,
        db,
        _temp_dir: temp_dir,
    }
}

fn row(key: &str, lang: &str, name: &str, value: &str) -> NewTranslation {
    NewTranslation {
        key: key.to_string(),
        lang: lang.to_string(),
        name: name.to_string(),
        value: value.to_string(),
    }
}

async fn get_json(url: &str) -> (u16, Value) {
    let response = reqwest::get(url).await.expect("Request failed");
    let status = response.status().as_u16();
    let body = response.json::<Value>().await.expect("Body should be JSON");
    (status, body)
}

fn bundled(path: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(path)
}

// ==================== Endpoint Tests ====================

#[tokio::test]
async fn test_health_endpoint() {
    let server = start_server().await;

    let (status, body) = get_json(&format!("{}/api/health", server.base_url)).await;
    assert_eq!(status, 200);
    assert_eq!(body, json!({"status": "OK"}));
}

#[tokio::test]
async fn test_translations_endpoint_nests_keys() {
    let server = start_server().await;
    server
        .db
        .insert_many(&[
            row("navbar.home", "en", "English", "Home"),
            row("navbar.about", "en", "English", "About"),
            row("title", "en", "English", "Hello"),
        ])
        .await
        .unwrap();

    let (status, body) = get_json(&format!("{}/api/translations/en", server.base_url)).await;
    assert_eq!(status, 200);
    assert_eq!(
        body,
        json!({"navbar": {"home": "Home", "about": "About"}, "title": "Hello"})
    );
}

#[tokio::test]
async fn test_translations_endpoint_unknown_language() {
    let server = start_server().await;

    let (status, body) =
        get_json(&format!("{}/api/translations/__nonexistent__", server.base_url)).await;
    assert_eq!(status, 404);
    assert_eq!(body, json!({"error": "Language not found"}));
}

#[tokio::test]
async fn test_languages_endpoint() {
    let server = start_server().await;
    server
        .db
        .insert_many(&[
            row("a", "en", "English", "1"),
            row("b", "en", "English", "2"),
            row("a", "fr", "French", "un"),
        ])
        .await
        .unwrap();

    let (status, body) = get_json(&format!("{}/api/languages", server.base_url)).await;
    assert_eq!(status, 200);

    let entries = body.as_array().expect("Should be an array");
    assert_eq!(entries.len(), 2);
    assert!(entries.contains(&json!({"code": "en", "name": "English"})));
    assert!(entries.contains(&json!({"code": "fr", "name": "French"})));
}

#[tokio::test]
async fn test_languages_endpoint_empty_store() {
    let server = start_server().await;

    let (status, body) = get_json(&format!("{}/api/languages", server.base_url)).await;
    assert_eq!(status, 200);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_datas_endpoint_groups_by_key() {
    let server = start_server().await;
    server
        .db
        .insert_many(&[
            row("a.b", "en", "English", "X"),
            row("a.b", "fr", "French", "Y"),
            row("a.c", "en", "English", "Z"),
        ])
        .await
        .unwrap();

    let (status, body) = get_json(&format!("{}/api/datas", server.base_url)).await;
    assert_eq!(status, 200);

    let groups = body.as_object().expect("Should be an object");
    assert_eq!(groups.len(), 2);
    assert!(groups.contains_key("1"));
    assert!(groups.contains_key("2"));

    let values: Vec<&Value> = groups.values().collect();
    assert!(values.contains(&&json!({"en": "X", "fr": "Y"})));
    assert!(values.contains(&&json!({"en": "Z"})));
}

#[tokio::test]
async fn test_cors_header_present() {
    let server = start_server().await;

    let response = reqwest::Client::new()
        .get(format!("{}/api/health", server.base_url))
        .header("Origin", "http://localhost:5173")
        .send()
        .await
        .expect("Request failed");

    assert!(response
        .headers()
        .contains_key("access-control-allow-origin"));
}

#[tokio::test]
async fn test_store_failure_returns_500_with_message() {
    let server = start_server().await;
    server
        .db
        .insert_many(&[row("navbar.home", "en", "English", "Home")])
        .await
        .unwrap();

    // Break the store underneath the running server
    let other_pool = sqlx::SqlitePool::connect(&server.database_url)
        .await
        .expect("Should open second pool");
    sqlx::query("DROP TABLE translations")
        .execute(&other_pool)
        .await
        .expect("Should drop table");
    other_pool.close().await;

    for endpoint in ["/api/translations/en", "/api/datas", "/api/languages"] {
        let (status, body) = get_json(&format!("{}{}", server.base_url, endpoint)).await;
        assert_eq!(status, 500, "{} should fail", endpoint);

        let message = body["error"].as_str().expect("error should be a string");
        assert!(!message.is_empty(), "{} should carry a message", endpoint);
    }
}

// ==================== Workflow Tests ====================

#[tokio::test]
async fn test_bundled_seed_is_served() {
    let server = start_server().await;

    let seeded = server
        .db
        .seed_if_empty(&bundled("data/translations.json"))
        .await
        .expect("Bundled seed should load");
    assert!(seeded > 0);

    let (status, body) = get_json(&format!("{}/api/translations/en", server.base_url)).await;
    assert_eq!(status, 200);
    assert_eq!(body["navbar"]["home"], "Home");

    let (_, languages) = get_json(&format!("{}/api/languages", server.base_url)).await;
    assert_eq!(
        languages,
        json!([
            {"code": "en", "name": "English"},
            {"code": "ta", "name": "Tamil"}
        ])
    );
}

#[tokio::test]
async fn test_provision_then_serve_then_delete() {
    let server = start_server().await;
    let out_dir = TempDir::new().unwrap();
    let paths = ProvisionPaths {
        keys_file: bundled("data/keys.json"),
        translations_dir: out_dir.path().to_path_buf(),
    };
    let request = AddLanguageRequest::new("French", "fr").unwrap();

    let report = provision::add_language(&server.db, &paths, &request)
        .await
        .expect("Should provision");
    assert_eq!(report.written as u64, report.inserted);
    assert!(report.file_path.exists());

    // Placeholders are served as empty strings
    let (status, body) = get_json(&format!("{}/api/translations/fr", server.base_url)).await;
    assert_eq!(status, 200);
    assert_eq!(body["navbar"]["home"], "");

    let removed = provision::delete_language(&server.db, "fr", true)
        .await
        .unwrap();
    assert_eq!(removed, report.inserted);

    let (status, _) = get_json(&format!("{}/api/translations/fr", server.base_url)).await;
    assert_eq!(status, 404);
}
