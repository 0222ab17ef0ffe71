#![allow(dead_code)]

use invoice_editor::config::{CatalogConfig, EditorConfig, SessionConfig};
use invoice_editor::models::EditPolicy;
use invoice_editor::startup::Application;
use reqwest::{Client, Response};
use serde_json::{json, Value};
use service_core::config::Config as CoreConfig;
use std::sync::Once;
use std::time::Duration;

static INIT_TRACING: Once = Once::new();

fn init_test_tracing() {
    INIT_TRACING.call_once(|| {
        if std::env::var("TEST_LOG").is_ok() {
            service_core::observability::init_tracing("invoice-editor-test", "debug", None);
        }
    });
}

pub fn test_config() -> EditorConfig {
    EditorConfig {
        common: CoreConfig {
            host: "127.0.0.1".to_string(),
            port: 0, // Random port for testing
        },
        service_name: "invoice-editor".to_string(),
        log_level: "debug".to_string(),
        otlp_endpoint: None,
        catalog: CatalogConfig {
            timeout: Duration::from_secs(2),
            ..CatalogConfig::default()
        },
        session: SessionConfig::default(),
        seller_state_code: None,
    }
}

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub client: Client,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(|_| {}).await
    }

    pub async fn spawn_with(configure: impl FnOnce(&mut EditorConfig)) -> Self {
        init_test_tracing();

        let mut config = test_config();
        configure(&mut config);

        let app = Application::build(config)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for HTTP server to be ready by polling health endpoint
        let client = Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            client,
        }
    }

    /// Spawn an app whose catalog client points at `base_url`.
    pub async fn spawn_with_catalog(base_url: &str, seller_state_code: Option<&str>) -> Self {
        let base_url = base_url.to_string();
        let seller_state_code = seller_state_code.map(str::to_string);
        Self::spawn_with(move |config| {
            config.catalog.base_url = base_url;
            config.seller_state_code = seller_state_code;
        })
        .await
    }

    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(format!("{}{}", self.address, path))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> Response {
        self.client
            .post(format!("{}{}", self.address, path))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn delete(&self, path: &str) -> Response {
        self.client
            .delete(format!("{}{}", self.address, path))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Create a session and return its id.
    pub async fn create_session(&self, edit_policy: Option<EditPolicy>) -> String {
        let body = match edit_policy {
            Some(policy) => json!({ "edit_policy": policy }),
            None => json!({}),
        };
        let response = self.post_json("/api/sessions", &body).await;
        assert_eq!(response.status().as_u16(), 201);

        let snapshot: Value = response.json().await.expect("Failed to parse JSON");
        snapshot["session_id"]
            .as_str()
            .expect("session_id missing")
            .to_string()
    }

    pub async fn send_event(&self, session_id: &str, event: Value) -> Response {
        self.post_json(&format!("/api/sessions/{}/events", session_id), &event)
            .await
    }

    /// Send an event that must succeed and return the response body.
    pub async fn apply(&self, session_id: &str, event: Value) -> Value {
        let response = self.send_event(session_id, event).await;
        assert!(
            response.status().is_success(),
            "event failed with {}",
            response.status()
        );
        response.json().await.expect("Failed to parse JSON")
    }

    /// Add a row and return its id.
    pub async fn add_row(&self, session_id: &str) -> u64 {
        let body = self.apply(session_id, json!({ "type": "item_added" })).await;
        body["outcome"]["row"].as_u64().expect("row id missing")
    }

    pub async fn set_field(&self, session_id: &str, row: u64, field: &str, value: &str) -> Value {
        self.apply(
            session_id,
            json!({ "type": "field_changed", "row": row, "field": field, "value": value }),
        )
        .await
    }
}
