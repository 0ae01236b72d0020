#![allow(dead_code)]

use std::net::TcpListener;

use chrono::{Duration, Utc};
use dailypoll::{
    build_app,
    config::{Config, StripeConfig},
    serve,
};
use rand::Rng;
use reqwest::{RequestBuilder, Response};
use serde_json::{json, Value};

pub const ADMIN_EMAIL: &str = "admin@dailypoll.test";
pub const WEBHOOK_SECRET: &str = "whsec_integration";

pub struct TestApp {
    pub base: String,
    pub client: reqwest::Client,
}

fn test_config() -> Config {
    let db_path = std::env::temp_dir().join(format!(
        "dailypoll-{}.db",
        rand::thread_rng().gen::<u64>()
    ));
    Config {
        database_url: format!("sqlite://{}", db_path.display()),
        bind_address: "127.0.0.1:0".parse().unwrap(),
        jwt_secret: "integration-secret".to_string(),
        jwt_expiry_days: 1,
        admin_emails: vec![ADMIN_EMAIL.to_string()],
        stripe: StripeConfig {
            webhook_secret: Some(WEBHOOK_SECRET.to_string()),
            api_base: "http://127.0.0.1:9".to_string(),
            frontend_url: "http://localhost:3000".to_string(),
            ..Default::default()
        },
    }
}

/// Starts the server on an ephemeral port backed by a fresh sqlite file.
pub async fn spawn_app() -> TestApp {
    let app = build_app(test_config()).await.expect("app should build");
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(serve(listener, app));
    TestApp {
        base: format!("http://{}/api", address),
        client: reqwest::Client::new(),
    }
}

impl TestApp {
    pub fn get(&self, path: &str) -> RequestBuilder {
        self.client.get(format!("{}{}", self.base, path))
    }

    pub fn post(&self, path: &str) -> RequestBuilder {
        self.client.post(format!("{}{}", self.base, path))
    }

    pub fn put(&self, path: &str) -> RequestBuilder {
        self.client.put(format!("{}{}", self.base, path))
    }

    pub fn delete(&self, path: &str) -> RequestBuilder {
        self.client.delete(format!("{}{}", self.base, path))
    }

    pub async fn register(&self, name: &str, email: &str) -> (i64, String) {
        let response = self
            .post("/auth/register")
            .json(&json!({ "name": name, "email": email, "password": "hunter22" }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200, "register {}", email);
        let body: Value = response.json().await.unwrap();
        (
            body["user"]["id"].as_i64().unwrap(),
            body["token"].as_str().unwrap().to_string(),
        )
    }

    pub async fn admin_token(&self) -> String {
        self.register("Admin", ADMIN_EMAIL).await.1
    }

    /// Creates a question through the admin API and opens it for answers.
    pub async fn create_active_question(&self, admin_token: &str, options: &[&str]) -> i64 {
        let now = Utc::now();
        let response = self
            .post("/admin/questions")
            .bearer_auth(admin_token)
            .json(&json!({
                "title": "Daily",
                "content": "Which one do you pick?",
                "options": options,
                "startDate": (now - Duration::hours(1)).to_rfc3339(),
                "endDate": (now + Duration::hours(1)).to_rfc3339(),
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 201);
        let created: Value = response.json().await.unwrap();
        let id = created["id"].as_i64().unwrap();

        let response = self
            .put(&format!("/admin/questions/{}", id))
            .bearer_auth(admin_token)
            .json(&json!({ "isActive": true }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        id
    }

    pub async fn answer_as_device(&self, device: &str, question_id: i64, option: i64) -> Response {
        self.post("/questions/daily/answer")
            .header("X-Device-ID", device)
            .json(&json!({ "questionId": question_id, "optionIndex": option }))
            .send()
            .await
            .unwrap()
    }
}

/// `count` per option, in option order.
pub fn counts(stats: &Value) -> Vec<i64> {
    stats
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["count"].as_i64().unwrap())
        .collect()
}
