#![allow(dead_code)]

use herald::config::{Config, ConfigOverrides, ProjectConfig};
use serde_json::{Value, json};
use std::collections::HashMap;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const PROJECT_ID: &str = "42";
pub const TOKEN: &str = "test-token";
pub const TAGS_PATH: &str = "/api/v4/projects/42/repository/tags";
pub const COMPARE_PATH: &str = "/api/v4/projects/42/repository/compare";
pub const PROJECT_PATH: &str = "/api/v4/projects/42";
pub const USER_PATH: &str = "/api/v4/user";
pub const CHAT_PATH: &str = "/v1/chat/completions";
pub const WEBHOOK_PATH: &str = "/webhook";

/// Environment pointing every upstream at one mock server
pub fn mock_env(server: &MockServer) -> HashMap<String, String> {
    [
        ("GITLAB_BASE_URL", format!("{}/api/v4", server.uri())),
        ("GITLAB_PROJECT_ID", PROJECT_ID.to_string()),
        ("GITLAB_TOKEN", TOKEN.to_string()),
        ("AI_MODEL", "test-model".to_string()),
        ("AI_API_KEY", "test-key".to_string()),
        ("AI_BASE_URL", format!("{}/v1", server.uri())),
        ("TEAMS_WEBHOOK_URL", format!("{}{WEBHOOK_PATH}", server.uri())),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}

pub fn test_config(server: &MockServer) -> Config {
    config_with(server, &ProjectConfig::default(), &ConfigOverrides::default())
}

pub fn config_with(
    server: &MockServer,
    project: &ProjectConfig,
    overrides: &ConfigOverrides,
) -> Config {
    Config::resolve(project, &mock_env(server), overrides).expect("test config should resolve")
}

pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(5))
        .build()
        .expect("Failed to build HTTP client")
}

pub fn commit_json(id: &str, title: &str, message: &str) -> Value {
    json!({
        "id": id,
        "short_id": &id[..id.len().min(8)],
        "title": title,
        "message": message,
        "author_name": "Jane Doe",
        "author_email": "jane@example.com",
        "created_at": "2024-01-01T10:00:00.000+00:00",
        "parent_ids": []
    })
}

pub fn tag_json(name: &str) -> Value {
    json!({
        "name": name,
        "message": "",
        "target": "abc123",
        "commit": {"id": "abc123", "title": "", "message": ""},
        "release": null,
        "protected": false,
        "created_at": null
    })
}

pub fn tag_json_at(name: &str, created_at: &str) -> Value {
    let mut tag = tag_json(name);
    tag["created_at"] = json!(created_at);
    tag
}

pub fn chat_reply(content: &str) -> Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    })
}

/// GitLab fixture for a `v2.0.0` release following `v1.9.0`, as project `pwa` by John Doe
pub async fn mount_release(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(PROJECT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 42, "name": "pwa"})))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(USER_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 7, "name": "John Doe"})))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(TAGS_PATH))
        .and(query_param("page", "1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([tag_json("v2.0.0"), tag_json("v1.9.0")]))
                .insert_header("x-next-page", ""),
        )
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(COMPARE_PATH))
        .and(query_param("from", "v1.9.0"))
        .and(query_param("to", "v2.0.0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "commits": [
                commit_json(
                    "m1",
                    "Merge branch 'feature/export' into 'main'",
                    "Merge branch 'feature/export' into 'main'\n\nSee merge request web/pwa!12\n",
                ),
                commit_json("b2", "2.0.0", "2.0.0\n"),
                commit_json("f3", "Add CSV export", "Add CSV export\n"),
            ]
        })))
        .mount(server)
        .await;
}
