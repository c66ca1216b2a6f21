use std::sync::Arc;

use axum::{
	Router,
	body::{self, Body},
	http::{Request, StatusCode},
};
use serde_json::{Map, Value};
use tower::util::ServiceExt;

use nota_api::{routes, state::AppState};
use nota_config::{
	Config, LlmProviderConfig, Notes, Postgres, Providers, Security, SecurityAuthKey, Service,
	Storage,
};
use nota_service::{BoxFuture, CompletionProvider, NotaService};
use nota_testkit::{MemoryNoteStore, TestDatabase};

struct ScriptedProvider;
impl CompletionProvider for ScriptedProvider {
	fn complete<'a>(
		&'a self,
		_cfg: &'a LlmProviderConfig,
		prompt: &'a str,
	) -> BoxFuture<'a, nota_providers::Result<String>> {
		let reply = if prompt.contains("JSON array") {
			r#"["finance", "planning"]"#.to_string()
		} else {
			"A short summary.".to_string()
		};

		Box::pin(async move { Ok(reply) })
	}
}

struct FailingProvider;
impl CompletionProvider for FailingProvider {
	fn complete<'a>(
		&'a self,
		_cfg: &'a LlmProviderConfig,
		_prompt: &'a str,
	) -> BoxFuture<'a, nota_providers::Result<String>> {
		Box::pin(async move {
			Err(nota_providers::Error::InvalidResponse { message: "Provider is down.".to_string() })
		})
	}
}

fn test_config(dsn: String, security: Security) -> Config {
	Config {
		service: Service { http_bind: "127.0.0.1:0".to_string(), log_level: "info".to_string() },
		storage: Storage { postgres: Postgres { dsn, pool_max_conns: 1 } },
		providers: Providers {
			enrichment: LlmProviderConfig {
				provider_id: "test".to_string(),
				api_base: "http://127.0.0.1:1".to_string(),
				api_key: "test-key".to_string(),
				path: "/chat/completions".to_string(),
				model: "test".to_string(),
				temperature: 0.1,
				timeout_ms: 1_000,
				default_headers: Map::new(),
			},
		},
		notes: Notes::default(),
		security,
	}
}

fn off_security() -> Security {
	Security { bind_localhost_only: true, auth_mode: "off".to_string(), auth_keys: Vec::new() }
}

fn memory_app_with(security: Security, provider: Arc<dyn CompletionProvider>) -> Router {
	let store = Arc::new(MemoryNoteStore::new());
	let config = test_config("postgres://unused@127.0.0.1:1/unused".to_string(), security);
	let service = NotaService::with_provider(config, store, provider);

	routes::router(AppState::from_service(service))
}

fn memory_app() -> Router {
	memory_app_with(off_security(), Arc::new(ScriptedProvider))
}

fn request(method: &str, uri: &str, user: Option<&str>, body: Option<Value>) -> Request<Body> {
	let mut builder = Request::builder().method(method).uri(uri);

	if let Some(user) = user {
		builder = builder.header("X-Nota-User-Id", user);
	}

	let body = match body {
		Some(value) => {
			builder = builder.header("content-type", "application/json");

			Body::from(value.to_string())
		},
		None => Body::empty(),
	};

	builder.body(body).expect("Failed to build request.")
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
	let response = app.clone().oneshot(req).await.expect("Failed to call router.");
	let status = response.status();
	let bytes = body::to_bytes(response.into_body(), usize::MAX)
		.await
		.expect("Failed to read response body.");
	let json = if bytes.is_empty() {
		Value::Null
	} else {
		serde_json::from_slice(&bytes).expect("Failed to parse response.")
	};

	(status, json)
}

async fn create(app: &Router, user: &str, title: &str, content: &str, tags: &[&str]) -> Value {
	let payload = serde_json::json!({ "title": title, "content": content, "tags": tags });
	let (status, json) = send(app, request("POST", "/v1/notes", Some(user), Some(payload))).await;

	assert_eq!(status, StatusCode::CREATED, "unexpected body: {json}");

	json
}

#[tokio::test]
async fn health_ok() {
	let (status, _) = send(&memory_app(), request("GET", "/health", None, None)).await;

	assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn create_then_get_round_trip() {
	let app = memory_app();
	let created = create(&app, "alice", "Q3", "Plan the budget.", &["work"]).await;

	assert_eq!(created["summary"], "A short summary.");
	assert_eq!(created["tags"], serde_json::json!(["work"]));
	assert_eq!(created["suggested_tags"], serde_json::json!([]));
	assert!(created.get("owner_id").is_none());

	let uri = format!("/v1/notes/{}", created["note_id"].as_str().expect("note_id"));
	let (status, fetched) = send(&app, request("GET", &uri, Some("alice"), None)).await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(fetched, created);
}

#[tokio::test]
async fn missing_identity_is_unauthorized() {
	let (status, json) = send(&memory_app(), request("GET", "/v1/notes", None, None)).await;

	assert_eq!(status, StatusCode::UNAUTHORIZED);
	assert_eq!(json["error_code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn static_keys_resolve_owner_from_bearer_token() {
	let security = Security {
		bind_localhost_only: false,
		auth_mode: "static_keys".to_string(),
		auth_keys: vec![SecurityAuthKey {
			token_id: "k1".to_string(),
			token: "secret-1".to_string(),
			user_id: "alice".to_string(),
		}],
	};
	let app = memory_app_with(security, Arc::new(ScriptedProvider));
	let payload = serde_json::json!({ "title": "T", "content": "Body." });
	let create = Request::builder()
		.method("POST")
		.uri("/v1/notes")
		.header("authorization", "Bearer secret-1")
		.header("content-type", "application/json")
		.body(Body::from(payload.to_string()))
		.expect("Failed to build request.");
	let (status, _) = send(&app, create).await;

	assert_eq!(status, StatusCode::CREATED);

	// The owner header is ignored once keys are configured.
	let (status, _) = send(&app, request("GET", "/v1/notes", Some("alice"), None)).await;

	assert_eq!(status, StatusCode::UNAUTHORIZED);

	let wrong = Request::builder()
		.uri("/v1/notes")
		.header("authorization", "Bearer nope")
		.body(Body::empty())
		.expect("Failed to build request.");
	let (status, json) = send(&app, wrong).await;

	assert_eq!(status, StatusCode::UNAUTHORIZED);
	assert_eq!(json["error_code"], "UNAUTHORIZED");

	let list = Request::builder()
		.uri("/v1/notes")
		.header("authorization", "Bearer secret-1")
		.body(Body::empty())
		.expect("Failed to build request.");
	let (status, json) = send(&app, list).await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(json["pagination"]["total"], 1);
}

#[tokio::test]
async fn other_owner_gets_not_found() {
	let app = memory_app();
	let created = create(&app, "alice", "Private", "Secret.", &[]).await;
	let uri = format!("/v1/notes/{}", created["note_id"].as_str().expect("note_id"));

	for method in ["GET", "DELETE"] {
		let (status, json) = send(&app, request(method, &uri, Some("bob"), None)).await;

		assert_eq!(status, StatusCode::NOT_FOUND);
		assert_eq!(json["error_code"], "NOT_FOUND");
	}

	let (status, _) = send(
		&app,
		request("PUT", &uri, Some("bob"), Some(serde_json::json!({ "title": "Stolen" }))),
	)
	.await;

	assert_eq!(status, StatusCode::NOT_FOUND);

	let (status, _) = send(&app, request("GET", &uri, Some("alice"), None)).await;

	assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn malformed_note_id_is_not_found() {
	let (status, json) =
		send(&memory_app(), request("GET", "/v1/notes/not-a-uuid", Some("alice"), None)).await;

	assert_eq!(status, StatusCode::NOT_FOUND);
	assert_eq!(json["error_code"], "NOT_FOUND");
}

#[tokio::test]
async fn create_validation_errors_are_bad_requests() {
	let app = memory_app();
	let (status, json) = send(
		&app,
		request("POST", "/v1/notes", Some("alice"), Some(serde_json::json!({ "title": "T" }))),
	)
	.await;

	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(json["error_code"], "INVALID_REQUEST");

	let malformed = Request::builder()
		.method("POST")
		.uri("/v1/notes")
		.header("X-Nota-User-Id", "alice")
		.header("content-type", "application/json")
		.body(Body::from("{not json"))
		.expect("Failed to build request.");
	let (status, json) = send(&app, malformed).await;

	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(json["error_code"], "INVALID_REQUEST");
}

#[tokio::test]
async fn update_and_delete_flow() {
	let app = memory_app();
	let created = create(&app, "alice", "Q3", "Plan the budget.", &["work"]).await;
	let uri = format!("/v1/notes/{}", created["note_id"].as_str().expect("note_id"));
	let (status, updated) = send(
		&app,
		request(
			"PUT",
			&uri,
			Some("alice"),
			Some(serde_json::json!({ "content": "Plan the offsite." })),
		),
	)
	.await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(updated["title"], "Q3");
	assert_eq!(updated["tags"], serde_json::json!(["work"]));
	assert_eq!(updated["suggested_tags"], serde_json::json!(["finance", "planning"]));

	let (status, deleted) = send(&app, request("DELETE", &uri, Some("alice"), None)).await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(deleted["deleted"], true);

	let (status, _) = send(&app, request("GET", &uri, Some("alice"), None)).await;

	assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn listing_parses_repeated_tags_and_lenient_paging() {
	let app = memory_app();

	create(&app, "alice", "Work", "Body.", &["work"]).await;
	create(&app, "alice", "Home", "Body.", &["home"]).await;
	create(&app, "alice", "Misc", "Body.", &["misc"]).await;

	let (status, json) = send(
		&app,
		request("GET", "/v1/notes?tags=work&tags=home&page=abc&limit=-2", Some("alice"), None),
	)
	.await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(json["data"].as_array().map(Vec::len), Some(2));
	assert_eq!(
		json["pagination"],
		serde_json::json!({ "page": 1, "limit": 10, "total": 2, "pages": 1 })
	);

	let (_, json) =
		send(&app, request("GET", "/v1/notes?limit=2&page=2", Some("alice"), None)).await;

	assert_eq!(json["data"].as_array().map(Vec::len), Some(1));
	assert_eq!(json["pagination"]["pages"], 2);
}

#[tokio::test]
async fn search_route_matches_text() {
	let app = memory_app();

	create(&app, "alice", "Q3", "Plan the budget.", &[]).await;
	create(&app, "alice", "Groceries", "Milk.", &[]).await;

	let (status, json) =
		send(&app, request("GET", "/v1/notes/search?query=budget", Some("alice"), None)).await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(json["data"].as_array().map(Vec::len), Some(1));
	assert_eq!(json["data"][0]["title"], "Q3");
}

#[tokio::test]
async fn suggest_tags_route_maps_errors() {
	let app = memory_app();
	let (status, json) = send(
		&app,
		request(
			"POST",
			"/v1/notes/suggest-tags",
			Some("alice"),
			Some(serde_json::json!({ "content": "Quarterly budget." })),
		),
	)
	.await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(json["suggested_tags"], serde_json::json!(["finance", "planning"]));

	let (status, json) = send(
		&app,
		request("POST", "/v1/notes/suggest-tags", Some("alice"), Some(serde_json::json!({}))),
	)
	.await;

	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(json["error_code"], "INVALID_REQUEST");

	let failing = memory_app_with(off_security(), Arc::new(FailingProvider));
	let (status, json) = send(
		&failing,
		request(
			"POST",
			"/v1/notes/suggest-tags",
			Some("alice"),
			Some(serde_json::json!({ "content": "Quarterly budget." })),
		),
	)
	.await;

	assert_eq!(status, StatusCode::BAD_GATEWAY);
	assert_eq!(json["error_code"], "ENRICHMENT_FAILED");

	// The write path degrades instead of failing.
	let created = create(&failing, "alice", "Q3", "Quarterly budget.", &[]).await;

	assert!(created["summary"].is_null());
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set NOTA_PG_DSN to run."]
async fn postgres_backed_create_and_search() {
	let Some(base_dsn) = nota_testkit::env_dsn() else {
		eprintln!("Skipping HTTP tests; set NOTA_PG_DSN to run this test.");

		return;
	};
	let test_db = TestDatabase::create(&base_dsn).await.expect("Failed to create test database.");
	let config = test_config(test_db.dsn(), off_security());
	let state = AppState::new(config).await.expect("Failed to initialize app state.");
	let app = routes::router(state);
	let (status, json) = send(&app, request("GET", "/health", None, None)).await;

	assert_eq!(status, StatusCode::OK, "unexpected body: {json}");

	// The default provider points at an unreachable address, so the summary degrades.
	let created = create(&app, "alice", "Q3", "Draft the quarterly budgets.", &["work"]).await;

	assert!(created["summary"].is_null());

	let (status, json) =
		send(&app, request("GET", "/v1/notes/search?query=budget&tags=work", Some("alice"), None))
			.await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(json["data"][0]["note_id"], created["note_id"]);
	assert_eq!(json["pagination"]["total"], 1);

	let (_, json) =
		send(&app, request("GET", "/v1/notes/search?query=budget", Some("bob"), None)).await;

	assert_eq!(json["pagination"]["total"], 0);

	let far_page = "/v1/notes?page=1000000000000000000&limit=10";
	let (status, json) = send(&app, request("GET", far_page, Some("alice"), None)).await;

	assert_eq!(status, StatusCode::OK, "unexpected body: {json}");
	assert_eq!(json["data"], Value::Array(Vec::new()));
	assert_eq!(json["pagination"]["total"], 1);

	test_db.teardown().await.expect("Failed to drop test database.");
}
