use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub providers: Providers,
	#[serde(default)]
	pub notes: Notes,
	pub security: Security,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	#[serde(default = "default_log_level")]
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
}

#[derive(Debug, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

#[derive(Debug, Deserialize)]
pub struct Providers {
	pub enrichment: LlmProviderConfig,
}

/// An OpenAI-compatible chat completion endpoint.
#[derive(Clone, Debug, Deserialize)]
pub struct LlmProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub temperature: f32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Notes {
	/// Page size used when a listing request carries no usable `limit`.
	pub default_page_limit: u32,
	/// Upper bound applied to caller-supplied `limit` values.
	pub max_page_limit: u32,
	/// Suggested tags beyond this count are dropped.
	pub max_suggested_tags: u32,
}
impl Default for Notes {
	fn default() -> Self {
		Self { default_page_limit: 10, max_page_limit: 100, max_suggested_tags: 5 }
	}
}

#[derive(Debug, Deserialize)]
pub struct Security {
	pub bind_localhost_only: bool,
	#[serde(default = "default_auth_mode")]
	pub auth_mode: String,
	#[serde(default)]
	pub auth_keys: Vec<SecurityAuthKey>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SecurityAuthKey {
	pub token_id: String,
	pub token: String,
	pub user_id: String,
}

fn default_log_level() -> String {
	"info".to_string()
}

fn default_auth_mode() -> String {
	"off".to_string()
}
