use std::{collections::HashMap, sync::Arc};

use nota_config::{Config, Security};
use nota_service::NotaService;
use nota_storage::db::Db;

/// How a request's owner is established.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthState {
	/// The `X-Nota-User-Id` header is trusted as given.
	Off,
	/// Bearer token to owner id.
	StaticKeys { owners_by_token: HashMap<String, String> },
}
impl AuthState {
	pub fn from_security(security: &Security) -> Self {
		match security.auth_mode.as_str() {
			"static_keys" => Self::StaticKeys {
				owners_by_token: security
					.auth_keys
					.iter()
					.map(|key| (key.token.clone(), key.user_id.clone()))
					.collect(),
			},
			_ => Self::Off,
		}
	}
}

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<NotaService>,
	pub auth: Arc<AuthState>,
}
impl AppState {
	pub async fn new(config: Config) -> color_eyre::Result<Self> {
		let db = Db::connect(&config.storage.postgres).await?;

		db.ensure_schema().await?;

		Ok(Self::from_service(NotaService::new(config, Arc::new(db))))
	}

	/// Wraps an already constructed service, taking the auth policy from its configuration.
	pub fn from_service(service: NotaService) -> Self {
		let auth = AuthState::from_security(&service.cfg.security);

		Self { service: Arc::new(service), auth: Arc::new(auth) }
	}
}
