mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, LlmProviderConfig, Notes, Postgres, Providers, Security, SecurityAuthKey, Service,
	Storage,
};

use std::{collections::HashSet, fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;
	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.dsn.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.postgres.dsn must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		});
	}

	validate_enrichment_provider(&cfg.providers.enrichment)?;

	if cfg.notes.default_page_limit == 0 {
		return Err(Error::Validation {
			message: "notes.default_page_limit must be greater than zero.".to_string(),
		});
	}
	if cfg.notes.max_page_limit == 0 {
		return Err(Error::Validation {
			message: "notes.max_page_limit must be greater than zero.".to_string(),
		});
	}
	if cfg.notes.default_page_limit > cfg.notes.max_page_limit {
		return Err(Error::Validation {
			message: "notes.default_page_limit must not exceed notes.max_page_limit.".to_string(),
		});
	}
	if cfg.notes.max_suggested_tags == 0 {
		return Err(Error::Validation {
			message: "notes.max_suggested_tags must be greater than zero.".to_string(),
		});
	}

	validate_security(&cfg.security)
}

fn validate_enrichment_provider(provider: &LlmProviderConfig) -> Result<()> {
	for (label, value) in [
		("provider_id", &provider.provider_id),
		("api_base", &provider.api_base),
		("api_key", &provider.api_key),
		("model", &provider.model),
	] {
		if value.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("providers.enrichment.{label} must be non-empty."),
			});
		}
	}

	if provider.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "providers.enrichment.timeout_ms must be greater than zero.".to_string(),
		});
	}
	if !provider.temperature.is_finite() {
		return Err(Error::Validation {
			message: "providers.enrichment.temperature must be a finite number.".to_string(),
		});
	}
	if provider.temperature < 0.0 {
		return Err(Error::Validation {
			message: "providers.enrichment.temperature must be zero or greater.".to_string(),
		});
	}
	if provider.default_headers.values().any(|value| !value.is_string()) {
		return Err(Error::Validation {
			message: "providers.enrichment.default_headers values must be strings.".to_string(),
		});
	}

	Ok(())
}

fn validate_security(security: &Security) -> Result<()> {
	match security.auth_mode.as_str() {
		"off" => Ok(()),
		"static_keys" => {
			if security.auth_keys.is_empty() {
				return Err(Error::Validation {
					message: "security.auth_keys must be non-empty when security.auth_mode=static_keys."
						.to_string(),
				});
			}

			let mut token_ids = HashSet::new();

			for key in &security.auth_keys {
				for (label, value) in
					[("token_id", &key.token_id), ("token", &key.token), ("user_id", &key.user_id)]
				{
					if value.trim().is_empty() {
						return Err(Error::Validation {
							message: format!("security.auth_keys.{label} must be non-empty."),
						});
					}
				}

				if !token_ids.insert(key.token_id.as_str()) {
					return Err(Error::Validation {
						message: "token_id must be unique across security.auth_keys.".to_string(),
					});
				}
			}

			Ok(())
		},
		other => Err(Error::Validation {
			message: format!("security.auth_mode must be one of off or static_keys, got {other}."),
		}),
	}
}

fn normalize(cfg: &mut Config) {
	cfg.security.auth_mode = cfg.security.auth_mode.trim().to_ascii_lowercase();

	if cfg.service.log_level.trim().is_empty() {
		cfg.service.log_level = "info".to_string();
	}

	let api_base = cfg.providers.enrichment.api_base.trim_end_matches('/').to_string();

	cfg.providers.enrichment.api_base = api_base;
}
