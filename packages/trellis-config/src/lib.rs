mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Blobstore, Config, Postgres, Service, Storage, Windows};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::Read { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::Toml { path: path.to_path_buf(), source: err })?;

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
	if cfg.service.admin_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.admin_bind must be non-empty.".to_string(),
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
	if cfg.blobstore.api_base.trim().is_empty() {
		return Err(Error::Validation {
			message: "blobstore.api_base must be non-empty.".to_string(),
		});
	}
	if cfg.blobstore.public_base.trim().is_empty() {
		return Err(Error::Validation {
			message: "blobstore.public_base must be non-empty.".to_string(),
		});
	}
	if cfg.blobstore.bucket.trim().is_empty() {
		return Err(Error::Validation { message: "blobstore.bucket must be non-empty.".to_string() });
	}
	if cfg.blobstore.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "blobstore.timeout_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.blobstore.max_upload_bytes == 0 {
		return Err(Error::Validation {
			message: "blobstore.max_upload_bytes must be greater than zero.".to_string(),
		});
	}
	if cfg.blobstore.allowed_types.is_empty() {
		return Err(Error::Validation {
			message: "blobstore.allowed_types must be non-empty.".to_string(),
		});
	}

	for (label, hours) in [
		("windows.seed_edit_hours", cfg.windows.seed_edit_hours),
		("windows.seed_cancel_lead_hours", cfg.windows.seed_cancel_lead_hours),
		("windows.memory_edit_hours", cfg.windows.memory_edit_hours),
	] {
		if hours <= 0 {
			return Err(Error::Validation {
				message: format!("{label} must be greater than zero."),
			});
		}
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if cfg.blobstore.api_key.as_deref().map(|key| key.trim().is_empty()).unwrap_or(false) {
		cfg.blobstore.api_key = None;
	}

	cfg.blobstore.api_base = cfg.blobstore.api_base.trim_end_matches('/').to_string();
	cfg.blobstore.public_base = cfg.blobstore.public_base.trim_end_matches('/').to_string();
}
