use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub blobstore: Blobstore,
	pub windows: Windows,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub admin_bind: String,
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
pub struct Blobstore {
	/// Storage gateway base, e.g. "https://storage.example.com/storage/v1".
	pub api_base: String,
	/// Public base used to build the URLs persisted alongside media rows.
	pub public_base: String,
	pub bucket: String,
	pub api_key: Option<String>,
	pub timeout_ms: u64,
	pub max_upload_bytes: u64,
	pub allowed_types: Vec<String>,
}

/// Time-boxed mutation windows shared by seeds, memories, and their media.
#[derive(Debug, Deserialize)]
pub struct Windows {
	/// Hours after creation during which a seed stays editable.
	pub seed_edit_hours: i64,
	/// Minimum hours before bloom that keep a grown seed cancellable.
	pub seed_cancel_lead_hours: i64,
	/// Hours after creation during which a memory stays editable.
	pub memory_edit_hours: i64,
}
