use std::time::Duration;

use color_eyre::Result;
use reqwest::{Client, header::CONTENT_TYPE};

/// Uploads an object to the storage gateway and returns the public URL that
/// gets persisted alongside the media row.
pub async fn upload(
	cfg: &trellis_config::Blobstore,
	path: &str,
	bytes: Vec<u8>,
	content_type: &str,
) -> Result<String> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;

	client
		.post(object_url(cfg, path))
		.headers(crate::auth_headers(cfg.api_key.as_deref())?)
		.header(CONTENT_TYPE, content_type)
		.body(bytes)
		.send()
		.await?
		.error_for_status()?;

	Ok(public_url(cfg, path))
}

pub async fn remove(cfg: &trellis_config::Blobstore, path: &str) -> Result<()> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;

	client
		.delete(object_url(cfg, path))
		.headers(crate::auth_headers(cfg.api_key.as_deref())?)
		.send()
		.await?
		.error_for_status()?;

	Ok(())
}

pub fn public_url(cfg: &trellis_config::Blobstore, path: &str) -> String {
	format!("{}/{}/{}", cfg.public_base, cfg.bucket, path.trim_start_matches('/'))
}

fn object_url(cfg: &trellis_config::Blobstore, path: &str) -> String {
	format!("{}/object/{}/{}", cfg.api_base, cfg.bucket, path.trim_start_matches('/'))
}
