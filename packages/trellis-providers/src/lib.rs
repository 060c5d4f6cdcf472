pub mod blobstore;

use color_eyre::Result;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};

pub(crate) fn auth_headers(api_key: Option<&str>) -> Result<HeaderMap> {
	let mut headers = HeaderMap::new();

	if let Some(api_key) = api_key {
		headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {api_key}"))?);
	}

	Ok(headers)
}
