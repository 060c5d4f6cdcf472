use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{Error, Result, TrellisService};
use trellis_domain::{SeedStatus, windows};
use trellis_storage::{models::SeedMedia, queries};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct UploadSeedMediaRequest {
	pub user_id: Uuid,
	pub seed_id: Uuid,
	pub content_type: String,
	pub bytes: Vec<u8>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct UploadSeedMediaResponse {
	pub media_id: Uuid,
	pub file_url: String,
	pub file_type: String,
	#[serde(with = "crate::time_serde")]
	pub uploaded_at: OffsetDateTime,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct DeleteSeedMediaRequest {
	pub user_id: Uuid,
	pub media_id: Uuid,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct DeleteSeedMediaResponse {
	pub media_id: Uuid,
}

impl TrellisService {
	pub async fn upload_seed_media(
		&self,
		req: UploadSeedMediaRequest,
	) -> Result<UploadSeedMediaResponse> {
		let now = self.now();

		validate_upload(&self.cfg.blobstore, &req.content_type, req.bytes.len() as u64)?;

		let membership = self.require_vault(req.user_id).await?;
		// The row lock keeps the status check and the insert atomic against a
		// concurrent bloom, which snapshots the media it sees into the memory.
		let mut tx = self.db.pool.begin().await?;
		let seed = queries::seed_in_vault_for_update(&mut *tx, req.seed_id, membership.vault_id)
			.await?
			.ok_or_else(|| Error::NotFound { message: "Seed not found.".to_string() })?;

		if seed.created_by != req.user_id {
			return Err(Error::Forbidden {
				message: "Only the seed's creator may attach media.".to_string(),
			});
		}
		if crate::seed_status(&seed)? != SeedStatus::Scheduled {
			return Err(Error::InvalidState {
				message: "Media can only be attached to a scheduled seed.".to_string(),
			});
		}

		windows::seed_media_allowed(seed.created_at, now, self.seed_edit_window())?;

		let media_id = Uuid::new_v4();
		let path = format!(
			"seeds/{}/{}.{}",
			seed.seed_id,
			media_id,
			extension_for(&req.content_type)?
		);
		let file_url = self
			.collaborators
			.blobs
			.upload(&self.cfg.blobstore, &path, req.bytes, &req.content_type)
			.await?;
		let media = SeedMedia {
			media_id,
			seed_id: seed.seed_id,
			file_path: path,
			file_url,
			file_type: req.content_type,
			uploaded_at: now,
		};

		queries::insert_seed_media(&mut *tx, &media).await?;

		tx.commit().await?;

		Ok(UploadSeedMediaResponse {
			media_id: media.media_id,
			file_url: media.file_url,
			file_type: media.file_type,
			uploaded_at: media.uploaded_at,
		})
	}

	pub async fn delete_seed_media(
		&self,
		req: DeleteSeedMediaRequest,
	) -> Result<DeleteSeedMediaResponse> {
		let now = self.now();
		let membership = self.require_vault(req.user_id).await?;
		let media = queries::load_seed_media(&self.db.pool, req.media_id)
			.await?
			.ok_or_else(|| Error::NotFound { message: "Media not found.".to_string() })?;
		let seed = queries::seed_in_vault(&self.db.pool, media.seed_id, membership.vault_id)
			.await?
			.ok_or_else(|| Error::NotFound { message: "Media not found.".to_string() })?;

		if seed.created_by != req.user_id {
			return Err(Error::Forbidden {
				message: "Only the seed's creator may remove media.".to_string(),
			});
		}
		if crate::seed_status(&seed)? != SeedStatus::Scheduled {
			return Err(Error::InvalidState {
				message: "Media can only be removed from a scheduled seed.".to_string(),
			});
		}

		windows::seed_media_allowed(seed.created_at, now, self.seed_edit_window())?;

		queries::delete_seed_media(&self.db.pool, media.media_id).await?;

		// The row is gone either way; a stranded blob only wastes space.
		if let Err(err) =
			self.collaborators.blobs.remove(&self.cfg.blobstore, &media.file_path).await
		{
			tracing::warn!(path = media.file_path, error = %err, "Blob removal failed.");
		}

		Ok(DeleteSeedMediaResponse { media_id: media.media_id })
	}
}

pub(crate) fn validate_upload(
	cfg: &trellis_config::Blobstore,
	content_type: &str,
	size: u64,
) -> Result<()> {
	if !cfg.allowed_types.iter().any(|allowed| allowed == content_type) {
		return Err(Error::InvalidRequest {
			message: format!("Content type {content_type:?} is not allowed."),
		});
	}
	if size == 0 {
		return Err(Error::InvalidRequest { message: "Upload is empty.".to_string() });
	}
	if size > cfg.max_upload_bytes {
		return Err(Error::InvalidRequest {
			message: format!("Upload exceeds the {} byte limit.", cfg.max_upload_bytes),
		});
	}

	Ok(())
}

pub(crate) fn extension_for(content_type: &str) -> Result<&'static str> {
	match content_type {
		"image/png" => Ok("png"),
		"image/jpeg" => Ok("jpg"),
		"image/gif" => Ok("gif"),
		"image/webp" => Ok("webp"),
		"video/mp4" => Ok("mp4"),
		"audio/mpeg" => Ok("mp3"),
		_ => Err(Error::InvalidRequest {
			message: format!("Content type {content_type:?} is not allowed."),
		}),
	}
}
