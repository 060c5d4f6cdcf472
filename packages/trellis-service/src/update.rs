use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{Error, Result, TrellisService};
use trellis_domain::{SeedStatus, windows};
use trellis_storage::queries;

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct UpdateSeedRequest {
	pub user_id: Uuid,
	pub seed_id: Uuid,
	pub title: Option<String>,
	pub content: Option<String>,
	#[serde(default, with = "crate::time_serde::option")]
	pub bloom_at: Option<OffsetDateTime>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct UpdateSeedResponse {
	pub seed_id: Uuid,
	#[serde(with = "crate::time_serde")]
	pub bloom_at: OffsetDateTime,
	#[serde(with = "crate::time_serde::option")]
	pub edited_at: Option<OffsetDateTime>,
}

impl TrellisService {
	pub async fn update_seed(&self, req: UpdateSeedRequest) -> Result<UpdateSeedResponse> {
		let now = self.now();

		if req.title.is_none() && req.content.is_none() && req.bloom_at.is_none() {
			return Err(Error::InvalidRequest { message: "No updates provided.".to_string() });
		}
		if let Some(title) = req.title.as_ref()
			&& title.trim().is_empty()
		{
			return Err(Error::InvalidRequest {
				message: "title must not be empty when provided.".to_string(),
			});
		}
		if let Some(content) = req.content.as_ref()
			&& content.trim().is_empty()
		{
			return Err(Error::InvalidRequest {
				message: "content must not be empty when provided.".to_string(),
			});
		}

		let membership = self.require_vault(req.user_id).await?;
		let mut tx = self.db.pool.begin().await?;
		let mut seed =
			queries::seed_in_vault_for_update(&mut *tx, req.seed_id, membership.vault_id)
				.await?
				.ok_or_else(|| Error::NotFound { message: "Seed not found.".to_string() })?;

		if seed.created_by != req.user_id {
			return Err(Error::Forbidden {
				message: "Only the seed's creator may edit it.".to_string(),
			});
		}

		let status = crate::seed_status(&seed)?;

		if status != SeedStatus::Scheduled {
			return Err(Error::InvalidState {
				message: format!("Seed is {status} and can no longer be edited."),
			});
		}

		windows::seed_edit_allowed(seed.created_at, seed.bloom_at, now, self.seed_edit_window())?;

		if let Some(bloom_at) = req.bloom_at {
			if bloom_at <= now {
				return Err(Error::InvalidRequest {
					message: "bloom_at must be in the future.".to_string(),
				});
			}

			seed.bloom_at = bloom_at;
		}
		if let Some(title) = req.title {
			seed.title = title.trim().to_string();
		}
		if let Some(content) = req.content {
			seed.content = content.trim().to_string();
		}

		seed.edited_at = Some(now);

		queries::update_seed_fields(&mut *tx, &seed).await?;
		tx.commit().await?;

		Ok(UpdateSeedResponse {
			seed_id: seed.seed_id,
			bloom_at: seed.bloom_at,
			edited_at: seed.edited_at,
		})
	}
}
