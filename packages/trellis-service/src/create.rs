use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{Error, Notification, NotificationKind, Result, TrellisService};
use trellis_domain::SeedStatus;
use trellis_storage::{models::Seed, queries};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CreateSeedRequest {
	pub user_id: Uuid,
	pub title: String,
	pub content: String,
	#[serde(with = "crate::time_serde")]
	pub bloom_at: OffsetDateTime,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CreateSeedResponse {
	pub seed_id: Uuid,
	pub status: SeedStatus,
	#[serde(with = "crate::time_serde")]
	pub bloom_at: OffsetDateTime,
	#[serde(with = "crate::time_serde")]
	pub created_at: OffsetDateTime,
}

impl TrellisService {
	pub async fn create_seed(&self, req: CreateSeedRequest) -> Result<CreateSeedResponse> {
		let now = self.now();
		let title = req.title.trim();
		let content = req.content.trim();

		if title.is_empty() || content.is_empty() {
			return Err(Error::InvalidRequest {
				message: "title and content are required.".to_string(),
			});
		}
		if req.bloom_at <= now {
			return Err(Error::InvalidRequest {
				message: "bloom_at must be in the future.".to_string(),
			});
		}

		let membership = self.require_vault(req.user_id).await?;
		let seed = Seed {
			seed_id: Uuid::new_v4(),
			vault_id: membership.vault_id,
			created_by: req.user_id,
			title: title.to_string(),
			content: content.to_string(),
			bloom_at: req.bloom_at,
			created_at: now,
			edited_at: None,
			status: SeedStatus::Scheduled.as_str().to_string(),
			bloom_notified: false,
			memory_id: None,
		};

		queries::insert_seed(&self.db.pool, &seed).await?;

		// The partner learns a seed exists, never what it holds.
		if let Some(partner) =
			queries::partner_of(&self.db.pool, membership.vault_id, req.user_id).await?
		{
			self.notify_best_effort(Notification {
				user_id: partner,
				kind: NotificationKind::SeedPlanted,
				title: "A seed was planted".to_string(),
				body: "Your partner planted a seed in your vault.".to_string(),
				reference_id: Some(seed.seed_id),
			})
			.await;
		}

		Ok(CreateSeedResponse {
			seed_id: seed.seed_id,
			status: SeedStatus::Scheduled,
			bloom_at: seed.bloom_at,
			created_at: seed.created_at,
		})
	}
}
