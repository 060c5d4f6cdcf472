use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, TrellisService};
use trellis_domain::{SeedStatus, windows};
use trellis_storage::queries;

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CancelSeedRequest {
	pub user_id: Uuid,
	pub seed_id: Uuid,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CancelSeedResponse {
	pub seed_id: Uuid,
	pub status: SeedStatus,
}

impl TrellisService {
	pub async fn cancel_seed(&self, req: CancelSeedRequest) -> Result<CancelSeedResponse> {
		let now = self.now();
		let membership = self.require_vault(req.user_id).await?;
		let mut tx = self.db.pool.begin().await?;
		let seed = queries::seed_in_vault_for_update(&mut *tx, req.seed_id, membership.vault_id)
			.await?
			.ok_or_else(|| Error::NotFound { message: "Seed not found.".to_string() })?;

		if seed.created_by != req.user_id {
			return Err(Error::Forbidden {
				message: "Only the seed's creator may cancel it.".to_string(),
			});
		}

		let cancelled = crate::seed_status(&seed)?.cancel()?;

		windows::seed_cancel_allowed(
			seed.created_at,
			seed.bloom_at,
			now,
			self.seed_edit_window(),
			self.seed_cancel_lead(),
		)?;

		queries::set_seed_status(&mut *tx, seed.seed_id, cancelled.as_str(), None).await?;
		tx.commit().await?;

		Ok(CancelSeedResponse { seed_id: seed.seed_id, status: cancelled })
	}
}
