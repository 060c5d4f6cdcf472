use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, SeedItem, TrellisService};
use trellis_storage::queries;

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SeedDetailRequest {
	pub user_id: Uuid,
	pub seed_id: Uuid,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SeedDetailResponse {
	pub seed: SeedItem,
	pub has_viewed: bool,
}

impl TrellisService {
	pub async fn seed_detail(&self, req: SeedDetailRequest) -> Result<SeedDetailResponse> {
		let membership = self.require_vault(req.user_id).await?;
		let seed = queries::seed_in_vault(&self.db.pool, req.seed_id, membership.vault_id)
			.await?
			.ok_or_else(|| Error::NotFound { message: "Seed not found.".to_string() })?;
		let has_viewed = queries::seed_views_for(&self.db.pool, seed.seed_id)
			.await?
			.iter()
			.any(|view| view.user_id == req.user_id);
		let seed = self.seed_item(seed, req.user_id, self.now()).await?;

		Ok(SeedDetailResponse { seed, has_viewed })
	}
}
