use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{Result, TrellisService};
use trellis_domain::{SeedStatus, seed};
use trellis_storage::{models::Seed, queries};

const DEFAULT_PAGE_SIZE: i64 = 50;
const MAX_PAGE_SIZE: i64 = 200;

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ListSeedsRequest {
	pub user_id: Uuid,
	pub offset: Option<i64>,
	pub limit: Option<i64>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ListSeedsResponse {
	pub items: Vec<SeedItem>,
	pub total: i64,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ActiveSeedsRequest {
	pub user_id: Uuid,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ActiveSeedsResponse {
	pub items: Vec<SeedItem>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SeedSummaryRequest {
	pub user_id: Uuid,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SeedSummaryResponse {
	pub total: i64,
	pub growing: i64,
	pub ready: i64,
	pub bloomed: i64,
}

/// One seed as a given member sees it. `content` and `media` stay concealed
/// from the partner until the seed is ready or has bloomed; the creator always
/// sees their own seed in full.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SeedItem {
	pub seed_id: Uuid,
	pub created_by: Uuid,
	pub title: String,
	pub content: Option<String>,
	#[serde(with = "crate::time_serde")]
	pub bloom_at: OffsetDateTime,
	#[serde(with = "crate::time_serde")]
	pub created_at: OffsetDateTime,
	#[serde(with = "crate::time_serde::option")]
	pub edited_at: Option<OffsetDateTime>,
	pub status: SeedStatus,
	pub is_ready: bool,
	pub view_count: i64,
	pub memory_id: Option<Uuid>,
	pub media: Vec<MediaItem>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct MediaItem {
	pub media_id: Uuid,
	pub file_url: String,
	pub file_type: String,
	#[serde(with = "crate::time_serde")]
	pub uploaded_at: OffsetDateTime,
}

impl TrellisService {
	pub async fn list_seeds(&self, req: ListSeedsRequest) -> Result<ListSeedsResponse> {
		let membership = self.require_vault(req.user_id).await?;
		let (offset, limit) = page_bounds(req.offset, req.limit);
		let total = queries::count_seeds(&self.db.pool, membership.vault_id, None).await?;
		let seeds =
			queries::seed_page(&self.db.pool, membership.vault_id, None, offset, limit).await?;
		let items = self.seed_items(seeds, req.user_id).await?;

		Ok(ListSeedsResponse { items, total })
	}

	pub async fn list_my_seeds(&self, req: ListSeedsRequest) -> Result<ListSeedsResponse> {
		let membership = self.require_vault(req.user_id).await?;
		let (offset, limit) = page_bounds(req.offset, req.limit);
		let total =
			queries::count_seeds(&self.db.pool, membership.vault_id, Some(req.user_id)).await?;
		let seeds = queries::seed_page(
			&self.db.pool,
			membership.vault_id,
			Some(req.user_id),
			offset,
			limit,
		)
		.await?;
		let items = self.seed_items(seeds, req.user_id).await?;

		Ok(ListSeedsResponse { items, total })
	}

	/// Ready seeds for the member's vault. Runs a vault-scoped tick first, so
	/// the read path alone keeps readiness notifications flowing even without
	/// the sweeper.
	pub async fn list_active_seeds(&self, req: ActiveSeedsRequest) -> Result<ActiveSeedsResponse> {
		let membership = self.require_vault(req.user_id).await?;

		self.tick_scope(Some(membership.vault_id)).await?;

		let now = self.now();
		let seeds = queries::active_ready_seeds(&self.db.pool, membership.vault_id, now).await?;
		let items = self.seed_items(seeds, req.user_id).await?;

		Ok(ActiveSeedsResponse { items })
	}

	pub async fn seed_summary(&self, req: SeedSummaryRequest) -> Result<SeedSummaryResponse> {
		let membership = self.require_vault(req.user_id).await?;
		let now = self.now();
		let summary = queries::seed_summary(&self.db.pool, membership.vault_id, now).await?;

		Ok(SeedSummaryResponse {
			total: summary.total,
			growing: summary.growing,
			ready: summary.ready,
			bloomed: summary.bloomed,
		})
	}

	async fn seed_items(&self, seeds: Vec<Seed>, viewer: Uuid) -> Result<Vec<SeedItem>> {
		let now = self.now();
		let mut items = Vec::with_capacity(seeds.len());

		for seed in seeds {
			items.push(self.seed_item(seed, viewer, now).await?);
		}

		Ok(items)
	}

	pub(crate) async fn seed_item(
		&self,
		seed: Seed,
		viewer: Uuid,
		now: OffsetDateTime,
	) -> Result<SeedItem> {
		let status = crate::seed_status(&seed)?;
		let is_ready = seed::is_ready(status, seed.bloom_at, now);
		let revealed =
			seed.created_by == viewer || status == SeedStatus::Bloomed || is_ready;
		let view_count = queries::count_seed_views(&self.db.pool, seed.seed_id).await?;
		let media = if revealed {
			queries::seed_media_for(&self.db.pool, seed.seed_id)
				.await?
				.into_iter()
				.map(|media| MediaItem {
					media_id: media.media_id,
					file_url: media.file_url,
					file_type: media.file_type,
					uploaded_at: media.uploaded_at,
				})
				.collect()
		} else {
			Vec::new()
		};

		Ok(SeedItem {
			seed_id: seed.seed_id,
			created_by: seed.created_by,
			title: seed.title,
			content: revealed.then_some(seed.content),
			bloom_at: seed.bloom_at,
			created_at: seed.created_at,
			edited_at: seed.edited_at,
			status,
			is_ready,
			view_count,
			memory_id: seed.memory_id,
			media,
		})
	}
}

fn page_bounds(offset: Option<i64>, limit: Option<i64>) -> (i64, i64) {
	let offset = offset.unwrap_or(0).max(0);
	let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);

	(offset, limit)
}
