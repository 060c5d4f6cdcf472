use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Notification, NotificationKind, Result, TrellisService, materialize};
use trellis_domain::SeedStatus;
use trellis_storage::queries;

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RecordViewRequest {
	pub user_id: Uuid,
	pub seed_id: Uuid,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BloomOutcome {
	ViewRecorded,
	ConvertedToMemory,
	AlreadyConverted,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RecordViewResponse {
	pub outcome: BloomOutcome,
	pub view_count: i64,
	pub memory_id: Option<Uuid>,
}

impl TrellisService {
	/// The reveal-view path. Views are idempotent per member; the first view
	/// that brings the distinct-viewer count to two converges the seed into a
	/// memory. The row lock taken on the seed serializes racing viewers, so
	/// exactly one caller observes the conversion happen.
	pub async fn record_view(&self, req: RecordViewRequest) -> Result<RecordViewResponse> {
		let now = self.now();
		let membership = self.require_vault(req.user_id).await?;
		let mut tx = self.db.pool.begin().await?;
		let seed = queries::seed_in_vault_for_update(&mut *tx, req.seed_id, membership.vault_id)
			.await?
			.ok_or_else(|| Error::NotFound { message: "Seed not found.".to_string() })?;

		match crate::seed_status(&seed)? {
			SeedStatus::Cancelled => Err(Error::InvalidState {
				message: "Seed has been cancelled.".to_string(),
			}),
			SeedStatus::Bloomed => {
				let view_count = queries::count_seed_views(&mut *tx, seed.seed_id).await?;

				tx.commit().await?;

				Ok(RecordViewResponse {
					outcome: BloomOutcome::AlreadyConverted,
					view_count,
					memory_id: seed.memory_id,
				})
			},
			SeedStatus::Scheduled => {
				if now < seed.bloom_at {
					return Err(Error::NotReady {
						message: "Seed has not reached its reveal time.".to_string(),
					});
				}

				queries::record_seed_view(&mut *tx, seed.seed_id, req.user_id, now).await?;

				let view_count = queries::count_seed_views(&mut *tx, seed.seed_id).await?;

				if view_count < 2 {
					tx.commit().await?;

					return Ok(RecordViewResponse {
						outcome: BloomOutcome::ViewRecorded,
						view_count,
						memory_id: None,
					});
				}

				let memory =
					materialize::materialize_seed(&mut tx, &seed, now, self.memory_edit_window())
						.await?;

				tx.commit().await?;
				self.notify_bloomed(&seed.title, seed.vault_id, seed.created_by, memory.memory_id)
					.await;

				Ok(RecordViewResponse {
					outcome: BloomOutcome::ConvertedToMemory,
					view_count,
					memory_id: Some(memory.memory_id),
				})
			},
		}
	}

	async fn notify_bloomed(
		&self,
		seed_title: &str,
		vault_id: Uuid,
		created_by: Uuid,
		memory_id: Uuid,
	) {
		let mut recipients = vec![created_by];

		match queries::partner_of(&self.db.pool, vault_id, created_by).await {
			Ok(Some(partner)) => recipients.push(partner),
			Ok(None) => {},
			Err(err) => {
				tracing::warn!(error = %err, "Partner lookup for bloom notification failed.");
			},
		}

		for user_id in recipients {
			self.notify_best_effort(Notification {
				user_id,
				kind: NotificationKind::SeedBloomed,
				title: "A seed bloomed".to_string(),
				body: format!("\"{seed_title}\" bloomed into a shared memory."),
				reference_id: Some(memory_id),
			})
			.await;
		}
	}
}
