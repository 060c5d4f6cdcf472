use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Notification, NotificationKind, Result, TrellisService};
use trellis_storage::queries;

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct TickReport {
	pub notified: usize,
}

impl TrellisService {
	/// Sweeps every vault for seeds that crossed their reveal time and emits
	/// the readiness notification for each. The `bloom_notified` flag is
	/// claimed atomically, so concurrent ticks never notify a seed twice.
	pub async fn tick(&self) -> Result<TickReport> {
		self.tick_scope(None).await
	}

	pub(crate) async fn tick_scope(&self, vault_id: Option<Uuid>) -> Result<TickReport> {
		let now = self.now();
		let claimed = queries::claim_ready_seeds(&self.db.pool, now, vault_id).await?;
		let notified = claimed.len();

		for seed in claimed {
			self.notify_best_effort(Notification {
				user_id: seed.created_by,
				kind: NotificationKind::SeedReady,
				title: "Your seed is ready".to_string(),
				body: format!("\"{}\" has reached its reveal time.", seed.title),
				reference_id: Some(seed.seed_id),
			})
			.await;
		}

		Ok(TickReport { notified })
	}
}
