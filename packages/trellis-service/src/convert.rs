use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Notification, NotificationKind, Result, TrellisService};
use trellis_storage::{models::Memory, queries};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ConvertJournalRequest {
	pub user_id: Uuid,
	pub journal_id: Uuid,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ConvertJournalResponse {
	pub journal_id: Uuid,
	pub memory_id: Uuid,
}

impl TrellisService {
	/// Promotes a private journal entry into a shared memory. One-way and
	/// once-only: the journal keeps a pointer to the memory and can never be
	/// converted again.
	pub async fn convert_journal(
		&self,
		req: ConvertJournalRequest,
	) -> Result<ConvertJournalResponse> {
		let now = self.now();
		let membership = self.require_vault(req.user_id).await?;
		let mut tx = self.db.pool.begin().await?;
		let journal = queries::journal_for_update(&mut *tx, req.journal_id)
			.await?
			.ok_or_else(|| Error::NotFound { message: "Journal not found.".to_string() })?;

		if journal.user_id != req.user_id {
			return Err(Error::Forbidden {
				message: "Only the journal's author may convert it.".to_string(),
			});
		}
		if journal.status != "active" {
			return Err(Error::InvalidState {
				message: "Journal has already been converted.".to_string(),
			});
		}
		if journal.vault_id != Some(membership.vault_id) {
			return Err(Error::InvalidState {
				message: "Journal is not linked to your vault.".to_string(),
			});
		}

		let memory = Memory {
			memory_id: Uuid::new_v4(),
			vault_id: membership.vault_id,
			created_by: req.user_id,
			title: journal.title.clone(),
			content: journal.content.clone(),
			memory_date: Some(journal.created_at),
			is_seed: false,
			created_at: now,
			edited_at: None,
			editable_until: now + self.memory_edit_window(),
			is_deleted: false,
		};

		queries::insert_memory(&mut *tx, &memory).await?;
		queries::mark_journal_converted(&mut *tx, journal.journal_id, memory.memory_id).await?;
		tx.commit().await?;

		if let Some(partner) =
			queries::partner_of(&self.db.pool, membership.vault_id, req.user_id).await?
		{
			self.notify_best_effort(Notification {
				user_id: partner,
				kind: NotificationKind::JournalConverted,
				title: "A journal entry was shared".to_string(),
				body: format!("\"{}\" is now a shared memory.", memory.title),
				reference_id: Some(memory.memory_id),
			})
			.await;
		}

		Ok(ConvertJournalResponse { journal_id: journal.journal_id, memory_id: memory.memory_id })
	}
}
