use sqlx::{Postgres, Transaction};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::Result;
use trellis_domain::SeedStatus;
use trellis_storage::{
	models::{Memory, MemoryMedia, Seed},
	queries,
};

/// Snapshots a seed into a memory inside the caller's transaction: the memory
/// row, a copy of every media row, and the seed's transition to `bloomed` all
/// land atomically or not at all.
pub(crate) async fn materialize_seed(
	tx: &mut Transaction<'_, Postgres>,
	seed: &Seed,
	now: OffsetDateTime,
	editable_for: Duration,
) -> Result<Memory> {
	let memory = Memory {
		memory_id: Uuid::new_v4(),
		vault_id: seed.vault_id,
		created_by: seed.created_by,
		title: seed.title.clone(),
		content: seed.content.clone(),
		memory_date: Some(seed.bloom_at),
		is_seed: true,
		created_at: now,
		edited_at: None,
		editable_until: now + editable_for,
		is_deleted: false,
	};

	queries::insert_memory(&mut **tx, &memory).await?;

	// Media copies keep the original storage paths; the blobs themselves are
	// shared, not duplicated.
	for media in queries::seed_media_for(&mut **tx, seed.seed_id).await? {
		let copy = MemoryMedia {
			media_id: Uuid::new_v4(),
			memory_id: memory.memory_id,
			file_path: media.file_path,
			file_url: media.file_url,
			file_type: media.file_type,
			uploaded_at: media.uploaded_at,
		};

		queries::insert_memory_media(&mut **tx, &copy).await?;
	}

	queries::set_seed_status(
		&mut **tx,
		seed.seed_id,
		SeedStatus::Bloomed.as_str(),
		Some(memory.memory_id),
	)
	.await?;

	Ok(memory)
}
