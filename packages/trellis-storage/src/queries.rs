use sqlx::{PgExecutor, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
	Error, Result,
	db::Db,
	models::{
		Journal, Memory, MemoryMedia, ReadySeed, Seed, SeedMedia, SeedSummaryRow, SeedView,
		VaultMembership,
	},
};

// Vault memberships

pub async fn active_membership(
	executor: impl PgExecutor<'_>,
	user_id: Uuid,
) -> Result<Option<VaultMembership>> {
	let membership = sqlx::query_as::<_, VaultMembership>(
		"\
SELECT *
FROM vault_memberships
WHERE user_id = $1 AND left_at IS NULL",
	)
	.bind(user_id)
	.fetch_optional(executor)
	.await?;

	Ok(membership)
}

pub async fn partner_of(
	executor: impl PgExecutor<'_>,
	vault_id: Uuid,
	excluding: Uuid,
) -> Result<Option<Uuid>> {
	let partner = sqlx::query_scalar::<_, Uuid>(
		"\
SELECT user_id
FROM vault_memberships
WHERE vault_id = $1 AND user_id <> $2 AND left_at IS NULL
LIMIT 1",
	)
	.bind(vault_id)
	.bind(excluding)
	.fetch_optional(executor)
	.await?;

	Ok(partner)
}

/// Inserts an active membership, enforcing the two-member invariant.
///
/// Row locks on existing memberships cannot see rows a concurrent join
/// commits after this statement's snapshot, so joins serialize on a
/// per-vault advisory lock instead; the count below is then authoritative.
pub async fn insert_membership(
	db: &Db,
	vault_id: Uuid,
	user_id: Uuid,
	now: OffsetDateTime,
) -> Result<VaultMembership> {
	let mut tx = db.pool.begin().await?;

	sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
		.bind(vault_id.to_string())
		.execute(&mut *tx)
		.await?;

	let active: i64 = sqlx::query_scalar(
		"\
SELECT COUNT(*)
FROM vault_memberships
WHERE vault_id = $1 AND left_at IS NULL",
	)
	.bind(vault_id)
	.fetch_one(&mut *tx)
	.await?;

	if active >= 2 {
		return Err(Error::Conflict("Vault already has two active members.".to_string()));
	}

	let membership = VaultMembership {
		membership_id: Uuid::new_v4(),
		vault_id,
		user_id,
		joined_at: now,
		left_at: None,
	};

	sqlx::query(
		"\
INSERT INTO vault_memberships (membership_id, vault_id, user_id, joined_at, left_at)
VALUES ($1, $2, $3, $4, $5)",
	)
	.bind(membership.membership_id)
	.bind(membership.vault_id)
	.bind(membership.user_id)
	.bind(membership.joined_at)
	.bind(membership.left_at)
	.execute(&mut *tx)
	.await?;

	tx.commit().await?;

	Ok(membership)
}

// Seeds

pub async fn insert_seed(executor: impl PgExecutor<'_>, seed: &Seed) -> Result<()> {
	sqlx::query(
		"\
INSERT INTO seeds (
	seed_id,
	vault_id,
	created_by,
	title,
	content,
	bloom_at,
	created_at,
	edited_at,
	status,
	bloom_notified,
	memory_id
)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
	)
	.bind(seed.seed_id)
	.bind(seed.vault_id)
	.bind(seed.created_by)
	.bind(seed.title.as_str())
	.bind(seed.content.as_str())
	.bind(seed.bloom_at)
	.bind(seed.created_at)
	.bind(seed.edited_at)
	.bind(seed.status.as_str())
	.bind(seed.bloom_notified)
	.bind(seed.memory_id)
	.execute(executor)
	.await?;

	Ok(())
}

pub async fn seed_in_vault(
	executor: impl PgExecutor<'_>,
	seed_id: Uuid,
	vault_id: Uuid,
) -> Result<Option<Seed>> {
	let seed = sqlx::query_as::<_, Seed>(
		"\
SELECT *
FROM seeds
WHERE seed_id = $1 AND vault_id = $2",
	)
	.bind(seed_id)
	.bind(vault_id)
	.fetch_optional(executor)
	.await?;

	Ok(seed)
}

/// Row-locked load; serializes every mutation of one seed, including the
/// convergence check in the bloom path.
pub async fn seed_in_vault_for_update(
	executor: impl PgExecutor<'_>,
	seed_id: Uuid,
	vault_id: Uuid,
) -> Result<Option<Seed>> {
	let seed = sqlx::query_as::<_, Seed>(
		"\
SELECT *
FROM seeds
WHERE seed_id = $1 AND vault_id = $2
FOR UPDATE",
	)
	.bind(seed_id)
	.bind(vault_id)
	.fetch_optional(executor)
	.await?;

	Ok(seed)
}

pub async fn update_seed_fields(executor: impl PgExecutor<'_>, seed: &Seed) -> Result<()> {
	sqlx::query(
		"\
UPDATE seeds
SET
	title = $1,
	content = $2,
	bloom_at = $3,
	edited_at = $4
WHERE seed_id = $5",
	)
	.bind(seed.title.as_str())
	.bind(seed.content.as_str())
	.bind(seed.bloom_at)
	.bind(seed.edited_at)
	.bind(seed.seed_id)
	.execute(executor)
	.await?;

	Ok(())
}

pub async fn set_seed_status(
	executor: impl PgExecutor<'_>,
	seed_id: Uuid,
	status: &str,
	memory_id: Option<Uuid>,
) -> Result<()> {
	sqlx::query(
		"\
UPDATE seeds
SET status = $1, memory_id = COALESCE($2, memory_id)
WHERE seed_id = $3",
	)
	.bind(status)
	.bind(memory_id)
	.bind(seed_id)
	.execute(executor)
	.await?;

	Ok(())
}

/// Idempotent view upsert; returns how many rows were actually inserted.
pub async fn record_seed_view(
	executor: impl PgExecutor<'_>,
	seed_id: Uuid,
	user_id: Uuid,
	now: OffsetDateTime,
) -> Result<u64> {
	let result = sqlx::query(
		"\
INSERT INTO seed_views (view_id, seed_id, user_id, viewed_at)
VALUES ($1, $2, $3, $4)
ON CONFLICT (seed_id, user_id) DO NOTHING",
	)
	.bind(Uuid::new_v4())
	.bind(seed_id)
	.bind(user_id)
	.bind(now)
	.execute(executor)
	.await?;

	Ok(result.rows_affected())
}

/// Distinct-viewer count; the (seed, user) uniqueness constraint makes a
/// plain count equivalent.
pub async fn count_seed_views(executor: impl PgExecutor<'_>, seed_id: Uuid) -> Result<i64> {
	let count =
		sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM seed_views WHERE seed_id = $1")
			.bind(seed_id)
			.fetch_one(executor)
			.await?;

	Ok(count)
}

pub async fn seed_views_for(executor: impl PgExecutor<'_>, seed_id: Uuid) -> Result<Vec<SeedView>> {
	let views = sqlx::query_as::<_, SeedView>("SELECT * FROM seed_views WHERE seed_id = $1")
		.bind(seed_id)
		.fetch_all(executor)
		.await?;

	Ok(views)
}

/// Atomically flips `bloom_notified` for every ready, unnotified seed and
/// returns the claimed rows. The flag acts as the at-most-once guard for the
/// readiness notification.
pub async fn claim_ready_seeds(
	executor: impl PgExecutor<'_>,
	now: OffsetDateTime,
	vault_id: Option<Uuid>,
) -> Result<Vec<ReadySeed>> {
	let mut builder = QueryBuilder::new(
		"UPDATE seeds SET bloom_notified = TRUE \
		 WHERE status = 'scheduled' AND bloom_notified = FALSE AND bloom_at <= ",
	);

	builder.push_bind(now);

	if let Some(vault_id) = vault_id {
		builder.push(" AND vault_id = ");
		builder.push_bind(vault_id);
	}

	builder.push(" RETURNING seed_id, created_by, title");

	let claimed = builder.build_query_as::<ReadySeed>().fetch_all(executor).await?;

	Ok(claimed)
}

pub async fn active_ready_seeds(
	executor: impl PgExecutor<'_>,
	vault_id: Uuid,
	now: OffsetDateTime,
) -> Result<Vec<Seed>> {
	let seeds = sqlx::query_as::<_, Seed>(
		"\
SELECT *
FROM seeds
WHERE vault_id = $1 AND status = 'scheduled' AND bloom_at <= $2
ORDER BY bloom_at ASC",
	)
	.bind(vault_id)
	.bind(now)
	.fetch_all(executor)
	.await?;

	Ok(seeds)
}

pub async fn seed_page(
	executor: impl PgExecutor<'_>,
	vault_id: Uuid,
	created_by: Option<Uuid>,
	offset: i64,
	limit: i64,
) -> Result<Vec<Seed>> {
	let mut builder = QueryBuilder::new("SELECT * FROM seeds WHERE vault_id = ");

	builder.push_bind(vault_id);

	if let Some(created_by) = created_by {
		builder.push(" AND created_by = ");
		builder.push_bind(created_by);
	}

	builder.push(" ORDER BY created_at DESC OFFSET ");
	builder.push_bind(offset);
	builder.push(" LIMIT ");
	builder.push_bind(limit);

	let seeds = builder.build_query_as::<Seed>().fetch_all(executor).await?;

	Ok(seeds)
}

pub async fn count_seeds(
	executor: impl PgExecutor<'_>,
	vault_id: Uuid,
	created_by: Option<Uuid>,
) -> Result<i64> {
	let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM seeds WHERE vault_id = ");

	builder.push_bind(vault_id);

	if let Some(created_by) = created_by {
		builder.push(" AND created_by = ");
		builder.push_bind(created_by);
	}

	let count = builder.build_query_scalar::<i64>().fetch_one(executor).await?;

	Ok(count)
}

pub async fn seed_summary(
	executor: impl PgExecutor<'_>,
	vault_id: Uuid,
	now: OffsetDateTime,
) -> Result<SeedSummaryRow> {
	let summary = sqlx::query_as::<_, SeedSummaryRow>(
		"\
SELECT
	COUNT(*) FILTER (WHERE status <> 'cancelled') AS total,
	COUNT(*) FILTER (WHERE status = 'scheduled' AND bloom_at > $2) AS growing,
	COUNT(*) FILTER (WHERE status = 'scheduled' AND bloom_at <= $2) AS ready,
	COUNT(*) FILTER (WHERE status = 'bloomed') AS bloomed
FROM seeds
WHERE vault_id = $1",
	)
	.bind(vault_id)
	.bind(now)
	.fetch_one(executor)
	.await?;

	Ok(summary)
}

// Seed media

pub async fn insert_seed_media(executor: impl PgExecutor<'_>, media: &SeedMedia) -> Result<()> {
	sqlx::query(
		"\
INSERT INTO seed_media (media_id, seed_id, file_path, file_url, file_type, uploaded_at)
VALUES ($1, $2, $3, $4, $5, $6)",
	)
	.bind(media.media_id)
	.bind(media.seed_id)
	.bind(media.file_path.as_str())
	.bind(media.file_url.as_str())
	.bind(media.file_type.as_str())
	.bind(media.uploaded_at)
	.execute(executor)
	.await?;

	Ok(())
}

pub async fn seed_media_for(
	executor: impl PgExecutor<'_>,
	seed_id: Uuid,
) -> Result<Vec<SeedMedia>> {
	let media = sqlx::query_as::<_, SeedMedia>(
		"SELECT * FROM seed_media WHERE seed_id = $1 ORDER BY uploaded_at ASC",
	)
	.bind(seed_id)
	.fetch_all(executor)
	.await?;

	Ok(media)
}

pub async fn load_seed_media(
	executor: impl PgExecutor<'_>,
	media_id: Uuid,
) -> Result<Option<SeedMedia>> {
	let media = sqlx::query_as::<_, SeedMedia>("SELECT * FROM seed_media WHERE media_id = $1")
		.bind(media_id)
		.fetch_optional(executor)
		.await?;

	Ok(media)
}

pub async fn delete_seed_media(executor: impl PgExecutor<'_>, media_id: Uuid) -> Result<()> {
	sqlx::query("DELETE FROM seed_media WHERE media_id = $1")
		.bind(media_id)
		.execute(executor)
		.await?;

	Ok(())
}

// Memories

pub async fn insert_memory(executor: impl PgExecutor<'_>, memory: &Memory) -> Result<()> {
	sqlx::query(
		"\
INSERT INTO memories (
	memory_id,
	vault_id,
	created_by,
	title,
	content,
	memory_date,
	is_seed,
	created_at,
	edited_at,
	editable_until,
	is_deleted
)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
	)
	.bind(memory.memory_id)
	.bind(memory.vault_id)
	.bind(memory.created_by)
	.bind(memory.title.as_str())
	.bind(memory.content.as_str())
	.bind(memory.memory_date)
	.bind(memory.is_seed)
	.bind(memory.created_at)
	.bind(memory.edited_at)
	.bind(memory.editable_until)
	.bind(memory.is_deleted)
	.execute(executor)
	.await?;

	Ok(())
}

pub async fn memory_in_vault(
	executor: impl PgExecutor<'_>,
	memory_id: Uuid,
	vault_id: Uuid,
) -> Result<Option<Memory>> {
	let memory = sqlx::query_as::<_, Memory>(
		"\
SELECT *
FROM memories
WHERE memory_id = $1 AND vault_id = $2 AND is_deleted = FALSE",
	)
	.bind(memory_id)
	.bind(vault_id)
	.fetch_optional(executor)
	.await?;

	Ok(memory)
}

pub async fn memory_in_vault_for_update(
	executor: impl PgExecutor<'_>,
	memory_id: Uuid,
	vault_id: Uuid,
) -> Result<Option<Memory>> {
	let memory = sqlx::query_as::<_, Memory>(
		"\
SELECT *
FROM memories
WHERE memory_id = $1 AND vault_id = $2 AND is_deleted = FALSE
FOR UPDATE",
	)
	.bind(memory_id)
	.bind(vault_id)
	.fetch_optional(executor)
	.await?;

	Ok(memory)
}

pub async fn list_memories(executor: impl PgExecutor<'_>, vault_id: Uuid) -> Result<Vec<Memory>> {
	let memories = sqlx::query_as::<_, Memory>(
		"\
SELECT *
FROM memories
WHERE vault_id = $1 AND is_deleted = FALSE
ORDER BY created_at DESC",
	)
	.bind(vault_id)
	.fetch_all(executor)
	.await?;

	Ok(memories)
}

pub async fn update_memory_fields(executor: impl PgExecutor<'_>, memory: &Memory) -> Result<()> {
	sqlx::query(
		"\
UPDATE memories
SET title = $1, content = $2, edited_at = $3
WHERE memory_id = $4",
	)
	.bind(memory.title.as_str())
	.bind(memory.content.as_str())
	.bind(memory.edited_at)
	.bind(memory.memory_id)
	.execute(executor)
	.await?;

	Ok(())
}

pub async fn soft_delete_memory(executor: impl PgExecutor<'_>, memory_id: Uuid) -> Result<()> {
	sqlx::query("UPDATE memories SET is_deleted = TRUE WHERE memory_id = $1")
		.bind(memory_id)
		.execute(executor)
		.await?;

	Ok(())
}

// Memory media

pub async fn insert_memory_media(executor: impl PgExecutor<'_>, media: &MemoryMedia) -> Result<()> {
	sqlx::query(
		"\
INSERT INTO memory_media (media_id, memory_id, file_path, file_url, file_type, uploaded_at)
VALUES ($1, $2, $3, $4, $5, $6)",
	)
	.bind(media.media_id)
	.bind(media.memory_id)
	.bind(media.file_path.as_str())
	.bind(media.file_url.as_str())
	.bind(media.file_type.as_str())
	.bind(media.uploaded_at)
	.execute(executor)
	.await?;

	Ok(())
}

pub async fn memory_media_for(
	executor: impl PgExecutor<'_>,
	memory_id: Uuid,
) -> Result<Vec<MemoryMedia>> {
	let media = sqlx::query_as::<_, MemoryMedia>(
		"SELECT * FROM memory_media WHERE memory_id = $1 ORDER BY uploaded_at ASC",
	)
	.bind(memory_id)
	.fetch_all(executor)
	.await?;

	Ok(media)
}

pub async fn load_memory_media(
	executor: impl PgExecutor<'_>,
	media_id: Uuid,
) -> Result<Option<MemoryMedia>> {
	let media = sqlx::query_as::<_, MemoryMedia>("SELECT * FROM memory_media WHERE media_id = $1")
		.bind(media_id)
		.fetch_optional(executor)
		.await?;

	Ok(media)
}

pub async fn delete_memory_media(executor: impl PgExecutor<'_>, media_id: Uuid) -> Result<()> {
	sqlx::query("DELETE FROM memory_media WHERE media_id = $1")
		.bind(media_id)
		.execute(executor)
		.await?;

	Ok(())
}

// Journals

pub async fn insert_journal(executor: impl PgExecutor<'_>, journal: &Journal) -> Result<()> {
	sqlx::query(
		"\
INSERT INTO journals (
	journal_id,
	user_id,
	vault_id,
	title,
	content,
	visibility,
	status,
	created_at,
	edited_at,
	is_deleted,
	memory_id
)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
	)
	.bind(journal.journal_id)
	.bind(journal.user_id)
	.bind(journal.vault_id)
	.bind(journal.title.as_str())
	.bind(journal.content.as_str())
	.bind(journal.visibility.as_str())
	.bind(journal.status.as_str())
	.bind(journal.created_at)
	.bind(journal.edited_at)
	.bind(journal.is_deleted)
	.bind(journal.memory_id)
	.execute(executor)
	.await?;

	Ok(())
}

pub async fn journal_for_update(
	executor: impl PgExecutor<'_>,
	journal_id: Uuid,
) -> Result<Option<Journal>> {
	let journal = sqlx::query_as::<_, Journal>(
		"\
SELECT *
FROM journals
WHERE journal_id = $1 AND is_deleted = FALSE
FOR UPDATE",
	)
	.bind(journal_id)
	.fetch_optional(executor)
	.await?;

	Ok(journal)
}

pub async fn mark_journal_converted(
	executor: impl PgExecutor<'_>,
	journal_id: Uuid,
	memory_id: Uuid,
) -> Result<()> {
	sqlx::query(
		"\
UPDATE journals
SET status = 'converted', memory_id = $1
WHERE journal_id = $2",
	)
	.bind(memory_id)
	.bind(journal_id)
	.execute(executor)
	.await?;

	Ok(())
}

pub async fn load_journal(
	executor: impl PgExecutor<'_>,
	journal_id: Uuid,
) -> Result<Option<Journal>> {
	let journal = sqlx::query_as::<_, Journal>(
		"SELECT * FROM journals WHERE journal_id = $1 AND is_deleted = FALSE",
	)
	.bind(journal_id)
	.fetch_optional(executor)
	.await?;

	Ok(journal)
}
