use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct Seed {
	pub seed_id: Uuid,
	pub vault_id: Uuid,
	pub created_by: Uuid,
	pub title: String,
	pub content: String,
	pub bloom_at: OffsetDateTime,
	pub created_at: OffsetDateTime,
	pub edited_at: Option<OffsetDateTime>,
	pub status: String,
	pub bloom_notified: bool,
	pub memory_id: Option<Uuid>,
}

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct SeedView {
	pub view_id: Uuid,
	pub seed_id: Uuid,
	pub user_id: Uuid,
	pub viewed_at: OffsetDateTime,
}

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct SeedMedia {
	pub media_id: Uuid,
	pub seed_id: Uuid,
	pub file_path: String,
	pub file_url: String,
	pub file_type: String,
	pub uploaded_at: OffsetDateTime,
}

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct Memory {
	pub memory_id: Uuid,
	pub vault_id: Uuid,
	pub created_by: Uuid,
	pub title: String,
	pub content: String,
	pub memory_date: Option<OffsetDateTime>,
	pub is_seed: bool,
	pub created_at: OffsetDateTime,
	pub edited_at: Option<OffsetDateTime>,
	pub editable_until: OffsetDateTime,
	pub is_deleted: bool,
}

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct MemoryMedia {
	pub media_id: Uuid,
	pub memory_id: Uuid,
	pub file_path: String,
	pub file_url: String,
	pub file_type: String,
	pub uploaded_at: OffsetDateTime,
}

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct Journal {
	pub journal_id: Uuid,
	pub user_id: Uuid,
	pub vault_id: Option<Uuid>,
	pub title: String,
	pub content: String,
	pub visibility: String,
	pub status: String,
	pub created_at: OffsetDateTime,
	pub edited_at: Option<OffsetDateTime>,
	pub is_deleted: bool,
	pub memory_id: Option<Uuid>,
}

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct VaultMembership {
	pub membership_id: Uuid,
	pub vault_id: Uuid,
	pub user_id: Uuid,
	pub joined_at: OffsetDateTime,
	pub left_at: Option<OffsetDateTime>,
}

/// A seed claimed for the at-most-once readiness notification.
#[derive(Clone, Debug, sqlx::FromRow)]
pub struct ReadySeed {
	pub seed_id: Uuid,
	pub created_by: Uuid,
	pub title: String,
}

/// Per-status counts for the vault's seed summary.
#[derive(Clone, Debug, sqlx::FromRow)]
pub struct SeedSummaryRow {
	pub total: i64,
	pub growing: i64,
	pub ready: i64,
	pub bloomed: i64,
}
