use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{Error, MediaItem, Result, TrellisService, media};
use trellis_domain::windows;
use trellis_storage::{
	models::{Memory, MemoryMedia},
	queries,
};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CreateMemoryRequest {
	pub user_id: Uuid,
	pub title: String,
	pub content: String,
	#[serde(default, with = "crate::time_serde::option")]
	pub memory_date: Option<OffsetDateTime>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CreateMemoryResponse {
	pub memory_id: Uuid,
	#[serde(with = "crate::time_serde")]
	pub created_at: OffsetDateTime,
	#[serde(with = "crate::time_serde")]
	pub editable_until: OffsetDateTime,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ListMemoriesRequest {
	pub user_id: Uuid,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ListMemoriesResponse {
	pub items: Vec<MemoryItem>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct MemoryDetailRequest {
	pub user_id: Uuid,
	pub memory_id: Uuid,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct UpdateMemoryRequest {
	pub user_id: Uuid,
	pub memory_id: Uuid,
	pub title: Option<String>,
	pub content: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct UpdateMemoryResponse {
	pub memory_id: Uuid,
	#[serde(with = "crate::time_serde::option")]
	pub edited_at: Option<OffsetDateTime>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct DeleteMemoryRequest {
	pub user_id: Uuid,
	pub memory_id: Uuid,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct DeleteMemoryResponse {
	pub memory_id: Uuid,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct UploadMemoryMediaRequest {
	pub user_id: Uuid,
	pub memory_id: Uuid,
	pub content_type: String,
	pub bytes: Vec<u8>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct UploadMemoryMediaResponse {
	pub media_id: Uuid,
	pub file_url: String,
	pub file_type: String,
	#[serde(with = "crate::time_serde")]
	pub uploaded_at: OffsetDateTime,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct DeleteMemoryMediaRequest {
	pub user_id: Uuid,
	pub media_id: Uuid,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct DeleteMemoryMediaResponse {
	pub media_id: Uuid,
}

/// A memory is shared: both members always see it in full. Only mutations are
/// restricted to the creator, and only inside the editable window.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct MemoryItem {
	pub memory_id: Uuid,
	pub created_by: Uuid,
	pub title: String,
	pub content: String,
	#[serde(with = "crate::time_serde::option")]
	pub memory_date: Option<OffsetDateTime>,
	pub is_seed: bool,
	#[serde(with = "crate::time_serde")]
	pub created_at: OffsetDateTime,
	#[serde(with = "crate::time_serde::option")]
	pub edited_at: Option<OffsetDateTime>,
	#[serde(with = "crate::time_serde")]
	pub editable_until: OffsetDateTime,
	pub media: Vec<MediaItem>,
}

impl TrellisService {
	pub async fn create_memory(&self, req: CreateMemoryRequest) -> Result<CreateMemoryResponse> {
		let now = self.now();
		let title = req.title.trim();
		let content = req.content.trim();

		if title.is_empty() || content.is_empty() {
			return Err(Error::InvalidRequest {
				message: "title and content are required.".to_string(),
			});
		}

		let membership = self.require_vault(req.user_id).await?;
		let memory = Memory {
			memory_id: Uuid::new_v4(),
			vault_id: membership.vault_id,
			created_by: req.user_id,
			title: title.to_string(),
			content: content.to_string(),
			memory_date: req.memory_date,
			is_seed: false,
			created_at: now,
			edited_at: None,
			editable_until: now + self.memory_edit_window(),
			is_deleted: false,
		};

		queries::insert_memory(&self.db.pool, &memory).await?;

		Ok(CreateMemoryResponse {
			memory_id: memory.memory_id,
			created_at: memory.created_at,
			editable_until: memory.editable_until,
		})
	}

	pub async fn list_memories(&self, req: ListMemoriesRequest) -> Result<ListMemoriesResponse> {
		let membership = self.require_vault(req.user_id).await?;
		let memories = queries::list_memories(&self.db.pool, membership.vault_id).await?;
		let mut items = Vec::with_capacity(memories.len());

		for memory in memories {
			items.push(self.memory_item(memory).await?);
		}

		Ok(ListMemoriesResponse { items })
	}

	pub async fn memory_detail(&self, req: MemoryDetailRequest) -> Result<MemoryItem> {
		let membership = self.require_vault(req.user_id).await?;
		let memory = queries::memory_in_vault(&self.db.pool, req.memory_id, membership.vault_id)
			.await?
			.ok_or_else(|| Error::NotFound { message: "Memory not found.".to_string() })?;

		self.memory_item(memory).await
	}

	pub async fn update_memory(&self, req: UpdateMemoryRequest) -> Result<UpdateMemoryResponse> {
		let now = self.now();

		if req.title.is_none() && req.content.is_none() {
			return Err(Error::InvalidRequest { message: "No updates provided.".to_string() });
		}
		if let Some(title) = req.title.as_ref()
			&& title.trim().is_empty()
		{
			return Err(Error::InvalidRequest {
				message: "title must not be empty when provided.".to_string(),
			});
		}
		if let Some(content) = req.content.as_ref()
			&& content.trim().is_empty()
		{
			return Err(Error::InvalidRequest {
				message: "content must not be empty when provided.".to_string(),
			});
		}

		let membership = self.require_vault(req.user_id).await?;
		let mut tx = self.db.pool.begin().await?;
		let mut memory =
			queries::memory_in_vault_for_update(&mut *tx, req.memory_id, membership.vault_id)
				.await?
				.ok_or_else(|| Error::NotFound { message: "Memory not found.".to_string() })?;

		self.authorize_memory_mutation(&memory, req.user_id, now)?;

		if let Some(title) = req.title {
			memory.title = title.trim().to_string();
		}
		if let Some(content) = req.content {
			memory.content = content.trim().to_string();
		}

		memory.edited_at = Some(now);

		queries::update_memory_fields(&mut *tx, &memory).await?;
		tx.commit().await?;

		Ok(UpdateMemoryResponse { memory_id: memory.memory_id, edited_at: memory.edited_at })
	}

	/// Soft delete. Media rows and blobs stay behind the tombstone so a bloomed
	/// seed's snapshot is never destroyed.
	pub async fn delete_memory(&self, req: DeleteMemoryRequest) -> Result<DeleteMemoryResponse> {
		let now = self.now();
		let membership = self.require_vault(req.user_id).await?;
		let mut tx = self.db.pool.begin().await?;
		let memory =
			queries::memory_in_vault_for_update(&mut *tx, req.memory_id, membership.vault_id)
				.await?
				.ok_or_else(|| Error::NotFound { message: "Memory not found.".to_string() })?;

		self.authorize_memory_mutation(&memory, req.user_id, now)?;

		queries::soft_delete_memory(&mut *tx, memory.memory_id).await?;
		tx.commit().await?;

		Ok(DeleteMemoryResponse { memory_id: memory.memory_id })
	}

	pub async fn upload_memory_media(
		&self,
		req: UploadMemoryMediaRequest,
	) -> Result<UploadMemoryMediaResponse> {
		let now = self.now();

		media::validate_upload(&self.cfg.blobstore, &req.content_type, req.bytes.len() as u64)?;

		let membership = self.require_vault(req.user_id).await?;
		let memory = queries::memory_in_vault(&self.db.pool, req.memory_id, membership.vault_id)
			.await?
			.ok_or_else(|| Error::NotFound { message: "Memory not found.".to_string() })?;

		self.authorize_memory_mutation(&memory, req.user_id, now)?;

		let media_id = Uuid::new_v4();
		let path = format!(
			"memories/{}/{}.{}",
			memory.memory_id,
			media_id,
			media::extension_for(&req.content_type)?
		);
		let file_url = self
			.collaborators
			.blobs
			.upload(&self.cfg.blobstore, &path, req.bytes, &req.content_type)
			.await?;
		let row = MemoryMedia {
			media_id,
			memory_id: memory.memory_id,
			file_path: path,
			file_url,
			file_type: req.content_type,
			uploaded_at: now,
		};

		queries::insert_memory_media(&self.db.pool, &row).await?;

		Ok(UploadMemoryMediaResponse {
			media_id: row.media_id,
			file_url: row.file_url,
			file_type: row.file_type,
			uploaded_at: row.uploaded_at,
		})
	}

	pub async fn delete_memory_media(
		&self,
		req: DeleteMemoryMediaRequest,
	) -> Result<DeleteMemoryMediaResponse> {
		let now = self.now();
		let membership = self.require_vault(req.user_id).await?;
		let row = queries::load_memory_media(&self.db.pool, req.media_id)
			.await?
			.ok_or_else(|| Error::NotFound { message: "Media not found.".to_string() })?;
		let memory = queries::memory_in_vault(&self.db.pool, row.memory_id, membership.vault_id)
			.await?
			.ok_or_else(|| Error::NotFound { message: "Media not found.".to_string() })?;

		self.authorize_memory_mutation(&memory, req.user_id, now)?;

		queries::delete_memory_media(&self.db.pool, row.media_id).await?;

		if let Err(err) = self.collaborators.blobs.remove(&self.cfg.blobstore, &row.file_path).await
		{
			tracing::warn!(path = row.file_path, error = %err, "Blob removal failed.");
		}

		Ok(DeleteMemoryMediaResponse { media_id: row.media_id })
	}

	fn authorize_memory_mutation(
		&self,
		memory: &Memory,
		user_id: Uuid,
		now: OffsetDateTime,
	) -> Result<()> {
		if memory.created_by != user_id {
			return Err(Error::Forbidden {
				message: "Only the memory's creator may modify it.".to_string(),
			});
		}

		windows::memory_edit_allowed(memory.editable_until, now)?;

		Ok(())
	}

	async fn memory_item(&self, memory: Memory) -> Result<MemoryItem> {
		let media = queries::memory_media_for(&self.db.pool, memory.memory_id)
			.await?
			.into_iter()
			.map(|media| MediaItem {
				media_id: media.media_id,
				file_url: media.file_url,
				file_type: media.file_type,
				uploaded_at: media.uploaded_at,
			})
			.collect();

		Ok(MemoryItem {
			memory_id: memory.memory_id,
			created_by: memory.created_by,
			title: memory.title,
			content: memory.content,
			memory_date: memory.memory_date,
			is_seed: memory.is_seed,
			created_at: memory.created_at,
			edited_at: memory.edited_at,
			editable_until: memory.editable_until,
			media,
		})
	}
}
