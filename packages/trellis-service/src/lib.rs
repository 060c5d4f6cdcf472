pub mod bloom;
pub mod cancel;
pub mod convert;
pub mod create;
pub mod detail;
pub mod list;
pub mod media;
pub mod memories;
pub mod tick;
pub mod time_serde;
pub mod update;

mod error;
mod materialize;

use std::{future::Future, pin::Pin, sync::Arc};

use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

pub use bloom::{BloomOutcome, RecordViewRequest, RecordViewResponse};
pub use cancel::{CancelSeedRequest, CancelSeedResponse};
pub use convert::{ConvertJournalRequest, ConvertJournalResponse};
pub use create::{CreateSeedRequest, CreateSeedResponse};
pub use detail::{SeedDetailRequest, SeedDetailResponse};
pub use error::{Error, Result};
pub use list::{
	ActiveSeedsRequest, ActiveSeedsResponse, ListSeedsRequest, ListSeedsResponse, MediaItem,
	SeedItem, SeedSummaryRequest, SeedSummaryResponse,
};
pub use media::{
	DeleteSeedMediaRequest, DeleteSeedMediaResponse, UploadSeedMediaRequest,
	UploadSeedMediaResponse,
};
pub use memories::{
	CreateMemoryRequest, CreateMemoryResponse, DeleteMemoryMediaRequest, DeleteMemoryMediaResponse,
	DeleteMemoryRequest, DeleteMemoryResponse, ListMemoriesRequest, ListMemoriesResponse,
	MemoryDetailRequest, MemoryItem, UpdateMemoryRequest, UpdateMemoryResponse,
	UploadMemoryMediaRequest, UploadMemoryMediaResponse,
};
pub use tick::TickReport;
use trellis_config::Config;
use trellis_domain::SeedStatus;
use trellis_storage::{
	db::Db,
	models::{Seed, VaultMembership},
	queries,
};
pub use update::{UpdateSeedRequest, UpdateSeedResponse};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Wall clock seam; swapped for a manual clock in the acceptance tests so
/// window boundaries can be pinned exactly.
pub trait Clock
where
	Self: Send + Sync,
{
	fn now(&self) -> OffsetDateTime;
}

pub trait Notifier
where
	Self: Send + Sync,
{
	fn notify<'a>(&'a self, notification: &'a Notification) -> BoxFuture<'a, color_eyre::Result<()>>;
}

pub trait BlobStore
where
	Self: Send + Sync,
{
	fn upload<'a>(
		&'a self,
		cfg: &'a trellis_config::Blobstore,
		path: &'a str,
		bytes: Vec<u8>,
		content_type: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<String>>;

	fn remove<'a>(
		&'a self,
		cfg: &'a trellis_config::Blobstore,
		path: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<()>>;
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
	SeedPlanted,
	SeedReady,
	SeedBloomed,
	JournalConverted,
}
impl NotificationKind {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::SeedPlanted => "seed_planted",
			Self::SeedReady => "seed_ready",
			Self::SeedBloomed => "seed_bloomed",
			Self::JournalConverted => "journal_converted",
		}
	}
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Notification {
	pub user_id: Uuid,
	pub kind: NotificationKind,
	pub title: String,
	pub body: String,
	pub reference_id: Option<Uuid>,
}

#[derive(Clone)]
pub struct Collaborators {
	pub clock: Arc<dyn Clock>,
	pub notifier: Arc<dyn Notifier>,
	pub blobs: Arc<dyn BlobStore>,
}

pub struct TrellisService {
	pub cfg: Config,
	pub db: Db,
	pub collaborators: Collaborators,
}

struct DefaultCollaborators;

impl Clock for DefaultCollaborators {
	fn now(&self) -> OffsetDateTime {
		OffsetDateTime::now_utc()
	}
}

impl Notifier for DefaultCollaborators {
	fn notify<'a>(
		&'a self,
		notification: &'a Notification,
	) -> BoxFuture<'a, color_eyre::Result<()>> {
		Box::pin(async move {
			tracing::info!(
				user_id = %notification.user_id,
				kind = notification.kind.as_str(),
				"Notification delivered."
			);

			Ok(())
		})
	}
}

impl BlobStore for DefaultCollaborators {
	fn upload<'a>(
		&'a self,
		cfg: &'a trellis_config::Blobstore,
		path: &'a str,
		bytes: Vec<u8>,
		content_type: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<String>> {
		Box::pin(trellis_providers::blobstore::upload(cfg, path, bytes, content_type))
	}

	fn remove<'a>(
		&'a self,
		cfg: &'a trellis_config::Blobstore,
		path: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<()>> {
		Box::pin(trellis_providers::blobstore::remove(cfg, path))
	}
}

impl Collaborators {
	pub fn new(clock: Arc<dyn Clock>, notifier: Arc<dyn Notifier>, blobs: Arc<dyn BlobStore>) -> Self {
		Self { clock, notifier, blobs }
	}
}

impl Default for Collaborators {
	fn default() -> Self {
		let collaborators = Arc::new(DefaultCollaborators);

		Self {
			clock: collaborators.clone(),
			notifier: collaborators.clone(),
			blobs: collaborators,
		}
	}
}

impl TrellisService {
	pub fn new(cfg: Config, db: Db) -> Self {
		Self { cfg, db, collaborators: Collaborators::default() }
	}

	pub fn with_collaborators(cfg: Config, db: Db, collaborators: Collaborators) -> Self {
		Self { cfg, db, collaborators }
	}

	pub(crate) fn now(&self) -> OffsetDateTime {
		self.collaborators.clock.now()
	}

	pub(crate) fn seed_edit_window(&self) -> Duration {
		Duration::hours(self.cfg.windows.seed_edit_hours)
	}

	pub(crate) fn seed_cancel_lead(&self) -> Duration {
		Duration::hours(self.cfg.windows.seed_cancel_lead_hours)
	}

	pub(crate) fn memory_edit_window(&self) -> Duration {
		Duration::hours(self.cfg.windows.memory_edit_hours)
	}

	pub(crate) async fn require_vault(&self, user_id: Uuid) -> Result<VaultMembership> {
		queries::active_membership(&self.db.pool, user_id).await?.ok_or_else(|| {
			Error::Forbidden { message: "User has no active vault membership.".to_string() }
		})
	}

	/// Delivery failures never fail the operation that produced them.
	pub(crate) async fn notify_best_effort(&self, notification: Notification) {
		if let Err(err) = self.collaborators.notifier.notify(&notification).await {
			tracing::warn!(
				user_id = %notification.user_id,
				kind = notification.kind.as_str(),
				error = %err,
				"Notification delivery failed."
			);
		}
	}
}

/// Persisted statuses are written exclusively through [`SeedStatus::as_str`],
/// so an unparsable row is storage corruption rather than a caller mistake.
pub(crate) fn seed_status(seed: &Seed) -> Result<SeedStatus> {
	seed.status.parse().map_err(|err: trellis_domain::UnknownStatus| Error::Storage {
		message: err.to_string(),
	})
}
