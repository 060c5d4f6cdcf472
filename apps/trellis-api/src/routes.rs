use axum::{
	Json, Router,
	body::Bytes,
	extract::{Path, Query, State},
	http::{HeaderMap, StatusCode, header::CONTENT_TYPE},
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::state::AppState;
use trellis_service::{
	ActiveSeedsRequest, ActiveSeedsResponse, CancelSeedRequest, CancelSeedResponse,
	ConvertJournalRequest, ConvertJournalResponse, CreateMemoryRequest, CreateMemoryResponse,
	CreateSeedRequest, CreateSeedResponse, DeleteMemoryMediaRequest, DeleteMemoryMediaResponse,
	DeleteMemoryRequest, DeleteMemoryResponse, DeleteSeedMediaRequest, DeleteSeedMediaResponse,
	Error, ListMemoriesRequest, ListMemoriesResponse, ListSeedsRequest, ListSeedsResponse,
	MemoryDetailRequest, MemoryItem, RecordViewRequest, RecordViewResponse, SeedDetailRequest,
	SeedDetailResponse, SeedSummaryRequest, SeedSummaryResponse, TickReport, UpdateMemoryRequest,
	UpdateMemoryResponse, UpdateSeedRequest, UpdateSeedResponse, UploadMemoryMediaRequest,
	UploadMemoryMediaResponse, UploadSeedMediaRequest, UploadSeedMediaResponse,
};

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/seeds", get(list_seeds).post(create_seed))
		.route("/v1/seeds/me", get(list_my_seeds))
		.route("/v1/seeds/active", get(list_active_seeds))
		.route("/v1/seeds/summary", get(seed_summary))
		.route("/v1/seeds/update", post(update_seed))
		.route("/v1/seeds/cancel", post(cancel_seed))
		.route("/v1/seeds/view", post(record_view))
		.route("/v1/seeds/media/delete", post(delete_seed_media))
		.route("/v1/seeds/{seed_id}", get(seed_detail))
		.route("/v1/seeds/{seed_id}/media", post(upload_seed_media))
		.route("/v1/memories", get(list_memories).post(create_memory))
		.route("/v1/memories/update", post(update_memory))
		.route("/v1/memories/delete", post(delete_memory))
		.route("/v1/memories/media/delete", post(delete_memory_media))
		.route("/v1/memories/{memory_id}", get(memory_detail))
		.route("/v1/memories/{memory_id}/media", post(upload_memory_media))
		.route("/v1/journals/convert", post(convert_journal))
		.with_state(state)
}

pub fn admin_router(state: AppState) -> Router {
	Router::new().route("/v1/admin/tick", post(tick)).with_state(state)
}

#[derive(Debug, Deserialize)]
struct UserQuery {
	user_id: Uuid,
}

#[derive(Debug, Deserialize)]
struct PageQuery {
	user_id: Uuid,
	offset: Option<i64>,
	limit: Option<i64>,
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn create_seed(
	State(state): State<AppState>,
	Json(payload): Json<CreateSeedRequest>,
) -> Result<Json<CreateSeedResponse>, ApiError> {
	Ok(Json(state.service.create_seed(payload).await?))
}

async fn list_seeds(
	State(state): State<AppState>,
	Query(query): Query<PageQuery>,
) -> Result<Json<ListSeedsResponse>, ApiError> {
	let request =
		ListSeedsRequest { user_id: query.user_id, offset: query.offset, limit: query.limit };

	Ok(Json(state.service.list_seeds(request).await?))
}

async fn list_my_seeds(
	State(state): State<AppState>,
	Query(query): Query<PageQuery>,
) -> Result<Json<ListSeedsResponse>, ApiError> {
	let request =
		ListSeedsRequest { user_id: query.user_id, offset: query.offset, limit: query.limit };

	Ok(Json(state.service.list_my_seeds(request).await?))
}

async fn list_active_seeds(
	State(state): State<AppState>,
	Query(query): Query<UserQuery>,
) -> Result<Json<ActiveSeedsResponse>, ApiError> {
	Ok(Json(state.service.list_active_seeds(ActiveSeedsRequest { user_id: query.user_id }).await?))
}

async fn seed_summary(
	State(state): State<AppState>,
	Query(query): Query<UserQuery>,
) -> Result<Json<SeedSummaryResponse>, ApiError> {
	Ok(Json(state.service.seed_summary(SeedSummaryRequest { user_id: query.user_id }).await?))
}

async fn seed_detail(
	State(state): State<AppState>,
	Path(seed_id): Path<Uuid>,
	Query(query): Query<UserQuery>,
) -> Result<Json<SeedDetailResponse>, ApiError> {
	let request = SeedDetailRequest { user_id: query.user_id, seed_id };

	Ok(Json(state.service.seed_detail(request).await?))
}

async fn update_seed(
	State(state): State<AppState>,
	Json(payload): Json<UpdateSeedRequest>,
) -> Result<Json<UpdateSeedResponse>, ApiError> {
	Ok(Json(state.service.update_seed(payload).await?))
}

async fn cancel_seed(
	State(state): State<AppState>,
	Json(payload): Json<CancelSeedRequest>,
) -> Result<Json<CancelSeedResponse>, ApiError> {
	Ok(Json(state.service.cancel_seed(payload).await?))
}

async fn record_view(
	State(state): State<AppState>,
	Json(payload): Json<RecordViewRequest>,
) -> Result<Json<RecordViewResponse>, ApiError> {
	Ok(Json(state.service.record_view(payload).await?))
}

async fn upload_seed_media(
	State(state): State<AppState>,
	Path(seed_id): Path<Uuid>,
	Query(query): Query<UserQuery>,
	headers: HeaderMap,
	body: Bytes,
) -> Result<Json<UploadSeedMediaResponse>, ApiError> {
	let request = UploadSeedMediaRequest {
		user_id: query.user_id,
		seed_id,
		content_type: content_type(&headers)?,
		bytes: body.to_vec(),
	};

	Ok(Json(state.service.upload_seed_media(request).await?))
}

async fn delete_seed_media(
	State(state): State<AppState>,
	Json(payload): Json<DeleteSeedMediaRequest>,
) -> Result<Json<DeleteSeedMediaResponse>, ApiError> {
	Ok(Json(state.service.delete_seed_media(payload).await?))
}

async fn create_memory(
	State(state): State<AppState>,
	Json(payload): Json<CreateMemoryRequest>,
) -> Result<Json<CreateMemoryResponse>, ApiError> {
	Ok(Json(state.service.create_memory(payload).await?))
}

async fn list_memories(
	State(state): State<AppState>,
	Query(query): Query<UserQuery>,
) -> Result<Json<ListMemoriesResponse>, ApiError> {
	Ok(Json(state.service.list_memories(ListMemoriesRequest { user_id: query.user_id }).await?))
}

async fn memory_detail(
	State(state): State<AppState>,
	Path(memory_id): Path<Uuid>,
	Query(query): Query<UserQuery>,
) -> Result<Json<MemoryItem>, ApiError> {
	let request = MemoryDetailRequest { user_id: query.user_id, memory_id };

	Ok(Json(state.service.memory_detail(request).await?))
}

async fn update_memory(
	State(state): State<AppState>,
	Json(payload): Json<UpdateMemoryRequest>,
) -> Result<Json<UpdateMemoryResponse>, ApiError> {
	Ok(Json(state.service.update_memory(payload).await?))
}

async fn delete_memory(
	State(state): State<AppState>,
	Json(payload): Json<DeleteMemoryRequest>,
) -> Result<Json<DeleteMemoryResponse>, ApiError> {
	Ok(Json(state.service.delete_memory(payload).await?))
}

async fn upload_memory_media(
	State(state): State<AppState>,
	Path(memory_id): Path<Uuid>,
	Query(query): Query<UserQuery>,
	headers: HeaderMap,
	body: Bytes,
) -> Result<Json<UploadMemoryMediaResponse>, ApiError> {
	let request = UploadMemoryMediaRequest {
		user_id: query.user_id,
		memory_id,
		content_type: content_type(&headers)?,
		bytes: body.to_vec(),
	};

	Ok(Json(state.service.upload_memory_media(request).await?))
}

async fn delete_memory_media(
	State(state): State<AppState>,
	Json(payload): Json<DeleteMemoryMediaRequest>,
) -> Result<Json<DeleteMemoryMediaResponse>, ApiError> {
	Ok(Json(state.service.delete_memory_media(payload).await?))
}

async fn convert_journal(
	State(state): State<AppState>,
	Json(payload): Json<ConvertJournalRequest>,
) -> Result<Json<ConvertJournalResponse>, ApiError> {
	Ok(Json(state.service.convert_journal(payload).await?))
}

async fn tick(State(state): State<AppState>) -> Result<Json<TickReport>, ApiError> {
	Ok(Json(state.service.tick().await?))
}

fn content_type(headers: &HeaderMap) -> Result<String, ApiError> {
	headers
		.get(CONTENT_TYPE)
		.and_then(|value| value.to_str().ok())
		.map(|value| value.to_string())
		.ok_or_else(|| ApiError {
			status: StatusCode::BAD_REQUEST,
			error_code: "invalid_request".to_string(),
			message: "A Content-Type header is required.".to_string(),
		})
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
}

impl From<Error> for ApiError {
	fn from(err: Error) -> Self {
		let (status, error_code) = match &err {
			Error::NotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
			Error::Forbidden { .. } => (StatusCode::FORBIDDEN, "forbidden"),
			Error::WindowExpired { .. } => (StatusCode::FORBIDDEN, "window_expired"),
			Error::InvalidState { .. } => (StatusCode::CONFLICT, "invalid_state"),
			Error::NotReady { .. } => (StatusCode::BAD_REQUEST, "not_ready"),
			Error::InvalidRequest { .. } => (StatusCode::BAD_REQUEST, "invalid_request"),
			Error::Storage { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "storage"),
			Error::Provider { .. } => (StatusCode::BAD_GATEWAY, "provider"),
		};

		Self { status, error_code: error_code.to_string(), message: err.to_string() }
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error_code: self.error_code, message: self.message };

		(self.status, Json(body)).into_response()
	}
}
