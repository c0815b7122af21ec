use axum::{
	Json, Router,
	extract::{Path, State, rejection::JsonRejection},
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::{Deserialize, Serialize};

use tubecast_domain::{
	ChannelProfile, VideoDetails, VideoSummary, readability::Readability, word_stats::WordCount,
};
use tubecast_service::Error as ServiceError;

use crate::{socket, state::AppState};

#[derive(Debug, Deserialize)]
pub struct ReadabilityRequest {
	pub descriptions: Vec<String>,
}

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/ws", get(socket::upgrade))
		.route("/v1/readability", post(readability))
		.route("/v1/words/{query}", get(word_stats))
		.route("/v1/channels/{id}", get(channel_profile))
		.route("/v1/tags/{tag}", get(videos_by_tag))
		.route("/v1/videos/{id}/tags", get(video_tags))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn readability(
	State(state): State<AppState>,
	payload: Result<Json<ReadabilityRequest>, JsonRejection>,
) -> Result<Json<Vec<Readability>>, ApiError> {
	let Json(payload) = payload.map_err(|rejection| {
		tracing::debug!(error = %rejection, "Rejected readability request.");

		ApiError::new(
			StatusCode::BAD_REQUEST,
			"invalid_request",
			"Invalid request, 'descriptions' field is missing.",
		)
	})?;

	Ok(Json(state.service.readability(&payload.descriptions)))
}

async fn word_stats(
	State(state): State<AppState>,
	Path(query): Path<String>,
) -> Result<Json<Vec<WordCount>>, ApiError> {
	let stats = state.service.word_stats(&query).await?;

	Ok(Json(stats))
}

async fn channel_profile(
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Result<Json<ChannelProfile>, ApiError> {
	Ok(Json(state.service.channel_profile(&id).await?))
}

async fn videos_by_tag(
	State(state): State<AppState>,
	Path(tag): Path<String>,
) -> Result<Json<Vec<VideoSummary>>, ApiError> {
	Ok(Json(state.service.videos_by_tag(&tag).await?))
}

async fn video_tags(
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Result<Json<VideoDetails>, ApiError> {
	Ok(Json(state.service.video_tags(&id).await?))
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
impl ApiError {
	pub fn new(status: StatusCode, error_code: impl Into<String>, message: impl Into<String>) -> Self {
		Self { status, error_code: error_code.into(), message: message.into() }
	}
}
impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		match err {
			ServiceError::InvalidQuery { message } =>
				ApiError::new(StatusCode::BAD_REQUEST, "invalid_query", message),
			ServiceError::InvalidRequest { message } =>
				ApiError::new(StatusCode::BAD_REQUEST, "invalid_request", message),
			ServiceError::NotFound { message } =>
				ApiError::new(StatusCode::NOT_FOUND, "not_found", message),
			ServiceError::Upstream { message } =>
				ApiError::new(StatusCode::BAD_GATEWAY, "upstream_error", message),
			ServiceError::Delivery { message } =>
				ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message),
		}
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error_code: self.error_code, message: self.message };

		(self.status, Json(body)).into_response()
	}
}
