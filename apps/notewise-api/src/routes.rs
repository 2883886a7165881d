use axum::{
	Json, Router,
	extract::{Query, State},
	http::{HeaderMap, StatusCode},
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use notewise_service::{
	AddNoteRequest, AddNoteResponse, Error, JourneyHistoryRequest, JourneySynthesis,
	RecallRequest, RecallResult, SynthesizeRequest, TagReport, TagRequest, time_serde::Timestamp,
};

use crate::state::AppState;

/// Set by the upstream auth layer once the therapist is verified.
pub const THERAPIST_ID_HEADER: &str = "X-Notewise-Therapist-Id";

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/notes", post(add_note))
		.route("/v1/notes/tags", post(tag_note))
		.route("/v1/journeys", post(synthesize).get(journey_history))
		.route("/v1/recall", post(recall))
		.with_state(state)
}

#[derive(Debug, Deserialize)]
struct AddNoteBody {
	client_id: String,
	#[serde(default)]
	session_id: Option<Uuid>,
	content: Option<String>,
	#[serde(default)]
	session_date: Option<Timestamp>,
}

#[derive(Debug, Deserialize)]
struct TagBody {
	session_id: Uuid,
	client_id: String,
	content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SynthesizeBody {
	client_id: String,
	#[serde(default)]
	start_date: Option<Timestamp>,
	#[serde(default)]
	end_date: Option<Timestamp>,
	#[serde(default)]
	focus_tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct JourneyHistoryQuery {
	client_id: String,
	limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct RecallBody {
	client_id: String,
	query: String,
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn add_note(
	State(state): State<AppState>,
	headers: HeaderMap,
	Json(body): Json<AddNoteBody>,
) -> Result<Json<AddNoteResponse>, ApiError> {
	let therapist_id = therapist_id(&headers)?;
	let response = state
		.service
		.add_note(AddNoteRequest {
			client_id: body.client_id,
			therapist_id,
			session_id: body.session_id,
			content: body.content,
			session_date: body.session_date,
		})
		.await?;

	Ok(Json(response))
}

async fn tag_note(
	State(state): State<AppState>,
	headers: HeaderMap,
	Json(body): Json<TagBody>,
) -> Result<Json<TagReport>, ApiError> {
	let therapist_id = therapist_id(&headers)?;
	let report = state
		.service
		.tag(TagRequest {
			session_id: body.session_id,
			client_id: body.client_id,
			therapist_id,
			content: body.content,
		})
		.await?;

	Ok(Json(report))
}

async fn synthesize(
	State(state): State<AppState>,
	headers: HeaderMap,
	Json(body): Json<SynthesizeBody>,
) -> Result<Json<JourneySynthesis>, ApiError> {
	let therapist_id = therapist_id(&headers)?;
	let synthesis = state
		.service
		.synthesize(SynthesizeRequest {
			client_id: body.client_id,
			therapist_id,
			start_date: body.start_date,
			end_date: body.end_date,
			focus_tags: body.focus_tags,
		})
		.await?;

	Ok(Json(synthesis))
}

async fn journey_history(
	State(state): State<AppState>,
	headers: HeaderMap,
	Query(query): Query<JourneyHistoryQuery>,
) -> Result<Json<Vec<JourneySynthesis>>, ApiError> {
	let therapist_id = therapist_id(&headers)?;
	let history = state
		.service
		.journey_history(JourneyHistoryRequest {
			client_id: query.client_id,
			therapist_id,
			limit: query.limit,
		})
		.await?;

	Ok(Json(history))
}

async fn recall(
	State(state): State<AppState>,
	headers: HeaderMap,
	Json(body): Json<RecallBody>,
) -> Result<Json<RecallResult>, ApiError> {
	let therapist_id = therapist_id(&headers)?;
	let result = state
		.service
		.search(RecallRequest { therapist_id, client_id: body.client_id, query: body.query })
		.await?;

	Ok(Json(result))
}

fn therapist_id(headers: &HeaderMap) -> Result<String, ApiError> {
	let value = headers
		.get(THERAPIST_ID_HEADER)
		.and_then(|value| value.to_str().ok())
		.map(str::trim)
		.filter(|value| !value.is_empty());

	match value {
		Some(value) => Ok(value.to_string()),
		None => Err(ApiError::new(
			StatusCode::BAD_REQUEST,
			"invalid_request",
			format!("{THERAPIST_ID_HEADER} header is required."),
		)),
	}
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
	fn new(status: StatusCode, error_code: impl Into<String>, message: impl Into<String>) -> Self {
		Self { status, error_code: error_code.into(), message: message.into() }
	}
}

impl From<Error> for ApiError {
	fn from(err: Error) -> Self {
		match err {
			Error::InvalidRequest { message } =>
				ApiError::new(StatusCode::BAD_REQUEST, "invalid_request", message),
			Error::Conflict { message } => ApiError::new(StatusCode::CONFLICT, "conflict", message),
			Error::Storage { message } => {
				tracing::error!(error = %message, "Storage error.");

				ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "storage_error", "Internal error.")
			},
		}
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error_code: self.error_code, message: self.message };

		(self.status, Json(body)).into_response()
	}
}
