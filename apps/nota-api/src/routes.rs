use axum::{
	Json, Router,
	extract::{Path, RawQuery, State, rejection::JsonRejection},
	http::{HeaderMap, StatusCode, header::AUTHORIZATION},
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::state::{AppState, AuthState};
use nota_service::{
	CreateNoteRequest, DeleteNoteRequest, DeleteNoteResponse, Error, GetNoteRequest,
	ListNotesRequest, NotePage, NoteResponse, SearchNotesRequest, SuggestTagsRequest,
	SuggestTagsResponse, UpdateNoteRequest, query,
};

const HEADER_USER_ID: &str = "X-Nota-User-Id";
const MAX_OWNER_ID_CHARS: usize = 128;

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/notes", get(list_notes).post(create_note))
		.route("/v1/notes/search", get(search_notes))
		.route("/v1/notes/suggest-tags", post(suggest_tags))
		.route("/v1/notes/{note_id}", get(get_note).put(update_note).delete(delete_note))
		.with_state(state)
}

#[derive(Debug, Deserialize)]
struct CreateNoteBody {
	title: Option<String>,
	content: Option<String>,
	#[serde(default)]
	tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct UpdateNoteBody {
	title: Option<String>,
	content: Option<String>,
	tags: Option<Vec<String>>,
}

/// Query-string parameters shared by listing and search. `tags` may repeat.
#[derive(Debug, Default)]
struct ListingParams {
	query: Option<String>,
	tags: Vec<String>,
	page: Option<i64>,
	limit: Option<i64>,
}
impl ListingParams {
	fn parse(raw: Option<&str>) -> Result<Self, ApiError> {
		let pairs = serde_urlencoded::from_str::<Vec<(String, String)>>(raw.unwrap_or_default())
			.map_err(|_| {
				json_error(
					StatusCode::BAD_REQUEST,
					"INVALID_REQUEST",
					"Query string is malformed.",
					None,
				)
			})?;
		let mut params = Self::default();

		for (key, value) in pairs {
			match key.as_str() {
				"query" => params.query = Some(value),
				"tags" | "tags[]" => params.tags.push(value),
				"page" => params.page = query::parse_page_param(&value),
				"limit" => params.limit = query::parse_page_param(&value),
				_ => {},
			}
		}

		Ok(params)
	}
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn list_notes(
	State(state): State<AppState>,
	headers: HeaderMap,
	RawQuery(raw): RawQuery,
) -> Result<Json<NotePage>, ApiError> {
	let owner_id = resolve_owner(&state.auth, &headers)?;
	let params = ListingParams::parse(raw.as_deref())?;
	let response = state
		.service
		.list_notes(ListNotesRequest {
			owner_id,
			tags: params.tags,
			page: params.page,
			limit: params.limit,
		})
		.await?;

	Ok(Json(response))
}

async fn search_notes(
	State(state): State<AppState>,
	headers: HeaderMap,
	RawQuery(raw): RawQuery,
) -> Result<Json<NotePage>, ApiError> {
	let owner_id = resolve_owner(&state.auth, &headers)?;
	let params = ListingParams::parse(raw.as_deref())?;
	let response = state
		.service
		.search_notes(SearchNotesRequest {
			owner_id,
			query: params.query,
			tags: params.tags,
			page: params.page,
			limit: params.limit,
		})
		.await?;

	Ok(Json(response))
}

async fn create_note(
	State(state): State<AppState>,
	headers: HeaderMap,
	payload: Result<Json<CreateNoteBody>, JsonRejection>,
) -> Result<(StatusCode, Json<NoteResponse>), ApiError> {
	let owner_id = resolve_owner(&state.auth, &headers)?;
	let Json(body) = payload?;
	let response = state
		.service
		.create_note(CreateNoteRequest {
			owner_id,
			title: body.title,
			content: body.content,
			tags: body.tags,
		})
		.await?;

	Ok((StatusCode::CREATED, Json(response)))
}

async fn suggest_tags(
	State(state): State<AppState>,
	headers: HeaderMap,
	payload: Result<Json<SuggestTagsRequest>, JsonRejection>,
) -> Result<Json<SuggestTagsResponse>, ApiError> {
	resolve_owner(&state.auth, &headers)?;

	let Json(body) = payload?;
	let response = state.service.suggest_tags(body).await?;

	Ok(Json(response))
}

async fn get_note(
	State(state): State<AppState>,
	headers: HeaderMap,
	Path(note_id): Path<String>,
) -> Result<Json<NoteResponse>, ApiError> {
	let owner_id = resolve_owner(&state.auth, &headers)?;
	let note_id = parse_note_id(&note_id)?;
	let response = state.service.get_note(GetNoteRequest { owner_id, note_id }).await?;

	Ok(Json(response))
}

async fn update_note(
	State(state): State<AppState>,
	headers: HeaderMap,
	Path(note_id): Path<String>,
	payload: Result<Json<UpdateNoteBody>, JsonRejection>,
) -> Result<Json<NoteResponse>, ApiError> {
	let owner_id = resolve_owner(&state.auth, &headers)?;
	let note_id = parse_note_id(&note_id)?;
	let Json(body) = payload?;
	let response = state
		.service
		.update_note(UpdateNoteRequest {
			owner_id,
			note_id,
			title: body.title,
			content: body.content,
			tags: body.tags,
		})
		.await?;

	Ok(Json(response))
}

async fn delete_note(
	State(state): State<AppState>,
	headers: HeaderMap,
	Path(note_id): Path<String>,
) -> Result<Json<DeleteNoteResponse>, ApiError> {
	let owner_id = resolve_owner(&state.auth, &headers)?;
	let note_id = parse_note_id(&note_id)?;
	let response = state.service.delete_note(DeleteNoteRequest { owner_id, note_id }).await?;

	Ok(Json(response))
}

fn resolve_owner(auth: &AuthState, headers: &HeaderMap) -> Result<String, ApiError> {
	match auth {
		AuthState::Off => {
			let owner_id = headers
				.get(HEADER_USER_ID)
				.and_then(|value| value.to_str().ok())
				.map(str::trim)
				.filter(|value| !value.is_empty())
				.ok_or_else(|| unauthorized(format!("{HEADER_USER_ID} header is required.")))?;

			if owner_id.chars().count() > MAX_OWNER_ID_CHARS {
				return Err(json_error(
					StatusCode::BAD_REQUEST,
					"INVALID_REQUEST",
					format!("{HEADER_USER_ID} must be at most {MAX_OWNER_ID_CHARS} characters."),
					Some(vec![HEADER_USER_ID.to_string()]),
				));
			}

			Ok(owner_id.to_string())
		},
		AuthState::StaticKeys { owners_by_token } => {
			let token = headers
				.get(AUTHORIZATION)
				.and_then(|value| value.to_str().ok())
				.and_then(|value| value.strip_prefix("Bearer "))
				.map(str::trim)
				.filter(|value| !value.is_empty())
				.ok_or_else(|| unauthorized("Bearer token is required."))?;

			owners_by_token
				.get(token)
				.cloned()
				.ok_or_else(|| unauthorized("Bearer token is not recognized."))
		},
	}
}

fn parse_note_id(raw: &str) -> Result<Uuid, ApiError> {
	// A malformed id cannot name any note, so it reads the same as a missing one.
	Uuid::parse_str(raw)
		.map_err(|_| json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "Note not found.", None))
}

fn unauthorized(message: impl Into<String>) -> ApiError {
	json_error(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message, None)
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}
impl ApiError {
	fn new(
		status: StatusCode,
		error_code: impl Into<String>,
		message: impl Into<String>,
		fields: Option<Vec<String>>,
	) -> Self {
		Self { status, error_code: error_code.into(), message: message.into(), fields }
	}
}
impl From<Error> for ApiError {
	fn from(err: Error) -> Self {
		match err {
			Error::InvalidRequest { message } =>
				json_error(StatusCode::BAD_REQUEST, "INVALID_REQUEST", message, None),
			Error::NotFound { message } =>
				json_error(StatusCode::NOT_FOUND, "NOT_FOUND", message, None),
			Error::Enrichment { message } => {
				tracing::warn!(error = %message, "Enrichment request failed.");

				json_error(StatusCode::BAD_GATEWAY, "ENRICHMENT_FAILED", message, None)
			},
			Error::Storage { message } => {
				tracing::error!(error = %message, "Storage request failed.");

				json_error(
					StatusCode::INTERNAL_SERVER_ERROR,
					"STORAGE_ERROR",
					"Internal storage error.",
					None,
				)
			},
		}
	}
}
impl From<JsonRejection> for ApiError {
	fn from(rejection: JsonRejection) -> Self {
		json_error(StatusCode::BAD_REQUEST, "INVALID_REQUEST", rejection.body_text(), None)
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error_code: self.error_code, message: self.message, fields: self.fields };

		(self.status, Json(body)).into_response()
	}
}

pub fn json_error(
	status: StatusCode,
	code: &str,
	message: impl Into<String>,
	fields: Option<Vec<String>>,
) -> ApiError {
	ApiError::new(status, code, message, fields)
}
