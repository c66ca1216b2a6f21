use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{Error, NotaService, NoteResponse, Result, enrichment};
use nota_storage::models::Note;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CreateNoteRequest {
	pub owner_id: String,
	pub title: Option<String>,
	pub content: Option<String>,
	#[serde(default)]
	pub tags: Vec<String>,
}

impl NotaService {
	/// Persists a new note. The summary is generated first and left empty when enrichment degrades.
	pub async fn create_note(&self, req: CreateNoteRequest) -> Result<NoteResponse> {
		let owner_id = crate::require_owner(&req.owner_id)?;
		let title = required_text(req.title.as_deref(), "title")?.trim().to_string();
		let content = required_text(req.content.as_deref(), "content")?.to_string();
		let note_id = Uuid::new_v4();
		let summary = self.enricher().summarize(note_id, &content).await.ready();
		let now = OffsetDateTime::now_utc();
		let note = Note {
			note_id,
			owner_id: owner_id.to_string(),
			title,
			content,
			summary,
			tags: enrichment::normalize_tags(req.tags),
			suggested_tags: Vec::new(),
			created_at: now,
			updated_at: now,
		};

		self.store.insert_note(&note).await?;

		tracing::info!(
			note_id = %note.note_id,
			summarized = note.summary.is_some(),
			"Note created."
		);

		Ok(note.into())
	}
}

pub(crate) fn required_text<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str> {
	match value {
		Some(value) if !value.trim().is_empty() => Ok(value),
		_ => Err(Error::InvalidRequest { message: format!("{field} must be a non-empty string.") }),
	}
}
