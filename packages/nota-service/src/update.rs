use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{NotaService, NoteResponse, Result, create, enrichment};

/// Partial update. `None` keeps the stored value; `Some(vec![])` clears the tags.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct UpdateNoteRequest {
	pub owner_id: String,
	pub note_id: Uuid,
	pub title: Option<String>,
	pub content: Option<String>,
	pub tags: Option<Vec<String>>,
}

impl NotaService {
	/// Applies the supplied fields. A content change regenerates the summary and suggested tags; a
	/// failed regeneration keeps the previous value of that field.
	pub async fn update_note(&self, req: UpdateNoteRequest) -> Result<NoteResponse> {
		let owner_id = crate::require_owner(&req.owner_id)?;
		let title = req
			.title
			.as_deref()
			.map(|title| create::required_text(Some(title), "title").map(str::trim))
			.transpose()?;
		let content = req
			.content
			.as_deref()
			.map(|content| create::required_text(Some(content), "content"))
			.transpose()?;
		let mut note = self
			.store
			.find_note(owner_id, req.note_id)
			.await?
			.ok_or_else(crate::note_not_found)?;

		if let Some(content) = content
			&& content != note.content
		{
			if let Some(summary) = self.enricher().summarize(note.note_id, content).await.ready() {
				note.summary = Some(summary);
			}

			match self.enricher().suggest_tags(content).await {
				Ok(tags) if !tags.is_empty() => note.suggested_tags = tags,
				Ok(_) => {
					tracing::warn!(note_id = %note.note_id, "Tag suggestion returned no tags.");
				},
				Err(err) => {
					tracing::warn!(note_id = %note.note_id, error = %err, "Tag suggestion degraded.");
				},
			}

			note.content = content.to_string();
		}
		if let Some(title) = title {
			note.title = title.to_string();
		}
		if let Some(tags) = req.tags {
			note.tags = enrichment::normalize_tags(tags);
		}

		note.updated_at = OffsetDateTime::now_utc().max(note.updated_at);

		if !self.store.save_note(&note).await? {
			return Err(crate::note_not_found());
		}

		tracing::info!(note_id = %note.note_id, "Note updated.");

		Ok(note.into())
	}
}
