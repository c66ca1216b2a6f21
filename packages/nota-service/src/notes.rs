use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{NotaService, Result};
use nota_storage::models::Note;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GetNoteRequest {
	pub owner_id: String,
	pub note_id: Uuid,
}

/// Caller-facing view of a note. The owner id is never echoed back.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NoteResponse {
	pub note_id: Uuid,
	pub title: String,
	pub content: String,
	pub summary: Option<String>,
	pub tags: Vec<String>,
	pub suggested_tags: Vec<String>,
	#[serde(with = "rfc3339")]
	pub created_at: OffsetDateTime,
	#[serde(with = "rfc3339")]
	pub updated_at: OffsetDateTime,
}
impl From<Note> for NoteResponse {
	fn from(note: Note) -> Self {
		Self {
			note_id: note.note_id,
			title: note.title,
			content: note.content,
			summary: note.summary,
			tags: note.tags,
			suggested_tags: note.suggested_tags,
			created_at: note.created_at,
			updated_at: note.updated_at,
		}
	}
}

impl NotaService {
	pub async fn get_note(&self, req: GetNoteRequest) -> Result<NoteResponse> {
		let owner_id = crate::require_owner(&req.owner_id)?;
		let note = self
			.store
			.find_note(owner_id, req.note_id)
			.await?
			.ok_or_else(crate::note_not_found)?;

		Ok(note.into())
	}
}

mod rfc3339 {
	use serde::{Deserialize, Deserializer, Serializer, de::Error as _, ser::Error as _};
	use time::{OffsetDateTime, format_description::well_known::Rfc3339};

	pub fn serialize<S>(value: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		let text = value.format(&Rfc3339).map_err(S::Error::custom)?;

		serializer.serialize_str(&text)
	}

	pub fn deserialize<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
	where
		D: Deserializer<'de>,
	{
		let text = String::deserialize(deserializer)?;

		OffsetDateTime::parse(&text, &Rfc3339).map_err(D::Error::custom)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	use time::macros::datetime;

	#[test]
	fn timestamps_serialize_as_rfc3339() {
		let note = NoteResponse {
			note_id: Uuid::nil(),
			title: "Q3".to_string(),
			content: "budget".to_string(),
			summary: None,
			tags: vec!["work".to_string()],
			suggested_tags: Vec::new(),
			created_at: datetime!(2026-01-02 03:04:05 UTC),
			updated_at: datetime!(2026-01-02 03:04:06 UTC),
		};
		let value = serde_json::to_value(&note).expect("serialize");

		assert_eq!(value["created_at"], "2026-01-02T03:04:05Z");
		assert_eq!(value["updated_at"], "2026-01-02T03:04:06Z");
		assert!(value["summary"].is_null());
		assert!(value.get("owner_id").is_none());

		let back: NoteResponse = serde_json::from_value(value).expect("deserialize");

		assert_eq!(back, note);
	}
}
