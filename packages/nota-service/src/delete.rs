use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{NotaService, Result};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeleteNoteRequest {
	pub owner_id: String,
	pub note_id: Uuid,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteNoteResponse {
	pub note_id: Uuid,
	pub deleted: bool,
}

impl NotaService {
	pub async fn delete_note(&self, req: DeleteNoteRequest) -> Result<DeleteNoteResponse> {
		let owner_id = crate::require_owner(&req.owner_id)?;
		let note = self
			.store
			.find_note(owner_id, req.note_id)
			.await?
			.ok_or_else(crate::note_not_found)?;

		// A concurrent delete may win between the lookup and the removal.
		if !self.store.delete_note(owner_id, note.note_id).await? {
			return Err(crate::note_not_found());
		}

		tracing::info!(note_id = %note.note_id, "Note deleted.");

		Ok(DeleteNoteResponse { note_id: note.note_id, deleted: true })
	}
}
