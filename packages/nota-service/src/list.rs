use serde::{Deserialize, Serialize};

use crate::{ListPlan, NotaService, NoteResponse, Pagination, Result};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ListNotesRequest {
	pub owner_id: String,
	pub tags: Vec<String>,
	pub page: Option<i64>,
	pub limit: Option<i64>,
}

/// Like [`ListNotesRequest`] with a free-text query over title, content, and tags.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SearchNotesRequest {
	pub owner_id: String,
	pub query: Option<String>,
	pub tags: Vec<String>,
	pub page: Option<i64>,
	pub limit: Option<i64>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NotePage {
	pub data: Vec<NoteResponse>,
	pub pagination: Pagination,
}

impl NotaService {
	pub async fn list_notes(&self, req: ListNotesRequest) -> Result<NotePage> {
		let owner_id = crate::require_owner(&req.owner_id)?;
		let plan = ListPlan::build(&self.cfg.notes, owner_id, None, req.tags, req.page, req.limit);

		self.run_plan(plan).await
	}

	pub async fn search_notes(&self, req: SearchNotesRequest) -> Result<NotePage> {
		let owner_id = crate::require_owner(&req.owner_id)?;
		let plan = ListPlan::build(
			&self.cfg.notes,
			owner_id,
			req.query.as_deref(),
			req.tags,
			req.page,
			req.limit,
		);

		self.run_plan(plan).await
	}

	async fn run_plan(&self, plan: ListPlan) -> Result<NotePage> {
		let notes = self.store.find_notes(&plan.filter, plan.window).await?;
		let total = self.store.count_notes(&plan.filter).await?;

		tracing::debug!(
			page = plan.page,
			limit = plan.limit,
			returned = notes.len(),
			total,
			"Notes listed."
		);

		Ok(NotePage {
			data: notes.into_iter().map(NoteResponse::from).collect(),
			pagination: plan.pagination(total),
		})
	}
}
