use serde::{Deserialize, Serialize};

use crate::{NotaService, Result, create};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SuggestTagsRequest {
	pub content: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestTagsResponse {
	pub suggested_tags: Vec<String>,
}

impl NotaService {
	/// Interactive tag suggestion. Unlike the write paths, a provider failure is returned to the
	/// caller as [`crate::Error::Enrichment`]. Nothing is persisted.
	pub async fn suggest_tags(&self, req: SuggestTagsRequest) -> Result<SuggestTagsResponse> {
		let content = create::required_text(req.content.as_deref(), "content")?;
		let suggested_tags = self.enricher().suggest_tags(content).await?;

		Ok(SuggestTagsResponse { suggested_tags })
	}
}
