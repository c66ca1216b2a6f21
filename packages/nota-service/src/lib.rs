pub mod create;
pub mod delete;
pub mod enrichment;
pub mod list;
pub mod notes;
pub mod query;
pub mod suggest;
pub mod update;

mod error;

pub use create::CreateNoteRequest;
pub use delete::{DeleteNoteRequest, DeleteNoteResponse};
pub use enrichment::{DegradedReason, Enricher, Enrichment};
pub use error::{Error, Result};
pub use list::{ListNotesRequest, NotePage, SearchNotesRequest};
pub use notes::{GetNoteRequest, NoteResponse};
pub use query::{ListPlan, Pagination};
pub use suggest::{SuggestTagsRequest, SuggestTagsResponse};
pub use update::UpdateNoteRequest;

use std::{future::Future, pin::Pin, sync::Arc};

use nota_config::{Config, LlmProviderConfig};
use nota_providers::completion;
use nota_storage::NoteStore;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Sends a single prompt to a chat completion endpoint and returns the reply text.
pub trait CompletionProvider
where
	Self: Send + Sync,
{
	fn complete<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		prompt: &'a str,
	) -> BoxFuture<'a, nota_providers::Result<String>>;
}

pub struct NotaService {
	pub cfg: Config,
	pub store: Arc<dyn NoteStore>,
	enricher: Enricher,
}
impl NotaService {
	pub fn new(cfg: Config, store: Arc<dyn NoteStore>) -> Self {
		Self::with_provider(cfg, store, Arc::new(DefaultProvider))
	}

	pub fn with_provider(
		cfg: Config,
		store: Arc<dyn NoteStore>,
		provider: Arc<dyn CompletionProvider>,
	) -> Self {
		let enricher = Enricher::new(
			provider,
			cfg.providers.enrichment.clone(),
			cfg.notes.max_suggested_tags,
		);

		Self { cfg, store, enricher }
	}

	pub fn enricher(&self) -> &Enricher {
		&self.enricher
	}
}

struct DefaultProvider;
impl CompletionProvider for DefaultProvider {
	fn complete<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		prompt: &'a str,
	) -> BoxFuture<'a, nota_providers::Result<String>> {
		Box::pin(completion::complete(cfg, prompt))
	}
}

pub(crate) fn require_owner(owner_id: &str) -> Result<&str> {
	let owner_id = owner_id.trim();

	if owner_id.is_empty() {
		return Err(Error::InvalidRequest { message: "owner_id is required.".to_string() });
	}

	Ok(owner_id)
}

pub(crate) fn note_not_found() -> Error {
	Error::NotFound { message: "Note not found.".to_string() }
}
