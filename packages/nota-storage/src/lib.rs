pub mod db;
pub mod filter;
pub mod models;
pub mod notes;
pub mod schema;

mod error;

pub use error::Error;

use std::{future::Future, pin::Pin};

use uuid::Uuid;

use crate::{
	filter::{NoteFilter, PageWindow},
	models::Note,
};

pub type Result<T, E = Error> = std::result::Result<T, E>;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Owner-scoped persistence for notes.
///
/// Every method takes the requesting owner and must apply it inside the query itself. A note that
/// belongs to someone else behaves exactly like a note that does not exist.
pub trait NoteStore
where
	Self: Send + Sync,
{
	fn find_note<'a>(&'a self, owner_id: &'a str, note_id: Uuid)
	-> BoxFuture<'a, Result<Option<Note>>>;

	/// Matching notes, most recently updated first, restricted to `window`.
	fn find_notes<'a>(
		&'a self,
		filter: &'a NoteFilter,
		window: PageWindow,
	) -> BoxFuture<'a, Result<Vec<Note>>>;

	fn count_notes<'a>(&'a self, filter: &'a NoteFilter) -> BoxFuture<'a, Result<u64>>;

	fn insert_note<'a>(&'a self, note: &'a Note) -> BoxFuture<'a, Result<()>>;

	/// Overwrites the mutable fields of an existing note. Returns `false` when no note with this id
	/// exists for `note.owner_id`.
	fn save_note<'a>(&'a self, note: &'a Note) -> BoxFuture<'a, Result<bool>>;

	/// Returns `false` when nothing was removed.
	fn delete_note<'a>(&'a self, owner_id: &'a str, note_id: Uuid) -> BoxFuture<'a, Result<bool>>;
}
