use std::sync::{
	Mutex, MutexGuard,
	atomic::{AtomicBool, AtomicUsize, Ordering},
};

use uuid::Uuid;

use nota_storage::{
	BoxFuture, Error, NoteStore, Result,
	filter::{NoteFilter, PageWindow},
	models::Note,
};

/// In-process [`NoteStore`] with the same owner scoping, matching, and ordering rules as the
/// Postgres store. Text search matches whole lowercased words without stemming.
#[derive(Default)]
pub struct MemoryNoteStore {
	notes: Mutex<Vec<Note>>,
	reads: AtomicUsize,
	writes: AtomicUsize,
	unavailable: AtomicBool,
}
impl MemoryNoteStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of store calls that read notes.
	pub fn read_count(&self) -> usize {
		self.reads.load(Ordering::SeqCst)
	}

	/// Number of insert, save, and delete calls, successful or not.
	pub fn write_count(&self) -> usize {
		self.writes.load(Ordering::SeqCst)
	}

	/// While set, every call fails the way a lost database connection would.
	pub fn set_unavailable(&self, unavailable: bool) {
		self.unavailable.store(unavailable, Ordering::SeqCst);
	}

	/// Every stored note regardless of owner, in insertion order.
	pub fn snapshot(&self) -> Vec<Note> {
		self.lock().clone()
	}

	fn lock(&self) -> MutexGuard<'_, Vec<Note>> {
		self.notes.lock().unwrap_or_else(|err| err.into_inner())
	}

	fn check_available(&self) -> Result<()> {
		if self.unavailable.load(Ordering::SeqCst) {
			return Err(Error::Sqlx(sqlx::Error::PoolClosed));
		}

		Ok(())
	}

	fn read(&self) -> Result<MutexGuard<'_, Vec<Note>>> {
		self.reads.fetch_add(1, Ordering::SeqCst);
		self.check_available()?;

		Ok(self.lock())
	}

	fn write(&self) -> Result<MutexGuard<'_, Vec<Note>>> {
		self.writes.fetch_add(1, Ordering::SeqCst);
		self.check_available()?;

		Ok(self.lock())
	}
}

impl NoteStore for MemoryNoteStore {
	fn find_note<'a>(
		&'a self,
		owner_id: &'a str,
		note_id: Uuid,
	) -> BoxFuture<'a, Result<Option<Note>>> {
		let result = self.read().map(|notes| {
			notes.iter().find(|note| note.note_id == note_id && note.owner_id == owner_id).cloned()
		});

		Box::pin(async move { result })
	}

	fn find_notes<'a>(
		&'a self,
		filter: &'a NoteFilter,
		window: PageWindow,
	) -> BoxFuture<'a, Result<Vec<Note>>> {
		let result = self.read().map(|notes| {
			let mut matched =
				notes.iter().filter(|note| matches_filter(note, filter)).cloned().collect::<Vec<_>>();

			matched.sort_by(|a, b| {
				b.updated_at.cmp(&a.updated_at).then_with(|| b.note_id.cmp(&a.note_id))
			});

			matched
				.into_iter()
				.skip(usize::try_from(window.skip).unwrap_or(usize::MAX))
				.take(usize::try_from(window.limit).unwrap_or(usize::MAX))
				.collect()
		});

		Box::pin(async move { result })
	}

	fn count_notes<'a>(&'a self, filter: &'a NoteFilter) -> BoxFuture<'a, Result<u64>> {
		let result = self
			.read()
			.map(|notes| notes.iter().filter(|note| matches_filter(note, filter)).count() as u64);

		Box::pin(async move { result })
	}

	fn insert_note<'a>(&'a self, note: &'a Note) -> BoxFuture<'a, Result<()>> {
		let result = self.write().and_then(|mut notes| {
			if notes.iter().any(|existing| existing.note_id == note.note_id) {
				return Err(Error::InvalidArgument(format!("Duplicate note_id {}.", note.note_id)));
			}

			notes.push(note.clone());

			Ok(())
		});

		Box::pin(async move { result })
	}

	fn save_note<'a>(&'a self, note: &'a Note) -> BoxFuture<'a, Result<bool>> {
		let result = self.write().map(|mut notes| {
			let Some(existing) = notes
				.iter_mut()
				.find(|existing| existing.note_id == note.note_id && existing.owner_id == note.owner_id)
			else {
				return false;
			};

			existing.title = note.title.clone();
			existing.content = note.content.clone();
			existing.summary = note.summary.clone();
			existing.tags = note.tags.clone();
			existing.suggested_tags = note.suggested_tags.clone();
			existing.updated_at = note.updated_at;

			true
		});

		Box::pin(async move { result })
	}

	fn delete_note<'a>(&'a self, owner_id: &'a str, note_id: Uuid) -> BoxFuture<'a, Result<bool>> {
		let result = self.write().map(|mut notes| {
			let before = notes.len();

			notes.retain(|note| !(note.note_id == note_id && note.owner_id == owner_id));

			notes.len() != before
		});

		Box::pin(async move { result })
	}
}

fn matches_filter(note: &Note, filter: &NoteFilter) -> bool {
	if note.owner_id != filter.owner_id() {
		return false;
	}
	if let Some(text) = filter.text()
		&& !text.matches(&note.title, &note.content, &note.tags)
	{
		return false;
	}
	if !filter.tags_any().is_empty() && !note.tags.iter().any(|tag| filter.tags_any().contains(tag))
	{
		return false;
	}

	true
}
