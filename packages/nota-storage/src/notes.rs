use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
	BoxFuture, NoteStore, Result,
	db::Db,
	filter::{NoteFilter, PageWindow},
	models::Note,
};

const NOTE_COLUMNS: &str = "note_id, owner_id, title, content, summary, tags, suggested_tags, \
	created_at, updated_at";
const SEARCH_DOCUMENT_SQL: &str =
	"to_tsvector('english', $3 || ' ' || $4 || ' ' || array_to_string($6::text[], ' '))";

impl Db {
	pub async fn find_note(&self, owner_id: &str, note_id: Uuid) -> Result<Option<Note>> {
		let sql = format!("SELECT {NOTE_COLUMNS} FROM notes WHERE note_id = $1 AND owner_id = $2");
		let note = sqlx::query_as::<_, Note>(&sql)
			.bind(note_id)
			.bind(owner_id)
			.fetch_optional(&self.pool)
			.await?;

		Ok(note)
	}

	pub async fn find_notes(&self, filter: &NoteFilter, window: PageWindow) -> Result<Vec<Note>> {
		let skip = clamp_to_bigint(window.skip);
		let limit = clamp_to_bigint(window.limit);
		let mut builder = QueryBuilder::<Postgres>::new(format!("SELECT {NOTE_COLUMNS} FROM notes"));

		push_filter(&mut builder, filter);

		builder.push(" ORDER BY updated_at DESC, note_id DESC OFFSET ");
		builder.push_bind(skip);
		builder.push(" LIMIT ");
		builder.push_bind(limit);

		let notes = builder.build_query_as::<Note>().fetch_all(&self.pool).await?;

		Ok(notes)
	}

	pub async fn count_notes(&self, filter: &NoteFilter) -> Result<u64> {
		let mut builder = QueryBuilder::<Postgres>::new("SELECT count(*) FROM notes");

		push_filter(&mut builder, filter);

		let count = builder.build_query_scalar::<i64>().fetch_one(&self.pool).await?;

		Ok(count.max(0) as u64)
	}

	pub async fn insert_note(&self, note: &Note) -> Result<()> {
		let sql = format!(
			"\
INSERT INTO notes (
	note_id,
	owner_id,
	title,
	content,
	summary,
	tags,
	suggested_tags,
	created_at,
	updated_at,
	search_document
)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, {SEARCH_DOCUMENT_SQL})"
		);

		sqlx::query(&sql)
			.bind(note.note_id)
			.bind(note.owner_id.as_str())
			.bind(note.title.as_str())
			.bind(note.content.as_str())
			.bind(note.summary.as_deref())
			.bind(&note.tags)
			.bind(&note.suggested_tags)
			.bind(note.created_at)
			.bind(note.updated_at)
			.execute(&self.pool)
			.await?;

		Ok(())
	}

	pub async fn save_note(&self, note: &Note) -> Result<bool> {
		let sql = format!(
			"\
UPDATE notes
SET
	title = $3,
	content = $4,
	summary = $5,
	tags = $6,
	suggested_tags = $7,
	updated_at = $8,
	search_document = {SEARCH_DOCUMENT_SQL}
WHERE note_id = $1 AND owner_id = $2"
		);
		let result = sqlx::query(&sql)
			.bind(note.note_id)
			.bind(note.owner_id.as_str())
			.bind(note.title.as_str())
			.bind(note.content.as_str())
			.bind(note.summary.as_deref())
			.bind(&note.tags)
			.bind(&note.suggested_tags)
			.bind(note.updated_at)
			.execute(&self.pool)
			.await?;

		Ok(result.rows_affected() > 0)
	}

	pub async fn delete_note(&self, owner_id: &str, note_id: Uuid) -> Result<bool> {
		let result = sqlx::query("DELETE FROM notes WHERE note_id = $1 AND owner_id = $2")
			.bind(note_id)
			.bind(owner_id)
			.execute(&self.pool)
			.await?;

		Ok(result.rows_affected() > 0)
	}
}

impl NoteStore for Db {
	fn find_note<'a>(
		&'a self,
		owner_id: &'a str,
		note_id: Uuid,
	) -> BoxFuture<'a, Result<Option<Note>>> {
		Box::pin(Db::find_note(self, owner_id, note_id))
	}

	fn find_notes<'a>(
		&'a self,
		filter: &'a NoteFilter,
		window: PageWindow,
	) -> BoxFuture<'a, Result<Vec<Note>>> {
		Box::pin(Db::find_notes(self, filter, window))
	}

	fn count_notes<'a>(&'a self, filter: &'a NoteFilter) -> BoxFuture<'a, Result<u64>> {
		Box::pin(Db::count_notes(self, filter))
	}

	fn insert_note<'a>(&'a self, note: &'a Note) -> BoxFuture<'a, Result<()>> {
		Box::pin(Db::insert_note(self, note))
	}

	fn save_note<'a>(&'a self, note: &'a Note) -> BoxFuture<'a, Result<bool>> {
		Box::pin(Db::save_note(self, note))
	}

	fn delete_note<'a>(&'a self, owner_id: &'a str, note_id: Uuid) -> BoxFuture<'a, Result<bool>> {
		Box::pin(Db::delete_note(self, owner_id, note_id))
	}
}

fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &NoteFilter) {
	builder.push(" WHERE owner_id = ");
	builder.push_bind(filter.owner_id().to_string());

	if let Some(text) = filter.text() {
		if text.terms().is_empty() {
			builder.push(" AND FALSE");
		} else {
			builder.push(" AND search_document @@ to_tsquery('english', ");
			builder.push_bind(text.to_tsquery());
			builder.push(")");
		}
	}
	if !filter.tags_any().is_empty() {
		builder.push(" AND tags && ");
		builder.push_bind(filter.tags_any().to_vec());
		builder.push("::text[]");
	}
}

// OFFSET and LIMIT are bigint. Anything past `i64::MAX` already lies beyond every table.
fn clamp_to_bigint(value: u64) -> i64 {
	i64::try_from(value).unwrap_or(i64::MAX)
}
