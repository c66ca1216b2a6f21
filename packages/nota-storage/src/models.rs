use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, sqlx::FromRow)]
pub struct Note {
	pub note_id: Uuid,
	pub owner_id: String,
	pub title: String,
	pub content: String,
	pub summary: Option<String>,
	pub tags: Vec<String>,
	pub suggested_tags: Vec<String>,
	pub created_at: OffsetDateTime,
	pub updated_at: OffsetDateTime,
}
