//! Query shapes understood by every [`crate::NoteStore`] implementation.

/// Conditions a note must satisfy to be listed. The owner predicate is not optional.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NoteFilter {
	owner_id: String,
	text: Option<TextQuery>,
	tags_any: Vec<String>,
}
impl NoteFilter {
	pub fn for_owner(owner_id: impl Into<String>) -> Self {
		Self { owner_id: owner_id.into(), text: None, tags_any: Vec::new() }
	}

	pub fn with_text(mut self, text: TextQuery) -> Self {
		self.text = Some(text);

		self
	}

	/// A note matches when it carries at least one of `tags`. An empty set disables the predicate.
	pub fn with_tags_any(mut self, tags: Vec<String>) -> Self {
		self.tags_any = tags;

		self
	}

	pub fn owner_id(&self) -> &str {
		&self.owner_id
	}

	pub fn text(&self) -> Option<&TextQuery> {
		self.text.as_ref()
	}

	pub fn tags_any(&self) -> &[String] {
		&self.tags_any
	}
}

/// Free-text search over title, content, and tags.
///
/// Terms are OR-ed: a note matches when any term occurs in any indexed field. A query whose input
/// produced no terms matches nothing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextQuery {
	terms: Vec<String>,
}
impl TextQuery {
	/// Returns `None` for blank input, which callers treat as "no text predicate".
	pub fn parse(raw: &str) -> Option<Self> {
		if raw.trim().is_empty() {
			return None;
		}

		let mut terms = Vec::new();

		for term in tokenize(raw) {
			if !terms.contains(&term) {
				terms.push(term);
			}
		}

		Some(Self { terms })
	}

	pub fn terms(&self) -> &[String] {
		&self.terms
	}

	/// Renders the terms as a Postgres `to_tsquery` disjunction. Terms only contain alphanumeric
	/// characters, so no tsquery operators can leak in from user input.
	pub fn to_tsquery(&self) -> String {
		self.terms.join(" | ")
	}

	pub fn matches(&self, title: &str, content: &str, tags: &[String]) -> bool {
		let document = tokenize(title)
			.chain(tokenize(content))
			.chain(tags.iter().flat_map(|tag| tokenize(tag)))
			.collect::<Vec<_>>();

		self.terms.iter().any(|term| document.contains(term))
	}
}

/// Skip/limit window over a sorted result set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageWindow {
	pub skip: u64,
	pub limit: u64,
}

/// Lowercased alphanumeric runs of `text`.
pub fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
	text.split(|c: char| !c.is_alphanumeric())
		.filter(|word| !word.is_empty())
		.map(str::to_lowercase)
}
