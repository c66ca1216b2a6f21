//! Turns caller-supplied listing parameters into a store filter plus page window.

use serde::{Deserialize, Serialize};

use nota_config::Notes;
use nota_storage::filter::{NoteFilter, PageWindow, TextQuery};

use crate::enrichment;

/// Largest skip any store is asked for; Postgres reads OFFSET as a signed bigint.
const MAX_SKIP: u64 = i64::MAX as u64;

/// A resolved listing query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListPlan {
	pub filter: NoteFilter,
	pub window: PageWindow,
	pub page: u64,
	pub limit: u64,
}
impl ListPlan {
	/// `page` and `limit` that are absent or not positive fall back to 1 and the configured default.
	/// `limit` is capped at the configured maximum. A page far past the end keeps its number and
	/// simply selects nothing.
	pub fn build(
		cfg: &Notes,
		owner_id: &str,
		query: Option<&str>,
		tags: Vec<String>,
		page: Option<i64>,
		limit: Option<i64>,
	) -> Self {
		let page = positive(page).unwrap_or(1);
		let default_limit = u64::from(cfg.default_page_limit.max(1));
		let max_limit = u64::from(cfg.max_page_limit.max(1));
		let limit = positive(limit).unwrap_or(default_limit).min(max_limit);
		let skip = (page - 1).saturating_mul(limit).min(MAX_SKIP);
		let mut filter =
			NoteFilter::for_owner(owner_id).with_tags_any(enrichment::normalize_tags(tags));

		if let Some(text) = query.and_then(TextQuery::parse) {
			filter = filter.with_text(text);
		}

		Self { filter, window: PageWindow { skip, limit }, page, limit }
	}

	pub fn pagination(&self, total: u64) -> Pagination {
		Pagination { page: self.page, limit: self.limit, total, pages: total.div_ceil(self.limit) }
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
	pub page: u64,
	pub limit: u64,
	pub total: u64,
	pub pages: u64,
}

/// Lenient numeric parse for query-string parameters. Anything that is not an integer reads as
/// absent.
pub fn parse_page_param(raw: &str) -> Option<i64> {
	raw.trim().parse().ok()
}

fn positive(value: Option<i64>) -> Option<u64> {
	value.filter(|value| *value > 0).map(|value| value as u64)
}
