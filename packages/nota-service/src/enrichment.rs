//! Summary and tag generation through the configured completion provider.
//!
//! Summaries are best-effort and come back as an [`Enrichment`]. Tag suggestions surface provider
//! failures as errors and leave it to the caller to decide whether to degrade.

use std::{fmt, sync::Arc};

use regex::Regex;
use serde_json::Value;
use uuid::Uuid;

use crate::{CompletionProvider, Result};
use nota_config::LlmProviderConfig;

/// Outcome of a best-effort enrichment step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Enrichment<T> {
	Ready(T),
	Degraded(DegradedReason),
}
impl<T> Enrichment<T> {
	pub fn ready(self) -> Option<T> {
		match self {
			Self::Ready(value) => Some(value),
			Self::Degraded(_) => None,
		}
	}

	pub fn is_degraded(&self) -> bool {
		matches!(self, Self::Degraded(_))
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DegradedReason {
	/// The provider was unreachable, answered with an error status, or sent an unusable envelope.
	Provider { message: String },
	/// The provider answered with nothing but whitespace.
	EmptyReply,
}
impl fmt::Display for DegradedReason {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Provider { message } => write!(f, "provider failure: {message}"),
			Self::EmptyReply => write!(f, "empty reply"),
		}
	}
}

#[derive(Clone)]
pub struct Enricher {
	provider: Arc<dyn CompletionProvider>,
	cfg: LlmProviderConfig,
	max_tags: usize,
}
impl Enricher {
	pub fn new(provider: Arc<dyn CompletionProvider>, cfg: LlmProviderConfig, max_tags: u32) -> Self {
		Self { provider, cfg, max_tags: max_tags.max(1) as usize }
	}

	/// Asks for a two to three sentence summary of note `note_id`'s `text`. Never fails; a degraded
	/// outcome is logged against the note.
	pub async fn summarize(&self, note_id: Uuid, text: &str) -> Enrichment<String> {
		let prompt = summary_prompt(text);
		let outcome = match self.provider.complete(&self.cfg, &prompt).await {
			Ok(reply) => parse_summary_reply(&reply),
			Err(err) => Enrichment::Degraded(DegradedReason::Provider { message: err.to_string() }),
		};

		if let Enrichment::Degraded(reason) = &outcome {
			tracing::warn!(
				%note_id,
				provider = %self.cfg.provider_id,
				%reason,
				"Summary generation degraded."
			);
		}

		outcome
	}

	/// Asks for three to five topical tags for `text`.
	///
	/// Provider failures are returned as [`crate::Error::Enrichment`]. A reply that cannot be read as
	/// a tag list yields an empty list.
	pub async fn suggest_tags(&self, text: &str) -> Result<Vec<String>> {
		let prompt = tags_prompt(text);
		let reply = self.provider.complete(&self.cfg, &prompt).await?;
		let mut tags = parse_tag_reply(&reply);

		tags.truncate(self.max_tags);

		Ok(tags)
	}
}

fn summary_prompt(text: &str) -> String {
	format!(
		"Please generate a concise summary (maximum 2-3 sentences) of the following note content:\n\n\
		{text}\n\n\
		Provide only the summary without any additional text or explanation."
	)
}

fn tags_prompt(text: &str) -> String {
	format!(
		"Please analyze the following note content and suggest 3-5 relevant tags that categorize \
		the main topics.\n\
		Return only a JSON array of tags without any additional text or explanation.\n\n\
		Note Content:\n{text}\n\n\
		Expected format:\n[\"tag1\", \"tag2\", \"tag3\"]"
	)
}

fn parse_summary_reply(reply: &str) -> Enrichment<String> {
	let summary = reply.trim();

	if summary.is_empty() {
		return Enrichment::Degraded(DegradedReason::EmptyReply);
	}

	Enrichment::Ready(summary.to_string())
}

/// Reads a JSON array of strings, falling back to every double-quoted run in the raw reply.
///
/// A reply that is valid JSON but not an array yields nothing.
pub fn parse_tag_reply(reply: &str) -> Vec<String> {
	let raw_tags = match serde_json::from_str::<Value>(reply.trim()) {
		Ok(Value::Array(items)) =>
			items.iter().filter_map(|item| item.as_str().map(str::to_string)).collect(),
		Ok(_) => Vec::new(),
		Err(_) => quoted_substrings(reply),
	};

	normalize_tags(raw_tags)
}

/// Trims, drops blanks, and removes repeats while keeping first-seen order.
pub fn normalize_tags(tags: Vec<String>) -> Vec<String> {
	let mut out: Vec<String> = Vec::with_capacity(tags.len());

	for tag in tags {
		let trimmed = tag.trim();

		if trimmed.is_empty() || out.iter().any(|seen| seen == trimmed) {
			continue;
		}

		out.push(trimmed.to_string());
	}

	out
}

fn quoted_substrings(reply: &str) -> Vec<String> {
	Regex::new(r#""([^"]+)""#)
		.map(|re| re.captures_iter(reply).map(|caps| caps[1].to_string()).collect())
		.unwrap_or_default()
}
