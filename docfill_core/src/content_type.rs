use std::fmt;

use serde::Deserialize;
use serde::Serialize;

/// Advisory syntax classification of a document.
///
/// The classification is derived from document content (or an extension
/// hint) and is only ever used to pick a syntax mode and an export MIME
/// type. It is recomputed on every edit and never stored authoritatively.
#[derive(Debug, Clone, Copy, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
	Html,
	Markdown,
	#[default]
	Text,
	Pdf,
}

impl ContentType {
	/// Initial classification hint taken from a filename extension. Content
	/// sniffing via [`classify`] may override this afterwards.
	pub fn from_extension(extension: &str) -> Self {
		match extension.to_lowercase().as_str() {
			"md" | "markdown" => Self::Markdown,
			"html" | "htm" => Self::Html,
			"pdf" => Self::Pdf,
			_ => Self::Text,
		}
	}
}

impl fmt::Display for ContentType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			Self::Html => "html",
			Self::Markdown => "markdown",
			Self::Text => "text",
			Self::Pdf => "pdf",
		};
		write!(f, "{name}")
	}
}

/// Classify a document by content sniffing.
///
/// First match wins, evaluated in a fixed order: HTML markers, then
/// markdown markers, then the PDF magic prefix, then plain text. The
/// heuristic is intentionally crude — a stray `#` in prose classifies as
/// markdown — and that is accepted behavior. Total over all strings; the
/// empty string is [`ContentType::Text`].
pub fn classify(text: &str) -> ContentType {
	if text.contains("<!DOCTYPE html>") || text.contains("<html") {
		ContentType::Html
	} else if text.contains('#') || text.contains("**") {
		ContentType::Markdown
	} else if text.contains("%PDF-") {
		ContentType::Pdf
	} else {
		ContentType::Text
	}
}

/// Select the export MIME type for a document extension.
///
/// Mirrors the export rules: `html`/`htm` exports as `text/html`, `doc`
/// as `application/msword`, and everything else (including `docx`) falls
/// back to `text/plain`. JSON data exports use [`JSON_MIME_TYPE`].
pub fn mime_for_extension(extension: &str) -> &'static str {
	match extension.to_lowercase().as_str() {
		"html" | "htm" => "text/html",
		"doc" => "application/msword",
		_ => "text/plain",
	}
}

/// MIME type for exported JSON data files.
pub const JSON_MIME_TYPE: &str = "application/json";
