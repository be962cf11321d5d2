use logos::Logos;
use serde::Serialize;
use serde_json::Value;

use crate::data::DataMapping;

/// Raw tokens produced by logos for a single flat pass over document
/// text. The three patterns are total over all input: every byte is part
/// of a placeholder, a stray opening brace, or a literal text run.
#[derive(Logos, Debug, PartialEq)]
enum RawToken {
	/// `{` + one-or-more non-`}` characters + `}`. The shortest span
	/// between an opening brace and the next closing brace; nested or
	/// malformed braces get no special handling.
	#[regex(r"\{[^}]+\}")]
	Placeholder,

	/// An opening brace that does not start a placeholder (e.g. `{}` or a
	/// `{` with no closing brace before end of input).
	#[token("{")]
	OpenBrace,

	/// A literal run of text up to the next opening brace.
	#[regex(r"[^{]+")]
	Text,
}

/// A placeholder occurrence in document text.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct Placeholder {
	/// The inner lookup key (text between the braces).
	pub key: String,
	/// Byte offset of the opening brace.
	pub start: usize,
	/// Byte offset just past the closing brace.
	pub end: usize,
	/// 1-indexed line of the opening brace.
	pub line: usize,
	/// 1-indexed column of the opening brace.
	pub column: usize,
}

/// Replace every `{key}` placeholder in `text` with its value from
/// `mapping`, leaving unmatched placeholders byte-for-byte unchanged.
///
/// Single left-to-right pass: a substituted value that itself contains
/// `{otherKey}` is not re-expanded, so substitution never loops to a
/// fixed point and is idempotent on text without further placeholders.
/// Total over all inputs; with an empty mapping this is the identity on
/// placeholder-free text.
pub fn substitute(text: &str, mapping: &DataMapping) -> String {
	let mut lexer = RawToken::lexer(text);
	let mut output = String::with_capacity(text.len());

	while let Some(token) = lexer.next() {
		let slice = lexer.slice();
		match token {
			Ok(RawToken::Placeholder) => {
				let key = &slice[1..slice.len() - 1];
				match mapping.get(key) {
					Some(value) => output.push_str(&display_value(value)),
					None => output.push_str(slice),
				}
			}
			_ => output.push_str(slice),
		}
	}

	output
}

/// Coerce a JSON value to the display string spliced into the document.
///
/// Strings are inserted verbatim (no surrounding quotes), numbers and
/// booleans use their canonical textual form, `null` becomes the literal
/// text `null`, and objects and arrays are inserted as structural JSON
/// text.
pub fn display_value(value: &Value) -> String {
	match value {
		Value::String(text) => text.clone(),
		Value::Null => String::from("null"),
		Value::Bool(flag) => flag.to_string(),
		Value::Number(number) => number.to_string(),
		structural => serde_json::to_string(structural).unwrap_or_default(),
	}
}

/// List every placeholder occurrence in `text`, in document order, with
/// byte spans and 1-indexed line/column positions.
pub fn placeholders(text: &str) -> Vec<Placeholder> {
	let mut lexer = RawToken::lexer(text);
	let mut found = Vec::new();
	let mut line = 1;
	let mut column = 1;

	while let Some(token) = lexer.next() {
		let slice = lexer.slice();
		let span = lexer.span();

		if matches!(token, Ok(RawToken::Placeholder)) {
			found.push(Placeholder {
				key: slice[1..slice.len() - 1].to_string(),
				start: span.start,
				end: span.end,
				line,
				column,
			});
		}

		for ch in slice.chars() {
			if ch == '\n' {
				line += 1;
				column = 1;
			} else {
				column += 1;
			}
		}
	}

	found
}

/// The distinct placeholder keys in `text` that have no value in
/// `mapping`, sorted. Purely advisory: unmatched placeholders are left
/// in place by [`substitute`], never an error.
pub fn missing_keys(text: &str, mapping: &DataMapping) -> Vec<String> {
	let mut missing: Vec<String> = placeholders(text)
		.into_iter()
		.map(|placeholder| placeholder.key)
		.filter(|key| mapping.get(key).is_none())
		.collect();
	missing.sort();
	missing.dedup();
	missing
}
