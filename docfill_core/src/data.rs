use serde_json::Map;
use serde_json::Value;

/// The key→value mapping driving placeholder substitution.
///
/// A mapping is either a parsed JSON object, or the literal text of an
/// edit that failed to parse. The invalid text is carried as its own
/// variant rather than as a sentinel key mixed into the mapping, so a
/// reserved name can never collide with a legitimate placeholder key,
/// and no user edit is ever lost: the raw text takes precedence for
/// display and export until it parses again.
#[derive(Debug, Clone, PartialEq)]
pub enum DataMapping {
	/// A successfully parsed JSON object. Keys are unique; iteration
	/// order does not affect substitution, which is keyed by name.
	Valid(Map<String, Value>),
	/// Syntactically invalid (or non-object) JSON text, preserved
	/// verbatim.
	Invalid { raw: String },
}

impl Default for DataMapping {
	fn default() -> Self {
		Self::Valid(Map::new())
	}
}

impl DataMapping {
	/// Parse JSON text into a mapping. Total: a parse failure, or a JSON
	/// document whose top level is not an object, preserves the exact
	/// input text as [`DataMapping::Invalid`] instead of erroring.
	/// Substitution keys are names, so only an object can back them.
	pub fn parse(text: &str) -> Self {
		match serde_json::from_str::<Value>(text) {
			Ok(Value::Object(map)) => Self::Valid(map),
			Ok(other) => {
				tracing::debug!(kind = %json_kind(&other), "top-level JSON is not an object, preserving raw text");
				Self::Invalid { raw: text.to_string() }
			}
			Err(error) => {
				tracing::debug!(%error, "invalid JSON edit preserved as raw text");
				Self::Invalid { raw: text.to_string() }
			}
		}
	}

	/// Build a mapping from key/value pairs.
	pub fn from_pairs<K, V, I>(pairs: I) -> Self
	where
		K: Into<String>,
		V: Into<Value>,
		I: IntoIterator<Item = (K, V)>,
	{
		Self::Valid(
			pairs
				.into_iter()
				.map(|(key, value)| (key.into(), value.into()))
				.collect(),
		)
	}

	/// Look up a value by placeholder key. Always `None` for an invalid
	/// mapping.
	pub fn get(&self, key: &str) -> Option<&Value> {
		match self {
			Self::Valid(map) => map.get(key),
			Self::Invalid { .. } => None,
		}
	}

	/// The keys of the mapping, in iteration order. Empty for an invalid
	/// mapping.
	pub fn keys(&self) -> Vec<&str> {
		match self {
			Self::Valid(map) => map.keys().map(String::as_str).collect(),
			Self::Invalid { .. } => Vec::new(),
		}
	}

	pub fn is_valid(&self) -> bool {
		matches!(self, Self::Valid(_))
	}

	/// The preserved raw text, when the mapping is in the invalid state.
	pub fn raw_text(&self) -> Option<&str> {
		match self {
			Self::Valid(_) => None,
			Self::Invalid { raw } => Some(raw),
		}
	}

	/// Render the mapping as JSON text for display or export: 2-space
	/// pretty-printed JSON for a valid mapping, the preserved text
	/// byte-for-byte for an invalid one.
	pub fn to_json_text(&self) -> String {
		match self {
			Self::Valid(map) => {
				serde_json::to_string_pretty(map).unwrap_or_else(|_| String::from("{}"))
			}
			Self::Invalid { raw } => raw.clone(),
		}
	}
}

fn json_kind(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "boolean",
		Value::Number(_) => "number",
		Value::String(_) => "string",
		Value::Array(_) => "array",
		Value::Object(_) => "object",
	}
}
