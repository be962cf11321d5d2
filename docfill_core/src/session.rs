use crate::content_type::ContentType;
use crate::content_type::JSON_MIME_TYPE;
use crate::content_type::classify;
use crate::content_type::mime_for_extension;
use crate::data::DataMapping;
use crate::engine::substitute;

/// Default export filename stem.
pub const DEFAULT_STEM: &str = "document";
/// Default document extension when none was imported.
pub const DEFAULT_EXTENSION: &str = "txt";

const SAMPLE_DOCUMENT: &str = "Hello {name},\n\nThank you for your interest in working at \
                               {company}. We're excited about your application for the {position} \
                               role.\n\nWe'll contact you at {email} with further information \
                               about the next steps.\n\nRegards,\nThe HR Team";

fn sample_mapping() -> DataMapping {
	DataMapping::from_pairs([
		("name", "Kir"),
		("company", "Acme Inc."),
		("position", "Developer"),
		("email", "kir@example.com"),
	])
}

/// Outcome of a data (JSON) import. Malformed input is recovered
/// locally, never an error: the raw text is preserved and editing
/// continues.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum DataImport {
	/// The file parsed as a JSON object and replaced the mapping.
	Parsed,
	/// The file did not parse; its exact text is preserved and will
	/// round-trip through export unchanged.
	PreservedRaw,
	/// The ticket was stale; the session is unchanged.
	Superseded,
}

/// Outcome of a document import.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum DocumentImport {
	/// The file was loaded as editable text.
	Loaded,
	/// The file was accepted but is opaque (PDF or non-UTF-8 content);
	/// editing is disabled, export still works.
	OpaqueBinary,
	/// The ticket was stale; the session is unchanged.
	Superseded,
}

/// A ticket capturing the session revision at the moment a file read
/// started. File reads are the one asynchronous boundary: a read that
/// resolves after a newer transition must be discarded rather than
/// overwrite newer state, so the `*_with` import variants reject tickets
/// taken before any intervening transition.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[must_use]
pub struct ImportTicket {
	revision: u64,
}

/// Which document text an export carries.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ExportMode {
	/// The raw template, placeholders intact.
	Template,
	/// The fully substituted preview.
	Rendered,
}

/// A file produced by an export operation.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Export {
	pub filename: String,
	pub mime_type: &'static str,
	pub contents: String,
}

/// One editing session: a document template paired with a data mapping.
///
/// All state lives here and every operation is an explicit transition on
/// `&mut self`; nothing is shared across sessions. The content type is
/// advisory, memoized on the session, and recomputed only when the
/// document changes.
#[derive(Debug, Clone)]
pub struct Session {
	document: String,
	data: DataMapping,
	content_type: ContentType,
	extension: String,
	stem: String,
	editable: bool,
	revision: u64,
}

impl Default for Session {
	fn default() -> Self {
		Self::new()
	}
}

impl Session {
	/// A fresh session holding the sample letter template and sample
	/// mapping.
	pub fn new() -> Self {
		Self {
			document: SAMPLE_DOCUMENT.to_string(),
			data: sample_mapping(),
			content_type: classify(SAMPLE_DOCUMENT),
			extension: DEFAULT_EXTENSION.to_string(),
			stem: DEFAULT_STEM.to_string(),
			editable: true,
			revision: 0,
		}
	}

	pub fn document(&self) -> &str {
		&self.document
	}

	pub fn data(&self) -> &DataMapping {
		&self.data
	}

	pub fn content_type(&self) -> ContentType {
		self.content_type
	}

	/// The extension used for document exports, taken from the last
	/// document import.
	pub fn extension(&self) -> &str {
		&self.extension
	}

	pub fn stem(&self) -> &str {
		&self.stem
	}

	/// False when the current document came from an opaque binary import.
	pub fn is_editable(&self) -> bool {
		self.editable
	}

	/// Monotonically increasing revision, bumped on every transition.
	pub fn revision(&self) -> u64 {
		self.revision
	}

	/// Capture the current revision before starting a file read.
	pub fn begin_import(&self) -> ImportTicket {
		ImportTicket {
			revision: self.revision,
		}
	}

	/// Replace the document text with an explicit edit and reclassify.
	pub fn edit_document(&mut self, text: impl Into<String>) {
		self.document = text.into();
		self.content_type = self.sniff();
		self.bump();
	}

	/// Replace the mapping from an explicit edit of the JSON pane. An
	/// edit that does not parse is preserved verbatim, so nothing the
	/// user typed is lost.
	pub fn edit_data(&mut self, text: &str) {
		self.data = DataMapping::parse(text);
		self.bump();
	}

	/// Import a JSON data file.
	pub fn import_data(&mut self, bytes: &[u8]) -> DataImport {
		self.apply_data_import(bytes)
	}

	/// Import a JSON data file, discarding the result when the ticket
	/// predates a newer transition.
	pub fn import_data_with(&mut self, ticket: ImportTicket, bytes: &[u8]) -> DataImport {
		if ticket.revision != self.revision {
			tracing::debug!(
				ticket = ticket.revision,
				current = self.revision,
				"discarding superseded data import"
			);
			return DataImport::Superseded;
		}
		self.apply_data_import(bytes)
	}

	/// Import a document file. The filename extension becomes the export
	/// extension and the initial content-type hint; content sniffing
	/// overrides the hint when it detects a concrete syntax.
	pub fn import_document(&mut self, bytes: &[u8], filename: &str) -> DocumentImport {
		self.apply_document_import(bytes, filename)
	}

	/// Import a document file, discarding the result when the ticket
	/// predates a newer transition.
	pub fn import_document_with(
		&mut self,
		ticket: ImportTicket,
		bytes: &[u8],
		filename: &str,
	) -> DocumentImport {
		if ticket.revision != self.revision {
			tracing::debug!(
				ticket = ticket.revision,
				current = self.revision,
				"discarding superseded document import"
			);
			return DocumentImport::Superseded;
		}
		self.apply_document_import(bytes, filename)
	}

	/// Rename the export filename stem.
	pub fn set_stem(&mut self, stem: impl Into<String>) {
		self.stem = stem.into();
		self.bump();
	}

	/// The substituted preview of the current document.
	pub fn render(&self) -> String {
		substitute(&self.document, &self.data)
	}

	/// Produce the document export: `<stem>.<extension>` with the MIME
	/// type selected by the extension, carrying either the raw template
	/// or the substituted text.
	pub fn export_document(&self, mode: ExportMode) -> Export {
		let contents = match mode {
			ExportMode::Template => self.document.clone(),
			ExportMode::Rendered => self.render(),
		};
		Export {
			filename: format!("{}.{}", self.stem, self.extension),
			mime_type: mime_for_extension(&self.extension),
			contents,
		}
	}

	/// Produce the data export: `<stem>.json` with pretty-printed JSON,
	/// or the preserved raw text when the mapping is in the invalid
	/// state.
	pub fn export_data(&self) -> Export {
		Export {
			filename: format!("{}.json", self.stem),
			mime_type: JSON_MIME_TYPE,
			contents: self.data.to_json_text(),
		}
	}

	fn apply_data_import(&mut self, bytes: &[u8]) -> DataImport {
		let text = String::from_utf8_lossy(bytes);
		self.data = DataMapping::parse(&text);
		self.bump();
		if self.data.is_valid() {
			DataImport::Parsed
		} else {
			DataImport::PreservedRaw
		}
	}

	fn apply_document_import(&mut self, bytes: &[u8], filename: &str) -> DocumentImport {
		self.extension = extension_of(filename);

		let (text, utf8) = match std::str::from_utf8(bytes) {
			Ok(text) => (text.to_string(), true),
			Err(_) => (String::from_utf8_lossy(bytes).into_owned(), false),
		};

		self.document = text;
		self.editable = utf8 && self.extension != "pdf";
		self.content_type = self.sniff();
		self.bump();

		if self.editable {
			DocumentImport::Loaded
		} else {
			DocumentImport::OpaqueBinary
		}
	}

	/// Sniff the document content, falling back to the extension hint
	/// when sniffing is inconclusive (plain text).
	fn sniff(&self) -> ContentType {
		match classify(&self.document) {
			ContentType::Text => ContentType::from_extension(&self.extension),
			detected => detected,
		}
	}

	fn bump(&mut self) {
		self.revision += 1;
	}
}

/// The lowercased text after the last `.` of a filename, or the default
/// extension when the filename has no usable suffix.
fn extension_of(filename: &str) -> String {
	match filename.rsplit_once('.') {
		Some((_, suffix)) if !suffix.is_empty() => suffix.to_lowercase(),
		_ => DEFAULT_EXTENSION.to_string(),
	}
}
