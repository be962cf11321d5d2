use rstest::rstest;
use serde_json::json;
use similar_asserts::assert_eq;

use super::*;

fn mapping(value: serde_json::Value) -> DataMapping {
	DataMapping::parse(&value.to_string())
}

// --- Classifier tests ---

#[rstest]
#[case::doctype("<!DOCTYPE html><p>hi</p>", ContentType::Html)]
#[case::html_tag("<html lang=\"en\"><body></body>", ContentType::Html)]
#[case::html_wins_over_markdown("<html><!DOCTYPE html>#", ContentType::Html)]
#[case::heading("# Title\nbody", ContentType::Markdown)]
#[case::bold("some **bold** emphasis", ContentType::Markdown)]
#[case::plain("plain sentence.", ContentType::Text)]
#[case::empty("", ContentType::Text)]
#[case::pdf_magic("%PDF-1.7 stream", ContentType::Pdf)]
#[case::stray_hash_is_markdown("issue #42 is plain prose", ContentType::Markdown)]
fn classify_is_total_and_order_sensitive(#[case] text: &str, #[case] expected: ContentType) {
	assert_eq!(classify(text), expected);
}

#[rstest]
#[case::markdown("md", ContentType::Markdown)]
#[case::markdown_long("markdown", ContentType::Markdown)]
#[case::markdown_uppercase("MD", ContentType::Markdown)]
#[case::html("html", ContentType::Html)]
#[case::htm("htm", ContentType::Html)]
#[case::pdf("pdf", ContentType::Pdf)]
#[case::txt("txt", ContentType::Text)]
#[case::doc("doc", ContentType::Text)]
#[case::docx("docx", ContentType::Text)]
#[case::unknown("xyz", ContentType::Text)]
fn content_type_from_extension(#[case] extension: &str, #[case] expected: ContentType) {
	assert_eq!(ContentType::from_extension(extension), expected);
}

#[rstest]
#[case::html("html", "text/html")]
#[case::htm_uppercase("HTM", "text/html")]
#[case::doc("doc", "application/msword")]
#[case::docx_falls_back("docx", "text/plain")]
#[case::txt("txt", "text/plain")]
#[case::unknown("bin", "text/plain")]
fn mime_selection(#[case] extension: &str, #[case] expected: &str) {
	assert_eq!(mime_for_extension(extension), expected);
}

// --- Templater tests ---

#[test]
fn substitute_replaces_known_keys() {
	let data = mapping(json!({"name": "Kir"}));
	assert_eq!(substitute("Hello {name}", &data), "Hello Kir");
}

#[test]
fn substitute_leaves_unknown_keys_untouched() {
	let data = DataMapping::default();
	assert_eq!(substitute("Hello {missing}", &data), "Hello {missing}");
}

#[test]
fn substitute_coerces_numbers_and_booleans() {
	let data = mapping(json!({"a": 1, "b": true}));
	assert_eq!(substitute("{a}{b}", &data), "1true");
}

#[test]
fn substitute_coerces_null_and_floats() {
	let data = mapping(json!({"n": null, "f": 1.5}));
	assert_eq!(substitute("{n} and {f}", &data), "null and 1.5");
}

#[test]
fn substitute_coerces_structural_values_to_json_text() {
	let data = mapping(json!({"obj": {"x": 1}, "arr": [1, 2]}));
	assert_eq!(substitute("{obj}|{arr}", &data), "{\"x\":1}|[1,2]");
}

#[test]
fn substitute_is_identity_without_placeholders() {
	let data = mapping(json!({"a": "value"}));
	for text in ["", "no braces here", "{}", "a { dangling", "close } only"] {
		assert_eq!(substitute(text, &data), text);
	}
}

#[test]
fn substitute_is_single_pass_not_fixed_point() {
	let data = mapping(json!({"a": "{b}", "b": "deep"}));
	// One pass inserts "{b}" without re-expanding it.
	assert_eq!(substitute("{a}", &data), "{b}");
	// A second explicit pass then resolves it.
	assert_eq!(substitute(&substitute("{a}", &data), &data), "deep");
}

#[test]
fn substitute_matches_shortest_span_to_next_closing_brace() {
	// "{a{b}" is a single placeholder with the literal key "a{b".
	let unmatched = mapping(json!({"b": "inner"}));
	assert_eq!(substitute("{a{b}", &unmatched), "{a{b}");

	let matched = mapping(json!({"a{b": "X"}));
	assert_eq!(substitute("{a{b}", &matched), "X");
}

#[test]
fn substitute_ignores_invalid_mapping() {
	let data = DataMapping::parse("not json at all");
	assert_eq!(substitute("Hello {name}", &data), "Hello {name}");
}

#[test]
fn placeholders_report_spans_and_positions() {
	let found = placeholders("Hello {name},\n{x}");
	assert_eq!(found.len(), 2);

	assert_eq!(found[0].key, "name");
	assert_eq!((found[0].start, found[0].end), (6, 12));
	assert_eq!((found[0].line, found[0].column), (1, 7));

	assert_eq!(found[1].key, "x");
	assert_eq!((found[1].start, found[1].end), (14, 17));
	assert_eq!((found[1].line, found[1].column), (2, 1));
}

#[test]
fn placeholders_empty_for_plain_text() {
	assert!(placeholders("nothing to see").is_empty());
	assert!(placeholders("").is_empty());
}

#[test]
fn missing_keys_are_sorted_and_deduplicated() {
	let data = mapping(json!({"a": 1}));
	assert_eq!(missing_keys("{z}{a}{y}{z}", &data), vec!["y", "z"]);
	assert!(missing_keys("{a}", &data).is_empty());
}

// --- DataMapping tests ---

#[test]
fn parse_valid_object() {
	let data = DataMapping::parse(r#"{"name": "Kir", "age": 30}"#);
	assert!(data.is_valid());
	assert_eq!(data.get("name"), Some(&json!("Kir")));
	assert_eq!(data.keys(), vec!["name", "age"]);
}

#[rstest]
#[case::syntax_error("{not json")]
#[case::top_level_array("[1, 2, 3]")]
#[case::top_level_scalar("42")]
fn parse_failure_preserves_exact_text(#[case] text: &str) {
	let data = DataMapping::parse(text);
	assert!(!data.is_valid());
	assert_eq!(data.raw_text(), Some(text));
	// The preserved text round-trips byte-identically through export.
	assert_eq!(data.to_json_text(), text);
}

#[test]
fn valid_mapping_exports_pretty_json() {
	let data = DataMapping::parse(r#"{"a":1,"b":"x"}"#);
	assert_eq!(data.to_json_text(), "{\n  \"a\": 1,\n  \"b\": \"x\"\n}");
}

#[test]
fn json_round_trip_preserves_mapping() {
	let original = DataMapping::parse(r#"{"b": 2, "a": {"nested": [true, null]}}"#);
	let reparsed = DataMapping::parse(&original.to_json_text());
	assert_eq!(original, reparsed);
}

// --- Session tests ---

#[test]
fn new_session_renders_sample_letter() {
	let session = Session::new();
	assert_eq!(session.stem(), session::DEFAULT_STEM);
	assert_eq!(session.extension(), session::DEFAULT_EXTENSION);
	assert_eq!(session.content_type(), ContentType::Text);
	assert!(session.is_editable());

	let rendered = session.render();
	assert!(rendered.contains("Hello Kir,"));
	assert!(rendered.contains("Acme Inc."));
	assert!(!rendered.contains('{'));
}

#[test]
fn edit_document_reclassifies() {
	let mut session = Session::new();
	session.edit_document("# Heading");
	assert_eq!(session.content_type(), ContentType::Markdown);
	session.edit_document("<html><body></body></html>");
	assert_eq!(session.content_type(), ContentType::Html);
	session.edit_document("plain again");
	assert_eq!(session.content_type(), ContentType::Text);
}

#[test]
fn edit_data_preserves_invalid_text() {
	let mut session = Session::new();
	session.edit_data("{\"name\": \"Ada\"");
	assert!(!session.data().is_valid());
	assert_eq!(session.export_data().contents, "{\"name\": \"Ada\"");

	// A later fixed edit parses again.
	session.edit_data("{\"name\": \"Ada\"}");
	assert!(session.data().is_valid());
	assert!(session.render().contains("Hello Ada,"));
}

#[test]
fn import_document_takes_extension_and_sniffs_content() {
	let mut session = Session::new();
	let outcome = session.import_document(b"<html><p>page</p></html>", "page.md");
	assert_eq!(outcome, DocumentImport::Loaded);
	assert_eq!(session.extension(), "md");
	// Content sniffing overrides the markdown extension hint.
	assert_eq!(session.content_type(), ContentType::Html);
}

#[test]
fn import_document_falls_back_to_extension_hint() {
	let mut session = Session::new();
	let outcome = session.import_document(b"plain words only", "notes.MD");
	assert_eq!(outcome, DocumentImport::Loaded);
	assert_eq!(session.extension(), "md");
	assert_eq!(session.content_type(), ContentType::Markdown);
}

#[test]
fn import_document_without_extension_defaults_to_txt() {
	let mut session = Session::new();
	let outcome = session.import_document(b"content", "README");
	assert_eq!(outcome, DocumentImport::Loaded);
	assert_eq!(session.extension(), "txt");
}

#[test]
fn import_pdf_is_opaque_but_exportable() {
	let mut session = Session::new();
	let outcome = session.import_document(b"%PDF-1.4 binary body", "scan.pdf");
	assert_eq!(outcome, DocumentImport::OpaqueBinary);
	assert!(!session.is_editable());
	assert_eq!(session.content_type(), ContentType::Pdf);

	let export = session.export_document(ExportMode::Template);
	assert_eq!(export.filename, "document.pdf");
	assert_eq!(export.contents, "%PDF-1.4 binary body");
}

#[test]
fn import_non_utf8_is_opaque() {
	let mut session = Session::new();
	let outcome = session.import_document(&[0xff, 0xfe, 0x00, 0x41], "blob.txt");
	assert_eq!(outcome, DocumentImport::OpaqueBinary);
	assert!(!session.is_editable());
}

#[test]
fn import_data_outcomes() {
	let mut session = Session::new();
	assert_eq!(
		session.import_data(br#"{"name": "Mira"}"#),
		DataImport::Parsed
	);
	assert!(session.render().contains("Hello Mira,"));

	assert_eq!(session.import_data(b"{broken"), DataImport::PreservedRaw);
	assert_eq!(session.export_data().contents, "{broken");
}

#[test]
fn superseded_import_leaves_session_unchanged() {
	let mut session = Session::new();
	let ticket = session.begin_import();

	// A newer transition lands before the file read resolves.
	session.edit_document("fresh edit");

	let outcome = session.import_data_with(ticket, br#"{"name": "Stale"}"#);
	assert_eq!(outcome, DataImport::Superseded);
	assert_eq!(session.data().get("name"), Some(&json!("Kir")));

	let doc_outcome = session.import_document_with(ticket, b"old bytes", "old.txt");
	assert_eq!(doc_outcome, DocumentImport::Superseded);
	assert_eq!(session.document(), "fresh edit");
}

#[test]
fn current_ticket_applies() {
	let mut session = Session::new();
	let ticket = session.begin_import();
	let outcome = session.import_document_with(ticket, b"# imported", "notes.md");
	assert_eq!(outcome, DocumentImport::Loaded);
	assert_eq!(session.document(), "# imported");
}

#[test]
fn export_document_modes() {
	let mut session = Session::new();
	session.edit_document("Dear {name},");
	session.set_stem("offer");

	let template = session.export_document(ExportMode::Template);
	assert_eq!(template.filename, "offer.txt");
	assert_eq!(template.mime_type, "text/plain");
	assert_eq!(template.contents, "Dear {name},");

	let rendered = session.export_document(ExportMode::Rendered);
	assert_eq!(rendered.contents, "Dear Kir,");
}

#[test]
fn export_mime_follows_extension() {
	let mut session = Session::new();
	session.import_document(b"<html></html>", "page.html");
	assert_eq!(
		session.export_document(ExportMode::Template).mime_type,
		"text/html"
	);

	session.import_document(b"legacy body", "legacy.doc");
	assert_eq!(
		session.export_document(ExportMode::Template).mime_type,
		"application/msword"
	);
}

#[test]
fn export_data_naming() {
	let mut session = Session::new();
	session.set_stem("payload");
	let export = session.export_data();
	assert_eq!(export.filename, "payload.json");
	assert_eq!(export.mime_type, JSON_MIME_TYPE);
	assert!(export.contents.contains("\"name\": \"Kir\""));
}

#[test]
fn import_then_export_round_trips_valid_json() {
	let mut session = Session::new();
	let source = "{\n  \"a\": 1,\n  \"z\": \"last\"\n}";
	assert_eq!(session.import_data(source.as_bytes()), DataImport::Parsed);
	assert_eq!(session.export_data().contents, source);
}

// --- Config tests ---

#[test]
fn config_load_missing_is_none() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	assert!(DocfillConfig::load(tmp.path())?.is_none());

	let config = DocfillConfig::load_or_default(tmp.path())?;
	assert_eq!(config.export.stem, "document");
	assert_eq!(config.files.data, std::path::PathBuf::from("data.json"));
	assert_eq!(config.max_file_size, DEFAULT_MAX_FILE_SIZE);

	Ok(())
}

#[test]
fn config_load_reads_sections() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(
		tmp.path().join("docfill.toml"),
		"[files]\ndata = \"values.json\"\ntemplate = \"body.html\"\n\n[export]\nstem = \
		 \"offer\"\ndir = \"out\"\n\nmax_file_size = 1024\n",
	)?;

	let config = DocfillConfig::load_or_default(tmp.path())?;
	assert_eq!(config.files.data, std::path::PathBuf::from("values.json"));
	assert_eq!(config.files.template, std::path::PathBuf::from("body.html"));
	assert_eq!(config.export.stem, "offer");
	assert_eq!(config.export.dir, std::path::PathBuf::from("out"));
	assert_eq!(config.max_file_size, 1024);

	Ok(())
}

#[test]
fn config_parse_error_is_reported() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("docfill.toml"), "[files\nbroken")?;

	let result = DocfillConfig::load(tmp.path());
	assert!(matches!(result, Err(DocfillError::ConfigParse(_))));

	Ok(())
}

#[test]
fn read_limited_refuses_oversized_files() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let path = tmp.path().join("big.txt");
	std::fs::write(&path, "0123456789")?;

	let result = read_limited(&path, 4);
	assert!(matches!(result, Err(DocfillError::FileTooLarge { .. })));

	let bytes = read_limited(&path, 1024)?;
	assert_eq!(bytes, b"0123456789");

	Ok(())
}
