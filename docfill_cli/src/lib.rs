use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use docfill_core::ExportMode;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Fill {key} placeholders in documents from JSON data.",
	long_about = "docfill pairs a JSON data file with a text, markdown, or HTML document \
	              template containing {key} placeholders.\n\nIt substitutes values into the \
	              template, classifies the document's content type, and exports both sides — \
	              without ever losing an edit: invalid JSON is preserved verbatim through the \
	              round trip.\n\nQuick start:\n  docfill init    Create a sample template and \
	              data file\n  docfill render  Substitute placeholders and print or write the \
	              result\n  docfill check   Verify a rendered output file is up to date\n  \
	              docfill list    List placeholders and their resolution status\n  docfill \
	              info    Inspect the project"
)]
pub struct DocfillCli {
	#[command(subcommand)]
	pub command: Option<Commands>,

	/// Path to the project root directory.
	#[arg(long, short, global = true)]
	pub path: Option<PathBuf>,

	/// Enable verbose output.
	#[arg(long, short, global = true, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, global = true, default_value_t = false)]
	pub no_color: bool,

	/// JSON data file (overrides `files.data` from docfill.toml).
	#[arg(long, short, global = true)]
	pub data: Option<PathBuf>,

	/// Document template file (overrides `files.template` from
	/// docfill.toml).
	#[arg(long, short, global = true)]
	pub template: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Initialize a project with a sample template, data file, and config.
	///
	/// Creates `letter.txt` with the sample letter template, `data.json`
	/// with matching sample values, and a commented `docfill.toml`.
	/// Existing files are left alone and the command still succeeds.
	Init,
	/// Substitute placeholders and print or write the rendered document.
	///
	/// Reads the template and data files (from flags or docfill.toml),
	/// replaces every `{key}` placeholder that has a value, and leaves
	/// unmatched placeholders untouched. Placeholders with no value are
	/// reported as warnings on stderr; they never fail the render.
	Render {
		/// Write the rendered document to this file instead of stdout.
		#[arg(long, short)]
		out: Option<PathBuf>,

		/// Watch the template and data files and re-render on change.
		#[arg(long, default_value_t = false)]
		watch: bool,
	},
	/// Check that a rendered output file is up to date.
	///
	/// Renders the template in memory and compares it against the output
	/// file. Exits with a non-zero status when the file is stale or
	/// missing. Ideal for CI pipelines.
	Check {
		/// The rendered output file to compare against. Defaults to
		/// `<export.dir>/<export.stem>.<template extension>`.
		#[arg(long, short)]
		out: Option<PathBuf>,

		/// Show a unified diff between the file and the expected render.
		#[arg(long, default_value_t = false)]
		diff: bool,

		/// Output format for check results.
		#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
		format: OutputFormat,
	},
	/// List placeholder occurrences in the template.
	///
	/// Shows every `{key}` occurrence with its line:column position and
	/// whether the data mapping resolves it.
	List {
		/// Output format for the placeholder listing.
		#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
		format: OutputFormat,
	},
	/// Print a summary of the current project.
	///
	/// Shows the resolved config, input files, detected content type,
	/// placeholder totals, missing keys, and export naming.
	Info,
	/// Write export files: the document and optionally the JSON data.
	///
	/// Produces `<stem>.<extension>` in the export directory, carrying
	/// either the raw template or the substituted text. With `--data` the
	/// mapping is exported as `<stem>.json` as well — pretty-printed when
	/// valid, the preserved raw text when not.
	Export {
		/// Which document text to export.
		#[arg(long, value_enum, default_value_t = ExportModeArg::Rendered)]
		mode: ExportModeArg,

		/// Also export the data mapping as `<stem>.json`.
		#[arg(long, default_value_t = false)]
		with_data: bool,

		/// Filename stem for the export (overrides `export.stem`).
		#[arg(long)]
		stem: Option<String>,
	},
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
	/// Human-readable text output with colors and formatting.
	Text,
	/// JSON output for programmatic consumption.
	Json,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ExportModeArg {
	/// The raw template, placeholders intact.
	Template,
	/// The fully substituted document.
	Rendered,
}

impl From<ExportModeArg> for ExportMode {
	fn from(mode: ExportModeArg) -> Self {
		match mode {
			ExportModeArg::Template => Self::Template,
			ExportModeArg::Rendered => Self::Rendered,
		}
	}
}
