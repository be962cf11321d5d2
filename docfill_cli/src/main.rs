use std::path::Path;
use std::path::PathBuf;
use std::process;
use std::sync::mpsc;
use std::time::Duration;

use clap::Parser;
use docfill_cli::Commands;
use docfill_cli::DocfillCli;
use docfill_cli::ExportModeArg;
use docfill_cli::OutputFormat;
use docfill_core::AnyEmptyResult;
use docfill_core::AnyResult;
use docfill_core::DataImport;
use docfill_core::DocfillConfig;
use docfill_core::DocfillError;
use docfill_core::DocumentImport;
use docfill_core::ExportMode;
use docfill_core::Session;
use docfill_core::missing_keys;
use docfill_core::placeholders;
use docfill_core::read_limited;
use owo_colors::OwoColorize;
use similar::ChangeTag;
use similar::TextDiff;

static USE_COLOR: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

fn color_enabled() -> bool {
	USE_COLOR.load(std::sync::atomic::Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,green) => {
		if color_enabled() {
			format!("{}", $text.green())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,yellow) => {
		if color_enabled() {
			format!("{}", $text.yellow())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,bold) => {
		if color_enabled() {
			format!("{}", $text.bold())
		} else {
			format!("{}", $text)
		}
	};
}

fn main() {
	let args = DocfillCli::parse();

	// Respect NO_COLOR env var and --no-color flag.
	let use_color = !args.no_color && std::env::var_os("NO_COLOR").is_none();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	if args.verbose {
		let filter = tracing_subscriber::EnvFilter::try_from_default_env()
			.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("docfill_core=debug,docfill=debug"));
		tracing_subscriber::fmt()
			.with_env_filter(filter)
			.with_writer(std::io::stderr)
			.init();
	}

	// Install miette's fancy handler for rich error diagnostics.
	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	let result = match args.command {
		Some(Commands::Init) => run_init(&args),
		Some(Commands::Render { ref out, watch }) => run_render(&args, out.clone(), watch),
		Some(Commands::Check {
			ref out,
			diff,
			format,
		}) => run_check(&args, out.clone(), diff, format),
		Some(Commands::List { format }) => run_list(&args, format),
		Some(Commands::Info) => run_info(&args),
		Some(Commands::Export {
			mode,
			with_data,
			ref stem,
		}) => run_export(&args, mode, with_data, stem.clone()),
		None => {
			eprintln!("No subcommand specified. Run `docfill --help` for usage.");
			process::exit(1);
		}
	};

	if let Err(e) = result {
		// Try to render through miette for rich diagnostics with help text
		// and error codes.
		match e.downcast::<DocfillError>() {
			Ok(docfill_err) => {
				let report: miette::Report = (*docfill_err).into();
				eprintln!("{report:?}");
			}
			Err(e) => {
				eprintln!("{} {e}", colored!("error:", red));
			}
		}
		process::exit(2);
	}
}

fn resolve_root(args: &DocfillCli) -> PathBuf {
	args.path
		.clone()
		.unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

fn print_section(title: &str) {
	println!();
	println!("{}", colored!(title, bold));
}

fn print_field(label: &str, value: impl std::fmt::Display) {
	println!("{label:<24} {value}");
}

/// Make a path relative to root for display purposes.
fn make_relative(path: &Path, root: &Path) -> String {
	path.strip_prefix(root)
		.unwrap_or(path)
		.display()
		.to_string()
}

/// The resolved project inputs backing every command except `init`: the
/// loaded config, input file paths, and a session built by importing the
/// template and data files.
struct ProjectInputs {
	root: PathBuf,
	config: DocfillConfig,
	template_path: PathBuf,
	data_path: PathBuf,
	session: Session,
}

fn load_inputs(args: &DocfillCli) -> AnyResult<ProjectInputs> {
	let root = resolve_root(args);
	let config = DocfillConfig::load_or_default(&root)?;

	let template_path = root.join(
		args.template
			.clone()
			.unwrap_or_else(|| config.files.template.clone()),
	);
	let data_path = root.join(args.data.clone().unwrap_or_else(|| config.files.data.clone()));

	let template_bytes =
		read_limited(&template_path, config.max_file_size).map_err(|e| match e {
			DocfillError::FileTooLarge { .. } => e,
			other => {
				DocfillError::TemplateFile {
					path: make_relative(&template_path, &root),
					reason: other.to_string(),
				}
			}
		})?;
	let data_bytes = read_limited(&data_path, config.max_file_size).map_err(|e| match e {
		DocfillError::FileTooLarge { .. } => e,
		other => {
			DocfillError::DataFile {
				path: make_relative(&data_path, &root),
				reason: other.to_string(),
			}
		}
	})?;

	let mut session = Session::new();

	let filename = template_path
		.file_name()
		.and_then(|name| name.to_str())
		.unwrap_or("template.txt");
	let ticket = session.begin_import();
	if session.import_document_with(ticket, &template_bytes, filename) == DocumentImport::OpaqueBinary
	{
		eprintln!(
			"{} `{}` is not editable text; it is carried through to export unchanged",
			colored!("warning:", yellow),
			make_relative(&template_path, &root),
		);
	}

	let ticket = session.begin_import();
	if session.import_data_with(ticket, &data_bytes) == DataImport::PreservedRaw {
		eprintln!(
			"{} `{}` is not a valid JSON object; placeholders are left in place and the exact \
			 text is preserved for export",
			colored!("warning:", yellow),
			make_relative(&data_path, &root),
		);
	}

	session.set_stem(config.export.stem.clone());

	Ok(ProjectInputs {
		root,
		config,
		template_path,
		data_path,
		session,
	})
}

/// Print a yellow warning per placeholder key that has no value.
fn warn_missing_keys(session: &Session) {
	for key in missing_keys(session.document(), session.data()) {
		eprintln!(
			"{} placeholder `{{{key}}}` has no value and is left unchanged",
			colored!("warning:", yellow),
		);
	}
}

fn run_init(args: &DocfillCli) -> AnyEmptyResult {
	let root = resolve_root(args);
	let sample = Session::new();

	let template_path = root.join("letter.txt");
	let data_path = root.join("data.json");
	let config_path = root.join("docfill.toml");

	let template_exists = template_path.exists();

	if template_exists {
		println!("Template file already exists: {}", template_path.display());
	} else {
		std::fs::write(&template_path, sample.document())?;
		println!("Created template file: {}", template_path.display());
	}

	if data_path.exists() {
		println!("Data file already exists: {}", data_path.display());
	} else {
		let mut contents = sample.export_data().contents;
		contents.push('\n');
		std::fs::write(&data_path, contents)?;
		println!("Created data file: {}", data_path.display());
	}

	if config_path.exists() {
		// Skip silently if config already exists.
	} else {
		let sample_config = "# docfill configuration\n\n# Input files used by render, check, \
		                     list, info, and export.\n[files]\ndata = \"data.json\"\ntemplate = \
		                     \"letter.txt\"\n\n# Export naming: files are written as \
		                     <stem>.<extension> into dir.\n[export]\nstem = \"document\"\ndir = \
		                     \".\"\n\n# Maximum input file size in bytes (default 10 MB).\n# \
		                     max_file_size = 10485760\n";

		std::fs::write(&config_path, sample_config)?;
		println!("Created docfill.toml");
	}

	if !template_exists {
		println!();
		println!("Next steps:");
		println!("  1. Edit letter.txt — every {{key}} placeholder is filled from data.json");
		println!("  2. Edit data.json with your own values");
		println!("  3. Run `docfill render` to see the substituted document");
	}

	Ok(())
}

fn run_render(args: &DocfillCli, out: Option<PathBuf>, watch: bool) -> AnyEmptyResult {
	run_render_once(args, out.as_deref())?;

	if !watch {
		return Ok(());
	}

	// Watch mode
	println!("\nWatching for file changes... (press Ctrl+C to stop)");

	let root = resolve_root(args);
	let (tx, rx) = mpsc::channel();

	let mut watcher =
		notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
			if let Ok(event) = res {
				if matches!(
					event.kind,
					notify::EventKind::Modify(_) | notify::EventKind::Create(_)
				) {
					let _ = tx.send(());
				}
			}
		})?;

	use notify::Watcher;
	watcher.watch(&root, notify::RecursiveMode::Recursive)?;

	loop {
		rx.recv()?;
		// Debounce: drain additional events within 200ms.
		while rx.recv_timeout(Duration::from_millis(200)).is_ok() {}

		println!("\nFile change detected, rendering...");
		if let Err(e) = run_render_once(args, out.as_deref()) {
			eprintln!("{} {e}", colored!("error:", red));
		}
	}
}

fn run_render_once(args: &DocfillCli, out: Option<&Path>) -> AnyEmptyResult {
	let inputs = load_inputs(args)?;
	let session = &inputs.session;

	warn_missing_keys(session);

	if args.verbose {
		eprintln!(
			"Classified `{}` as {} ({} placeholder(s))",
			make_relative(&inputs.template_path, &inputs.root),
			session.content_type(),
			placeholders(session.document()).len()
		);
	}

	let rendered = session.render();
	match out {
		Some(path) => {
			let path = inputs.root.join(path);
			std::fs::write(&path, &rendered)?;
			println!("Rendered to {}", make_relative(&path, &inputs.root));
		}
		None => {
			print!("{rendered}");
		}
	}

	Ok(())
}

/// Resolve the output file a `check` compares against: the flag if
/// given, otherwise `<export.dir>/<export.stem>.<template extension>`.
fn resolve_check_target(inputs: &ProjectInputs, out: Option<&Path>) -> PathBuf {
	match out {
		Some(path) => inputs.root.join(path),
		None => {
			inputs
				.root
				.join(&inputs.config.export.dir)
				.join(inputs.session.export_document(ExportMode::Rendered).filename)
		}
	}
}

fn run_check(
	args: &DocfillCli,
	out: Option<PathBuf>,
	show_diff: bool,
	format: OutputFormat,
) -> AnyEmptyResult {
	let inputs = load_inputs(args)?;
	let session = &inputs.session;

	warn_missing_keys(session);

	let target = resolve_check_target(&inputs, out.as_deref());
	let rel = make_relative(&target, &inputs.root);
	if !target.is_file() {
		return Err(DocfillError::MissingOutput(rel).into());
	}

	let current = std::fs::read_to_string(&target)?;
	let expected = session.render();

	if current == expected {
		match format {
			OutputFormat::Json => {
				println!("{}", serde_json::json!({ "ok": true, "out": rel }));
			}
			OutputFormat::Text => {
				println!("Check passed: `{rel}` is up to date.");
			}
		}
		return Ok(());
	}

	match format {
		OutputFormat::Json => {
			println!("{}", serde_json::json!({ "ok": false, "out": rel }));
		}
		OutputFormat::Text => {
			eprintln!("Check failed: `{rel}` is out of date.");
			if show_diff {
				print_diff(&current, &expected);
			}
			eprintln!();
			eprintln!("Run `docfill render --out {rel}` to fix.");
		}
	}

	process::exit(1);
}

fn run_list(args: &DocfillCli, format: OutputFormat) -> AnyEmptyResult {
	let inputs = load_inputs(args)?;
	let session = &inputs.session;
	let found = placeholders(session.document());

	match format {
		OutputFormat::Json => {
			let entries: Vec<serde_json::Value> = found
				.iter()
				.map(|placeholder| {
					serde_json::json!({
						"key": placeholder.key,
						"line": placeholder.line,
						"column": placeholder.column,
						"resolved": session.data().get(&placeholder.key).is_some(),
					})
				})
				.collect();
			println!("{}", serde_json::Value::Array(entries));
			return Ok(());
		}
		OutputFormat::Text => {}
	}

	if found.is_empty() {
		println!("No placeholders found.");
		return Ok(());
	}

	println!("{}", colored!("Placeholders:", bold));
	let mut resolved_count = 0;
	for placeholder in &found {
		let resolved = session.data().get(&placeholder.key).is_some();
		if resolved {
			resolved_count += 1;
		}
		let status = if resolved { "resolved" } else { "missing" };
		println!(
			"  {{{}}} {}:{} [{status}]",
			placeholder.key, placeholder.line, placeholder.column
		);
	}

	println!(
		"\n{} placeholder(s), {} resolved, {} missing",
		found.len(),
		resolved_count,
		found.len() - resolved_count
	);

	Ok(())
}

fn run_info(args: &DocfillCli) -> AnyEmptyResult {
	let inputs = load_inputs(args)?;
	let session = &inputs.session;

	let resolved_config = DocfillConfig::resolve_path(&inputs.root)
		.map_or_else(|| "none".to_string(), |path| path.display().to_string());

	let found = placeholders(session.document());
	let missing = missing_keys(session.document(), session.data());
	let data_state = if session.data().is_valid() {
		format!("valid ({} key(s))", session.data().keys().len())
	} else {
		"invalid, raw text preserved".to_string()
	};
	let export = session.export_document(ExportMode::Rendered);

	println!("{}", colored!("docfill info", bold));

	print_section("Project");
	print_field("Project root", inputs.root.display());
	print_field("Resolved config", resolved_config);

	print_section("Inputs");
	print_field(
		"Template",
		make_relative(&inputs.template_path, &inputs.root),
	);
	print_field("Data", make_relative(&inputs.data_path, &inputs.root));
	print_field("Data state", data_state);

	print_section("Document");
	print_field("Content type", session.content_type());
	print_field("Editable", session.is_editable());
	print_field("Placeholders", found.len());
	print_field("Missing keys", missing.len());
	if missing.is_empty() {
		print_field("Missing names", "none");
	} else {
		print_field("Missing names", missing.join(", "));
	}

	print_section("Export");
	print_field("Stem", session.stem());
	print_field("Extension", session.extension());
	print_field("Document file", &export.filename);
	print_field("MIME type", export.mime_type);
	print_field("Directory", inputs.config.export.dir.display());

	Ok(())
}

fn run_export(
	args: &DocfillCli,
	mode: ExportModeArg,
	with_data: bool,
	stem: Option<String>,
) -> AnyEmptyResult {
	let mut inputs = load_inputs(args)?;

	if let Some(stem) = stem {
		inputs.session.set_stem(stem);
	}

	warn_missing_keys(&inputs.session);

	let export_dir = inputs.root.join(&inputs.config.export.dir);
	std::fs::create_dir_all(&export_dir)?;

	let document = inputs.session.export_document(ExportMode::from(mode));
	let document_path = export_dir.join(&document.filename);
	std::fs::write(&document_path, &document.contents)?;
	println!(
		"Exported {} ({})",
		make_relative(&document_path, &inputs.root),
		document.mime_type
	);

	if with_data {
		let data = inputs.session.export_data();
		let data_path = export_dir.join(&data.filename);
		std::fs::write(&data_path, &data.contents)?;
		println!(
			"Exported {} ({})",
			make_relative(&data_path, &inputs.root),
			data.mime_type
		);
	}

	Ok(())
}

/// Print a unified diff between two strings, colorized.
fn print_diff(current: &str, expected: &str) {
	let diff = TextDiff::from_lines(current, expected);
	for change in diff.iter_all_changes() {
		match change.tag() {
			ChangeTag::Delete => {
				eprint!("  {}", colored!(format!("-{change}"), red));
			}
			ChangeTag::Insert => {
				eprint!("  {}", colored!(format!("+{change}"), green));
			}
			ChangeTag::Equal => {
				eprint!("   {change}");
			}
		}
	}
}
