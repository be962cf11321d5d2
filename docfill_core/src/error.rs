use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum DocfillError {
	#[error(transparent)]
	#[diagnostic(code(docfill::io_error))]
	Io(#[from] std::io::Error),

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(docfill::config_parse),
		help("check that docfill.toml is valid TOML with [files] and/or [export] sections")
	)]
	ConfigParse(String),

	#[error("failed to load data file `{path}`: {reason}")]
	#[diagnostic(code(docfill::data_file))]
	DataFile { path: String, reason: String },

	#[error("failed to load template file `{path}`: {reason}")]
	#[diagnostic(code(docfill::template_file))]
	TemplateFile { path: String, reason: String },

	#[error("output file `{0}` does not exist")]
	#[diagnostic(
		code(docfill::missing_output),
		help("run `docfill render --out <file>` to create it before checking")
	)]
	MissingOutput(String),

	#[error("file too large: `{path}` is {size} bytes (limit: {limit} bytes)")]
	#[diagnostic(
		code(docfill::file_too_large),
		help("increase max_file_size in docfill.toml or trim the input")
	)]
	FileTooLarge { path: String, size: u64, limit: u64 },
}

pub type DocfillResult<T> = Result<T, DocfillError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
