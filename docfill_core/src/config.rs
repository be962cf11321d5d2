use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::DocfillError;
use crate::DocfillResult;

/// Default maximum input file size in bytes (10 MB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] =
	["docfill.toml", ".docfill.toml", ".config/docfill.toml"];

/// Configuration loaded from a `docfill.toml` file.
///
/// ```toml
/// [files]
/// data = "data.json"
/// template = "letter.txt"
///
/// [export]
/// stem = "offer"
/// dir = "out"
///
/// max_file_size = 10485760
/// ```
///
/// All sections are optional; an absent config file means defaults.
#[derive(Debug, Deserialize)]
pub struct DocfillConfig {
	/// Default input files for CLI commands. Flags override these.
	#[serde(default)]
	pub files: FilesConfig,
	/// Export naming and destination.
	#[serde(default)]
	pub export: ExportConfig,
	/// Maximum input file size in bytes. Larger files are refused.
	/// Defaults to 10 MB.
	#[serde(default = "default_max_file_size")]
	pub max_file_size: u64,
}

#[derive(Debug, Deserialize)]
pub struct FilesConfig {
	/// Relative path of the JSON data file.
	#[serde(default = "default_data_file")]
	pub data: PathBuf,
	/// Relative path of the document template.
	#[serde(default = "default_template_file")]
	pub template: PathBuf,
}

#[derive(Debug, Deserialize)]
pub struct ExportConfig {
	/// Filename stem for exports (`<stem>.<ext>` / `<stem>.json`).
	#[serde(default = "default_stem")]
	pub stem: String,
	/// Directory exports are written into, relative to the project root.
	#[serde(default = "default_export_dir")]
	pub dir: PathBuf,
}

impl Default for FilesConfig {
	fn default() -> Self {
		Self {
			data: default_data_file(),
			template: default_template_file(),
		}
	}
}

impl Default for ExportConfig {
	fn default() -> Self {
		Self {
			stem: default_stem(),
			dir: default_export_dir(),
		}
	}
}

impl Default for DocfillConfig {
	fn default() -> Self {
		Self {
			files: FilesConfig::default(),
			export: ExportConfig::default(),
			max_file_size: DEFAULT_MAX_FILE_SIZE,
		}
	}
}

impl DocfillConfig {
	/// Resolve the config path from known discovery candidates.
	#[must_use]
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from the first discovered config file at `root`.
	/// Returns `None` if no config file exists.
	pub fn load(root: &Path) -> DocfillResult<Option<Self>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		let content = std::fs::read_to_string(&config_path)?;
		let config: Self =
			toml::from_str(&content).map_err(|e| DocfillError::ConfigParse(e.to_string()))?;

		Ok(Some(config))
	}

	/// Load the config at `root`, falling back to defaults when no config
	/// file exists.
	pub fn load_or_default(root: &Path) -> DocfillResult<Self> {
		Ok(Self::load(root)?.unwrap_or_default())
	}
}

/// Read an input file, refusing anything over the configured size limit.
pub fn read_limited(path: &Path, limit: u64) -> DocfillResult<Vec<u8>> {
	let metadata = std::fs::metadata(path)?;
	if metadata.len() > limit {
		return Err(DocfillError::FileTooLarge {
			path: path.display().to_string(),
			size: metadata.len(),
			limit,
		});
	}
	Ok(std::fs::read(path)?)
}

fn default_max_file_size() -> u64 {
	DEFAULT_MAX_FILE_SIZE
}

fn default_data_file() -> PathBuf {
	PathBuf::from("data.json")
}

fn default_template_file() -> PathBuf {
	PathBuf::from("letter.txt")
}

fn default_stem() -> String {
	crate::session::DEFAULT_STEM.to_string()
}

fn default_export_dir() -> PathBuf {
	PathBuf::from(".")
}
