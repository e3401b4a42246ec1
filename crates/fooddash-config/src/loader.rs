//! Loading of configuration files split across several includes.
//!
//! A file may declare `include = "other.toml"` or `include = [..]`. Included
//! files may include further files. Paths are relative to the including
//! file's directory. A file loaded twice, or a top-level section defined in
//! two files, is a validation error.

use crate::{resolve_env_vars, Config, ConfigError};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

pub struct ConfigLoader {
	/// Directory the entry file is resolved against.
	base_path: PathBuf,
	/// Canonical paths already read.
	loaded_files: HashSet<PathBuf>,
	/// Top-level section name -> file that defined it.
	section_sources: HashMap<String, PathBuf>,
}

impl ConfigLoader {
	pub fn new(base_path: impl AsRef<Path>) -> Self {
		Self {
			base_path: base_path.as_ref().to_path_buf(),
			loaded_files: HashSet::new(),
			section_sources: HashMap::new(),
		}
	}

	/// Loads the entry file and everything it includes, then validates.
	pub async fn load_config(
		&mut self,
		config_path: impl AsRef<Path>,
	) -> Result<Config, ConfigError> {
		let entry = resolve_path(&self.base_path, config_path.as_ref())?;

		let mut merged = toml::map::Map::new();
		self.merge_file(&entry, &mut merged).await?;

		tracing::debug!(
			files = self.loaded_files.len(),
			sections = merged.len(),
			"Loaded configuration"
		);

		let combined = toml::to_string(&toml::Value::Table(merged)).map_err(|e| {
			ConfigError::Parse(format!("Failed to serialize combined config: {}", e))
		})?;
		combined.parse()
	}

	/// Reads one file, merges its sections into `merged` and recurses into
	/// its includes.
	async fn merge_file(
		&mut self,
		path: &Path,
		merged: &mut toml::map::Map<String, toml::Value>,
	) -> Result<(), ConfigError> {
		let canonical = path.canonicalize().map_err(|e| {
			ConfigError::Io(std::io::Error::new(
				std::io::ErrorKind::NotFound,
				format!("Cannot resolve path {}: {}", path.display(), e),
			))
		})?;
		if !self.loaded_files.insert(canonical.clone()) {
			return Err(ConfigError::Validation(format!(
				"Circular include detected: {} was already loaded",
				canonical.display()
			)));
		}

		let content = tokio::fs::read_to_string(&canonical).await?;
		let resolved = resolve_env_vars(&content)?;
		let mut table: toml::map::Map<String, toml::Value> = toml::from_str(&resolved)?;

		let includes = match table.remove("include") {
			Some(value) => parse_includes(&value)?,
			None => Vec::new(),
		};

		for (section, value) in table {
			if let Some(existing) = self.section_sources.get(&section) {
				return Err(ConfigError::Validation(format!(
					"Duplicate section '{}' found in {} and {}. \
					Each top-level section must be defined in exactly one file.",
					section,
					existing.display(),
					canonical.display()
				)));
			}
			self.section_sources.insert(section.clone(), canonical.clone());
			merged.insert(section, value);
		}

		let dir = canonical
			.parent()
			.map(Path::to_path_buf)
			.unwrap_or_else(|| self.base_path.clone());
		for include in includes {
			let include_path = resolve_path(&dir, &include)?;
			Box::pin(self.merge_file(&include_path, merged)).await?;
		}

		Ok(())
	}
}

/// Reads `include` as a string or an array of strings.
fn parse_includes(value: &toml::Value) -> Result<Vec<PathBuf>, ConfigError> {
	match value {
		toml::Value::String(path) => Ok(vec![PathBuf::from(path)]),
		toml::Value::Array(items) => items
			.iter()
			.map(|item| {
				item.as_str().map(PathBuf::from).ok_or_else(|| {
					ConfigError::Validation("Include array must contain only strings".into())
				})
			})
			.collect(),
		_ => Err(ConfigError::Validation(
			"Include must be a string or array of strings".into(),
		)),
	}
}

fn resolve_path(base: &Path, path: &Path) -> Result<PathBuf, ConfigError> {
	let resolved = if path.is_absolute() {
		path.to_path_buf()
	} else {
		base.join(path)
	};

	if !resolved.exists() {
		return Err(ConfigError::Io(std::io::Error::new(
			std::io::ErrorKind::NotFound,
			format!("Configuration file not found: {}", resolved.display()),
		)));
	}

	Ok(resolved)
}
