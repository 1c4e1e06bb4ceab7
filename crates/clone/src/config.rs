//! Selection configuration.
//!
//! Read once, when the process-wide selection is first needed:
//!
//! ```toml
//! disable = ["event-bus"]
//! store-name = "dolly-structured-clone"
//! store-version = 1
//! ```
//!
//! [`CONFIG_ENV`] names such a file; [`DISABLE_ENV`] adds a comma-separated list of
//! strategies to skip on top of it.

use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use crate::{ConfigError, StrategyKind};

/// Environment variable holding the path of a TOML configuration file.
pub const CONFIG_ENV: &str = "DOLLY_CONFIG";

/// Environment variable holding comma-separated strategy names to disable.
pub const DISABLE_ENV: &str = "DOLLY_DISABLE";

/// Default database name for the object-store strategy.
pub const DEFAULT_STORE_NAME: &str = "dolly-structured-clone";

/// Knobs consulted while building the native registry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct CloneConfig {
	/// Strategies whose probe always fails.
	pub disable: Vec<StrategyKind>,
	/// Database name for the object-store strategy.
	pub store_name: String,
	/// Schema version for the object-store strategy.
	pub store_version: u32,
}

impl Default for CloneConfig {
	fn default() -> Self {
		Self {
			disable: Vec::new(),
			store_name: DEFAULT_STORE_NAME.to_owned(),
			store_version: 1,
		}
	}
}

impl CloneConfig {
	/// Parses a TOML document. Missing keys keep their defaults.
	pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
		Ok(toml::from_str(text)?)
	}

	/// Reads and parses a TOML file.
	pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
		let text = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
			path: path.to_path_buf(),
			error,
		})?;
		Self::from_toml(&text)
	}

	/// Loads from [`CONFIG_ENV`] if set, then applies [`DISABLE_ENV`].
	pub fn from_env() -> Result<Self, ConfigError> {
		let mut config = match std::env::var_os(CONFIG_ENV) {
			Some(path) => Self::from_path(Path::new(&path))?,
			None => Self::default(),
		};
		if let Ok(list) = std::env::var(DISABLE_ENV) {
			config.disable_list(&list)?;
		}
		Ok(config)
	}

	/// Like [`from_env`](Self::from_env), but keeps every part that is valid.
	///
	/// An unreadable file leaves the file settings at their defaults, and each
	/// unknown name in [`DISABLE_ENV`] is dropped on its own. The problems are
	/// returned alongside the configuration.
	pub fn from_env_lossy() -> (Self, Vec<ConfigError>) {
		let path = std::env::var_os(CONFIG_ENV);
		let disable = std::env::var(DISABLE_ENV).ok();
		Self::resolve_lossy(path.as_deref().map(Path::new), disable.as_deref())
	}

	fn resolve_lossy(path: Option<&Path>, disable: Option<&str>) -> (Self, Vec<ConfigError>) {
		let mut errors = Vec::new();
		let mut config = match path.map(Self::from_path) {
			Some(Ok(config)) => config,
			Some(Err(error)) => {
				errors.push(error);
				Self::default()
			}
			None => Self::default(),
		};
		for name in disable.into_iter().flat_map(names) {
			if let Err(error) = config.disable_name(name) {
				errors.push(error);
			}
		}
		(config, errors)
	}

	/// Disables every strategy named in a comma-separated list.
	///
	/// Stops at the first unknown name; names before it stay disabled.
	pub fn disable_list(&mut self, list: &str) -> Result<(), ConfigError> {
		names(list).try_for_each(|name| self.disable_name(name))
	}

	fn disable_name(&mut self, name: &str) -> Result<(), ConfigError> {
		let kind = StrategyKind::from_str(name).map_err(|_| ConfigError::UnknownStrategy(name.to_owned()))?;
		if !self.disable.contains(&kind) {
			self.disable.push(kind);
		}
		Ok(())
	}

	/// Returns true if `kind` must not be selected.
	pub fn is_disabled(&self, kind: StrategyKind) -> bool {
		self.disable.contains(&kind)
	}
}

fn names(list: &str) -> impl Iterator<Item = &str> {
	list.split(',').map(str::trim).filter(|name| !name.is_empty())
}

#[cfg(test)]
mod tests {
	use std::io::Write;

	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn empty_document_is_default() {
		assert_eq!(CloneConfig::from_toml("").unwrap(), CloneConfig::default());
	}

	#[test]
	fn parses_kebab_case_keys() {
		let config = CloneConfig::from_toml(
			r#"
disable = ["event-bus", "object-store"]
store-name = "scratch"
store-version = 3
"#,
		)
		.unwrap();
		assert_eq!(config.disable, vec![StrategyKind::EventBus, StrategyKind::ObjectStore]);
		assert_eq!(config.store_name, "scratch");
		assert_eq!(config.store_version, 3);
		assert!(config.is_disabled(StrategyKind::EventBus));
		assert!(!config.is_disabled(StrategyKind::Native));
	}

	#[test]
	fn rejects_unknown_keys_and_strategies() {
		assert!(matches!(CloneConfig::from_toml("colour = 1"), Err(ConfigError::Toml(_))));
		assert!(matches!(CloneConfig::from_toml(r#"disable = ["pigeon"]"#), Err(ConfigError::Toml(_))));
	}

	#[test]
	fn disable_list_trims_and_dedups() {
		let mut config = CloneConfig::default();
		config.disable_list(" native, ,native,message-channel ").unwrap();
		assert_eq!(config.disable, vec![StrategyKind::Native, StrategyKind::MessageChannel]);

		let err = config.disable_list("native,carrier-pigeon").unwrap_err();
		assert_eq!(err.to_string(), "unknown strategy: carrier-pigeon");
	}

	#[test]
	fn reads_file() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "store-version = 7").unwrap();
		let config = CloneConfig::from_path(file.path()).unwrap();
		assert_eq!(config.store_version, 7);
		assert_eq!(config.store_name, DEFAULT_STORE_NAME);
	}

	#[test]
	fn lossy_resolution_drops_only_unknown_names() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, r#"disable = ["object-store"]"#).unwrap();

		let (config, errors) = CloneConfig::resolve_lossy(Some(file.path()), Some("event_bus, event-bus"));
		assert_eq!(config.disable, vec![StrategyKind::ObjectStore, StrategyKind::EventBus]);
		assert_eq!(errors.len(), 1);
		assert_eq!(errors[0].to_string(), "unknown strategy: event_bus");
	}

	#[test]
	fn lossy_resolution_keeps_env_names_when_file_is_broken() {
		let dir = tempfile::tempdir().unwrap();
		let (config, errors) = CloneConfig::resolve_lossy(Some(&dir.path().join("absent.toml")), Some("event-bus"));
		assert_eq!(config.disable, vec![StrategyKind::EventBus]);
		assert!(matches!(errors.as_slice(), [ConfigError::Io { .. }]));

		assert_eq!(CloneConfig::resolve_lossy(None, None).0, CloneConfig::default());
	}

	#[test]
	fn missing_file_is_io_error() {
		let dir = tempfile::tempdir().unwrap();
		let err = CloneConfig::from_path(&dir.path().join("absent.toml")).unwrap_err();
		assert!(matches!(err, ConfigError::Io { .. }));
	}
}
