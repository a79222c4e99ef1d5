// Configuration loading and parsing (draft.toml).

use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::Deserialize;
use thiserror::Error;
use tierdraft_core::DraftPattern;
use tracing::info;

/// File name of the database when no path is configured.
const DEFAULT_DB_FILE: &str = "tierdraft.db";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub draft: DraftConfig,
    /// Path of the roster catalog JSON, relative to the working directory
    /// unless absolute.
    pub catalog_path: PathBuf,
    pub db_path: String,
}

// ---------------------------------------------------------------------------
// draft.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire draft.toml file.
#[derive(Debug, Clone, Deserialize)]
struct DraftFile {
    draft: DraftConfig,
    data: DataSection,
    #[serde(default)]
    database: DatabaseSection,
}

#[derive(Debug, Clone, Deserialize)]
struct DataSection {
    catalog: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct DatabaseSection {
    path: Option<String>,
}

/// Who submits picks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DraftMode {
    /// Every pick is submitted from outside; no AI.
    Simulation,
    /// One captain is human-controlled, every other team is drafted by the AI.
    #[default]
    Mock,
}

impl fmt::Display for DraftMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DraftMode::Simulation => write!(f, "simulation"),
            DraftMode::Mock => write!(f, "mock"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DraftConfig {
    #[serde(default)]
    pub mode: DraftMode,
    #[serde(default)]
    pub pattern: DraftPattern,
    #[serde(default = "default_ai_pick_delay_ms")]
    pub ai_pick_delay_ms: u64,
    /// Seed for the AI's random tie-breaking. `None` seeds from entropy.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Rounds per draft. `None` means one round per position.
    #[serde(default)]
    pub rounds: Option<usize>,
}

impl Default for DraftConfig {
    fn default() -> Self {
        DraftConfig {
            mode: DraftMode::default(),
            pattern: DraftPattern::default(),
            ai_pick_delay_ms: default_ai_pick_delay_ms(),
            seed: None,
            rounds: None,
        }
    }
}

fn default_ai_pick_delay_ms() -> u64 {
    800
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/draft.toml` relative to the
/// given `base_dir`.
///
/// This is the lower-level loading primitive that does not auto-copy defaults.
/// Prefer `load_config()` which handles default initialization automatically.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join("draft.toml");
    let text = read_file(&path)?;
    let file: DraftFile = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        source: e,
    })?;

    let db_path = file.database.path.unwrap_or_else(default_db_path);

    let config = Config {
        draft: file.draft,
        catalog_path: PathBuf::from(file.data.catalog),
        db_path,
    };

    validate(&config)?;

    Ok(config)
}

/// Seed `config/` with any `.toml` file from `defaults/` it does not have yet.
/// Returns the files copied. Anything else in `defaults/` (such as
/// `draft.toml.example`) is left alone.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.exists() {
        // A hand-written config/ is enough; with neither there is nothing to load.
        if config_dir.exists() {
            return Ok(vec![]);
        }
        return Err(copy_error(format!(
            "neither defaults/ nor config/ directory found in {}; \
             run from the project root or ensure defaults/ is present",
            base_dir.display()
        )));
    }

    std::fs::create_dir_all(&config_dir)
        .map_err(|e| copy_error(format!("failed to create config directory: {e}")))?;
    let entries = std::fs::read_dir(&defaults_dir)
        .map_err(|e| copy_error(format!("failed to read defaults directory: {e}")))?;

    let mut copied = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|e| copy_error(format!("failed to read defaults entry: {e}")))?
            .path();
        let is_toml = path.extension().is_some_and(|ext| ext == "toml");
        let Some(file_name) = path.file_name().filter(|_| is_toml && path.is_file()) else {
            continue;
        };

        let target = config_dir.join(file_name);
        if copy_if_missing(&path, &target)? {
            info!("Copied default config {} to {}", path.display(), target.display());
            copied.push(target);
        }
    }

    Ok(copied)
}

/// Copy `source` to `target` unless `target` already exists. The existence
/// check and the create are one step so an edited config is never replaced.
fn copy_if_missing(source: &Path, target: &Path) -> Result<bool, ConfigError> {
    let mut dest = match std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(target)
    {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => return Err(copy_error(format!("failed to create {}: {e}", target.display()))),
    };

    let content = std::fs::read(source)
        .map_err(|e| copy_error(format!("failed to read {}: {e}", source.display())))?;
    dest.write_all(&content)
        .map_err(|e| copy_error(format!("failed to write {}: {e}", target.display())))?;
    Ok(true)
}

fn copy_error(message: String) -> ConfigError {
    ConfigError::DefaultsCopyError { message }
}

/// Loads config relative to the current working directory, copying defaults
/// first.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

/// `<platform data dir>/tierdraft.db`, or `tierdraft.db` in the working
/// directory when the platform has no home directory.
fn default_db_path() -> String {
    ProjectDirs::from("", "", "tierdraft")
        .map(|dirs| dirs.data_dir().join(DEFAULT_DB_FILE))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_FILE))
        .to_string_lossy()
        .into_owned()
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.draft.rounds == Some(0) {
        return Err(ConfigError::ValidationError {
            field: "draft.rounds".into(),
            message: "must be greater than 0".into(),
        });
    }

    if config.catalog_path.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "data.catalog".into(),
            message: "must not be empty".into(),
        });
    }

    if config.db_path.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "database.path".into(),
            message: "must not be empty".into(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    /// Returns the tierdraft-app crate root (works whether `cargo test` runs
    /// from the crate root or the workspace root).
    fn project_root() -> PathBuf {
        let cwd = std::env::current_dir().unwrap();
        if cwd.join("defaults").exists() {
            cwd
        } else if cwd.join("crates/tierdraft-app/defaults").exists() {
            cwd.join("crates/tierdraft-app")
        } else {
            panic!("Cannot locate defaults/ directory from CWD {:?}", cwd);
        }
    }

    /// Fresh temp dir with `config/draft.toml` holding `contents`.
    fn write_config(name: &str, contents: &str) -> PathBuf {
        let tmp = std::env::temp_dir().join(name);
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("config")).unwrap();
        fs::write(tmp.join("config/draft.toml"), contents).unwrap();
        tmp
    }

    fn assert_validation_error(err: ConfigError, expected_field: &str) {
        match err {
            ConfigError::ValidationError { field, .. } => assert_eq!(field, expected_field),
            other => panic!("expected ValidationError, got: {other}"),
        }
    }

    #[test]
    fn load_valid_config_from_defaults() {
        let tmp = std::env::temp_dir().join("tierdraft_config_defaults");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("config")).unwrap();
        fs::copy(
            project_root().join("defaults/draft.toml"),
            tmp.join("config/draft.toml"),
        )
        .unwrap();

        let config = load_config_from(&tmp).expect("should load valid config");
        assert_eq!(config.draft.mode, DraftMode::Mock);
        assert_eq!(config.draft.pattern, DraftPattern::Snake);
        assert_eq!(config.draft.ai_pick_delay_ms, 800);
        assert_eq!(config.draft.seed, None);
        assert_eq!(config.draft.rounds, None);
        assert_eq!(config.catalog_path, PathBuf::from("data/roster.json"));
        assert_eq!(config.db_path, "tierdraft.db");

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn optional_fields_take_defaults() {
        let tmp = write_config(
            "tierdraft_config_minimal",
            "[draft]\n\n[data]\ncatalog = \"roster.json\"\n",
        );

        let config = load_config_from(&tmp).unwrap();
        assert_eq!(config.draft.mode, DraftMode::Mock);
        assert_eq!(config.draft.pattern, DraftPattern::Snake);
        assert_eq!(config.draft.ai_pick_delay_ms, 800);
        assert!(config.db_path.ends_with(DEFAULT_DB_FILE));

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn parses_simulation_linear_with_seed() {
        let tmp = write_config(
            "tierdraft_config_simulation",
            r#"
[draft]
mode = "simulation"
pattern = "linear"
ai_pick_delay_ms = 0
seed = 7
rounds = 2

[data]
catalog = "roster.json"

[database]
path = ":memory:"
"#,
        );

        let config = load_config_from(&tmp).unwrap();
        assert_eq!(config.draft.mode, DraftMode::Simulation);
        assert_eq!(config.draft.pattern, DraftPattern::Linear);
        assert_eq!(config.draft.ai_pick_delay_ms, 0);
        assert_eq!(config.draft.seed, Some(7));
        assert_eq!(config.draft.rounds, Some(2));
        assert_eq!(config.db_path, ":memory:");

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_zero_rounds() {
        let tmp = write_config(
            "tierdraft_config_zero_rounds",
            "[draft]\nrounds = 0\n\n[data]\ncatalog = \"roster.json\"\n",
        );
        assert_validation_error(load_config_from(&tmp).unwrap_err(), "draft.rounds");
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_empty_catalog_path() {
        let tmp = write_config(
            "tierdraft_config_empty_catalog",
            "[draft]\n\n[data]\ncatalog = \"\"\n",
        );
        assert_validation_error(load_config_from(&tmp).unwrap_err(), "data.catalog");
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_empty_db_path() {
        let tmp = write_config(
            "tierdraft_config_empty_db",
            "[draft]\n\n[data]\ncatalog = \"roster.json\"\n\n[database]\npath = \" \"\n",
        );
        assert_validation_error(load_config_from(&tmp).unwrap_err(), "database.path");
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn parse_error_for_unknown_pattern() {
        let tmp = write_config(
            "tierdraft_config_bad_pattern",
            "[draft]\npattern = \"spiral\"\n\n[data]\ncatalog = \"roster.json\"\n",
        );

        match load_config_from(&tmp).unwrap_err() {
            ConfigError::ParseError { path, .. } => assert!(path.ends_with("draft.toml")),
            other => panic!("expected ParseError, got: {other}"),
        }

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn file_not_found_for_missing_draft_toml() {
        let tmp = std::env::temp_dir().join("tierdraft_config_missing");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("config")).unwrap();

        match load_config_from(&tmp).unwrap_err() {
            ConfigError::FileNotFound { path } => assert!(path.ends_with("draft.toml")),
            other => panic!("expected FileNotFound, got: {other}"),
        }

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_files_copies_missing_files() {
        let tmp = std::env::temp_dir().join("tierdraft_config_ensure_copies");
        let _ = fs::remove_dir_all(&tmp);

        let defaults_dir = tmp.join("defaults");
        fs::create_dir_all(&defaults_dir).unwrap();
        fs::copy(
            project_root().join("defaults/draft.toml"),
            defaults_dir.join("draft.toml"),
        )
        .unwrap();
        fs::write(defaults_dir.join("draft.toml.example"), "# template\n").unwrap();
        fs::write(defaults_dir.join("README.md"), "notes\n").unwrap();

        assert!(!tmp.join("config").exists());

        let copied = ensure_config_files(&tmp).expect("should succeed");
        assert_eq!(copied.len(), 1);
        assert!(tmp.join("config/draft.toml").exists());
        assert!(!tmp.join("config/draft.toml.example").exists());
        assert!(!tmp.join("config/README.md").exists());

        load_config_from(&tmp).expect("copied defaults should load");

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_files_skips_existing() {
        let tmp = std::env::temp_dir().join("tierdraft_config_ensure_skips");
        let _ = fs::remove_dir_all(&tmp);

        let defaults_dir = tmp.join("defaults");
        let config_dir = tmp.join("config");
        fs::create_dir_all(&defaults_dir).unwrap();
        fs::create_dir_all(&config_dir).unwrap();
        fs::copy(
            project_root().join("defaults/draft.toml"),
            defaults_dir.join("draft.toml"),
        )
        .unwrap();
        fs::write(config_dir.join("draft.toml"), "# custom\n").unwrap();

        let copied = ensure_config_files(&tmp).expect("should succeed");
        assert!(copied.is_empty());

        let content = fs::read_to_string(config_dir.join("draft.toml")).unwrap();
        assert_eq!(content, "# custom\n");

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_files_no_defaults_dir_is_ok() {
        let tmp = std::env::temp_dir().join("tierdraft_config_no_defaults");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("config")).unwrap();

        let copied = ensure_config_files(&tmp).expect("should succeed");
        assert!(copied.is_empty());

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_files_errors_when_both_dirs_missing() {
        let tmp = std::env::temp_dir().join("tierdraft_config_both_missing");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(&tmp).unwrap();

        match ensure_config_files(&tmp).unwrap_err() {
            ConfigError::DefaultsCopyError { message } => {
                assert!(message.contains("neither defaults/ nor config/"));
            }
            other => panic!("expected DefaultsCopyError, got: {other}"),
        }

        let _ = fs::remove_dir_all(&tmp);
    }
}
