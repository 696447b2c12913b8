//! Application configuration for the curriculum seeder.
//!
//! User config lives at `~/.curriculum-seeder/seeder.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SeederError};
use crate::types::{DEFAULT_LOGO_URL, MAX_EXERCISE_NAME_LEN};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "seeder.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".curriculum-seeder";

// ---------------------------------------------------------------------------
// Config structs (matching seeder.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Where the curriculum lives and how its files are read.
    #[serde(default)]
    pub curriculum: CurriculumConfig,

    /// Content service settings.
    #[serde(default)]
    pub remote: RemoteConfig,

    /// Reconciliation settings.
    #[serde(default)]
    pub sync: SyncConfig,
}

/// How malformed `faq` fences are handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FaqMode {
    /// Reject blocks that do not have the question/options/answer/explanation shape.
    #[default]
    Strict,
    /// Positional legacy parsing; never fails.
    Lenient,
}

/// `[curriculum]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurriculumConfig {
    /// Root directory holding one folder per course.
    #[serde(default = "default_root")]
    pub root: String,

    /// Per-course outline file.
    #[serde(default = "default_outline_file")]
    pub outline_file: String,

    /// Per-course descriptor file.
    #[serde(default = "default_descriptor_file")]
    pub descriptor_file: String,

    /// Fence language emitted as a code block.
    #[serde(default = "default_code_language")]
    pub code_language: String,

    /// Fence language holding exercise metadata (`name: ...`).
    #[serde(default = "default_meta_language")]
    pub meta_language: String,

    /// Language tag written into every content envelope.
    #[serde(default = "default_content_lang")]
    pub content_lang: String,

    /// Prefix for each exercise's `github_link`.
    #[serde(default = "default_github_base_url")]
    pub github_base_url: String,

    /// Logo used when a descriptor has none.
    #[serde(default = "default_logo")]
    pub default_logo: String,

    /// Exercises with longer names are excluded.
    #[serde(default = "default_max_name_len")]
    pub max_name_len: usize,

    #[serde(default)]
    pub faq_mode: FaqMode,

    /// Maximum exercise files parsed at once.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for CurriculumConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            outline_file: default_outline_file(),
            descriptor_file: default_descriptor_file(),
            code_language: default_code_language(),
            meta_language: default_meta_language(),
            content_lang: default_content_lang(),
            github_base_url: default_github_base_url(),
            default_logo: default_logo(),
            max_name_len: default_max_name_len(),
            faq_mode: FaqMode::default(),
            concurrency: default_concurrency(),
        }
    }
}

fn default_root() -> String {
    "curriculum".into()
}
fn default_outline_file() -> String {
    "index.md".into()
}
fn default_descriptor_file() -> String {
    "info.md".into()
}
fn default_code_language() -> String {
    "python".into()
}
fn default_meta_language() -> String {
    "ngMeta".into()
}
fn default_content_lang() -> String {
    "hi".into()
}
fn default_github_base_url() -> String {
    "https://github.com/navgurukul/newton/tree/master".into()
}
fn default_logo() -> String {
    DEFAULT_LOGO_URL.into()
}
fn default_max_name_len() -> usize {
    MAX_EXERCISE_NAME_LEN
}
fn default_concurrency() -> usize {
    8
}

/// `[remote]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Base URL of the content service.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:5000".into()
}
fn default_timeout_secs() -> u64 {
    30
}

/// `[sync]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Maximum remote calls in flight.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Look up each exercise by slug before upserting it.
    #[serde(default = "default_true")]
    pub resolve_exercise_ids: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            resolve_exercise_ids: true,
        }
    }
}

fn default_true() -> bool {
    true
}

impl AppConfig {
    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.remote.base_url).map_err(|e| {
            SeederError::config(format!(
                "remote.base_url '{}' is not a valid URL: {e}",
                self.remote.base_url
            ))
        })?;

        if self.curriculum.concurrency == 0 || self.sync.concurrency == 0 {
            return Err(SeederError::config("concurrency must be at least 1"));
        }

        if self.curriculum.max_name_len == 0 {
            return Err(SeederError::config("curriculum.max_name_len must be at least 1"));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.curriculum-seeder/`).
pub fn config_dir() -> Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| SeederError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.curriculum-seeder/seeder.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| SeederError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| SeederError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| SeederError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content = toml::to_string_pretty(&config).map_err(|e| SeederError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| SeederError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
