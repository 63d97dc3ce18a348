use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised when a config file is explicitly requested or saved.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine config directory")]
    NoConfigDir,

    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub index: IndexConfig,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub selectors: SelectorConfig,

    #[serde(default)]
    pub animation: AnimationConfig,

    #[serde(default)]
    pub ui: UiConfig,
}

/// Tree indexing options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Category labels excluded from the index (compared trimmed and lowercased)
    #[serde(default = "default_skipped_categories")]
    pub skipped_categories: Vec<String>,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            skipped_categories: default_skipped_categories(),
        }
    }
}

impl IndexConfig {
    /// Check a normalized category label against the skip-list.
    pub fn is_skipped(&self, name: &str) -> bool {
        self.skipped_categories
            .iter()
            .any(|skipped| skipped.trim().to_lowercase() == name)
    }
}

fn default_skipped_categories() -> Vec<String> {
    vec!["manual".to_string()]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Queries shorter than this (in characters) reset the tree to its idle state
    #[serde(default = "default_min_query_len")]
    pub min_query_len: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            min_query_len: default_min_query_len(),
        }
    }
}

fn default_min_query_len() -> usize {
    2
}

/// CSS selectors locating the navigation markup.
///
/// Nested levels are searched below their parent match: `category_heading`
/// and `sections` inside a category, `section_disclosure` inside a section
/// item, `section_summary_link` and `entries` inside the disclosure. A level
/// that finds nothing is skipped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorConfig {
    #[serde(default = "default_contents_selector")]
    pub contents: String,

    #[serde(default = "default_category_selector")]
    pub category: String,

    #[serde(default = "default_category_heading_selector")]
    pub category_heading: String,

    /// Section list items; matches nested inside another match are ignored
    #[serde(default = "default_sections_selector")]
    pub sections: String,

    #[serde(default = "default_section_disclosure_selector")]
    pub section_disclosure: String,

    /// Link whose text labels the section
    #[serde(default = "default_section_summary_link_selector")]
    pub section_summary_link: String,

    /// Entry links; each is bound to its parent element
    #[serde(default = "default_entries_selector")]
    pub entries: String,

    /// Disclosure scrolled into view on startup when already open
    #[serde(default = "default_open_disclosure_selector")]
    pub open_disclosure: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            contents: default_contents_selector(),
            category: default_category_selector(),
            category_heading: default_category_heading_selector(),
            sections: default_sections_selector(),
            section_disclosure: default_section_disclosure_selector(),
            section_summary_link: default_section_summary_link_selector(),
            entries: default_entries_selector(),
            open_disclosure: default_open_disclosure_selector(),
        }
    }
}

fn default_contents_selector() -> String {
    "body > main > nav > section".to_string()
}

fn default_category_selector() -> String {
    ".category".to_string()
}

fn default_category_heading_selector() -> String {
    "summary > h2".to_string()
}

fn default_sections_selector() -> String {
    "ul > li".to_string()
}

fn default_section_disclosure_selector() -> String {
    "details".to_string()
}

fn default_section_summary_link_selector() -> String {
    "summary > a".to_string()
}

fn default_entries_selector() -> String {
    "ul > li > a".to_string()
}

fn default_open_disclosure_selector() -> String {
    ".category > ul > li > details[open]".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimationConfig {
    /// When disabled, disclosure toggles snap instantly
    #[serde(default = "default_animation_enabled")]
    pub enabled: bool,

    #[serde(default = "default_animation_duration_ms")]
    pub duration_ms: u64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            enabled: default_animation_enabled(),
            duration_ms: default_animation_duration_ms(),
        }
    }
}

fn default_animation_enabled() -> bool {
    true
}

fn default_animation_duration_ms() -> u64 {
    300
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Tree rendering style: "compact" (default, gapless) or "spaced"
    #[serde(default = "default_tree_style")]
    pub tree_style: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tree_style: default_tree_style(),
        }
    }
}

fn default_tree_style() -> String {
    "compact".to_string()
}

impl Config {
    /// Get the platform-specific config file path
    /// - macOS: ~/Library/Application Support/docnav/config.toml
    /// - Linux: ~/.config/docnav/config.toml
    /// - Windows: %APPDATA%/docnav/config.toml
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("docnav").join("config.toml"))
    }

    /// Load config from the default location, or return defaults if the file
    /// is missing or unreadable.
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(error = %e, "ignoring config file");
                Self::default()
            }
        }
    }

    /// Load config from an explicit path. Unlike [`Config::load`], failures are reported.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::config_path().ok_or(ConfigError::NoConfigDir)?;
        self.save_to(&path)
    }

    /// Save config atomically: written to a sibling temp file, then renamed over `path`.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source: std::io::Error| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };

        let parent = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        fs::create_dir_all(parent).map_err(io_err)?;

        let contents = self.to_toml()?;
        let mut file = tempfile::NamedTempFile::new_in(parent).map_err(io_err)?;
        file.write_all(contents.as_bytes()).map_err(io_err)?;
        file.persist(path).map_err(|e| io_err(e.error))?;

        Ok(())
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check if compact (gapless) tree style is enabled
    pub fn is_compact_tree(&self) -> bool {
        self.ui.tree_style == "compact"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.index.skipped_categories, vec!["manual"]);
        assert_eq!(config.search.min_query_len, 2);
        assert_eq!(config.animation.duration_ms, 300);
        assert!(config.is_compact_tree());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
[index]
skipped_categories = ["Manual", "changelog"]
"#,
        )
        .unwrap();

        assert!(config.index.is_skipped("manual"));
        assert!(config.index.is_skipped("changelog"));
        assert!(!config.index.is_skipped("guides"));
        assert_eq!(config.search.min_query_len, 2);
        assert_eq!(config.selectors.category, ".category");
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.search.min_query_len = 3;
        config.animation.enabled = false;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.search.min_query_len, 3);
        assert!(!loaded.animation.enabled);
    }

    #[test]
    fn test_load_from_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[search]\nmin_query_len = \"two\"\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
