use crate::errors::{ContentError, Result};
use crate::pattern::ContentPattern;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};

/// File names probed, in order, when no config path is given
pub const CONFIG_FILE_NAMES: &[&str] = &[
    "tailwind.config.js",
    "tailwind.config.cjs",
    "tailwind.config.mjs",
    "tailwind.config.ts",
    "tailwind.config.json",
    "tailwind.config.yaml",
    "tailwind.config.yml",
];

/// Tailwind build configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildConfiguration {
    /// Glob patterns of the files to scan for class usage
    pub content: Vec<String>,

    /// Theme overrides and extensions
    #[serde(default)]
    pub theme: Theme,

    /// Plugins to load
    #[serde(default)]
    pub plugins: Vec<Plugin>,
}

impl Default for BuildConfiguration {
    fn default() -> Self {
        Self {
            content: vec![
                "./templates/**/*.html".to_string(),
                "./events/templates/**/*.html".to_string(),
                "./**/templates/**/*.html".to_string(),
                "./**/*.py".to_string(),
            ],
            theme: Theme::default(),
            plugins: Vec::new(),
        }
    }
}

/// Theme configuration.
///
/// `extend` adds design tokens on top of the framework defaults; any other key
/// replaces the framework's value for that key outright.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    /// Theme extensions
    #[serde(default)]
    pub extend: IndexMap<String, Value>,

    /// Keys replacing framework defaults
    #[serde(flatten)]
    pub overrides: IndexMap<String, Value>,
}

impl Theme {
    /// True when the theme only uses framework defaults
    pub fn is_default(&self) -> bool {
        self.extend.is_empty() && self.overrides.is_empty()
    }
}

/// A plugin reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Plugin {
    /// Plugin loaded by module name
    Module(String),
    /// Plugin module invoked with an options object
    Configured { module: String, options: Value },
}

impl Plugin {
    pub fn module(&self) -> &str {
        match self {
            Plugin::Module(module) => module,
            Plugin::Configured { module, .. } => module,
        }
    }
}

/// Serialization formats for the build configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ConfigFormat {
    Json,
    Yaml,
    Js,
}

impl ConfigFormat {
    /// Detect the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|s| s.to_str()) {
            Some("json") => Some(Self::Json),
            Some("yaml") | Some("yml") => Some(Self::Yaml),
            Some("js") | Some("cjs") | Some("mjs") | Some("ts") => Some(Self::Js),
            _ => None,
        }
    }
}

/// Non-fatal findings of [`BuildConfiguration::validate`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationWarning {
    /// The same pattern appears more than once
    DuplicatePattern(String),
    /// The pattern walks the whole project tree
    BroadPattern(String),
    /// A plugin module is listed more than once
    DuplicatePlugin(String),
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationWarning::DuplicatePattern(p) => {
                write!(f, "content pattern '{}' is listed more than once", p)
            }
            ValidationWarning::BroadPattern(p) => write!(
                f,
                "content pattern '{}' scans the whole project tree; this can be slow",
                p
            ),
            ValidationWarning::DuplicatePlugin(m) => {
                write!(f, "plugin '{}' is listed more than once", m)
            }
        }
    }
}

impl BuildConfiguration {
    /// Parse configuration from a JSON string
    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| ContentError::ConfigError {
            message: format!("Failed to parse JSON config: {}", e),
        })
    }

    /// Parse configuration from a YAML string
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| ContentError::ConfigError {
            message: format!("Failed to parse YAML config: {}", e),
        })
    }

    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        Self::from_yaml_str(&read_config(path)?)
    }

    /// Load configuration from a JSON file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        Self::from_json_str(&read_config(path)?)
    }

    /// Load configuration from a JavaScript/TypeScript config module
    #[cfg(feature = "js")]
    pub fn from_js_file(path: &Path) -> Result<Self> {
        let source = read_config(path)?;
        crate::js_config::parse_config_module(&source, path)
    }

    /// Load configuration from a file (auto-detect format)
    pub fn from_file(path: &Path) -> Result<Self> {
        let config = match ConfigFormat::from_path(path) {
            Some(ConfigFormat::Json) => Self::from_json_file(path)?,
            Some(ConfigFormat::Yaml) => Self::from_yaml_file(path)?,
            #[cfg(feature = "js")]
            Some(ConfigFormat::Js) => Self::from_js_file(path)?,
            _ => {
                return Err(ContentError::UnsupportedFormat {
                    path: path.display().to_string(),
                })
            }
        };
        tracing::debug!(
            path = %path.display(),
            patterns = config.content.len(),
            plugins = config.plugins.len(),
            "loaded build configuration"
        );
        Ok(config)
    }

    /// Find a config file in `dir` using the conventional file names
    pub fn discover(dir: &Path) -> Option<PathBuf> {
        CONFIG_FILE_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|candidate| candidate.is_file())
    }

    /// Load the config at `path`, or the one discovered in `dir`, or fall
    /// back to the default configuration.
    pub fn load_or_discover(path: Option<&Path>, dir: &Path) -> Result<(Self, Option<PathBuf>)> {
        if let Some(path) = path {
            return Ok((Self::from_file(path)?, Some(path.to_path_buf())));
        }
        match Self::discover(dir) {
            Some(found) => Ok((Self::from_file(&found)?, Some(found))),
            None => {
                tracing::info!(dir = %dir.display(), "no config file found, using defaults");
                Ok((Self::default(), None))
            }
        }
    }

    /// Parse every content entry
    pub fn patterns(&self) -> Result<Vec<ContentPattern>> {
        self.content.iter().map(|raw| ContentPattern::parse(raw)).collect()
    }

    /// Check the invariants the scanner relies on.
    ///
    /// Returns an error for an empty `content` list or a pattern the glob
    /// engine cannot compile; everything else is reported as a warning.
    pub fn validate(&self) -> Result<Vec<ValidationWarning>> {
        if self.content.is_empty() {
            return Err(ContentError::ConfigError {
                message: "`content` must list at least one pattern".to_string(),
            });
        }

        let mut warnings = Vec::new();
        let mut seen = std::collections::HashSet::new();
        let mut includes = 0;

        for pattern in self.patterns()? {
            pattern.compile()?;
            // `./x` and `x` select the same files
            if !seen.insert((pattern.is_negated(), pattern.expansions().to_vec())) {
                warnings.push(ValidationWarning::DuplicatePattern(pattern.raw().to_string()));
                continue;
            }
            if pattern.is_negated() {
                continue;
            }
            includes += 1;
            if pattern.is_broad() {
                warnings.push(ValidationWarning::BroadPattern(pattern.raw().to_string()));
            }
        }

        if includes == 0 {
            return Err(ContentError::ConfigError {
                message: "`content` only contains exclusion patterns".to_string(),
            });
        }

        let mut modules = std::collections::HashSet::new();
        for plugin in &self.plugins {
            if !modules.insert(plugin.module()) {
                warnings.push(ValidationWarning::DuplicatePlugin(plugin.module().to_string()));
            }
        }

        for warning in &warnings {
            tracing::warn!("{}", warning);
        }

        Ok(warnings)
    }

    /// Merge with another configuration
    pub fn merge(mut self, other: Self) -> Self {
        for pattern in other.content {
            if !self.content.contains(&pattern) {
                self.content.push(pattern);
            }
        }

        self.theme.extend.extend(other.theme.extend);
        self.theme.overrides.extend(other.theme.overrides);

        for plugin in other.plugins {
            if !self.plugins.contains(&plugin) {
                self.plugins.push(plugin);
            }
        }

        self
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Render as a `tailwind.config.js` module
    pub fn to_js_module(&self) -> String {
        crate::render::render_js_module(self)
    }

    /// Render in the requested format
    pub fn render(&self, format: ConfigFormat) -> Result<String> {
        match format {
            ConfigFormat::Json => self.to_json_pretty().map(|mut s| {
                s.push('\n');
                s
            }),
            ConfigFormat::Yaml => self.to_yaml(),
            ConfigFormat::Js => Ok(self.to_js_module()),
        }
    }
}

fn read_config(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| ContentError::ConfigError {
        message: format!("Failed to read config file {}: {}", path.display(), e),
    })
}
