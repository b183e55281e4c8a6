//! Resolution of the `content` globs into the set of files a scan inspects.

use crate::config::BuildConfiguration;
use crate::errors::{ContentError, Result};
use crate::pattern::{ContentPattern, ExclusionSet};
use std::collections::HashSet;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Directory names skipped unless a pattern names them explicitly
pub const DEFAULT_IGNORED_DIRS: &[&str] = &["node_modules", ".git", "__pycache__"];

/// Security configuration
#[derive(Debug, Clone)]
pub struct SecurityConfig {
    /// Maximum file size in bytes (default: 10MB)
    pub max_file_size: u64,
    /// Allow symbolic links
    pub allow_symlinks: bool,
    /// Symlink targets must stay inside this directory
    pub working_directory: PathBuf,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_file_size: 10 * 1024 * 1024, // 10MB
            allow_symlinks: false,
            working_directory: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }
}

impl SecurityConfig {
    /// Default limits, confined to `root`
    pub fn for_root(root: &Path) -> Self {
        Self {
            working_directory: root.to_path_buf(),
            ..Self::default()
        }
    }
}

/// A file selected by the content patterns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentFile {
    pub path: PathBuf,
    /// Path relative to the resolver root
    pub relative: PathBuf,
    pub size: u64,
}

/// How many files a single content entry matched
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PatternMatch {
    pub pattern: String,
    pub negated: bool,
    /// Files matched, counting files an earlier pattern already selected.
    /// Always 0 for exclusions.
    pub matched: usize,
}

/// Result of resolving a configuration's content patterns
#[derive(Debug, Clone, Default)]
pub struct ResolvedContent {
    /// Unique files, in the order they were first matched
    pub files: Vec<ContentFile>,
    pub patterns: Vec<PatternMatch>,
    /// Files dropped by the security checks
    pub skipped: usize,
}

impl ResolvedContent {
    /// Include patterns that matched no file
    pub fn unmatched_patterns(&self) -> Vec<&str> {
        self.patterns
            .iter()
            .filter(|p| !p.negated && p.matched == 0)
            .map(|p| p.pattern.as_str())
            .collect()
    }

    pub fn total_bytes(&self) -> u64 {
        self.files.iter().map(|f| f.size).sum()
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.iter().map(|f| f.path.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Expands content patterns against a root directory
#[derive(Debug, Clone)]
pub struct ContentResolver {
    root: PathBuf,
    security: SecurityConfig,
    ignored_dirs: Vec<String>,
    extra_excludes: Vec<String>,
}

impl ContentResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root: PathBuf = root.into();
        let root = if root.as_os_str().is_empty() { PathBuf::from(".") } else { root };
        let root = root.canonicalize().unwrap_or(root);
        Self {
            security: SecurityConfig::for_root(&root),
            root,
            ignored_dirs: DEFAULT_IGNORED_DIRS.iter().map(|d| d.to_string()).collect(),
            extra_excludes: Vec::new(),
        }
    }

    pub fn with_security(mut self, security: SecurityConfig) -> Self {
        self.security = security;
        self
    }

    pub fn with_ignored_dirs<I, S>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignored_dirs = dirs.into_iter().map(Into::into).collect();
        self
    }

    /// Additional exclusion globs, written without the leading `!`
    pub fn with_excludes(mut self, excludes: &[String]) -> Self {
        self.extra_excludes.extend(excludes.iter().cloned());
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Expand every include pattern, minus exclusions, ignored directories
    /// and files rejected by the security checks.
    pub fn resolve(&self, config: &BuildConfiguration) -> Result<ResolvedContent> {
        let patterns = config.patterns()?;

        let mut exclusions = ExclusionSet::new();
        for pattern in patterns.iter().filter(|p| p.is_negated()) {
            exclusions.add(pattern)?;
        }
        for raw in &self.extra_excludes {
            exclusions.add(&ContentPattern::parse(raw.trim_start_matches('!'))?)?;
        }

        let mut resolved = ResolvedContent::default();
        let mut seen = HashSet::new();

        for pattern in &patterns {
            if pattern.is_negated() {
                resolved.patterns.push(PatternMatch {
                    pattern: pattern.raw().to_string(),
                    negated: true,
                    matched: 0,
                });
                continue;
            }

            // Surfaces syntax errors with the raw pattern text
            pattern.compile()?;

            let mut matched = 0;
            for expansion in pattern.expansions() {
                let explicit = self.explicitly_named_dirs(expansion);
                for entry in glob::glob(&self.absolute_pattern(expansion))? {
                    let path = match entry {
                        Ok(path) => path,
                        Err(e) => {
                            tracing::warn!("Skipping unreadable path: {}", e);
                            continue;
                        }
                    };

                    if path.is_dir() {
                        continue;
                    }

                    let relative = path.strip_prefix(&self.root).unwrap_or(&path).to_path_buf();
                    if self.is_ignored(&relative, &explicit) || exclusions.matches(&relative) {
                        continue;
                    }

                    matched += 1;
                    if !seen.insert(path.clone()) {
                        continue;
                    }

                    let size = match validate_input_file(&path, &self.security) {
                        Ok(size) => size,
                        Err(e) => {
                            tracing::warn!("Skipping file - {}", e);
                            resolved.skipped += 1;
                            continue;
                        }
                    };
                    resolved.files.push(ContentFile { path, relative, size });
                }
            }

            tracing::debug!(pattern = pattern.raw(), matched, "resolved content pattern");
            resolved.patterns.push(PatternMatch {
                pattern: pattern.raw().to_string(),
                negated: false,
                matched,
            });
        }

        if resolved.skipped > 0 {
            tracing::warn!("Skipped {} files due to security constraints", resolved.skipped);
        }
        for pattern in resolved.unmatched_patterns() {
            tracing::info!(pattern, "content pattern matched no files");
        }

        Ok(resolved)
    }

    fn absolute_pattern(&self, expansion: &str) -> String {
        if Path::new(expansion).is_absolute() {
            return expansion.to_string();
        }
        let root = glob::Pattern::escape(&self.root.to_string_lossy());
        format!("{}/{}", root.trim_end_matches('/'), expansion)
    }

    /// Ignored directory names the pattern spells out literally
    fn explicitly_named_dirs(&self, expansion: &str) -> Vec<String> {
        expansion
            .split('/')
            .filter(|segment| self.ignored_dirs.iter().any(|d| d == segment))
            .map(str::to_string)
            .collect()
    }

    fn is_ignored(&self, relative: &Path, explicit: &[String]) -> bool {
        let Some(parent) = relative.parent() else {
            return false;
        };
        parent.components().any(|component| match component {
            Component::Normal(name) => name
                .to_str()
                .map(|name| {
                    self.ignored_dirs.iter().any(|d| d == name) && !explicit.iter().any(|e| e == name)
                })
                .unwrap_or(false),
            _ => false,
        })
    }
}

/// Check if a file is safe to read, returning its size in bytes
fn validate_input_file(path: &Path, security: &SecurityConfig) -> Result<u64> {
    if path.is_symlink() {
        if !security.allow_symlinks {
            return Err(ContentError::SecurityError(format!(
                "Symbolic link not allowed: {}",
                path.display()
            )));
        }

        let target = fs::canonicalize(path).map_err(|e| {
            ContentError::SecurityError(format!(
                "Cannot resolve symlink target for '{}': {}",
                path.display(),
                e
            ))
        })?;
        let working_dir = security
            .working_directory
            .canonicalize()
            .unwrap_or_else(|_| security.working_directory.clone());

        if !target.starts_with(&working_dir) {
            return Err(ContentError::SecurityError(format!(
                "Symlink target '{}' is outside working directory",
                target.display()
            )));
        }
    }

    let metadata = fs::metadata(path).map_err(|e| {
        ContentError::SecurityError(format!(
            "Cannot read file metadata for '{}': {}",
            path.display(),
            e
        ))
    })?;

    if metadata.len() > security.max_file_size {
        return Err(ContentError::SecurityError(format!(
            "File '{}' exceeds maximum size limit ({} MB > {} MB)",
            path.display(),
            metadata.len() / (1024 * 1024),
            security.max_file_size / (1024 * 1024)
        )));
    }

    Ok(metadata.len())
}
