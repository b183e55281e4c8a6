use crate::content::PatternMatch;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Version of the manifest format
pub const MANIFEST_VERSION: &str = "1.0.0";

/// Metadata for the generated manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestMetadata {
    /// Version of the manifest format
    pub version: String,

    /// Timestamp when the manifest was generated
    pub generated_at: DateTime<Utc>,

    /// Config file the content patterns came from (None: built-in defaults)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_path: Option<String>,

    /// Number of files scanned
    pub files_scanned: usize,

    /// Number of unique candidates found
    pub candidates_found: usize,

    /// Scanner version
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scanner_version: Option<String>,
}

/// Usage information for one candidate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestClassInfo {
    /// Number of occurrences
    pub count: usize,

    /// Locations (`path:line:column`)
    pub files: Vec<String>,
}

/// Complete manifest structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    /// Metadata about the scan
    pub metadata: ManifestMetadata,

    /// Match counts per content pattern
    pub patterns: Vec<PatternMatch>,

    /// Map of candidate names to their usage information
    pub classes: IndexMap<String, ManifestClassInfo>,

    /// Statistics about the scan
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statistics: Option<ManifestStatistics>,
}

/// Statistics about the scan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestStatistics {
    /// Number of files that matched patterns
    pub files_matched: usize,

    /// Number of files containing at least one candidate
    pub files_with_classes: usize,

    /// Bytes read from content files
    pub bytes_scanned: u64,

    /// Processing time in milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_time_ms: Option<u64>,

    /// Most used candidates
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_classes: Option<Vec<TopClass>>,
}

/// Information about frequently used candidates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopClass {
    pub name: String,
    pub count: usize,
    pub file_count: usize,
}

impl Manifest {
    /// Create a new manifest with default metadata
    pub fn new() -> Self {
        Self {
            metadata: ManifestMetadata {
                version: MANIFEST_VERSION.to_string(),
                generated_at: Utc::now(),
                config_path: None,
                files_scanned: 0,
                candidates_found: 0,
                scanner_version: Some(env!("CARGO_PKG_VERSION").to_string()),
            },
            patterns: Vec::new(),
            classes: IndexMap::new(),
            statistics: None,
        }
    }

    /// Record one occurrence of a candidate
    pub fn add_class(&mut self, class_name: String, file_location: String) {
        let entry = self.classes.entry(class_name).or_insert_with(|| ManifestClassInfo {
            count: 0,
            files: Vec::new(),
        });

        entry.count += 1;
        if !entry.files.contains(&file_location) {
            entry.files.push(file_location);
        }
        self.metadata.candidates_found = self.classes.len();
    }

    /// Calculate and set statistics
    pub fn calculate_statistics(&mut self, bytes_scanned: u64, processing_time_ms: Option<u64>) {
        let mut files_with_classes = std::collections::HashSet::new();
        for class_info in self.classes.values() {
            for location in &class_info.files {
                files_with_classes.insert(location_path(location));
            }
        }

        let mut class_list: Vec<_> = self
            .classes
            .iter()
            .map(|(name, info)| TopClass {
                name: name.clone(),
                count: info.count,
                file_count: info.files.len(),
            })
            .collect();

        // Stable sort keeps first-seen order among equal counts
        class_list.sort_by(|a, b| b.count.cmp(&a.count));
        let top_classes = class_list.into_iter().take(10).collect();

        self.statistics = Some(ManifestStatistics {
            files_matched: self.metadata.files_scanned,
            files_with_classes: files_with_classes.len(),
            bytes_scanned,
            processing_time_ms,
            top_classes: Some(top_classes),
        });
    }

    /// Sorted candidate names
    pub fn class_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.classes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Convert manifest to JSON value
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| serde_json::json!({}))
    }

    /// Convert manifest to pretty JSON string
    pub fn to_pretty_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Convert manifest to compact JSON string
    pub fn to_compact_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl Default for Manifest {
    fn default() -> Self {
        Self::new()
    }
}

/// Strip the trailing `:line:column` from a location
fn location_path(location: &str) -> &str {
    let mut parts = location.rsplitn(3, ':');
    let (Some(_column), Some(_line), Some(path)) = (parts.next(), parts.next(), parts.next()) else {
        return location;
    };
    path
}

/// Builder pattern for creating manifests
pub struct ManifestBuilder {
    manifest: Manifest,
    start_time: Option<std::time::Instant>,
}

impl ManifestBuilder {
    /// Create a new manifest builder
    pub fn new() -> Self {
        Self {
            manifest: Manifest::new(),
            start_time: Some(std::time::Instant::now()),
        }
    }

    pub fn with_config_path(mut self, path: Option<String>) -> Self {
        self.manifest.metadata.config_path = path;
        self
    }

    /// Set the number of files scanned
    pub fn with_files_scanned(mut self, count: usize) -> Self {
        self.manifest.metadata.files_scanned = count;
        self
    }

    pub fn with_patterns(mut self, patterns: Vec<PatternMatch>) -> Self {
        self.manifest.patterns = patterns;
        self
    }

    /// Add candidate locations
    pub fn with_class_info(mut self, classes: IndexMap<String, Vec<String>>) -> Self {
        for (class_name, locations) in classes {
            let mut files = Vec::new();
            for location in &locations {
                if !files.contains(location) {
                    files.push(location.clone());
                }
            }
            let info = ManifestClassInfo {
                count: locations.len(),
                files,
            };
            self.manifest.classes.insert(class_name, info);
        }
        self.manifest.metadata.candidates_found = self.manifest.classes.len();
        self
    }

    /// Build the final manifest with statistics
    pub fn build(mut self, bytes_scanned: u64) -> Manifest {
        let processing_time = self.start_time.map(|t| t.elapsed().as_millis() as u64);
        self.manifest.calculate_statistics(bytes_scanned, processing_time);
        self.manifest
    }
}

impl Default for ManifestBuilder {
    fn default() -> Self {
        Self::new()
    }
}
