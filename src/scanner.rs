//! Utility-class candidate extraction.
//!
//! Matched content files are not parsed: every file is tokenized the same
//! way, whatever its language, and each token that looks like it could be a
//! utility class is kept. Plain words such as `div` or `render` come out as
//! candidates too.

use indicatif::ProgressBar;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;

use crate::errors::{ContentError, Result};

/// Longest token still considered a class
const MAX_CANDIDATE_LEN: usize = 100;

/// Information about an extracted candidate
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Candidate {
    /// The token as it appears in the source
    pub value: String,
    /// Source file path
    pub file_path: String,
    /// Line number in source file (1-indexed)
    pub line: usize,
    /// Column number in source file (0-indexed, bytes)
    pub column: usize,
}

impl Candidate {
    /// `path:line:column`
    pub fn location(&self) -> String {
        format!("{}:{}:{}", self.file_path, self.line, self.column)
    }
}

fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"[^<>"'`\s{}=;]*[^<>"'`\s{}=;:]"#).expect("candidate token regex is valid")
    })
}

/// Check if a token could be a utility class
pub fn is_candidate(token: &str) -> bool {
    if token.is_empty() || token.len() > MAX_CANDIDATE_LEN {
        return false;
    }

    if !token.chars().any(|c| c.is_ascii_alphabetic()) {
        return false;
    }

    // Closing tags, paths and member access
    if token.starts_with('/') || token.starts_with('.') {
        return false;
    }

    // Template and markup syntax never appears inside a class name
    if token.contains('<') || token.contains('>') ||
       token.contains('{') || token.contains('}') ||
       token.contains(';') {
        return false;
    }

    token.chars().all(|c| {
        c.is_alphanumeric() ||
        "-:/.[]!()#%&*_@,+".contains(c)
    })
}

/// Extract candidates from in-memory content
pub fn extract_candidates_from_content(content: &str, source_name: &str) -> Vec<Candidate> {
    let pattern = token_pattern();
    let mut candidates = Vec::new();

    for (index, line) in content.lines().enumerate() {
        for token in pattern.find_iter(line) {
            let value = token.as_str();
            if !is_candidate(value) {
                continue;
            }
            candidates.push(Candidate {
                value: value.to_string(),
                file_path: source_name.to_string(),
                line: index + 1,
                column: token.start(),
            });
        }
    }

    candidates
}

/// Read a file and extract its candidates
pub fn extract_candidates_from_file(file_path: &Path) -> Result<Vec<Candidate>> {
    let bytes = std::fs::read(file_path).map_err(|e| ContentError::InputError(format!(
        "Failed to read {}: {}",
        file_path.display(),
        e
    )))?;

    if bytes.is_empty() {
        return Ok(Vec::new());
    }

    let content = String::from_utf8_lossy(&bytes);
    Ok(extract_candidates_from_content(&content, &file_path.display().to_string()))
}

/// Process files in parallel and extract candidates.
///
/// Results keep the order of `files`. When `jobs` is set a dedicated thread
/// pool of that size is used instead of the global one.
pub fn extract_candidates_parallel(
    files: &[PathBuf],
    jobs: Option<usize>,
    progress_bar: Option<&ProgressBar>,
) -> Result<Vec<Candidate>> {
    use rayon::prelude::*;

    let processed = AtomicUsize::new(0);

    let run = || -> Result<Vec<Vec<Candidate>>> {
        files
            .par_iter()
            .map(|file_path| {
                let result = extract_candidates_from_file(file_path);

                if let Some(pb) = progress_bar {
                    let count = processed.fetch_add(1, Ordering::Relaxed) + 1;
                    pb.set_position(count as u64);
                    pb.set_message(format!(
                        "Scanning: {}",
                        file_path.file_name().unwrap_or_default().to_string_lossy()
                    ));
                }

                result
            })
            .collect()
    };

    let results = match jobs {
        Some(num_jobs) => rayon::ThreadPoolBuilder::new()
            .num_threads(num_jobs)
            .build()
            .map_err(|e| ContentError::InvalidInput(format!("Cannot build thread pool: {}", e)))?
            .install(run)?,
        None => run()?,
    };

    Ok(results.into_iter().flatten().collect())
}
