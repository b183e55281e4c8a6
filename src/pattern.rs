//! Content pattern handling.
//!
//! Content entries are glob patterns relative to the project root, in the
//! syntax the build tool accepts: an optional leading `!` turns the entry into
//! an exclusion, a leading `./` is cosmetic, and `{a,b}` alternatives are
//! expanded before the pattern reaches the `glob` crate (which has no brace
//! support of its own).

use crate::errors::{ContentError, Result};
use glob::MatchOptions;
use indexmap::IndexSet;
use std::path::Path;

/// A single parsed entry of the `content` list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentPattern {
    /// Pattern text as written in the configuration
    raw: String,
    /// Whether the entry excludes files instead of including them
    negated: bool,
    /// Brace-expanded, normalized glob patterns
    expansions: Vec<String>,
}

impl ContentPattern {
    /// Parse a raw content entry
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let (negated, body) = match trimmed.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };

        let body = normalize(body);
        if body.is_empty() {
            return Err(ContentError::InvalidPattern {
                pattern: raw.to_string(),
                message: "pattern is empty".to_string(),
            });
        }

        let expansions = expand_braces(body).map_err(|e| match e {
            ContentError::InvalidPattern { message, .. } => ContentError::InvalidPattern {
                pattern: raw.to_string(),
                message,
            },
            other => other,
        })?;

        Ok(Self {
            raw: raw.to_string(),
            negated,
            expansions,
        })
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn is_negated(&self) -> bool {
        self.negated
    }

    pub fn expansions(&self) -> &[String] {
        &self.expansions
    }

    /// Compile every expansion into a `glob::Pattern`
    pub fn compile(&self) -> Result<Vec<glob::Pattern>> {
        self.expansions
            .iter()
            .map(|expansion| {
                glob::Pattern::new(expansion).map_err(|e| ContentError::InvalidPattern {
                    pattern: self.raw.clone(),
                    message: e.to_string(),
                })
            })
            .collect()
    }

    /// True when an expansion starts with a recursive wildcard at the root,
    /// so the whole project tree gets walked.
    pub fn is_broad(&self) -> bool {
        self.expansions
            .iter()
            .any(|e| e.split('/').next() == Some("**"))
    }
}

/// Strip leading `./` segments
fn normalize(pattern: &str) -> &str {
    let mut rest = pattern;
    while let Some(stripped) = rest.strip_prefix("./") {
        rest = stripped;
    }
    rest
}

/// Upper bound on the patterns a single entry may expand to
pub const MAX_BRACE_EXPANSIONS: usize = 256;

/// Expand `{a,b}` alternatives, including nested groups.
///
/// An opening brace without a matching close brace, or a group without a
/// top-level comma, is kept literally. Duplicates are dropped, first one wins.
/// Fails when the alternatives multiply out to more than
/// [`MAX_BRACE_EXPANSIONS`] patterns.
pub fn expand_braces(pattern: &str) -> Result<Vec<String>> {
    let mut expanded = IndexSet::new();
    let mut budget = MAX_BRACE_EXPANSIONS;
    if !expand_into(pattern, &mut expanded, &mut budget) {
        return Err(ContentError::InvalidPattern {
            pattern: pattern.to_string(),
            message: format!(
                "brace expansion produces more than {} patterns",
                MAX_BRACE_EXPANSIONS
            ),
        });
    }
    Ok(expanded.into_iter().collect())
}

/// Returns false once `budget` generated patterns are used up
fn expand_into(pattern: &str, out: &mut IndexSet<String>, budget: &mut usize) -> bool {
    let Some((open, close)) = find_brace_group(pattern) else {
        if *budget == 0 {
            return false;
        }
        *budget -= 1;
        out.insert(pattern.to_string());
        return true;
    };

    let prefix = &pattern[..open];
    let body = &pattern[open + 1..close];
    let suffix = &pattern[close + 1..];

    let alternatives = split_top_level(body);
    if alternatives.len() < 2 {
        // Not an alternation; keep the group and expand what follows it.
        let head = &pattern[..=close];
        let mut tails = IndexSet::new();
        if !expand_into(suffix, &mut tails, budget) {
            return false;
        }
        out.extend(tails.into_iter().map(|tail| format!("{}{}", head, tail)));
        return true;
    }

    for alternative in alternatives {
        let candidate = format!("{}{}{}", prefix, alternative, suffix);
        if !expand_into(&candidate, out, budget) {
            return false;
        }
    }
    true
}

/// Locate the first `{` and its matching `}`
fn find_brace_group(pattern: &str) -> Option<(usize, usize)> {
    let open = pattern.find('{')?;
    let mut depth = 0usize;
    for (i, ch) in pattern[open..].char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some((open, open + i));
                }
            }
            _ => {}
        }
    }
    None
}

/// Split on commas that are not nested inside another brace group
fn split_top_level(body: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, ch) in body.char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&body[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&body[start..]);
    parts
}

/// Compiled exclusion patterns, matched against root-relative paths
#[derive(Debug, Default, Clone)]
pub struct ExclusionSet {
    patterns: Vec<glob::Pattern>,
}

impl ExclusionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, pattern: &ContentPattern) -> Result<()> {
        self.patterns.extend(pattern.compile()?);
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// `*` and `?` stop at `/`, as they do for include patterns walked by
    /// `glob::glob`; only `**` crosses directories.
    pub fn matches(&self, relative: &Path) -> bool {
        let options = MatchOptions {
            require_literal_separator: true,
            ..MatchOptions::new()
        };
        self.patterns
            .iter()
            .any(|p| p.matches_path_with(relative, options))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_strips_dot_slash() {
        let pattern = ContentPattern::parse("./templates/**/*.html").unwrap();
        assert_eq!(pattern.raw(), "./templates/**/*.html");
        assert!(!pattern.is_negated());
        assert_eq!(pattern.expansions(), &["templates/**/*.html".to_string()]);
    }

    #[test]
    fn test_parse_negation() {
        let pattern = ContentPattern::parse("!./static/vendor/**").unwrap();
        assert!(pattern.is_negated());
        assert_eq!(pattern.expansions(), &["static/vendor/**".to_string()]);
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert!(ContentPattern::parse("").is_err());
        assert!(ContentPattern::parse("!").is_err());
        assert!(ContentPattern::parse("./").is_err());
    }

    #[test]
    fn test_brace_expansion() {
        assert_eq!(
            expand_braces("src/**/*.{html,py}").unwrap(),
            vec!["src/**/*.html", "src/**/*.py"]
        );
        assert_eq!(
            expand_braces("{a,b}/{c,d}.txt").unwrap(),
            vec!["a/c.txt", "a/d.txt", "b/c.txt", "b/d.txt"]
        );
        assert_eq!(
            expand_braces("src/*.{js,{ts,tsx}}").unwrap(),
            vec!["src/*.js", "src/*.ts", "src/*.tsx"]
        );
    }

    #[test]
    fn test_brace_expansion_literal_cases() {
        assert_eq!(expand_braces("no/braces/*.html").unwrap(), vec!["no/braces/*.html"]);
        assert_eq!(expand_braces("unclosed/{a,b").unwrap(), vec!["unclosed/{a,b"]);
        assert_eq!(expand_braces("single/{a}/*.{x,y}").unwrap(), vec!["single/{a}/*.x", "single/{a}/*.y"]);
    }

    #[test]
    fn test_compile_reports_raw_pattern() {
        let pattern = ContentPattern::parse("./templates/***/*.html").unwrap();
        match pattern.compile() {
            Err(ContentError::InvalidPattern { pattern, .. }) => {
                assert_eq!(pattern, "./templates/***/*.html");
            }
            other => panic!("expected InvalidPattern, got {:?}", other),
        }
    }

    #[test]
    fn test_is_broad() {
        assert!(ContentPattern::parse("./**/*.py").unwrap().is_broad());
        assert!(ContentPattern::parse("./**/templates/**/*.html").unwrap().is_broad());
        assert!(!ContentPattern::parse("./templates/**/*.html").unwrap().is_broad());
        assert!(!ContentPattern::parse("./events/templates/**/*.html").unwrap().is_broad());
    }

    #[test]
    fn test_exclusion_set() {
        let mut set = ExclusionSet::new();
        assert!(set.is_empty());
        set.add(&ContentPattern::parse("!static/**/*.{min.js,map}").unwrap()).unwrap();
        assert!(set.matches(Path::new("static/js/app.min.js")));
        assert!(set.matches(Path::new("static/app.map")));
        assert!(!set.matches(Path::new("static/js/app.js")));
    }

    #[test]
    fn test_exclusion_single_star_stays_in_directory() {
        let mut set = ExclusionSet::new();
        set.add(&ContentPattern::parse("!./templates/*.html").unwrap()).unwrap();
        assert!(set.matches(Path::new("templates/base.html")));
        assert!(!set.matches(Path::new("templates/events/list.html")));
    }

    #[test]
    fn test_brace_expansion_limit() {
        let at_limit = "{a,b}".repeat(8) + "/*.html";
        assert_eq!(expand_braces(&at_limit).unwrap().len(), MAX_BRACE_EXPANSIONS);

        let over_limit = format!("./{}/*.html", "{a,b}".repeat(9));
        match ContentPattern::parse(&over_limit) {
            Err(ContentError::InvalidPattern { pattern, message }) => {
                assert_eq!(pattern, over_limit);
                assert!(message.contains("brace expansion"));
            }
            other => panic!("expected InvalidPattern, got {:?}", other),
        }
    }

    #[test]
    fn test_brace_expansion_dedupes_in_order() {
        assert_eq!(
            expand_braces("{b,a,b}/{x,x}.py").unwrap(),
            vec!["b/x.py", "a/x.py"]
        );
    }
}
