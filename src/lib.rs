pub mod args;
pub mod config;
pub mod content;
pub mod errors;
#[cfg(feature = "js")]
pub mod js_config;
pub mod logging;
pub mod manifest;
pub mod pattern;
pub mod render;
pub mod scanner;

pub use args::{Cli, Commands, ConfigArgs, FilesArgs, InitArgs, ScanArgs, ShowArgs};
pub use config::{BuildConfiguration, ConfigFormat, Plugin, Theme, ValidationWarning};
pub use content::{ContentFile, ContentResolver, PatternMatch, ResolvedContent, SecurityConfig};
pub use errors::{ContentError, Result};
pub use manifest::{Manifest, ManifestBuilder};
pub use pattern::ContentPattern;
pub use scanner::{extract_candidates_from_content, extract_candidates_from_file, extract_candidates_parallel, Candidate};

use indexmap::IndexMap;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Performance statistics
#[derive(Debug, Clone)]
pub struct PerformanceStats {
    pub total_duration: Duration,
    pub resolve_duration: Duration,
    pub scan_duration: Duration,
    pub files_per_second: f64,
    pub bytes_processed: u64,
}

/// Result of the scan process
#[derive(Debug)]
pub struct ScanOutcome {
    pub manifest: Manifest,
    /// Config file used (None: built-in defaults)
    pub config_path: Option<PathBuf>,
    pub total_candidates: usize,
    pub total_files_scanned: usize,
    pub performance_stats: Option<PerformanceStats>,
}

/// Result of validating a build configuration
#[derive(Debug)]
pub struct ValidationOutcome {
    pub config_path: Option<PathBuf>,
    pub config: BuildConfiguration,
    pub warnings: Vec<ValidationWarning>,
}

/// Load the configuration named by the arguments, or discover it in the root
pub fn load_config(source: &ConfigArgs) -> Result<(BuildConfiguration, Option<PathBuf>)> {
    BuildConfiguration::load_or_discover(source.config.as_deref(), &source.root)
}

/// Render the configuration in the requested format
pub fn show(args: &ShowArgs) -> Result<String> {
    let (config, _) = load_config(&args.source)?;
    config.render(args.format)
}

/// Load and validate the configuration
pub fn validate(source: &ConfigArgs) -> Result<ValidationOutcome> {
    let (config, config_path) = load_config(source)?;
    let warnings = config.validate()?;
    Ok(ValidationOutcome {
        config_path,
        config,
        warnings,
    })
}

/// Resolve the content patterns into files
pub fn list_files(args: &FilesArgs) -> Result<ResolvedContent> {
    let (config, _) = load_config(&args.source)?;
    config.validate()?;
    ContentResolver::new(&args.source.root)
        .with_excludes(&args.exclude)
        .resolve(&config)
}

/// Write the default configuration
pub fn init(args: &InitArgs) -> Result<PathBuf> {
    let format = args.resolved_format().map_err(ContentError::InvalidInput)?;

    if args.output.exists() && !args.force {
        return Err(ContentError::OutputError {
            path: args.output.display().to_string(),
            message: "file already exists (use --force to overwrite)".to_string(),
        });
    }

    let rendered = BuildConfiguration::default().render(format)?;
    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    write_atomic(&args.output, &rendered).map_err(|e| ContentError::OutputError {
        path: args.output.display().to_string(),
        message: e.to_string(),
    })?;

    tracing::info!(path = %args.output.display(), ?format, "wrote default configuration");
    Ok(args.output.clone())
}

/// Main scan entry point
pub async fn scan(args: ScanArgs) -> Result<ScanOutcome> {
    let start_time = Instant::now();

    args.validate().map_err(ContentError::InvalidInput)?;

    let (config, config_path) = load_config(&args.source)?;
    config.validate()?;

    let resolve_start = Instant::now();
    let resolver = ContentResolver::new(&args.source.root).with_excludes(&args.exclude);
    let resolved = resolver.resolve(&config)?;
    let resolve_duration = resolve_start.elapsed();

    if resolved.is_empty() {
        return Err(ContentError::NoFilesFound);
    }

    tracing::info!(
        files = resolved.files.len(),
        bytes = resolved.total_bytes(),
        "resolved content files"
    );

    let progress_bar = if args.progress {
        let pb = ProgressBar::new(resolved.files.len() as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({msg})")
            .map(|style| style.progress_chars("█▉▊▋▌▍▎▏  "))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        pb.set_style(style);
        pb.set_message("Starting scan...");
        Some(pb)
    } else {
        None
    };

    let scan_start = Instant::now();
    let candidates = extract_candidates_parallel(&resolved.paths(), args.jobs, progress_bar.as_ref())?;
    let scan_duration = scan_start.elapsed();

    // Report locations relative to the root
    let relative: HashMap<String, String> = resolved
        .files
        .iter()
        .map(|f| (f.path.display().to_string(), f.relative.display().to_string()))
        .collect();

    let mut class_locations: IndexMap<String, Vec<String>> = IndexMap::new();
    for candidate in &candidates {
        let file = relative
            .get(&candidate.file_path)
            .cloned()
            .unwrap_or_else(|| candidate.file_path.clone());
        class_locations
            .entry(candidate.value.clone())
            .or_default()
            .push(format!("{}:{}:{}", file, candidate.line, candidate.column));
    }

    tracing::info!(
        unique = class_locations.len(),
        occurrences = candidates.len(),
        "collected class candidates"
    );

    let manifest = ManifestBuilder::new()
        .with_config_path(config_path.as_ref().map(|p| p.display().to_string()))
        .with_files_scanned(resolved.files.len())
        .with_patterns(resolved.patterns.clone())
        .with_class_info(class_locations)
        .build(resolved.total_bytes());

    let total_duration = start_time.elapsed();
    let stats = PerformanceStats {
        total_duration,
        resolve_duration,
        scan_duration,
        files_per_second: resolved.files.len() as f64 / total_duration.as_secs_f64().max(f64::EPSILON),
        bytes_processed: resolved.total_bytes(),
    };

    if let Some(pb) = progress_bar {
        pb.finish_with_message(format!("✓ Complete ({:.1} files/sec)", stats.files_per_second));
    }

    if !args.dry_run {
        if let Some(path) = &args.output_manifest {
            write_manifest(path, &manifest, args.minify)?;
        }
    }

    tracing::debug!(
        total_ms = stats.total_duration.as_millis() as u64,
        resolve_ms = stats.resolve_duration.as_millis() as u64,
        scan_ms = stats.scan_duration.as_millis() as u64,
        "scan finished"
    );

    Ok(ScanOutcome {
        total_candidates: manifest.classes.len(),
        total_files_scanned: resolved.files.len(),
        manifest,
        config_path,
        performance_stats: Some(stats),
    })
}

/// Serialize a manifest, compact or pretty
pub fn render_manifest(manifest: &Manifest, minify: bool) -> Result<String> {
    let json = if minify {
        manifest.to_compact_json()?
    } else {
        manifest.to_pretty_json()?
    };
    Ok(json)
}

fn write_manifest(path: &Path, manifest: &Manifest, minify: bool) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    write_atomic(path, &render_manifest(manifest, minify)?).map_err(|e| ContentError::OutputError {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Write file atomically by writing to temp file then renaming
fn write_atomic<P: AsRef<Path>>(path: P, content: &str) -> std::io::Result<()> {
    use std::fs;
    use std::io::Write;

    let path = path.as_ref();
    let mut temp_name = path.file_name().unwrap_or_default().to_os_string();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    let result = fs::File::create(&temp_path)
        .and_then(|mut file| {
            file.write_all(content.as_bytes())?;
            file.sync_all()
        })
        .and_then(|()| fs::rename(&temp_path, path));

    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

/// Unique candidates of a text, sorted
pub fn pipe_candidates(input: &str) -> Vec<String> {
    extract_candidates_from_content(input, "stdin")
        .into_iter()
        .map(|c| c.value)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Handle pipe command - read text from stdin, print candidates to stdout
pub async fn handle_pipe_command() -> Result<()> {
    use tokio::io::{self, AsyncReadExt, AsyncWriteExt};

    let mut input = String::new();
    let mut stdin = io::stdin();
    stdin
        .read_to_string(&mut input)
        .await
        .map_err(|e| ContentError::InputError(format!("Failed to read from stdin: {}", e)))?;

    let candidates = pipe_candidates(&input);
    if candidates.is_empty() {
        return Ok(());
    }

    let mut output = candidates.join("\n");
    output.push('\n');

    let mut stdout = io::stdout();
    stdout
        .write_all(output.as_bytes())
        .await
        .map_err(|e| ContentError::OutputError {
            path: "stdout".to_string(),
            message: e.to_string(),
        })?;

    stdout.flush().await.map_err(|e| ContentError::OutputError {
        path: "stdout".to_string(),
        message: e.to_string(),
    })?;

    Ok(())
}
