use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::ConfigFormat;

/// Tailwind content CLI - inspects the build configuration and the files its content globs select
#[derive(Parser, Debug)]
#[command(name = "tailwind-content-cli")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Verbose output
    #[arg(short = 'v', long = "verbose", global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the build configuration
    Show(ShowArgs),
    /// Check the build configuration
    Validate(ConfigArgs),
    /// List the files selected by the content patterns
    Files(FilesArgs),
    /// Scan content files for utility-class candidates
    Scan(ScanArgs),
    /// Write the default build configuration
    Init(InitArgs),
    /// Read text from stdin and print its class candidates
    Pipe,
}

/// Where the build configuration comes from
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Configuration file path
    #[arg(
        short = 'c',
        long = "config",
        value_name = "PATH",
        env = "TAILWIND_CONFIG",
        help = "Path to the build configuration (.js, .cjs, .mjs, .ts, .json, .yaml); discovered in the root when omitted"
    )]
    pub config: Option<PathBuf>,

    /// Project root
    #[arg(
        short = 'r',
        long = "root",
        value_name = "DIR",
        default_value = ".",
        help = "Directory content patterns are resolved against"
    )]
    pub root: PathBuf,
}

/// Arguments for the show command
#[derive(Args, Debug, Clone)]
pub struct ShowArgs {
    #[command(flatten)]
    pub source: ConfigArgs,

    /// Output format
    #[arg(short = 'f', long = "format", value_enum, default_value_t = ConfigFormat::Json)]
    pub format: ConfigFormat,
}

/// Arguments for the files command
#[derive(Args, Debug, Clone)]
pub struct FilesArgs {
    #[command(flatten)]
    pub source: ConfigArgs,

    /// Exclude patterns (glob patterns to exclude)
    #[arg(
        short = 'e',
        long = "exclude",
        value_name = "PATTERN",
        num_args = 0..,
        help = "Patterns to exclude in addition to the configuration's `!` entries"
    )]
    pub exclude: Vec<String>,
}

/// Arguments for the scan command
#[derive(Args, Debug, Clone)]
pub struct ScanArgs {
    #[command(flatten)]
    pub source: ConfigArgs,

    /// Output manifest file path (JSON)
    #[arg(
        short = 'm',
        long = "output-manifest",
        value_name = "PATH",
        help = "Path where the JSON manifest will be written (stdout when omitted)"
    )]
    pub output_manifest: Option<PathBuf>,

    /// Exclude patterns (glob patterns to exclude)
    #[arg(
        short = 'e',
        long = "exclude",
        value_name = "PATTERN",
        num_args = 0..,
        help = "Patterns to exclude in addition to the configuration's `!` entries"
    )]
    pub exclude: Vec<String>,

    /// Number of parallel threads to use
    #[arg(
        short = 'j',
        long = "jobs",
        value_name = "NUM",
        help = "Number of parallel threads to use (defaults to number of CPU cores)"
    )]
    pub jobs: Option<usize>,

    /// Compact JSON output
    #[arg(long = "minify", default_value_t = false, help = "Write the manifest as compact JSON")]
    pub minify: bool,

    /// Dry run (don't write output files)
    #[arg(
        long = "dry-run",
        default_value_t = false,
        help = "Perform the scan but don't write the manifest"
    )]
    pub dry_run: bool,

    /// Show a progress bar
    #[arg(long = "progress", default_value_t = false, help = "Show a progress bar while scanning")]
    pub progress: bool,
}

/// Arguments for the init command
#[derive(Args, Debug, Clone)]
pub struct InitArgs {
    /// Output path
    #[arg(
        short = 'o',
        long = "output",
        value_name = "PATH",
        default_value = "tailwind.config.js"
    )]
    pub output: PathBuf,

    /// Output format (detected from the extension when omitted)
    #[arg(short = 'f', long = "format", value_enum)]
    pub format: Option<ConfigFormat>,

    /// Overwrite an existing file
    #[arg(long = "force", default_value_t = false)]
    pub force: bool,
}

impl ScanArgs {
    /// Validate that the arguments are consistent
    pub fn validate(&self) -> Result<(), String> {
        if let Some(jobs) = self.jobs {
            if jobs == 0 {
                return Err("Number of jobs must be at least 1".to_string());
            }
        }

        if let (Some(config), Some(manifest)) = (&self.source.config, &self.output_manifest) {
            if config == manifest {
                return Err("The manifest path must differ from the config path".to_string());
            }
        }

        Ok(())
    }
}

impl InitArgs {
    /// Format to write, from the flag or the output extension
    pub fn resolved_format(&self) -> Result<ConfigFormat, String> {
        match self.format {
            Some(format) => Ok(format),
            None => ConfigFormat::from_path(&self.output).ok_or_else(|| {
                format!(
                    "Cannot infer a format from '{}'; pass --format",
                    self.output.display()
                )
            }),
        }
    }
}
