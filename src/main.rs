use clap::Parser;
use tailwind_content::{
    handle_pipe_command, init, list_files, logging, render_manifest, scan, show, validate, Cli,
    Commands,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Show(args) => {
            print!("{}", show(&args)?);
        }
        Commands::Validate(args) => {
            let outcome = validate(&args)?;
            let source = outcome
                .config_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "built-in defaults".to_string());
            for warning in &outcome.warnings {
                println!("warning: {}", warning);
            }
            println!(
                "{}: ok ({} content patterns, {} plugins, {} warnings)",
                source,
                outcome.config.content.len(),
                outcome.config.plugins.len(),
                outcome.warnings.len()
            );
        }
        Commands::Files(args) => {
            let resolved = list_files(&args)?;
            for file in &resolved.files {
                println!("{}", file.relative.display());
            }
            if cli.verbose {
                for pattern in &resolved.patterns {
                    let kind = if pattern.negated { "exclude" } else { "include" };
                    eprintln!("{:>7} {:>6}  {}", kind, pattern.matched, pattern.pattern);
                }
            }
        }
        Commands::Scan(args) => {
            let to_stdout = args.output_manifest.is_none() && !args.dry_run;
            let minify = args.minify;
            let outcome = scan(args).await?;
            if to_stdout {
                println!("{}", render_manifest(&outcome.manifest, minify)?);
            } else {
                eprintln!("Scan successful!");
                eprintln!("  - Scanned {} files", outcome.total_files_scanned);
                eprintln!("  - Found {} unique candidates", outcome.total_candidates);
            }
        }
        Commands::Init(args) => {
            let path = init(&args)?;
            eprintln!("Wrote {}", path.display());
        }
        Commands::Pipe => {
            handle_pipe_command().await?;
        }
    }
    Ok(())
}
