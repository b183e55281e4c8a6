use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use tailwind_content::{Cli, Commands, ConfigArgs, ConfigFormat, InitArgs, ScanArgs};

#[test]
fn test_cli_parse_scan_defaults() {
    let cli = Cli::parse_from(["tailwind-content-cli", "scan"]);

    match cli.command {
        Commands::Scan(args) => {
            assert_eq!(args.source.root, PathBuf::from("."));
            assert!(args.output_manifest.is_none());
            assert!(args.exclude.is_empty());
            assert_eq!(args.jobs, None);
            assert!(!args.minify);
            assert!(!args.dry_run);
            assert!(!args.progress);
        }
        other => panic!("Unexpected command {:?}", other),
    }
    assert!(!cli.verbose);
}

#[test]
fn test_cli_parse_scan_with_flags() {
    let cli = Cli::parse_from([
        "tailwind-content-cli",
        "scan",
        "-c", "site/tailwind.config.js",
        "-r", "site",
        "-m", "dist/manifest.json",
        "-e", "static/vendor/**",
        "-e", "**/migrations/*.py",
        "-j", "4",
        "--minify",
        "--dry-run",
        "--progress",
        "-v",
    ]);

    assert!(cli.verbose);
    match cli.command {
        Commands::Scan(args) => {
            assert_eq!(args.source.config, Some(PathBuf::from("site/tailwind.config.js")));
            assert_eq!(args.source.root, PathBuf::from("site"));
            assert_eq!(args.output_manifest, Some(PathBuf::from("dist/manifest.json")));
            assert_eq!(args.exclude, vec!["static/vendor/**", "**/migrations/*.py"]);
            assert_eq!(args.jobs, Some(4));
            assert!(args.minify);
            assert!(args.dry_run);
            assert!(args.progress);
        }
        other => panic!("Unexpected command {:?}", other),
    }
}

#[test]
fn test_cli_parse_show_format() {
    let cli = Cli::parse_from(["tailwind-content-cli", "show", "--format", "yaml"]);
    match cli.command {
        Commands::Show(args) => assert_eq!(args.format, ConfigFormat::Yaml),
        other => panic!("Unexpected command {:?}", other),
    }

    let cli = Cli::parse_from(["tailwind-content-cli", "show"]);
    match cli.command {
        Commands::Show(args) => assert_eq!(args.format, ConfigFormat::Json),
        other => panic!("Unexpected command {:?}", other),
    }
}

#[test]
fn test_cli_parse_init() {
    let cli = Cli::parse_from(["tailwind-content-cli", "init", "-o", "config/tailwind.config.json", "--force"]);
    match cli.command {
        Commands::Init(args) => {
            assert_eq!(args.output, PathBuf::from("config/tailwind.config.json"));
            assert!(args.force);
            assert_eq!(args.resolved_format().unwrap(), ConfigFormat::Json);
        }
        other => panic!("Unexpected command {:?}", other),
    }
}

#[test]
fn test_cli_parse_validate_and_pipe() {
    let cli = Cli::parse_from(["tailwind-content-cli", "validate", "--root", "site"]);
    assert!(matches!(cli.command, Commands::Validate(ConfigArgs { ref root, .. }) if root == &PathBuf::from("site")));

    let cli = Cli::parse_from(["tailwind-content-cli", "pipe"]);
    assert!(matches!(cli.command, Commands::Pipe));
}

#[test]
fn test_cli_rejects_unknown_format() {
    assert!(Cli::try_parse_from(["tailwind-content-cli", "show", "--format", "toml"]).is_err());
}

#[test]
fn test_scan_args_validate() {
    let mut args = ScanArgs {
        source: ConfigArgs {
            config: Some("tailwind.config.js".into()),
            root: ".".into(),
        },
        output_manifest: Some("manifest.json".into()),
        exclude: vec![],
        jobs: None,
        minify: false,
        dry_run: false,
        progress: false,
    };

    assert!(args.validate().is_ok());

    args.jobs = Some(0);
    assert!(args.validate().is_err());

    args.jobs = Some(4);
    assert!(args.validate().is_ok());

    args.output_manifest = Some("tailwind.config.js".into());
    assert!(args.validate().is_err());
}

#[test]
fn test_init_args_format_resolution() {
    let mut args = InitArgs {
        output: "tailwind.config.yml".into(),
        format: None,
        force: false,
    };
    assert_eq!(args.resolved_format().unwrap(), ConfigFormat::Yaml);

    args.output = "tailwind.config".into();
    assert!(args.resolved_format().is_err());

    args.format = Some(ConfigFormat::Js);
    assert_eq!(args.resolved_format().unwrap(), ConfigFormat::Js);
}

#[test]
fn test_pipe_binary_prints_candidates() {
    let mut child = Command::new(env!("CARGO_BIN_EXE_tailwind-content-cli"))
        .arg("pipe")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn tailwind-content-cli");

    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(br#"<button class="px-4 py-2 rounded hover:bg-blue-700">Save</button>"#)
            .unwrap();
    }

    let output = child.wait_with_output().expect("Failed to wait for output");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    for class in ["px-4", "py-2", "rounded", "hover:bg-blue-700"] {
        assert!(lines.contains(&class), "missing {} in {:?}", class, lines);
    }
    assert!(!stdout.contains("panicked at"));
}

#[test]
fn test_show_binary_renders_defaults_as_js() {
    let dir = tempfile::tempdir().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_tailwind-content-cli"))
        .args(["show", "--format", "js", "--root"])
        .arg(dir.path())
        .env_remove("TAILWIND_CONFIG")
        .output()
        .expect("Failed to run tailwind-content-cli");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("/** @type {import('tailwindcss').Config} */\nmodule.exports = {"));
    assert!(stdout.contains("'./**/*.py',"));
}

#[test]
fn test_validate_binary_fails_on_empty_content() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("tailwind.config.json");
    std::fs::write(&config, r#"{ "content": [] }"#).unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_tailwind-content-cli"))
        .arg("validate")
        .arg("--config")
        .arg(&config)
        .output()
        .expect("Failed to run tailwind-content-cli");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error:"));
}
