//! Cascade CLI - incremental stylesheet build orchestrator
//!
//! Usage: cascade <COMMAND>
//!
//! Commands:
//!   compile  Compile every root stylesheet once (or a single file)
//!   watch    Compile once, then recompile whatever changes touch

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use is_terminal::IsTerminal;
use tracing::warn;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use cascade::compiler::{compile_many, CommandCompiler};
use cascade::config::Config;
use cascade::context::{CompileContext, CompileMap};
use cascade::watcher::{WatchEvent, WatchOptions, WatchUseCase};

/// Cascade - incremental stylesheet build orchestrator
#[derive(Parser, Debug)]
#[command(name = "cascade")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Output format for CI
    #[arg(long, global = true)]
    json: bool,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Config file to use instead of ./cascade.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compile every root stylesheet once (or a single file)
    Compile(BuildArgs),

    /// Compile once, then recompile whatever changes touch
    Watch(BuildArgs),
}

#[derive(Args, Debug, Clone, Default)]
struct BuildArgs {
    /// Input directory (or single file for `compile`)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output directory (or output file when the input is a file)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Compiler program to run for each file
    #[arg(long)]
    compiler: Option<String>,

    /// Extra argument passed to the compiler (repeatable)
    #[arg(long = "arg", allow_hyphen_values = true)]
    args: Vec<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Compile(args) => cmd_compile(config, args, cli.json),
        Commands::Watch(args) => cmd_watch(config, args, cli.json),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(std::io::stderr().is_terminal()),
        )
        .init();
}

fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let (config, warnings) = match explicit {
        Some(path) => {
            let (config, warnings) = Config::load_with_warnings(path)
                .with_context(|| format!("loading {}", path.display()))?;
            (config.with_env_overrides(), warnings)
        }
        None => {
            let cwd = std::env::current_dir()?;
            Config::load_or_default(Some(&cwd))?
        }
    };

    for warning in warnings {
        warn!("{warning}");
    }
    Ok(config)
}

/// Merge CLI flags over the loaded config
fn apply_args(mut config: Config, args: BuildArgs) -> Config {
    if let Some(input) = args.input {
        config.paths.input = Some(input);
    }
    if let Some(output) = args.output {
        config.paths.output = Some(output);
    }
    if let Some(command) = args.compiler {
        config.compiler.command = command;
    }
    config.compiler.args.extend(args.args);
    config
}

fn roots(config: &Config) -> Result<(PathBuf, PathBuf)> {
    let input = config
        .paths
        .input
        .clone()
        .context("no input given (use --input or [paths] input in cascade.toml)")?;
    let output = config
        .paths
        .output
        .clone()
        .context("no output given (use --output or [paths] output in cascade.toml)")?;
    Ok((input, output))
}

fn cmd_compile(config: Config, args: BuildArgs, json: bool) -> Result<()> {
    let config = apply_args(config, args);
    let (input, output) = roots(&config)?;
    let compiler = CommandCompiler::from_config(&config.compiler);

    let compilable = if input.is_file() {
        let mut single = CompileMap::new();
        single.insert(input, output);
        single
    } else {
        let ctx = CompileContext::new(&input, &output, config.extensions.clone())?;
        ctx.find_compilable()?
    };

    let report = compile_many(&compiler, &compilable);

    if json {
        println!("{}", serde_json::to_string(&report)?);
    } else {
        for path in &report.failed {
            eprintln!("✗ {}", path.display());
        }
        println!(
            "Compiled {} file(s), {} failed",
            report.compiled.len(),
            report.failed.len()
        );
    }

    if report.has_failures() {
        anyhow::bail!("{} file(s) failed to compile", report.failed.len());
    }
    Ok(())
}

fn cmd_watch(config: Config, args: BuildArgs, json: bool) -> Result<()> {
    let config = apply_args(config, args);
    let (input, output) = roots(&config)?;

    let ctx = CompileContext::new(&input, &output, config.extensions.clone())?;
    let options = WatchOptions::new(ctx).with_poll_interval(config.watch.poll_interval());
    let compiler = CommandCompiler::from_config(&config.compiler);

    // Set up Ctrl+C handler
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);
    ctrlc::set_handler(move || {
        running_clone.store(false, Ordering::SeqCst);
    })
    .context("setting Ctrl+C handler")?;

    if !json {
        println!("Press Ctrl+C to stop\n");
    }

    WatchUseCase::new(options).start(&compiler, &running, |event| {
        if json {
            println!("{}", event.to_json());
        } else {
            print_event(event);
        }
    })?;

    Ok(())
}

fn print_event(event: WatchEvent) {
    match event {
        WatchEvent::WatchStarted { input, output } => {
            println!("Watching: {} -> {}", input, output);
        }
        WatchEvent::FileStaged { path, .. } => {
            println!("Staged: {}", path);
        }
        WatchEvent::CompileStarted { files } => {
            println!("Compiling {} file(s)...", files);
        }
        WatchEvent::CompileComplete { compiled, failed } => {
            if failed > 0 {
                println!("⚠ Compiled {}, {} failed", compiled, failed);
            } else {
                println!("✓ Compiled {}", compiled);
            }
        }
        WatchEvent::Error { path, message } => match path {
            Some(path) => eprintln!("✗ {}: {}", path, message),
            None => eprintln!("✗ Error: {}", message),
        },
        WatchEvent::Shutdown => {
            println!("\nShutting down...");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_compile() {
        let cli =
            Cli::try_parse_from(["cascade", "compile", "-i", "scss", "-o", "public/css"]).unwrap();
        if let Commands::Compile(args) = cli.command {
            assert_eq!(args.input, Some(PathBuf::from("scss")));
            assert_eq!(args.output, Some(PathBuf::from("public/css")));
            assert!(args.compiler.is_none());
        } else {
            panic!("Expected Compile command");
        }
    }

    #[test]
    fn test_cli_parse_watch_with_compiler_args() {
        let cli = Cli::try_parse_from([
            "cascade",
            "watch",
            "--input",
            "scss",
            "--output",
            "css",
            "--compiler",
            "sass",
            "--arg",
            "--no-source-map",
            "--arg",
            "-q",
        ])
        .unwrap();
        if let Commands::Watch(args) = cli.command {
            assert_eq!(args.compiler.as_deref(), Some("sass"));
            assert_eq!(args.args, vec!["--no-source-map", "-q"]);
        } else {
            panic!("Expected Watch command");
        }
    }

    #[test]
    fn test_cli_json_flag() {
        let cli = Cli::try_parse_from(["cascade", "--json", "compile"]).unwrap();
        assert!(cli.json);
    }

    #[test]
    fn test_cli_verbose_flag() {
        let cli = Cli::try_parse_from(["cascade", "-vvv", "watch"]).unwrap();
        assert_eq!(cli.verbose, 3);
    }

    #[test]
    fn test_cli_config_flag_after_subcommand() {
        let cli = Cli::try_parse_from(["cascade", "compile", "--config", "ci.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("ci.toml")));
    }

    #[test]
    fn test_apply_args_overrides_config() {
        let mut config = Config::default();
        config.paths.input = Some(PathBuf::from("from-config"));
        config.compiler.args = vec!["--style=compact".to_string()];

        let merged = apply_args(
            config,
            BuildArgs {
                input: Some(PathBuf::from("from-cli")),
                output: None,
                compiler: Some("sass".to_string()),
                args: vec!["-q".to_string()],
            },
        );

        assert_eq!(merged.paths.input, Some(PathBuf::from("from-cli")));
        assert_eq!(merged.paths.output, None);
        assert_eq!(merged.compiler.command, "sass");
        assert_eq!(merged.compiler.args, vec!["--style=compact", "-q"]);
    }

    #[test]
    fn test_roots_require_input_and_output() {
        let err = roots(&Config::default()).unwrap_err();
        assert!(err.to_string().contains("no input given"));
    }
}
