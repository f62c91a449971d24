#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, anyhow};
use log::{error, warn, info, LevelFilter, Log, Metadata, Record, Level, SetLoggerError};
use std::path::{Path, PathBuf};
use std::io::Write;
use clap::{Parser, ValueEnum, CommandFactory, Subcommand};
use clap_complete::{generate, Shell};

use annoclip::app_config::{self, Config};
use annoclip::app_controller::{Controller, RunRequest};
use annoclip::naming::FolderPrecedence;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

/// CLI Wrapper for FolderPrecedence to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliFolderPrecedence {
    GestureFirst,
    MotionPrimitiveFirst,
    FirstAnnotation,
}

impl From<CliFolderPrecedence> for FolderPrecedence {
    fn from(cli: CliFolderPrecedence) -> Self {
        match cli {
            CliFolderPrecedence::GestureFirst => FolderPrecedence::GestureFirst,
            CliFolderPrecedence::MotionPrimitiveFirst => FolderPrecedence::MotionPrimitiveFirst,
            CliFolderPrecedence::FirstAnnotation => FolderPrecedence::FirstAnnotation,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Split annotated segments into clips (default command)
    Split(SplitArgs),

    /// Generate shell completions for annoclip
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct SplitArgs {
    /// Export file or directory of exports to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: PathBuf,

    /// Base output folder (overrides the config file)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Keep clips left by an earlier run instead of re-cutting them
    #[arg(short, long)]
    skip_existing: bool,

    /// Directory relative video paths resolve against (default: the export's directory)
    #[arg(long)]
    video_dir: Option<PathBuf>,

    /// Resolve clip names and folders without writing anything
    #[arg(long)]
    dry_run: bool,

    /// Write a JSON run report to this file
    #[arg(long)]
    report: Option<PathBuf>,

    /// Which annotation decides a segment's folder
    #[arg(long, value_enum)]
    folder_precedence: Option<CliFolderPrecedence>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// annoclip - cut annotated segments into a labeled clip corpus
#[derive(Parser, Debug)]
#[command(name = "annoclip")]
#[command(version)]
#[command(about = "Split annotated video segments into categorized clips")]
#[command(long_about = "annoclip reads an annotation export and writes one clip per annotated segment,
sorted into Gestures/<Attribute>/ and MPs/<Attribute>/ folders.

EXAMPLES:
    annoclip session_annotations.csv              # Split using default config
    annoclip -o corpus/ session_annotations.csv   # Choose the output folder
    annoclip --dry-run session_annotations.csv    # Show where clips would go
    annoclip -s session_annotations.csv           # Keep clips from an earlier run
    annoclip --report run.json exports/           # Process a folder, keep a report
    annoclip completions bash > annoclip.bash     # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Export file or directory of exports to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: Option<PathBuf>,

    /// Base output folder (overrides the config file)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Keep clips left by an earlier run instead of re-cutting them
    #[arg(short, long)]
    skip_existing: bool,

    /// Directory relative video paths resolve against (default: the export's directory)
    #[arg(long)]
    video_dir: Option<PathBuf>,

    /// Resolve clip names and folders without writing anything
    #[arg(long)]
    dry_run: bool,

    /// Write a JSON run report to this file
    #[arg(long)]
    report: Option<PathBuf>,

    /// Which annotation decides a segment's folder
    #[arg(long, value_enum)]
    folder_precedence: Option<CliFolderPrecedence>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level && metadata.target().starts_with("annoclip")
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {:<5} {}\x1B[0m",
                Self::color_for_level(record.level()),
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // The logger accepts everything; the effective level is set through max_level
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "annoclip", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Split(args)) => run_split(args).await,
        None => {
            // Default behavior - top-level args act as the split command
            let input_path = cli.input_path.ok_or_else(|| {
                anyhow!("INPUT_PATH is required when no subcommand is specified")
            })?;

            let split_args = SplitArgs {
                input_path,
                output_dir: cli.output_dir,
                skip_existing: cli.skip_existing,
                video_dir: cli.video_dir,
                dry_run: cli.dry_run,
                report: cli.report,
                folder_precedence: cli.folder_precedence,
                config_path: cli.config_path,
                log_level: cli.log_level,
            };
            run_split(split_args).await
        }
    }
}

fn load_config(options: &SplitArgs) -> Result<Config> {
    let config_path = Path::new(&options.config_path);
    let mut config = if config_path.exists() {
        Config::from_file(config_path)?
    } else {
        warn!("Config file not found at '{}', creating default config.", options.config_path);
        let config = Config::default();
        config.save(config_path)?;
        config
    };

    // Override config with CLI options if provided
    if let Some(output_dir) = &options.output_dir {
        config.output_dir = output_dir.clone();
    }
    if let Some(precedence) = &options.folder_precedence {
        config.folder_precedence = precedence.clone().into();
    }
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }

    Ok(config)
}

async fn run_split(options: SplitArgs) -> Result<()> {
    // Apply a command line log level before anything else logs
    if let Some(cmd_log_level) = &options.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level.into());
    }

    let config = load_config(&options)?;
    log::set_max_level(config.log_level.into());

    let output_dir = config.output_dir.clone();
    let controller = Controller::with_config(config)?;
    let request = RunRequest {
        skip_existing: options.skip_existing,
        dry_run: options.dry_run,
        video_root: options.video_dir.clone(),
        report_path: options.report.clone(),
        show_progress: !options.dry_run,
    };

    if options.input_path.is_file() {
        controller.run(&options.input_path, &output_dir, &request).await?;
    } else if options.input_path.is_dir() {
        let summary = controller.run_folder(&options.input_path, &output_dir, &request).await?;
        if !summary.aborted.is_empty() {
            for (export, reason) in &summary.aborted {
                error!("{:?}: {}", export, reason);
            }
            return Err(anyhow!("{} export(s) aborted", summary.aborted.len()));
        }
    } else {
        return Err(anyhow!("Input path does not exist: {:?}", options.input_path));
    }

    info!("Done.");
    Ok(())
}
