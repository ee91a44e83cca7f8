// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{info, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::PathBuf;

use labelflow::app_config::{Config, LogLevel};
use labelflow::app_controller::Controller;
use labelflow::file_utils::FileManager;
use labelflow::language_utils::{script_profile, segment_by_script};
use labelflow::layout::capacity::Padding;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

/// Region overrides shared by the layout subcommands
#[derive(Args, Debug, Clone, Default)]
struct RegionArgs {
    /// Region width in millimeters
    #[arg(long)]
    width: Option<f64>,

    /// Region height in millimeters
    #[arg(long)]
    height: Option<f64>,

    /// Uniform padding in millimeters
    #[arg(long)]
    padding: Option<f64>,

    /// Font size, in the configured unit
    #[arg(long)]
    font_size: Option<f64>,
}

impl RegionArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(width) = self.width {
            config.layout.region_width_mm = width;
        }
        if let Some(height) = self.height {
            config.layout.region_height_mm = height;
        }
        if let Some(padding) = self.padding {
            config.layout.padding = Padding::uniform(padding);
        }
        if let Some(font_size) = self.font_size {
            config.layout.font_size = font_size;
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Wrap a text file (or every .txt file in a directory) and report overflow
    Analyze {
        /// Text file or directory
        #[arg(value_name = "INPUT_PATH")]
        input_path: PathBuf,

        /// Print the full analysis as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        region: RegionArgs,
    },

    /// Split a text into runs of a single script
    Segment {
        /// Text to segment
        text: String,
    },

    /// Print the line capacity of the configured region
    Capacity {
        #[command(flatten)]
        region: RegionArgs,
    },

    /// Build an overflow chain for a text file and log the editor calls
    Chain {
        /// Text file holding the master's content
        #[arg(value_name = "INPUT_PATH")]
        input_path: PathBuf,

        /// Id of the master region
        #[arg(short, long, default_value = "mother_1")]
        master_id: String,

        /// Write the resulting relationship state to this file
        #[arg(long)]
        state_out: Option<PathBuf>,

        #[command(flatten)]
        region: RegionArgs,
    },

    /// Generate shell completions for labelflow
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// labelflow - care label text overflow engine
///
/// Computes how much text fits in a label region, wraps it and splits the
/// overflow across a chain of child regions.
#[derive(Parser, Debug)]
#[command(name = "labelflow")]
#[command(version)]
#[command(about = "Care label text capacity and overflow tool")]
#[command(long_about = "labelflow wraps label text to a region and splits overflowing text across child regions.

EXAMPLES:
    labelflow capacity --width 40 --height 90       # Lines and width of a region
    labelflow analyze care.txt                      # Report overflow for one file
    labelflow analyze labels/ --log-level debug     # Analyze every .txt file in a folder
    labelflow segment '100% cotton 棉 綿 면'         # Split text into script runs
    labelflow chain care.txt -m mother_1 --state-out chain.json
    labelflow completions bash > labelflow.bash     # Generate bash completions

CONFIGURATION:
    Configuration is stored in labelflow.json by default. If the file does not
    exist, a default one is created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long = "config", global = true, default_value = "labelflow.json")]
    config_path: PathBuf,

    /// Set logging level
    #[arg(short, long, global = true, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger;

impl CustomLogger {
    // @initializes: Global logger, filtering is done through the max level
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Color and tag for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("\x1B[1;31m", "[ERROR]"),
            Level::Warn => ("\x1B[1;33m", "[WARN]"),
            Level::Info => ("\x1B[1;32m", "[INFO]"),
            Level::Debug => ("\x1B[1;36m", "[DEBUG]"),
            Level::Trace => ("\x1B[1;35m", "[TRACE]"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (color, tag) = Self::style_for_level(record.level());
            let _ = writeln!(
                std::io::stderr(),
                "{}{} {} {}\x1B[0m",
                color,
                now,
                tag,
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    // Segment and completions do not need a configuration
    match &cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(*shell, &mut cmd, "labelflow", &mut std::io::stdout());
            return Ok(());
        }
        Commands::Segment { text } => {
            apply_log_level(cli.log_level.clone(), None);
            let output = serde_json::json!({
                "segments": segment_by_script(text),
                "profile": script_profile(text),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
            return Ok(());
        }
        _ => {}
    }

    let mut config = Config::load_or_create(&cli.config_path)
        .with_context(|| format!("Failed to load config {:?}", cli.config_path))?;
    apply_log_level(cli.log_level.clone(), Some(&config.log_level));

    match cli.command {
        Commands::Analyze {
            input_path,
            json,
            region,
        } => {
            region.apply(&mut config);
            let controller = Controller::with_config(config)?;

            if FileManager::dir_exists(&input_path) {
                let (reports, summary) = controller.analyze_folder(&input_path)?;
                if json {
                    println!("{}", serde_json::to_string_pretty(&reports)?);
                }
                info!(
                    "{} file(s): {} overflowing, {} failed",
                    summary.processed + summary.failed,
                    summary.overflowing,
                    summary.failed
                );
            } else {
                let report = controller.analyze_file(&input_path)?;
                if json {
                    println!("{}", serde_json::to_string_pretty(&report)?);
                } else {
                    for (index, chunk) in report.analysis.chunks.iter().enumerate() {
                        println!("--- region {} ---", index + 1);
                        println!("{}", chunk);
                    }
                }
            }
        }
        Commands::Capacity { region } => {
            region.apply(&mut config);
            let controller = Controller::with_config(config)?;
            println!("{}", serde_json::to_string_pretty(&controller.capacity())?);
        }
        Commands::Chain {
            input_path,
            master_id,
            state_out,
            region,
        } => {
            region.apply(&mut config);
            let controller = Controller::with_config(config)?;
            let outcome = controller.run_chain(&input_path, &master_id, state_out).await?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        Commands::Segment { .. } | Commands::Completions { .. } => {}
    }

    Ok(())
}

// @applies: Command line level wins over the configured one
fn apply_log_level(cli_level: Option<CliLogLevel>, config_level: Option<&LogLevel>) {
    let level = match (cli_level, config_level) {
        (Some(level), _) => LogLevel::from(level),
        (None, Some(level)) => level.clone(),
        (None, None) => LogLevel::default(),
    };
    log::set_max_level(level.to_level_filter());
}
