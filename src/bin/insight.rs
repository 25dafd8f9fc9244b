//! Insight CLI - Command-line interface for Reading Insight
//!
//! Commands:
//! - replay: Replay a recorded reading session into an insight report
//! - classify: Classify text against the theme lexicon
//! - lexicon: Print the theme lexicon and canned sentences
//! - config: Print the effective engine configuration

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use reading_insight::encoder::InsightReportEncoder;
use reading_insight::lexicon::KeywordLexicon;
use reading_insight::render::HtmlCardRenderer;
use reading_insight::{
    classify, InsightConfig, InsightError, InsightProcessor, Theme, INSIGHT_VERSION,
};

/// Insight - reading engagement insights from paragraph themes and dwell time
#[derive(Parser)]
#[command(name = "insight")]
#[command(version = INSIGHT_VERSION)]
#[command(about = "Turn reading sessions into engagement insights", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a reading session and emit the insight report
    Replay {
        /// Session file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Output format
        #[arg(long, default_value = "json-pretty")]
        format: OutputFormat,

        /// Engine configuration file (JSON)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Seed for the decorative meter fills in HTML output
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Classify text against the theme lexicon
    Classify {
        /// Text to classify (reads stdin when omitted)
        text: Option<String>,
    },

    /// Print the theme lexicon
    Lexicon,

    /// Print the effective configuration
    Config {
        /// Configuration file to validate and print
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Compact JSON report
    Json,
    /// Pretty-printed JSON report
    JsonPretty,
    /// Insight card markup as rendered into the page
    Html,
}

fn main() -> ExitCode {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Warn)
        .parse_default_env()
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), InsightCliError> {
    match cli.command {
        Commands::Replay {
            input,
            output,
            format,
            config,
            seed,
        } => cmd_replay(&input, &output, format, config.as_deref(), seed),
        Commands::Classify { text } => cmd_classify(text),
        Commands::Lexicon => cmd_lexicon(),
        Commands::Config { config } => cmd_config(config.as_deref()),
    }
}

fn read_input(input: &Path) -> Result<String, InsightCliError> {
    if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn load_config(path: Option<&Path>) -> Result<InsightConfig, InsightCliError> {
    match path {
        Some(path) => {
            let json = fs::read_to_string(path)?;
            Ok(InsightConfig::from_json(&json)?)
        }
        None => Ok(InsightConfig::default()),
    }
}

fn cmd_replay(
    input: &Path,
    output: &Path,
    format: OutputFormat,
    config: Option<&Path>,
    seed: Option<u64>,
) -> Result<(), InsightCliError> {
    let session_json = read_input(input)?;
    let config = load_config(config)?;

    let processor = InsightProcessor::with_config(config)?;
    let summary = processor.replay(&session_json)?;
    log::info!(
        "session {}: {} observations, {} ticks, {} insights",
        summary.session_id,
        summary.observations,
        summary.ticks,
        summary.insights.len()
    );

    let output_data = match format {
        OutputFormat::Html => {
            if summary.insights.is_empty() {
                return Err(InsightCliError::NoInsights);
            }
            let mut renderer = match seed {
                Some(seed) => HtmlCardRenderer::with_seed(seed),
                None => HtmlCardRenderer::new(),
            };
            format!("{}\n", renderer.render(&summary.insights))
        }
        OutputFormat::Json => {
            let report = InsightReportEncoder::new().encode(&summary);
            format!("{}\n", serde_json::to_string(&report)?)
        }
        OutputFormat::JsonPretty => {
            let report = InsightReportEncoder::new().encode(&summary);
            format!("{}\n", serde_json::to_string_pretty(&report)?)
        }
    };

    if output.to_string_lossy() == "-" {
        print!("{}", output_data);
    } else {
        fs::write(output, output_data)?;
    }

    Ok(())
}

fn cmd_classify(text: Option<String>) -> Result<(), InsightCliError> {
    let text = match text {
        Some(text) => text,
        None => read_input(Path::new("-"))?,
    };

    let profile = classify(&text);
    println!("{}", serde_json::to_string_pretty(&profile)?);
    Ok(())
}

fn cmd_lexicon() -> Result<(), InsightCliError> {
    let lexicon = KeywordLexicon::default();
    let themes: Vec<serde_json::Value> = lexicon
        .entries()
        .map(|(theme, keywords)| {
            serde_json::json!({
                "theme": theme,
                "keywords": keywords,
                "interest_sentence": KeywordLexicon::interest_sentence(theme),
            })
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&themes)?);
    Ok(())
}

fn cmd_config(config: Option<&Path>) -> Result<(), InsightCliError> {
    let config = load_config(config)?;
    println!("{}", config.to_json()?);
    Ok(())
}

// Error types

#[derive(Debug)]
enum InsightCliError {
    Io(io::Error),
    Insight(InsightError),
    Json(serde_json::Error),
    NoInsights,
}

impl From<io::Error> for InsightCliError {
    fn from(e: io::Error) -> Self {
        InsightCliError::Io(e)
    }
}

impl From<InsightError> for InsightCliError {
    fn from(e: InsightError) -> Self {
        InsightCliError::Insight(e)
    }
}

impl From<serde_json::Error> for InsightCliError {
    fn from(e: serde_json::Error) -> Self {
        InsightCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<InsightCliError> for CliError {
    fn from(e: InsightCliError) -> Self {
        match e {
            InsightCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            InsightCliError::Insight(e @ InsightError::ConfigError(_)) => CliError {
                code: "CONFIG_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Run 'insight config' to see valid defaults".to_string()),
            },
            InsightCliError::Insight(e) => CliError {
                code: "SESSION_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Ensure input is a reading session with blocks and events".to_string()),
            },
            InsightCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            InsightCliError::NoInsights => CliError {
                code: "NO_INSIGHTS".to_string(),
                message: "Session produced no insights to render".to_string(),
                hint: Some(format!(
                    "Blocks need dwell on text matching one of the {} themes",
                    Theme::ALL.len()
                )),
            },
        }
    }
}
