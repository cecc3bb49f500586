//! gradestat CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "gradestat",
    version,
    about = "Class and grade statistics for student exam scores"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Per-subject maximum scores; each overrides the config file.
#[derive(Args, Debug, Default)]
pub struct MaxScoreArgs {
    /// Chinese maximum score
    #[arg(long)]
    pub chinese: Option<f64>,

    /// Math maximum score
    #[arg(long)]
    pub math: Option<f64>,

    /// English maximum score
    #[arg(long)]
    pub english: Option<f64>,

    /// Science maximum score
    #[arg(long)]
    pub science: Option<f64>,

    /// Politics maximum score
    #[arg(long)]
    pub politics: Option<f64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a score sheet and write the report
    Analyze {
        /// Score file (.xlsx, .xlsm, .xls, .xlsb, .ods or .csv)
        #[arg(long)]
        input: PathBuf,

        #[command(flatten)]
        max_scores: MaxScoreArgs,

        /// Output directory
        #[arg(long, default_value = "./gradestat-reports")]
        output: PathBuf,

        /// Output format: xlsx, csv, json, all (comma-separated)
        #[arg(long, default_value = "xlsx")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Check that a score sheet can be read, without computing statistics
    Validate {
        /// Score file to check
        #[arg(long)]
        input: PathBuf,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Serve the upload endpoint over HTTP
    Serve {
        /// Address to listen on (default from config, then 0.0.0.0:5000)
        #[arg(long)]
        bind: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create a starter gradestat.toml
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("gradestat=info")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Analyze {
            input,
            max_scores,
            output,
            format,
            config,
        } => commands::analyze::execute(input, max_scores, output, format, config),
        Commands::Validate { input, config } => commands::validate::execute(input, config),
        Commands::Serve { bind, config } => commands::serve::execute(bind, config).await,
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
