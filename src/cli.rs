use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "ubi-judgments",
    version,
    about = "Generate relevance judgment lists from UBI search interaction logs"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Ingest(IngestArgs),
    Generate(GenerateArgs),
    Status(StatusArgs),
}

#[derive(Args, Debug, Clone)]
pub struct IngestArgs {
    #[arg(long, default_value = ".cache/ubi-judgments/ubi_logs.sqlite")]
    pub db_path: PathBuf,

    #[arg(long)]
    pub queries_path: PathBuf,

    #[arg(long)]
    pub events_path: PathBuf,

    #[arg(long, default_value_t = false)]
    pub refresh: bool,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum GradingMode {
    Coec,
    Positional,
}

impl GradingMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Coec => "coec",
            Self::Positional => "positional",
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    #[arg(long, default_value = ".cache/ubi-judgments/ubi_logs.sqlite")]
    pub db_path: PathBuf,

    #[arg(long, default_value_t = 10_000)]
    pub limit: usize,

    #[arg(long, value_enum, default_value_t = GradingMode::Coec)]
    pub grading: GradingMode,

    #[arg(long, default_value = "judgment_list.csv")]
    pub output: PathBuf,

    #[arg(long)]
    pub stats_path: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    #[arg(long, default_value = ".cache/ubi-judgments/ubi_logs.sqlite")]
    pub db_path: PathBuf,

    #[arg(long, default_value = "judgment_list.csv")]
    pub output: PathBuf,
}
