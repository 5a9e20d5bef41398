use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::commands::select::{DEFAULT_SEARCH_K, SelectorThresholds};
use crate::semantic::DEFAULT_MODEL_ID;

pub const DEFAULT_CACHE_ROOT: &str = ".cache/contract-eval";
pub const DEFAULT_DB_FILE_NAME: &str = "fragments.sqlite";

#[derive(Parser, Debug)]
#[command(
    name = "contract-eval",
    version,
    about = "Contract question answering grids and NDCG scoring"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load JSONL fragments into the local store and embed them.
    Load(LoadArgs),
    /// List documents known to the store, or the data directory as fallback.
    Documents(DocumentsArgs),
    /// Pick the supporting fragment for one question in one document.
    Select(SelectArgs),
    /// Build the question x document answer grid.
    Matrix(MatrixArgs),
    /// Score a candidate grid against ground truth.
    Score(ScoreArgs),
    Status(StatusArgs),
}

#[derive(Args, Debug, Clone)]
pub struct StoreArgs {
    #[arg(long, env = "CONTRACT_EVAL_CACHE_ROOT", default_value = DEFAULT_CACHE_ROOT)]
    pub cache_root: PathBuf,

    #[arg(long, env = "CONTRACT_EVAL_DB_PATH")]
    pub db_path: Option<PathBuf>,

    #[arg(long, default_value = DEFAULT_MODEL_ID)]
    pub model_id: String,
}

impl StoreArgs {
    pub fn resolved_db_path(&self) -> PathBuf {
        self.db_path
            .clone()
            .unwrap_or_else(|| self.cache_root.join(DEFAULT_DB_FILE_NAME))
    }

    pub fn manifest_dir(&self) -> PathBuf {
        self.cache_root.join("manifests")
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct ThresholdArgs {
    #[arg(long)]
    pub min_hits: Option<usize>,

    #[arg(long)]
    pub min_unique: Option<usize>,

    #[arg(long)]
    pub max_rank: Option<usize>,

    #[arg(long)]
    pub min_score: Option<f64>,
}

impl ThresholdArgs {
    pub fn resolve(&self) -> SelectorThresholds {
        let defaults = SelectorThresholds::default();
        SelectorThresholds {
            min_hits: self.min_hits.unwrap_or(defaults.min_hits),
            min_unique: self.min_unique.unwrap_or(defaults.min_unique),
            max_rank: self.max_rank.unwrap_or(defaults.max_rank),
            min_score: self.min_score.unwrap_or(defaults.min_score),
            ..defaults
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum RefreshMode {
    Full,
    MissingOrStale,
}

impl RefreshMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::MissingOrStale => "missing-or-stale",
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct LoadArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    /// JSON Lines file, one fragment per line.
    #[arg(long)]
    pub source_path: PathBuf,

    #[arg(long, value_enum, default_value_t = RefreshMode::MissingOrStale)]
    pub refresh_mode: RefreshMode,

    #[arg(long, default_value_t = 64)]
    pub batch_size: usize,

    #[arg(long)]
    pub manifest_path: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct DocumentsArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    #[arg(long, env = "CONTRACT_EVAL_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    #[arg(long, default_value = "pdf")]
    pub extension: String,

    #[arg(long, default_value = "contract")]
    pub category: String,
}

#[derive(Args, Debug, Clone)]
pub struct SelectArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    #[command(flatten)]
    pub thresholds: ThresholdArgs,

    #[arg(long)]
    pub question: String,

    #[arg(long)]
    pub document: String,

    #[arg(long, default_value_t = DEFAULT_SEARCH_K)]
    pub k: usize,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct MatrixArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    #[command(flatten)]
    pub thresholds: ThresholdArgs,

    #[arg(long, env = "CONTRACT_EVAL_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    #[arg(long, default_value = "pdf")]
    pub extension: String,

    #[arg(long, default_value = "contract")]
    pub category: String,

    /// One question per line; the built-in question list is used otherwise.
    #[arg(long)]
    pub questions_path: Option<PathBuf>,

    #[arg(long)]
    pub output_path: Option<PathBuf>,

    #[arg(long, default_value_t = DEFAULT_SEARCH_K)]
    pub k: usize,
}

#[derive(Args, Debug, Clone)]
pub struct ScoreArgs {
    #[arg(long, env = "CONTRACT_EVAL_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    #[arg(long)]
    pub ground_truth_path: Option<PathBuf>,

    #[arg(long)]
    pub candidate_path: Option<PathBuf>,

    #[arg(long)]
    pub output_path: Option<PathBuf>,

    #[arg(long)]
    pub report_path: Option<PathBuf>,

    #[arg(long, default_value_t = 2)]
    pub start_row: usize,

    #[arg(long, default_value_t = 31)]
    pub end_row: usize,

    #[arg(long, default_value_t = 3)]
    pub start_col: usize,

    #[arg(long, default_value_t = 7)]
    pub end_col: usize,

    /// Cutoff for NDCG; defaults to the number of region columns.
    #[arg(long)]
    pub k: Option<usize>,
}

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    #[command(flatten)]
    pub store: StoreArgs,
}
