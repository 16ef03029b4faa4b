//! Recmatch CLI - match and merge records from two sources
//!
//! # Main Commands
//!
//! ```bash
//! recmatch match a.csv b.csv            # Full pipeline: normalize, intersect, filter, merge
//! recmatch join a.csv b.csv --how left  # Keyed join on a shared field
//! ```
//!
//! # Building Blocks
//!
//! ```bash
//! recmatch normalize a.csv --key id     # Normalized identifiers of one dataset
//! recmatch intersect a.csv b.csv        # Sorted common identifiers
//! recmatch filter a.csv --ids ids.json  # Keep records whose identifier is listed
//! recmatch cross a.csv b.csv            # Cartesian product with prefixes
//! recmatch concat a.csv b.csv           # Row-wise concatenation
//! ```
//!
//! Results go to stdout as JSON, or to `-o FILE` (CSV when the name ends in `.csv`).

use clap::{Parser, Subcommand, ValueEnum};
use recmatch::config::resolve_options;
use recmatch::logging::{init_logging, LogConfig, LogFormat};
use recmatch::{
    cross_join, filter_by_ids, horizontal_merge, intersect_ids, load_dataset, match_datasets,
    normalize_id, save_dataset, vertical_merge, write_json, JoinMode, LoadedDataset, MatchOptions,
    MatchResult, MergeStrategy, PipelineResult, Record,
};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

type CliResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "recmatch")]
#[command(about = "Match and merge records from two sources on a shared identifier", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Log output format: pretty, compact or json
    #[arg(long, default_value = "pretty", global = true)]
    log_format: LogFormat,

    /// Disable colored log output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the normalized identifiers of a dataset
    Normalize {
        /// Input dataset (CSV or JSON)
        input: PathBuf,

        /// Identifier field
        #[arg(short, long, default_value = "id")]
        key: String,

        /// Replace each identifier with its SHA-256 digest
        #[arg(long)]
        hash: bool,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the sorted identifiers present in both datasets
    Intersect {
        left: PathBuf,
        right: PathBuf,

        /// Identifier field
        #[arg(short, long, default_value = "id")]
        key: String,

        /// Normalize identifiers before intersecting
        #[arg(long)]
        normalize: bool,

        /// Hash normalized identifiers (implies --normalize)
        #[arg(long)]
        hash: bool,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Keep records whose identifier appears in a JSON list
    Filter {
        /// Input dataset (CSV or JSON)
        input: PathBuf,

        /// JSON file holding an array of identifiers
        #[arg(long)]
        ids: PathBuf,

        /// Identifier field
        #[arg(short, long, default_value = "id")]
        key: String,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Cartesian product of two datasets with prefixed field names
    Cross {
        left: PathBuf,
        right: PathBuf,

        #[arg(long, default_value = "a_")]
        prefix_a: String,

        #[arg(long, default_value = "b_")]
        prefix_b: String,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Append the records of the second dataset to the first
    Concat {
        left: PathBuf,
        right: PathBuf,

        /// Skip the field-name check on the first records
        #[arg(long)]
        allow_mismatch: bool,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Join two datasets on a shared key field
    Join {
        left: PathBuf,
        right: PathBuf,

        /// Join key field
        #[arg(short, long, default_value = "id")]
        key: String,

        /// Join mode: inner, left, right or outer
        #[arg(long, default_value = "inner")]
        how: JoinMode,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Full pipeline: normalize, intersect, filter and merge
    Match {
        left: PathBuf,
        right: PathBuf,

        /// JSON file with match options
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Identifier field
        #[arg(short, long)]
        key: Option<String>,

        /// Field the normalized identifier is written to
        #[arg(long)]
        match_field: Option<String>,

        /// Hash normalized identifiers
        #[arg(long, overrides_with = "no_hash")]
        hash: bool,

        /// Keep normalized identifiers in clear text
        #[arg(long, overrides_with = "hash")]
        no_hash: bool,

        /// Merge strategy applied after filtering
        #[arg(long, value_enum)]
        strategy: Option<StrategyKind>,

        /// Join mode for the horizontal strategy
        #[arg(long)]
        how: Option<JoinMode>,

        /// Output file: JSON gets the full result, CSV the merged records
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum StrategyKind {
    None,
    Cross,
    Vertical,
    Horizontal,
}

fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_config = LogConfig::from_verbosity(cli.verbose)
        .with_format(cli.log_format)
        .with_ansi(!cli.no_color);
    if let Err(e) = init_logging(&log_config) {
        eprintln!("Warning: logging disabled: {}", e);
    }

    let result = match cli.command {
        Commands::Normalize { input, key, hash, output } => {
            cmd_normalize(&input, &key, hash, output.as_deref())
        }

        Commands::Intersect {
            left,
            right,
            key,
            normalize,
            hash,
            output,
        } => cmd_intersect(&left, &right, &key, normalize || hash, hash, output.as_deref()),

        Commands::Filter { input, ids, key, output } => cmd_filter(&input, &ids, &key, output.as_deref()),

        Commands::Cross {
            left,
            right,
            prefix_a,
            prefix_b,
            output,
        } => cmd_cross(&left, &right, &prefix_a, &prefix_b, output.as_deref()),

        Commands::Concat {
            left,
            right,
            allow_mismatch,
            output,
        } => cmd_concat(&left, &right, !allow_mismatch, output.as_deref()),

        Commands::Join {
            left,
            right,
            key,
            how,
            output,
        } => cmd_join(&left, &right, &key, how, output.as_deref()),

        Commands::Match {
            left,
            right,
            config,
            key,
            match_field,
            hash,
            no_hash,
            strategy,
            how,
            output,
        } => {
            let hash_override = match (hash, no_hash) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            };
            let overrides = MatchOverrides {
                key,
                match_field,
                hash: hash_override,
                strategy,
                how,
            };
            cmd_match(&left, &right, config.as_deref(), overrides, output.as_deref())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

// =============================================================================
// Commands
// =============================================================================

fn cmd_normalize(input: &Path, key: &str, hash: bool, output: Option<&Path>) -> CliResult {
    let data = load(input)?;
    let ids: Vec<String> = identifiers(&data.records, key)
        .iter()
        .map(|raw| normalize_id(raw, hash))
        .collect();

    eprintln!("{} identifiers normalized", ids.len());
    write_ids(&ids, output)
}

fn cmd_intersect(
    left: &Path,
    right: &Path,
    key: &str,
    normalize: bool,
    hash: bool,
    output: Option<&Path>,
) -> CliResult {
    let a = load(left)?;
    let b = load(right)?;

    let prepare = |records: &[Record]| -> Vec<String> {
        let raw = identifiers(records, key);
        if normalize {
            raw.iter().map(|id| normalize_id(id, hash)).collect()
        } else {
            raw
        }
    };

    let common = intersect_ids(prepare(&a.records), prepare(&b.records));
    eprintln!("{} common identifiers", common.len());
    write_ids(&common, output)
}

fn cmd_filter(input: &Path, ids_path: &Path, key: &str, output: Option<&Path>) -> CliResult {
    let data = load(input)?;
    let ids: HashSet<String> = serde_json::from_str::<Vec<String>>(&fs::read_to_string(ids_path)?)?
        .into_iter()
        .collect();

    let kept = filter_by_ids(&data.records, &ids, key);
    eprintln!("Kept {} of {} records", kept.len(), data.records.len());
    write_records(&kept, output)
}

fn cmd_cross(left: &Path, right: &Path, prefix_a: &str, prefix_b: &str, output: Option<&Path>) -> CliResult {
    let a = load(left)?;
    let b = load(right)?;

    let product = cross_join(&a.records, &b.records, prefix_a, prefix_b);
    eprintln!("{} x {} = {} records", a.records.len(), b.records.len(), product.len());
    write_records(&product, output)
}

fn cmd_concat(left: &Path, right: &Path, ensure_same_keys: bool, output: Option<&Path>) -> CliResult {
    let a = load(left)?;
    let b = load(right)?;

    let combined = vertical_merge(&a.records, &b.records, ensure_same_keys)?;
    eprintln!("{} records", combined.len());
    write_records(&combined, output)
}

fn cmd_join(left: &Path, right: &Path, key: &str, how: JoinMode, output: Option<&Path>) -> CliResult {
    let a = load(left)?;
    let b = load(right)?;

    let joined = horizontal_merge(&a.records, &b.records, key, how);
    eprintln!("{} join on '{}': {} records", how, key, joined.len());
    write_records(&joined, output)
}

/// Flags that take precedence over the config file and environment.
struct MatchOverrides {
    key: Option<String>,
    match_field: Option<String>,
    hash: Option<bool>,
    strategy: Option<StrategyKind>,
    how: Option<JoinMode>,
}

fn cmd_match(
    left: &Path,
    right: &Path,
    config: Option<&Path>,
    overrides: MatchOverrides,
    output: Option<&Path>,
) -> CliResult {
    let (options, result) = run_match(left, right, config, overrides)?;
    let summary = &result.summary;

    eprintln!("Run {}", result.run_id);
    eprintln!("   Left: {} records ({} without '{}')", summary.input_left, summary.missing_id_left, options.id_key);
    eprintln!("   Right: {} records ({} without '{}')", summary.input_right, summary.missing_id_right, options.id_key);
    eprintln!("   Matching identifiers: {}", summary.matching);
    eprintln!("   Filtered: {} left, {} right", summary.final_left, summary.final_right);
    if let Some(merged) = summary.merged {
        eprintln!("   Merged ({}): {} records", result.strategy.name(), merged);
    }

    match output {
        Some(path) if is_csv(path) => {
            let merged = result
                .merged
                .as_ref()
                .ok_or("CSV output needs a merge strategy other than 'none'")?;
            save_dataset(path, merged)?;
            eprintln!("Output written to: {}", path.display());
        }
        Some(path) => {
            fs::write(path, serde_json::to_string_pretty(&result)?)?;
            eprintln!("Output written to: {}", path.display());
        }
        None => println!("{}", serde_json::to_string_pretty(&result)?),
    }

    Ok(())
}

/// Resolve options (file, environment, flags), load both inputs and match them.
fn run_match(
    left: &Path,
    right: &Path,
    config: Option<&Path>,
    overrides: MatchOverrides,
) -> PipelineResult<(MatchOptions, MatchResult)> {
    let options = apply_flags(resolve_options(config)?, overrides);

    let a = load_dataset(left)?;
    let b = load_dataset(right)?;
    info!(left = a.records.len(), right = b.records.len(), "inputs ready");

    let result = match_datasets(&a.records, &b.records, &options)?;
    Ok((options, result))
}

fn apply_flags(mut options: MatchOptions, overrides: MatchOverrides) -> MatchOptions {
    if let Some(key) = overrides.key {
        options.id_key = key;
    }
    if let Some(field) = overrides.match_field {
        options.match_field = field;
    }
    if let Some(hash) = overrides.hash {
        options.hash_ids = hash;
    }

    let current_how = match &options.strategy {
        MergeStrategy::Horizontal { how } => *how,
        _ => JoinMode::default(),
    };
    match (overrides.strategy, overrides.how) {
        (Some(StrategyKind::None), _) => options.strategy = MergeStrategy::None,
        (Some(StrategyKind::Cross), _) => {
            options.strategy = MergeStrategy::Cross {
                prefix_a: "a_".to_string(),
                prefix_b: "b_".to_string(),
            }
        }
        (Some(StrategyKind::Vertical), _) => options.strategy = MergeStrategy::Vertical { ensure_same_keys: true },
        (Some(StrategyKind::Horizontal), how) => {
            options.strategy = MergeStrategy::Horizontal {
                how: how.unwrap_or(current_how),
            }
        }
        (None, Some(how)) => options.strategy = MergeStrategy::Horizontal { how },
        (None, None) => {}
    }

    options
}

// =============================================================================
// Helpers
// =============================================================================

fn load(path: &Path) -> Result<LoadedDataset, Box<dyn std::error::Error>> {
    let data = load_dataset(path)?;
    info!(
        path = %path.display(),
        delimiter = ?data.delimiter,
        columns = data.headers.len(),
        "input ready"
    );
    Ok(data)
}

/// Text form of each record's identifier; records without one are skipped.
fn identifiers(records: &[Record], key: &str) -> Vec<String> {
    records
        .iter()
        .filter_map(|r| r.get(key).and_then(|v| v.as_text()))
        .map(|text| text.into_owned())
        .collect()
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

fn write_records(records: &[Record], path: Option<&Path>) -> CliResult {
    match path {
        Some(p) => {
            save_dataset(p, records)?;
            eprintln!("Output written to: {}", p.display());
        }
        None => {
            println!("{}", write_json(records)?);
        }
    }
    Ok(())
}

fn write_ids(ids: &[String], path: Option<&Path>) -> CliResult {
    let json = serde_json::to_string_pretty(ids)?;
    match path {
        Some(p) => {
            fs::write(p, &json)?;
            eprintln!("Output written to: {}", p.display());
        }
        None => {
            println!("{}", json);
        }
    }
    Ok(())
}
