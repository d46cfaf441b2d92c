//! CLI argument parsing using clap.

use clap::ArgMatches;
use clap::Parser;
use clap::Subcommand;
use clap_complete::Shell;
use repoflat_core::config::DEFAULT_MAX_FILES;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "repoflat")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output results in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Flatten snapshot archives into DEST/<folder>/<key>
    Unpack(UnpackArgs),
    /// Show where a flattened file came from
    Lookup(LookupArgs),
    /// Generate shell completions
    Completion(CompletionArgs),
}

#[derive(clap::Args)]
pub struct UnpackArgs {
    /// Snapshot archives named <commit>.zip
    #[arg(value_name = "ARCHIVE", required = true)]
    pub archives: Vec<PathBuf>,

    /// Extract entries matching PATTERN (regex, can be repeated)
    #[arg(short = 'A', long, value_name = "PATTERN")]
    pub accept: Vec<String>,

    /// Skip entries matching PATTERN (regex, can be repeated)
    #[arg(short = 'J', long, value_name = "PATTERN")]
    pub reject: Vec<String>,

    /// Maximum single file size (suffixes K, M, G, T)
    #[arg(short = 'm', long, default_value = "1M", value_parser = parse_byte_size)]
    pub max_file_size: u64,

    /// Maximum number of files to extract per archive
    #[arg(short = 'f', long, default_value_t = DEFAULT_MAX_FILES)]
    pub max_files: usize,

    /// Evaluate filters without writing anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Destination root of the flattened tree
    #[arg(short = 'b', long, value_name = "DIR", default_value = ".")]
    pub dest: PathBuf,

    /// Repository index (`repo branch commit` per line)
    #[arg(short = 'R', long, value_name = "FILE")]
    pub repo_index: Option<PathBuf>,

    /// SQLite database receiving provenance rows
    #[arg(short = 'M', long, value_name = "DB")]
    pub srcmap: Option<PathBuf>,
}

#[derive(clap::Args)]
pub struct LookupArgs {
    /// Flat name as written to disk, `<folder>/<key>`
    #[arg(value_name = "FLAT_NAME")]
    pub flat_name: String,

    /// SQLite database holding provenance rows
    #[arg(short = 'M', long, value_name = "DB")]
    pub srcmap: PathBuf,
}

#[derive(clap::Args)]
pub struct CompletionArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,
}

/// A filter pattern tagged with the flag that introduced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleArg {
    Accept(String),
    Reject(String),
}

/// Collects `--accept` and `--reject` values in command-line order.
///
/// The first matching rule decides, so the interleaving of the two flags
/// matters and cannot be recovered from the derived `Vec` fields alone.
pub fn ordered_rules(matches: &ArgMatches) -> Vec<RuleArg> {
    let mut rules: Vec<(usize, RuleArg)> = Vec::new();

    if let (Some(indices), Some(values)) = (
        matches.indices_of("accept"),
        matches.get_many::<String>("accept"),
    ) {
        rules.extend(indices.zip(values).map(|(i, v)| (i, RuleArg::Accept(v.clone()))));
    }
    if let (Some(indices), Some(values)) = (
        matches.indices_of("reject"),
        matches.get_many::<String>("reject"),
    ) {
        rules.extend(indices.zip(values).map(|(i, v)| (i, RuleArg::Reject(v.clone()))));
    }

    rules.sort_by_key(|(index, _)| *index);
    rules.into_iter().map(|(_, rule)| rule).collect()
}

/// Parse byte size with optional suffix (K, M, G, T)
#[allow(clippy::option_if_let_else)]
fn parse_byte_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty byte size".to_string());
    }

    let (num_str, multiplier) = if let Some(stripped) = s.strip_suffix('T') {
        (stripped, 1024_u64.pow(4))
    } else if let Some(stripped) = s.strip_suffix('G') {
        (stripped, 1024_u64.pow(3))
    } else if let Some(stripped) = s.strip_suffix('M') {
        (stripped, 1024_u64.pow(2))
    } else if let Some(stripped) = s.strip_suffix('K') {
        (stripped, 1024)
    } else {
        (s, 1)
    };

    num_str
        .parse::<u64>()
        .map_err(|_| format!("invalid byte size: {s}"))
        .and_then(|n| {
            n.checked_mul(multiplier)
                .ok_or_else(|| format!("byte size overflow: {s}"))
        })
}
