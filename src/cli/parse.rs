//! CLI parse: clap types for nbforge. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// nbforge CLI - batch notebook generation, validation and title repair
#[derive(Parser)]
#[command(name = "nbforge")]
#[command(about = "Generate, validate and repair educational notebooks in batches")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Disable logging entirely
    #[arg(long)]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (used when output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a range of catalog entries
    Batch {
        /// Zero-based catalog index of the first entry
        start: usize,
        /// Number of entries (default: batch.default_count)
        count: Option<usize>,
        /// Seconds to wait between items (default: batch.delay_secs)
        #[arg(long)]
        delay: Option<u64>,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Generate every catalog entry
    All {
        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
        /// Seconds to wait between items (default: batch.delay_secs)
        #[arg(long)]
        delay: Option<u64>,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Generate a single catalog entry by id
    Generate {
        /// Notebook id, e.g. 079
        id: String,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Run the structural checks against an existing notebook file
    Validate {
        path: PathBuf,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Report which notebooks open with a conforming title heading
    Audit {
        /// Directory to scan (default: the artifact root)
        #[arg(long)]
        root: Option<PathBuf>,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Rewrite non-conforming title headings from the canonical title table
    Repair {
        /// Directory to scan (default: the artifact root)
        #[arg(long)]
        root: Option<PathBuf>,
        /// Title table file (default: batch.titles)
        #[arg(long)]
        titles: Option<PathBuf>,
        /// Report what would change without writing
        #[arg(long)]
        dry_run: bool,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// List catalog entries with their batch indices
    Catalog {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}
