//! Command-line interface definitions and parsing

use bcrypt_queue_core::ExecutorKind;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Override how execution units are started
    #[arg(short, long, value_enum)]
    pub executor: Option<ExecutorArg>,

    /// Override the host tick interval in milliseconds
    #[arg(long)]
    pub tick_ms: Option<u64>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Hash a password and print the OnHashed callbacks
    Hash {
        password: String,
        /// Work factor (4-31)
        #[arg(short = 'C', long, default_value_t = 10)]
        cost: u16,
        /// Number of independent hash jobs to submit
        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,
    },
    /// Verify a password against a stored hash
    Verify { password: String, hash: String },
    /// Show the version, cost and salt embedded in a hash
    Inspect { hash: String },
    /// Submit many jobs from several producer threads and report throughput
    Stress {
        /// Total number of hash jobs
        #[arg(short, long, default_value_t = 64)]
        jobs: usize,
        /// Work factor for every job
        #[arg(short = 'C', long, default_value_t = 4)]
        cost: u16,
        /// Threads submitting concurrently
        #[arg(short, long, default_value_t = 4)]
        producers: usize,
        /// Simulated script instances receiving every result
        #[arg(long, default_value_t = 1)]
        hosts: usize,
    },
    /// Print the effective configuration as TOML
    Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExecutorArg {
    Thread,
    Pool,
    Tokio,
}

impl From<ExecutorArg> for ExecutorKind {
    fn from(arg: ExecutorArg) -> Self {
        match arg {
            ExecutorArg::Thread => ExecutorKind::Thread,
            ExecutorArg::Pool => ExecutorKind::Pool,
            ExecutorArg::Tokio => ExecutorKind::Tokio,
        }
    }
}
