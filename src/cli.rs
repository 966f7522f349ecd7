use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "lockheap")]
#[command(about = "Heap-sort values or hammer a shared max-heap from many threads", long_about = None)]
pub struct Cli {
    /// Config file (default: ~/.config/lockheap/config.toml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Heap-sort integers given as arguments or read from stdin
    Sort(SortArgs),
    /// Insert from many threads into one heap and verify the result
    Stress(StressArgs),
}

#[derive(Args, Debug)]
pub struct SortArgs {
    /// Values to sort (reads whitespace-separated values from stdin if empty)
    #[arg(value_name = "VALUES", allow_negative_numbers = true)]
    pub values: Vec<i64>,

    /// Smallest first instead of largest first
    #[arg(long)]
    pub ascending: bool,

    /// Output JSON to stdout
    #[arg(long)]
    pub json: bool,

    /// Write JSON output to file
    #[arg(long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct StressArgs {
    /// Number of inserting threads (0 = auto-detect)
    #[arg(long, value_name = "N")]
    pub threads: Option<usize>,

    /// Inserts performed by each thread
    #[arg(long, value_name = "M")]
    pub inserts: Option<usize>,

    /// Initial heap capacity (default: exactly threads * inserts for fixed heaps)
    #[arg(long, value_name = "SLOTS")]
    pub capacity: Option<usize>,

    /// Growth policy when the heap fills up: fixed or double
    #[arg(long, value_name = "POLICY")]
    pub growth: Option<String>,

    /// Show progress bar while inserting
    #[arg(long)]
    pub progress: bool,

    /// Output JSON to stdout
    #[arg(long)]
    pub json: bool,

    /// Write JSON output to file
    #[arg(long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

impl Cli {
    pub fn validate(&self) -> Result<(), String> {
        match &self.command {
            Command::Sort(_) => Ok(()),
            Command::Stress(args) => {
                if args.inserts == Some(0) {
                    return Err("--inserts must be at least 1".to_string());
                }
                match args.growth.as_deref() {
                    None | Some("fixed") | Some("double") => Ok(()),
                    Some(other) => Err(format!(
                        "Invalid --growth policy: {}. Must be fixed or double",
                        other
                    )),
                }
            }
        }
    }
}

impl SortArgs {
    pub fn should_output_json(&self) -> bool {
        self.json || self.output.is_some()
    }
}

impl StressArgs {
    pub fn should_output_json(&self) -> bool {
        self.json || self.output.is_some()
    }
}
