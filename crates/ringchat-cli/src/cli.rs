//! Command-line interface definitions and parsing

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about = "Token-ring replicated chat node", long_about = None)]
pub struct Cli {
    /// Node name used on the ring (generated if not set here or in the
    /// configuration file)
    #[arg(short, long)]
    pub name: Option<String>,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Data directory for the durable chat log
    #[arg(short, long)]
    pub data_dir: Option<PathBuf>,

    /// Delay before the protocol starts, in milliseconds
    #[arg(long)]
    pub startup_delay_ms: Option<u64>,

    /// Found the network on a cold start: give up joining after one attempt
    #[arg(long)]
    pub bootstrap: bool,

    /// Probability in [0, 1] that an inbound datagram is dropped
    #[arg(long)]
    pub drop_probability: Option<f64>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}
