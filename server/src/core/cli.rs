use clap::{Parser, Subcommand};

use std::path::PathBuf;

use super::constants::{
    ENV_AUDIT_ENABLED, ENV_AUDIT_QUEUE_CAPACITY, ENV_BOOTSTRAP_FILE, ENV_CONFIG, ENV_HOST,
    ENV_PORT,
};

#[derive(Parser)]
#[command(name = "labtrack")]
#[command(version, about = "Laboratory sample tracking server", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Server host address
    #[arg(long, short = 'H', global = true, env = ENV_HOST)]
    pub host: Option<String>,

    /// Server port
    #[arg(long, short = 'p', global = true, env = ENV_PORT)]
    pub port: Option<u16>,

    /// Path to config file
    #[arg(long, short = 'c', global = true, env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    /// File holding `username=` and `password=` lines for the bootstrap admin
    #[arg(long, global = true, env = ENV_BOOTSTRAP_FILE)]
    pub bootstrap_file: Option<PathBuf>,

    /// Enable or disable request auditing
    #[arg(long, global = true, env = ENV_AUDIT_ENABLED)]
    pub audit: Option<bool>,

    /// Audit queue capacity (entries beyond this are dropped)
    #[arg(long, global = true, env = ENV_AUDIT_QUEUE_CAPACITY)]
    pub audit_queue_capacity: Option<usize>,
}

/// Parsed CLI values used by config loading
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub config: Option<PathBuf>,
    pub bootstrap_file: Option<PathBuf>,
    pub audit: Option<bool>,
    pub audit_queue_capacity: Option<usize>,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Start the server (default command)
    Start,
}

/// Parse CLI arguments and return config with command
pub fn parse() -> (CliConfig, Option<Commands>) {
    let cli = Cli::parse();
    let config = CliConfig {
        host: cli.host,
        port: cli.port,
        config: cli.config,
        bootstrap_file: cli.bootstrap_file,
        audit: cli.audit,
        audit_queue_capacity: cli.audit_queue_capacity,
    };
    (config, cli.command)
}
