use clap::{Parser, Subcommand};

use std::path::PathBuf;

use super::constants::{
    DEFAULT_SEED_POSTS_PER_USER, DEFAULT_SEED_USERS, ENV_CONFIG, ENV_EXPORT_MAX_ROWS,
    ENV_EXPORT_TIMEOUT_SECS, ENV_HOST, ENV_PORT, ENV_REQUEST_TIMEOUT_SECS,
};

#[derive(Parser)]
#[command(name = "usergrid")]
#[command(version, about = "User management backend with grid filtering", long_about = None)]
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

    /// API request timeout in seconds
    #[arg(long, global = true, env = ENV_REQUEST_TIMEOUT_SECS)]
    pub request_timeout_secs: Option<u64>,

    /// Maximum rows written by one export
    #[arg(long, global = true, env = ENV_EXPORT_MAX_ROWS)]
    pub export_max_rows: Option<u64>,

    /// Export request timeout in seconds
    #[arg(long, global = true, env = ENV_EXPORT_TIMEOUT_SECS)]
    pub export_timeout_secs: Option<u64>,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Start the server (default command)
    Start,
    /// Populate the database with generated users and posts
    Seed {
        /// Number of users to create
        #[arg(long, default_value_t = DEFAULT_SEED_USERS)]
        users: u32,

        /// Number of posts per user
        #[arg(long, default_value_t = DEFAULT_SEED_POSTS_PER_USER)]
        posts_per_user: u32,
    },
    /// System maintenance commands
    System {
        #[command(subcommand)]
        command: SystemCommands,
    },
}

#[derive(Subcommand, Clone, Debug)]
pub enum SystemCommands {
    /// Delete local data directory (database and WAL files). Requires confirmation.
    Prune {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub config: Option<PathBuf>,
    pub request_timeout_secs: Option<u64>,
    pub export_max_rows: Option<u64>,
    pub export_timeout_secs: Option<u64>,
}

/// Parse CLI arguments and return config with command
pub fn parse() -> (CliConfig, Option<Commands>) {
    let cli = Cli::parse();
    let config = CliConfig {
        host: cli.host,
        port: cli.port,
        config: cli.config,
        request_timeout_secs: cli.request_timeout_secs,
        export_max_rows: cli.export_max_rows,
        export_timeout_secs: cli.export_timeout_secs,
    };
    (config, cli.command)
}
