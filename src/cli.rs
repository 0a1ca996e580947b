use clap::Parser;

/// Serve the configured payload under a single mounted route
#[derive(Parser, Debug)]
#[command(name = "stuff-server", version)]
pub struct Cli {
    /// Configuration file path, without extension
    #[arg(short, long, default_value = "config")]
    pub config: String,

    /// Listen port, overriding PORT and the config file
    #[arg(short, long)]
    pub port: Option<u16>,
}
