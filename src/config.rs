//! Command line arguments for the server binary.

use clap::Parser;

/// The command line arguments for the wallet server.
#[derive(Debug, Parser)]
#[command(version, about = "A JSON REST server for tracking personal finances.")]
pub struct Config {
    /// The address and port to listen on, e.g. "127.0.0.1:3000".
    #[arg(long, default_value = "127.0.0.1:3000")]
    pub address: String,

    /// The path to the SQLite database file. The file is created if it does
    /// not exist.
    #[arg(long, default_value = "wallet.db3")]
    pub db_path: String,
}
