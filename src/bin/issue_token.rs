//! Issues a signed bearer token for local development and testing.
//!
//! In production, tokens come from the identity provider. This tool signs a
//! token with the same shared secret so the API can be exercised with curl.

use std::process::ExitCode;

use clap::Parser;
use time::Duration;

use wallet_rs::issue_token;

#[derive(Debug, Parser)]
#[command(version, about = "Issue a development bearer token for the wallet API.")]
struct Args {
    /// The user ID to put in the token's subject claim.
    user_id: String,

    /// The signing secret. Falls back to the JWT_SECRET environment variable.
    #[arg(long)]
    secret: Option<String>,

    /// How many minutes the token stays valid.
    #[arg(long, default_value_t = 60)]
    valid_minutes: i64,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let secret = match args.secret.or_else(|| std::env::var("JWT_SECRET").ok()) {
        Some(secret) => secret,
        None => {
            eprintln!("Pass --secret or set the JWT_SECRET environment variable.");
            return ExitCode::FAILURE;
        }
    };

    let token = issue_token(
        &args.user_id,
        &secret,
        Duration::minutes(args.valid_minutes),
    );
    println!("{token}");

    ExitCode::SUCCESS
}
