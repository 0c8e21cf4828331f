use std::{env, net::SocketAddr, process::ExitCode};

use axum_server::Handle;
use clap::Parser;
use rusqlite::Connection;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wallet_rs::{AppState, Config, build_router, graceful_shutdown};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wallet_rs=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::parse();

    let Ok(jwt_secret) = env::var("JWT_SECRET") else {
        tracing::error!("JWT_SECRET must be set to the identity provider's signing secret.");
        return ExitCode::FAILURE;
    };

    let connection = match Connection::open(&config.db_path) {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not open database at {}: {error}", config.db_path);
            return ExitCode::FAILURE;
        }
    };

    let state = match AppState::new(connection, &jwt_secret) {
        Ok(state) => state,
        Err(error) => {
            tracing::error!("could not initialize the application state: {error}");
            return ExitCode::FAILURE;
        }
    };

    let address: SocketAddr = match config.address.parse() {
        Ok(address) => address,
        Err(error) => {
            tracing::error!("could not parse address {}: {error}", config.address);
            return ExitCode::FAILURE;
        }
    };

    let router = build_router(state);

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    tracing::info!("listening on http://{address}");

    if let Err(error) = axum_server::bind(address)
        .handle(handle)
        .serve(router.into_make_service())
        .await
    {
        tracing::error!("server stopped with an error: {error}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
