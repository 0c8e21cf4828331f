//! wallet-rs is a personal-finance tracking service: a JSON REST API for
//! managing accounts, budgets, categories, and transactions, and for reading
//! aggregate spending statistics.
//!
//! Identity is delegated to an external identity provider; this library only
//! verifies bearer tokens and scopes every query to the authenticated user.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

use crate::database_id::DatabaseId;

mod account;
mod alerts;
mod app_state;
mod auth;
mod budget;
mod calendar;
mod category;
mod config;
mod database_id;
mod db;
mod endpoints;
mod pagination;
mod report;
mod routing;
mod stats;
mod transaction;
mod user_settings;

pub use app_state::AppState;
pub use auth::issue_token;
pub use config::Config;
pub use db::initialize as initialize_db;
pub use routing::build_router;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The account ID used in a request did not match an account owned by the
    /// caller.
    #[error("the account ID does not refer to a valid account")]
    InvalidAccount(Option<DatabaseId>),

    /// The budget ID used in a request did not match a budget owned by the
    /// caller.
    #[error("the budget ID does not refer to a valid budget")]
    InvalidBudget(Option<DatabaseId>),

    /// A transaction amount was zero or negative.
    ///
    /// Amounts are positive magnitudes; the transaction type decides the sign
    /// applied to account balances and budget accumulations.
    #[error("transaction amounts must be positive, got {0}")]
    NonPositiveAmount(f64),

    /// Tried to delete an account that is still referenced by transactions or
    /// budgets.
    #[error("the account is still referenced by transactions or budgets")]
    AccountInUse,

    /// A date component in a query could not be interpreted as a calendar
    /// month or year.
    #[error("invalid date: {0}")]
    InvalidDate(String),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Tried to delete a transaction that does not exist
    #[error("tried to delete a transaction that is not in the database")]
    DeleteMissingTransaction,

    /// Tried to update a transaction that does not exist
    #[error("tried to update a transaction that is not in the database")]
    UpdateMissingTransaction,

    /// Tried to delete an account that does not exist
    #[error("tried to delete an account that is not in the database")]
    DeleteMissingAccount,

    /// Tried to update an account that does not exist
    #[error("tried to update an account that is not in the database")]
    UpdateMissingAccount,

    /// Tried to delete a budget that does not exist
    #[error("tried to delete a budget that is not in the database")]
    DeleteMissingBudget,

    /// Tried to update a budget that does not exist
    #[error("tried to update a budget that is not in the database")]
    UpdateMissingBudget,

    /// Tried to delete a category that does not exist
    #[error("tried to delete a category that is not in the database")]
    DeleteMissingCategory,

    /// Tried to update a category that does not exist
    #[error("tried to update a category that is not in the database")]
    UpdateMissingCategory,

    /// An error occurred while serializing a struct as JSON
    #[error("could not serialize as JSON: {0}")]
    JsonSerialization(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLock,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match self {
            Error::InvalidAccount(_)
            | Error::InvalidBudget(_)
            | Error::NonPositiveAmount(_)
            | Error::AccountInUse
            | Error::InvalidDate(_) => StatusCode::BAD_REQUEST,
            Error::NotFound
            | Error::DeleteMissingTransaction
            | Error::UpdateMissingTransaction
            | Error::DeleteMissingAccount
            | Error::UpdateMissingAccount
            | Error::DeleteMissingBudget
            | Error::UpdateMissingBudget
            | Error::DeleteMissingCategory
            | Error::UpdateMissingCategory => StatusCode::NOT_FOUND,
            // Any errors that are not handled above are not intended to be
            // shown to the client.
            ref error => {
                tracing::error!("An unexpected error occurred: {}", error);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "error": "An unexpected error occurred, check the server logs for more details."
                    })),
                )
                    .into_response();
            }
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
