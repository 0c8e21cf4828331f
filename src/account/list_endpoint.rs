//! Defines the endpoint for listing the caller's accounts.

use axum::{Json, extract::State};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    account::{Account, map_row_to_account},
    auth::AuthenticatedUser,
};

/// A route handler for listing all the accounts owned by the caller.
pub async fn get_accounts_endpoint(
    State(state): State<AppState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
) -> Result<Json<Vec<Account>>, Error> {
    let connection = state.db_connection.lock().map_err(|_| Error::DatabaseLock)?;

    let accounts = get_accounts(&connection, &user_id)?;

    Ok(Json(accounts))
}

fn get_accounts(connection: &Connection, user_id: &str) -> Result<Vec<Account>, Error> {
    let accounts = connection
        .prepare(
            "SELECT id, user_id, name, kind, currency, balance, is_default
             FROM account WHERE user_id = ?1 ORDER BY id",
        )?
        .query_map([user_id], map_row_to_account)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(accounts)
}
