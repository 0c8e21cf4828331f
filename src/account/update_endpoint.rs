//! Defines the endpoint for updating an existing account.

use axum::{Json, extract::State};
use rusqlite::{Connection, params};
use serde::Deserialize;

use crate::{
    AppState, Error,
    account::{Account, AccountId, AccountKind, map_row_to_account},
    auth::AuthenticatedUser,
};

/// The data for updating an account. The ID identifies the account to update,
/// the remaining fields replace the stored ones.
#[derive(Debug, Deserialize)]
pub struct UpdateAccountForm {
    /// The ID of the account to update.
    pub id: AccountId,
    /// The display name of the account.
    pub name: String,
    /// What kind of money store the account is.
    #[serde(rename = "type")]
    pub kind: AccountKind,
    /// The currency code.
    pub currency: String,
    /// The balance. Updating this directly records a manual correction.
    pub balance: f64,
    /// Whether this is the user's default account.
    pub is_default: bool,
}

/// A route handler for updating an account identified by the ID in the
/// request body.
///
/// Returns 404 if the account does not exist or belongs to another user.
pub async fn update_account_endpoint(
    State(state): State<AppState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Json(form): Json<UpdateAccountForm>,
) -> Result<Json<Account>, Error> {
    let connection = state.db_connection.lock().map_err(|_| Error::DatabaseLock)?;

    let account = update_account(&connection, &user_id, &form)?;

    Ok(Json(account))
}

fn update_account(
    connection: &Connection,
    user_id: &str,
    form: &UpdateAccountForm,
) -> Result<Account, Error> {
    connection
        .prepare(
            "UPDATE account
             SET name = ?1, kind = ?2, currency = ?3, balance = ?4, is_default = ?5
             WHERE id = ?6 AND user_id = ?7
             RETURNING id, user_id, name, kind, currency, balance, is_default",
        )?
        .query_row(
            params![
                form.name,
                form.kind,
                form.currency,
                form.balance,
                form.is_default,
                form.id,
                user_id,
            ],
            map_row_to_account,
        )
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::UpdateMissingAccount,
            error => error.into(),
        })
}
