//! Defines the endpoint for deleting a transaction.

use axum::{Json, extract::State};
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{
    AppState, Error,
    auth::AuthenticatedUser,
    transaction::{
        TransactionId, adjust_account_balance, adjust_budget_accumulation, get_transaction,
    },
};

/// Identifies the transaction to delete.
#[derive(Debug, Deserialize)]
pub struct DeleteTransactionForm {
    /// The ID of the transaction to delete.
    pub id: TransactionId,
}

/// A route handler for deleting a transaction identified by the ID in the
/// request body.
///
/// Deleting reverses the transaction's effect on its account balance and, if
/// one is linked, its budget accumulation, atomically with removing the row.
pub async fn delete_transaction_endpoint(
    State(state): State<AppState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Json(form): Json<DeleteTransactionForm>,
) -> Result<Json<Value>, Error> {
    let mut connection = state.db_connection.lock().map_err(|_| Error::DatabaseLock)?;

    delete_transaction(&mut connection, &user_id, form.id)?;

    Ok(Json(json!({ "message": "Transaction deleted successfully" })))
}

fn delete_transaction(
    connection: &mut Connection,
    user_id: &str,
    transaction_id: TransactionId,
) -> Result<(), Error> {
    let db_transaction = connection.transaction()?;

    let transaction = get_transaction(&db_transaction, user_id, transaction_id)
        .map_err(|error| match error {
            Error::NotFound => Error::DeleteMissingTransaction,
            error => error,
        })?;

    adjust_account_balance(
        &db_transaction,
        user_id,
        transaction.account_id,
        -transaction.kind.balance_delta(transaction.amount),
    )?;

    if let Some(budget_id) = transaction.budget_id {
        adjust_budget_accumulation(
            &db_transaction,
            user_id,
            budget_id,
            -transaction.kind.budget_delta(transaction.amount),
        )?;
    }

    db_transaction.execute(
        "DELETE FROM \"transaction\" WHERE id = ?1",
        [transaction_id],
    )?;

    db_transaction.commit()?;

    Ok(())
}
