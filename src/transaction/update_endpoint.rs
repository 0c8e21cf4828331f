//! Defines the endpoint for editing an existing transaction.

use axum::{Json, extract::State};
use rusqlite::{Connection, params};
use serde::Deserialize;
use time::Date;

use crate::{
    AppState, Error,
    account::AccountId,
    auth::AuthenticatedUser,
    budget::BudgetId,
    transaction::{
        Transaction, TransactionId, TransactionKind, adjust_account_balance,
        adjust_budget_accumulation, get_transaction, map_row_to_transaction,
    },
};

use super::core::TRANSACTION_COLUMNS;

/// The data for editing a transaction. The ID identifies the transaction to
/// edit, the remaining fields replace the stored ones.
#[derive(Debug, Deserialize)]
pub struct UpdateTransactionForm {
    /// The ID of the transaction to edit.
    pub id: TransactionId,
    /// The account the money moved in or out of.
    pub account_id: AccountId,
    /// The budget the transaction counts against, if any.
    #[serde(default)]
    pub budget_id: Option<BudgetId>,
    /// Whether the transaction is income or an expense.
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// The amount of money, must be positive.
    pub amount: f64,
    /// The category the transaction belongs to.
    #[serde(default)]
    pub category_name: Option<String>,
    /// The sub-category within the category.
    #[serde(default)]
    pub sub_category: Option<String>,
    /// A free-form note.
    #[serde(default)]
    pub description: Option<String>,
    /// The date the transaction occurred.
    pub date: Date,
}

/// A route handler for editing a transaction identified by the ID in the
/// request body.
///
/// The old transaction's effects on its account balance and budget
/// accumulation are reversed, then the new values are applied, all in the
/// same database transaction as the row update. The account and budget may
/// both change in a single edit.
pub async fn update_transaction_endpoint(
    State(state): State<AppState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Json(form): Json<UpdateTransactionForm>,
) -> Result<Json<Transaction>, Error> {
    let mut connection = state.db_connection.lock().map_err(|_| Error::DatabaseLock)?;

    let transaction = update_transaction(&mut connection, &user_id, &form)?;

    Ok(Json(transaction))
}

fn update_transaction(
    connection: &mut Connection,
    user_id: &str,
    form: &UpdateTransactionForm,
) -> Result<Transaction, Error> {
    if form.amount <= 0.0 {
        return Err(Error::NonPositiveAmount(form.amount));
    }

    let db_transaction = connection.transaction()?;

    let old = get_transaction(&db_transaction, user_id, form.id).map_err(|error| match error {
        Error::NotFound => Error::UpdateMissingTransaction,
        error => error,
    })?;

    adjust_account_balance(
        &db_transaction,
        user_id,
        old.account_id,
        -old.kind.balance_delta(old.amount),
    )?;
    if let Some(budget_id) = old.budget_id {
        adjust_budget_accumulation(
            &db_transaction,
            user_id,
            budget_id,
            -old.kind.budget_delta(old.amount),
        )?;
    }

    adjust_account_balance(
        &db_transaction,
        user_id,
        form.account_id,
        form.kind.balance_delta(form.amount),
    )?;
    if let Some(budget_id) = form.budget_id {
        adjust_budget_accumulation(
            &db_transaction,
            user_id,
            budget_id,
            form.kind.budget_delta(form.amount),
        )?;
    }

    let transaction = db_transaction
        .prepare(&format!(
            "UPDATE \"transaction\"
             SET account_id = ?1, budget_id = ?2, kind = ?3, amount = ?4,
                 category_name = ?5, sub_category = ?6, description = ?7, date = ?8
             WHERE id = ?9
             RETURNING {TRANSACTION_COLUMNS}"
        ))?
        .query_row(
            params![
                form.account_id,
                form.budget_id,
                form.kind,
                form.amount,
                form.category_name,
                form.sub_category,
                form.description,
                form.date,
                form.id,
            ],
            map_row_to_transaction,
        )?;

    db_transaction.commit()?;

    Ok(transaction)
}
