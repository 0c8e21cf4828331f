//! Defines the endpoint for recording a new transaction.

use axum::{Json, extract::State, http::StatusCode};
use rusqlite::{Connection, params};
use serde::Deserialize;
use time::{Date, OffsetDateTime};

use crate::{
    AppState, Error,
    account::AccountId,
    alerts::check_budget_alerts,
    auth::AuthenticatedUser,
    budget::BudgetId,
    transaction::{
        Transaction, TransactionKind, adjust_account_balance, adjust_budget_accumulation,
        map_row_to_transaction,
    },
};

use super::core::TRANSACTION_COLUMNS;

/// The data for recording a transaction.
#[derive(Debug, Deserialize)]
pub struct CreateTransactionForm {
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
    /// The date the transaction occurred, defaults to today.
    #[serde(default)]
    pub date: Option<Date>,
}

/// A route handler for recording a new transaction.
///
/// The transaction row, the account balance change, and the budget
/// accumulation change are applied atomically. A request naming an account
/// or budget that does not belong to the caller is rejected with 400 and
/// leaves the database untouched.
pub async fn create_transaction_endpoint(
    State(state): State<AppState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Json(form): Json<CreateTransactionForm>,
) -> Result<(StatusCode, Json<Transaction>), Error> {
    let mut connection = state.db_connection.lock().map_err(|_| Error::DatabaseLock)?;

    let transaction = create_transaction(&mut connection, &user_id, &form)?;

    // Alert checks run after the commit so a failure here cannot undo or
    // block the recorded transaction.
    if transaction.kind == TransactionKind::Expense
        && let Some(category_name) = &transaction.category_name
        && let Err(error) = check_budget_alerts(&connection, &user_id, category_name, transaction.date)
    {
        tracing::error!("could not check budget alerts: {error}");
    }

    Ok((StatusCode::CREATED, Json(transaction)))
}

pub fn create_transaction(
    connection: &mut Connection,
    user_id: &str,
    form: &CreateTransactionForm,
) -> Result<Transaction, Error> {
    if form.amount <= 0.0 {
        return Err(Error::NonPositiveAmount(form.amount));
    }

    let date = form
        .date
        .unwrap_or_else(|| OffsetDateTime::now_utc().date());

    let db_transaction = connection.transaction()?;

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
            "INSERT INTO \"transaction\"
                 (user_id, account_id, budget_id, kind, amount, category_name,
                  sub_category, description, date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             RETURNING {TRANSACTION_COLUMNS}"
        ))?
        .query_row(
            params![
                user_id,
                form.account_id,
                form.budget_id,
                form.kind,
                form.amount,
                form.category_name,
                form.sub_category,
                form.description,
                date,
            ],
            map_row_to_transaction,
        )?;

    db_transaction.commit()?;

    Ok(transaction)
}
