//! Defines the endpoint for updating an existing budget.

use axum::{Json, extract::State};
use rusqlite::{Connection, params};
use serde::Deserialize;
use time::Date;

use crate::{
    AppState, Error,
    account::{AccountId, account_exists},
    auth::AuthenticatedUser,
    budget::{Budget, BudgetId, BudgetPeriod, map_row_to_budget},
};

/// The data for updating a budget. The ID identifies the budget to update,
/// the remaining fields replace the stored ones.
///
/// `current_amount` cannot be set through this endpoint, it is derived from
/// the budget's transactions.
#[derive(Debug, Deserialize)]
pub struct UpdateBudgetForm {
    /// The ID of the budget to update.
    pub id: BudgetId,
    /// The display name of the budget.
    pub name: String,
    /// The spending cap.
    pub amount: f64,
    /// How often the budget resets.
    pub period: BudgetPeriod,
    /// The first day the budget covers.
    pub start_date: Date,
    /// The last day the budget covers.
    pub end_date: Date,
    /// An optional account the budget is restricted to.
    #[serde(default)]
    pub account_id: Option<AccountId>,
}

/// A route handler for updating a budget identified by the ID in the
/// request body.
pub async fn update_budget_endpoint(
    State(state): State<AppState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Json(form): Json<UpdateBudgetForm>,
) -> Result<Json<Budget>, Error> {
    let connection = state.db_connection.lock().map_err(|_| Error::DatabaseLock)?;

    let budget = update_budget(&connection, &user_id, &form)?;

    Ok(Json(budget))
}

fn update_budget(
    connection: &Connection,
    user_id: &str,
    form: &UpdateBudgetForm,
) -> Result<Budget, Error> {
    if form.amount <= 0.0 {
        return Err(Error::NonPositiveAmount(form.amount));
    }

    if form.end_date < form.start_date {
        return Err(Error::InvalidDate(
            "the end date must not be before the start date".to_owned(),
        ));
    }

    if let Some(account_id) = form.account_id
        && !account_exists(connection, user_id, account_id)?
    {
        return Err(Error::InvalidAccount(Some(account_id)));
    }

    connection
        .prepare(
            "UPDATE budget
             SET name = ?1, amount = ?2, period = ?3, start_date = ?4, end_date = ?5,
                 account_id = ?6
             WHERE id = ?7 AND user_id = ?8
             RETURNING id, user_id, name, amount, current_amount, period,
                       start_date, end_date, account_id",
        )?
        .query_row(
            params![
                form.name,
                form.amount,
                form.period,
                form.start_date,
                form.end_date,
                form.account_id,
                form.id,
                user_id,
            ],
            map_row_to_budget,
        )
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::UpdateMissingBudget,
            error => error.into(),
        })
}
