//! Defines the endpoint for creating a new budget.

use axum::{Json, extract::State, http::StatusCode};
use rusqlite::{Connection, params};
use serde::Deserialize;
use time::Date;

use crate::{
    AppState, Error,
    account::{AccountId, account_exists},
    auth::AuthenticatedUser,
    budget::{Budget, BudgetPeriod, map_row_to_budget},
};

/// The data for creating a budget.
#[derive(Debug, Deserialize)]
pub struct CreateBudgetForm {
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

/// A route handler for creating a new budget.
///
/// New budgets start with a zero `current_amount` regardless of existing
/// transactions; only transactions recorded after creation accumulate.
pub async fn create_budget_endpoint(
    State(state): State<AppState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Json(form): Json<CreateBudgetForm>,
) -> Result<(StatusCode, Json<Budget>), Error> {
    let connection = state.db_connection.lock().map_err(|_| Error::DatabaseLock)?;

    let budget = create_budget(&connection, &user_id, &form)?;

    Ok((StatusCode::CREATED, Json(budget)))
}

pub fn create_budget(
    connection: &Connection,
    user_id: &str,
    form: &CreateBudgetForm,
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

    let budget = connection
        .prepare(
            "INSERT INTO budget (user_id, name, amount, period, start_date, end_date, account_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             RETURNING id, user_id, name, amount, current_amount, period,
                       start_date, end_date, account_id",
        )?
        .query_row(
            params![
                user_id,
                form.name,
                form.amount,
                form.period,
                form.start_date,
                form.end_date,
                form.account_id,
            ],
            map_row_to_budget,
        )?;

    Ok(budget)
}
