//! Reporting endpoints: the spending trend chart and the monthly summary.

use axum::{
    Json,
    extract::{Query, State},
};
use rusqlite::{Connection, params};
use serde::{Deserialize, Serialize};
use time::{Month, OffsetDateTime};

use crate::{
    AppState, Error,
    auth::AuthenticatedUser,
    calendar::{month_bounds, months_before, short_month_name},
    transaction::{TransactionKind, sum_amount_between},
};

/// How many trailing months the spending report covers by default.
const DEFAULT_REPORT_MONTHS: u32 = 6;
/// The most trailing months a spending report may cover.
const MAX_REPORT_MONTHS: u32 = 24;

/// The parameters of the spending report.
#[derive(Debug, Default, Deserialize)]
pub struct SpendingReportQuery {
    /// How many trailing months to cover, including the current one.
    pub months: Option<u32>,
}

/// One month of the spending trend chart.
#[derive(Debug, PartialEq, Serialize)]
pub struct SpendingMonth {
    /// The three-letter label of the month.
    pub month: &'static str,
    /// The expense total for the month.
    pub amount: f64,
    /// The expense total for the same month one year earlier.
    pub previous: f64,
}

/// A route handler for the spending trend: expense totals for the trailing
/// months up to and including the current one, oldest first, with the same
/// month of the previous year alongside for comparison.
///
/// Months without transactions report zero rather than being skipped, so the
/// chart always has a point per month.
pub async fn spending_report_endpoint(
    State(state): State<AppState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Query(query): Query<SpendingReportQuery>,
) -> Result<Json<Vec<SpendingMonth>>, Error> {
    let connection = state.db_connection.lock().map_err(|_| Error::DatabaseLock)?;

    let today = OffsetDateTime::now_utc().date();
    let months = query
        .months
        .unwrap_or(DEFAULT_REPORT_MONTHS)
        .clamp(1, MAX_REPORT_MONTHS);

    let report = spending_report(&connection, &user_id, today.year(), today.month(), months)?;

    Ok(Json(report))
}

fn spending_report(
    connection: &Connection,
    user_id: &str,
    year: i32,
    month: Month,
    months: u32,
) -> Result<Vec<SpendingMonth>, Error> {
    let mut report = Vec::with_capacity(months as usize);

    for offset in (0..months).rev() {
        let (year, month) = months_before(year, month, offset);

        let (first_day, last_day) = month_bounds(year, month);
        let amount = sum_amount_between(
            connection,
            user_id,
            TransactionKind::Expense,
            first_day,
            last_day,
        )?;

        let (first_day, last_day) = month_bounds(year - 1, month);
        let previous = sum_amount_between(
            connection,
            user_id,
            TransactionKind::Expense,
            first_day,
            last_day,
        )?;

        report.push(SpendingMonth {
            month: short_month_name(month),
            amount,
            previous,
        });
    }

    Ok(report)
}

/// The parameters of the monthly summary. Both default to the current
/// calendar month.
#[derive(Debug, Default, Deserialize)]
pub struct MonthlyReportQuery {
    /// The calendar month, 1 through 12.
    pub month: Option<u8>,
    /// The calendar year.
    pub year: Option<i32>,
}

/// A category's share of a month's money flow.
#[derive(Debug, PartialEq, Serialize)]
pub struct CategoryBreakdown {
    /// The category name. Transactions without one fall under "Uncategorized".
    pub category: String,
    /// Whether this line sums income or expenses.
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// The summed amount.
    pub total: f64,
}

/// An account's share of a month's money flow.
#[derive(Debug, PartialEq, Serialize)]
pub struct AccountBreakdown {
    /// The ID of the account.
    pub account_id: i64,
    /// The display name of the account.
    pub name: String,
    /// The income recorded on the account this month.
    pub total_income: f64,
    /// The expenses recorded on the account this month.
    pub total_expenses: f64,
}

/// A summary of one calendar month.
#[derive(Debug, Serialize)]
pub struct MonthlyReport {
    /// The three-letter label of the month.
    pub month: &'static str,
    /// The calendar year.
    pub year: i32,
    /// The month's income total.
    pub total_income: f64,
    /// The month's expense total.
    pub total_expenses: f64,
    /// Income minus expenses.
    pub net: f64,
    /// The month's money flow grouped by category.
    pub categories: Vec<CategoryBreakdown>,
    /// The month's money flow grouped by account.
    pub accounts: Vec<AccountBreakdown>,
}

/// A route handler for the monthly summary: totals plus per-category and
/// per-account breakdowns for one calendar month.
pub async fn monthly_report_endpoint(
    State(state): State<AppState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Query(query): Query<MonthlyReportQuery>,
) -> Result<Json<MonthlyReport>, Error> {
    let connection = state.db_connection.lock().map_err(|_| Error::DatabaseLock)?;

    let today = OffsetDateTime::now_utc().date();
    let month = match query.month {
        Some(month) => Month::try_from(month)
            .map_err(|_| Error::InvalidDate(format!("{month} is not a calendar month")))?,
        None => today.month(),
    };
    let year = query.year.unwrap_or_else(|| today.year());

    let report = monthly_report(&connection, &user_id, year, month)?;

    Ok(Json(report))
}

fn monthly_report(
    connection: &Connection,
    user_id: &str,
    year: i32,
    month: Month,
) -> Result<MonthlyReport, Error> {
    let (first_day, last_day) = month_bounds(year, month);

    let total_income = sum_amount_between(
        connection,
        user_id,
        TransactionKind::Income,
        first_day,
        last_day,
    )?;
    let total_expenses = sum_amount_between(
        connection,
        user_id,
        TransactionKind::Expense,
        first_day,
        last_day,
    )?;

    let categories = connection
        .prepare(
            "SELECT COALESCE(category_name, 'Uncategorized'), kind, TOTAL(amount)
             FROM \"transaction\"
             WHERE user_id = ?1 AND date >= ?2 AND date <= ?3
             GROUP BY category_name, kind
             ORDER BY 3 DESC",
        )?
        .query_map(params![user_id, first_day, last_day], |row| {
            Ok(CategoryBreakdown {
                category: row.get(0)?,
                kind: row.get(1)?,
                total: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let accounts = connection
        .prepare(
            "SELECT account.id, account.name,
                    TOTAL(CASE WHEN t.kind = 'income' THEN t.amount ELSE 0 END),
                    TOTAL(CASE WHEN t.kind = 'expense' THEN t.amount ELSE 0 END)
             FROM \"transaction\" t
             JOIN account ON account.id = t.account_id
             WHERE t.user_id = ?1 AND t.date >= ?2 AND t.date <= ?3
             GROUP BY account.id, account.name
             ORDER BY account.id",
        )?
        .query_map(params![user_id, first_day, last_day], |row| {
            Ok(AccountBreakdown {
                account_id: row.get(0)?,
                name: row.get(1)?,
                total_income: row.get(2)?,
                total_expenses: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(MonthlyReport {
        month: short_month_name(month),
        year,
        total_income,
        total_expenses,
        net: total_income - total_expenses,
        categories,
        accounts,
    })
}
