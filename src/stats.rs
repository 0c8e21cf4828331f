//! The dashboard stats endpoint.

use axum::{Json, extract::State};
use rusqlite::Connection;
use serde::Serialize;
use time::{Date, OffsetDateTime};

use crate::{
    AppState, Error,
    account::{count_accounts, get_total_account_balance},
    auth::AuthenticatedUser,
    budget::count_active_budgets,
    calendar::month_bounds,
    transaction::{TransactionKind, count_transactions, sum_amount_between},
};

/// The numbers shown on the dashboard.
#[derive(Debug, PartialEq, Serialize)]
pub struct Stats {
    /// The income recorded in the current calendar month.
    pub monthly_income: f64,
    /// The expenses recorded in the current calendar month.
    pub monthly_expenses: f64,
    /// Income minus expenses for the current calendar month.
    pub monthly_net: f64,
    /// The sum of all account balances.
    pub total_balance: f64,
    /// The number of accounts.
    pub account_count: i64,
    /// The number of budgets whose date range includes today.
    pub active_budget_count: i64,
    /// The number of transactions ever recorded.
    pub transaction_count: i64,
}

/// A route handler for the dashboard stats.
pub async fn get_stats_endpoint(
    State(state): State<AppState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
) -> Result<Json<Stats>, Error> {
    let connection = state.db_connection.lock().map_err(|_| Error::DatabaseLock)?;

    let today = OffsetDateTime::now_utc().date();
    let stats = get_stats(&connection, &user_id, today)?;

    Ok(Json(stats))
}

fn get_stats(connection: &Connection, user_id: &str, today: Date) -> Result<Stats, Error> {
    let (first_day, last_day) = month_bounds(today.year(), today.month());

    let monthly_income = sum_amount_between(
        connection,
        user_id,
        TransactionKind::Income,
        first_day,
        last_day,
    )?;
    let monthly_expenses = sum_amount_between(
        connection,
        user_id,
        TransactionKind::Expense,
        first_day,
        last_day,
    )?;

    Ok(Stats {
        monthly_income,
        monthly_expenses,
        monthly_net: monthly_income - monthly_expenses,
        total_balance: get_total_account_balance(connection, user_id)?,
        account_count: count_accounts(connection, user_id)?,
        active_budget_count: count_active_budgets(connection, user_id, today)?,
        transaction_count: count_transactions(connection, user_id)?,
    })
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::AppState;

    use super::{Stats, get_stats};

    fn get_test_state() -> AppState {
        let connection =
            Connection::open_in_memory().expect("Could not open database in memory");
        AppState::new(connection, "42").expect("Could not create app state")
    }

    fn seed(state: &AppState) {
        let conn = state.db_connection.lock().unwrap();
        conn.execute_batch(
            "INSERT INTO account (user_id, name, kind, balance)
             VALUES ('alice', 'Checking', 'bank', 150.0), ('alice', 'Wallet', 'cash', 50.0),
                    ('bob', 'Checking', 'bank', 999.0);
             INSERT INTO budget (user_id, name, amount, period, start_date, end_date)
             VALUES ('alice', 'Groceries', 500.0, 'monthly', '2024-06-01', '2024-06-30'),
                    ('alice', 'Old', 100.0, 'monthly', '2024-01-01', '2024-01-31');
             INSERT INTO \"transaction\" (user_id, account_id, kind, amount, date)
             VALUES ('alice', 1, 'income', 1000.0, '2024-06-01'),
                    ('alice', 1, 'expense', 300.0, '2024-06-10'),
                    ('alice', 2, 'expense', 40.0, '2024-05-10');",
        )
        .unwrap();
    }

    #[test]
    fn stats_cover_the_current_month_and_all_time_counts() {
        let state = get_test_state();
        seed(&state);

        let connection = state.db_connection.lock().unwrap();
        let stats = get_stats(&connection, "alice", date!(2024 - 06 - 15)).unwrap();

        assert_eq!(
            stats,
            Stats {
                monthly_income: 1000.0,
                monthly_expenses: 300.0,
                monthly_net: 700.0,
                total_balance: 200.0,
                account_count: 2,
                active_budget_count: 1,
                transaction_count: 3,
            }
        );
    }

    #[test]
    fn stats_are_all_zero_for_a_new_user() {
        let state = get_test_state();
        seed(&state);

        let connection = state.db_connection.lock().unwrap();
        let stats = get_stats(&connection, "carol", date!(2024 - 06 - 15)).unwrap();

        assert_eq!(stats.monthly_income, 0.0);
        assert_eq!(stats.total_balance, 0.0);
        assert_eq!(stats.account_count, 0);
        assert_eq!(stats.active_budget_count, 0);
        assert_eq!(stats.transaction_count, 0);
    }
}
