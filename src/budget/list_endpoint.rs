//! Defines the endpoint for listing the caller's budgets, optionally
//! filtered to those overlapping a calendar month.

use axum::{
    Json,
    extract::{Query, State},
};
use rusqlite::Connection;
use serde::Deserialize;
use time::Month;

use crate::{
    AppState, Error,
    auth::AuthenticatedUser,
    budget::{Budget, map_row_to_budget},
    calendar::month_bounds,
};

/// Optional month filter for the budget list.
///
/// When both `month` and `year` are given, only budgets whose date range
/// overlaps that calendar month are returned.
#[derive(Debug, Default, Deserialize)]
pub struct BudgetQuery {
    /// The calendar month, 1 through 12.
    pub month: Option<u8>,
    /// The calendar year.
    pub year: Option<i32>,
}

/// A route handler for listing the caller's budgets.
pub async fn get_budgets_endpoint(
    State(state): State<AppState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Query(query): Query<BudgetQuery>,
) -> Result<Json<Vec<Budget>>, Error> {
    let connection = state.db_connection.lock().map_err(|_| Error::DatabaseLock)?;

    let budgets = get_budgets(&connection, &user_id, &query)?;

    Ok(Json(budgets))
}

fn get_budgets(
    connection: &Connection,
    user_id: &str,
    query: &BudgetQuery,
) -> Result<Vec<Budget>, Error> {
    const SELECT: &str = "SELECT id, user_id, name, amount, current_amount, period,
                                 start_date, end_date, account_id
                          FROM budget";

    let budgets = match (query.month, query.year) {
        (Some(month), Some(year)) => {
            let month = Month::try_from(month)
                .map_err(|_| Error::InvalidDate(format!("{month} is not a calendar month")))?;
            let (first_day, last_day) = month_bounds(year, month);

            connection
                .prepare(&format!(
                    "{SELECT} WHERE user_id = ?1 AND start_date <= ?2 AND end_date >= ?3
                     ORDER BY id"
                ))?
                .query_map((user_id, last_day, first_day), map_row_to_budget)?
                .collect::<Result<Vec<_>, _>>()?
        }
        _ => connection
            .prepare(&format!("{SELECT} WHERE user_id = ?1 ORDER BY id"))?
            .query_map([user_id], map_row_to_budget)?
            .collect::<Result<Vec<_>, _>>()?,
    };

    Ok(budgets)
}

#[cfg(test)]
mod tests {
    use axum::{
        Json,
        extract::{Query, State},
    };
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        AppState, Error,
        auth::AuthenticatedUser,
        budget::{BudgetPeriod, CreateBudgetForm, create_budget},
    };

    use super::{BudgetQuery, get_budgets_endpoint};

    fn get_test_state() -> AppState {
        let connection =
            Connection::open_in_memory().expect("Could not open database in memory");
        AppState::new(connection, "42").expect("Could not create app state")
    }

    fn insert_budget(state: &AppState, user_id: &str, name: &str, start: time::Date, end: time::Date) {
        let connection = state.db_connection.lock().unwrap();
        create_budget(
            &connection,
            user_id,
            &CreateBudgetForm {
                name: name.to_owned(),
                amount: 100.0,
                period: BudgetPeriod::Monthly,
                start_date: start,
                end_date: end,
                account_id: None,
            },
        )
        .unwrap();
    }

    #[tokio::test]
    async fn lists_only_own_budgets() {
        let state = get_test_state();
        insert_budget(&state, "alice", "Groceries", date!(2024 - 06 - 01), date!(2024 - 06 - 30));
        insert_budget(&state, "bob", "Rent", date!(2024 - 06 - 01), date!(2024 - 06 - 30));

        let Json(budgets) = get_budgets_endpoint(
            State(state),
            AuthenticatedUser("alice".to_owned()),
            Query(BudgetQuery::default()),
        )
        .await
        .expect("could not list budgets");

        assert_eq!(budgets.len(), 1);
        assert_eq!(budgets[0].name, "Groceries");
    }

    #[tokio::test]
    async fn month_filter_keeps_overlapping_budgets() {
        let state = get_test_state();
        insert_budget(&state, "alice", "June", date!(2024 - 06 - 01), date!(2024 - 06 - 30));
        insert_budget(&state, "alice", "May", date!(2024 - 05 - 01), date!(2024 - 05 - 31));
        // Spans the May/June boundary so it should match both months.
        insert_budget(&state, "alice", "Spring", date!(2024 - 04 - 15), date!(2024 - 06 - 15));

        let Json(budgets) = get_budgets_endpoint(
            State(state),
            AuthenticatedUser("alice".to_owned()),
            Query(BudgetQuery {
                month: Some(6),
                year: Some(2024),
            }),
        )
        .await
        .expect("could not list budgets");

        let names: Vec<_> = budgets.iter().map(|budget| budget.name.as_str()).collect();
        assert_eq!(names, vec!["June", "Spring"]);
    }

    #[tokio::test]
    async fn rejects_invalid_month() {
        let state = get_test_state();

        let result = get_budgets_endpoint(
            State(state),
            AuthenticatedUser("alice".to_owned()),
            Query(BudgetQuery {
                month: Some(13),
                year: Some(2024),
            }),
        )
        .await;

        assert!(matches!(result.unwrap_err(), Error::InvalidDate(_)));
    }
}
