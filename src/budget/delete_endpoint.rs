//! Defines the endpoint for deleting a budget.

use axum::{Json, extract::State};
use rusqlite::{Connection, params};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{AppState, Error, auth::AuthenticatedUser, budget::BudgetId};

/// Identifies the budget to delete.
#[derive(Debug, Deserialize)]
pub struct DeleteBudgetForm {
    /// The ID of the budget to delete.
    pub id: BudgetId,
}

/// A route handler for deleting a budget identified by the ID in the
/// request body.
///
/// Transactions that referenced the budget are kept, their budget link is
/// cleared by the schema's ON DELETE SET NULL clause.
pub async fn delete_budget_endpoint(
    State(state): State<AppState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Json(form): Json<DeleteBudgetForm>,
) -> Result<Json<Value>, Error> {
    let connection = state.db_connection.lock().map_err(|_| Error::DatabaseLock)?;

    delete_budget(&connection, &user_id, form.id)?;

    Ok(Json(json!({ "message": "Budget deleted successfully" })))
}

fn delete_budget(
    connection: &Connection,
    user_id: &str,
    budget_id: BudgetId,
) -> Result<(), Error> {
    let rows_deleted = connection.execute(
        "DELETE FROM budget WHERE id = ?1 AND user_id = ?2",
        params![budget_id, user_id],
    )?;

    if rows_deleted == 0 {
        return Err(Error::DeleteMissingBudget);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use axum::{Json, extract::State};
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        AppState, Error,
        auth::AuthenticatedUser,
        budget::{BudgetPeriod, CreateBudgetForm, create_budget},
    };

    use super::{DeleteBudgetForm, delete_budget_endpoint};

    fn get_test_state() -> AppState {
        let connection =
            Connection::open_in_memory().expect("Could not open database in memory");
        AppState::new(connection, "42").expect("Could not create app state")
    }

    fn create_test_budget(state: &AppState, user_id: &str) -> i64 {
        let connection = state.db_connection.lock().unwrap();
        create_budget(
            &connection,
            user_id,
            &CreateBudgetForm {
                name: "Groceries".to_owned(),
                amount: 500.0,
                period: BudgetPeriod::Monthly,
                start_date: date!(2024 - 06 - 01),
                end_date: date!(2024 - 06 - 30),
                account_id: None,
            },
        )
        .unwrap()
        .id
    }

    #[tokio::test]
    async fn deletes_own_budget() {
        let state = get_test_state();
        let budget_id = create_test_budget(&state, "alice");

        delete_budget_endpoint(
            State(state.clone()),
            AuthenticatedUser("alice".to_owned()),
            Json(DeleteBudgetForm { id: budget_id }),
        )
        .await
        .expect("could not delete budget");

        let connection = state.db_connection.lock().unwrap();
        let count: i64 = connection
            .query_row("SELECT COUNT(*) FROM budget", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn rejects_delete_of_missing_budget() {
        let state = get_test_state();

        let result = delete_budget_endpoint(
            State(state),
            AuthenticatedUser("alice".to_owned()),
            Json(DeleteBudgetForm { id: 999 }),
        )
        .await;

        assert_eq!(result.unwrap_err(), Error::DeleteMissingBudget);
    }

    #[tokio::test]
    async fn rejects_delete_of_other_users_budget() {
        let state = get_test_state();
        let budget_id = create_test_budget(&state, "alice");

        let result = delete_budget_endpoint(
            State(state),
            AuthenticatedUser("bob".to_owned()),
            Json(DeleteBudgetForm { id: budget_id }),
        )
        .await;

        assert_eq!(result.unwrap_err(), Error::DeleteMissingBudget);
    }

    #[tokio::test]
    async fn deleting_budget_clears_transaction_links() {
        let state = get_test_state();
        let budget_id = create_test_budget(&state, "alice");

        {
            let connection = state.db_connection.lock().unwrap();
            connection
                .execute(
                    "INSERT INTO account (user_id, name, kind) VALUES ('alice', 'Checking', 'bank')",
                    (),
                )
                .unwrap();
            connection
                .execute(
                    "INSERT INTO \"transaction\" (user_id, account_id, budget_id, kind, amount, date)
                     VALUES ('alice', 1, ?1, 'expense', 10.0, '2024-06-15')",
                    [budget_id],
                )
                .unwrap();
        }

        delete_budget_endpoint(
            State(state.clone()),
            AuthenticatedUser("alice".to_owned()),
            Json(DeleteBudgetForm { id: budget_id }),
        )
        .await
        .expect("could not delete budget");

        let connection = state.db_connection.lock().unwrap();
        let budget_link: Option<i64> = connection
            .query_row("SELECT budget_id FROM \"transaction\"", [], |row| row.get(0))
            .unwrap();
        assert_eq!(budget_link, None);
    }
}
