//! Defines the endpoint for listing transactions with optional filters.

use axum::{
    Json,
    extract::{Query, State},
};
use rusqlite::{Connection, params_from_iter, types::Value};
use serde::Deserialize;
use time::Date;

use crate::{
    AppState, Error,
    account::AccountId,
    auth::AuthenticatedUser,
    budget::BudgetId,
    pagination::{PageQuery, PaginationConfig},
    transaction::{Transaction, TransactionKind, map_row_to_transaction},
};

use super::core::TRANSACTION_COLUMNS;

/// The filters for the transaction list. All filters are optional and
/// combine with AND.
#[derive(Debug, Default, Deserialize)]
pub struct TransactionQuery {
    /// Keep only transactions of this kind.
    #[serde(rename = "type")]
    pub kind: Option<TransactionKind>,
    /// Keep only transactions in this category.
    pub category: Option<String>,
    /// Keep only transactions in this sub-category.
    pub sub_category: Option<String>,
    /// Keep only transactions on this account.
    pub account_id: Option<AccountId>,
    /// Keep only transactions counting against this budget.
    pub budget_id: Option<BudgetId>,
    /// Keep only transactions dated on or after this day.
    pub start_date: Option<Date>,
    /// Keep only transactions dated on or before this day.
    pub end_date: Option<Date>,
    /// The one-based page number.
    pub page: Option<u64>,
    /// The number of rows per page.
    pub page_size: Option<u64>,
}

/// A route handler for listing the caller's transactions, newest first.
pub async fn get_transactions_endpoint(
    State(state): State<AppState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Query(query): Query<TransactionQuery>,
) -> Result<Json<Vec<Transaction>>, Error> {
    let connection = state.db_connection.lock().map_err(|_| Error::DatabaseLock)?;

    let transactions =
        get_transactions(&connection, &user_id, &query, &state.pagination_config)?;

    Ok(Json(transactions))
}

fn get_transactions(
    connection: &Connection,
    user_id: &str,
    query: &TransactionQuery,
    pagination_config: &PaginationConfig,
) -> Result<Vec<Transaction>, Error> {
    let mut clauses = vec!["user_id = ?".to_owned()];
    let mut parameters = vec![Value::Text(user_id.to_owned())];

    if let Some(kind) = query.kind {
        clauses.push("kind = ?".to_owned());
        parameters.push(Value::Text(kind.as_str().to_owned()));
    }

    if let Some(category) = &query.category {
        clauses.push("category_name = ?".to_owned());
        parameters.push(Value::Text(category.clone()));
    }

    if let Some(sub_category) = &query.sub_category {
        clauses.push("sub_category = ?".to_owned());
        parameters.push(Value::Text(sub_category.clone()));
    }

    if let Some(account_id) = query.account_id {
        clauses.push("account_id = ?".to_owned());
        parameters.push(Value::Integer(account_id));
    }

    if let Some(budget_id) = query.budget_id {
        clauses.push("budget_id = ?".to_owned());
        parameters.push(Value::Integer(budget_id));
    }

    if let Some(start_date) = query.start_date {
        clauses.push("date >= ?".to_owned());
        parameters.push(Value::Text(start_date.to_string()));
    }

    if let Some(end_date) = query.end_date {
        clauses.push("date <= ?".to_owned());
        parameters.push(Value::Text(end_date.to_string()));
    }

    let page_query = PageQuery {
        page: query.page,
        page_size: query.page_size,
    };
    let (limit, offset) = page_query.limit_offset(pagination_config);
    parameters.push(Value::Integer(limit.min(i64::MAX as u64) as i64));
    parameters.push(Value::Integer(offset.min(i64::MAX as u64) as i64));

    let sql = format!(
        "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\"
         WHERE {}
         ORDER BY date DESC, id DESC
         LIMIT ? OFFSET ?",
        clauses.join(" AND ")
    );

    let transactions = connection
        .prepare(&sql)?
        .query_map(params_from_iter(parameters), map_row_to_transaction)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(transactions)
}

#[cfg(test)]
mod tests {
    use axum::{
        Json,
        extract::{Query, State},
    };
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{AppState, auth::AuthenticatedUser, transaction::TransactionKind};

    use super::{TransactionQuery, get_transactions_endpoint};

    fn get_test_state() -> AppState {
        let connection =
            Connection::open_in_memory().expect("Could not open database in memory");
        let state = AppState::new(connection, "42").expect("Could not create app state");
        {
            let conn = state.db_connection.lock().unwrap();
            conn.execute(
                "INSERT INTO account (user_id, name, kind) VALUES ('alice', 'Checking', 'bank')",
                (),
            )
            .unwrap();
        }
        state
    }

    fn insert_transaction(
        state: &AppState,
        kind: &str,
        amount: f64,
        category: &str,
        date: &str,
    ) {
        let conn = state.db_connection.lock().unwrap();
        conn.execute(
            "INSERT INTO \"transaction\" (user_id, account_id, kind, amount, category_name, date)
             VALUES ('alice', 1, ?1, ?2, ?3, ?4)",
            (kind, amount, category, date),
        )
        .unwrap();
    }

    #[tokio::test]
    async fn lists_newest_first() {
        let state = get_test_state();
        insert_transaction(&state, "expense", 10.0, "Food", "2024-06-01");
        insert_transaction(&state, "expense", 20.0, "Food", "2024-06-03");
        insert_transaction(&state, "expense", 30.0, "Food", "2024-06-02");

        let Json(transactions) = get_transactions_endpoint(
            State(state),
            AuthenticatedUser("alice".to_owned()),
            Query(TransactionQuery::default()),
        )
        .await
        .expect("could not list transactions");

        let dates: Vec<_> = transactions
            .iter()
            .map(|transaction| transaction.date)
            .collect();
        assert_eq!(
            dates,
            vec![date!(2024 - 06 - 03), date!(2024 - 06 - 02), date!(2024 - 06 - 01)]
        );
    }

    #[tokio::test]
    async fn filters_combine_with_and() {
        let state = get_test_state();
        insert_transaction(&state, "expense", 10.0, "Food", "2024-06-01");
        insert_transaction(&state, "expense", 20.0, "Transport", "2024-06-02");
        insert_transaction(&state, "income", 500.0, "Food", "2024-06-03");

        let Json(transactions) = get_transactions_endpoint(
            State(state),
            AuthenticatedUser("alice".to_owned()),
            Query(TransactionQuery {
                kind: Some(TransactionKind::Expense),
                category: Some("Food".to_owned()),
                ..TransactionQuery::default()
            }),
        )
        .await
        .expect("could not list transactions");

        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].amount, 10.0);
    }

    #[tokio::test]
    async fn date_range_is_inclusive() {
        let state = get_test_state();
        insert_transaction(&state, "expense", 10.0, "Food", "2024-06-01");
        insert_transaction(&state, "expense", 20.0, "Food", "2024-06-15");
        insert_transaction(&state, "expense", 30.0, "Food", "2024-06-30");
        insert_transaction(&state, "expense", 40.0, "Food", "2024-07-01");

        let Json(transactions) = get_transactions_endpoint(
            State(state),
            AuthenticatedUser("alice".to_owned()),
            Query(TransactionQuery {
                start_date: Some(date!(2024 - 06 - 01)),
                end_date: Some(date!(2024 - 06 - 30)),
                ..TransactionQuery::default()
            }),
        )
        .await
        .expect("could not list transactions");

        assert_eq!(transactions.len(), 3);
    }

    #[tokio::test]
    async fn absurd_page_number_returns_empty_page() {
        let state = get_test_state();
        insert_transaction(&state, "expense", 10.0, "Food", "2024-06-01");

        let Json(transactions) = get_transactions_endpoint(
            State(state),
            AuthenticatedUser("alice".to_owned()),
            Query(TransactionQuery {
                page: Some(u64::MAX),
                page_size: Some(100),
                ..TransactionQuery::default()
            }),
        )
        .await
        .expect("could not list transactions");

        assert!(transactions.is_empty());
    }

    #[tokio::test]
    async fn pages_do_not_overlap() {
        let state = get_test_state();
        for day in 1..=5 {
            insert_transaction(&state, "expense", day as f64, "Food", &format!("2024-06-0{day}"));
        }

        let Json(first_page) = get_transactions_endpoint(
            State(state.clone()),
            AuthenticatedUser("alice".to_owned()),
            Query(TransactionQuery {
                page: Some(1),
                page_size: Some(2),
                ..TransactionQuery::default()
            }),
        )
        .await
        .unwrap();
        let Json(second_page) = get_transactions_endpoint(
            State(state),
            AuthenticatedUser("alice".to_owned()),
            Query(TransactionQuery {
                page: Some(2),
                page_size: Some(2),
                ..TransactionQuery::default()
            }),
        )
        .await
        .unwrap();

        assert_eq!(first_page.len(), 2);
        assert_eq!(second_page.len(), 2);
        assert!(
            first_page
                .iter()
                .all(|transaction| second_page.iter().all(|other| other.id != transaction.id))
        );
    }
}
