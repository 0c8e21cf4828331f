use rusqlite::{
    Connection, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Error, account::AccountId, auth::UserId, database_id::DatabaseId};

/// The ID type for budgets.
pub type BudgetId = DatabaseId;

/// How often a budget resets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetPeriod {
    /// Resets every week.
    Weekly,
    /// Resets every month.
    Monthly,
    /// Resets every year.
    Yearly,
}

impl BudgetPeriod {
    /// The string stored in the database for this period.
    pub fn as_str(self) -> &'static str {
        match self {
            BudgetPeriod::Weekly => "weekly",
            BudgetPeriod::Monthly => "monthly",
            BudgetPeriod::Yearly => "yearly",
        }
    }
}

impl ToSql for BudgetPeriod {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for BudgetPeriod {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "weekly" => Ok(BudgetPeriod::Weekly),
            "monthly" => Ok(BudgetPeriod::Monthly),
            "yearly" => Ok(BudgetPeriod::Yearly),
            _ => Err(FromSqlError::InvalidType),
        }
    }
}

/// A spending cap over a date range.
///
/// `current_amount` is the running total of expenses recorded against the
/// budget. It starts at zero and is maintained by the transaction endpoints,
/// so deleting or editing a transaction adjusts it too.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    /// The ID for the budget.
    pub id: BudgetId,
    /// The ID of the user that owns the budget.
    pub user_id: UserId,
    /// The display name of the budget.
    pub name: String,
    /// The spending cap.
    pub amount: f64,
    /// The expenses accumulated against the budget so far.
    pub current_amount: f64,
    /// How often the budget resets.
    pub period: BudgetPeriod,
    /// The first day the budget covers.
    pub start_date: Date,
    /// The last day the budget covers.
    pub end_date: Date,
    /// An optional account the budget is restricted to.
    pub account_id: Option<AccountId>,
}

pub fn create_budget_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS budget (
            id INTEGER PRIMARY KEY,
            user_id TEXT NOT NULL,
            name TEXT NOT NULL,
            amount REAL NOT NULL,
            current_amount REAL NOT NULL DEFAULT 0,
            period TEXT NOT NULL CHECK (period IN ('weekly', 'monthly', 'yearly')),
            start_date TEXT NOT NULL,
            end_date TEXT NOT NULL,
            account_id INTEGER REFERENCES account(id)
        )",
        (),
    )?;

    Ok(())
}

pub fn map_row_to_budget(row: &rusqlite::Row) -> Result<Budget, rusqlite::Error> {
    Ok(Budget {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        amount: row.get(3)?,
        current_amount: row.get(4)?,
        period: row.get(5)?,
        start_date: row.get(6)?,
        end_date: row.get(7)?,
        account_id: row.get(8)?,
    })
}

/// The number of budgets whose date range includes `today`.
///
/// Dates are stored as ISO-8601 text so string comparison orders them
/// correctly.
pub fn count_active_budgets(
    connection: &Connection,
    user_id: &str,
    today: Date,
) -> Result<i64, Error> {
    let count = connection
        .prepare(
            "SELECT COUNT(*) FROM budget
             WHERE user_id = ?1 AND start_date <= ?2 AND end_date >= ?2",
        )?
        .query_row((user_id, today), |row| row.get(0))?;

    Ok(count)
}

#[cfg(test)]
mod create_table_tests {
    use rusqlite::Connection;

    use crate::account::create_account_table;

    use super::create_budget_table;

    #[test]
    fn sql_is_valid() {
        let connection =
            Connection::open_in_memory().expect("Could not initialise in-memory SQLite database");
        create_account_table(&connection).expect("Could not create account table");

        assert_eq!(Ok(()), create_budget_table(&connection));
    }
}
