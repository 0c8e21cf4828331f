use rusqlite::{
    Connection, ToSql, params,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error, account::AccountId, auth::UserId, budget::BudgetId, database_id::DatabaseId,
};

/// The ID type for transactions.
pub type TransactionId = DatabaseId;

/// Whether a transaction adds money to an account or takes it out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Money coming in.
    Income,
    /// Money going out.
    Expense,
}

impl TransactionKind {
    /// The string stored in the database for this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }

    /// The signed change a transaction of this kind applies to its account's
    /// balance. Amounts are stored as positive magnitudes.
    pub fn balance_delta(self, amount: f64) -> f64 {
        match self {
            TransactionKind::Income => amount,
            TransactionKind::Expense => -amount,
        }
    }

    /// The signed change a transaction of this kind applies to its budget's
    /// accumulated spending. Income recorded against a budget frees up room.
    pub fn budget_delta(self, amount: f64) -> f64 {
        match self {
            TransactionKind::Income => -amount,
            TransactionKind::Expense => amount,
        }
    }
}

impl ToSql for TransactionKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for TransactionKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            _ => Err(FromSqlError::InvalidType),
        }
    }
}

/// Money moving in or out of an account on a given date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID for the transaction.
    pub id: TransactionId,
    /// The ID of the user that recorded the transaction.
    pub user_id: UserId,
    /// The account the money moved in or out of.
    pub account_id: AccountId,
    /// The budget the transaction counts against, if any.
    pub budget_id: Option<BudgetId>,
    /// Whether the transaction is income or an expense.
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// The amount of money, always positive.
    pub amount: f64,
    /// The category the transaction belongs to.
    pub category_name: Option<String>,
    /// The sub-category within the category.
    pub sub_category: Option<String>,
    /// A free-form note.
    pub description: Option<String>,
    /// The date the transaction occurred.
    pub date: Date,
}

// `transaction` is a SQL keyword so the table name must be quoted.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
            id INTEGER PRIMARY KEY,
            user_id TEXT NOT NULL,
            account_id INTEGER NOT NULL REFERENCES account(id),
            budget_id INTEGER REFERENCES budget(id) ON DELETE SET NULL,
            kind TEXT NOT NULL CHECK (kind IN ('income', 'expense')),
            amount REAL NOT NULL CHECK (amount > 0),
            category_name TEXT,
            sub_category TEXT,
            description TEXT,
            date TEXT NOT NULL
        )",
        (),
    )?;

    Ok(())
}

pub const TRANSACTION_COLUMNS: &str =
    "id, user_id, account_id, budget_id, kind, amount, category_name, sub_category, description, date";

pub fn map_row_to_transaction(row: &rusqlite::Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        user_id: row.get(1)?,
        account_id: row.get(2)?,
        budget_id: row.get(3)?,
        kind: row.get(4)?,
        amount: row.get(5)?,
        category_name: row.get(6)?,
        sub_category: row.get(7)?,
        description: row.get(8)?,
        date: row.get(9)?,
    })
}

/// Look up a transaction by ID, scoped to its owner.
///
/// # Errors
/// Returns [Error::NotFound] if the transaction does not exist or belongs to
/// another user.
pub fn get_transaction(
    connection: &Connection,
    user_id: &str,
    transaction_id: TransactionId,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" WHERE id = ?1 AND user_id = ?2"
        ))?
        .query_row(params![transaction_id, user_id], map_row_to_transaction)?;

    Ok(transaction)
}

/// Apply `delta` to the balance of `account_id`.
///
/// # Errors
/// Returns [Error::InvalidAccount] if the account does not exist or belongs
/// to another user.
pub fn adjust_account_balance(
    connection: &Connection,
    user_id: &str,
    account_id: AccountId,
    delta: f64,
) -> Result<(), Error> {
    let rows_updated = connection.execute(
        "UPDATE account SET balance = balance + ?1 WHERE id = ?2 AND user_id = ?3",
        params![delta, account_id, user_id],
    )?;

    if rows_updated == 0 {
        return Err(Error::InvalidAccount(Some(account_id)));
    }

    Ok(())
}

/// Apply `delta` to the accumulated spending of `budget_id`.
///
/// # Errors
/// Returns [Error::InvalidBudget] if the budget does not exist or belongs to
/// another user.
pub fn adjust_budget_accumulation(
    connection: &Connection,
    user_id: &str,
    budget_id: BudgetId,
    delta: f64,
) -> Result<(), Error> {
    let rows_updated = connection.execute(
        "UPDATE budget SET current_amount = current_amount + ?1 WHERE id = ?2 AND user_id = ?3",
        params![delta, budget_id, user_id],
    )?;

    if rows_updated == 0 {
        return Err(Error::InvalidBudget(Some(budget_id)));
    }

    Ok(())
}

/// The number of transactions recorded by `user_id`, all time.
pub fn count_transactions(connection: &Connection, user_id: &str) -> Result<i64, Error> {
    let count = connection
        .prepare("SELECT COUNT(*) FROM \"transaction\" WHERE user_id = ?1")?
        .query_row([user_id], |row| row.get(0))?;

    Ok(count)
}

/// The sum of the amounts of transactions of `kind` dated within
/// `start_date..=end_date`.
///
/// Returns zero when no transactions match. Dates are stored as ISO-8601
/// text so string comparison orders them correctly.
pub fn sum_amount_between(
    connection: &Connection,
    user_id: &str,
    kind: TransactionKind,
    start_date: Date,
    end_date: Date,
) -> Result<f64, Error> {
    let total = connection
        .prepare(
            "SELECT TOTAL(amount) FROM \"transaction\"
             WHERE user_id = ?1 AND kind = ?2 AND date >= ?3 AND date <= ?4",
        )?
        .query_row(params![user_id, kind, start_date, end_date], |row| {
            row.get(0)
        })?;

    Ok(total)
}

/// The sum of expense amounts in `category_name` dated on or after
/// `start_date`. Used by the budget alert checks.
pub fn expense_total_for_category_since(
    connection: &Connection,
    user_id: &str,
    category_name: &str,
    start_date: Date,
) -> Result<f64, Error> {
    let total = connection
        .prepare(
            "SELECT TOTAL(amount) FROM \"transaction\"
             WHERE user_id = ?1 AND kind = 'expense' AND category_name = ?2 AND date >= ?3",
        )?
        .query_row(params![user_id, category_name, start_date], |row| {
            row.get(0)
        })?;

    Ok(total)
}
