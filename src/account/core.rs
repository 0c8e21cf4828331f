use rusqlite::{
    Connection, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};

use crate::{Error, auth::UserId, database_id::DatabaseId};

/// The ID type for accounts.
pub type AccountId = DatabaseId;

/// The kind of money store an account represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    /// A bank account.
    Bank,
    /// Physical cash.
    Cash,
    /// A mobile money wallet.
    MobileMoney,
    /// Anything else.
    Other,
}

impl AccountKind {
    /// The string stored in the database for this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            AccountKind::Bank => "bank",
            AccountKind::Cash => "cash",
            AccountKind::MobileMoney => "mobile_money",
            AccountKind::Other => "other",
        }
    }
}

impl ToSql for AccountKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for AccountKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "bank" => Ok(AccountKind::Bank),
            "cash" => Ok(AccountKind::Cash),
            "mobile_money" => Ok(AccountKind::MobileMoney),
            "other" => Ok(AccountKind::Other),
            _ => Err(FromSqlError::InvalidType),
        }
    }
}

/// A place money is kept, e.g. a bank account or a cash box.
///
/// The balance is maintained incrementally by the transaction endpoints: it
/// equals the signed sum of the account's transactions plus the opening
/// balance it was created with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// The ID for the account.
    pub id: AccountId,
    /// The ID of the user that owns the account.
    pub user_id: UserId,
    /// The display name of the account.
    pub name: String,
    /// What kind of money store the account is.
    #[serde(rename = "type")]
    pub kind: AccountKind,
    /// The ISO 4217 code for the account's currency.
    pub currency: String,
    /// The current balance.
    pub balance: f64,
    /// Whether this is the user's default account.
    pub is_default: bool,
}

pub fn create_account_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS account (
            id INTEGER PRIMARY KEY,
            user_id TEXT NOT NULL,
            name TEXT NOT NULL,
            kind TEXT NOT NULL CHECK (kind IN ('bank', 'cash', 'mobile_money', 'other')),
            currency TEXT NOT NULL DEFAULT 'USD',
            balance REAL NOT NULL DEFAULT 0,
            is_default INTEGER NOT NULL DEFAULT 0
        )",
        (),
    )?;

    Ok(())
}

pub fn map_row_to_account(row: &rusqlite::Row) -> Result<Account, rusqlite::Error> {
    Ok(Account {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        kind: row.get(3)?,
        currency: row.get(4)?,
        balance: row.get(5)?,
        is_default: row.get(6)?,
    })
}

/// Whether `account_id` refers to an account owned by `user_id`.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub fn account_exists(
    connection: &Connection,
    user_id: &str,
    account_id: AccountId,
) -> Result<bool, Error> {
    let exists = connection
        .prepare("SELECT EXISTS (SELECT 1 FROM account WHERE id = ?1 AND user_id = ?2)")?
        .query_row((account_id, user_id), |row| row.get(0))?;

    Ok(exists)
}

/// The number of accounts owned by `user_id`.
pub fn count_accounts(connection: &Connection, user_id: &str) -> Result<i64, Error> {
    let count = connection
        .prepare("SELECT COUNT(*) FROM account WHERE user_id = ?1")?
        .query_row([user_id], |row| row.get(0))?;

    Ok(count)
}

/// The sum of the balances of the accounts owned by `user_id`. Zero when the
/// user has no accounts.
pub fn get_total_account_balance(connection: &Connection, user_id: &str) -> Result<f64, Error> {
    let total = connection
        .prepare("SELECT TOTAL(balance) FROM account WHERE user_id = ?1")?
        .query_row([user_id], |row| row.get(0))?;

    Ok(total)
}


#[cfg(test)]
mod account_query_tests {
    use rusqlite::Connection;

    use super::{account_exists, count_accounts, create_account_table};

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        create_account_table(&conn).unwrap();
        conn
    }

    fn insert_account(conn: &Connection, user_id: &str, name: &str) -> i64 {
        conn.execute(
            "INSERT INTO account (user_id, name, kind) VALUES (?1, ?2, 'bank')",
            (user_id, name),
        )
        .unwrap();
        conn.last_insert_rowid()
    }

    #[test]
    fn account_exists_is_scoped_to_owner() {
        let conn = get_test_connection();
        let id = insert_account(&conn, "alice", "Checking");

        assert!(account_exists(&conn, "alice", id).unwrap());
        assert!(!account_exists(&conn, "bob", id).unwrap());
        assert!(!account_exists(&conn, "alice", id + 1).unwrap());
    }

    #[test]
    fn count_accounts_only_counts_own_accounts() {
        let conn = get_test_connection();
        insert_account(&conn, "alice", "Checking");
        insert_account(&conn, "alice", "Savings");
        insert_account(&conn, "bob", "Checking");

        assert_eq!(count_accounts(&conn, "alice").unwrap(), 2);
        assert_eq!(count_accounts(&conn, "carol").unwrap(), 0);
    }
}
