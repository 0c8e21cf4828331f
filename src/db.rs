//! One-time database initialization.
//!
//! Schema lives in each model module's `create_*_table` function; this module
//! only stitches them together. [initialize] is called exactly once per
//! process, from [AppState::new](crate::AppState::new), so table creation is
//! never re-run or conditionally registered at request time.

use rusqlite::Connection;

use crate::{
    account::create_account_table, budget::create_budget_table,
    category::create_category_table, transaction::create_transaction_table,
    user_settings::create_user_settings_table,
};

/// Create the tables for the domain models in the database that `connection`
/// refers to, and enable foreign key enforcement.
///
/// Tables are created in dependency order: transactions and budgets reference
/// accounts.
///
/// # Errors
/// Returns an error if a table could not be created or the pragma could not
/// be set.
pub fn initialize(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.pragma_update(None, "foreign_keys", "ON")?;

    create_account_table(connection)?;
    create_budget_table(connection)?;
    create_category_table(connection)?;
    create_transaction_table(connection)?;
    create_user_settings_table(connection)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use super::initialize;

    #[test]
    fn initialize_creates_all_tables() {
        let connection =
            Connection::open_in_memory().expect("Could not initialise in-memory SQLite database");

        initialize(&connection).expect("Could not initialize database");

        let mut statement = connection
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .unwrap();
        let table_names: Vec<String> = statement
            .query_map([], |row| row.get(0))
            .unwrap()
            .map(|name| name.unwrap())
            .collect();

        for want in ["account", "budget", "category", "transaction", "user_settings"] {
            assert!(
                table_names.iter().any(|name| name == want),
                "missing table {want}, got {table_names:?}"
            );
        }
    }

    #[test]
    fn initialize_is_idempotent() {
        let connection = Connection::open_in_memory().unwrap();

        initialize(&connection).expect("first initialization failed");
        initialize(&connection).expect("repeated initialization failed");
    }
}
