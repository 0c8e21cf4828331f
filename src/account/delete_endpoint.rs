//! Defines the endpoint for deleting an account.

use axum::{Json, extract::State};
use rusqlite::{Connection, params};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{AppState, Error, account::AccountId, auth::AuthenticatedUser};

/// Identifies the account to delete.
#[derive(Debug, Deserialize)]
pub struct DeleteAccountForm {
    /// The ID of the account to delete.
    pub id: AccountId,
}

/// A route handler for deleting an account identified by the ID in the
/// request body.
///
/// Returns 404 if the account does not exist or belongs to another user, and
/// 400 if transactions or budgets still reference the account.
pub async fn delete_account_endpoint(
    State(state): State<AppState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Json(form): Json<DeleteAccountForm>,
) -> Result<Json<Value>, Error> {
    let connection = state.db_connection.lock().map_err(|_| Error::DatabaseLock)?;

    delete_account(&connection, &user_id, form.id)?;

    Ok(Json(json!({ "message": "Account deleted successfully" })))
}

fn delete_account(
    connection: &Connection,
    user_id: &str,
    account_id: AccountId,
) -> Result<(), Error> {
    let rows_deleted = connection
        .execute(
            "DELETE FROM account WHERE id = ?1 AND user_id = ?2",
            params![account_id, user_id],
        )
        .map_err(|error| match error {
            // Code 787 occurs when a FOREIGN KEY constraint failed: the
            // account still has transactions or budgets attached.
            rusqlite::Error::SqliteFailure(error, Some(_)) if error.extended_code == 787 => {
                Error::AccountInUse
            }
            error => error.into(),
        })?;

    if rows_deleted == 0 {
        return Err(Error::DeleteMissingAccount);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use axum::{Json, extract::State};
    use rusqlite::Connection;

    use crate::{
        AppState, Error,
        account::{AccountKind, CreateAccountForm, create_account},
        auth::AuthenticatedUser,
    };

    use super::{DeleteAccountForm, delete_account_endpoint};

    fn get_test_state() -> AppState {
        let connection =
            Connection::open_in_memory().expect("Could not open database in memory");
        AppState::new(connection, "42").expect("Could not create app state")
    }

    fn create_test_account(state: &AppState, user_id: &str) -> i64 {
        let connection = state.db_connection.lock().unwrap();
        create_account(
            &connection,
            user_id,
            &CreateAccountForm {
                name: "Checking".to_owned(),
                kind: AccountKind::Bank,
                currency: None,
                balance: None,
                is_default: None,
            },
        )
        .unwrap()
        .id
    }

    #[tokio::test]
    async fn deletes_own_account() {
        let state = get_test_state();
        let account_id = create_test_account(&state, "alice");

        delete_account_endpoint(
            State(state.clone()),
            AuthenticatedUser("alice".to_owned()),
            Json(DeleteAccountForm { id: account_id }),
        )
        .await
        .expect("could not delete account");

        let connection = state.db_connection.lock().unwrap();
        let count: i64 = connection
            .query_row("SELECT COUNT(*) FROM account", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn rejects_delete_of_missing_account() {
        let state = get_test_state();

        let result = delete_account_endpoint(
            State(state),
            AuthenticatedUser("alice".to_owned()),
            Json(DeleteAccountForm { id: 999 }),
        )
        .await;

        assert_eq!(result.unwrap_err(), Error::DeleteMissingAccount);
    }

    #[tokio::test]
    async fn rejects_delete_of_other_users_account() {
        let state = get_test_state();
        let account_id = create_test_account(&state, "alice");

        let result = delete_account_endpoint(
            State(state),
            AuthenticatedUser("bob".to_owned()),
            Json(DeleteAccountForm { id: account_id }),
        )
        .await;

        assert_eq!(result.unwrap_err(), Error::DeleteMissingAccount);
    }

    #[tokio::test]
    async fn rejects_delete_of_account_with_transactions() {
        let state = get_test_state();
        let account_id = create_test_account(&state, "alice");

        {
            let connection = state.db_connection.lock().unwrap();
            connection
                .execute(
                    "INSERT INTO \"transaction\" (user_id, account_id, kind, amount, date)
                     VALUES ('alice', ?1, 'expense', 10.0, '2024-01-01')",
                    [account_id],
                )
                .unwrap();
        }

        let result = delete_account_endpoint(
            State(state),
            AuthenticatedUser("alice".to_owned()),
            Json(DeleteAccountForm { id: account_id }),
        )
        .await;

        assert_eq!(result.unwrap_err(), Error::AccountInUse);
    }
}
