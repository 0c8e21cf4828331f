//! Defines the endpoint for creating a new account.

use axum::{Json, extract::State, http::StatusCode};
use rusqlite::{Connection, params};
use serde::Deserialize;

use crate::{
    AppState, Error,
    account::{Account, AccountKind, map_row_to_account},
    auth::AuthenticatedUser,
};

/// The data for creating an account.
#[derive(Debug, Deserialize)]
pub struct CreateAccountForm {
    /// The display name of the account.
    pub name: String,
    /// What kind of money store the account is.
    #[serde(rename = "type")]
    pub kind: AccountKind,
    /// The currency code, defaults to USD.
    #[serde(default)]
    pub currency: Option<String>,
    /// The opening balance, defaults to zero.
    #[serde(default)]
    pub balance: Option<f64>,
    /// Whether this is the user's default account.
    #[serde(default)]
    pub is_default: Option<bool>,
}

/// A route handler for creating a new account.
pub async fn create_account_endpoint(
    State(state): State<AppState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Json(form): Json<CreateAccountForm>,
) -> Result<(StatusCode, Json<Account>), Error> {
    let connection = state.db_connection.lock().map_err(|_| Error::DatabaseLock)?;

    let account = create_account(&connection, &user_id, &form)?;

    Ok((StatusCode::CREATED, Json(account)))
}

pub fn create_account(
    connection: &Connection,
    user_id: &str,
    form: &CreateAccountForm,
) -> Result<Account, Error> {
    let account = connection
        .prepare(
            "INSERT INTO account (user_id, name, kind, currency, balance, is_default)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING id, user_id, name, kind, currency, balance, is_default",
        )?
        .query_row(
            params![
                user_id,
                form.name,
                form.kind,
                form.currency.as_deref().unwrap_or("USD"),
                form.balance.unwrap_or(0.0),
                form.is_default.unwrap_or(false),
            ],
            map_row_to_account,
        )?;

    Ok(account)
}

#[cfg(test)]
mod tests {
    use axum::{Json, extract::State, http::StatusCode};
    use rusqlite::Connection;

    use crate::{
        AppState,
        account::{AccountKind, core::Account},
        auth::AuthenticatedUser,
    };

    use super::{CreateAccountForm, create_account_endpoint};

    fn get_test_state() -> AppState {
        let connection =
            Connection::open_in_memory().expect("Could not open database in memory");
        AppState::new(connection, "42").expect("Could not create app state")
    }

    #[tokio::test]
    async fn creates_account_with_defaults() {
        let state = get_test_state();
        let form = CreateAccountForm {
            name: "Checking".to_owned(),
            kind: AccountKind::Bank,
            currency: None,
            balance: None,
            is_default: None,
        };

        let (status, Json(account)) = create_account_endpoint(
            State(state),
            AuthenticatedUser("alice".to_owned()),
            Json(form),
        )
        .await
        .expect("could not create account");

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(
            account,
            Account {
                id: 1,
                user_id: "alice".to_owned(),
                name: "Checking".to_owned(),
                kind: AccountKind::Bank,
                currency: "USD".to_owned(),
                balance: 0.0,
                is_default: false,
            }
        );
    }

    #[tokio::test]
    async fn creates_account_with_opening_balance() {
        let state = get_test_state();
        let form = CreateAccountForm {
            name: "Wallet".to_owned(),
            kind: AccountKind::Cash,
            currency: Some("NZD".to_owned()),
            balance: Some(123.45),
            is_default: Some(true),
        };

        let (_, Json(account)) = create_account_endpoint(
            State(state),
            AuthenticatedUser("alice".to_owned()),
            Json(form),
        )
        .await
        .expect("could not create account");

        assert_eq!(account.currency, "NZD");
        assert_eq!(account.balance, 123.45);
        assert!(account.is_default);
    }
}
