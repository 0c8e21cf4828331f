//! Per-user preferences: display currency, language, and budget alert rules.
//!
//! Settings rows are created lazily with defaults the first time a user
//! reads or writes them, so there is no separate sign-up step to seed them.

use axum::{Json, extract::State};
use rusqlite::{Connection, params, types::Type};
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    auth::{AuthenticatedUser, UserId},
    database_id::DatabaseId,
};

/// How often a budget alert's spending window resets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertPeriod {
    /// The window is the current day.
    Daily,
    /// The window is the last seven days.
    Weekly,
    /// The window is the current calendar month.
    Monthly,
    /// The window is the current calendar year.
    Yearly,
}

/// A rule that flags spending in a category once it passes a limit within a
/// period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetAlert {
    /// The category the rule watches.
    pub category: String,
    /// The spending limit that triggers the alert.
    pub limit: f64,
    /// How often the spending window resets.
    pub period: AlertPeriod,
}

/// A user's preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSettings {
    /// The ID for the settings row.
    pub id: DatabaseId,
    /// The ID of the user the settings belong to.
    pub user_id: UserId,
    /// The ISO 4217 code of the user's display currency.
    pub currency: String,
    /// The ISO 639-1 code of the user's language.
    pub language: String,
    /// The user's budget alert rules.
    pub budget_alerts: Vec<BudgetAlert>,
}

pub fn create_user_settings_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user_settings (
            id INTEGER PRIMARY KEY,
            user_id TEXT NOT NULL UNIQUE,
            currency TEXT NOT NULL DEFAULT 'USD',
            language TEXT NOT NULL DEFAULT 'en',
            budget_alerts TEXT NOT NULL DEFAULT '[]'
        )",
        (),
    )?;

    Ok(())
}

fn map_row_to_user_settings(row: &rusqlite::Row) -> Result<UserSettings, rusqlite::Error> {
    let raw_alerts: String = row.get(4)?;
    let budget_alerts = serde_json::from_str(&raw_alerts).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(error))
    })?;

    Ok(UserSettings {
        id: row.get(0)?,
        user_id: row.get(1)?,
        currency: row.get(2)?,
        language: row.get(3)?,
        budget_alerts,
    })
}

/// The user's settings, creating them with defaults on first access.
pub fn get_or_create_settings(
    connection: &Connection,
    user_id: &str,
) -> Result<UserSettings, Error> {
    let existing = connection
        .prepare(
            "SELECT id, user_id, currency, language, budget_alerts
             FROM user_settings WHERE user_id = ?1",
        )?
        .query_row([user_id], map_row_to_user_settings);

    match existing {
        Ok(settings) => Ok(settings),
        Err(rusqlite::Error::QueryReturnedNoRows) => {
            let settings = connection
                .prepare(
                    "INSERT INTO user_settings (user_id)
                     VALUES (?1)
                     RETURNING id, user_id, currency, language, budget_alerts",
                )?
                .query_row([user_id], map_row_to_user_settings)?;

            Ok(settings)
        }
        Err(error) => Err(error.into()),
    }
}

/// A route handler for reading the caller's settings.
pub async fn get_user_settings_endpoint(
    State(state): State<AppState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
) -> Result<Json<UserSettings>, Error> {
    let connection = state.db_connection.lock().map_err(|_| Error::DatabaseLock)?;

    let settings = get_or_create_settings(&connection, &user_id)?;

    Ok(Json(settings))
}

/// The data for updating settings. Omitted fields keep their stored values.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserSettingsForm {
    /// The ISO 4217 code of the user's display currency.
    #[serde(default)]
    pub currency: Option<String>,
    /// The ISO 639-1 code of the user's language.
    #[serde(default)]
    pub language: Option<String>,
    /// The user's budget alert rules.
    #[serde(default)]
    pub budget_alerts: Option<Vec<BudgetAlert>>,
}

/// A route handler for updating the caller's settings.
///
/// Works like an upsert: users who never touched their settings before get
/// the defaults with the given fields applied on top.
pub async fn update_user_settings_endpoint(
    State(state): State<AppState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Json(form): Json<UpdateUserSettingsForm>,
) -> Result<Json<UserSettings>, Error> {
    let connection = state.db_connection.lock().map_err(|_| Error::DatabaseLock)?;

    let current = get_or_create_settings(&connection, &user_id)?;

    let currency = form.currency.unwrap_or(current.currency);
    let language = form.language.unwrap_or(current.language);
    let budget_alerts = form.budget_alerts.unwrap_or(current.budget_alerts);
    let encoded_alerts = serde_json::to_string(&budget_alerts)
        .map_err(|error| Error::JsonSerialization(error.to_string()))?;

    let settings = connection
        .prepare(
            "UPDATE user_settings SET currency = ?1, language = ?2, budget_alerts = ?3
             WHERE user_id = ?4
             RETURNING id, user_id, currency, language, budget_alerts",
        )?
        .query_row(
            params![currency, language, encoded_alerts, user_id],
            map_row_to_user_settings,
        )?;

    Ok(Json(settings))
}
