//! Categories label transactions for reporting. Each category carries a list
//! of sub-categories, stored as a JSON column since they are only ever read
//! and written as part of their category.

use axum::{Json, extract::State, http::StatusCode};
use rusqlite::{
    Connection, ToSql, params,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, Type, ValueRef},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::{
    AppState, Error,
    auth::{AuthenticatedUser, UserId},
    database_id::DatabaseId,
};

/// The ID type for categories.
pub type CategoryId = DatabaseId;

/// Whether a category labels income or expenses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryKind {
    /// Labels money coming in.
    Income,
    /// Labels money going out.
    Expense,
}

impl CategoryKind {
    /// The string stored in the database for this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            CategoryKind::Income => "income",
            CategoryKind::Expense => "expense",
        }
    }
}

impl ToSql for CategoryKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for CategoryKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "income" => Ok(CategoryKind::Income),
            "expense" => Ok(CategoryKind::Expense),
            _ => Err(FromSqlError::InvalidType),
        }
    }
}

/// A finer-grained label within a category, with an optional spending
/// guideline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubCategory {
    /// The display name of the sub-category.
    pub name: String,
    /// An optional spending guideline for the sub-category.
    #[serde(default)]
    pub budget: Option<f64>,
}

/// A label for grouping transactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// The ID for the category.
    pub id: CategoryId,
    /// The ID of the user that owns the category.
    pub user_id: UserId,
    /// The display name of the category.
    pub name: String,
    /// Whether the category labels income or expenses.
    #[serde(rename = "type")]
    pub kind: CategoryKind,
    /// The sub-categories within the category.
    pub sub_categories: Vec<SubCategory>,
}

pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            user_id TEXT NOT NULL,
            name TEXT NOT NULL,
            kind TEXT NOT NULL CHECK (kind IN ('income', 'expense')),
            sub_categories TEXT NOT NULL DEFAULT '[]'
        )",
        (),
    )?;

    Ok(())
}

fn map_row_to_category(row: &rusqlite::Row) -> Result<Category, rusqlite::Error> {
    let raw_sub_categories: String = row.get(4)?;
    let sub_categories = serde_json::from_str(&raw_sub_categories).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(error))
    })?;

    Ok(Category {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        kind: row.get(3)?,
        sub_categories,
    })
}

fn encode_sub_categories(sub_categories: &[SubCategory]) -> Result<String, Error> {
    serde_json::to_string(sub_categories)
        .map_err(|error| Error::JsonSerialization(error.to_string()))
}

/// The data for creating a category.
#[derive(Debug, Deserialize)]
pub struct CreateCategoryForm {
    /// The display name of the category.
    pub name: String,
    /// Whether the category labels income or expenses.
    #[serde(rename = "type")]
    pub kind: CategoryKind,
    /// The sub-categories within the category.
    #[serde(default)]
    pub sub_categories: Vec<SubCategory>,
}

/// A route handler for creating a new category.
pub async fn create_category_endpoint(
    State(state): State<AppState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Json(form): Json<CreateCategoryForm>,
) -> Result<(StatusCode, Json<Category>), Error> {
    let connection = state.db_connection.lock().map_err(|_| Error::DatabaseLock)?;

    let category = create_category(&connection, &user_id, &form)?;

    Ok((StatusCode::CREATED, Json(category)))
}

pub fn create_category(
    connection: &Connection,
    user_id: &str,
    form: &CreateCategoryForm,
) -> Result<Category, Error> {
    let sub_categories = encode_sub_categories(&form.sub_categories)?;

    let category = connection
        .prepare(
            "INSERT INTO category (user_id, name, kind, sub_categories)
             VALUES (?1, ?2, ?3, ?4)
             RETURNING id, user_id, name, kind, sub_categories",
        )?
        .query_row(
            params![user_id, form.name, form.kind, sub_categories],
            map_row_to_category,
        )?;

    Ok(category)
}

/// A route handler for listing the caller's categories.
pub async fn get_categories_endpoint(
    State(state): State<AppState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
) -> Result<Json<Vec<Category>>, Error> {
    let connection = state.db_connection.lock().map_err(|_| Error::DatabaseLock)?;

    let categories = connection
        .prepare(
            "SELECT id, user_id, name, kind, sub_categories
             FROM category WHERE user_id = ?1 ORDER BY id",
        )?
        .query_map([user_id], map_row_to_category)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(categories))
}

/// The data for updating a category. The ID identifies the category to
/// update, the remaining fields replace the stored ones.
#[derive(Debug, Deserialize)]
pub struct UpdateCategoryForm {
    /// The ID of the category to update.
    pub id: CategoryId,
    /// The display name of the category.
    pub name: String,
    /// Whether the category labels income or expenses.
    #[serde(rename = "type")]
    pub kind: CategoryKind,
    /// The sub-categories within the category.
    #[serde(default)]
    pub sub_categories: Vec<SubCategory>,
}

/// A route handler for updating a category identified by the ID in the
/// request body.
pub async fn update_category_endpoint(
    State(state): State<AppState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Json(form): Json<UpdateCategoryForm>,
) -> Result<Json<Category>, Error> {
    let connection = state.db_connection.lock().map_err(|_| Error::DatabaseLock)?;

    let sub_categories = encode_sub_categories(&form.sub_categories)?;

    let category = connection
        .prepare(
            "UPDATE category SET name = ?1, kind = ?2, sub_categories = ?3
             WHERE id = ?4 AND user_id = ?5
             RETURNING id, user_id, name, kind, sub_categories",
        )?
        .query_row(
            params![form.name, form.kind, sub_categories, form.id, user_id],
            map_row_to_category,
        )
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::UpdateMissingCategory,
            error => error.into(),
        })?;

    Ok(Json(category))
}

/// Identifies the category to delete.
#[derive(Debug, Deserialize)]
pub struct DeleteCategoryForm {
    /// The ID of the category to delete.
    pub id: CategoryId,
}

/// A route handler for deleting a category identified by the ID in the
/// request body.
///
/// Transactions keep their category label as plain text, so deleting a
/// category does not touch them.
pub async fn delete_category_endpoint(
    State(state): State<AppState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Json(form): Json<DeleteCategoryForm>,
) -> Result<Json<Value>, Error> {
    let connection = state.db_connection.lock().map_err(|_| Error::DatabaseLock)?;

    let rows_deleted = connection.execute(
        "DELETE FROM category WHERE id = ?1 AND user_id = ?2",
        params![form.id, user_id],
    )?;

    if rows_deleted == 0 {
        return Err(Error::DeleteMissingCategory);
    }

    Ok(Json(json!({ "message": "Category deleted successfully" })))
}
