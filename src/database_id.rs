//! The ID type for rows in the application's database.

/// Alias for the integer type used for database row IDs.
pub type DatabaseId = i64;
