//! Budgets cap spending over a date range. Each budget accumulates the
//! expenses recorded against it in `current_amount`, which the transaction
//! endpoints keep in sync.

mod core;
mod create_endpoint;
mod delete_endpoint;
mod list_endpoint;
mod update_endpoint;

pub use core::{
    Budget, BudgetId, BudgetPeriod, count_active_budgets, create_budget_table, map_row_to_budget,
};
pub use create_endpoint::{CreateBudgetForm, create_budget, create_budget_endpoint};
pub use delete_endpoint::delete_budget_endpoint;
pub use list_endpoint::get_budgets_endpoint;
pub use update_endpoint::update_budget_endpoint;
