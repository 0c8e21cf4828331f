//! Transactions record money moving in or out of an account.
//!
//! Every write endpoint in this module keeps two derived values in sync
//! inside a single database transaction: the owning account's balance and,
//! when a budget is linked, that budget's `current_amount`. A request either
//! applies the row change and both adjustments, or none of them.

mod core;
mod create_endpoint;
mod delete_endpoint;
mod list_endpoint;
mod update_endpoint;

pub use core::{
    Transaction, TransactionId, TransactionKind, adjust_account_balance,
    adjust_budget_accumulation, count_transactions, create_transaction_table,
    expense_total_for_category_since, get_transaction, map_row_to_transaction,
    sum_amount_between,
};
pub use create_endpoint::{CreateTransactionForm, create_transaction, create_transaction_endpoint};
pub use delete_endpoint::delete_transaction_endpoint;
pub use list_endpoint::get_transactions_endpoint;
pub use update_endpoint::update_transaction_endpoint;
