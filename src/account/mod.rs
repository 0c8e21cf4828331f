//! Accounts hold money and are the target of transactions.

mod core;
mod create_endpoint;
mod delete_endpoint;
mod list_endpoint;
mod update_endpoint;

pub use core::{
    Account, AccountId, AccountKind, account_exists, count_accounts, create_account_table,
    get_total_account_balance, map_row_to_account,
};
pub use create_endpoint::{CreateAccountForm, create_account, create_account_endpoint};
pub use delete_endpoint::delete_account_endpoint;
pub use list_endpoint::get_accounts_endpoint;
pub use update_endpoint::update_account_endpoint;
