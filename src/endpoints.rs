//! The API endpoint URIs.

/// The route to request a cup of coffee (experimental).
pub const COFFEE: &str = "/api/coffee";
/// The route to access accounts.
pub const ACCOUNTS: &str = "/api/accounts";
/// The route to access budgets.
pub const BUDGETS: &str = "/api/budgets";
/// The route to access categories.
pub const CATEGORIES: &str = "/api/categories";
/// The route to access transactions.
pub const TRANSACTIONS: &str = "/api/transactions";
/// The route to access the caller's settings.
pub const USER_SETTINGS: &str = "/api/user-settings";
/// The route for the trailing-months spending report.
pub const SPENDING_REPORT: &str = "/api/reports/spending";
/// The route for a single calendar month's summary report.
pub const MONTHLY_REPORT: &str = "/api/reports/monthly";
/// The route for the dashboard statistics.
pub const STATS: &str = "/api/stats";
