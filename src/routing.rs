//! Assembles the API routes into the application router.

use axum::{Json, Router, http::StatusCode, routing::get};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::{
    AppState,
    account::{
        create_account_endpoint, delete_account_endpoint, get_accounts_endpoint,
        update_account_endpoint,
    },
    budget::{
        create_budget_endpoint, delete_budget_endpoint, get_budgets_endpoint,
        update_budget_endpoint,
    },
    category::{
        create_category_endpoint, delete_category_endpoint, get_categories_endpoint,
        update_category_endpoint,
    },
    endpoints,
    report::{monthly_report_endpoint, spending_report_endpoint},
    stats::get_stats_endpoint,
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, get_transactions_endpoint,
        update_transaction_endpoint,
    },
    user_settings::{get_user_settings_endpoint, update_user_settings_endpoint},
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(endpoints::COFFEE, get(get_coffee))
        .route(
            endpoints::ACCOUNTS,
            get(get_accounts_endpoint)
                .post(create_account_endpoint)
                .put(update_account_endpoint)
                .delete(delete_account_endpoint),
        )
        .route(
            endpoints::BUDGETS,
            get(get_budgets_endpoint)
                .post(create_budget_endpoint)
                .put(update_budget_endpoint)
                .delete(delete_budget_endpoint),
        )
        .route(
            endpoints::CATEGORIES,
            get(get_categories_endpoint)
                .post(create_category_endpoint)
                .put(update_category_endpoint)
                .delete(delete_category_endpoint),
        )
        .route(
            endpoints::TRANSACTIONS,
            get(get_transactions_endpoint)
                .post(create_transaction_endpoint)
                .put(update_transaction_endpoint)
                .delete(delete_transaction_endpoint),
        )
        .route(
            endpoints::USER_SETTINGS,
            get(get_user_settings_endpoint).put(update_user_settings_endpoint),
        )
        .route(endpoints::SPENDING_REPORT, get(spending_report_endpoint))
        .route(endpoints::MONTHLY_REPORT, get(monthly_report_endpoint))
        .route(endpoints::STATS, get(get_stats_endpoint))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Attempt to brew coffee with a teapot.
async fn get_coffee() -> StatusCode {
    StatusCode::IM_A_TEAPOT
}

async fn not_found() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Not found" })),
    )
}
