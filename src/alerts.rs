//! Budget alert checks, run after an expense is recorded.
//!
//! Alerts only produce log output. They deliberately run outside the write
//! transaction so a broken alert rule can never block or undo a recorded
//! expense.

use rusqlite::Connection;
use time::{Date, Duration};

use crate::{
    Error,
    calendar::month_bounds,
    transaction::expense_total_for_category_since,
    user_settings::{AlertPeriod, get_or_create_settings},
};

/// The first day of the spending window ending at `today`.
fn period_start(period: AlertPeriod, today: Date) -> Date {
    match period {
        AlertPeriod::Daily => today,
        AlertPeriod::Weekly => today.saturating_sub(Duration::days(6)),
        AlertPeriod::Monthly => month_bounds(today.year(), today.month()).0,
        AlertPeriod::Yearly => month_bounds(today.year(), time::Month::January).0,
    }
}

/// Check the user's alert rules for `category_name` and log a warning for
/// each rule whose spending limit has been reached.
pub fn check_budget_alerts(
    connection: &Connection,
    user_id: &str,
    category_name: &str,
    today: Date,
) -> Result<(), Error> {
    let settings = get_or_create_settings(connection, user_id)?;

    for alert in settings
        .budget_alerts
        .iter()
        .filter(|alert| alert.category == category_name)
    {
        let start_date = period_start(alert.period, today);
        let spent =
            expense_total_for_category_since(connection, user_id, category_name, start_date)?;

        if spent >= alert.limit {
            tracing::warn!(
                user_id,
                category = category_name,
                spent,
                limit = alert.limit,
                period = ?alert.period,
                "budget alert limit reached"
            );
        }
    }

    Ok(())
}
