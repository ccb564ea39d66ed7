//! Dashboard: item totals, the low-stock list, and (for admins) the user count.

#[cfg(test)]
#[path = "dashboard_test.rs"]
mod dashboard_test;

use super::PageContext;
use crate::net::api;
use crate::state::inventory::DashboardSummary;

/// Load the dashboard figures. Never fails: an unreachable or expired
/// session yields an empty summary and the interceptor handles the redirect.
pub async fn load(ctx: &PageContext) -> DashboardSummary {
    let mut summary = match api::list_items(&ctx.api).await {
        Ok(items) => DashboardSummary::from_items(&items),
        Err(error) if error.status() == Some(401) => DashboardSummary::default(),
        Err(error) => {
            tracing::error!(%error, "dashboard items failed to load");
            DashboardSummary::default()
        }
    };

    if ctx.session.is_admin() {
        match api::list_users(&ctx.api).await {
            Ok(users) => summary.total_users = Some(users.len()),
            Err(error) => tracing::warn!(%error, "skipping user count on dashboard"),
        }
    }
    summary
}
