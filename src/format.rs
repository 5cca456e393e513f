use serde::Serialize;

use crate::revenue::AggregationResult;

/// Share of subscribers and revenue held by one plan, in percent.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanShare {
    pub plan_name: String,
    pub subscriber_pct: f64,
    pub revenue_pct: f64,
}

/// Render an amount with two decimals, e.g. `$12.50`.
///
/// Zero and negative amounts render as `0.00`, as on the dashboard cards.
pub fn format_currency(amount: f64, symbol: &str) -> String {
    if amount > 0.0 {
        format!("{symbol}{amount:.2}")
    } else {
        format!("{symbol}0.00")
    }
}

/// Percentage helper; zero when the whole is zero.
pub fn percent(part: f64, whole: f64) -> f64 {
    if whole == 0.0 {
        0.0
    } else {
        part / whole * 100.0
    }
}

/// Per-plan shares of the totals, in `per_plan` order.
pub fn plan_shares(result: &AggregationResult) -> Vec<PlanShare> {
    result
        .per_plan
        .iter()
        .map(|p| PlanShare {
            plan_name: p.plan_name.clone(),
            subscriber_pct: percent(p.subscriber_count as f64, result.total_subscriptions as f64),
            revenue_pct: percent(p.revenue, result.total_revenue),
        })
        .collect()
}

/// False when the monthly chart would be entirely empty.
pub fn has_revenue(result: &AggregationResult) -> bool {
    result.monthly_series.iter().any(|m| m.value != 0.0)
}
