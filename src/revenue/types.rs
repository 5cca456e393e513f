use serde::Serialize;

/// Subscriber count and revenue for one plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanRevenue {
    pub plan_name: String,
    pub subscriber_count: u64,
    pub revenue: f64,
}

/// One point of the Jan–Dec revenue chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyRevenue {
    pub label: &'static str,
    pub value: f64,
}

/// Revenue and usage summary over a set of subscribers.
///
/// Amounts are unrounded; formatting to currency precision happens at
/// display time.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationResult {
    /// One entry per input plan, in input order.
    pub per_plan: Vec<PlanRevenue>,
    pub total_subscriptions: u64,
    pub total_revenue: f64,
    /// Zero when no subscriber was counted.
    pub average_revenue_per_user: f64,
    /// Always 12 entries, January first.
    pub monthly_series: Vec<MonthlyRevenue>,
    /// Number of subscribers that passed the period filter.
    pub counted_subscribers: u64,
}
