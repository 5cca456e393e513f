pub mod types;

pub use types::*;

use std::collections::HashMap;

use chrono::{DateTime, TimeZone};

use crate::date_util::{month_index, MONTH_LABELS};
use crate::models::{PlanDefinition, SubscriberRecord};
use crate::period::{compute_period_membership, PeriodSelector};

/// Summarize subscribers whose subscription started within `period` of `now`.
///
/// Per-plan counts, totals, ARPU and the monthly series are all computed
/// over the period-filtered subscribers only. Month buckets are read in
/// `now`'s time zone.
pub fn aggregate<Tz: TimeZone>(
    subscribers: &[SubscriberRecord],
    plans: &[PlanDefinition],
    period: PeriodSelector,
    now: &DateTime<Tz>,
) -> AggregationResult {
    let filtered: Vec<&SubscriberRecord> = subscribers
        .iter()
        .filter(|s| compute_period_membership(s.subscription_start.as_ref(), period, now))
        .collect();
    log::debug!(
        "{} of {} subscribers fall in the {period} period",
        filtered.len(),
        subscribers.len()
    );
    summarize(&filtered, plans, &now.timezone())
}

/// Summarize every subscriber with no period filter.
///
/// Subscribers without a start date still count toward plan totals and the
/// ARPU denominator; they are only left out of the monthly series.
pub fn aggregate_all_time<Tz: TimeZone>(
    subscribers: &[SubscriberRecord],
    plans: &[PlanDefinition],
    tz: &Tz,
) -> AggregationResult {
    let all: Vec<&SubscriberRecord> = subscribers.iter().collect();
    summarize(&all, plans, tz)
}

fn summarize<Tz: TimeZone>(
    counted: &[&SubscriberRecord],
    plans: &[PlanDefinition],
    tz: &Tz,
) -> AggregationResult {
    let prices = price_lookup(plans);

    let mut counts: HashMap<&str, u64> = HashMap::new();
    for s in counted {
        if let Some(name) = s.plan_name() {
            *counts.entry(name).or_default() += 1;
        }
    }

    let per_plan: Vec<PlanRevenue> = plans
        .iter()
        .map(|p| {
            let subscriber_count = counts.get(p.name.as_str()).copied().unwrap_or(0);
            PlanRevenue {
                plan_name: p.name.clone(),
                subscriber_count,
                revenue: subscriber_count as f64 * p.price,
            }
        })
        .collect();

    let total_subscriptions: u64 = per_plan.iter().map(|p| p.subscriber_count).sum();
    let total_revenue: f64 = per_plan.iter().map(|p| p.revenue).sum();
    let average_revenue_per_user = if counted.is_empty() {
        0.0
    } else {
        total_revenue / counted.len() as f64
    };

    let mut by_month = [0.0_f64; 12];
    for s in counted {
        let (Some(start), Some(price)) = (
            s.subscription_start.as_ref(),
            s.plan_name().and_then(|name| prices.get(name)),
        ) else {
            continue;
        };
        by_month[month_index(start.with_timezone(tz).date_naive())] += *price;
    }

    let monthly_series = MONTH_LABELS
        .into_iter()
        .zip(by_month)
        .map(|(label, value)| MonthlyRevenue { label, value })
        .collect();

    AggregationResult {
        per_plan,
        total_subscriptions,
        total_revenue,
        average_revenue_per_user,
        monthly_series,
        counted_subscribers: counted.len() as u64,
    }
}

/// Price by plan name. The first plan wins when names repeat.
fn price_lookup(plans: &[PlanDefinition]) -> HashMap<&str, f64> {
    let mut prices = HashMap::with_capacity(plans.len());
    for p in plans {
        if prices.contains_key(p.name.as_str()) {
            log::warn!("Duplicate plan name '{}'; using the first definition's price", p.name);
            continue;
        }
        prices.insert(p.name.as_str(), p.price);
    }
    prices
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Utc, Weekday};

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    fn sub(id: &str, plan: Option<&str>, start: Option<DateTime<Utc>>) -> SubscriberRecord {
        SubscriberRecord {
            id: id.to_string(),
            subscribed_package: plan.map(|p| p.to_string()),
            subscription_start: start,
            ..Default::default()
        }
    }

    fn basic_pro() -> Vec<PlanDefinition> {
        vec![PlanDefinition::new("Basic", 10.0), PlanDefinition::new("Pro", 20.0)]
    }

    fn value_of(result: &AggregationResult, label: &str) -> f64 {
        result
            .monthly_series
            .iter()
            .find(|m| m.label == label)
            .map(|m| m.value)
            .unwrap()
    }

    #[test]
    fn test_end_to_end_yearly() {
        let subscribers = vec![
            sub("a", Some("Basic"), Some(at(2024, 1, 10))),
            sub("b", Some("Pro"), Some(at(2024, 1, 20))),
            sub("c", Some("Pro"), Some(at(2024, 2, 5))),
        ];
        let r = aggregate(&subscribers, &basic_pro(), PeriodSelector::Yearly, &at(2024, 6, 1));

        assert_eq!(
            r.per_plan,
            vec![
                PlanRevenue { plan_name: "Basic".into(), subscriber_count: 1, revenue: 10.0 },
                PlanRevenue { plan_name: "Pro".into(), subscriber_count: 2, revenue: 40.0 },
            ]
        );
        assert_eq!(r.total_revenue, 50.0);
        assert_eq!(r.total_subscriptions, 3);
        assert_eq!(r.average_revenue_per_user, 50.0 / 3.0);
        assert_eq!(value_of(&r, "Jan"), 30.0);
        assert_eq!(value_of(&r, "Feb"), 20.0);
        let rest: f64 = r.monthly_series[2..].iter().map(|m| m.value).sum();
        assert_eq!(rest, 0.0);
    }

    #[test]
    fn test_monthly_series_shape_on_empty_input() {
        let r = aggregate(&[], &[], PeriodSelector::Monthly, &at(2024, 3, 15));
        let labels: Vec<&str> = r.monthly_series.iter().map(|m| m.label).collect();
        assert_eq!(
            labels,
            ["Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec"]
        );
        assert!(r.monthly_series.iter().all(|m| m.value == 0.0));
        assert!(r.per_plan.is_empty());
        assert_eq!(r.total_subscriptions, 0);
        assert_eq!(r.total_revenue, 0.0);
        assert_eq!(r.average_revenue_per_user, 0.0);
    }

    #[test]
    fn test_plans_without_subscribers_still_listed() {
        let plans = vec![
            PlanDefinition::new("Basic", 10.0),
            PlanDefinition::new("Professional", 25.0),
            PlanDefinition::new("Enterprise", 99.0),
        ];
        let r = aggregate(&[], &plans, PeriodSelector::Yearly, &at(2024, 3, 15));
        let names: Vec<&str> = r.per_plan.iter().map(|p| p.plan_name.as_str()).collect();
        assert_eq!(names, ["Basic", "Professional", "Enterprise"]);
        assert!(r.per_plan.iter().all(|p| p.subscriber_count == 0 && p.revenue == 0.0));
    }

    #[test]
    fn test_zero_division_guard() {
        let subscribers = vec![sub("a", Some("Basic"), Some(at(2023, 1, 1)))];
        let r = aggregate(&subscribers, &basic_pro(), PeriodSelector::Yearly, &at(2024, 3, 15));
        assert_eq!(r.counted_subscribers, 0);
        assert_eq!(r.average_revenue_per_user, 0.0);
    }

    #[test]
    fn test_monthly_period_boundary() {
        let subscribers = vec![
            sub("in", Some("Basic"), Some(at(2024, 3, 1))),
            sub("out", Some("Basic"), Some(at(2024, 2, 28))),
        ];
        let r = aggregate(&subscribers, &basic_pro(), PeriodSelector::Monthly, &at(2024, 3, 15));
        assert_eq!(r.per_plan[0].subscriber_count, 1);
        assert_eq!(value_of(&r, "Mar"), 10.0);
        assert_eq!(value_of(&r, "Feb"), 0.0);
    }

    #[test]
    fn test_weekly_period_boundary() {
        let now = at(2024, 3, 13);
        assert_eq!(now.weekday(), Weekday::Wed);
        let subscribers = vec![
            sub("sunday", Some("Pro"), Some(at(2024, 3, 10))),
            sub("prev-saturday", Some("Pro"), Some(at(2024, 3, 9))),
        ];
        let r = aggregate(&subscribers, &basic_pro(), PeriodSelector::Weekly, &now);
        assert_eq!(r.per_plan[1].subscriber_count, 1);
        assert_eq!(r.total_revenue, 20.0);
    }

    #[test]
    fn test_unmatched_plan_counts_only_in_denominator() {
        let subscribers = vec![
            sub("a", Some("Basic"), Some(at(2024, 4, 2))),
            sub("ghost", Some("Nonexistent"), Some(at(2024, 4, 3))),
        ];
        let r = aggregate(&subscribers, &basic_pro(), PeriodSelector::Monthly, &at(2024, 4, 20));
        assert_eq!(r.total_subscriptions, 1);
        assert_eq!(r.total_revenue, 10.0);
        assert_eq!(r.counted_subscribers, 2);
        assert_eq!(r.average_revenue_per_user, 5.0);
        assert_eq!(value_of(&r, "Apr"), 10.0);
    }

    #[test]
    fn test_plan_match_is_case_sensitive() {
        let subscribers = vec![sub("a", Some("basic"), Some(at(2024, 4, 2)))];
        let r = aggregate(&subscribers, &basic_pro(), PeriodSelector::Yearly, &at(2024, 4, 20));
        assert_eq!(r.per_plan[0].subscriber_count, 0);
        assert_eq!(r.counted_subscribers, 1);
    }

    #[test]
    fn test_missing_start_excluded_from_period() {
        let subscribers = vec![sub("a", Some("Basic"), None)];
        for p in PeriodSelector::ALL {
            let r = aggregate(&subscribers, &basic_pro(), p, &at(2024, 4, 20));
            assert_eq!(r.counted_subscribers, 0);
            assert_eq!(r.total_subscriptions, 0);
        }
    }

    #[test]
    fn test_revenue_is_count_times_price() {
        let plans = vec![PlanDefinition::new("Lite", 0.1), PlanDefinition::new("Max", 33.33)];
        let subscribers: Vec<SubscriberRecord> = (0..7)
            .map(|i| {
                let plan = if i % 2 == 0 { "Lite" } else { "Max" };
                sub(&format!("s{i}"), Some(plan), Some(at(2024, 5, 1 + i)))
            })
            .collect();
        let r = aggregate(&subscribers, &plans, PeriodSelector::Quarterly, &at(2024, 5, 30));
        for (entry, plan) in r.per_plan.iter().zip(&plans) {
            assert_eq!(entry.revenue, entry.subscriber_count as f64 * plan.price);
        }
        assert_eq!(r.total_subscriptions, r.per_plan.iter().map(|p| p.subscriber_count).sum::<u64>());
        assert_eq!(r.total_revenue, r.per_plan.iter().map(|p| p.revenue).sum::<f64>());
    }

    #[test]
    fn test_monthly_series_ignores_year() {
        // Yearly filter keeps only 2024, but all-time groups by month across years
        let subscribers = vec![
            sub("a", Some("Basic"), Some(at(2023, 3, 5))),
            sub("b", Some("Basic"), Some(at(2024, 3, 6))),
        ];
        let all = aggregate_all_time(&subscribers, &basic_pro(), &Utc);
        assert_eq!(value_of(&all, "Mar"), 20.0);

        let yearly = aggregate(&subscribers, &basic_pro(), PeriodSelector::Yearly, &at(2024, 6, 1));
        assert_eq!(value_of(&yearly, "Mar"), 10.0);
    }

    #[test]
    fn test_all_time_counts_subscribers_without_start() {
        let subscribers = vec![
            sub("a", Some("Pro"), None),
            sub("b", Some("Pro"), Some(at(2022, 11, 1))),
            sub("c", None, None),
        ];
        let r = aggregate_all_time(&subscribers, &basic_pro(), &Utc);
        assert_eq!(r.per_plan[1].subscriber_count, 2);
        assert_eq!(r.total_revenue, 40.0);
        assert_eq!(r.counted_subscribers, 3);
        assert_eq!(r.average_revenue_per_user, 40.0 / 3.0);
        assert_eq!(value_of(&r, "Nov"), 20.0);
        let series_total: f64 = r.monthly_series.iter().map(|m| m.value).sum();
        assert_eq!(series_total, 20.0);
    }

    #[test]
    fn test_duplicate_plan_names_use_first_price_in_series() {
        let plans = vec![PlanDefinition::new("Pro", 20.0), PlanDefinition::new("Pro", 30.0)];
        let subscribers = vec![sub("a", Some("Pro"), Some(at(2024, 1, 3)))];
        let r = aggregate(&subscribers, &plans, PeriodSelector::Yearly, &at(2024, 2, 1));
        assert_eq!(r.per_plan.len(), 2);
        assert_eq!(r.per_plan[0].revenue, 20.0);
        assert_eq!(r.per_plan[1].revenue, 30.0);
        assert_eq!(value_of(&r, "Jan"), 20.0);
    }

    #[test]
    fn test_serializes_camel_case() {
        let r = aggregate(&[], &basic_pro(), PeriodSelector::Monthly, &at(2024, 1, 1));
        let json = serde_json::to_value(&r).unwrap();
        assert!(json.get("perPlan").is_some());
        assert!(json.get("averageRevenuePerUser").is_some());
        assert_eq!(json["perPlan"][0]["planName"], "Basic");
        assert_eq!(json["monthlySeries"].as_array().unwrap().len(), 12);
    }
}
