pub mod config;
pub mod date_util;
pub mod error;
pub mod format;
pub mod models;
pub mod period;
pub mod revenue;

pub use config::Config;
pub use error::{Error, Result};
pub use format::{format_currency, has_revenue, plan_shares, PlanShare};
pub use models::{load_plans, load_subscribers, PlanDefinition, SubscriberRecord};
pub use period::{compute_period_membership, PeriodSelector};
pub use revenue::{aggregate, aggregate_all_time, AggregationResult, MonthlyRevenue, PlanRevenue};
