use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use clap::{Parser, Subcommand};

use ofmbase_revenue::{AggregationResult, Config, PeriodSelector};

#[derive(Parser)]
#[command(name = "ofmbase", about = "Revenue and subscription summaries for ofmbase")]
struct Cli {
    /// Config file path (default: ~/.ofmbase/config.json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Increase logging verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize revenue from exported user and plan listings
    Report {
        /// User listing JSON (`{"users": [...]}` or a bare array)
        #[arg(long, value_name = "FILE")]
        users: PathBuf,
        /// Plan listing JSON (`{"packages": [...]}` or a bare array)
        #[arg(long, value_name = "FILE")]
        plans: PathBuf,
        /// Period: daily, weekly, monthly, quarterly, yearly (default from config)
        #[arg(long)]
        period: Option<String>,
        /// Ignore the period and summarize every subscriber
        #[arg(long, conflicts_with = "period")]
        all_time: bool,
        /// Report as of this date (YYYY-MM-DD) instead of now
        #[arg(long, value_name = "DATE")]
        as_of: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Get a config value
    Get { key: String },
    /// Set a config value
    Set { key: String, value: String },
    /// List all config values
    List,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let config_path = match cli.config {
        Some(path) => path,
        None => Config::default_path()?,
    };
    let config = Config::load_from(&config_path)?;

    match cli.command {
        Commands::Report {
            users,
            plans,
            period,
            all_time,
            as_of,
            json,
        } => {
            let period = match period {
                Some(p) => PeriodSelector::parse(&p)?,
                None => config.default_period,
            };
            let now = resolve_now(as_of.as_deref())?;
            handle_report(&config, &users, &plans, period, all_time, now, json)?;
        }
        Commands::Config { action } => {
            handle_config(config, &config_path, action)?;
        }
    }

    Ok(())
}

/// Noon local time on `as_of`, or the current instant.
fn resolve_now(as_of: Option<&str>) -> anyhow::Result<DateTime<Local>> {
    match as_of {
        Some(s) => Ok(ofmbase_revenue::period::as_of_noon(s, &Local)?),
        None => Ok(Local::now()),
    }
}

fn handle_report(
    config: &Config,
    users_path: &Path,
    plans_path: &Path,
    period: PeriodSelector,
    all_time: bool,
    now: DateTime<Local>,
    json: bool,
) -> anyhow::Result<()> {
    let subscribers = ofmbase_revenue::load_subscribers(users_path)?;
    let plans = ofmbase_revenue::load_plans(plans_path)?;

    let result = if all_time {
        ofmbase_revenue::aggregate_all_time(&subscribers, &plans, &Local)
    } else {
        ofmbase_revenue::aggregate(&subscribers, &plans, period, &now)
    };
    let scope = if all_time { "all time".to_string() } else { period.label().to_string() };

    if json {
        let period_key = (!all_time).then_some(period);
        let out = serde_json::json!({
            "period": period_key,
            "asOf": now.to_rfc3339(),
            "summary": &result,
            "shares": ofmbase_revenue::plan_shares(&result),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("Revenue Report: {scope} (as of {})", now.format("%Y-%m-%d"));
        print_summary(&result, &config.currency_symbol);
        print_plans(&result, &config.currency_symbol);
        print_monthly(&result, &config.currency_symbol);
    }
    Ok(())
}

fn print_summary(r: &AggregationResult, symbol: &str) {
    println!("  Summary:");
    println!("    Total revenue:       {}", ofmbase_revenue::format_currency(r.total_revenue, symbol));
    println!("    Total subscriptions: {}", r.total_subscriptions);
    println!(
        "    Avg revenue/user:    {}",
        ofmbase_revenue::format_currency(r.average_revenue_per_user, symbol)
    );
}

fn print_plans(r: &AggregationResult, symbol: &str) {
    println!("  Revenue by Plan:");
    if r.per_plan.is_empty() {
        println!("    No plans defined");
        return;
    }
    let shares = ofmbase_revenue::plan_shares(r);
    for (p, share) in r.per_plan.iter().zip(&shares) {
        println!(
            "    {:<16} {:>5} subs ({:>5.1}%)  {:>12} ({:>5.1}%)",
            p.plan_name,
            p.subscriber_count,
            share.subscriber_pct,
            ofmbase_revenue::format_currency(p.revenue, symbol),
            share.revenue_pct,
        );
    }
}

fn print_monthly(r: &AggregationResult, symbol: &str) {
    println!("  Revenue Overview:");
    if !ofmbase_revenue::has_revenue(r) {
        println!("    No revenue data available yet");
        return;
    }
    for m in &r.monthly_series {
        println!("    {}  {:>12}", m.label, ofmbase_revenue::format_currency(m.value, symbol));
    }
}

fn handle_config(mut config: Config, path: &Path, action: ConfigAction) -> anyhow::Result<()> {
    match action {
        ConfigAction::Get { key } => {
            println!("{}", config.get(&key)?);
        }
        ConfigAction::Set { key, value } => {
            config.set(&key, &value)?;
            config.save_to(path)?;
            println!("Set {key} = {}", config.get(&key)?);
        }
        ConfigAction::List => {
            for (key, value) in config.entries() {
                println!("{key} = {value}");
            }
        }
    }
    Ok(())
}
