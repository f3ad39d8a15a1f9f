//! Rate shock report for a saved scenario
//!
//! Applies a ladder of rate moves at a chosen month and compares the two bank
//! policies for each, plus the prepayment that would keep the current EMI.
//!
//! Usage: cargo run --bin rate_shock -- scenario.json --at 2027-01 --shocks=-100,50,100,200

use anyhow::{Context, Result};
use clap::Parser;
use rayon::prelude::*;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;

use home_loan_planner::loan::{loader, month::parse_month};
use home_loan_planner::scenario::RateChangeComparison;
use home_loan_planner::{RateAdjustment, RateChange, ScenarioRunner};

#[derive(Debug, Parser)]
#[command(name = "rate_shock", about = "Compare bank policies across a ladder of rate changes")]
struct Args {
    /// Scenario JSON with loanDetails and event lists
    scenario: PathBuf,

    /// Month the new rate takes effect (yyyy-MM)
    #[arg(long)]
    at: String,

    /// Rate moves in basis points
    #[arg(long, value_delimiter = ',', allow_negative_numbers = true, default_values_t = [-50, 50, 100, 200])]
    shocks: Vec<i32>,

    /// Print results as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ShockRow {
    shock_bps: i32,
    new_rate: f64,
    comparison: RateChangeComparison,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let start = Instant::now();

    let scenario = loader::load_scenario(&args.scenario)
        .with_context(|| format!("loading scenario {}", args.scenario.display()))?;
    let effective = parse_month(&args.at).context("parsing --at")?;

    let terms = scenario.loan_details.terms();
    let runner = ScenarioRunner::new(terms, scenario.events.clone());

    let rows: Vec<ShockRow> = args
        .shocks
        .par_iter()
        .map(|&bps| {
            let new_rate = (terms.annual_rate + bps as f64 / 100.0).max(0.0);
            let change = RateChange::new(effective, new_rate, RateAdjustment::PreserveTenure);
            ShockRow {
                shock_bps: bps,
                new_rate,
                comparison: runner.compare_rate_change(change),
            }
        })
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!(
        "Base: {:.2} at {:.3}% over {} months, shock from {}",
        terms.principal, terms.annual_rate, terms.tenure_months, args.at
    );
    println!(
        "{:>6} {:>7} {:>14} {:>12} {:>8} {:>14} {:>12} {:>14}",
        "Bps", "Rate", "AdjEMI Int", "New EMI", "Months", "AdjTenure Int", "EMI Delta", "Prepay Needed"
    );
    println!("{}", "-".repeat(94));

    for row in &rows {
        let c = &row.comparison;
        let (delta, prepay) = c
            .advice
            .map(|a| (a.emi_delta, a.part_payment_to_keep_emi))
            .unwrap_or((0.0, 0.0));
        println!(
            "{:>6} {:>7.3} {:>14.2} {:>12.2} {:>8} {:>14.2} {:>12.2} {:>14.2}",
            row.shock_bps,
            row.new_rate,
            c.preserve_emi.total_interest,
            c.adjusted_installment.unwrap_or(0.0),
            c.preserve_tenure.actual_tenure_months,
            c.preserve_tenure.total_interest,
            delta,
            prepay,
        );
    }

    if let Some(first) = rows.first() {
        println!(
            "\nBase case: {:.2} interest over {} months",
            first.comparison.base.total_interest, first.comparison.base.actual_tenure_months
        );
    }
    println!("Completed {} shocks in {:?}", rows.len(), start.elapsed());
    Ok(())
}
