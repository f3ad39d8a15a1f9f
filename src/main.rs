//! Home Loan Planner CLI
//!
//! Reads a saved planner scenario (JSON), optionally appends events from CSV
//! files, and prints the amortization schedule and summary.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};

use home_loan_planner::loan::{loader, month::format_month, validate, ScenarioFile};
use home_loan_planner::{ScheduleConfig, ScheduleEngine, ScheduleResult};

#[derive(Debug, Parser)]
#[command(name = "loan-planner", version, about = "Project a home loan repayment schedule")]
struct Args {
    /// Scenario JSON with loanDetails, expenses and event lists
    scenario: PathBuf,

    /// Extra rate changes (CSV: Date,NewRate,Adjustment)
    #[arg(long)]
    rate_changes: Option<PathBuf>,

    /// Extra part payments (CSV: Date,Amount,Recurring)
    #[arg(long)]
    part_payments: Option<PathBuf>,

    /// Extra disbursements (CSV: Date,Amount,ManualPreEmi)
    #[arg(long)]
    disbursements: Option<PathBuf>,

    /// Write the full schedule to this CSV file
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Print schedule and summary as JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Rows to print to the console
    #[arg(long, default_value_t = 24)]
    rows: usize,

    /// Balance below which the loan counts as repaid
    #[arg(long, default_value_t = 1.0)]
    tolerance: f64,

    /// Run even if the inputs fail business validation
    #[arg(long)]
    skip_validation: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut scenario = loader::load_scenario(&args.scenario)
        .with_context(|| format!("loading scenario {}", args.scenario.display()))?;
    append_csv_events(&mut scenario, &args)?;

    if !args.skip_validation {
        validate(&scenario.loan_details, &scenario.events).context("scenario failed validation")?;
    }

    let engine = ScheduleEngine::new(ScheduleConfig {
        balance_tolerance: args.tolerance,
        ..ScheduleConfig::default()
    });
    let terms = scenario.loan_details.terms();
    let result = engine.generate(&terms, &scenario.events);

    if let Some(path) = &args.output {
        write_schedule_csv(path, &result)
            .with_context(|| format!("writing schedule to {}", path.display()))?;
    }

    if args.json {
        let report = serde_json::json!({
            "summary": result.summary(),
            "hitSafetyBound": result.hit_safety_bound,
            "schedule": result.entries,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_report(&scenario, &result, args.rows);
    if let Some(path) = &args.output {
        println!("\nFull schedule written to: {}", path.display());
    }
    Ok(())
}

fn append_csv_events(scenario: &mut ScenarioFile, args: &Args) -> Result<()> {
    if let Some(path) = &args.rate_changes {
        let changes = loader::load_rate_changes(path)
            .with_context(|| format!("loading rate changes from {}", path.display()))?;
        scenario.events.rate_changes.extend(changes);
    }
    if let Some(path) = &args.part_payments {
        let payments = loader::load_part_payments(path)
            .with_context(|| format!("loading part payments from {}", path.display()))?;
        scenario.events.part_payments.extend(payments);
    }
    if let Some(path) = &args.disbursements {
        let tranches = loader::load_disbursements(path)
            .with_context(|| format!("loading disbursements from {}", path.display()))?;
        scenario.events.disbursements.extend(tranches);
    }
    Ok(())
}

fn write_schedule_csv(path: &Path, result: &ScheduleResult) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for entry in &result.entries {
        writer.serialize(entry)?;
    }
    writer.flush()?;
    Ok(())
}

fn print_report(scenario: &ScenarioFile, result: &ScheduleResult, rows: usize) {
    let details = &scenario.loan_details;
    let terms = details.terms();

    println!("Home Loan Planner v{}", env!("CARGO_PKG_VERSION"));
    println!("=======================\n");
    println!("Loan:");
    println!("  Principal:  {:.2}", terms.principal);
    println!("  Rate:       {:.3}%", terms.annual_rate);
    println!("  Tenure:     {} months", terms.tenure_months);
    println!("  Start:      {}", format_month(terms.start_date));
    println!(
        "  Events:     {} rate changes, {} part payments, {} disbursements",
        scenario.events.rate_changes.len(),
        scenario.events.part_payments.len(),
        scenario.events.disbursements.len()
    );
    println!();

    if result.is_empty() {
        println!("No schedule: principal and tenure must both be positive.");
        return;
    }

    println!(
        "{:>5} {:>8} {:>12} {:>12} {:>12} {:>12} {:>12} {:>14} {:>7}  Flags",
        "Month", "Date", "Payment", "Principal", "Interest", "PartPay", "Disbursed", "Balance", "Rate"
    );
    println!("{}", "-".repeat(112));

    for entry in result.entries.iter().take(rows) {
        let mut flags = Vec::new();
        if entry.is_pre_emi {
            flags.push("pre-EMI");
        }
        if entry.is_rate_change {
            flags.push("rate");
        }
        if entry.has_part_payment {
            flags.push("prepay");
        }
        if entry.has_disbursement {
            flags.push("tranche");
        }
        println!(
            "{:>5} {:>8} {:>12.2} {:>12.2} {:>12.2} {:>12.2} {:>12.2} {:>14.2} {:>7.3}  {}",
            entry.month,
            format_month(entry.date),
            entry.payment,
            entry.principal,
            entry.interest,
            entry.part_payment,
            entry.disbursement,
            entry.balance,
            entry.rate,
            flags.join(","),
        );
    }

    if result.len() > rows {
        println!("... ({} more months)", result.len() - rows);
    }

    let summary = result.summary();
    println!("\nSummary:");
    println!("  Total Interest:      {:.2}", summary.total_interest);
    println!("  Total Principal:     {:.2}", summary.total_principal);
    println!("  Total Part Payments: {:.2}", summary.total_part_payments);
    println!("  Total Payable:       {:.2}", summary.total_payable);
    println!("  Actual Tenure:       {} months", summary.actual_tenure_months);
    if let Some(date) = result.completion_date() {
        println!("  Loan Completion:     {}", format_month(date));
    }

    let expenses = &scenario.expenses;
    if let Some(installment) = result.first_installment() {
        println!("  Monthly EMI:         {:.2}", installment);
        let monthly_cost = expenses.total_monthly_cost(installment);
        if monthly_cost > installment {
            println!("  Total Monthly Cost:  {:.2}", monthly_cost);
        }
    }
    let initial_costs = expenses.initial_costs(details);
    if initial_costs > 0.0 {
        println!("  Initial Costs:       {:.2}", initial_costs);
    }

    if result.hit_safety_bound {
        println!(
            "\nWARNING: schedule stopped at its safety cap with {:.2} outstanding; \
             the installment does not cover interest.",
            result.final_balance()
        );
    }

    println!("\nYearly Breakdown:");
    println!("{:>6} {:>6} {:>14} {:>14} {:>14} {:>14}", "Year", "Months", "Principal", "Interest", "PartPay", "Balance");
    for year in result.yearly_breakdown() {
        println!(
            "{:>6} {:>6} {:>14.2} {:>14.2} {:>14.2} {:>14.2}",
            year.year, year.months, year.principal, year.interest, year.part_payments, year.closing_balance
        );
    }
}
