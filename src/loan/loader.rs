//! Load loan scenarios from JSON and dated events from CSV
//!
//! Dates travel as `yyyy-MM` strings and are re-hydrated into first-of-month
//! dates here, before anything reaches the schedule engine.

use csv::Reader;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use super::month::parse_month;
use super::{Disbursement, LoanDetails, LoanEvents, PartPayment, RateAdjustment, RateChange};
use crate::costs::HomeownerExpenses;
use crate::error::{LoanError, Result};

/// Everything the planner persists for one borrower
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioFile {
    pub loan_details: LoanDetails,

    #[serde(default)]
    pub expenses: HomeownerExpenses,

    #[serde(flatten)]
    pub events: LoanEvents,
}

/// Load a scenario from a JSON file
pub fn load_scenario<P: AsRef<Path>>(path: P) -> Result<ScenarioFile> {
    let file = File::open(path)?;
    load_scenario_from_reader(BufReader::new(file))
}

/// Load a scenario from any reader (e.g., string buffer, stdin)
pub fn load_scenario_from_reader<R: Read>(reader: R) -> Result<ScenarioFile> {
    let scenario: ScenarioFile = serde_json::from_reader(reader)?;
    Ok(scenario)
}

/// Write a scenario back out as pretty JSON
pub fn save_scenario<P: AsRef<Path>>(path: P, scenario: &ScenarioFile) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, scenario)?;
    writer.flush()?;
    Ok(())
}

/// Raw CSV row for rate changes: `Date,NewRate,Adjustment`
#[derive(Debug, Deserialize)]
struct RateChangeRow {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "NewRate")]
    new_rate: f64,
    #[serde(rename = "Adjustment", default)]
    adjustment: Option<String>,
}

impl RateChangeRow {
    fn to_rate_change(self) -> Result<RateChange> {
        let adjustment = match self.adjustment.as_deref().map(str::trim) {
            None | Some("") | Some("tenure") => RateAdjustment::PreserveTenure,
            Some("emi") => RateAdjustment::PreserveEmi,
            Some(other) => return Err(LoanError::UnknownAdjustment(other.to_string())),
        };
        Ok(RateChange::new(parse_month(&self.date)?, self.new_rate, adjustment))
    }
}

/// Raw CSV row for part payments: `Date,Amount,Recurring`
#[derive(Debug, Deserialize)]
struct PartPaymentRow {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Amount")]
    amount: f64,
    #[serde(rename = "Recurring", default)]
    recurring: Option<bool>,
}

impl PartPaymentRow {
    fn to_part_payment(self) -> Result<PartPayment> {
        let date = parse_month(&self.date)?;
        Ok(if self.recurring.unwrap_or(false) {
            PartPayment::recurring(date, self.amount)
        } else {
            PartPayment::one_time(date, self.amount)
        })
    }
}

/// Raw CSV row for disbursements: `Date,Amount,ManualPreEmi`
#[derive(Debug, Deserialize)]
struct DisbursementRow {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Amount")]
    amount: f64,
    #[serde(rename = "ManualPreEmi", default)]
    manual_pre_emi: Option<f64>,
}

impl DisbursementRow {
    fn to_disbursement(self) -> Result<Disbursement> {
        let mut disbursement = Disbursement::new(parse_month(&self.date)?, self.amount);
        disbursement.manual_pre_emi = self.manual_pre_emi;
        Ok(disbursement)
    }
}

pub fn load_rate_changes_from_reader<R: Read>(reader: R) -> Result<Vec<RateChange>> {
    let mut csv_reader = Reader::from_reader(reader);
    let mut changes = Vec::new();

    for result in csv_reader.deserialize() {
        let row: RateChangeRow = result?;
        changes.push(row.to_rate_change()?);
    }

    Ok(changes)
}

pub fn load_part_payments_from_reader<R: Read>(reader: R) -> Result<Vec<PartPayment>> {
    let mut csv_reader = Reader::from_reader(reader);
    let mut payments = Vec::new();

    for result in csv_reader.deserialize() {
        let row: PartPaymentRow = result?;
        payments.push(row.to_part_payment()?);
    }

    Ok(payments)
}

pub fn load_disbursements_from_reader<R: Read>(reader: R) -> Result<Vec<Disbursement>> {
    let mut csv_reader = Reader::from_reader(reader);
    let mut disbursements = Vec::new();

    for result in csv_reader.deserialize() {
        let row: DisbursementRow = result?;
        disbursements.push(row.to_disbursement()?);
    }

    Ok(disbursements)
}

pub fn load_rate_changes<P: AsRef<Path>>(path: P) -> Result<Vec<RateChange>> {
    load_rate_changes_from_reader(File::open(path)?)
}

pub fn load_part_payments<P: AsRef<Path>>(path: P) -> Result<Vec<PartPayment>> {
    load_part_payments_from_reader(File::open(path)?)
}

pub fn load_disbursements<P: AsRef<Path>>(path: P) -> Result<Vec<Disbursement>> {
    load_disbursements_from_reader(File::open(path)?)
}
