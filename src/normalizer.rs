//! Record Normalizer
//!
//! Turns raw POS export rows into canonical [`Transaction`] records. All
//! locale-sensitive parsing lives here: Brazilian `DD/MM/YYYY HH:MM:SS`
//! timestamps, comma-decimal monetary values, CPF documents, and the
//! comma-separated machine-list strings.
//!
//! Rows that cannot be normalized (unparseable date, missing customer
//! document) are dropped silently and counted; batch processing never fails on
//! a bad row. Duplicate rows within one snapshot are detected by a fingerprint
//! over the raw identifying fields and dropped as well.

use crate::config::CashbackConfig;
use crate::models::{IngestSummary, MachineCounts, RawSaleRow, Transaction, TransactionKind};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};
use tracing::debug;

/// Machine-list token marking a wallet top-up sale.
const TOP_UP_MARKER: &str = "recarga";
/// Machine-list token identifying a washer.
const WASHER_MARKER: &str = "lavadora";
/// Machine-list token identifying a dryer.
const DRYER_MARKER: &str = "secadora";
/// Payment-method value for purchases funded from wallet balance.
const WALLET_PAYMENT_MARKER: &str = "saldo da carteira";

/// Round to 2 decimal places (cents).
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Round to 1 decimal place (percentages).
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Parse a Brazilian-formatted monetary string.
///
/// Both separators present: periods are thousands separators, comma is the
/// decimal mark ("1.234,56" -> 1234.56). Comma only: decimal mark
/// ("17,90" -> 17.90). Otherwise parsed directly. Empty parses to 0;
/// unparseable non-empty input yields `None`.
pub fn parse_br_number(value: &str) -> Option<f64> {
    let s = value.trim();
    if s.is_empty() {
        return Some(0.0);
    }

    if s.contains('.') && s.contains(',') {
        s.replace('.', "").replace(',', ".").parse().ok()
    } else if s.contains(',') {
        s.replace(',', ".").parse().ok()
    } else {
        s.parse().ok()
    }
}

/// Parse a Brazilian `DD/MM/YYYY HH:MM:SS` (or date-only, or 2-digit-year)
/// string into a business-local timestamp.
pub fn parse_br_datetime(value: &str) -> Option<NaiveDateTime> {
    let s = value.trim();
    if s.is_empty() {
        return None;
    }

    let (date_part, time_part) = match s.split_once(' ') {
        Some((d, t)) => (d, t.trim()),
        None => (s, "00:00:00"),
    };

    let mut parts = date_part.split('/');
    let day: u32 = parts.next()?.parse().ok()?;
    let month: u32 = parts.next()?.parse().ok()?;
    let year_raw = parts.next()?;
    if parts.next().is_some() {
        return None;
    }
    let year: i32 = match year_raw.len() {
        2 => 2000 + year_raw.parse::<i32>().ok()?,
        _ => year_raw.parse().ok()?,
    };

    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    let time = NaiveTime::parse_from_str(time_part, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(time_part, "%H:%M"))
        .ok()?;

    Some(date.and_time(time))
}

/// Normalize a customer document (CPF) to an 11-digit string.
/// Strips non-digits, left-pads short values, keeps the last 11 if longer.
/// Returns `None` when no digits remain.
pub fn normalize_cpf(doc: &str) -> Option<String> {
    let digits: String = doc.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }

    if digits.len() < 11 {
        Some(format!("{:0>11}", digits))
    } else {
        Some(digits[digits.len() - 11..].to_string())
    }
}

/// Count washers and dryers named in a machine-list string.
pub fn count_machines(machine_str: &str) -> MachineCounts {
    let lowered = machine_str.to_lowercase();
    let mut counts = MachineCounts::default();
    for token in lowered.split(',') {
        if token.contains(WASHER_MARKER) {
            counts.wash += 1;
        } else if token.contains(DRYER_MARKER) {
            counts.dry += 1;
        }
    }
    counts
}

/// Classify a transaction from its machine list, payment method, and gross amount.
pub fn classify(machine_str: &str, payment_method: &str, gross: f64) -> TransactionKind {
    let machines = machine_str.to_lowercase();
    let payment = payment_method.to_lowercase();
    let has_machines = !machines.trim().is_empty();
    let is_top_up = machines.contains(TOP_UP_MARKER);

    if is_top_up {
        return TransactionKind::CreditTopUp;
    }

    if payment.contains(WALLET_PAYMENT_MARKER) || (gross == 0.0 && has_machines) {
        return TransactionKind::CreditFundedUse;
    }

    if has_machines && gross > 0.0 {
        return TransactionKind::MachineUse;
    }

    TransactionKind::Unknown
}

/// Fingerprint over the raw identifying fields, used to drop duplicate rows
/// within one snapshot.
pub fn row_fingerprint(row: &RawSaleRow) -> u64 {
    let mut hasher = DefaultHasher::new();
    row.date_time.hash(&mut hasher);
    row.customer_doc.hash(&mut hasher);
    row.gross_value.hash(&mut hasher);
    row.machines.hash(&mut hasher);
    hasher.finish()
}

pub struct RecordNormalizer {
    cashback: CashbackConfig,
}

impl RecordNormalizer {
    pub fn new(cashback: CashbackConfig) -> Self {
        Self { cashback }
    }

    /// Normalize one raw row, or `None` when the row must be dropped.
    pub fn normalize_row(&self, row: &RawSaleRow) -> Option<Transaction> {
        let timestamp = parse_br_datetime(&row.date_time)?;
        let customer_doc = normalize_cpf(&row.customer_doc)?;

        let gross = parse_br_number(&row.gross_value)?;
        let net_paid = parse_br_number(&row.paid_value)?;
        let machines = count_machines(&row.machines);
        let kind = classify(&row.machines, &row.payment_method, gross);

        // Cashback is a liability tracked on the record; it is never
        // subtracted from the net amount paid.
        let cashback = if timestamp.date() >= self.cashback.start_date && gross > 0.0 {
            round2(gross * self.cashback.rate)
        } else {
            0.0
        };

        let discount = if gross > net_paid {
            round2(gross - net_paid)
        } else {
            0.0
        };

        let coupon_code = match row.coupon_code.trim() {
            "" => None,
            code if code.eq_ignore_ascii_case("n/d") => None,
            code => Some(code.to_uppercase()),
        };

        Some(Transaction {
            timestamp,
            date: timestamp.date(),
            gross,
            net_paid,
            discount,
            cashback,
            machines,
            machine_list: row.machines.trim().to_string(),
            kind,
            payment_method: row.payment_method.trim().to_string(),
            customer_doc,
            used_coupon: row.used_coupon.trim().eq_ignore_ascii_case("sim"),
            coupon_code,
        })
    }

    /// Normalize a batch of raw rows, dropping bad rows and duplicates.
    pub fn normalize_rows(&self, rows: &[RawSaleRow]) -> (Vec<Transaction>, IngestSummary) {
        let mut summary = IngestSummary {
            total_rows: rows.len(),
            ..Default::default()
        };
        let mut seen = HashSet::with_capacity(rows.len());
        let mut records = Vec::with_capacity(rows.len());

        for row in rows {
            if !seen.insert(row_fingerprint(row)) {
                summary.duplicates += 1;
                continue;
            }

            match self.normalize_row(row) {
                Some(record) => {
                    records.push(record);
                    summary.normalized += 1;
                }
                None => {
                    debug!(date_time = %row.date_time, "Dropping unparseable row");
                    summary.skipped += 1;
                }
            }
        }

        (records, summary)
    }
}
