//! Revenue Reconciliation
//!
//! Partitions window revenue into machine-attributed vs. prepaid-credit
//! revenue. No classification filter applies here: every windowed record's net
//! revenue lands in exactly one partition, which is what lets the breakdown
//! explain the gap between per-machine table totals and whole-period revenue.

use crate::models::{DateWindow, RevenueBreakdown, Transaction};
use crate::normalizer::round2;

pub fn reconcile(records: &[Transaction], window: &DateWindow) -> RevenueBreakdown {
    let mut machine_revenue = 0.0;
    let mut credit_top_up_revenue = 0.0;

    for record in records.iter().filter(|r| r.in_window(window)) {
        if record.is_top_up() {
            credit_top_up_revenue += record.net_paid;
        } else {
            machine_revenue += record.net_paid;
        }
    }

    let machine_revenue = round2(machine_revenue);
    let credit_top_up_revenue = round2(credit_top_up_revenue);

    RevenueBreakdown {
        machine_revenue,
        credit_top_up_revenue,
        total_revenue: round2(machine_revenue + credit_top_up_revenue),
    }
}
