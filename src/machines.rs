//! Machine Performance Attributor
//!
//! Per-physical-machine use counts and proportionally split revenue. A
//! transaction naming N machines attributes `net / N` to each named token;
//! repeated tokens accumulate. Upstream classification should already have
//! excluded credit top-ups, but the top-up name filter is applied again here.
//!
//! Splits are computed in integer cents, with leftover cents going to the
//! earliest tokens in the machine list, so the per-machine figures for one
//! transaction always sum exactly to its net amount.

use crate::models::{DateWindow, MachinePerformance, Transaction};
use crate::normalizer::round2;
use std::collections::HashMap;

const TOP_UP_MARKER: &str = "recarga";

/// Compute per-machine performance for one window, sorted by use count
/// descending.
pub fn attribute(records: &[Transaction], window: &DateWindow) -> Vec<MachinePerformance> {
    let mut totals: HashMap<String, (u32, i64)> = HashMap::new();

    for record in records
        .iter()
        .filter(|r| r.in_window(window) && !r.is_top_up())
    {
        let tokens: Vec<&str> = record
            .machine_list
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty() && !t.to_lowercase().contains(TOP_UP_MARKER))
            .collect();

        if tokens.is_empty() {
            continue;
        }

        let net_cents = (record.net_paid * 100.0).round() as i64;
        let share = tokens.len() as i64;
        let base_cents = net_cents.div_euclid(share);
        let leftover_cents = net_cents.rem_euclid(share);

        for (position, token) in tokens.iter().enumerate() {
            let cents = base_cents + i64::from((position as i64) < leftover_cents);
            let entry = totals.entry(token.to_string()).or_insert((0, 0));
            entry.0 += 1;
            entry.1 += cents;
        }
    }

    let mut performance: Vec<MachinePerformance> = totals
        .into_iter()
        .map(|(machine, (use_count, cents))| {
            let revenue = cents as f64 / 100.0;
            MachinePerformance {
                machine,
                use_count,
                attributed_revenue: revenue,
                avg_revenue_per_use: if use_count == 0 {
                    0.0
                } else {
                    round2(revenue / use_count as f64)
                },
            }
        })
        .collect();

    performance.sort_by(|a, b| {
        b.use_count
            .cmp(&a.use_count)
            .then_with(|| a.machine.cmp(&b.machine))
    });

    performance
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::models::{RawSaleRow, WindowKind};
    use crate::normalizer::RecordNormalizer;
    use crate::windows::resolve;
    use chrono::NaiveDate;

    fn window() -> DateWindow {
        let reference = NaiveDate::from_ymd_opt(2025, 6, 18)
            .unwrap()
            .and_hms_opt(15, 30, 0)
            .unwrap();
        resolve(
            WindowKind::CurrentWeek,
            reference,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        )
    }

    fn record(machines: &str, amount: &str) -> Transaction {
        RecordNormalizer::new(Config::default().cashback)
            .normalize_row(&RawSaleRow {
                date_time: "16/06/2025 10:00:00".to_string(),
                gross_value: amount.to_string(),
                paid_value: amount.to_string(),
                machines: machines.to_string(),
                payment_method: "Pix".to_string(),
                customer_doc: "12345678901".to_string(),
                ..Default::default()
            })
            .expect("valid test record")
    }

    #[test]
    fn test_single_machine_attribution() {
        let records = vec![record("Lavadora 1", "17,90")];
        let performance = attribute(&records, &window());

        assert_eq!(performance.len(), 1);
        assert_eq!(performance[0].machine, "Lavadora 1");
        assert_eq!(performance[0].use_count, 1);
        assert!((performance[0].attributed_revenue - 17.90).abs() < 0.01);
    }

    #[test]
    fn test_revenue_split_equally_across_machines() {
        let records = vec![record("Lavadora 1, Secadora 2", "20,00")];
        let performance = attribute(&records, &window());

        assert_eq!(performance.len(), 2);
        for entry in &performance {
            assert_eq!(entry.attributed_revenue, 10.00);
            assert_eq!(entry.avg_revenue_per_use, 10.00);
        }
    }

    #[test]
    fn test_attributed_revenue_sums_to_net() {
        let records = vec![record("Lavadora 1, Lavadora 2, Secadora 1", "17,90")];
        let performance = attribute(&records, &window());

        let total: f64 = performance.iter().map(|p| p.attributed_revenue).sum();
        assert!((total - 17.90).abs() < 0.005);
    }

    #[test]
    fn test_uneven_split_gives_leftover_cents_to_earliest_tokens() {
        // 17.90 across three machines: 5.96 base, two leftover cents
        let records = vec![record("Lavadora 1, Lavadora 2, Secadora 1", "17,90")];
        let performance = attribute(&records, &window());

        assert_eq!(performance[0].machine, "Lavadora 1");
        assert_eq!(performance[0].attributed_revenue, 5.97);
        assert_eq!(performance[1].machine, "Lavadora 2");
        assert_eq!(performance[1].attributed_revenue, 5.97);
        assert_eq!(performance[2].machine, "Secadora 1");
        assert_eq!(performance[2].attributed_revenue, 5.96);
    }

    #[test]
    fn test_repeated_tokens_accumulate() {
        let records = vec![
            record("Lavadora 1", "17,90"),
            record("Lavadora 1, Secadora 1", "20,00"),
        ];
        let performance = attribute(&records, &window());

        assert_eq!(performance[0].machine, "Lavadora 1");
        assert_eq!(performance[0].use_count, 2);
        assert!((performance[0].attributed_revenue - 27.90).abs() < 0.01);
        assert!((performance[0].avg_revenue_per_use - 13.95).abs() < 0.01);
    }

    #[test]
    fn test_sorted_by_use_count_desc() {
        let records = vec![
            record("Secadora 1", "17,90"),
            record("Secadora 1", "17,90"),
            record("Lavadora 1", "17,90"),
        ];
        let performance = attribute(&records, &window());

        assert_eq!(performance[0].machine, "Secadora 1");
        assert_eq!(performance[0].use_count, 2);
        assert_eq!(performance[1].machine, "Lavadora 1");
    }

    #[test]
    fn test_top_up_tokens_never_attributed() {
        let records = vec![record("Recarga", "50,00")];
        assert!(attribute(&records, &window()).is_empty());
    }

    #[test]
    fn test_empty_dataset_yields_empty_list() {
        assert!(attribute(&[], &window()).is_empty());
    }
}
