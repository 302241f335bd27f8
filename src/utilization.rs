//! Utilization Calculator
//!
//! Combines normalized records, a resolved window, and the capacity model into
//! weighted utilization percentages per machine class, with peak and off-peak
//! sub-splits.
//!
//! Active days come from the window's calendar span, not from the distinct
//! dates observed in the data. The temporal pattern aggregators deliberately
//! use the opposite basis; the two are not unified.

use crate::config::CapacityConfig;
use crate::models::{
    ClassUtilization, DateWindow, PeriodUtilization, Transaction, UtilizationMetric,
};
use crate::normalizer::round1;

pub struct UtilizationCalculator<'a> {
    capacity: &'a CapacityConfig,
}

impl<'a> UtilizationCalculator<'a> {
    pub fn new(capacity: &'a CapacityConfig) -> Self {
        Self { capacity }
    }

    /// Compute the full utilization report for one window.
    ///
    /// Credit top-ups never count as services. Percentages may exceed 100;
    /// clamping is a display-layer concern.
    pub fn calculate(&self, records: &[Transaction], window: &DateWindow) -> UtilizationMetric {
        let in_window: Vec<&Transaction> = records
            .iter()
            .filter(|r| r.in_window(window) && !r.is_top_up())
            .collect();

        let active_days = window.active_days();

        let overall = self.period(
            &in_window,
            active_days,
            self.capacity.operating_hours_per_day(),
            |_| true,
        );
        let peak = self.period(
            &in_window,
            active_days,
            self.capacity.peak_hours_per_day(),
            |h| self.capacity.is_peak_hour(h),
        );
        let off_peak = self.period(
            &in_window,
            active_days,
            self.capacity.off_peak_hours_per_day(),
            |h| self.capacity.is_operating_hour(h) && !self.capacity.is_peak_hour(h),
        );

        UtilizationMetric {
            window_label: window.label.clone(),
            window_range: window.range.clone(),
            active_days,
            overall,
            peak,
            off_peak,
        }
    }

    fn period<F>(
        &self,
        records: &[&Transaction],
        active_days: i64,
        hours_per_day: u32,
        include_hour: F,
    ) -> PeriodUtilization
    where
        F: Fn(u32) -> bool,
    {
        let mut wash_observed = 0u32;
        let mut dry_observed = 0u32;
        for record in records {
            if include_hour(record.hour()) {
                wash_observed += record.machines.wash;
                dry_observed += record.machines.dry;
            }
        }

        let wash = class_utilization(
            wash_observed,
            self.capacity.wash_theoretical_max(active_days, hours_per_day),
        );
        let dry = class_utilization(
            dry_observed,
            self.capacity.dry_theoretical_max(active_days, hours_per_day),
        );

        // Weighted by machine-count share so the blend reflects fleet
        // composition, not the current demand mix.
        let fleet = self.capacity.washers + self.capacity.dryers;
        let total_pct = if fleet == 0 {
            0.0
        } else {
            round1(
                (wash.utilization_pct * self.capacity.washers as f64
                    + dry.utilization_pct * self.capacity.dryers as f64)
                    / fleet as f64,
            )
        };

        PeriodUtilization { wash, dry, total_pct }
    }
}

fn class_utilization(observed: u32, theoretical_max: f64) -> ClassUtilization {
    let utilization_pct = if theoretical_max == 0.0 {
        0.0
    } else {
        round1(observed as f64 / theoretical_max * 100.0)
    };

    ClassUtilization {
        observed_services: observed,
        theoretical_max,
        utilization_pct,
    }
}
