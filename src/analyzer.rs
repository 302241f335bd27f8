//! Metrics Engine
//!
//! Coordinates the full pipeline: ingest a sales export, normalize rows into
//! canonical records, resolve the requested window, and derive each metric
//! view. Every derivation is a pure recomputation over the immutable record
//! snapshot; nothing is cached or mutated between calls, so recomputing with
//! identical inputs always yields identical output.

use crate::config::{CapacityConfig, CashbackConfig, Config};
use crate::ingest;
use crate::machines;
use crate::models::{
    DateWindow, HourlyPattern, IngestSummary, MachinePerformance, PeakHours, RevenueBreakdown,
    Transaction, UtilizationMetric, WeekdayPattern, WindowKind,
};
use crate::normalizer::RecordNormalizer;
use crate::patterns::{identify_peak_hours, PatternGrid};
use crate::revenue;
use crate::utilization::UtilizationCalculator;
use crate::windows;
use anyhow::Result;
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// Everything the dashboard shows for one window, in one object.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardReport {
    pub window: DateWindow,
    pub utilization: UtilizationMetric,
    pub peak_hours: PeakHours,
    pub hourly: Vec<HourlyPattern>,
    pub weekday: Vec<WeekdayPattern>,
    pub machines: Vec<MachinePerformance>,
    pub revenue: RevenueBreakdown,
}

pub struct MetricsEngine {
    capacity: CapacityConfig,
    cashback: CashbackConfig,
    all_time_start: NaiveDate,
}

impl MetricsEngine {
    pub fn new(config: &Config) -> Self {
        Self {
            capacity: config.capacity.clone(),
            cashback: config.cashback.clone(),
            all_time_start: config.business.all_time_start,
        }
    }

    /// Load a sales export and normalize it into canonical records.
    pub fn load_records(&self, path: &Path) -> Result<(Vec<Transaction>, IngestSummary)> {
        let rows = ingest::load_sales_csv(path)?;
        let normalizer = RecordNormalizer::new(self.cashback.clone());
        let (records, summary) = normalizer.normalize_rows(&rows);

        info!(
            total = summary.total_rows,
            normalized = summary.normalized,
            skipped = summary.skipped,
            duplicates = summary.duplicates,
            "Normalized sales export"
        );

        Ok((records, summary))
    }

    /// Resolve a window kind against an injected reference instant.
    pub fn resolve_window(&self, kind: WindowKind, reference: NaiveDateTime) -> DateWindow {
        windows::resolve(kind, reference, self.all_time_start)
    }

    pub fn utilization(&self, records: &[Transaction], window: &DateWindow) -> UtilizationMetric {
        UtilizationCalculator::new(&self.capacity).calculate(records, window)
    }

    pub fn hourly_patterns(
        &self,
        records: &[Transaction],
        window: &DateWindow,
    ) -> Vec<HourlyPattern> {
        PatternGrid::build(records, window).hourly_patterns(&self.capacity)
    }

    pub fn weekday_patterns(
        &self,
        records: &[Transaction],
        window: &DateWindow,
    ) -> Vec<WeekdayPattern> {
        PatternGrid::build(records, window).weekday_patterns(&self.capacity)
    }

    /// Busiest/quietest hours, ranked over the operating-hour range only so
    /// closed overnight hours do not dominate the quiet list.
    pub fn peak_hours(&self, records: &[Transaction], window: &DateWindow) -> PeakHours {
        let patterns = self.hourly_patterns(records, window);
        let operating: Vec<HourlyPattern> = patterns
            .into_iter()
            .filter(|p| self.capacity.is_operating_hour(p.hour))
            .collect();
        identify_peak_hours(&operating)
    }

    pub fn machine_performance(
        &self,
        records: &[Transaction],
        window: &DateWindow,
    ) -> Vec<MachinePerformance> {
        machines::attribute(records, window)
    }

    pub fn revenue(&self, records: &[Transaction], window: &DateWindow) -> RevenueBreakdown {
        revenue::reconcile(records, window)
    }

    /// Derive every metric view for one window.
    pub fn dashboard(&self, records: &[Transaction], window: &DateWindow) -> DashboardReport {
        let grid = PatternGrid::build(records, window);
        let hourly = grid.hourly_patterns(&self.capacity);
        let weekday = grid.weekday_patterns(&self.capacity);
        let operating: Vec<HourlyPattern> = hourly
            .iter()
            .filter(|p| self.capacity.is_operating_hour(p.hour))
            .cloned()
            .collect();

        DashboardReport {
            window: window.clone(),
            utilization: self.utilization(records, window),
            peak_hours: identify_peak_hours(&operating),
            hourly,
            weekday,
            machines: machines::attribute(records, window),
            revenue: revenue::reconcile(records, window),
        }
    }
}
