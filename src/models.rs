//! Core Data Models
//!
//! This module defines the primary data structures used throughout the laundromat
//! metrics pipeline. These models represent the complete data flow from raw
//! point-of-sale export rows to derived dashboard metrics.
//!
//! ## Data Flow
//!
//! 1. **Raw Data**: [`RawSaleRow`] - Individual rows parsed from a POS CSV export
//! 2. **Normalization**: [`Transaction`] - Canonical records with parsed dates,
//!    amounts, machine counts, and classification
//! 3. **Windows**: [`DateWindow`] / [`WindowKind`] - Named business-week time ranges
//! 4. **Output**: [`UtilizationMetric`], [`HourlyPattern`], [`WeekdayPattern`],
//!    [`MachinePerformance`], [`RevenueBreakdown`] - Serializable metric objects
//!    consumed by the rendering layer
//!
//! All output types serialize with camelCase field names so the rendering layer
//! receives plain nested JSON objects.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// One row of a POS sales export, before any normalization.
///
/// Historical exports used several header spellings for the same logical field;
/// every alias is resolved here so downstream code never branches on raw header
/// variants. All fields arrive as locale-formatted strings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSaleRow {
    #[serde(rename = "Data_Hora", alias = "Data Hora", alias = "data_hora", default)]
    pub date_time: String,
    #[serde(rename = "Valor_Venda", alias = "Valor Venda", alias = "valor_venda", default)]
    pub gross_value: String,
    #[serde(rename = "Valor_Pago", alias = "Valor Pago", alias = "valor_pago", default)]
    pub paid_value: String,
    #[serde(
        rename = "Meio_de_Pagamento",
        alias = "Meio de Pagamento",
        alias = "meio_de_pagamento",
        default
    )]
    pub payment_method: String,
    #[serde(rename = "Loja", alias = "loja", default)]
    pub store: String,
    #[serde(rename = "Nome_Cliente", alias = "Nome Cliente", alias = "nome_cliente", default)]
    pub customer_name: String,
    #[serde(rename = "Doc_Cliente", alias = "Doc Cliente", alias = "doc_cliente", default)]
    pub customer_doc: String,
    #[serde(rename = "Maquinas", alias = "Máquinas", alias = "maquinas", default)]
    pub machines: String,
    #[serde(rename = "Usou_Cupom", alias = "Usou Cupom", alias = "usou_cupom", default)]
    pub used_coupon: String,
    #[serde(rename = "Codigo_Cupom", alias = "Codigo Cupom", alias = "codigo_cupom", default)]
    pub coupon_code: String,
}

/// Mutually exclusive transaction classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionKind {
    /// Machine cycle paid directly (gross > 0, non-top-up machine list).
    MachineUse,
    /// Machine cycle paid from prepaid wallet balance.
    CreditFundedUse,
    /// Sale of prepaid wallet credit ("recarga"); no machine cycle consumed.
    CreditTopUp,
    /// Could not be classified.
    Unknown,
}

/// Wash/dry machine counts extracted from a machine-list string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MachineCounts {
    pub wash: u32,
    pub dry: u32,
}

impl MachineCounts {
    pub fn total(&self) -> u32 {
        self.wash + self.dry
    }
}

/// Canonical transaction record, immutable for the duration of a computation pass.
///
/// Timestamps are business-local wall-clock time exactly as the POS exports them;
/// keeping the whole core in that domain makes hour and weekday derivation stable
/// regardless of the host timezone.
#[derive(Debug, Clone, Serialize)]
pub struct Transaction {
    pub timestamp: NaiveDateTime,
    /// Calendar date component, retained for distinct-date bucketing.
    pub date: NaiveDate,
    pub gross: f64,
    /// Amount actually paid. Cashback liability is never subtracted from this.
    pub net_paid: f64,
    pub discount: f64,
    /// Rebate owed to the customer, tracked separately from revenue.
    pub cashback: f64,
    pub machines: MachineCounts,
    /// Raw comma-separated machine-list string, kept for per-machine attribution.
    pub machine_list: String,
    pub kind: TransactionKind,
    pub payment_method: String,
    pub customer_doc: String,
    pub used_coupon: bool,
    pub coupon_code: Option<String>,
}

impl Transaction {
    pub fn is_top_up(&self) -> bool {
        self.kind == TransactionKind::CreditTopUp
    }

    pub fn hour(&self) -> u32 {
        self.timestamp.hour()
    }

    /// Day of week with Sunday = 0, matching the business-week convention.
    pub fn weekday_index(&self) -> u32 {
        self.date.weekday().num_days_from_sunday()
    }

    pub fn in_window(&self, window: &DateWindow) -> bool {
        self.timestamp >= window.start && self.timestamp <= window.end
    }
}

/// Closed enumeration of the named reporting windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WindowKind {
    CurrentWeek,
    LastWeek,
    TwoWeeksAgo,
    Trailing4Weeks,
    Previous4Weeks,
    AllTime,
}

impl WindowKind {
    /// Parse a user-supplied window name. Unknown names resolve to the
    /// documented default, `CurrentWeek`; this is a fallback, not an error.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().replace(['-', '_', ' '], "").as_str() {
            "currentweek" | "current" | "week" => WindowKind::CurrentWeek,
            "lastweek" | "last" => WindowKind::LastWeek,
            "twoweeksago" | "2weeksago" => WindowKind::TwoWeeksAgo,
            "trailing4weeks" | "trailing" | "4weeks" => WindowKind::Trailing4Weeks,
            "previous4weeks" | "previous" => WindowKind::Previous4Weeks,
            "alltime" | "all" => WindowKind::AllTime,
            _ => WindowKind::CurrentWeek,
        }
    }
}

/// Resolved inclusive time range anchored to Sunday-Saturday business weeks.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateWindow {
    pub kind: WindowKind,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub label: String,
    /// Full formatted range, e.g. "01/06/2025 - 07/06/2025".
    pub range: String,
    /// Compact formatted range, e.g. "01/06 - 07/06".
    pub short_range: String,
}

impl DateWindow {
    /// Calendar span of the window in whole days, inclusive of both endpoints.
    /// This is intentionally the window span, not the count of dates observed
    /// in the data.
    pub fn active_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// Observed vs. theoretical throughput for one machine class.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassUtilization {
    pub observed_services: u32,
    pub theoretical_max: f64,
    /// Percentage rounded to one decimal; may exceed 100, never clamped here.
    pub utilization_pct: f64,
}

/// Utilization figures for one period (whole window, peak, or off-peak).
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodUtilization {
    pub wash: ClassUtilization,
    pub dry: ClassUtilization,
    /// Weighted by machine-count share, so the blend reflects fleet
    /// composition rather than the current demand mix.
    pub total_pct: f64,
}

/// Complete utilization report for one window.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UtilizationMetric {
    pub window_label: String,
    pub window_range: String,
    pub active_days: i64,
    pub overall: PeriodUtilization,
    pub peak: PeriodUtilization,
    pub off_peak: PeriodUtilization,
}

/// Per-hour averages across a window.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HourlyPattern {
    pub hour: u32,
    pub avg_wash: f64,
    pub avg_dry: f64,
    pub avg_services: f64,
    pub avg_revenue: f64,
    /// Average of per-(hour, weekday) cell utilizations over cells with data;
    /// consistent with the heatmap view and used for peak-hour identification.
    pub utilization_pct: f64,
    pub days_observed: usize,
}

/// Per-day-of-week averages across a window. Weekday 0 = Sunday.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekdayPattern {
    pub weekday: u32,
    pub weekday_name: String,
    pub avg_wash: f64,
    pub avg_dry: f64,
    pub avg_services: f64,
    pub avg_revenue: f64,
    pub utilization_pct: f64,
    pub days_observed: usize,
}

/// Busiest and quietest hours ranked by grid-derived utilization.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeakHours {
    /// Top 5 hours by utilization, descending.
    pub peak: Vec<HourRank>,
    /// Bottom 5 hours by utilization, ascending.
    pub off_peak: Vec<HourRank>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HourRank {
    pub hour: u32,
    pub utilization_pct: f64,
}

/// Per-physical-machine usage and attributed revenue.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MachinePerformance {
    pub machine: String,
    pub use_count: u32,
    pub attributed_revenue: f64,
    pub avg_revenue_per_use: f64,
}

/// Window revenue partitioned into machine-attributed vs. prepaid-credit sales.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueBreakdown {
    pub machine_revenue: f64,
    pub credit_top_up_revenue: f64,
    pub total_revenue: f64,
}

/// Counts reported back to the caller after one normalization pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestSummary {
    pub total_rows: usize,
    pub normalized: usize,
    /// Rows dropped for unparseable dates or missing customer document.
    pub skipped: usize,
    /// Rows dropped as duplicates within this snapshot.
    pub duplicates: usize,
}

/// Sunday-first weekday names used in day-of-week reports.
pub const WEEKDAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];
