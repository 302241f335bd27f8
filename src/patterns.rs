//! Temporal Pattern Aggregators
//!
//! Grid-buckets windowed records by hour of day and by (hour, day-of-week),
//! then derives normalized per-bucket averages. One shared filling pass feeds
//! every rollup, so the flat hourly view and the heatmap-style grid view can
//! never disagree on raw bucket counts.
//!
//! Normalization here divides by the distinct calendar dates actually observed
//! per bucket. The utilization calculator deliberately uses the window's full
//! calendar span instead; the two bases are intentionally different.

use crate::config::CapacityConfig;
use crate::models::{
    DateWindow, HourRank, HourlyPattern, PeakHours, Transaction, WeekdayPattern, WEEKDAY_NAMES,
};
use crate::normalizer::{round1, round2};
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Default)]
struct Bucket {
    wash: u32,
    dry: u32,
    /// Net revenue; includes credit top-ups even though service counts do not.
    revenue: f64,
    dates: HashSet<NaiveDate>,
}

impl Bucket {
    fn services(&self) -> u32 {
        self.wash + self.dry
    }

    fn add(&mut self, record: &Transaction) {
        if !record.is_top_up() {
            self.wash += record.machines.wash;
            self.dry += record.machines.dry;
        }
        self.revenue += record.net_paid;
        self.dates.insert(record.date);
    }
}

/// Shared bucket grid filled in a single pass over the windowed records.
pub struct PatternGrid {
    hourly: HashMap<u32, Bucket>,
    cells: HashMap<(u32, u32), Bucket>,
    weekday: HashMap<u32, Bucket>,
}

impl PatternGrid {
    pub fn build(records: &[Transaction], window: &DateWindow) -> Self {
        let mut grid = Self {
            hourly: HashMap::new(),
            cells: HashMap::new(),
            weekday: HashMap::new(),
        };

        for record in records.iter().filter(|r| r.in_window(window)) {
            let hour = record.hour();
            let weekday = record.weekday_index();
            grid.hourly.entry(hour).or_default().add(record);
            grid.cells.entry((hour, weekday)).or_default().add(record);
            grid.weekday.entry(weekday).or_default().add(record);
        }

        grid
    }

    /// Per-hour averages for all 24 hours.
    ///
    /// Flat averages divide each hour's sums by the distinct dates seen for
    /// that hour. The utilization percentage instead averages the per-(hour,
    /// weekday) cell utilizations across cells with data, matching the
    /// heatmap view.
    pub fn hourly_patterns(&self, capacity: &CapacityConfig) -> Vec<HourlyPattern> {
        (0..24)
            .map(|hour| {
                let (avg_wash, avg_dry, avg_services, avg_revenue, days_observed) =
                    match self.hourly.get(&hour) {
                        Some(bucket) if !bucket.dates.is_empty() => {
                            let days = bucket.dates.len() as f64;
                            (
                                round2(bucket.wash as f64 / days),
                                round2(bucket.dry as f64 / days),
                                round2(bucket.services() as f64 / days),
                                round2(bucket.revenue / days),
                                bucket.dates.len(),
                            )
                        }
                        _ => (0.0, 0.0, 0.0, 0.0, 0),
                    };

                HourlyPattern {
                    hour,
                    avg_wash,
                    avg_dry,
                    avg_services,
                    avg_revenue,
                    utilization_pct: self.grid_hour_utilization(hour, capacity),
                    days_observed,
                }
            })
            .collect()
    }

    /// Mean of per-(hour, weekday) cell utilizations across the cells that
    /// have data for this hour.
    fn grid_hour_utilization(&self, hour: u32, capacity: &CapacityConfig) -> f64 {
        let hourly_capacity = capacity.fleet_hourly_capacity();
        if hourly_capacity == 0.0 {
            return 0.0;
        }

        let mut sum = 0.0;
        let mut cells_with_data = 0u32;
        for weekday in 0..7 {
            if let Some(cell) = self.cells.get(&(hour, weekday)) {
                if cell.dates.is_empty() {
                    continue;
                }
                let cell_max = cell.dates.len() as f64 * hourly_capacity;
                sum += cell.services() as f64 / cell_max * 100.0;
                cells_with_data += 1;
            }
        }

        if cells_with_data == 0 {
            0.0
        } else {
            round1(sum / cells_with_data as f64)
        }
    }

    /// Per-day-of-week averages (Sunday first) with daily capacity denominators.
    pub fn weekday_patterns(&self, capacity: &CapacityConfig) -> Vec<WeekdayPattern> {
        let daily_capacity =
            capacity.fleet_hourly_capacity() * capacity.operating_hours_per_day() as f64;

        (0..7)
            .map(|weekday| {
                let bucket = self.weekday.get(&weekday);
                let (avg_wash, avg_dry, avg_services, avg_revenue, utilization_pct, days) =
                    match bucket {
                        Some(bucket) if !bucket.dates.is_empty() => {
                            let days = bucket.dates.len() as f64;
                            let utilization = if daily_capacity == 0.0 {
                                0.0
                            } else {
                                round1(
                                    bucket.services() as f64 / (days * daily_capacity) * 100.0,
                                )
                            };
                            (
                                round2(bucket.wash as f64 / days),
                                round2(bucket.dry as f64 / days),
                                round2(bucket.services() as f64 / days),
                                round2(bucket.revenue / days),
                                utilization,
                                bucket.dates.len(),
                            )
                        }
                        _ => (0.0, 0.0, 0.0, 0.0, 0.0, 0),
                    };

                WeekdayPattern {
                    weekday,
                    weekday_name: WEEKDAY_NAMES[weekday as usize].to_string(),
                    avg_wash,
                    avg_dry,
                    avg_services,
                    avg_revenue,
                    utilization_pct,
                    days_observed: days,
                }
            })
            .collect()
    }
}

/// Rank hours into the top-5 busiest and bottom-5 quietest by utilization.
/// Ties keep the original hour order (stable sort).
pub fn identify_peak_hours(patterns: &[HourlyPattern]) -> PeakHours {
    let mut by_desc: Vec<&HourlyPattern> = patterns.iter().collect();
    by_desc.sort_by(|a, b| {
        b.utilization_pct
            .partial_cmp(&a.utilization_pct)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut by_asc: Vec<&HourlyPattern> = patterns.iter().collect();
    by_asc.sort_by(|a, b| {
        a.utilization_pct
            .partial_cmp(&b.utilization_pct)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let rank = |p: &HourlyPattern| HourRank {
        hour: p.hour,
        utilization_pct: p.utilization_pct,
    };

    PeakHours {
        peak: by_desc.iter().take(5).map(|p| rank(p)).collect(),
        off_peak: by_asc.iter().take(5).map(|p| rank(p)).collect(),
    }
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

    fn record(date_time: &str, machines: &str, amount: &str) -> Transaction {
        RecordNormalizer::new(Config::default().cashback)
            .normalize_row(&RawSaleRow {
                date_time: date_time.to_string(),
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
    fn test_flat_hourly_average_divides_by_distinct_dates() {
        let records = vec![
            // Two different dates at 10:00, one service each
            record("16/06/2025 10:15:00", "Lavadora 1", "17,90"),
            record("17/06/2025 10:45:00", "Lavadora 1", "17,90"),
        ];
        let grid = PatternGrid::build(&records, &window());
        let patterns = grid.hourly_patterns(&Config::default().capacity);

        let ten = &patterns[10];
        assert_eq!(ten.days_observed, 2);
        assert_eq!(ten.avg_services, 1.0);
        assert_eq!(ten.avg_revenue, 17.90);

        let eleven = &patterns[11];
        assert_eq!(eleven.days_observed, 0);
        assert_eq!(eleven.avg_services, 0.0);
    }

    #[test]
    fn test_top_up_revenue_counted_but_not_services() {
        let records = vec![
            record("16/06/2025 10:00:00", "Lavadora 1", "17,90"),
            record("16/06/2025 10:30:00", "Recarga", "50,00"),
        ];
        let grid = PatternGrid::build(&records, &window());
        let patterns = grid.hourly_patterns(&Config::default().capacity);

        let ten = &patterns[10];
        assert_eq!(ten.avg_services, 1.0);
        assert_eq!(ten.avg_revenue, 67.90);
    }

    #[test]
    fn test_weekday_patterns_normalized_per_day() {
        let records = vec![
            // One Monday with two transactions, one Tuesday with a double cycle
            record("16/06/2025 10:00:00", "Lavadora 1", "17,90"),
            record("16/06/2025 14:00:00", "Secadora 1", "17,90"),
            record("17/06/2025 10:00:00", "Lavadora 1, Secadora 1", "35,80"),
        ];
        let grid = PatternGrid::build(&records, &window());
        let patterns = grid.weekday_patterns(&Config::default().capacity);

        // Monday = index 1
        let monday = &patterns[1];
        assert_eq!(monday.days_observed, 1);
        assert_eq!(monday.avg_services, 2.0);
        assert_eq!(monday.avg_wash, 1.0);
        assert_eq!(monday.avg_dry, 1.0);

        let tuesday = &patterns[2];
        assert_eq!(tuesday.avg_services, 2.0);
        assert!(tuesday.utilization_pct > 0.0);

        let sunday = &patterns[0];
        assert_eq!(sunday.days_observed, 0);
        assert_eq!(sunday.utilization_pct, 0.0);
    }

    #[test]
    fn test_grid_utilization_averages_cells_with_data() {
        // Same hour on two different weekdays; each cell has one date
        let records = vec![
            record("16/06/2025 10:00:00", "Lavadora 1", "17,90"),
            record("17/06/2025 10:00:00", "Lavadora 1, Lavadora 2, Secadora 1", "53,70"),
        ];
        let capacity = Config::default().capacity;
        let grid = PatternGrid::build(&records, &window());

        let hourly_capacity = capacity.fleet_hourly_capacity();
        let expected = round1(
            ((1.0 / hourly_capacity * 100.0) + (3.0 / hourly_capacity * 100.0)) / 2.0,
        );
        let patterns = grid.hourly_patterns(&capacity);
        assert_eq!(patterns[10].utilization_pct, expected);
    }

    #[test]
    fn test_identify_peak_hours_ranks_and_breaks_ties_stably() {
        let records = vec![
            record("16/06/2025 19:00:00", "Lavadora 1, Lavadora 2", "35,80"),
            record("16/06/2025 10:00:00", "Lavadora 1", "17,90"),
            record("16/06/2025 14:00:00", "Secadora 1", "17,90"),
        ];
        let grid = PatternGrid::build(&records, &window());
        let patterns = grid.hourly_patterns(&Config::default().capacity);
        let peaks = identify_peak_hours(&patterns);

        assert_eq!(peaks.peak.len(), 5);
        assert_eq!(peaks.off_peak.len(), 5);
        assert_eq!(peaks.peak[0].hour, 19);
        // 10:00 and 14:00 tie; the earlier hour ranks first
        assert_eq!(peaks.peak[1].hour, 10);
        assert_eq!(peaks.peak[2].hour, 14);
        // Quietest hours are the zero-utilization ones, in hour order
        assert_eq!(peaks.off_peak[0].hour, 0);
        assert_eq!(peaks.off_peak[0].utilization_pct, 0.0);
    }

    #[test]
    fn test_empty_dataset_yields_zeroed_patterns() {
        let grid = PatternGrid::build(&[], &window());
        let capacity = Config::default().capacity;

        let hourly = grid.hourly_patterns(&capacity);
        assert_eq!(hourly.len(), 24);
        assert!(hourly.iter().all(|p| p.avg_services == 0.0 && p.utilization_pct == 0.0));

        let weekday = grid.weekday_patterns(&capacity);
        assert_eq!(weekday.len(), 7);
        assert!(weekday.iter().all(|p| p.avg_revenue == 0.0));
    }
}
