//! Report Rendering
//!
//! Formats derived metrics for the terminal. Every report supports two modes:
//! human-readable colored output, and structured JSON (`--json`) for
//! programmatic consumption. No computation happens here; clamping or
//! highlighting decisions belong to this layer, not the metrics core.

use crate::analyzer::DashboardReport;
use crate::models::{
    DateWindow, HourlyPattern, IngestSummary, MachinePerformance, PeakHours, RevenueBreakdown,
    UtilizationMetric, WeekdayPattern,
};
use colored::Colorize;

pub struct ReportRenderer;

impl Default for ReportRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportRenderer {
    pub fn new() -> Self {
        Self
    }

    fn header(&self, title: &str, window: &DateWindow) {
        println!("\n{}", "=".repeat(72).bright_cyan());
        println!("{}", title.bright_white().bold());
        println!(
            "{} {} ({})",
            "🗓".bright_blue(),
            window.label.bright_white().bold(),
            window.range.bright_white()
        );
        println!("{}", "=".repeat(72).bright_cyan());
    }

    fn emit_json<T: serde::Serialize>(&self, value: &T) {
        match serde_json::to_string_pretty(value) {
            Ok(json_str) => println!("{}", json_str),
            Err(e) => eprintln!("Error serializing report to JSON: {}", e),
        }
    }

    pub fn display_ingest_summary(&self, summary: &IngestSummary) {
        println!(
            "{} {} rows — {} normalized, {} skipped, {} duplicates",
            "📥".bright_yellow(),
            summary.total_rows.to_string().bright_white().bold(),
            summary.normalized.to_string().bright_green(),
            summary.skipped.to_string().bright_yellow(),
            summary.duplicates.to_string().bright_yellow()
        );
    }

    pub fn display_utilization(
        &self,
        metric: &UtilizationMetric,
        window: &DateWindow,
        json_output: bool,
    ) {
        if json_output {
            self.emit_json(&serde_json::json!({ "utilization": metric }));
            return;
        }

        self.header("Machine Utilization", window);
        println!(
            "\n{} {} active days\n",
            "📊".bright_yellow(),
            metric.active_days.to_string().bright_white().bold()
        );

        for (name, period) in [
            ("Overall", &metric.overall),
            ("Peak", &metric.peak),
            ("Off-peak", &metric.off_peak),
        ] {
            println!("{}", name.bright_white().bold());
            println!(
                "   Wash: {} ({} of {:.0} max cycles)",
                format!("{:.1}%", period.wash.utilization_pct).bright_green().bold(),
                period.wash.observed_services.to_string().bright_white(),
                period.wash.theoretical_max
            );
            println!(
                "   Dry:  {} ({} of {:.0} max cycles)",
                format!("{:.1}%", period.dry.utilization_pct).bright_green().bold(),
                period.dry.observed_services.to_string().bright_white(),
                period.dry.theoretical_max
            );
            println!(
                "   Total: {}\n",
                format!("{:.1}%", period.total_pct).bright_green().bold()
            );
        }
    }

    pub fn display_hourly(
        &self,
        patterns: &[HourlyPattern],
        peaks: &PeakHours,
        window: &DateWindow,
        json_output: bool,
    ) {
        if json_output {
            self.emit_json(&serde_json::json!({ "hourly": patterns, "peakHours": peaks }));
            return;
        }

        self.header("Hourly Patterns", window);
        println!();

        for pattern in patterns.iter().filter(|p| p.days_observed > 0) {
            println!(
                "   {} — {} avg services, {} avg revenue, {} utilization",
                format!("{:02}:00", pattern.hour).bright_white().bold(),
                format!("{:.2}", pattern.avg_services).bright_white(),
                format!("R${:.2}", pattern.avg_revenue).bright_green(),
                format!("{:.1}%", pattern.utilization_pct).bright_yellow()
            );
        }

        println!("\n{} Busiest hours:", "🔥".bright_red());
        for rank in &peaks.peak {
            println!(
                "   {} — {}",
                format!("{:02}:00", rank.hour).bright_white().bold(),
                format!("{:.1}%", rank.utilization_pct).bright_green()
            );
        }

        println!("\n{} Quietest hours:", "🌙".bright_blue());
        for rank in &peaks.off_peak {
            println!(
                "   {} — {}",
                format!("{:02}:00", rank.hour).bright_white().bold(),
                format!("{:.1}%", rank.utilization_pct).bright_green()
            );
        }
    }

    pub fn display_weekday(
        &self,
        patterns: &[WeekdayPattern],
        window: &DateWindow,
        json_output: bool,
    ) {
        if json_output {
            self.emit_json(&serde_json::json!({ "weekday": patterns }));
            return;
        }

        self.header("Day-of-Week Patterns", window);
        println!();

        for pattern in patterns {
            println!(
                "   {:<10} {} avg services ({} wash / {} dry), {} avg revenue, {}",
                pattern.weekday_name.bright_white().bold(),
                format!("{:.2}", pattern.avg_services).bright_white(),
                format!("{:.2}", pattern.avg_wash),
                format!("{:.2}", pattern.avg_dry),
                format!("R${:.2}", pattern.avg_revenue).bright_green(),
                format!("{:.1}%", pattern.utilization_pct).bright_yellow()
            );
        }
        println!();
    }

    pub fn display_machines(
        &self,
        performance: &[MachinePerformance],
        window: &DateWindow,
        limit: Option<usize>,
        json_output: bool,
    ) {
        if json_output {
            self.emit_json(&serde_json::json!({ "machines": performance }));
            return;
        }

        self.header("Machine Performance", window);
        println!();

        if performance.is_empty() {
            println!("   No machine usage in this window.\n");
            return;
        }

        let shown = limit.unwrap_or(performance.len());
        for entry in performance.iter().take(shown) {
            println!(
                "   {:<16} {} uses — {} attributed ({} / use)",
                entry.machine.bright_cyan(),
                entry.use_count.to_string().bright_white().bold(),
                format!("R${:.2}", entry.attributed_revenue).bright_green().bold(),
                format!("R${:.2}", entry.avg_revenue_per_use).bright_green()
            );
        }
        println!();
    }

    pub fn display_revenue(
        &self,
        breakdown: &RevenueBreakdown,
        window: &DateWindow,
        json_output: bool,
    ) {
        if json_output {
            self.emit_json(&serde_json::json!({ "revenue": breakdown }));
            return;
        }

        self.header("Revenue Breakdown", window);
        println!();
        println!(
            "   Machine revenue:   {}",
            format!("R${:.2}", breakdown.machine_revenue).bright_green().bold()
        );
        println!(
            "   Credit top-ups:    {}",
            format!("R${:.2}", breakdown.credit_top_up_revenue).bright_green().bold()
        );
        println!(
            "   Total:             {}\n",
            format!("R${:.2}", breakdown.total_revenue).bright_green().bold()
        );
    }

    pub fn display_summary(&self, report: &DashboardReport, json_output: bool) {
        if json_output {
            self.emit_json(report);
            return;
        }

        self.display_utilization(&report.utilization, &report.window, false);
        self.display_hourly(&report.hourly, &report.peak_hours, &report.window, false);
        self.display_weekday(&report.weekday, &report.window, false);
        self.display_machines(&report.machines, &report.window, Some(10), false);
        self.display_revenue(&report.revenue, &report.window, false);
    }
}
