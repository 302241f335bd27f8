//! Lavapop Metrics Library
//!
//! Metrics computation core for a self-service laundromat operator dashboard.
//! The library ingests point-of-sale transaction rows and derives
//! time-windowed utilization, peak/off-peak breakdowns, hourly and day-of-week
//! patterns, per-machine revenue attribution, and revenue reconciliation.
//!
//! ## Architecture Overview
//!
//! - [`models`] - Raw rows, canonical transaction records, and metric output types
//! - [`ingest`] - Sales CSV export parsing (BOM/prefix cleanup, delimiter detection)
//! - [`normalizer`] - Locale-sensitive normalization of raw rows into records
//! - [`windows`] - Business-week date window resolution from an injected instant
//! - [`utilization`] - Weighted utilization vs. the capacity model
//! - [`patterns`] - Hourly and day-of-week aggregation over a shared bucket grid
//! - [`machines`] - Per-machine use counts and proportional revenue attribution
//! - [`revenue`] - Machine vs. prepaid-credit revenue reconciliation
//! - [`analyzer`] - Pipeline orchestration ([`MetricsEngine`])
//! - [`display`] - Colored terminal and JSON report rendering
//! - [`config`] - Capacity model, cashback, and logging configuration
//! - [`logging`] - Structured logging setup
//!
//! ## Main Entry Point
//!
//! The primary interface is [`MetricsEngine`]:
//!
//! ```rust,no_run
//! use lavapop_metrics::{MetricsEngine, WindowKind};
//! use lavapop_metrics::config::Config;
//!
//! # fn example() -> anyhow::Result<()> {
//! let config = Config::default();
//! let engine = MetricsEngine::new(&config);
//! let (records, _summary) = engine.load_records(std::path::Path::new("sales.csv"))?;
//!
//! let now = chrono::Local::now().naive_local();
//! let window = engine.resolve_window(WindowKind::CurrentWeek, now);
//! let report = engine.dashboard(&records, &window);
//! # Ok(())
//! # }
//! ```
//!
//! The core is single-threaded, synchronous, and pure: every metric is
//! recomputed from the immutable record snapshot on each call, and the
//! reference instant is always injected rather than read from a clock inside
//! the computation.

pub mod analyzer;
pub mod config;
pub mod display;
pub mod ingest;
pub mod logging;
pub mod machines;
pub mod models;
pub mod normalizer;
pub mod patterns;
pub mod revenue;
pub mod utilization;
pub mod windows;

pub use analyzer::{DashboardReport, MetricsEngine};
pub use models::*;
