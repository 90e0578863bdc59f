//! Daily OHLCV analysis: load a price table, summarise it, filter and
//! resample it by week, and chart it.

pub mod analysis;
pub mod chart;
pub mod error;
pub mod export;
pub mod loader;
pub mod models;
pub mod weekly;

pub use error::{LoadError, PipelineError, PipelineResult};
pub use models::{ColumnStatistics, DailyRecord, DayRecord, PriceField, WeekStart, WeeklySummary};
