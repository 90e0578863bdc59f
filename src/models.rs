use chrono::{Datelike, Days, NaiveDate};
use clap::ValueEnum;
use serde::Serialize;

/// One trading day's OHLCV observation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyRecord {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// A daily record annotated with its weekday name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayRecord {
    pub date: NaiveDate,
    pub day: &'static str,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklySummary {
    pub week_start: NaiveDate,
    pub average_close: f64,
    pub total_volume: f64,
    pub trading_days: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnStatistics {
    pub max: f64,
    pub min: f64,
    pub mean: f64,
}

/// Numeric column of a [`DailyRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PriceField {
    Open,
    High,
    Low,
    Close,
    Volume,
}

impl PriceField {
    pub fn value(self, record: &DailyRecord) -> f64 {
        match self {
            PriceField::Open => record.open,
            PriceField::High => record.high,
            PriceField::Low => record.low,
            PriceField::Close => record.close,
            PriceField::Volume => record.volume,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PriceField::Open => "open",
            PriceField::High => "high",
            PriceField::Low => "low",
            PriceField::Close => "close",
            PriceField::Volume => "volume",
        }
    }
}

/// First day of a weekly bucket.
///
/// `Sunday` buckets run Sunday through Saturday; `Monday` gives ISO weeks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum WeekStart {
    #[default]
    Sunday,
    Monday,
}

impl WeekStart {
    /// The first day of the week containing `date`.
    ///
    /// A week that begins before `NaiveDate::MIN` is labelled `NaiveDate::MIN`.
    pub fn week_of(self, date: NaiveDate) -> NaiveDate {
        let offset = match self {
            WeekStart::Sunday => date.weekday().num_days_from_sunday(),
            WeekStart::Monday => date.weekday().num_days_from_monday(),
        };
        date.checked_sub_days(Days::new(u64::from(offset)))
            .unwrap_or(NaiveDate::MIN)
    }
}
