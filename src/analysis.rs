use chrono::{Datelike, Weekday};

use crate::error::{PipelineError, PipelineResult};
use crate::models::{ColumnStatistics, DailyRecord, DayRecord, PriceField};

pub fn compute_statistics(records: &[DailyRecord]) -> PipelineResult<ColumnStatistics> {
    column_statistics(records, PriceField::Close)
}

pub fn column_statistics(
    records: &[DailyRecord],
    field: PriceField,
) -> PipelineResult<ColumnStatistics> {
    if records.is_empty() {
        return Err(PipelineError::EmptyDataset {
            operation: "column statistics",
        });
    }

    let mut max = f64::NEG_INFINITY;
    let mut min = f64::INFINITY;
    let mut total = 0.0;
    for record in records {
        let value = field.value(record);
        max = max.max(value);
        min = min.min(value);
        total += value;
    }

    Ok(ColumnStatistics {
        max,
        min,
        mean: total / records.len() as f64,
    })
}

/// Keeps records whose volume is at least the mean volume of `records`.
///
/// The threshold is recomputed from whatever is passed in, so filtering the
/// output a second time usually drops more rows.
pub fn filter_by_average_volume(records: &[DailyRecord]) -> PipelineResult<Vec<DailyRecord>> {
    if records.is_empty() {
        return Err(PipelineError::EmptyDataset {
            operation: "average volume filter",
        });
    }

    let average = records.iter().map(|r| r.volume).sum::<f64>() / records.len() as f64;
    Ok(records
        .iter()
        .filter(|record| record.volume >= average)
        .cloned()
        .collect())
}

pub fn with_day_of_week(records: &[DailyRecord]) -> Vec<DayRecord> {
    records
        .iter()
        .map(|record| DayRecord {
            date: record.date,
            day: day_name(record.date.weekday()),
            open: record.open,
            high: record.high,
            low: record.low,
            close: record.close,
            volume: record.volume,
        })
        .collect()
}

pub fn day_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}
