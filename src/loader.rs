use std::collections::HashMap;
use std::ops::RangeInclusive;
use std::path::Path;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use csv::StringRecord;
use tracing::debug;

use crate::error::{LoadError, PipelineError, PipelineResult};
use crate::models::DailyRecord;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];
const SUPPORTED_YEARS: RangeInclusive<i32> = 1..=9999;

struct Columns {
    date: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    volume: usize,
}

impl Columns {
    fn resolve(headers: &StringRecord) -> Result<Self, LoadError> {
        Ok(Self {
            date: resolve_column(headers, "date")?,
            open: resolve_column(headers, "open")?,
            high: resolve_column(headers, "high")?,
            low: resolve_column(headers, "low")?,
            close: resolve_column(headers, "close")?,
            volume: resolve_column(headers, "volume")?,
        })
    }
}

pub fn load_records(path: &Path) -> PipelineResult<Vec<DailyRecord>> {
    load_records_with(path, b',')
}

/// Reads a delimited OHLCV table, sorted by ascending date.
///
/// Headers match case-insensitively, either exactly (`Close`) or through a
/// unique symbol prefix (`AAPL.Close`). Any malformed row fails the load.
pub fn load_records_with(path: &Path, delimiter: u8) -> PipelineResult<Vec<DailyRecord>> {
    let load_error = |source: LoadError| PipelineError::Load {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|err| load_error(err.into()))?;

    let headers = reader
        .headers()
        .map_err(|err| load_error(err.into()))?
        .clone();
    let columns = Columns::resolve(&headers).map_err(load_error)?;

    let mut records = Vec::new();
    let mut seen: HashMap<NaiveDate, u64> = HashMap::new();

    for (index, result) in reader.records().enumerate() {
        let row = result.map_err(|err| load_error(err.into()))?;
        let line = row
            .position()
            .map(|position| position.line())
            .unwrap_or(index as u64 + 2);

        let raw_date = row.get(columns.date).unwrap_or("");
        let date = parse_date(raw_date).ok_or_else(|| PipelineError::InvalidDate {
            line,
            value: raw_date.to_string(),
        })?;

        let record = DailyRecord {
            date,
            open: parse_number(&row, columns.open, "open", line).map_err(load_error)?,
            high: parse_number(&row, columns.high, "high", line).map_err(load_error)?,
            low: parse_number(&row, columns.low, "low", line).map_err(load_error)?,
            close: parse_number(&row, columns.close, "close", line).map_err(load_error)?,
            volume: parse_number(&row, columns.volume, "volume", line).map_err(load_error)?,
        };

        if record.volume < 0.0 {
            return Err(load_error(LoadError::NegativeVolume {
                line,
                value: record.volume,
            }));
        }
        if let Some(&first_line) = seen.get(&date) {
            return Err(load_error(LoadError::DuplicateDate {
                line,
                first_line,
                date,
            }));
        }
        seen.insert(date, line);

        records.push(record);
    }

    records.sort_by_key(|record| record.date);
    debug!(path = %path.display(), rows = records.len(), "parsed input table");
    Ok(records)
}

/// Coerces a date cell, keeping only the calendar date of timestamps.
///
/// Years outside 1..=9999 are rejected.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
                .map(|datetime| datetime.date())
        })
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|datetime| datetime.date_naive())
        })
        .filter(|date| SUPPORTED_YEARS.contains(&date.year()))
}

fn resolve_column(headers: &StringRecord, field: &'static str) -> Result<usize, LoadError> {
    let lowered: Vec<String> = headers.iter().map(|h| h.to_lowercase()).collect();
    if let Some(index) = lowered.iter().position(|h| h == field) {
        return Ok(index);
    }

    let suffix = format!(".{field}");
    let candidates: Vec<usize> = lowered
        .iter()
        .enumerate()
        .filter(|(_, h)| h.ends_with(&suffix))
        .map(|(index, _)| index)
        .collect();

    match candidates.as_slice() {
        [] => Err(LoadError::MissingColumn(field)),
        [index] => Ok(*index),
        _ => Err(LoadError::AmbiguousColumn {
            field,
            candidates: candidates
                .iter()
                .map(|&index| headers[index].to_string())
                .collect(),
        }),
    }
}

fn parse_number(
    row: &StringRecord,
    index: usize,
    column: &'static str,
    line: u64,
) -> Result<f64, LoadError> {
    let raw = row.get(index).unwrap_or("");
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(LoadError::InvalidNumber {
            line,
            column,
            value: raw.to_string(),
        }),
    }
}
