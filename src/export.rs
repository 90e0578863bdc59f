use std::path::Path;

use serde::Serialize;
use tracing::debug;

use crate::error::{PipelineError, PipelineResult};
use crate::models::{DailyRecord, DayRecord, WeeklySummary};

pub const FILTERED_FILE: &str = "filtered_data.csv";
pub const DAY_FILE: &str = "data_with_day.csv";
pub const WEEKLY_FILE: &str = "weekly_data.csv";
pub const CHART_FILE: &str = "candlestick.html";

pub fn prepare_output_dir(dir: &Path) -> PipelineResult<()> {
    std::fs::create_dir_all(dir).map_err(|source| PipelineError::Write {
        path: dir.to_path_buf(),
        source,
    })
}

/// A row type with a fixed CSV header, in field order.
pub trait TableRow: Serialize {
    const HEADERS: &'static [&'static str];
}

impl TableRow for DailyRecord {
    const HEADERS: &'static [&'static str] = &["date", "open", "high", "low", "close", "volume"];
}

impl TableRow for DayRecord {
    const HEADERS: &'static [&'static str] =
        &["date", "day", "open", "high", "low", "close", "volume"];
}

impl TableRow for WeeklySummary {
    const HEADERS: &'static [&'static str] =
        &["week_start", "average_close", "total_volume", "trading_days"];
}

/// Writes the header of `T` followed by one CSV row per item.
///
/// The header is written even when `rows` is empty.
pub fn write_table<T: TableRow>(path: &Path, rows: &[T]) -> PipelineResult<()> {
    let write_error = |source: std::io::Error| PipelineError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(|err| write_error(err.into()))?;
    writer
        .write_record(T::HEADERS)
        .map_err(|err| write_error(err.into()))?;
    for row in rows {
        writer.serialize(row).map_err(|err| write_error(err.into()))?;
    }
    writer.flush().map_err(write_error)?;

    debug!(path = %path.display(), rows = rows.len(), "wrote table");
    Ok(())
}

pub fn write_text(path: &Path, contents: &str) -> PipelineResult<()> {
    std::fs::write(path, contents).map_err(|source| PipelineError::Write {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn writes_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(WEEKLY_FILE);
        let rows = vec![WeeklySummary {
            week_start: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            average_close: 101.5,
            total_volume: 3_400_000.0,
            trading_days: 3,
        }];

        write_table(&path, &rows).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        let mut lines = written.lines();
        assert_eq!(
            lines.next(),
            Some("week_start,average_close,total_volume,trading_days")
        );
        assert_eq!(lines.next(), Some("2023-01-01,101.5,3400000.0,3"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn empty_table_still_has_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(WEEKLY_FILE);

        write_table(&path, &Vec::<WeeklySummary>::new()).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "week_start,average_close,total_volume,trading_days\n");
    }

    #[test]
    fn day_records_header_matches_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DAY_FILE);
        let rows = vec![DayRecord {
            date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            day: "Sunday",
            open: 1.0,
            high: 2.0,
            low: 0.5,
            close: 1.5,
            volume: 10.0,
        }];

        write_table(&path, &rows).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            written,
            "date,day,open,high,low,close,volume\n2023-01-01,Sunday,1.0,2.0,0.5,1.5,10.0\n"
        );
    }

    #[test]
    fn daily_records_use_plain_column_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(FILTERED_FILE);
        let rows = vec![DailyRecord {
            date: NaiveDate::from_ymd_opt(2023, 1, 3).unwrap(),
            open: 1.25,
            high: 2.0,
            low: 1.0,
            close: 1.5,
            volume: 900.0,
        }];

        write_table(&path, &rows).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("date,open,high,low,close,volume\n2023-01-03,1.25,"));
    }

    #[test]
    fn creates_nested_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        prepare_output_dir(&nested).unwrap();
        assert!(nested.is_dir());
    }

    #[test]
    fn unwritable_path_is_write_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join(WEEKLY_FILE);
        let rows: Vec<WeeklySummary> = Vec::new();
        assert!(matches!(
            write_table(&path, &rows),
            Err(PipelineError::Write { .. })
        ));
    }
}
