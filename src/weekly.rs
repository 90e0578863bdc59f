use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::models::{DailyRecord, WeekStart, WeeklySummary};

pub fn aggregate_weekly(records: &[DailyRecord]) -> Vec<WeeklySummary> {
    aggregate_weekly_with(records, WeekStart::default())
}

/// Buckets records by calendar week and reduces each bucket to its mean
/// close and total volume. Weeks without records are omitted.
pub fn aggregate_weekly_with(records: &[DailyRecord], week_start: WeekStart) -> Vec<WeeklySummary> {
    // week start -> (close sum, volume sum, count)
    let mut buckets: BTreeMap<NaiveDate, (f64, f64, usize)> = BTreeMap::new();

    for record in records {
        let entry = buckets
            .entry(week_start.week_of(record.date))
            .or_insert((0.0, 0.0, 0));
        entry.0 += record.close;
        entry.1 += record.volume;
        entry.2 += 1;
    }

    buckets
        .into_iter()
        .map(|(week, (close_sum, volume_sum, count))| WeeklySummary {
            week_start: week,
            average_close: close_sum / count as f64,
            total_volume: volume_sum,
            trading_days: count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(date: NaiveDate, close: f64, volume: f64) -> DailyRecord {
        DailyRecord {
            date,
            open: close,
            high: close,
            low: close,
            close,
            volume,
        }
    }

    fn ten_days() -> Vec<DailyRecord> {
        let closes = [100.0, 102.0, 105.0, 99.0, 97.0, 98.0, 103.0, 101.0, 104.0, 106.0];
        let volumes = [
            1_000_000.0,
            950_000.0,
            1_100_000.0,
            1_050_000.0,
            980_000.0,
            1_020_000.0,
            1_150_000.0,
            1_080_000.0,
            1_120_000.0,
            1_200_000.0,
        ];
        (0..10)
            .map(|i| record(date(2023, 1, 1) + Duration::days(i as i64), closes[i], volumes[i]))
            .collect()
    }

    #[test]
    fn ten_days_from_sunday_split_seven_and_three() {
        let weeks = aggregate_weekly(&ten_days());

        assert_eq!(weeks.len(), 2);
        assert_eq!(weeks[0].week_start, date(2023, 1, 1));
        assert_eq!(weeks[0].trading_days, 7);
        assert!((weeks[0].average_close - 704.0 / 7.0).abs() < 1e-9);
        assert_eq!(weeks[0].total_volume, 7_250_000.0);

        assert_eq!(weeks[1].week_start, date(2023, 1, 8));
        assert_eq!(weeks[1].trading_days, 3);
        assert!((weeks[1].average_close - 311.0 / 3.0).abs() < 1e-9);
        assert_eq!(weeks[1].total_volume, 3_400_000.0);
    }

    #[test]
    fn monday_convention_splits_into_iso_weeks() {
        let weeks = aggregate_weekly_with(&ten_days(), WeekStart::Monday);
        let shape: Vec<(NaiveDate, usize)> =
            weeks.iter().map(|w| (w.week_start, w.trading_days)).collect();
        assert_eq!(
            shape,
            vec![
                (date(2022, 12, 26), 1),
                (date(2023, 1, 2), 7),
                (date(2023, 1, 9), 2),
            ]
        );
    }

    #[test]
    fn bucket_sizes_sum_to_input_length() {
        let records = ten_days();
        for convention in [WeekStart::Sunday, WeekStart::Monday] {
            let total: usize = aggregate_weekly_with(&records, convention)
                .iter()
                .map(|w| w.trading_days)
                .sum();
            assert_eq!(total, records.len());
        }
    }

    #[test]
    fn input_order_does_not_matter() {
        let mut shuffled = ten_days();
        shuffled.reverse();
        shuffled.swap(2, 7);
        assert_eq!(aggregate_weekly(&shuffled), aggregate_weekly(&ten_days()));
    }

    #[test]
    fn single_record_week_uses_its_values() {
        let weeks = aggregate_weekly(&[record(date(2023, 3, 15), 55.5, 1234.0)]);
        assert_eq!(weeks.len(), 1);
        assert_eq!(weeks[0].week_start, date(2023, 3, 12));
        assert_eq!(weeks[0].average_close, 55.5);
        assert_eq!(weeks[0].total_volume, 1234.0);
    }

    #[test]
    fn empty_input_gives_no_weeks() {
        assert!(aggregate_weekly(&[]).is_empty());
    }

    #[test]
    fn earliest_representable_date_is_bucketed() {
        let records = vec![
            record(NaiveDate::MIN, 1.0, 1.0),
            record(date(2023, 1, 2), 10.0, 5.0),
        ];
        let weeks = aggregate_weekly(&records);

        assert_eq!(weeks.len(), 2);
        assert_eq!(weeks[0].week_start, NaiveDate::MIN);
        assert_eq!(weeks[0].trading_days, 1);
        assert_eq!(weeks[1].week_start, date(2023, 1, 1));
    }

    #[test]
    fn gap_weeks_are_absent() {
        let records = vec![
            record(date(2023, 1, 2), 10.0, 1.0),
            record(date(2023, 1, 24), 20.0, 2.0),
        ];
        let weeks = aggregate_weekly(&records);
        let starts: Vec<NaiveDate> = weeks.iter().map(|w| w.week_start).collect();
        assert_eq!(starts, vec![date(2023, 1, 1), date(2023, 1, 22)]);
    }
}
