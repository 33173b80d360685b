use crate::domain::market::ohlcv::OhlcvRecord;
use crate::domain::ports::OhlcvSource;
use anyhow::{Context, Result, bail};
use std::io::Read;
use std::path::PathBuf;
use tracing::{debug, info};

/// Reads daily bars from a CSV file with a `Date,Open,High,Low,Close,Volume` header.
///
/// Providers differ in row order, so records are sorted ascending by date; a repeated
/// date is rejected.
pub struct CsvOhlcvSource {
    path: PathBuf,
}

impl CsvOhlcvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl OhlcvSource for CsvOhlcvSource {
    fn daily_history(&self) -> Result<Vec<OhlcvRecord>> {
        let file = std::fs::File::open(&self.path)
            .with_context(|| format!("Failed to open price file {:?}", self.path))?;
        let records = read_records(file)
            .with_context(|| format!("Failed to read price file {:?}", self.path))?;
        info!("Read {} sessions from {:?}", records.len(), self.path);
        Ok(records)
    }
}

/// Parses, sorts and checks the records of any CSV reader.
pub fn read_records<R: Read>(reader: R) -> Result<Vec<OhlcvRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let mut records = Vec::new();
    for (line, result) in csv_reader.deserialize::<OhlcvRecord>().enumerate() {
        let record = result.with_context(|| format!("Invalid record at data line {}", line + 1))?;
        records.push(record);
    }

    if records.windows(2).any(|w| w[0].date > w[1].date) {
        debug!("Price rows not in ascending order, sorting");
        records.sort_by_key(|r| r.date);
    }

    if let Some(dup) = records.windows(2).find(|w| w[0].date == w[1].date) {
        bail!("Duplicate session date {}", dup[0].date);
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const HEADER: &str = "Date,Open,High,Low,Close,Volume\n";

    #[test]
    fn test_newest_first_input_is_sorted() {
        let data = format!(
            "{}2024-01-03,3,3,3,3,30\n2024-01-02 00:00:00,2,2,2,2,20\n2024-01-01,1,1,1,1,10\n",
            HEADER
        );
        let records = read_records(data.as_bytes()).unwrap();
        let dates: Vec<u32> = records.iter().map(|r| chrono::Datelike::day(&r.date)).collect();
        assert_eq!(dates, vec![1, 2, 3]);
        assert_eq!(records[1].volume, 20);
    }

    #[test]
    fn test_duplicate_date_is_rejected() {
        let data = format!("{}2024-01-01,1,1,1,1,10\n2024-01-01,1,1,1,1,10\n", HEADER);
        let err = read_records(data.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("Duplicate"));
    }

    #[test]
    fn test_bad_number_reports_line() {
        let data = format!("{}2024-01-01,1,1,1,abc,10\n", HEADER);
        let err = read_records(data.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("line 1"));
    }

    #[test]
    fn test_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prices.csv");
        std::fs::write(&path, format!("{}2024-02-01,1,2,0.5,1.5,100\n", HEADER)).unwrap();
        let records = CsvOhlcvSource::new(&path).daily_history().unwrap();
        assert_eq!(
            records,
            vec![OhlcvRecord::new(
                NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
                1.0,
                2.0,
                0.5,
                1.5,
                100
            )]
        );
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let source = CsvOhlcvSource::new("/nonexistent/prices.csv");
        assert!(source.daily_history().is_err());
    }
}
