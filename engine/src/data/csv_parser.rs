use csv::{ReaderBuilder, StringRecord};
use shared::models::Bar; // Using the Bar model from the shared crate
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::EngineError;

// Formats used by the daily-quote store ("20240102") and by exported sheets ("2024-01-02").
pub mod quote_format {
    use anyhow::{anyhow, Result};
    use chrono::NaiveDate;

    pub fn parse_trade_date(s: &str) -> Result<NaiveDate> {
        let s = s.trim();
        NaiveDate::parse_from_str(s, "%Y%m%d")
            .or_else(|_| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
            .map_err(|e| anyhow!("Failed to parse date '{}': {}", s, e))
    }

    pub fn parse_number(s: &str) -> Result<f64> {
        s.trim()
            .parse::<f64>()
            .map_err(|e| anyhow!("Failed to parse number '{}': {}", s, e))
    }

}

pub struct DailyCsvParser;

impl DailyCsvParser {
    // CSV Header (daily quotes): ts_code,trade_date,open,high,low,close,pre_close,change,pct_chg,vol,amount
    // Example Row: 000001.SZ,20240102,9.39,9.42,9.21,9.21,9.39,-0.18,-1.9169,1158366.45,1075742.252
    pub fn load_bars_from_csv<P: AsRef<Path>>(file_path: P) -> Result<Vec<Bar>, EngineError> {
        let path = file_path.as_ref();
        let file = File::open(path).inspect_err(|e| {
            tracing::error!(path = %path.display(), error_detail = %e, "Failed to open CSV file");
        })?;
        let bars = Self::parse_bars(BufReader::new(file))?;
        tracing::debug!(path = %path.display(), count = bars.len(), "Loaded daily bars");
        Ok(bars)
    }

    /// Parses rows into bars sorted ascending by date. Duplicate dates are kept.
    pub fn parse_bars<R: Read>(reader: R) -> Result<Vec<Bar>, EngineError> {
        let mut rdr = ReaderBuilder::new()
            .delimiter(b',')
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        let date_col = Self::column(&headers, &["trade_date", "date"])?;
        let open_col = Self::column(&headers, &["open"])?;
        let high_col = Self::column(&headers, &["high"])?;
        let low_col = Self::column(&headers, &["low"])?;
        let close_col = Self::column(&headers, &["close"])?;
        let volume_col = Self::column(&headers, &["vol", "volume"])?;

        let mut bars = Vec::new();
        for (idx, result) in rdr.records().enumerate() {
            let line = idx + 2; // header is line 1
            let record = result?;

            let date = quote_format::parse_trade_date(Self::field(&record, date_col.0, line)?)
                .map_err(|e| EngineError::CsvDataFormatError(format!("Error parsing 'trade_date' at line {}: {}", line, e)))?;
            let number = |col: (usize, &str)| -> Result<f64, EngineError> {
                quote_format::parse_number(Self::field(&record, col.0, line)?).map_err(|e| {
                    EngineError::CsvDataFormatError(format!("Error parsing '{}' at line {}: {}", col.1, line, e))
                })
            };

            bars.push(Bar {
                date,
                open: number(open_col)?,
                high: number(high_col)?,
                low: number(low_col)?,
                close: number(close_col)?,
                volume: number(volume_col)?,
            });
        }

        // The quote store returns newest first.
        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }

    fn column(headers: &StringRecord, names: &[&'static str]) -> Result<(usize, &'static str), EngineError> {
        names
            .iter()
            .find_map(|name| headers.iter().position(|h| h.eq_ignore_ascii_case(name)).map(|pos| (pos, *name)))
            .ok_or_else(|| EngineError::CsvDataFormatError(format!("Missing '{}' column in CSV header", names[0])))
    }

    fn field<'a>(record: &'a StringRecord, col: usize, line: usize) -> Result<&'a str, EngineError> {
        record
            .get(col)
            .ok_or_else(|| EngineError::CsvDataFormatError(format!("Missing field {} at line {}", col + 1, line)))
    }
}
