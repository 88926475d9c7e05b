//! Bar series input: CSV loading/writing and synthetic demo data.
//!
//! The CSV layout is the converter's output format: a header row of
//! `datetime,open,high,low,close,volume` with `%Y-%m-%d %H:%M:%S` UTC
//! timestamps. Malformed rows are load errors, never silently skipped —
//! the engine would reject them anyway.

use breaklab_core::Bar;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("row {row}: {message}")]
    Malformed { row: usize, message: String },
}

/// CSV row shape, kept separate from the engine's `Bar` so the file format
/// stays an I/O concern.
#[derive(Debug, Serialize, Deserialize)]
struct CsvBar {
    datetime: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

/// Load base-resolution bars from a CSV file, in file order.
pub fn load_bars_csv(path: impl AsRef<Path>) -> Result<Vec<Bar>, LoadError> {
    let mut reader = csv::Reader::from_path(path.as_ref())?;
    let mut bars = Vec::new();
    for (index, record) in reader.deserialize::<CsvBar>().enumerate() {
        let row = index + 2; // 1-based, after the header
        let record = record?;
        let naive = NaiveDateTime::parse_from_str(&record.datetime, DATETIME_FORMAT)
            .map_err(|e| LoadError::Malformed {
                row,
                message: format!("bad datetime {:?}: {}", record.datetime, e),
            })?;
        bars.push(Bar {
            timestamp: Utc.from_utc_datetime(&naive),
            open: record.open,
            high: record.high,
            low: record.low,
            close: record.close,
            volume: record.volume,
        });
    }
    Ok(bars)
}

/// Write bars to a CSV file in the same layout `load_bars_csv` reads.
pub fn write_bars_csv(path: impl AsRef<Path>, bars: &[Bar]) -> Result<(), LoadError> {
    let mut writer = csv::Writer::from_path(path.as_ref())?;
    for bar in bars {
        writer.serialize(CsvBar {
            datetime: bar.timestamp.format(DATETIME_FORMAT).to_string(),
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
        })?;
    }
    writer.flush()?;
    Ok(())
}

/// Seeded synthetic 5-minute series: a random walk around 2000 with small
/// wicks, the demo-data generator's shape. Deterministic per seed.
pub fn synthetic_bars(n: usize, seed: u64) -> Vec<Bar> {
    let mut rng = StdRng::seed_from_u64(seed);
    let start: DateTime<Utc> = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();

    let mut bars = Vec::with_capacity(n);
    let mut close = 2_000.0_f64;
    for i in 0..n {
        let open = close;
        close += rng.gen_range(-0.6..0.6);
        let high = open.max(close) + rng.gen_range(0.0..0.25);
        let low = open.min(close) - rng.gen_range(0.0..0.25);
        bars.push(Bar {
            timestamp: start + chrono::Duration::minutes(5 * i as i64),
            open,
            high,
            low,
            close,
            volume: rng.gen_range(50.0_f64..200.0_f64).round(),
        });
    }
    bars
}
