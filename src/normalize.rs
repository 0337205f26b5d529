//! Point normalization.
//!
//! Turns raw vendor record batches into a flat sequence of [`Ping`]s:
//! coerces the numeric columns, localizes timestamps into the target
//! timezone, discards the vendor's sentinel first record, and applies the
//! configured date-range filter. The caller's batches are never mutated.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde_json::Value;

use crate::error::{CleanError, Result};
use crate::{CleanConfig, Ping, PointBatch};

/// Vendor column names (`m_arrField` entries) consumed by the pipeline.
/// Batches may carry additional vendor columns; they are ignored.
const FIELD_TIME: &str = "nTime";
const FIELD_LAT: &str = "dbLat";
const FIELD_LON: &str = "dbLon";
const FIELD_SPEED: &str = "nSpeed";

/// Normalize raw vendor batches into pings in arrival order.
///
/// A missing column or a non-numeric cell is a [`CleanError::DataFormat`].
/// An input that is empty, or empty after filtering, yields an empty vector,
/// not an error.
pub fn normalize(batches: &[PointBatch], config: &CleanConfig) -> Result<Vec<Ping>> {
    let mut pings = Vec::new();
    let mut record_no = 0usize;

    for batch in batches {
        let time_col = column(batch, FIELD_TIME, record_no)?;
        let lat_col = column(batch, FIELD_LAT, record_no)?;
        let lon_col = column(batch, FIELD_LON, record_no)?;
        let speed_col = column(batch, FIELD_SPEED, record_no)?;

        for record in &batch.records {
            let time = coerce_i64(cell(record, time_col, FIELD_TIME, record_no)?, FIELD_TIME, record_no)?;
            let latitude = coerce_f64(cell(record, lat_col, FIELD_LAT, record_no)?, FIELD_LAT, record_no)?;
            let longitude = coerce_f64(cell(record, lon_col, FIELD_LON, record_no)?, FIELD_LON, record_no)?;
            let speed = coerce_speed(cell(record, speed_col, FIELD_SPEED, record_no)?, record_no)?;
            let local_time = localize(time, &config.timezone, record_no)?;

            pings.push(Ping {
                time,
                latitude,
                longitude,
                speed,
                local_time,
                seq: 0,
            });
            record_no += 1;
        }
    }

    // The vendor prepends a placeholder record to every export.
    if !pings.is_empty() {
        pings.remove(0);
    }

    if let Some(min_date) = config.min_date {
        let floor = local_midnight(min_date, &config.timezone, "min_date")?;
        pings.retain(|p| p.local_time >= floor);
    }
    if let Some(max_date) = config.max_date {
        let ceiling = local_midnight(max_date, &config.timezone, "max_date")?;
        pings.retain(|p| p.local_time <= ceiling);
    }

    // Sequence indices stay dense after filtering.
    for (seq, ping) in pings.iter_mut().enumerate() {
        ping.seq = seq;
    }

    Ok(pings)
}

/// Local midnight of `date` in `tz`, used as an inclusive filter bound.
fn local_midnight(date: NaiveDate, tz: &Tz, field: &str) -> Result<DateTime<Tz>> {
    date.and_time(NaiveTime::MIN)
        .and_local_timezone(*tz)
        .earliest()
        .ok_or_else(|| CleanError::data_format(field, 0, "no midnight in target timezone"))
}

fn localize(time: i64, tz: &Tz, record_no: usize) -> Result<DateTime<Tz>> {
    Utc.timestamp_opt(time, 0)
        .single()
        .map(|utc| utc.with_timezone(tz))
        .ok_or_else(|| CleanError::data_format(FIELD_TIME, record_no, "timestamp out of range"))
}

fn column(batch: &PointBatch, name: &str, record_no: usize) -> Result<usize> {
    batch
        .fields
        .iter()
        .position(|f| f == name)
        .ok_or_else(|| CleanError::data_format(name, record_no, "column missing from batch"))
}

fn cell<'a>(record: &'a [Value], idx: usize, field: &str, record_no: usize) -> Result<&'a Value> {
    record
        .get(idx)
        .ok_or_else(|| CleanError::data_format(field, record_no, "record shorter than header"))
}

fn coerce_i64(value: &Value, field: &str, record_no: usize) -> Result<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| CleanError::data_format(field, record_no, "not an integer")),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|e| CleanError::data_format(field, record_no, e.to_string())),
        other => Err(CleanError::data_format(
            field,
            record_no,
            format!("expected number, got {other}"),
        )),
    }
}

fn coerce_f64(value: &Value, field: &str, record_no: usize) -> Result<f64> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| CleanError::data_format(field, record_no, "not a float")),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|e| CleanError::data_format(field, record_no, e.to_string())),
        other => Err(CleanError::data_format(
            field,
            record_no,
            format!("expected number, got {other}"),
        )),
    }
}

fn coerce_speed(value: &Value, record_no: usize) -> Result<u32> {
    let speed = coerce_i64(value, FIELD_SPEED, record_no)?;
    u32::try_from(speed)
        .map_err(|_| CleanError::data_format(FIELD_SPEED, record_no, "negative speed"))
}
