#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone};
use chrono_tz::{Tz, UTC};
use swing_levels::Bar;

pub const FIXTURE_PATH: &str = "tests/fixtures/v_hourly.csv";

pub fn hourly(index: usize) -> DateTime<Tz> {
    UTC.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::hours(index as i64)
}

/// Bars from lows, each with a one-point range and the close mid-bar.
pub fn bars_from_lows(lows: &[f64]) -> Vec<Bar> {
    lows.iter()
        .enumerate()
        .map(|(idx, &low)| Bar {
            timestamp: hourly(idx),
            open: low + 0.5,
            high: low + 1.0,
            low,
            close: low + 0.5,
            volume: 0.0,
        })
        .collect()
}

/// Ten descending bars then ten ascending, trough at index 9.
pub fn v_shape() -> Vec<Bar> {
    let lows: Vec<f64> = (0..20)
        .map(|i| if i < 10 { 110.0 - i as f64 } else { 92.0 + i as f64 })
        .collect();
    bars_from_lows(&lows)
}

/// Strictly rising for `half` bars, then strictly falling.
pub fn rise_then_fall(half: usize) -> Vec<Bar> {
    let lows: Vec<f64> = (0..half)
        .map(|i| 100.0 + i as f64)
        .chain((0..half).map(|i| 100.0 + half as f64 - 2.0 - i as f64))
        .collect();
    bars_from_lows(&lows)
}

/// Bars from `(high, low, close)` triples; open equals close.
pub fn bars_from_hlc(triples: &[(f64, f64, f64)]) -> Vec<Bar> {
    triples
        .iter()
        .enumerate()
        .map(|(idx, &(high, low, close))| Bar {
            timestamp: hourly(idx),
            open: close,
            high,
            low,
            close,
            volume: 0.0,
        })
        .collect()
}
