use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime};
use chrono_tz::Tz;
use serde::Serialize;

use crate::analysis::Analysis;
use crate::config::Timeframe;
use crate::data::{Bar, LevelKind, SwingPoint};

const RESISTANCE_COLOR: &str = "#f72585";
const SUPPORT_MARKER_COLOR: &str = "#4cc9f0";
const SUPPORT_LINE_COLOR: &str = "#4361ee";

/// Marker distance from the bar as a fraction of its high-low range.
pub const MARKER_OFFSET_RATIO: f64 = 0.2;

/// Arrow length in screen units; negative points the arrow down onto the bar.
const ARROW_OFFSET: i32 = 20;

#[derive(Debug, Clone, Serialize)]
pub struct Candle {
    pub timestamp: DateTime<Tz>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

/// Annotation pinned to one surviving swing point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub timestamp: DateTime<Tz>,
    pub y: f64,
    pub kind: LevelKind,
    pub text: &'static str,
    pub color: &'static str,
    pub arrow_offset: i32,
    pub anchor: &'static str,
}

/// Horizontal line drawn for a multi-touch level.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    pub x0: NaiveDateTime,
    pub x1: NaiveDateTime,
    pub y: f64,
    pub kind: LevelKind,
    pub color: &'static str,
    pub width: u8,
    pub dash: &'static str,
    pub opacity: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Chart {
    pub title: String,
    pub x_axis_title: String,
    pub y_axis_title: &'static str,
    pub candles: Vec<Candle>,
    pub markers: Vec<Marker>,
    pub segments: Vec<Segment>,
}

pub fn build_chart(symbol: &str, timeframe: Timeframe, bars: &[Bar], analysis: &Analysis) -> Chart {
    let zone = bars
        .first()
        .map(|bar| bar.timestamp.timezone().name().to_string())
        .unwrap_or_else(|| "UTC".to_string());

    let candles = bars
        .iter()
        .map(|bar| Candle {
            timestamp: bar.timestamp,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
        })
        .collect();

    let markers = analysis
        .swings
        .detection_order()
        .filter_map(|swing| bars.get(swing.index).map(|bar| marker_for(swing, bar)))
        .collect();

    let segments = analysis
        .levels
        .iter()
        .map(|level| Segment {
            x0: level.start,
            x1: level.end,
            y: level.price,
            kind: level.kind,
            color: match level.kind {
                LevelKind::Support => SUPPORT_LINE_COLOR,
                LevelKind::Resistance => RESISTANCE_COLOR,
            },
            width: 2,
            dash: "dashdot",
            opacity: 0.7,
        })
        .collect();

    Chart {
        title: format!("{symbol} {timeframe} Smart Money Support & Resistance"),
        x_axis_title: format!("Date ({zone})"),
        y_axis_title: "Price",
        candles,
        markers,
        segments,
    }
}

pub fn marker_for(swing: &SwingPoint, bar: &Bar) -> Marker {
    let offset = bar.range() * MARKER_OFFSET_RATIO;
    match swing.kind.level_kind() {
        LevelKind::Resistance => Marker {
            timestamp: bar.timestamp,
            y: bar.high + offset,
            kind: LevelKind::Resistance,
            text: "RES",
            color: RESISTANCE_COLOR,
            arrow_offset: -ARROW_OFFSET,
            anchor: "bottom",
        },
        LevelKind::Support => Marker {
            timestamp: bar.timestamp,
            y: bar.low - offset,
            kind: LevelKind::Support,
            text: "SUP",
            color: SUPPORT_MARKER_COLOR,
            arrow_offset: ARROW_OFFSET,
            anchor: "top",
        },
    }
}

pub fn write_chart_json<P: AsRef<Path>>(chart: &Chart, path: P) -> Result<()> {
    let path_ref = path.as_ref();
    let file = File::create(path_ref).with_context(|| format!("failed to create {:?}", path_ref))?;
    serde_json::to_writer_pretty(BufWriter::new(file), chart)
        .with_context(|| format!("failed to write chart to {:?}", path_ref))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::analysis::swings::swing_at;
    use crate::analysis::test_util::bars_from_hl;
    use crate::data::{Level, SwingKind, SwingSet};

    #[test]
    fn markers_sit_outside_the_bar() {
        let bars = bars_from_hl(&[(110.0, 100.0)]);
        let high = marker_for(&swing_at(&bars, 0, SwingKind::High), &bars[0]);
        let low = marker_for(&swing_at(&bars, 0, SwingKind::Low), &bars[0]);

        assert_relative_eq!(high.y, 112.0);
        assert_eq!(high.text, "RES");
        assert_eq!(high.anchor, "bottom");
        assert!(high.arrow_offset < 0);

        assert_relative_eq!(low.y, 98.0);
        assert_eq!(low.text, "SUP");
        assert_eq!(low.color, SUPPORT_MARKER_COLOR);
        assert!(low.arrow_offset > 0);
    }

    #[test]
    fn chart_has_one_segment_per_level_and_one_marker_per_swing() {
        let bars = bars_from_hl(&[(12.0, 10.0), (12.2, 9.0), (11.0, 10.1), (12.1, 9.5)]);
        let highs = vec![swing_at(&bars, 1, SwingKind::High), swing_at(&bars, 3, SwingKind::High)];
        let lows = vec![swing_at(&bars, 2, SwingKind::Low)];
        let level = Level {
            kind: LevelKind::Support,
            price: 12.2,
            members: highs.clone(),
            start: bars[1].timestamp.naive_local(),
            end: bars[3].timestamp.naive_local(),
        };
        let analysis = Analysis {
            swings: SwingSet { highs, lows },
            rows: Vec::new(),
            levels: vec![level],
            tolerance: 0.11,
        };

        let chart = build_chart("BTC-USD", Timeframe::H1, &bars, &analysis);
        assert_eq!(chart.title, "BTC-USD 1h Smart Money Support & Resistance");
        assert_eq!(chart.x_axis_title, "Date (UTC)");
        assert_eq!(chart.candles.len(), 4);
        assert_eq!(chart.markers.len(), 3);
        assert_eq!(chart.segments.len(), 1);
        assert_eq!(chart.segments[0].color, SUPPORT_LINE_COLOR);
        assert_eq!(chart.segments[0].dash, "dashdot");
        assert_eq!(chart.segments[0].x1, bars[3].timestamp.naive_local());
    }
}
