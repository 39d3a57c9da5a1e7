use chrono::{DateTime, NaiveDateTime, Timelike};
use chrono_tz::Tz;
use serde::Serialize;

/// Single OHLC bar, already localized to the display timezone.
#[derive(Debug, Clone, Serialize)]
pub struct Bar {
    pub timestamp: DateTime<Tz>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    /// High-low range of the bar.
    pub fn range(&self) -> f64 {
        self.high - self.low
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SwingKind {
    High,
    Low,
}

impl SwingKind {
    pub fn level_kind(self) -> LevelKind {
        match self {
            SwingKind::High => LevelKind::Resistance,
            SwingKind::Low => LevelKind::Support,
        }
    }
}

/// Local extremum found by the swing extractor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SwingPoint {
    pub index: usize,
    pub kind: SwingKind,
    pub price: f64,
    pub timestamp: DateTime<Tz>,
}

impl SwingPoint {
    /// Local wall-clock time truncated to the minute, the resolution the
    /// results table reports at.
    pub fn minute_stamp(&self) -> NaiveDateTime {
        let local = self.timestamp.naive_local();
        local
            .with_second(0)
            .and_then(|dt| dt.with_nanosecond(0))
            .unwrap_or(local)
    }
}

/// Swing points split by kind, each list in ascending index order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SwingSet {
    pub highs: Vec<SwingPoint>,
    pub lows: Vec<SwingPoint>,
}

impl SwingSet {
    pub fn len(&self) -> usize {
        self.highs.len() + self.lows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.highs.is_empty() && self.lows.is_empty()
    }

    /// Highs first, then lows. Clustering is sensitive to this order.
    pub fn detection_order(&self) -> impl Iterator<Item = &SwingPoint> {
        self.highs.iter().chain(self.lows.iter())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LevelKind {
    Support,
    Resistance,
}

impl LevelKind {
    pub fn as_str(self) -> &'static str {
        match self {
            LevelKind::Support => "Support",
            LevelKind::Resistance => "Resistance",
        }
    }
}

/// Multi-touch price level produced by the clusterer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Level {
    pub kind: LevelKind,
    pub price: f64,
    pub members: Vec<SwingPoint>,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl Level {
    pub fn touches(&self) -> usize {
        self.members.len()
    }
}

/// One line of the results table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelRow {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Time")]
    pub time: String,
    #[serde(rename = "Type")]
    pub kind: LevelKind,
    #[serde(rename = "Price")]
    pub price: f64,
    #[serde(rename = "Candle")]
    pub candle: usize,
}

impl From<&SwingPoint> for LevelRow {
    fn from(swing: &SwingPoint) -> Self {
        Self {
            date: swing.timestamp.format("%Y-%m-%d").to_string(),
            time: swing.timestamp.format("%H:%M").to_string(),
            kind: swing.kind.level_kind(),
            price: swing.price,
            candle: swing.index,
        }
    }
}
