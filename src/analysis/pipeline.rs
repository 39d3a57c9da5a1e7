use serde::Serialize;
use tracing::debug;

use crate::analysis::breaks::filter_breaks;
use crate::analysis::clustering::{cluster_levels, tolerance_for};
use crate::analysis::swings::detect_swings;
use crate::data::{Bar, Level, LevelKind, LevelRow, SwingSet};

/// Everything one run of the pipeline produces.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Analysis {
    /// Swing points that survived the break filter, highs then lows.
    pub swings: SwingSet,
    /// Results table, sorted by date then time.
    pub rows: Vec<LevelRow>,
    /// Multi-touch levels.
    pub levels: Vec<Level>,
    pub tolerance: f64,
}

impl Analysis {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn count(&self, kind: LevelKind) -> usize {
        self.rows.iter().filter(|row| row.kind == kind).count()
    }
}

/// Run swing extraction, break filtering and clustering over `bars`.
///
/// Never fails: empty or short input produces an empty [`Analysis`].
pub fn analyze(bars: &[Bar], left: usize, right: usize) -> Analysis {
    let detected = detect_swings(bars, left, right);
    let swings = filter_breaks(bars, &detected);
    let tolerance = tolerance_for(bars);
    let levels = cluster_levels(swings.detection_order(), tolerance);

    let mut rows: Vec<LevelRow> = swings.detection_order().map(LevelRow::from).collect();
    rows.sort_by(|a, b| (&a.date, &a.time).cmp(&(&b.date, &b.time)));

    debug!(
        bars = bars.len(),
        swings = swings.len(),
        levels = levels.len(),
        "analysis complete"
    );
    Analysis {
        swings,
        rows,
        levels,
        tolerance,
    }
}
