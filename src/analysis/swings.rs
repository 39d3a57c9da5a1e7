use tracing::debug;

use crate::data::{Bar, SwingKind, SwingPoint, SwingSet};

/// Detect swing highs and lows using a symmetric `left`/`right` window.
///
/// A bar qualifies when its high (low) equals the extreme of the closed window
/// `[i - left, i + right]`. Tied extremes all qualify. The first `left` and last
/// `right` bars never qualify, and a series of `left + right` bars or fewer
/// yields an empty set.
pub fn detect_swings(bars: &[Bar], left: usize, right: usize) -> SwingSet {
    let n = bars.len();
    if n <= left + right {
        debug!(bars = n, left, right, "not enough bars for swing window");
        return SwingSet::default();
    }

    let mut set = SwingSet::default();
    for idx in left..n - right {
        let window = &bars[idx - left..=idx + right];
        let bar = &bars[idx];

        let window_high = window.iter().map(|b| b.high).fold(f64::MIN, f64::max);
        if bar.high == window_high {
            set.highs.push(swing_at(bars, idx, SwingKind::High));
        }

        let window_low = window.iter().map(|b| b.low).fold(f64::MAX, f64::min);
        if bar.low == window_low {
            set.lows.push(swing_at(bars, idx, SwingKind::Low));
        }
    }

    debug!(
        highs = set.highs.len(),
        lows = set.lows.len(),
        "swing extraction complete"
    );
    set
}

pub(crate) fn swing_at(bars: &[Bar], index: usize, kind: SwingKind) -> SwingPoint {
    let bar = &bars[index];
    let price = match kind {
        SwingKind::High => bar.high,
        SwingKind::Low => bar.low,
    };
    SwingPoint {
        index,
        kind,
        price,
        timestamp: bar.timestamp,
    }
}
