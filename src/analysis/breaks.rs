use tracing::debug;

use crate::data::{Bar, SwingKind, SwingPoint, SwingSet};

/// Running extremes of everything strictly before each bar.
///
/// `prior_high[i]` is the maximum high over `bars[..i]` and `prior_low[i]` the
/// minimum low; both are `None` at index 0.
#[derive(Debug, Clone)]
pub struct PrefixExtremes {
    pub prior_high: Vec<Option<f64>>,
    pub prior_low: Vec<Option<f64>>,
}

pub fn prefix_extremes(bars: &[Bar]) -> PrefixExtremes {
    let mut prior_high = Vec::with_capacity(bars.len());
    let mut prior_low = Vec::with_capacity(bars.len());
    let mut running_high: Option<f64> = None;
    let mut running_low: Option<f64> = None;

    for bar in bars {
        prior_high.push(running_high);
        prior_low.push(running_low);
        running_high = Some(running_high.map_or(bar.high, |h| h.max(bar.high)));
        running_low = Some(running_low.map_or(bar.low, |l| l.min(bar.low)));
    }

    PrefixExtremes {
        prior_high,
        prior_low,
    }
}

/// Keep only swing points that earlier price action already traded through.
///
/// A high survives when some earlier bar printed a strictly higher high; a low
/// survives when some earlier bar printed a strictly lower low.
pub fn filter_breaks(bars: &[Bar], swings: &SwingSet) -> SwingSet {
    let extremes = prefix_extremes(bars);
    let keep = |point: &&SwingPoint| is_retained(&extremes, point);

    let filtered = SwingSet {
        highs: swings.highs.iter().filter(keep).cloned().collect(),
        lows: swings.lows.iter().filter(keep).cloned().collect(),
    };
    debug!(
        before = swings.len(),
        after = filtered.len(),
        "break filter applied"
    );
    filtered
}

fn is_retained(extremes: &PrefixExtremes, point: &SwingPoint) -> bool {
    match point.kind {
        SwingKind::High => extremes
            .prior_high
            .get(point.index)
            .copied()
            .flatten()
            .is_some_and(|prior| prior > point.price),
        SwingKind::Low => extremes
            .prior_low
            .get(point.index)
            .copied()
            .flatten()
            .is_some_and(|prior| prior < point.price),
    }
}
