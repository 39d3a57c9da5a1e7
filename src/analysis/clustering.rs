use itertools::{Itertools, MinMaxResult};
use statrs::statistics::Statistics;
use tracing::debug;

use crate::data::{Bar, Level, SwingPoint};

/// Fraction of the mean close used as the clustering tolerance.
pub const TOLERANCE_RATIO: f64 = 0.01;

/// Minimum number of swing points a cluster needs to become a level.
pub const MIN_TOUCHES: usize = 2;

/// Clustering tolerance: 1% of the mean close over the whole series.
pub fn tolerance_for(bars: &[Bar]) -> f64 {
    if bars.is_empty() {
        return 0.0;
    }
    TOLERANCE_RATIO * bars.iter().map(|bar| bar.close).mean()
}

#[derive(Debug)]
struct Cluster<'a> {
    key: f64,
    members: Vec<&'a SwingPoint>,
}

/// Group swing points into levels with first-fit assignment.
///
/// Points are taken in the order given. Each joins the first open cluster
/// whose key lies strictly within `tolerance` of its price, or opens a new
/// cluster keyed by its own price. Only clusters with at least
/// [`MIN_TOUCHES`] members become levels. A cluster may mix highs and lows;
/// its kind comes from its first member.
pub fn cluster_levels<'a, I>(points: I, tolerance: f64) -> Vec<Level>
where
    I: IntoIterator<Item = &'a SwingPoint>,
{
    let mut clusters: Vec<Cluster<'a>> = Vec::new();

    for point in points {
        let price = point.price;
        if let Some(cluster) = clusters
            .iter_mut()
            .find(|cluster| (cluster.key - price).abs() < tolerance)
        {
            cluster.members.push(point);
            continue;
        }

        // A repeated key restarts that cluster in place; only a non-positive
        // tolerance can get here.
        match clusters.iter_mut().find(|cluster| cluster.key == price) {
            Some(cluster) => cluster.members = vec![point],
            None => clusters.push(Cluster {
                key: price,
                members: vec![point],
            }),
        }
    }

    let opened = clusters.len();
    let levels: Vec<Level> = clusters
        .into_iter()
        .filter(|cluster| cluster.members.len() >= MIN_TOUCHES)
        .filter_map(into_level)
        .collect();
    debug!(
        clusters = opened,
        levels = levels.len(),
        tolerance,
        "level clustering complete"
    );
    levels
}

fn into_level(cluster: Cluster<'_>) -> Option<Level> {
    let first = cluster.members.first()?;
    let kind = first.kind.level_kind();
    let (start, end) = match cluster.members.iter().map(|m| m.minute_stamp()).minmax() {
        MinMaxResult::NoElements => return None,
        MinMaxResult::OneElement(stamp) => (stamp, stamp),
        MinMaxResult::MinMax(min, max) => (min, max),
    };

    Some(Level {
        kind,
        price: cluster.key,
        members: cluster.members.into_iter().cloned().collect(),
        start,
        end,
    })
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::analysis::test_util::{bars_from_closes, hourly};
    use crate::data::{LevelKind, SwingKind};

    fn point(index: usize, kind: SwingKind, price: f64) -> SwingPoint {
        SwingPoint {
            index,
            kind,
            price,
            timestamp: hourly(index),
        }
    }

    #[test]
    fn tolerance_is_one_percent_of_mean_close() {
        let bars = bars_from_closes(&[90.0, 100.0, 110.0]);
        assert_relative_eq!(tolerance_for(&bars), 1.0, epsilon = 1e-12);
        assert_eq!(tolerance_for(&[]), 0.0);
    }

    #[test]
    fn near_prices_merge_and_singletons_drop() {
        let points = vec![
            point(3, SwingKind::High, 100.0),
            point(7, SwingKind::High, 100.3),
            point(9, SwingKind::High, 150.0),
        ];
        let levels = cluster_levels(&points, 1.0);
        assert_eq!(levels.len(), 1);
        let level = &levels[0];
        assert_eq!(level.price, 100.0);
        assert_eq!(level.touches(), 2);
        assert_eq!(level.kind, LevelKind::Resistance);
        assert_eq!(level.start, hourly(3).naive_local());
        assert_eq!(level.end, hourly(7).naive_local());
    }

    #[test]
    fn tolerance_boundary_is_exclusive() {
        let points = vec![
            point(1, SwingKind::Low, 100.0),
            point(2, SwingKind::Low, 101.0),
        ];
        assert!(cluster_levels(&points, 1.0).is_empty());
    }

    #[test]
    fn assignment_is_first_fit_not_nearest() {
        // 100.9 is nearer to 101.5 but 100.0 was opened first.
        let points = vec![
            point(1, SwingKind::High, 100.0),
            point(2, SwingKind::High, 101.5),
            point(3, SwingKind::High, 100.9),
            point(4, SwingKind::High, 101.6),
        ];
        let levels = cluster_levels(&points, 1.0);
        assert_eq!(levels.len(), 2);
        assert_eq!(levels[0].price, 100.0);
        assert_eq!(
            levels[0].members.iter().map(|m| m.index).collect::<Vec<_>>(),
            vec![1, 3]
        );
        assert_eq!(levels[1].price, 101.5);
    }

    #[test]
    fn mixed_cluster_takes_first_member_kind() {
        let points = vec![
            point(8, SwingKind::High, 100.0),
            point(2, SwingKind::Low, 100.4),
        ];
        let levels = cluster_levels(&points, 1.0);
        assert_eq!(levels.len(), 1);
        assert_eq!(levels[0].kind, LevelKind::Resistance);
        assert_eq!(levels[0].start, hourly(2).naive_local());
        assert_eq!(levels[0].end, hourly(8).naive_local());
    }

    #[test]
    fn zero_tolerance_restarts_repeated_key() {
        let points = vec![
            point(1, SwingKind::Low, 0.0),
            point(2, SwingKind::Low, 0.0),
            point(3, SwingKind::Low, 0.0),
        ];
        assert!(cluster_levels(&points, 0.0).is_empty());
    }
}
