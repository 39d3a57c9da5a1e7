pub mod breaks;
pub mod clustering;
pub mod pipeline;
pub mod swings;

#[cfg(test)]
pub(crate) mod test_util;

pub use breaks::{filter_breaks, prefix_extremes, PrefixExtremes};
pub use clustering::{cluster_levels, tolerance_for};
pub use pipeline::{analyze, Analysis};
pub use swings::detect_swings;
