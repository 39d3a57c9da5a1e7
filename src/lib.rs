//! Swing-based support and resistance level detection over OHLC bars.
//!
//! The [`analysis`] pipeline is pure: swing extraction, a break filter and
//! first-fit level clustering. The remaining modules load bars from CSV and
//! present or export the results.

pub mod analysis;
pub mod config;
pub mod data;
pub mod loader;
pub mod output;
pub mod render;

pub use analysis::{analyze, Analysis};
pub use data::{Bar, Level, LevelKind, LevelRow, SwingKind, SwingPoint, SwingSet};
