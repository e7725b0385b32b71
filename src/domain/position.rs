//! Long/flat position generation from a fast/slow moving-average pair.
//!
//! The position held on bar t is decided by the averages at bar t-1, so a bar's
//! own close never influences the position that earns its return.

use crate::domain::indicator::IndicatorSeries;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Position {
    #[default]
    Flat,
    Long,
}

impl Position {
    /// Exposure multiplier applied to the bar return: 0.0 or 1.0.
    pub fn exposure(&self) -> f64 {
        match self {
            Position::Flat => 0.0,
            Position::Long => 1.0,
        }
    }
}

/// Position per bar; `len` is the price series length.
///
/// Bars missing from either series, or where either average is still warming
/// up, count as no signal and produce `Flat`.
pub fn generate_positions(fast: &IndicatorSeries, slow: &IndicatorSeries, len: usize) -> Vec<Position> {
    (0..len)
        .map(|t| {
            if t == 0 {
                return Position::Flat;
            }
            match (fast.get(t - 1), slow.get(t - 1)) {
                (Some(f), Some(s)) if f > s => Position::Long,
                _ => Position::Flat,
            }
        })
        .collect()
}

/// True on every bar where the position differs from the previous bar.
/// The first bar never trades since the position before it is taken as its own.
pub fn trade_flags(positions: &[Position]) -> Vec<bool> {
    let mut flags = Vec::with_capacity(positions.len());
    let mut prev: Option<Position> = None;
    for &pos in positions {
        flags.push(prev.is_some_and(|p| p != pos));
        prev = Some(pos);
    }
    flags
}
