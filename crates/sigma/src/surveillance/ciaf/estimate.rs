use super::config::CiafConfig;
use serde::Serialize;
use std::ops::AddAssign;

/// Estimated sizes of the mutually exclusive failure groups.
///
/// Letters follow the Svedberg/Nandy typology; group A (no failure) is the
/// population remainder and is not stored here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CiafGroups {
    /// B
    pub wasting_only: u64,
    /// C
    pub wasting_underweight: u64,
    /// D
    pub triple_failure: u64,
    /// E
    pub stunting_underweight: u64,
    /// F
    pub stunting_only: u64,
    /// Y
    pub underweight_only: u64,
}

impl CiafGroups {
    pub fn total(&self) -> u64 {
        [
            self.wasting_only,
            self.wasting_underweight,
            self.triple_failure,
            self.stunting_underweight,
            self.stunting_only,
            self.underweight_only,
        ]
        .into_iter()
        .fold(0u64, u64::saturating_add)
    }

    /// Weighted burden: triple failure counts three times, C twice, E once.
    pub fn weighted_burden(&self) -> u64 {
        self.triple_failure
            .saturating_mul(3)
            .saturating_add(self.wasting_underweight.saturating_mul(2))
            .saturating_add(self.stunting_underweight)
    }
}

// Counts come from floored report cells and can be arbitrarily large; sums saturate.
impl AddAssign for CiafGroups {
    fn add_assign(&mut self, other: Self) {
        self.wasting_only = self.wasting_only.saturating_add(other.wasting_only);
        self.wasting_underweight = self
            .wasting_underweight
            .saturating_add(other.wasting_underweight);
        self.triple_failure = self.triple_failure.saturating_add(other.triple_failure);
        self.stunting_underweight = self
            .stunting_underweight
            .saturating_add(other.stunting_underweight);
        self.stunting_only = self.stunting_only.saturating_add(other.stunting_only);
        self.underweight_only = self.underweight_only.saturating_add(other.underweight_only);
    }
}

/// Split stunted/wasted/underweight counts into exclusive groups.
///
/// Steps run in a fixed order, each floored and clamped at zero. Apply per
/// village-month row and sum; the heuristic is not linear in its inputs.
pub fn estimate_groups(
    stunted: u64,
    wasted: u64,
    underweight: u64,
    config: &CiafConfig,
) -> CiafGroups {
    let s = to_signed(stunted);
    let w = to_signed(wasted);
    let u = to_signed(underweight);

    let triple = floor_scaled(s.min(w).min(u), config.triple_failure_factor);
    let stunting_underweight = floor_scaled(s, config.stunting_underweight_factor)
        .saturating_sub(triple)
        .max(0);
    let wasting_underweight = floor_scaled(w, config.wasting_underweight_factor)
        .saturating_sub(triple)
        .max(0);
    let stunting_only = s
        .saturating_sub(stunting_underweight)
        .saturating_sub(triple)
        .max(0);
    let wasting_only = w
        .saturating_sub(wasting_underweight)
        .saturating_sub(triple)
        .max(0);
    let underweight_only = u
        .saturating_sub(stunting_underweight)
        .saturating_sub(wasting_underweight)
        .saturating_sub(triple)
        .max(0);

    CiafGroups {
        wasting_only: wasting_only as u64,
        wasting_underweight: wasting_underweight as u64,
        triple_failure: triple as u64,
        stunting_underweight: stunting_underweight as u64,
        stunting_only: stunting_only as u64,
        underweight_only: underweight_only as u64,
    }
}

/// Whole-child count from a reported cell; negatives and NaN become zero.
pub(crate) fn count(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        value.floor() as u64
    } else {
        0
    }
}

fn to_signed(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn floor_scaled(value: i64, factor: f64) -> i64 {
    let scaled = (value as f64 * factor).floor();
    if scaled.is_finite() && scaled > 0.0 {
        scaled as i64
    } else {
        0
    }
}
