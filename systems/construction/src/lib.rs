#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Construction proposal model: target generation, accuracy scoring, and the
//! validation gate a proposal must pass before the world pays for it.
//!
//! The scoring curve is asymmetric. Deviation is signed and the
//! logistic is centred at `+0.25`, so undershooting a target costs almost
//! nothing while overshooting it by more than a quarter collapses the score.

use geometropolis_core::{BuildingKind, ConstructionTarget, ProposalReview};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Inclusive range from which target lengths and widths are drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetRange {
    /// Smallest dimension; values below one are raised to one.
    pub min: u32,
    /// Largest dimension; values below `min` are raised to `min`.
    pub max: u32,
}

impl Default for TargetRange {
    fn default() -> Self {
        Self { min: 1, max: 100 }
    }
}

impl TargetRange {
    /// Creates a new range.
    #[must_use]
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// Effective bounds after clamping, so target area is never zero.
    #[must_use]
    pub fn bounds(&self) -> (u32, u32) {
        let min = self.min.max(1);
        (min, self.max.max(min))
    }

    /// Draws one dimension as `ceil(u × (max − min) + min)` for a uniform `u ∈ [0, 1)`.
    ///
    /// The lower bound is only produced when `u` is exactly zero, so the draw
    /// is not a uniform integer distribution.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        let (min, max) = self.bounds();
        let unit: f64 = rng.gen();
        let scaled = (unit * f64::from(max - min) + f64::from(min)).ceil();
        (scaled as u32).clamp(min, max)
    }
}

/// Generates a fresh target rectangle for the provided building.
pub fn generate_target<R: Rng + ?Sized>(
    kind: BuildingKind,
    range: TargetRange,
    rng: &mut R,
) -> ConstructionTarget {
    let length = range.draw(rng);
    let width = range.draw(rng);
    ConstructionTarget::new(kind, length, width)
}

/// Sigmoid mapping signed relative deviation onto a bounded score.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogisticCurve {
    /// Lower asymptote reached for large overshoots.
    pub floor: f64,
    /// Score awarded for an exact match.
    pub ceiling: f64,
    /// Steepness `k` of the drop around the midpoint.
    pub steepness: f64,
    /// Deviation `d0` at which the score is halfway between floor and ceiling.
    pub midpoint: f64,
}

impl Default for LogisticCurve {
    fn default() -> Self {
        Self {
            floor: 0.0,
            ceiling: 100.0,
            steepness: 25.0,
            midpoint: 0.25,
        }
    }
}

impl LogisticCurve {
    /// Scores a signed relative deviation.
    ///
    /// Zero deviation returns the ceiling exactly rather than the curve value
    /// at zero, which sits just below it.
    #[must_use]
    pub fn score(&self, deviation: f64) -> f64 {
        if deviation == 0.0 {
            return self.ceiling;
        }
        let span = self.ceiling - self.floor;
        self.floor + span / (1.0 + (self.steepness * (deviation - self.midpoint)).exp())
    }
}

/// Signed deviation of `submitted` from `target`, relative to `target`.
#[must_use]
pub fn relative_deviation(submitted: u64, target: u64) -> f64 {
    let target = target as f64;
    (submitted as f64 - target) / target
}

/// Scores a submitted area and perimeter against the target with the default curve.
#[must_use]
pub fn score(area: u64, perimeter: u64, target: &ConstructionTarget) -> f64 {
    score_with(&LogisticCurve::default(), area, perimeter, target)
}

/// Geometric mean of the area and perimeter sub-scores under `curve`.
#[must_use]
pub fn score_with(
    curve: &LogisticCurve,
    area: u64,
    perimeter: u64,
    target: &ConstructionTarget,
) -> f64 {
    let area_score = curve.score(relative_deviation(area, target.area()));
    let perimeter_score = curve.score(relative_deviation(perimeter, target.perimeter()));
    (area_score * perimeter_score).sqrt()
}

/// Rectangle entered by the player, before any validation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Proposal {
    length: i64,
    width: i64,
}

impl Proposal {
    /// Captures the raw dimensions typed by the player.
    #[must_use]
    pub const fn new(length: i64, width: i64) -> Self {
        Self { length, width }
    }

    /// Proposed length.
    #[must_use]
    pub const fn length(&self) -> i64 {
        self.length
    }

    /// Proposed width.
    #[must_use]
    pub const fn width(&self) -> i64 {
        self.width
    }

    /// Derived area, as shown in the proposal form.
    #[must_use]
    pub const fn area(&self) -> i64 {
        self.length.saturating_mul(self.width)
    }

    /// Derived perimeter, as shown in the proposal form.
    #[must_use]
    pub const fn perimeter(&self) -> i64 {
        self.length.saturating_add(self.width).saturating_mul(2)
    }

    /// Area and perimeter as unsigned costs, or `None` when a side is not positive.
    #[must_use]
    pub fn measure(&self) -> Option<Measurements> {
        if self.length <= 0 || self.width <= 0 {
            return None;
        }
        Some(Measurements {
            area: u64::try_from(self.area()).ok()?,
            perimeter: u64::try_from(self.perimeter()).ok()?,
        })
    }
}

/// Costs of a proposal with positive sides.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Measurements {
    /// Area, paid in stone.
    pub area: u64,
    /// Perimeter, paid in wood.
    pub perimeter: u64,
}

/// Ledger balances the validation gate checks against.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Stock {
    /// Available wood.
    pub wood: u64,
    /// Available stone.
    pub stone: u64,
}

/// Runs the validation gate over a proposal.
///
/// Sides must be positive; the area must cover the target area without
/// exceeding the stone stock; the perimeter must cover the target perimeter
/// without exceeding the wood stock. Area and perimeter are never valid while
/// a side is not.
#[must_use]
pub fn review(proposal: &Proposal, target: &ConstructionTarget, stock: Stock) -> ProposalReview {
    let length_valid = proposal.length() > 0;
    let width_valid = proposal.width() > 0;
    let sides_valid = length_valid && width_valid;
    ProposalReview {
        length_valid,
        width_valid,
        area_valid: sides_valid && within(proposal.area(), target.area(), stock.stone),
        perimeter_valid: sides_valid
            && within(proposal.perimeter(), target.perimeter(), stock.wood),
    }
}

fn within(value: i64, floor: u64, ceiling: u64) -> bool {
    u64::try_from(value).map_or(false, |value| value >= floor && value <= ceiling)
}
