//! Scatters collectible nodes across the play area without overlap.

use geometropolis_core::Tier;
use rand::{seq::SliceRandom, Rng};
use tracing::warn;

use crate::profile::{LayoutTuning, ResourceProfile};

/// Position of a node in play-area pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodePlacement {
    /// Tier of the node.
    pub tier: Tier,
    /// Horizontal centre.
    pub x: f32,
    /// Vertical centre.
    pub y: f32,
}

impl NodePlacement {
    /// Creates a placement centred on `(x, y)`.
    #[must_use]
    pub const fn new(tier: Tier, x: f32, y: f32) -> Self {
        Self { tier, x, y }
    }
}

pub(crate) struct Scatter {
    pub(crate) placements: Vec<NodePlacement>,
    pub(crate) dropped: u32,
}

struct PlayArea<'a> {
    width: f32,
    height: f32,
    profile: &'a ResourceProfile,
    tuning: &'a LayoutTuning,
}

impl PlayArea<'_> {
    fn size_of(&self, tier: Tier) -> f32 {
        self.profile.tier(tier).node_size
    }

    fn fits(&self, candidate: NodePlacement, placed: &[NodePlacement]) -> bool {
        let radius = self.size_of(candidate.tier) / 2.0;
        let margins = &self.tuning.exclusion;
        if candidate.x - radius < margins.left
            || candidate.x + radius > self.width - margins.right
            || candidate.y - radius < margins.top
            || candidate.y + radius > self.height - margins.bottom
        {
            return false;
        }

        placed.iter().all(|other| {
            let gap = (self.size_of(candidate.tier) + self.size_of(other.tier)) / 2.0
                + self.tuning.spacing_buffer;
            let (dx, dy) = (candidate.x - other.x, candidate.y - other.y);
            (dx * dx + dy * dy).sqrt() >= gap
        })
    }

    fn candidate<R: Rng + ?Sized>(&self, tier: Tier, rng: &mut R) -> Option<NodePlacement> {
        let margin = self.tuning.sampling_margin;
        let x = sample_axis(rng, margin, self.width - margin)?;
        let y = sample_axis(rng, margin, self.height - margin)?;
        Some(NodePlacement::new(tier, x, y))
    }
}

/// Draws an integer coordinate from `[low, high]`, or `None` when the range is empty.
fn sample_axis<R: Rng + ?Sized>(rng: &mut R, low: f32, high: f32) -> Option<f32> {
    let (low, high) = (low.ceil() as i64, high.floor() as i64);
    if low > high {
        return None;
    }
    Some(rng.gen_range(low..=high) as f32)
}

/// Places `counts[tier]` nodes per tier, largest tier first, then shuffles the result.
pub(crate) fn scatter<R: Rng + ?Sized>(
    profile: &ResourceProfile,
    tuning: &LayoutTuning,
    counts: [u32; 3],
    width: f32,
    height: f32,
    rng: &mut R,
) -> Scatter {
    let area = PlayArea {
        width,
        height,
        profile,
        tuning,
    };
    let mut placements: Vec<NodePlacement> = Vec::new();
    let mut dropped = 0;

    for tier in Tier::ALL.into_iter().rev() {
        for _ in 0..counts[tier.index()] {
            let spot = (0..tuning.max_attempts)
                .filter_map(|_| area.candidate(tier, &mut *rng))
                .find(|candidate| area.fits(*candidate, &placements));
            match spot {
                Some(placement) => placements.push(placement),
                None => {
                    dropped += 1;
                    warn!(
                        resource = %profile.resource(),
                        tier = tier.level(),
                        width,
                        height,
                        "no free position for collectible node, dropping it"
                    );
                }
            }
        }
    }

    placements.shuffle(rng);
    Scatter {
        placements,
        dropped,
    }
}
