//! Tuning tables shared by the wood and stone gathering sessions.

use geometropolis_core::{ResourceKind, Tier, ToolKind};
use rand::Rng;
use serde::{Deserialize, Serialize};

const NODE_COUNTS: [Span; 3] = [Span::new(3, 6), Span::new(2, 5), Span::new(1, 4)];
const TOOL_COUNTS: [Span; 3] = [Span::new(1, 6), Span::new(1, 5), Span::new(1, 4)];
const YIELDS: [Span; 3] = [Span::new(5, 10), Span::new(12, 20), Span::new(25, 30)];
const TREE_SIZES: [f32; 3] = [70.0, 100.0, 130.0];
const ROCK_SIZES: [f32; 3] = [60.0, 90.0, 120.0];

/// Inclusive integer range sampled uniformly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Span {
    /// Smallest value.
    pub min: u32,
    /// Largest value; treated as `min` when smaller.
    pub max: u32,
}

impl Span {
    /// Creates a new inclusive range.
    #[must_use]
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// Draws a value uniformly from the range.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        rng.gen_range(self.min..=self.max.max(self.min))
    }

    /// Reports whether `value` lies within the range.
    #[must_use]
    pub fn contains(&self, value: u32) -> bool {
        value >= self.min && value <= self.max.max(self.min)
    }
}

/// Everything that depends on a node's tier.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TierProfile {
    /// Tool required to harvest nodes of the tier.
    pub tool: ToolKind,
    /// How many nodes of the tier a session scatters.
    pub nodes: Span,
    /// How many uses of the matching tool a session hands out.
    pub tools: Span,
    /// Resource yield of a single harvest.
    pub yields: Span,
    /// Diameter of the node's sprite in play-area pixels.
    pub node_size: f32,
}

/// Tier table for one resource's mini-game.
#[derive(Clone, Debug, PartialEq)]
pub struct ResourceProfile {
    resource: ResourceKind,
    tiers: [TierProfile; 3],
}

impl ResourceProfile {
    /// Standard table for `resource`; trees and rocks differ only in tools and sprite sizes.
    #[must_use]
    pub fn for_resource(resource: ResourceKind) -> Self {
        let sizes = match resource {
            ResourceKind::Wood => TREE_SIZES,
            ResourceKind::Stone => ROCK_SIZES,
        };
        Self {
            resource,
            tiers: Tier::ALL.map(|tier| TierProfile {
                tool: ToolKind::for_tier(resource, tier),
                nodes: NODE_COUNTS[tier.index()],
                tools: TOOL_COUNTS[tier.index()],
                yields: YIELDS[tier.index()],
                node_size: sizes[tier.index()],
            }),
        }
    }

    /// Resource gathered by the session.
    #[must_use]
    pub const fn resource(&self) -> ResourceKind {
        self.resource
    }

    /// Tuning of `tier`.
    #[must_use]
    pub const fn tier(&self, tier: Tier) -> &TierProfile {
        &self.tiers[tier.index()]
    }

    /// Tier harvested by `tool`, or `None` for the other resource's tools.
    #[must_use]
    pub fn tier_for_tool(&self, tool: ToolKind) -> Option<Tier> {
        Tier::ALL
            .into_iter()
            .find(|tier| self.tier(*tier).tool == tool)
    }
}

/// Screen regions reserved for the timer, toolbar and counters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Margins {
    /// Reserved band along the top edge.
    pub top: f32,
    /// Reserved band along the left edge.
    pub left: f32,
    /// Reserved band along the bottom edge.
    pub bottom: f32,
    /// Reserved band along the right edge.
    pub right: f32,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            top: 130.0,
            left: 170.0,
            bottom: 150.0,
            right: 180.0,
        }
    }
}

/// Parameters of the node scatter.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutTuning {
    /// Candidate points are sampled at least this far from every edge.
    pub sampling_margin: f32,
    /// No part of a node may enter these bands.
    pub exclusion: Margins,
    /// Extra gap kept between the rims of neighbouring nodes.
    pub spacing_buffer: f32,
    /// Candidate points tried per node before it is dropped.
    pub max_attempts: u32,
}

impl Default for LayoutTuning {
    fn default() -> Self {
        Self {
            sampling_margin: 120.0,
            exclusion: Margins::default(),
            spacing_buffer: 50.0,
            max_attempts: 100,
        }
    }
}
