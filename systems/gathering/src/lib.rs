#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Timed resource-gathering mini-game.
//!
//! A session scatters tiered trees or rocks over a play area, hands out a
//! limited number of tool uses per tier, and lets the player harvest nodes
//! whose tier matches the selected tool until the timer runs out or no
//! further harvest is possible. The caller owns the session and drives the
//! timer through [`GatherSession::tick`]; dropping the session stops it.

mod layout;
mod profile;

use std::fmt;

use geometropolis_core::{ResourceKind, Tier, ToolKind};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

pub use layout::NodePlacement;
pub use profile::{LayoutTuning, Margins, ResourceProfile, Span, TierProfile};

const DEFAULT_DURATION_SECS: u32 = 30;
const DEFAULT_RNG_SEED: u64 = 0x9a1e_47c3_05d8_e26b;

/// Session configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Resource gathered by the session.
    pub resource: ResourceKind,
    /// Seed for node scatter, tool counts and yields.
    pub rng_seed: u64,
    /// Length of a round in seconds.
    pub duration_secs: u32,
    /// Node scatter parameters.
    pub layout: LayoutTuning,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            resource: ResourceKind::Wood,
            rng_seed: DEFAULT_RNG_SEED,
            duration_secs: DEFAULT_DURATION_SECS,
            layout: LayoutTuning::default(),
        }
    }
}

/// Identifier of a collectible node within its session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// Wraps a raw identifier.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Raw identifier.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

/// Tree or rock the player can harvest once.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CollectibleNode {
    id: NodeId,
    tier: Tier,
    x: f32,
    y: f32,
    harvested: bool,
}

impl CollectibleNode {
    /// Identifier of the node.
    #[must_use]
    pub const fn id(&self) -> NodeId {
        self.id
    }

    /// Tier of the node.
    #[must_use]
    pub const fn tier(&self) -> Tier {
        self.tier
    }

    /// Centre of the node in play-area pixels.
    #[must_use]
    pub const fn position(&self) -> (f32, f32) {
        (self.x, self.y)
    }

    /// Whether the node has already been harvested.
    #[must_use]
    pub const fn is_harvested(&self) -> bool {
        self.harvested
    }
}

/// Remaining tool uses per tier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ToolInventory {
    counts: [u32; 3],
}

impl ToolInventory {
    /// Creates an inventory from per-tier counts, smallest tier first.
    #[must_use]
    pub const fn new(counts: [u32; 3]) -> Self {
        Self { counts }
    }

    /// Uses left for tools of `tier`.
    #[must_use]
    pub const fn count(&self, tier: Tier) -> u32 {
        self.counts[tier.index()]
    }

    /// Uses left across all tiers.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }

    /// Whether every tool is used up.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.iter().all(|count| *count == 0)
    }

    fn spend(&mut self, tier: Tier) {
        let count = &mut self.counts[tier.index()];
        *count = count.saturating_sub(1);
    }
}

/// Lifecycle of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    /// Generated but the timer has not been started.
    NotStarted,
    /// Accepting harvests.
    Running,
    /// No further harvest can succeed.
    Finished,
}

/// Why a harvest attempt changed nothing.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum HarvestRejection {
    /// No node carries the identifier.
    #[error("node does not exist")]
    NotFound,
    /// The node was harvested earlier.
    #[error("node has already been harvested")]
    AlreadyHarvested,
    /// The player has not picked a tool.
    #[error("no tool selected")]
    NoToolSelected,
    /// The selected tool does not match the node's tier or resource.
    #[error("selected tool cannot harvest this node")]
    WrongTool,
    /// The matching tool has no uses left.
    #[error("no uses left for the matching tool")]
    NoToolCount,
    /// The round is over.
    #[error("gathering session has finished")]
    SessionFinished,
}

impl HarvestRejection {
    /// Stable machine-readable reason code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::AlreadyHarvested => "already_harvested",
            Self::NoToolSelected => "no_tool_selected",
            Self::WrongTool => "wrong_tool",
            Self::NoToolCount => "no_tool_count",
            Self::SessionFinished => "session_finished",
        }
    }
}

/// Successful harvest.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Harvest {
    /// Node that was harvested.
    pub node: NodeId,
    /// Tier of the node.
    pub tier: Tier,
    /// Tool that was used up.
    pub tool: ToolKind,
    /// Resource units gained.
    pub gained: u32,
}

/// Why a round ended, in priority order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EndReason {
    /// The timer reached zero.
    TimeExpired,
    /// Every tool is used up.
    OutOfTools,
    /// Every node has been harvested.
    AllHarvested,
    /// Tools remain, but none matches an unharvested node.
    NoMatchingTools,
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::TimeExpired => "time is up",
            Self::OutOfTools => "out of tools",
            Self::AllHarvested => "all nodes harvested",
            Self::NoMatchingTools => "no matching tools for remaining nodes",
        })
    }
}

/// Result of a finished round, ready to be deposited into the city inventory.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GatherOutcome {
    /// Resource gathered.
    pub resource: ResourceKind,
    /// Units collected over the round.
    pub collected: u64,
    /// Why the round ended.
    pub reason: EndReason,
}

/// One round of the gathering mini-game.
#[derive(Clone, Debug)]
pub struct GatherSession {
    profile: ResourceProfile,
    layout: LayoutTuning,
    duration_secs: u32,
    rng: ChaCha8Rng,
    nodes: Vec<CollectibleNode>,
    tools: ToolInventory,
    remaining: [u32; 3],
    collected: u64,
    selected: Option<ToolKind>,
    remaining_secs: u32,
    started: bool,
    dropped: u32,
    next_node_id: u32,
}

impl GatherSession {
    /// Creates an empty session; call [`GatherSession::generate`] before playing.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            profile: ResourceProfile::for_resource(config.resource),
            layout: config.layout,
            duration_secs: config.duration_secs,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            nodes: Vec::new(),
            tools: ToolInventory::default(),
            remaining: [0; 3],
            collected: 0,
            selected: None,
            remaining_secs: config.duration_secs,
            started: false,
            dropped: 0,
            next_node_id: 0,
        }
    }

    /// Creates a session with fixed node positions and tool counts.
    #[must_use]
    pub fn scripted(config: &Config, placements: &[NodePlacement], tools: ToolInventory) -> Self {
        let mut session = Self::new(config);
        session.load(placements);
        session.tools = tools;
        session
    }

    /// Resets the session and scatters fresh nodes over a `width` × `height` play area.
    ///
    /// Nodes that find no free position are dropped; see
    /// [`GatherSession::dropped_count`].
    pub fn generate(&mut self, width: f32, height: f32) {
        let profile = &self.profile;
        let rng = &mut self.rng;
        let counts = Tier::ALL.map(|tier| profile.tier(tier).nodes.sample(&mut *rng));
        let tools = Tier::ALL.map(|tier| profile.tier(tier).tools.sample(&mut *rng));

        let scatter = layout::scatter(profile, &self.layout, counts, width, height, rng);
        self.dropped = scatter.dropped;
        self.load(&scatter.placements);
        self.tools = ToolInventory::new(tools);

        info!(
            resource = %self.resource(),
            nodes = self.nodes.len(),
            dropped = self.dropped,
            tools = self.tools.total(),
            "gathering session generated"
        );
    }

    /// Replaces the node set; ids keep counting so ids from an earlier layout never resolve.
    fn load(&mut self, placements: &[NodePlacement]) {
        let first = self.next_node_id;
        self.nodes = placements
            .iter()
            .zip(first..)
            .map(|(placement, id)| CollectibleNode {
                id: NodeId::new(id),
                tier: placement.tier,
                x: placement.x,
                y: placement.y,
                harvested: false,
            })
            .collect();
        self.next_node_id = self
            .nodes
            .last()
            .map_or(first, |node| node.id.get().wrapping_add(1));
        self.remaining = [0; 3];
        for node in &self.nodes {
            self.remaining[node.tier.index()] += 1;
        }
        self.collected = 0;
        self.selected = None;
        self.remaining_secs = self.duration_secs;
        self.started = false;
    }

    /// Starts the round timer.
    pub fn start(&mut self) {
        self.started = true;
    }

    /// Current lifecycle phase.
    ///
    /// `NotStarted` is reported until [`GatherSession::start`] is called, even
    /// when [`GatherSession::end_reason`] is already `Some`. Starting only
    /// affects this report: harvesting and ticking work in every phase, and
    /// the host decides when to begin driving the timer.
    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        if !self.started {
            SessionPhase::NotStarted
        } else if self.is_finished() {
            SessionPhase::Finished
        } else {
            SessionPhase::Running
        }
    }

    /// Selects a tool, or clears the selection with `None`.
    pub fn select_tool(&mut self, tool: Option<ToolKind>) {
        self.selected = tool;
    }

    /// Currently selected tool.
    #[must_use]
    pub const fn selected_tool(&self) -> Option<ToolKind> {
        self.selected
    }

    /// Attempts to harvest `node` with the selected tool.
    ///
    /// A rejection leaves the session unchanged.
    pub fn try_harvest(&mut self, node: NodeId) -> Result<Harvest, HarvestRejection> {
        if self.is_finished() {
            return Err(HarvestRejection::SessionFinished);
        }
        let index = self
            .nodes
            .iter()
            .position(|candidate| candidate.id == node)
            .ok_or(HarvestRejection::NotFound)?;
        let target = self.nodes[index];
        if target.harvested {
            return Err(HarvestRejection::AlreadyHarvested);
        }
        let tool = self.selected.ok_or(HarvestRejection::NoToolSelected)?;
        let tier = self.profile.tier(target.tier);
        if tool != tier.tool {
            return Err(HarvestRejection::WrongTool);
        }
        if self.tools.count(target.tier) == 0 {
            return Err(HarvestRejection::NoToolCount);
        }
        self.tools.spend(target.tier);
        let gained = tier.yields.sample(&mut self.rng);
        self.collected = self.collected.saturating_add(u64::from(gained));
        self.nodes[index].harvested = true;
        let remaining = &mut self.remaining[target.tier.index()];
        *remaining = remaining.saturating_sub(1);

        debug!(
            node = node.get(),
            tier = target.tier.level(),
            tool = tool.name(),
            gained,
            collected = self.collected,
            "node harvested"
        );
        Ok(Harvest {
            node,
            tier: target.tier,
            tool,
            gained,
        })
    }

    /// Advances the timer by one second, stopping at zero, and returns the seconds left.
    pub fn tick(&mut self) -> u32 {
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        self.remaining_secs
    }

    /// Whether no further harvest can succeed.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.end_reason().is_some()
    }

    /// Highest-priority reason the round is over, or `None` while it continues.
    #[must_use]
    pub fn end_reason(&self) -> Option<EndReason> {
        if self.remaining_secs == 0 {
            Some(EndReason::TimeExpired)
        } else if self.tools.is_empty() {
            Some(EndReason::OutOfTools)
        } else if self.nodes.iter().all(CollectibleNode::is_harvested) {
            Some(EndReason::AllHarvested)
        } else if self.harvestable().next().is_none() {
            Some(EndReason::NoMatchingTools)
        } else {
            None
        }
    }

    /// Collected amount and end reason once the round is over.
    #[must_use]
    pub fn outcome(&self) -> Option<GatherOutcome> {
        self.end_reason().map(|reason| GatherOutcome {
            resource: self.resource(),
            collected: self.collected,
            reason,
        })
    }

    /// Unharvested nodes whose matching tool still has uses left.
    pub fn harvestable(&self) -> impl Iterator<Item = &CollectibleNode> + '_ {
        self.nodes
            .iter()
            .filter(|node| !node.harvested && self.tools.count(node.tier) > 0)
    }

    /// Tool that harvests nodes of `tier` in this session.
    #[must_use]
    pub const fn tool_for(&self, tier: Tier) -> ToolKind {
        self.profile.tier(tier).tool
    }

    /// Resource gathered by the session.
    #[must_use]
    pub const fn resource(&self) -> ResourceKind {
        self.profile.resource()
    }

    /// All nodes, harvested or not.
    #[must_use]
    pub fn nodes(&self) -> &[CollectibleNode] {
        &self.nodes
    }

    /// Node with the given identifier.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&CollectibleNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    /// Remaining tool uses.
    #[must_use]
    pub const fn tools(&self) -> &ToolInventory {
        &self.tools
    }

    /// Units collected so far.
    #[must_use]
    pub const fn collected(&self) -> u64 {
        self.collected
    }

    /// Seconds left on the timer.
    #[must_use]
    pub const fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    /// Unharvested placed nodes of `tier`.
    #[must_use]
    pub const fn remaining_nodes(&self, tier: Tier) -> u32 {
        self.remaining[tier.index()]
    }

    /// Nodes the last generation could not fit into the play area.
    #[must_use]
    pub const fn dropped_count(&self) -> u32 {
        self.dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stone_config() -> Config {
        Config {
            resource: ResourceKind::Stone,
            ..Config::default()
        }
    }

    #[test]
    fn rejection_codes_are_stable() {
        assert_eq!(HarvestRejection::WrongTool.code(), "wrong_tool");
        assert_eq!(HarvestRejection::NoToolCount.code(), "no_tool_count");
        assert_eq!(HarvestRejection::SessionFinished.code(), "session_finished");
    }

    #[test]
    fn generated_counts_stay_within_profile() {
        let config = stone_config();
        for seed in 0..8 {
            let mut session = GatherSession::new(&Config {
                rng_seed: seed,
                ..config.clone()
            });
            session.generate(1920.0, 1080.0);
            let profile = ResourceProfile::for_resource(ResourceKind::Stone);
            for tier in Tier::ALL {
                let placed = session
                    .nodes()
                    .iter()
                    .filter(|node| node.tier() == tier)
                    .count() as u32;
                assert_eq!(session.remaining_nodes(tier), placed);
                assert!(profile.tier(tier).tools.contains(session.tools().count(tier)));
                assert!(placed <= profile.tier(tier).nodes.max);
            }
            assert_eq!(session.remaining_secs(), 30);
            assert_eq!(session.phase(), SessionPhase::NotStarted);
        }
    }

    #[test]
    fn regenerating_resets_progress() {
        let mut session = GatherSession::new(&Config::default());
        session.generate(1920.0, 1080.0);
        session.start();
        let _ = session.tick();
        session.select_tool(Some(ToolKind::Axe));

        session.generate(1920.0, 1080.0);
        assert_eq!(session.remaining_secs(), 30);
        assert_eq!(session.collected(), 0);
        assert_eq!(session.selected_tool(), None);
        assert_eq!(session.phase(), SessionPhase::NotStarted);
    }

    #[test]
    fn ids_from_an_earlier_layout_are_not_found() {
        let mut session = GatherSession::new(&Config::default());
        session.generate(1920.0, 1080.0);
        let stale: Vec<NodeId> = session.nodes().iter().map(CollectibleNode::id).collect();
        assert!(!stale.is_empty());

        session.generate(1920.0, 1080.0);
        for tier in Tier::ALL {
            session.select_tool(Some(session.tool_for(tier)));
            for id in &stale {
                assert_eq!(session.node(*id), None);
                assert_eq!(session.try_harvest(*id), Err(HarvestRejection::NotFound));
            }
        }
        assert_eq!(session.collected(), 0);
    }

    #[test]
    fn unstarted_session_reports_not_started_even_when_over() {
        let session =
            GatherSession::scripted(&Config::default(), &[], ToolInventory::default());
        assert_eq!(session.end_reason(), Some(EndReason::OutOfTools));
        assert_eq!(session.phase(), SessionPhase::NotStarted);
    }

    #[test]
    fn tool_mapping_follows_session_resource() {
        let session = GatherSession::new(&stone_config());
        assert_eq!(session.tool_for(Tier::Three), ToolKind::Dynamite);
        assert_eq!(session.resource(), ResourceKind::Stone);
    }
}
