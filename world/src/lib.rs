#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative city state for Geometropolis.
//!
//! The world owns the diamond grid, the wood/stone ledger, the running score
//! and the construction project currently in flight. Adapters mutate it only
//! through [`apply`] and read it only through [`query`].

mod grid;
mod ledger;

use geometropolis_core::{
    BuildingKind, Command, ConstructionTarget, Event, GridIndex, PlacementError, ProposalError,
    ResourceKind, WELCOME_BANNER,
};
use geometropolis_system_construction::{
    self as construction, LogisticCurve, Measurements, Proposal, Stock, TargetRange,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub use grid::{dimensions_for_canvas, DiamondGrid, PlacedBuilding, CELL_HEIGHT, CELL_WIDTH};
pub use ledger::{Inventory, InventoryItem};

const DEFAULT_CANVAS_WIDTH: u32 = 768;
const DEFAULT_CANVAS_HEIGHT: u32 = 576;
const DEFAULT_STARTING_STOCK: u64 = 100;
const DEFAULT_RNG_SEED: u64 = 0x6e0d_3a11_95c4_7b2f;

/// Tunable parameters used to construct a [`World`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Number of staggered rows in the grid.
    pub rows: u32,
    /// Number of columns in even rows of the grid.
    pub columns: u32,
    /// Wood in stock when the city is founded.
    pub starting_wood: u64,
    /// Stone in stock when the city is founded.
    pub starting_stone: u64,
    /// Seed for construction target generation.
    pub rng_seed: u64,
    /// Range target lengths and widths are drawn from.
    pub targets: TargetRange,
    /// Accuracy curve applied to submitted proposals.
    pub scoring: LogisticCurve,
}

impl Default for Config {
    fn default() -> Self {
        let (rows, columns) = dimensions_for_canvas(DEFAULT_CANVAS_WIDTH, DEFAULT_CANVAS_HEIGHT);
        Self {
            rows,
            columns,
            starting_wood: DEFAULT_STARTING_STOCK,
            starting_stone: DEFAULT_STARTING_STOCK,
            rng_seed: DEFAULT_RNG_SEED,
            targets: TargetRange::default(),
            scoring: LogisticCurve::default(),
        }
    }
}

/// Stage of the construction project currently in flight.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProjectPhase {
    /// No proposal is open and nothing awaits placement.
    Idle,
    /// A proposal is open against the contained target.
    Proposing(ConstructionTarget),
    /// A paid-for building of the contained kind awaits placement.
    Placing(BuildingKind),
}

/// Represents the authoritative Geometropolis city state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    grid: DiamondGrid,
    inventory: Inventory,
    score: f64,
    phase: ProjectPhase,
    rng: ChaCha8Rng,
    targets: TargetRange,
    scoring: LogisticCurve,
}

impl World {
    /// Creates a city using the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(&Config::default())
    }

    /// Creates a city from the provided configuration.
    #[must_use]
    pub fn with_config(config: &Config) -> Self {
        Self {
            banner: WELCOME_BANNER,
            grid: DiamondGrid::new(config.rows, config.columns),
            inventory: Inventory::new(config.starting_wood, config.starting_stone),
            score: 0.0,
            phase: ProjectPhase::Idle,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            targets: config.targets,
            scoring: config.scoring,
        }
    }

    fn stock(&self) -> Stock {
        Stock {
            wood: self.inventory.item(ResourceKind::Wood).get(),
            stone: self.inventory.item(ResourceKind::Stone).get(),
        }
    }

    fn open_proposal(&mut self, kind: BuildingKind, out_events: &mut Vec<Event>) {
        if let ProjectPhase::Placing(_) = self.phase {
            out_events.push(Event::ProposalRejected {
                reason: ProposalError::PlacementPending,
            });
            return;
        }

        let target = construction::generate_target(kind, self.targets, &mut self.rng);
        debug!(
            building = %kind,
            length = target.length(),
            width = target.width(),
            "opened construction proposal"
        );
        self.phase = ProjectPhase::Proposing(target);
        out_events.push(Event::ProposalOpened { target });
    }

    fn submit_proposal(&mut self, proposal: Proposal, out_events: &mut Vec<Event>) {
        let target = match self.phase {
            ProjectPhase::Proposing(target) => target,
            ProjectPhase::Placing(_) => {
                out_events.push(Event::ProposalRejected {
                    reason: ProposalError::PlacementPending,
                });
                return;
            }
            ProjectPhase::Idle => {
                out_events.push(Event::ProposalRejected {
                    reason: ProposalError::NoOpenProposal,
                });
                return;
            }
        };

        let review = construction::review(&proposal, &target, self.stock());
        let costs = match proposal.measure() {
            Some(costs) if review.is_valid() => costs,
            _ => {
                debug!(%review, "proposal failed validation");
                out_events.push(Event::ProposalRejected {
                    reason: ProposalError::Invalid(review),
                });
                return;
            }
        };

        if let Err(reason) = self.debit(costs, out_events) {
            out_events.push(Event::ProposalRejected { reason });
            return;
        }

        let score = construction::score_with(&self.scoring, costs.area, costs.perimeter, &target);
        self.score += score;
        self.phase = ProjectPhase::Placing(target.kind());
        info!(
            building = %target.kind(),
            area = costs.area,
            perimeter = costs.perimeter,
            score,
            "construction proposal accepted"
        );
        out_events.push(Event::ProposalAccepted {
            kind: target.kind(),
            area: costs.area,
            perimeter: costs.perimeter,
            score,
        });
    }

    fn debit(
        &mut self,
        costs: Measurements,
        out_events: &mut Vec<Event>,
    ) -> Result<(), ProposalError> {
        if !self
            .inventory
            .item_mut(ResourceKind::Stone)
            .subtract(costs.area)
        {
            return Err(ProposalError::InsufficientStock(ResourceKind::Stone));
        }
        if !self
            .inventory
            .item_mut(ResourceKind::Wood)
            .subtract(costs.perimeter)
        {
            self.inventory
                .item_mut(ResourceKind::Stone)
                .add(costs.area);
            return Err(ProposalError::InsufficientStock(ResourceKind::Wood));
        }

        for (resource, amount) in [
            (ResourceKind::Stone, costs.area),
            (ResourceKind::Wood, costs.perimeter),
        ] {
            out_events.push(Event::ResourcesSpent {
                resource,
                amount,
                balance: self.inventory.item(resource).get(),
            });
        }
        Ok(())
    }

    fn place_building(
        &mut self,
        kind: BuildingKind,
        anchor: GridIndex,
        out_events: &mut Vec<Event>,
    ) {
        let reason = match self.phase {
            ProjectPhase::Placing(approved) if approved == kind => {
                match self.grid.place(kind, anchor) {
                    Ok(building) => {
                        self.phase = ProjectPhase::Idle;
                        info!(building = %kind, row = anchor.row(), column = anchor.column(), "building placed");
                        out_events.push(Event::BuildingPlaced {
                            building,
                            kind,
                            footprint: self.grid.footprint(anchor),
                        });
                        return;
                    }
                    Err(reason) => reason,
                }
            }
            ProjectPhase::Placing(approved) => PlacementError::KindMismatch { approved },
            ProjectPhase::Idle | ProjectPhase::Proposing(_) => PlacementError::NoApprovedProject,
        };

        debug!(building = %kind, %reason, "placement rejected");
        out_events.push(Event::PlacementRejected {
            kind,
            anchor,
            reason,
        });
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureGrid { rows, columns } => {
            world.grid = DiamondGrid::new(rows, columns);
            if let ProjectPhase::Proposing(target) = world.phase {
                world.phase = ProjectPhase::Idle;
                out_events.push(Event::ProposalCancelled {
                    kind: target.kind(),
                });
            }
            out_events.push(Event::GridConfigured { rows, columns });
        }
        Command::OpenProposal { kind } => world.open_proposal(kind, out_events),
        Command::SubmitProposal { length, width } => {
            world.submit_proposal(Proposal::new(length, width), out_events);
        }
        Command::CancelProposal => {
            if let ProjectPhase::Proposing(target) = world.phase {
                world.phase = ProjectPhase::Idle;
                out_events.push(Event::ProposalCancelled {
                    kind: target.kind(),
                });
            }
        }
        Command::PlaceBuilding { kind, anchor } => world.place_building(kind, anchor, out_events),
        Command::DepositResources { resource, amount } => {
            let item = world.inventory.item_mut(resource);
            item.add(amount);
            out_events.push(Event::ResourcesDeposited {
                resource,
                amount,
                balance: item.get(),
            });
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::{DiamondGrid, Inventory, ProjectPhase, World};
    use geometropolis_core::{
        BuildingId, BuildingKind, ConstructionTarget, Footprint, GridIndex, ResourceKind,
    };

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Provides read-only access to the diamond grid.
    #[must_use]
    pub fn grid(world: &World) -> &DiamondGrid {
        &world.grid
    }

    /// Provides read-only access to the inventory ledger.
    #[must_use]
    pub fn inventory(world: &World) -> &Inventory {
        &world.inventory
    }

    /// Current stock of `resource`.
    #[must_use]
    pub fn quantity(world: &World, resource: ResourceKind) -> u64 {
        world.inventory.item(resource).get()
    }

    /// Sum of the scores of every accepted proposal.
    #[must_use]
    pub fn score(world: &World) -> f64 {
        world.score
    }

    /// Stage of the construction project in flight.
    #[must_use]
    pub fn phase(world: &World) -> ProjectPhase {
        world.phase
    }

    /// Target of the open proposal, if any.
    #[must_use]
    pub fn active_target(world: &World) -> Option<ConstructionTarget> {
        match world.phase {
            ProjectPhase::Proposing(target) => Some(target),
            ProjectPhase::Idle | ProjectPhase::Placing(_) => None,
        }
    }

    /// Building that has been paid for and awaits placement, if any.
    #[must_use]
    pub fn approved_building(world: &World) -> Option<BuildingKind> {
        match world.phase {
            ProjectPhase::Placing(kind) => Some(kind),
            ProjectPhase::Idle | ProjectPhase::Proposing(_) => None,
        }
    }

    /// Footprint anchored at `anchor` and whether it could be placed right now.
    #[must_use]
    pub fn footprint_preview(world: &World, anchor: GridIndex) -> (Footprint, bool) {
        let footprint = world.grid.footprint(anchor);
        (footprint, world.grid.footprint_placeable(&footprint))
    }

    /// Captures a read-only view of the buildings erected in the city.
    #[must_use]
    pub fn building_view(world: &World) -> BuildingView {
        let mut snapshots: Vec<BuildingSnapshot> = world
            .grid
            .buildings()
            .iter()
            .map(|building| BuildingSnapshot {
                id: building.id(),
                kind: building.kind(),
                footprint: building.footprint(),
            })
            .collect();
        snapshots.sort_by_key(|snapshot| snapshot.id);
        BuildingView { snapshots }
    }

    /// Read-only snapshot describing all buildings in the city.
    #[derive(Clone, Debug, Default)]
    pub struct BuildingView {
        snapshots: Vec<BuildingSnapshot>,
    }

    impl BuildingView {
        /// Iterator over the captured snapshots in identifier order.
        pub fn iter(&self) -> impl Iterator<Item = &BuildingSnapshot> {
            self.snapshots.iter()
        }

        /// Consumes the view, yielding the underlying snapshots.
        #[must_use]
        pub fn into_vec(self) -> Vec<BuildingSnapshot> {
            self.snapshots
        }
    }

    /// Immutable representation of a single building used for queries.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct BuildingSnapshot {
        /// Identifier allocated to the building by the world.
        pub id: BuildingId,
        /// Kind of building that was erected.
        pub kind: BuildingKind,
        /// Cells covered by the building.
        pub footprint: Footprint,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_target_world(side: u32) -> World {
        World::with_config(&Config {
            targets: TargetRange::new(side, side),
            ..Config::default()
        })
    }

    #[test]
    fn default_world_matches_board_and_stock() {
        let world = World::new();
        let grid = query::grid(&world);
        assert_eq!((grid.rows(), grid.columns()), (71, 24));
        assert_eq!(query::quantity(&world, ResourceKind::Wood), 100);
        assert_eq!(query::quantity(&world, ResourceKind::Stone), 100);
        assert_eq!(query::phase(&world), ProjectPhase::Idle);
        assert_eq!(query::welcome_banner(&world), WELCOME_BANNER);
    }

    #[test]
    fn exact_proposal_is_paid_for_and_scored() {
        let mut world = fixed_target_world(5);
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::OpenProposal {
                kind: BuildingKind::House,
            },
            &mut events,
        );
        let target = query::active_target(&world).expect("proposal open");
        assert_eq!((target.area(), target.perimeter()), (25, 20));

        events.clear();
        apply(
            &mut world,
            Command::SubmitProposal {
                length: 5,
                width: 5,
            },
            &mut events,
        );

        assert_eq!(query::quantity(&world, ResourceKind::Stone), 75);
        assert_eq!(query::quantity(&world, ResourceKind::Wood), 80);
        assert_eq!(query::score(&world), 100.0);
        assert_eq!(
            query::approved_building(&world),
            Some(BuildingKind::House)
        );
        assert_eq!(
            events.last(),
            Some(&Event::ProposalAccepted {
                kind: BuildingKind::House,
                area: 25,
                perimeter: 20,
                score: 100.0,
            })
        );
    }

    #[test]
    fn invalid_proposal_keeps_stock_and_stays_open() {
        let mut world = fixed_target_world(5);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::OpenProposal {
                kind: BuildingKind::Shop,
            },
            &mut events,
        );

        events.clear();
        apply(
            &mut world,
            Command::SubmitProposal {
                length: 4,
                width: 5,
            },
            &mut events,
        );

        assert!(matches!(
            events.as_slice(),
            [Event::ProposalRejected {
                reason: ProposalError::Invalid(_)
            }]
        ));
        assert_eq!(query::quantity(&world, ResourceKind::Stone), 100);
        assert_eq!(query::quantity(&world, ResourceKind::Wood), 100);
        assert!(query::active_target(&world).is_some());
    }

    #[test]
    fn submission_without_open_proposal_is_rejected() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SubmitProposal {
                length: 1,
                width: 1,
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::ProposalRejected {
                reason: ProposalError::NoOpenProposal
            }]
        );
    }

    #[test]
    fn placement_requires_an_approved_project() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::PlaceBuilding {
                kind: BuildingKind::Park,
                anchor: GridIndex::new(1, 1),
            },
            &mut events,
        );
        assert!(query::grid(&world).buildings().is_empty());
        assert_eq!(
            events,
            vec![Event::PlacementRejected {
                kind: BuildingKind::Park,
                anchor: GridIndex::new(1, 1),
                reason: PlacementError::NoApprovedProject,
            }]
        );
    }

    #[test]
    fn cancel_discards_open_proposal() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::OpenProposal {
                kind: BuildingKind::Library,
            },
            &mut events,
        );
        apply(&mut world, Command::CancelProposal, &mut events);
        assert_eq!(query::phase(&world), ProjectPhase::Idle);
        assert_eq!(
            events.last(),
            Some(&Event::ProposalCancelled {
                kind: BuildingKind::Library
            })
        );
    }

    #[test]
    fn deposit_credits_ledger() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::DepositResources {
                resource: ResourceKind::Wood,
                amount: 42,
            },
            &mut events,
        );
        assert_eq!(query::quantity(&world, ResourceKind::Wood), 142);
        assert_eq!(
            events,
            vec![Event::ResourcesDeposited {
                resource: ResourceKind::Wood,
                amount: 42,
                balance: 142,
            }]
        );
    }

    #[test]
    fn failed_wood_debit_refunds_stone() {
        let mut world = World::new();
        let mut events = Vec::new();

        let result = world.debit(
            Measurements {
                area: 10,
                perimeter: 1_000,
            },
            &mut events,
        );

        assert_eq!(
            result,
            Err(ProposalError::InsufficientStock(ResourceKind::Wood))
        );
        assert_eq!(query::quantity(&world, ResourceKind::Stone), 100);
        assert_eq!(query::quantity(&world, ResourceKind::Wood), 100);
        assert!(
            !events
                .iter()
                .any(|event| matches!(event, Event::ResourcesSpent { .. })),
            "nothing is reported as spent when the debit is rolled back"
        );
    }

    #[test]
    fn failed_stone_debit_touches_nothing() {
        let mut world = World::new();
        let mut events = Vec::new();

        let result = world.debit(
            Measurements {
                area: 101,
                perimeter: 4,
            },
            &mut events,
        );

        assert_eq!(
            result,
            Err(ProposalError::InsufficientStock(ResourceKind::Stone))
        );
        assert_eq!(query::quantity(&world, ResourceKind::Wood), 100);
        assert!(events.is_empty());
    }

    #[test]
    fn reconfiguring_grid_cancels_open_proposal() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::OpenProposal {
                kind: BuildingKind::Park,
            },
            &mut events,
        );
        events.clear();

        apply(
            &mut world,
            Command::ConfigureGrid {
                rows: 8,
                columns: 8,
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![
                Event::ProposalCancelled {
                    kind: BuildingKind::Park
                },
                Event::GridConfigured {
                    rows: 8,
                    columns: 8
                },
            ]
        );
        assert_eq!(query::phase(&world), ProjectPhase::Idle);
    }
}
