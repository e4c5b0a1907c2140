#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Geometropolis engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative city world, and pure systems. Adapters submit [`Command`]
//! values describing desired mutations, the world executes those commands via
//! its `apply` entry point, and then broadcasts [`Event`] values describing
//! what actually happened. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Geometropolis.";

/// Commands that express all permissible city mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Rebuilds the diamond grid with the provided dimensions, clearing all buildings.
    ConfigureGrid {
        /// Number of staggered rows laid out in the grid.
        rows: u32,
        /// Number of columns in every even row; odd rows hold one fewer.
        columns: u32,
    },
    /// Opens a construction proposal for the provided building kind.
    OpenProposal {
        /// Building the player intends to erect.
        kind: BuildingKind,
    },
    /// Submits the player's rectangle for the currently open proposal.
    SubmitProposal {
        /// Proposed length in units, as typed by the player.
        length: i64,
        /// Proposed width in units, as typed by the player.
        width: i64,
    },
    /// Discards the currently open proposal without spending resources.
    CancelProposal,
    /// Requests placement of an approved building anchored at the provided index.
    PlaceBuilding {
        /// Building to construct.
        kind: BuildingKind,
        /// Grid index that anchors the building footprint.
        anchor: GridIndex,
    },
    /// Credits gathered resources to the inventory ledger.
    DepositResources {
        /// Resource being credited.
        resource: ResourceKind,
        /// Amount to add to the ledger.
        amount: u64,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Confirms that the grid was rebuilt with new dimensions.
    GridConfigured {
        /// Number of rows in the rebuilt grid.
        rows: u32,
        /// Number of columns in even rows of the rebuilt grid.
        columns: u32,
    },
    /// Announces that a proposal was opened with a freshly generated target.
    ProposalOpened {
        /// Target rectangle the player must match.
        target: ConstructionTarget,
    },
    /// Confirms that a submitted proposal passed validation and was paid for.
    ProposalAccepted {
        /// Building approved for construction.
        kind: BuildingKind,
        /// Area of the accepted rectangle, debited from stone.
        area: u64,
        /// Perimeter of the accepted rectangle, debited from wood.
        perimeter: u64,
        /// Accuracy score awarded for the proposal.
        score: f64,
    },
    /// Reports that a submission was refused.
    ProposalRejected {
        /// Specific reason the submission failed.
        reason: ProposalError,
    },
    /// Confirms that an open proposal was discarded.
    ProposalCancelled {
        /// Building whose proposal was discarded.
        kind: BuildingKind,
    },
    /// Confirms that a building was placed onto the grid.
    BuildingPlaced {
        /// Identifier assigned to the building by the world.
        building: BuildingId,
        /// Type of building that was placed.
        kind: BuildingKind,
        /// Cells now covered by the building.
        footprint: Footprint,
    },
    /// Reports that a placement request was rejected.
    PlacementRejected {
        /// Type of building requested for placement.
        kind: BuildingKind,
        /// Anchor provided in the placement request.
        anchor: GridIndex,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Confirms that resources were credited to the ledger.
    ResourcesDeposited {
        /// Resource that was credited.
        resource: ResourceKind,
        /// Amount credited.
        amount: u64,
        /// Ledger balance after the deposit.
        balance: u64,
    },
    /// Confirms that resources were debited from the ledger.
    ResourcesSpent {
        /// Resource that was debited.
        resource: ResourceKind,
        /// Amount debited.
        amount: u64,
        /// Ledger balance after the debit.
        balance: u64,
    },
}

/// Location of a single tile in the staggered diamond grid.
///
/// Coordinates are signed so that footprints hanging past the top or left
/// edge remain representable; such indices are simply out of bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridIndex {
    row: i32,
    column: i32,
}

impl GridIndex {
    /// Creates a new grid index.
    #[must_use]
    pub const fn new(row: i32, column: i32) -> Self {
        Self { row, column }
    }

    /// Zero-based row of the tile.
    #[must_use]
    pub const fn row(&self) -> i32 {
        self.row
    }

    /// Zero-based column of the tile within its row.
    #[must_use]
    pub const fn column(&self) -> i32 {
        self.column
    }

    /// Reports whether the tile sits on an odd (shifted, shorter) row.
    #[must_use]
    pub const fn is_odd_row(&self) -> bool {
        self.row.rem_euclid(2) == 1
    }

    /// Returns the index displaced by the provided row and column deltas.
    #[must_use]
    pub const fn offset(self, rows: i32, columns: i32) -> Self {
        Self::new(self.row.saturating_add(rows), self.column.saturating_add(columns))
    }
}

/// The four tiles a building covers, computed from an anchor index.
///
/// The north tile is the anchor itself, the west and east tiles sit on the
/// next row, and the south tile two rows below the anchor. Odd and even rows
/// use mirrored column offsets so adjacent footprints tile without gaps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Footprint {
    cells: [GridIndex; 4],
}

impl Footprint {
    /// Computes the footprint anchored at the provided index.
    #[must_use]
    pub const fn anchored_at(anchor: GridIndex) -> Self {
        let (west, east) = if anchor.is_odd_row() {
            (anchor.offset(1, 0), anchor.offset(1, 1))
        } else {
            (anchor.offset(1, -1), anchor.offset(1, 0))
        };
        Self {
            cells: [anchor, west, east, anchor.offset(2, 0)],
        }
    }

    /// Anchor tile at the top of the diamond.
    #[must_use]
    pub const fn north(&self) -> GridIndex {
        self.cells[0]
    }

    /// Left tile on the row below the anchor.
    #[must_use]
    pub const fn west(&self) -> GridIndex {
        self.cells[1]
    }

    /// Right tile on the row below the anchor.
    #[must_use]
    pub const fn east(&self) -> GridIndex {
        self.cells[2]
    }

    /// Bottom tile two rows below the anchor.
    #[must_use]
    pub const fn south(&self) -> GridIndex {
        self.cells[3]
    }

    /// All four cells in north, west, east, south order.
    #[must_use]
    pub const fn cells(&self) -> &[GridIndex; 4] {
        &self.cells
    }

    /// Iterator over the covered cells in north, west, east, south order.
    pub fn iter(&self) -> impl Iterator<Item = GridIndex> + '_ {
        self.cells.iter().copied()
    }

    /// Reports whether the footprint covers the provided cell.
    #[must_use]
    pub fn contains(&self, index: GridIndex) -> bool {
        self.cells.contains(&index)
    }

    /// Reports whether two footprints share any cell.
    #[must_use]
    pub fn intersects(&self, other: &Footprint) -> bool {
        self.iter().any(|cell| other.contains(cell))
    }
}

/// Unique identifier assigned to a placed building.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BuildingId(u32);

impl BuildingId {
    /// Creates a new building identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Types of buildings offered by the construction menu.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BuildingKind {
    /// Single family home.
    House,
    /// Multi-storey residential block.
    Apartment,
    /// Corner shop.
    Shop,
    /// Primary school.
    School,
    /// Hospital.
    Hospital,
    /// Public library.
    Library,
    /// Fenced park.
    Park,
    /// Factory.
    Factory,
}

impl BuildingKind {
    /// Every building in menu order.
    pub const ALL: [BuildingKind; 8] = [
        Self::House,
        Self::Apartment,
        Self::Shop,
        Self::School,
        Self::Hospital,
        Self::Library,
        Self::Park,
        Self::Factory,
    ];

    /// Display name of the building.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::House => "House",
            Self::Apartment => "Apartment",
            Self::Shop => "Shop",
            Self::School => "School",
            Self::Hospital => "Hospital",
            Self::Library => "Library",
            Self::Park => "Park",
            Self::Factory => "Factory",
        }
    }
}

impl fmt::Display for BuildingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Resources tracked by the inventory ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResourceKind {
    /// Wood, spent on perimeter.
    Wood,
    /// Stone, spent on area.
    Stone,
}

impl ResourceKind {
    /// Both resources in ledger order.
    pub const ALL: [ResourceKind; 2] = [Self::Wood, Self::Stone];

    /// Display name of the resource.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Wood => "wood",
            Self::Stone => "stone",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Difficulty class of a collectible node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tier {
    /// Smallest nodes, harvested with the basic tool.
    One,
    /// Medium nodes.
    Two,
    /// Largest nodes, harvested with the heavy tool.
    Three,
}

impl Tier {
    /// Every tier from smallest to largest.
    pub const ALL: [Tier; 3] = [Self::One, Self::Two, Self::Three];

    /// Zero-based position of the tier, usable as an array index.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::One => 0,
            Self::Two => 1,
            Self::Three => 2,
        }
    }

    /// One-based level shown to players.
    #[must_use]
    pub const fn level(self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::Three => 3,
        }
    }
}

/// Tools used to harvest collectible nodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToolKind {
    /// Cuts tier one trees.
    Saw,
    /// Cuts tier two trees.
    Axe,
    /// Cuts tier three trees.
    Chainsaw,
    /// Breaks tier one rocks.
    Pickaxe,
    /// Breaks tier two rocks.
    Drill,
    /// Breaks tier three rocks.
    Dynamite,
}

impl ToolKind {
    /// Returns the tool that harvests nodes of `tier` for `resource`.
    #[must_use]
    pub const fn for_tier(resource: ResourceKind, tier: Tier) -> Self {
        match (resource, tier) {
            (ResourceKind::Wood, Tier::One) => Self::Saw,
            (ResourceKind::Wood, Tier::Two) => Self::Axe,
            (ResourceKind::Wood, Tier::Three) => Self::Chainsaw,
            (ResourceKind::Stone, Tier::One) => Self::Pickaxe,
            (ResourceKind::Stone, Tier::Two) => Self::Drill,
            (ResourceKind::Stone, Tier::Three) => Self::Dynamite,
        }
    }

    /// Resource the tool is meant for.
    #[must_use]
    pub const fn resource(self) -> ResourceKind {
        match self {
            Self::Saw | Self::Axe | Self::Chainsaw => ResourceKind::Wood,
            Self::Pickaxe | Self::Drill | Self::Dynamite => ResourceKind::Stone,
        }
    }

    /// Tier of node the tool harvests.
    #[must_use]
    pub const fn tier(self) -> Tier {
        match self {
            Self::Saw | Self::Pickaxe => Tier::One,
            Self::Axe | Self::Drill => Tier::Two,
            Self::Chainsaw | Self::Dynamite => Tier::Three,
        }
    }

    /// Display name of the tool.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Saw => "saw",
            Self::Axe => "axe",
            Self::Chainsaw => "chainsaw",
            Self::Pickaxe => "pickaxe",
            Self::Drill => "drill",
            Self::Dynamite => "dynamite",
        }
    }
}

/// Rectangle the player must match when proposing a building.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConstructionTarget {
    kind: BuildingKind,
    length: u32,
    width: u32,
}

impl ConstructionTarget {
    /// Creates a target with explicit dimensions.
    #[must_use]
    pub const fn new(kind: BuildingKind, length: u32, width: u32) -> Self {
        Self {
            kind,
            length,
            width,
        }
    }

    /// Building the target belongs to.
    #[must_use]
    pub const fn kind(&self) -> BuildingKind {
        self.kind
    }

    /// Target length in units.
    #[must_use]
    pub const fn length(&self) -> u32 {
        self.length
    }

    /// Target width in units.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Target area, `length × width`.
    #[must_use]
    pub const fn area(&self) -> u64 {
        self.length as u64 * self.width as u64
    }

    /// Target perimeter, `2 × (length + width)`.
    #[must_use]
    pub const fn perimeter(&self) -> u64 {
        2 * (self.length as u64 + self.width as u64)
    }
}

/// Per-field outcome of the proposal validation gate.
///
/// Each flag is `true` when the field passed; the presentation layer uses
/// the failing flags to highlight the offending inputs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProposalReview {
    /// Length is a positive integer.
    pub length_valid: bool,
    /// Width is a positive integer.
    pub width_valid: bool,
    /// Area covers the target and fits in the stone stock.
    pub area_valid: bool,
    /// Perimeter covers the target and fits in the wood stock.
    pub perimeter_valid: bool,
}

impl ProposalReview {
    /// Reports whether every field passed.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.length_valid && self.width_valid && self.area_valid && self.perimeter_valid
    }

    /// Names of the fields that failed, in form order.
    pub fn flagged_fields(&self) -> impl Iterator<Item = &'static str> {
        [
            (self.length_valid, "length"),
            (self.width_valid, "width"),
            (self.area_valid, "area"),
            (self.perimeter_valid, "perimeter"),
        ]
        .into_iter()
        .filter(|(valid, _)| !valid)
        .map(|(_, name)| name)
    }
}

impl fmt::Display for ProposalReview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flagged: Vec<&str> = self.flagged_fields().collect();
        if flagged.is_empty() {
            f.write_str("all fields valid")
        } else {
            write!(f, "invalid {}", flagged.join(", "))
        }
    }
}

/// Reasons a proposal submission may be refused by the world.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProposalError {
    /// No proposal is open, so there is nothing to submit against.
    #[error("no construction proposal is open")]
    NoOpenProposal,
    /// An approved building still awaits placement.
    #[error("an approved building is still waiting to be placed")]
    PlacementPending,
    /// The submission failed the validation gate.
    #[error("proposal failed validation: {0}")]
    Invalid(ProposalReview),
    /// The ledger refused the debit.
    #[error("not enough {0} in stock")]
    InsufficientStock(ResourceKind),
}

/// Reasons a building placement request may be rejected.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementError {
    /// No proposal has been approved, so there is nothing to place.
    #[error("no approved project awaits placement")]
    NoApprovedProject,
    /// The requested building differs from the approved one.
    #[error("approved project is a {approved}")]
    KindMismatch {
        /// Building kind that was approved.
        approved: BuildingKind,
    },
    /// Part of the footprint lies outside the grid.
    #[error("footprint extends beyond the grid")]
    OutOfBounds,
    /// Part of the footprint overlaps an existing building.
    #[error("footprint overlaps an existing building")]
    Occupied,
}
