#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure placement-mode system that turns cursor input into building placement commands.

use geometropolis_core::{BuildingKind, Command, Event, Footprint, GridIndex};

/// Hover feedback for a building that could be placed at the cursor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlacementPreview {
    /// Kind of building awaiting placement.
    pub kind: BuildingKind,
    /// Cell under the cursor, used as the footprint's north corner.
    pub anchor: GridIndex,
    /// Cells the building would cover.
    pub footprint: Footprint,
    /// Whether every footprint cell is on the grid and vacant.
    pub placeable: bool,
}

impl PlacementPreview {
    /// Creates a new placement preview descriptor.
    #[must_use]
    pub const fn new(
        kind: BuildingKind,
        anchor: GridIndex,
        footprint: Footprint,
        placeable: bool,
    ) -> Self {
        Self {
            kind,
            anchor,
            footprint,
            placeable,
        }
    }
}

/// Input snapshot distilled from adapter-provided frame input data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BuilderInput {
    /// Indicates whether the player confirmed a placement on this frame.
    pub confirm_action: bool,
}

impl BuilderInput {
    /// Creates a new input descriptor with explicit field values.
    #[must_use]
    pub const fn new(confirm_action: bool) -> Self {
        Self { confirm_action }
    }
}

/// Placement system that follows proposal outcomes and emits placement commands.
#[derive(Debug, Clone, Default)]
pub struct Builder {
    approved: Option<BuildingKind>,
}

impl Builder {
    /// Creates a new builder system instance.
    #[must_use]
    pub const fn new() -> Self {
        Self { approved: None }
    }

    /// Building kind currently waiting to be placed, as observed from events.
    #[must_use]
    pub const fn approved(&self) -> Option<BuildingKind> {
        self.approved
    }

    /// Consumes world events and adapter-derived input to emit placement commands.
    ///
    /// A confirm only produces a command when a project is approved, the preview
    /// targets that project's kind and the preview is placeable.
    pub fn handle(
        &mut self,
        events: &[Event],
        preview: Option<PlacementPreview>,
        input: BuilderInput,
        out: &mut Vec<Command>,
    ) {
        for event in events {
            match event {
                Event::ProposalAccepted { kind, .. } => self.approved = Some(*kind),
                Event::BuildingPlaced { .. } => self.approved = None,
                _ => {}
            }
        }

        let Some(approved) = self.approved else {
            return;
        };
        if !input.confirm_action {
            return;
        }
        if let Some(preview) = preview {
            if preview.placeable && preview.kind == approved {
                out.push(Command::PlaceBuilding {
                    kind: preview.kind,
                    anchor: preview.anchor,
                });
            }
        }
    }
}

/// Scans anchors row by row and returns the first one whose footprint is placeable.
///
/// `placeable` should mirror the world's footprint preview query.
pub fn first_free_anchor<F>(rows: u32, columns: u32, mut placeable: F) -> Option<GridIndex>
where
    F: FnMut(GridIndex) -> bool,
{
    let rows = i32::try_from(rows).ok()?;
    let columns = i32::try_from(columns).ok()?;
    (0..rows)
        .flat_map(|row| (0..columns).map(move |column| GridIndex::new(row, column)))
        .find(|anchor| placeable(*anchor))
}
