//! Greedy bot that plays gathering rounds and builds the catalogue in order.

use geometropolis_core::{BuildingKind, Command, Event, ResourceKind};
use geometropolis_system_builder::{first_free_anchor, Builder, BuilderInput, PlacementPreview};
use geometropolis_system_gathering::{self as gathering, GatherOutcome, GatherSession};
use geometropolis_world::{self as world, query, World};
use tracing::{debug, info, warn};

use crate::settings::Settings;

/// Totals reported once every round has been played.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Summary {
    pub(crate) rounds: u32,
    pub(crate) buildings: usize,
    pub(crate) score: f64,
}

/// Plays `rounds` rounds of gathering and construction against `world`.
pub(crate) fn run(world: &mut World, settings: &Settings, rounds: u32) -> Summary {
    let mut builder = Builder::new();
    let catalogue = BuildingKind::ALL.iter().copied().cycle();

    for (round, kind) in (0..rounds).zip(catalogue) {
        for resource in ResourceKind::ALL {
            let config = settings.gathering.session_config(resource, round);
            let outcome = gather(
                &config,
                settings.gathering.play_area_width,
                settings.gathering.play_area_height,
            );
            info!(
                round,
                resource = %outcome.resource,
                collected = outcome.collected,
                reason = %outcome.reason,
                "gathering finished"
            );
            let mut events = Vec::new();
            world::apply(
                world,
                Command::DepositResources {
                    resource,
                    amount: outcome.collected,
                },
                &mut events,
            );
        }

        construct(world, &mut builder, kind);
    }

    Summary {
        rounds,
        buildings: query::grid(world).buildings().len(),
        score: query::score(world),
    }
}

/// Plays one session to completion, harvesting the first reachable node every second.
fn gather(config: &gathering::Config, width: f32, height: f32) -> GatherOutcome {
    let mut session = GatherSession::new(config);
    session.generate(width, height);
    session.start();

    loop {
        if let Some(outcome) = session.outcome() {
            return outcome;
        }
        let next = session
            .harvestable()
            .next()
            .map(|node| (node.id(), node.tier()));
        if let Some((node, tier)) = next {
            session.select_tool(Some(session.tool_for(tier)));
            match session.try_harvest(node) {
                Ok(harvest) => debug!(node = node.get(), gained = harvest.gained, "bot harvested"),
                Err(rejection) => warn!(reason = rejection.code(), "bot harvest rejected"),
            }
        }
        let _ = session.tick();
    }
}

/// Proposes `kind` at its exact target and places it at the first free anchor.
fn construct(world: &mut World, builder: &mut Builder, kind: BuildingKind) {
    let mut events = Vec::new();
    world::apply(world, Command::OpenProposal { kind }, &mut events);
    let Some(target) = query::active_target(world) else {
        warn!(%kind, ?events, "proposal could not be opened");
        return;
    };

    let affordable = target.area() <= query::quantity(world, ResourceKind::Stone)
        && target.perimeter() <= query::quantity(world, ResourceKind::Wood);
    if !affordable {
        world::apply(world, Command::CancelProposal, &mut events);
        info!(
            %kind,
            area = target.area(),
            perimeter = target.perimeter(),
            "target not affordable, proposal cancelled"
        );
        return;
    }

    events.clear();
    world::apply(
        world,
        Command::SubmitProposal {
            length: i64::from(target.length()),
            width: i64::from(target.width()),
        },
        &mut events,
    );
    if let Some(score) = events.iter().find_map(|event| match event {
        Event::ProposalAccepted { score, .. } => Some(*score),
        _ => None,
    }) {
        info!(%kind, length = target.length(), width = target.width(), score, "proposal accepted");
    }

    let grid = query::grid(world);
    let anchor = first_free_anchor(grid.rows(), grid.columns(), |anchor| {
        query::footprint_preview(world, anchor).1
    });
    let preview = anchor.map(|anchor| {
        let (footprint, placeable) = query::footprint_preview(world, anchor);
        PlacementPreview::new(kind, anchor, footprint, placeable)
    });
    if preview.is_none() {
        warn!(%kind, "no free anchor left on the grid");
    }

    let mut commands = Vec::new();
    builder.handle(&events, preview, BuilderInput::new(true), &mut commands);
    events.clear();
    for command in commands {
        world::apply(world, command, &mut events);
    }
    for event in &events {
        match event {
            Event::BuildingPlaced {
                building,
                footprint,
                ..
            } => info!(%kind, building = building.get(), north = ?footprint.north(), "building placed"),
            Event::PlacementRejected { reason, .. } => warn!(%kind, %reason, "placement rejected"),
            _ => {}
        }
    }
    builder.handle(&events, None, BuilderInput::default(), &mut Vec::new());
}
