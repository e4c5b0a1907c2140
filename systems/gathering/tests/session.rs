use geometropolis_core::{ResourceKind, Tier, ToolKind};
use geometropolis_system_gathering::{
    Config, EndReason, GatherSession, HarvestRejection, NodeId, NodePlacement, SessionPhase,
    ToolInventory,
};

fn wood() -> Config {
    Config::default()
}

fn placements(tiers: &[Tier]) -> Vec<NodePlacement> {
    tiers
        .iter()
        .zip(0u16..)
        .map(|(tier, index)| NodePlacement::new(*tier, 300.0 + f32::from(index) * 150.0, 400.0))
        .collect()
}

fn node_of(session: &GatherSession, tier: Tier) -> NodeId {
    session
        .nodes()
        .iter()
        .find(|node| node.tier() == tier && !node.is_harvested())
        .map(|node| node.id())
        .expect("scripted node of tier")
}

#[test]
fn matching_tool_harvests_and_spends_one_use() {
    let mut session = GatherSession::scripted(
        &wood(),
        &placements(&[Tier::One, Tier::Two, Tier::Three]),
        ToolInventory::new([2, 1, 1]),
    );
    session.start();
    session.select_tool(Some(ToolKind::Axe));

    let node = node_of(&session, Tier::Two);
    let harvest = session.try_harvest(node).expect("axe matches tier two");

    assert_eq!(harvest.tier, Tier::Two);
    assert_eq!(harvest.tool, ToolKind::Axe);
    assert!((12..=20).contains(&harvest.gained), "tier two yield range");
    assert_eq!(session.collected(), u64::from(harvest.gained));
    assert_eq!(session.tools().count(Tier::Two), 0);
    assert_eq!(session.remaining_nodes(Tier::Two), 0);
    assert!(session.node(node).is_some_and(|node| node.is_harvested()));
    assert_eq!(session.phase(), SessionPhase::Running);
}

#[test]
fn wrong_tool_leaves_session_untouched() {
    let mut session = GatherSession::scripted(
        &wood(),
        &placements(&[Tier::One, Tier::Two]),
        ToolInventory::new([3, 3, 3]),
    );
    session.select_tool(Some(ToolKind::Saw));
    let node = node_of(&session, Tier::Two);

    assert_eq!(session.try_harvest(node), Err(HarvestRejection::WrongTool));
    assert_eq!(session.tools(), &ToolInventory::new([3, 3, 3]));
    assert_eq!(session.collected(), 0);
    assert_eq!(session.remaining_nodes(Tier::Two), 1);
    assert!(session.node(node).is_some_and(|node| !node.is_harvested()));
}

#[test]
fn other_resource_tool_is_the_wrong_tool() {
    let mut session = GatherSession::scripted(
        &wood(),
        &placements(&[Tier::One]),
        ToolInventory::new([1, 0, 0]),
    );
    session.select_tool(Some(ToolKind::Pickaxe));
    let node = node_of(&session, Tier::One);
    assert_eq!(session.try_harvest(node), Err(HarvestRejection::WrongTool));
}

#[test]
fn rejection_reasons_are_reported_in_order() {
    let mut session = GatherSession::scripted(
        &wood(),
        &placements(&[Tier::One, Tier::One, Tier::Three]),
        ToolInventory::new([1, 0, 1]),
    );
    let first = session.nodes()[0].id();

    assert_eq!(
        session.try_harvest(NodeId::new(42)),
        Err(HarvestRejection::NotFound)
    );
    assert_eq!(
        session.try_harvest(first),
        Err(HarvestRejection::NoToolSelected)
    );

    session.select_tool(Some(ToolKind::Saw));
    assert!(session.try_harvest(first).is_ok());
    assert_eq!(
        session.try_harvest(first),
        Err(HarvestRejection::AlreadyHarvested)
    );

    let second = session.nodes()[1].id();
    assert_eq!(
        session.try_harvest(second),
        Err(HarvestRejection::NoToolCount)
    );
}

#[test]
fn deadlocked_tools_finish_the_round() {
    let mut session = GatherSession::scripted(
        &Config {
            resource: ResourceKind::Stone,
            ..Config::default()
        },
        &placements(&[Tier::One, Tier::One]),
        ToolInventory::new([0, 2, 1]),
    );
    session.start();

    assert!(session.is_finished());
    assert_eq!(session.end_reason(), Some(EndReason::NoMatchingTools));
    assert_eq!(
        session.end_reason().map(|reason| reason.to_string()).as_deref(),
        Some("no matching tools for remaining nodes")
    );
    assert_eq!(session.phase(), SessionPhase::Finished);
}

#[test]
fn expired_timer_always_finishes() {
    let mut session = GatherSession::scripted(
        &Config {
            duration_secs: 2,
            ..Config::default()
        },
        &placements(&[Tier::One, Tier::Two, Tier::Three]),
        ToolInventory::new([5, 5, 5]),
    );
    session.start();
    assert_eq!(session.tick(), 1);
    assert!(!session.is_finished());
    assert_eq!(session.tick(), 0);
    assert_eq!(session.tick(), 0, "timer stops at zero");

    assert!(session.is_finished());
    assert_eq!(session.end_reason(), Some(EndReason::TimeExpired));

    session.select_tool(Some(ToolKind::Saw));
    let node = node_of(&session, Tier::One);
    assert_eq!(
        session.try_harvest(node),
        Err(HarvestRejection::SessionFinished)
    );
    assert_eq!(session.collected(), 0);
}

#[test]
fn time_takes_priority_over_other_reasons() {
    let mut session = GatherSession::scripted(
        &Config {
            duration_secs: 1,
            ..Config::default()
        },
        &[],
        ToolInventory::new([0, 0, 0]),
    );
    assert_eq!(session.end_reason(), Some(EndReason::OutOfTools));
    let _ = session.tick();
    assert_eq!(session.end_reason(), Some(EndReason::TimeExpired));
}

#[test]
fn harvesting_everything_reports_all_harvested() {
    let mut session = GatherSession::scripted(
        &wood(),
        &placements(&[Tier::Three]),
        ToolInventory::new([1, 0, 2]),
    );
    session.start();
    session.select_tool(Some(ToolKind::Chainsaw));
    let node = node_of(&session, Tier::Three);
    let harvest = session.try_harvest(node).expect("chainsaw fells tier three");
    assert!((25..=30).contains(&harvest.gained));

    let outcome = session.outcome().expect("round is over");
    assert_eq!(outcome.reason, EndReason::AllHarvested);
    assert_eq!(outcome.resource, ResourceKind::Wood);
    assert_eq!(outcome.collected, u64::from(harvest.gained));
}

#[test]
fn generated_session_is_deterministic_and_playable() {
    let config = Config {
        rng_seed: 11,
        ..Config::default()
    };
    let mut first = GatherSession::new(&config);
    let mut second = GatherSession::new(&config);
    first.generate(1920.0, 1080.0);
    second.generate(1920.0, 1080.0);

    assert_eq!(first.nodes(), second.nodes());
    assert_eq!(first.tools(), second.tools());
    assert!(!first.nodes().is_empty());
    assert!(first.harvestable().next().is_some());
}

#[test]
fn tiny_play_area_drops_every_node() {
    let mut session = GatherSession::new(&Config::default());
    session.generate(240.0, 240.0);

    assert!(session.nodes().is_empty());
    assert!(session.dropped_count() >= 6, "at least one node per tier minimum");
    for tier in Tier::ALL {
        assert_eq!(session.remaining_nodes(tier), 0);
    }
    assert_eq!(session.end_reason(), Some(EndReason::AllHarvested));
}
