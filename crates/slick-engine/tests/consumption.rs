//! Integration test: robot feedback clears its cell from the live
//! particle set, and both density surfaces follow.

use proptest::prelude::*;
use slick_core::{ParticleSet, RobotId, TickId};
use slick_engine::{
    Feedback, FeedbackError, MissionConfig, PatrolEngine, RobotConfig, SimulationConfig,
};
use slick_test_utils::fixtures::{self, UNIT_SQUARE};
use slick_test_utils::MockTransport;

fn unit_config() -> SimulationConfig {
    SimulationConfig {
        window: UNIT_SQUARE,
        resolution: 1.0,
        ..SimulationConfig::default()
    }
}

fn unit_mission() -> MissionConfig {
    let mut mission = MissionConfig::new(fixtures::unit_square(), vec![RobotConfig::new(RobotId(1))]);
    mission.resolution = 1.0;
    mission
}

fn engine_with(particles: ParticleSet) -> PatrolEngine {
    let mut engine =
        PatrolEngine::new(unit_config(), Box::new(MockTransport::new(particles))).unwrap();
    engine.attach_mission(&unit_mission()).unwrap();
    engine
}

// ── Scenarios ────────────────────────────────────────────────────

#[test]
fn feedback_clears_only_the_reported_cell() {
    let mut engine = engine_with(fixtures::particles(&[(0.5, 0.5), (-0.5, -0.5)]));
    let before = engine.mission().unwrap().density().clone();
    assert_eq!(before.get(1, 1), Some(5.0));
    assert_eq!(before.get(0, 0), Some(5.0));

    let outcome = engine
        .report_feedback(&Feedback::new(RobotId(1), 1, 1, 90.0))
        .unwrap();
    assert_eq!(outcome.consumed, 1);
    assert_eq!(outcome.remaining, 1);

    let mission = engine.mission().unwrap();
    assert_eq!(mission.cache().index().count_at(1, 1), 0);
    assert_eq!(mission.density().get(1, 1), Some(0.0));
    assert_eq!(mission.density().get(0, 0), before.get(0, 0));
    assert_eq!(mission.density().get(1, 0), before.get(1, 0));
    assert_eq!(mission.density().get(0, 1), before.get(0, 1));

    // The simulation cache saw the same consumption.
    assert_eq!(engine.simulation().particles().len(), 1);
    assert_eq!(engine.simulation().cache().index().count_at(1, 1), 0);
    assert_eq!(engine.metrics().consumed_total, 1);

    let snap = engine.snapshot();
    let robot = snap.robot(RobotId(1)).unwrap();
    assert_eq!(robot.pose.map(|p| (p.x, p.y)), Some((1, 1)));
}

#[test]
fn feedback_on_empty_cell_consumes_nothing() {
    let mut engine = engine_with(fixtures::particles(&[(0.5, 0.5)]));
    let outcome = engine
        .report_feedback(&Feedback::new(RobotId(1), 0, 0, 0.0))
        .unwrap();
    assert_eq!(outcome.consumed, 0);
    assert_eq!(engine.simulation().particles().len(), 1);
}

#[test]
fn unknown_robot_leaves_state_untouched() {
    let particles = fixtures::particles(&[(0.5, 0.5)]);
    let transport = MockTransport::new(particles.clone());
    let handle = transport.handle();
    let mut engine = PatrolEngine::new(unit_config(), Box::new(transport)).unwrap();
    engine.attach_mission(&unit_mission()).unwrap();

    let feedback = Feedback::new(RobotId(9), 1, 1, 0.0)
        .with_sightings(vec![0.1], vec![0.1])
        .unwrap();
    match engine.report_feedback(&feedback) {
        Err(FeedbackError::UnknownRobot { id }) => assert_eq!(id, RobotId(9)),
        other => panic!("expected UnknownRobot, got {other:?}"),
    }
    assert_eq!(engine.simulation().particles(), &particles);
    assert!(handle.log().injected.is_empty());
    assert!(engine.mission().unwrap().robots().get(RobotId(1)).unwrap().pose().is_none());
}

#[test]
fn out_of_bounds_cell_is_rejected() {
    let mut engine = engine_with(fixtures::particles(&[(0.5, 0.5)]));
    match engine.report_feedback(&Feedback::new(RobotId(1), 2, 0, 0.0)) {
        Err(FeedbackError::CellOutOfBounds { width, height, .. }) => {
            assert_eq!((width, height), (2, 2));
        }
        other => panic!("expected CellOutOfBounds, got {other:?}"),
    }
    assert_eq!(engine.simulation().particles().len(), 1);
}

#[test]
fn feedback_without_mission_fails() {
    let mut engine =
        PatrolEngine::new(unit_config(), Box::new(MockTransport::new(ParticleSet::new()))).unwrap();
    match engine.report_feedback(&Feedback::new(RobotId(1), 0, 0, 0.0)) {
        Err(FeedbackError::NoMission) => {}
        other => panic!("expected NoMission, got {other:?}"),
    }
}

#[test]
fn sightings_reach_the_transport_and_the_next_tick() {
    let transport = MockTransport::new(fixtures::particles(&[(0.5, 0.5)]));
    let handle = transport.handle();
    let mut engine = PatrolEngine::new(unit_config(), Box::new(transport)).unwrap();
    engine.attach_mission(&unit_mission()).unwrap();

    let feedback = Feedback::new(RobotId(1), 1, 1, 0.0)
        .with_sightings(vec![-0.5], vec![0.5])
        .unwrap();
    engine.report_feedback(&feedback).unwrap();
    assert_eq!(handle.log().injected.len(), 1);

    // The consumed set is persisted first; the sighting joins on advance.
    let report = engine.tick(std::time::Duration::from_secs(180)).unwrap();
    assert_eq!(report.tick_id, TickId(1));
    assert_eq!(handle.log().persisted[0].len(), 0);
    assert_eq!(engine.simulation().particles().len(), 1);
    assert_eq!(engine.simulation().cache().index().count_at(0, 1), 1);
}

#[test]
fn fully_excluded_mission_stays_at_baseline() {
    let mut engine =
        PatrolEngine::new(unit_config(), Box::new(MockTransport::new(fixtures::particles(&[(0.5, 0.5)]))))
            .unwrap();
    let mut mission = unit_mission();
    mission.region = fixtures::fully_excluded(&UNIT_SQUARE);
    engine.attach_mission(&mission).unwrap();
    let density = engine.mission().unwrap().density();
    assert!(density.values().iter().all(|&v| v == -1.0));
}

// ── Properties ───────────────────────────────────────────────────

proptest! {
    #[test]
    fn consumption_removes_exactly_the_reported_cell(
        points in prop::collection::vec((-1.0f64..=1.0, -1.0f64..=1.0), 0..40),
        x in 0usize..2,
        y in 0usize..2,
    ) {
        let mut engine = engine_with(fixtures::particles(&points));
        let expected = engine.mission().unwrap().cache().index().count_at(x, y) as usize;
        let original = engine.simulation().particles().clone();
        let doomed = engine.mission().unwrap().cache().originals_in_cell(x, y);
        let kept: Vec<usize> = (0..original.len()).filter(|i| !doomed.contains(i)).collect();

        let outcome = engine.report_feedback(&Feedback::new(RobotId(1), x, y, 0.0)).unwrap();
        prop_assert_eq!(outcome.consumed, expected);
        prop_assert_eq!(outcome.remaining, points.len() - expected);
        prop_assert_eq!(engine.mission().unwrap().cache().index().count_at(x, y), 0);
        // Particles binned elsewhere, or outside the region, survive in order.
        prop_assert_eq!(engine.simulation().particles(), &original.select(&kept));
    }
}
