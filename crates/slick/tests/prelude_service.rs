//! Integration test: the facade prelude is enough to run a patrol.

use std::time::Duration;

use slick::prelude::*;
use slick_test_utils::fixtures::{self, UNIT_SQUARE};
use slick_test_utils::MockTransport;

#[test]
fn patrol_through_the_prelude() {
    let config = SimulationConfig {
        window: UNIT_SQUARE,
        resolution: 1.0,
        ..Default::default()
    };
    let transport = MockTransport::new(fixtures::particles(&[(0.5, 0.5), (0.25, 0.75)]));
    let engine = PatrolEngine::new(config, Box::new(transport)).unwrap();
    let mut service = PatrolService::start(engine, Duration::from_secs(3600)).unwrap();
    let handle: PatrolHandle = service.handle();

    let mut mission = MissionConfig::new(fixtures::unit_square(), vec![RobotConfig::new(RobotId(3))]);
    mission.resolution = 1.0;
    handle.attach_mission(mission).unwrap();

    let outcome = handle
        .report_feedback(Feedback::new(RobotId(3), 1, 1, 0.0))
        .unwrap();
    assert_eq!(outcome.consumed, 2);

    let snap = handle.latest();
    let robot = snap.robot(RobotId(3)).unwrap();
    assert_eq!(robot.position, Some(LonLat::new(0.0, 0.0)));
    assert!(snap.particles_in(&UNIT_SQUARE).is_empty());
    service.shutdown();
}
