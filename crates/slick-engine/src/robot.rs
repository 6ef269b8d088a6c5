//! Robots and the id-indexed fleet.

use indexmap::IndexMap;
use slick_core::RobotId;

use crate::config::{ConfigError, RobotConfig};

/// Number of reactive-strategy weights per robot.
pub const STRATEGY_WEIGHTS: usize = 5;

/// Last reported grid position and heading.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RobotPose {
    /// Grid column.
    pub x: usize,
    /// Grid row.
    pub y: usize,
    /// Heading as reported, in the robot's own convention.
    pub heading: f64,
}

/// Whether a robot has reported a position yet.
///
/// There is no terminal state: robots persist for the mission lifetime.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum RobotState {
    /// Configured, no feedback received.
    #[default]
    Idle,
    /// At least one feedback received.
    Active(RobotPose),
}

/// A patrol robot.
#[derive(Clone, Debug, PartialEq)]
pub struct Robot {
    id: RobotId,
    weights: [f64; STRATEGY_WEIGHTS],
    state: RobotState,
}

impl Robot {
    /// An idle robot from its configuration.
    pub fn new(config: &RobotConfig) -> Self {
        Self {
            id: config.id,
            weights: config.weights,
            state: RobotState::Idle,
        }
    }

    /// Robot id.
    pub fn id(&self) -> RobotId {
        self.id
    }

    /// Reactive-strategy weights.
    pub fn weights(&self) -> &[f64; STRATEGY_WEIGHTS] {
        &self.weights
    }

    /// Current state.
    pub fn state(&self) -> RobotState {
        self.state
    }

    /// Last pose, if any.
    pub fn pose(&self) -> Option<RobotPose> {
        match self.state {
            RobotState::Idle => None,
            RobotState::Active(pose) => Some(pose),
        }
    }

    /// Record a new pose. Moves `Idle` to `Active`.
    pub fn report(&mut self, pose: RobotPose) {
        self.state = RobotState::Active(pose);
    }
}

/// Robots keyed by id, in configuration order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RobotFleet {
    robots: IndexMap<RobotId, Robot>,
}

impl RobotFleet {
    /// Build a fleet, rejecting duplicate ids.
    pub fn from_configs(configs: &[RobotConfig]) -> Result<Self, ConfigError> {
        let mut robots = IndexMap::with_capacity(configs.len());
        for config in configs {
            if robots.insert(config.id, Robot::new(config)).is_some() {
                return Err(ConfigError::DuplicateRobot { id: config.id });
            }
        }
        Ok(Self { robots })
    }

    /// Look up a robot.
    pub fn get(&self, id: RobotId) -> Option<&Robot> {
        self.robots.get(&id)
    }

    /// Look up a robot for mutation.
    pub fn get_mut(&mut self, id: RobotId) -> Option<&mut Robot> {
        self.robots.get_mut(&id)
    }

    /// Whether `id` is registered.
    pub fn contains(&self, id: RobotId) -> bool {
        self.robots.contains_key(&id)
    }

    /// Robots in configuration order.
    pub fn iter(&self) -> impl Iterator<Item = &Robot> + '_ {
        self.robots.values()
    }

    /// Number of robots.
    pub fn len(&self) -> usize {
        self.robots.len()
    }

    /// Whether the fleet is empty.
    pub fn is_empty(&self) -> bool {
        self.robots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fleet(ids: &[u32]) -> Result<RobotFleet, ConfigError> {
        let configs: Vec<_> = ids.iter().map(|&i| RobotConfig::new(RobotId(i))).collect();
        RobotFleet::from_configs(&configs)
    }

    #[test]
    fn robots_start_idle() {
        let f = fleet(&[4, 2]).unwrap();
        let r = f.get(RobotId(4)).unwrap();
        assert_eq!(r.state(), RobotState::Idle);
        assert_eq!(r.pose(), None);
        assert_eq!(r.weights(), &[0.2; STRATEGY_WEIGHTS]);
    }

    #[test]
    fn report_activates() {
        let mut f = fleet(&[1]).unwrap();
        let pose = RobotPose {
            x: 3,
            y: 4,
            heading: 90.0,
        };
        f.get_mut(RobotId(1)).unwrap().report(pose);
        assert_eq!(f.get(RobotId(1)).unwrap().pose(), Some(pose));
    }

    #[test]
    fn fleet_keeps_configuration_order() {
        let f = fleet(&[9, 3, 5]).unwrap();
        let ids: Vec<_> = f.iter().map(|r| r.id().0).collect();
        assert_eq!(ids, vec![9, 3, 5]);
        assert_eq!(f.len(), 3);
        assert!(!f.contains(RobotId(4)));
    }

    #[test]
    fn duplicate_ids_rejected() {
        match fleet(&[1, 2, 1]) {
            Err(ConfigError::DuplicateRobot { id: RobotId(1) }) => {}
            other => panic!("expected DuplicateRobot, got {other:?}"),
        }
    }
}
