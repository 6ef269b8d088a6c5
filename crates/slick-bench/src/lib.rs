//! Benchmark profiles for the Slick patrol engine.
//!
//! - [`coastal_profile`]: the default 2.5° coastal window at 111 cells per
//!   degree (278x278 cells) with an irregular shoreline and one exclusion.
//! - [`coastal_mission`]: a mission over the northern half of that window.
//! - [`spill_particles`]: a seeded Gaussian spill cloud.

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use slick_core::{LonLat, ParticleSet, RobotId};
use slick_engine::config::DEFAULT_WINDOW;
use slick_engine::{MissionConfig, RobotConfig, SensitivityMode, SimulationConfig};
use slick_fields::SensitivityPoint;
use slick_space::RegionShape;

/// Centre of the benchmark spill.
pub const SPILL_CENTER: LonLat = LonLat::new(-35.2, -9.6);

fn ll(lon: f64, lat: f64) -> LonLat {
    LonLat::new(lon, lat)
}

/// Sea-side polygon of the default window, with a small island excluded.
pub fn coastal_region() -> RegionShape {
    RegionShape {
        outer: vec![
            ll(-36.5, -11.0),
            ll(-34.0, -11.0),
            ll(-34.0, -8.5),
            ll(-35.1, -8.5),
            ll(-35.4, -9.2),
            ll(-35.9, -9.7),
            ll(-36.2, -10.3),
            ll(-36.5, -10.5),
        ],
        inner: vec![vec![
            ll(-34.9, -9.9),
            ll(-34.7, -9.9),
            ll(-34.7, -9.7),
            ll(-34.9, -9.7),
        ]],
        coastline: None,
    }
}

/// Simulation over the default window at the default resolution.
pub fn coastal_profile() -> SimulationConfig {
    SimulationConfig {
        window: DEFAULT_WINDOW,
        region: Some(coastal_region()),
        ..SimulationConfig::default()
    }
}

/// A four-robot hazard-potential mission over the northern coast.
pub fn coastal_mission() -> MissionConfig {
    let region = RegionShape {
        outer: vec![
            ll(-35.5, -9.5),
            ll(-34.0, -9.5),
            ll(-34.0, -8.5),
            ll(-35.1, -8.5),
            ll(-35.4, -9.2),
        ],
        inner: Vec::new(),
        coastline: None,
    };
    let robots = (1..=4).map(|id| RobotConfig::new(RobotId(id))).collect();
    let mut mission = MissionConfig::new(region, robots);
    mission.sensitivity = SensitivityMode::HazardPotential;
    mission.sensitivity_points = vec![
        SensitivityPoint::new(-35.3, -9.1, 4.0),
        SensitivityPoint::new(-35.0, -8.7, 2.0),
        SensitivityPoint::new(-34.6, -9.3, 1.0),
    ];
    mission
}

/// `n` particles normally spread around [`SPILL_CENTER`] with standard
/// deviation `spread` degrees.
pub fn spill_particles(n: usize, spread: f64, seed: u64) -> ParticleSet {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut gaussian = move || {
        let u1 = 1.0 - rng.random::<f64>();
        let u2 = rng.random::<f64>();
        (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
    };
    (0..n)
        .map(|_| {
            ll(
                SPILL_CENTER.lon + spread * gaussian(),
                SPILL_CENTER.lat + spread * gaussian(),
            )
        })
        .collect()
}
