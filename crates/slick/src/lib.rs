//! Slick: a grid engine for coordinating oil-spill patrol robots.
//!
//! This is the facade crate that re-exports the public API of every Slick
//! sub-crate. Most users only need `slick` as a dependency.
//!
//! # Quick start
//!
//! ```rust
//! use slick::prelude::*;
//! use slick::io::{RandomWalkConfig, RandomWalkTransport};
//!
//! // One particle in the north-east cell of a 2x2 grid.
//! let window = BoundingBox::new(-1.0, -1.0, 1.0, 1.0);
//! let particles = ParticleSet::from_points([LonLat::new(0.5, 0.5)]);
//! let transport = RandomWalkTransport::new(RandomWalkConfig::default(), particles).unwrap();
//!
//! let config = SimulationConfig { window, resolution: 1.0, ..Default::default() };
//! let mut engine = PatrolEngine::new(config, Box::new(transport)).unwrap();
//!
//! let region = Region::rectangle(&window).unwrap().to_shape();
//! let mut mission = MissionConfig::new(region, vec![RobotConfig::new(RobotId(1))]);
//! mission.resolution = 1.0;
//! engine.attach_mission(&mission).unwrap();
//!
//! // The robot sweeps the cell: its particle is consumed.
//! let outcome = engine.report_feedback(&Feedback::new(RobotId(1), 1, 1, 45.0)).unwrap();
//! assert_eq!(outcome.consumed, 1);
//! assert_eq!(engine.snapshot().mission_density().unwrap().get(1, 1), Some(0.0));
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `slick-core` | ids, geography, particles, surfaces, the transport trait |
//! | [`space`] | `slick-space` | polygons, grids, rasterization, particle binning |
//! | [`fields`] | `slick-fields` | potential field, KDE, density pipeline |
//! | [`engine`] | `slick-engine` | configuration, patrol engine, threaded service |
//! | [`io`] | `slick-io` | loaders, snapshot store, random-walk transport |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types and the transport trait (`slick-core`).
pub use slick_core as types;

/// Polygons, grid geometry, rasterization and binning (`slick-space`).
pub use slick_space as space;

/// Potential field, KDE and the density pipeline (`slick-fields`).
pub use slick_fields as fields;

/// Configuration, the patrol engine and the threaded service
/// (`slick-engine`).
///
/// [`engine::PatrolEngine`] is the synchronous core;
/// [`engine::PatrolService`] runs it on its own scheduler thread.
pub use slick_engine as engine;

/// File-backed collaborators (`slick-io`).
pub use slick_io as io;

/// Common imports for typical Slick usage.
///
/// ```rust
/// use slick::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use slick_core::{
        BoundingBox, FlyMask, LonLat, ParticleSet, RobotId, Surface, TickId, Transport,
        TransportError,
    };

    // Space
    pub use slick_space::{GridSpec, Region, RegionShape};

    // Fields
    pub use slick_fields::SensitivityPoint;

    // Engine
    pub use slick_engine::{
        ConfigError, Feedback, FeedbackError, FeedbackOutcome, MissionConfig, PatrolEngine,
        PatrolHandle, PatrolService, PatrolSnapshot, RobotConfig, SensitivityMode, ServiceError,
        SimulationConfig, TickError,
    };
}
