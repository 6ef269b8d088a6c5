//! Requests sent from service handles to the scheduler thread.

use crossbeam_channel::Sender;
use slick_core::{ParticleSet, TickId};

use crate::config::{ConfigError, MissionConfig};
use crate::engine::TickError;
use crate::mission::{Feedback, FeedbackError, FeedbackOutcome};

/// One request, paired with the channel its result goes back on.
pub(crate) enum Command {
    Feedback {
        feedback: Feedback,
        reply: Sender<Result<FeedbackOutcome, FeedbackError>>,
    },
    ReportOil {
        sightings: ParticleSet,
        reply: Sender<Result<(), FeedbackError>>,
    },
    AttachMission {
        config: Box<MissionConfig>,
        reply: Sender<Result<(), ConfigError>>,
    },
    DetachMission {
        reply: Sender<bool>,
    },
    TickNow {
        reply: Sender<Result<TickId, TickError>>,
    },
    /// No-op that wakes the scheduler so it sees the shutdown flag.
    Wake,
}
