//! State of one tracked subject in a live session.

use crate::config::DressingConfig;
use crate::face_detection::{FaceRegion, FaceTracker, TrackedFace};
use crate::waist::WaistEstimator;
use log::debug;

/// Stabilized face, miss counter and waist calibration of the current subject
///
/// A session belongs to one live video stream. When the subject leaves the
/// frame everything is reset so the next person calibrates from scratch.
#[derive(Debug, Clone)]
pub struct DressingSession {
    tracker: FaceTracker,
    waist: WaistEstimator,
}

impl DressingSession {
    #[must_use]
    pub fn new(config: &DressingConfig) -> Self {
        Self {
            tracker: FaceTracker::new(&config.detection),
            waist: WaistEstimator::new(&config.waist),
        }
    }

    /// Feed one frame's detections, resetting the waist when the subject is lost
    pub fn observe(&mut self, detections: &[FaceRegion]) -> TrackedFace {
        let tracked = self.tracker.observe(detections);
        if tracked.subject_lost {
            self.waist.recalculate();
        }
        tracked
    }

    /// Last committed face
    #[must_use]
    pub fn face(&self) -> FaceRegion {
        self.tracker.current()
    }

    #[must_use]
    pub fn tracker(&self) -> &FaceTracker {
        &self.tracker
    }

    #[must_use]
    pub fn waist(&self) -> &WaistEstimator {
        &self.waist
    }

    pub fn waist_mut(&mut self) -> &mut WaistEstimator {
        &mut self.waist
    }

    /// Request a fresh waist calibration on the next frame with tops
    pub fn recalculate_waist_width(&mut self) {
        debug!("Waist recalibration requested");
        self.waist.recalculate();
    }

    /// Forget the subject entirely
    pub fn reset(&mut self) {
        self.tracker.reset();
        self.waist.recalculate();
    }
}
