//! Live dressing with face detection on a background worker.
//!
//! The render side never waits for detection. A frame is handed to the
//! worker only while it is idle, frames arriving meanwhile are dropped, and
//! rendering always uses the most recently committed face.

use crate::config::PlacementConfig;
use crate::engine::{dress_realtime, DressingRoom};
use crate::face_detection::{is_empty_region, FaceRegion, FaceTracker};
use crate::garment::Outfit;
use crate::waist::WaistEstimator;
use crate::{Error, Result};
use log::{debug, error, info};
use opencv::core::Mat;
use opencv::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

/// State shared between the render side and the detection worker
struct Shared {
    idle: AtomicBool,
    subject_lost: AtomicBool,
    face: Mutex<FaceRegion>,
}

impl Shared {
    fn commit(&self, region: FaceRegion) {
        match self.face.lock() {
            Ok(mut face) => *face = region,
            Err(poisoned) => *poisoned.into_inner() = region,
        }
    }

    fn latest(&self) -> FaceRegion {
        match self.face.lock() {
            Ok(face) => *face,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

/// Real-time dressing room for one video stream
///
/// Owns a detection worker thread that is stopped and joined on drop.
pub struct LiveDressingRoom {
    frames: Option<SyncSender<Mat>>,
    shared: Arc<Shared>,
    worker: Option<JoinHandle<()>>,
    placement: PlacementConfig,
    waist: WaistEstimator,
}

impl LiveDressingRoom {
    /// Move `room` onto a new detection worker
    ///
    /// # Errors
    ///
    /// Returns an error if the worker thread cannot be started
    pub fn spawn(room: DressingRoom) -> Result<Self> {
        let placement = room.config().placement.clone();
        let waist = WaistEstimator::new(&room.config().waist);
        let shared = Arc::new(Shared {
            idle: AtomicBool::new(true),
            subject_lost: AtomicBool::new(false),
            face: Mutex::new(FaceRegion::default()),
        });

        // capacity 1: the idle gate guarantees the slot is free when a frame is sent
        let (frames, receiver) = mpsc::sync_channel::<Mat>(1);
        let worker_shared = Arc::clone(&shared);
        let worker = thread::Builder::new()
            .name("face-detection".to_string())
            .spawn(move || detection_worker(room, &receiver, &worker_shared))?;

        info!("Live detection worker started");
        Ok(Self {
            frames: Some(frames),
            shared,
            worker: Some(worker),
            placement,
            waist,
        })
    }

    /// Hand a copy of `frame` to the worker if it is idle
    ///
    /// Returns whether the frame was taken.
    ///
    /// # Errors
    ///
    /// Returns `Error::Worker` if the worker has stopped
    pub fn offer_frame(&self, frame: &Mat) -> Result<bool> {
        if self
            .shared
            .idle
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Ok(false);
        }

        let Some(frames) = &self.frames else {
            return Err(Error::Worker("Detection worker was shut down".to_string()));
        };
        match frames.try_send(frame.try_clone()?) {
            Ok(()) => Ok(true),
            Err(TrySendError::Full(_)) => {
                self.shared.idle.store(true, Ordering::Release);
                Ok(false)
            }
            Err(TrySendError::Disconnected(_)) => Err(Error::Worker("Detection worker stopped".to_string())),
        }
    }

    /// Most recently committed face, empty when none is tracked
    #[must_use]
    pub fn latest_face(&self) -> FaceRegion {
        self.shared.latest()
    }

    /// Whether the worker is waiting for a frame
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.shared.idle.load(Ordering::Acquire)
    }

    /// Waist estimator of the current subject
    #[must_use]
    pub fn waist(&self) -> &WaistEstimator {
        &self.waist
    }

    /// Offer `frame` for detection and dress it at the latest face
    ///
    /// Returns whether a face was available to dress.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` for an empty frame, `Error::Worker` if the
    /// worker has stopped, or an error if an OpenCV operation fails
    pub fn render(&mut self, frame: &mut Mat, outfit: &Outfit) -> Result<bool> {
        if frame.empty() {
            return Err(Error::InvalidInput("Frame cannot be empty".to_string()));
        }
        self.offer_frame(frame)?;

        if self.shared.subject_lost.swap(false, Ordering::AcqRel) {
            debug!("Subject left the frame, waist will be measured again");
            self.waist.recalculate();
        }

        let face = self.latest_face();
        if is_empty_region(&face) {
            return Ok(false);
        }
        dress_realtime(frame, outfit, face, &self.placement, &mut self.waist)?;
        Ok(true)
    }

    /// Forget the waist calibration
    pub fn recalculate_waist_width(&mut self) {
        self.waist.recalculate();
    }
}

impl Drop for LiveDressingRoom {
    fn drop(&mut self) {
        // closing the channel ends the worker loop
        self.frames.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                error!("Detection worker panicked");
            }
        }
    }
}

fn detection_worker(mut room: DressingRoom, frames: &Receiver<Mat>, shared: &Shared) {
    let mut tracker = FaceTracker::new(&room.config().detection);
    while let Ok(frame) = frames.recv() {
        let tracked = room.track_face(&frame, &mut tracker);
        if tracked.subject_lost {
            shared.subject_lost.store(true, Ordering::Release);
        }
        shared.commit(tracked.region);
        shared.idle.store(true, Ordering::Release);
    }
    debug!("Detection worker stopped");
}
