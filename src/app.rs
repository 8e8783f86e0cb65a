//! Demo host: dress a photo or a live camera feed.

use crate::{
    config::Config,
    contours::draw_contours,
    engine::DressingRoom,
    error::{Error, Result},
    garment::{Garment, GarmentKind, Outfit},
    live::LiveDressingRoom,
};
use log::{info, warn};
use opencv::{
    core::{Mat, Point, Point2d, Scalar, Vector},
    highgui::{self, WINDOW_NORMAL},
    imgcodecs,
    imgproc::{self, FONT_HERSHEY_SIMPLEX, LINE_8},
    prelude::*,
    videoio::{self, VideoCapture, CAP_PROP_BUFFERSIZE},
};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

const WINDOW_NAME: &str = "Virtual Dressing Room";

/// Garments given on the command line
#[derive(Debug, Clone, Default)]
pub struct OutfitArgs {
    /// Glasses sprite
    pub glasses: Option<PathBuf>,
    /// Face mask sprite
    pub mask: Option<PathBuf>,
    /// Top sprite
    pub top: Option<PathBuf>,
    /// Top reference points as `x1, y1, x2, y2`
    pub top_points: Option<Vec<f64>>,
}

/// Build the outfit from the configuration file and command-line garments
///
/// # Errors
///
/// Returns an error if a garment image cannot be loaded or a top lacks reference points
pub fn build_outfit(config: &Config, args: &OutfitArgs) -> Result<Outfit> {
    let mut outfit = Outfit::new();
    for spec in &config.outfit {
        info!("Loading {:?} from {}", spec.kind, spec.image.display());
        outfit.push(spec.load()?);
    }

    if let Some(path) = &args.glasses {
        outfit.add_glasses(Garment::from_image_file(path, GarmentKind::Glasses, None)?);
    }
    if let Some(path) = &args.mask {
        outfit.add_face_mask(Garment::from_image_file(path, GarmentKind::FaceMask, None)?);
    }
    if let Some(path) = &args.top {
        let points = match args.top_points.as_deref() {
            Some(&[x1, y1, x2, y2]) => Some((Point2d::new(x1, y1), Point2d::new(x2, y2))),
            Some(_) => {
                return Err(Error::InvalidInput(
                    "Top reference points need exactly four values".to_string(),
                ))
            }
            None => None,
        };
        outfit.add_top(Garment::from_image_file(path, GarmentKind::Top, points)?);
    }

    if outfit.is_empty() {
        warn!("Outfit is empty, images will be left unchanged");
    }
    Ok(outfit)
}

/// Dress the person in `input` and write the result to `output`
///
/// With `show_contours` the edges used for the waist search are drawn on top.
///
/// # Errors
///
/// Returns `Error::NoFaceDetected` if the photo has no face, or an I/O or
/// OpenCV error
pub fn dress_photo(room: &mut DressingRoom, outfit: &Outfit, input: &Path, output: &Path, show_contours: bool) -> Result<()> {
    let image = imgcodecs::imread(&input.display().to_string(), imgcodecs::IMREAD_COLOR)?;
    if image.empty() {
        return Err(Error::InvalidInput(format!("Cannot read image {}", input.display())));
    }

    let mut result = room.detect_and_add_clothing(&image, outfit)?;
    if show_contours {
        draw_contours(&mut result)?;
    }

    if !imgcodecs::imwrite(&output.display().to_string(), &result, &Vector::new())? {
        return Err(Error::InvalidInput(format!("Cannot write image {}", output.display())));
    }
    info!("Dressed photo written to {}", output.display());
    Ok(())
}

/// Video source for the live view
#[derive(Debug, Clone)]
pub enum VideoSource {
    /// Camera device index
    Camera(i32),
    /// Video file path
    File(String),
}

/// Live camera view
pub struct DressingApp {
    live: LiveDressingRoom,
    outfit: Outfit,
    video_source: VideoSource,
    video_capture: VideoCapture,
    show_fps: bool,
}

impl DressingApp {
    /// Open the video source and start the detection worker
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be opened or the worker cannot start
    pub fn new(room: DressingRoom, outfit: Outfit, video_source: VideoSource, show_fps: bool) -> Result<Self> {
        let video_capture = match &video_source {
            VideoSource::Camera(index) => {
                info!("Opening camera {}", index);
                let mut cap = VideoCapture::new(*index, videoio::CAP_ANY)?;

                // lower latency, webcam only
                cap.set(CAP_PROP_BUFFERSIZE, 1.0)?;
                cap
            }
            VideoSource::File(path) => {
                info!("Opening video file: {}", path);
                VideoCapture::from_file(path, videoio::CAP_ANY)?
            }
        };
        if !video_capture.is_opened()? {
            return Err(Error::InvalidInput(format!("Cannot open video source {video_source:?}")));
        }

        highgui::named_window(WINDOW_NAME, WINDOW_NORMAL)?;

        Ok(Self {
            live: LiveDressingRoom::spawn(room)?,
            outfit,
            video_source,
            video_capture,
            show_fps,
        })
    }

    /// Run until the video ends or the user quits
    ///
    /// `r` restarts waist calibration, `q` or Esc quits.
    ///
    /// # Errors
    ///
    /// Returns an error if capture, rendering or display fails
    pub fn run(&mut self) -> Result<()> {
        info!("Press 'r' to recalibrate the waist, 'q' to quit");

        let mut frame_count = 0u32;
        let start_time = Instant::now();
        let mut last_fps_update = Instant::now();
        let mut fps = 0.0;

        loop {
            let mut frame = Mat::default();
            if !self.video_capture.read(&mut frame)? || frame.empty() {
                if matches!(self.video_source, VideoSource::File(_)) {
                    info!("End of video file reached");
                    break;
                }
                warn!("Failed to read frame, retrying...");
                continue;
            }

            self.live.render(&mut frame, &self.outfit)?;

            frame_count += 1;
            if last_fps_update.elapsed() >= Duration::from_secs(1) {
                fps = f64::from(frame_count) / start_time.elapsed().as_secs_f64();
                last_fps_update = Instant::now();
            }
            if self.show_fps {
                self.draw_status(&mut frame, fps)?;
            }

            highgui::imshow(WINDOW_NAME, &frame)?;
            let key = highgui::wait_key(1)?;
            if key == 27 || key == i32::from(b'q') {
                info!("Exit requested by user");
                break;
            }
            if key == i32::from(b'r') {
                info!("Recalibrating waist");
                self.live.recalculate_waist_width();
            }
        }

        info!("Application shutting down");
        Ok(())
    }

    fn draw_status(&self, frame: &mut Mat, fps: f64) -> Result<()> {
        let waist = match self.live.waist().ratio() {
            Some(ratio) => format!("waist {ratio:.2}"),
            None => "calibrating".to_string(),
        };
        imgproc::put_text(
            frame,
            &format!("FPS: {fps:.1}  {waist}"),
            Point::new(10, 30),
            FONT_HERSHEY_SIMPLEX,
            0.7,
            Scalar::new(0.0, 255.0, 0.0, 0.0),
            2,
            LINE_8,
            false,
        )?;
        Ok(())
    }
}
