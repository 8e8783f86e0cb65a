//! Virtual dressing room: try on glasses, face masks and tops on a photo or a live camera.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};
use std::path::PathBuf;
use virtual_dressing_room::app::{build_outfit, dress_photo, DressingApp, OutfitArgs, VideoSource};
use virtual_dressing_room::config::{Config, EXAMPLE_CONFIG};
use virtual_dressing_room::engine::DressingRoom;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long, global = true)]
    config: Option<PathBuf>,

    /// Glasses image (PNG with alpha)
    #[arg(long, global = true)]
    glasses: Option<PathBuf>,

    /// Face mask image (PNG with alpha)
    #[arg(long, global = true)]
    mask: Option<PathBuf>,

    /// Top image (PNG with alpha)
    #[arg(long, global = true)]
    top: Option<PathBuf>,

    /// Top waist reference points: x1,y1,x2,y2
    #[arg(long, global = true, value_delimiter = ',', num_args = 4, allow_negative_numbers = true)]
    top_points: Option<Vec<f64>>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Dress a still photo
    Photo {
        /// Input image
        #[arg(short, long)]
        input: PathBuf,

        /// Output image
        #[arg(short, long)]
        output: PathBuf,

        /// Draw detected contours on the result
        #[arg(long)]
        contours: bool,
    },

    /// Dress a live camera feed or a video file
    Camera {
        /// Camera index to use
        #[arg(long, default_value = "0")]
        cam: i32,

        /// Video file to process instead of a camera
        #[arg(short, long)]
        video: Option<String>,

        /// Show frame rate and calibration state
        #[arg(long)]
        fps: bool,
    },

    /// Write an example configuration file
    InitConfig {
        /// Destination path
        #[arg(default_value = "dressing-room.yaml")]
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    info!("Virtual Dressing Room");

    if let Command::InitConfig { path } = &args.command {
        std::fs::write(path, EXAMPLE_CONFIG).with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Example configuration written to {}", path.display());
        return Ok(());
    }

    let config = match &args.config {
        Some(config_path) => {
            info!("Loading configuration from: {}", config_path.display());
            match Config::from_file(config_path) {
                Ok(cfg) => cfg,
                Err(e) => {
                    warn!("Failed to load config file: {}. Using defaults.", e);
                    Config::default()
                }
            }
        }
        None => Config::default(),
    };

    let outfit_args = OutfitArgs {
        glasses: args.glasses,
        mask: args.mask,
        top: args.top,
        top_points: args.top_points,
    };
    let outfit = build_outfit(&config, &outfit_args).context("Failed to load outfit")?;
    let mut room = DressingRoom::load(&config).context("Failed to load classifiers")?;

    match args.command {
        Command::Photo { input, output, contours } => {
            dress_photo(&mut room, &outfit, &input, &output, contours)?;
        }
        Command::Camera { cam, video, fps } => {
            let source = match video {
                Some(path) => VideoSource::File(path),
                None => VideoSource::Camera(cam),
            };
            let mut app = DressingApp::new(room, outfit, source, fps)?;
            app.run()?;
        }
        Command::InitConfig { .. } => {}
    }

    Ok(())
}
