//! Build script for detecting system dependencies and providing installation guidance.
//!
//! This script checks for OpenCV and pkg-config, and prints installation hints
//! if either is missing. Haar cascades ship with OpenCV under
//! `share/opencv4/haarcascades`; copy them to `assets/`.

use std::path::Path;
use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Check for OpenCV
    check_opencv();

    // Check for pkg-config
    check_pkg_config();

    // Cascades are looked up relative to the working directory at runtime
    check_cascades();
}

fn check_opencv() {
    println!("cargo:rerun-if-env-changed=PKG_CONFIG_PATH");
    println!("cargo:rerun-if-env-changed=OPENCV_LINK_PATHS");
    println!("cargo:rerun-if-env-changed=OPENCV_INCLUDE_PATHS");

    // opencv4 first, older installs register as plain opencv
    let version = ["opencv4", "opencv"].iter().find_map(|module| {
        let output = Command::new("pkg-config").args(["--modversion", module]).output().ok()?;
        output
            .status
            .success()
            .then(|| String::from_utf8_lossy(&output.stdout).trim().to_string())
    });

    match version {
        Some(version) => println!("cargo:warning=Found OpenCV version: {version}"),
        None => {
            println!("cargo:warning=OpenCV not found via pkg-config. The objdetect, imgproc, videoio and highgui modules are required.");
            println!("cargo:warning=On Ubuntu: sudo apt-get install libopencv-dev");
            println!("cargo:warning=On macOS: brew install opencv");
        }
    }
}

fn check_pkg_config() {
    let output = Command::new("pkg-config").arg("--version").output();

    match output {
        Ok(output) if output.status.success() => {
            let version = String::from_utf8_lossy(&output.stdout);
            println!("cargo:warning=Found pkg-config version: {}", version.trim());
        }
        _ => {
            println!("cargo:warning=pkg-config not found. This is required to find system libraries.");
            println!("cargo:warning=On Ubuntu: sudo apt-get install pkg-config");
            println!("cargo:warning=On macOS: brew install pkg-config");
        }
    }
}

fn check_cascades() {
    const CASCADES: [&str; 3] = [
        "haarcascade_frontalface_alt.xml",
        "haarcascade_frontalface_alt2.xml",
        "haarcascade_eye_tree_eyeglasses.xml",
    ];
    println!("cargo:rerun-if-changed=assets");

    let missing: Vec<&str> = CASCADES
        .iter()
        .copied()
        .filter(|name| !Path::new("assets").join(name).exists())
        .collect();
    if !missing.is_empty() {
        println!("cargo:warning=Missing Haar cascades in assets/: {}", missing.join(", "));
        println!("cargo:warning=Copy them from share/opencv4/haarcascades of your OpenCV install.");
    }
}
