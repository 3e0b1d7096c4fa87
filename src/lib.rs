//! Pixel processing pipeline for the Selfie2Snap photo editor.
//!
//! Selfie2Snap turns two portraits into stylized composite "snaps" via a
//! remote generation service, then post-processes them locally. This crate
//! is that local pipeline: per-pixel color grading (brightness, contrast,
//! saturation, warmth, vibrance), unsharp-mask sharpening, smooth upscaling
//! with post-sharpening, and text watermarking, plus the thin orchestration
//! that feeds images through the stages and exports PNG results.
//!
//! # Quick Start
//!
//! ```no_run
//! use snapstudio::{EditSession, EnhanceSettings};
//!
//! let mut session = EditSession::open(std::path::Path::new("snap.png")).unwrap();
//! session.set_settings(EnhanceSettings {
//!     brightness: 10.0,
//!     sharpness: 20.0,
//!     ..EnhanceSettings::default()
//! });
//! let png = session.export_png().unwrap();
//! std::fs::write("snap-enhanced.png", png).unwrap();
//! ```
//!
//! # Upscaling
//!
//! ```no_run
//! use snapstudio::{buffer::RasterImage, resample, ScaleFactor};
//!
//! let source = RasterImage::open(std::path::Path::new("snap.png")).unwrap();
//! let upscaled = resample::upscale(&source, ScaleFactor::X2).unwrap();
//! assert_eq!(upscaled.width(), source.width() * 2);
//! ```
//!
//! Every stage re-runs against the pristine decoded source, so adjusting a
//! slider twice never compounds: the pipeline is `process(source, settings)
//! -> buffer`, not an edit log.

#![deny(missing_docs)]

pub mod buffer;
mod engine;
pub mod error;
pub mod grade;
pub mod presets;
pub mod remote;
pub mod resample;
pub mod sharpen;
pub mod watermark;

pub use buffer::{PixelBuffer, RasterImage};
pub use engine::{
    encode_png, export_file_name, export_file_name_at, process, EditSession, ExportPurpose,
    APP_NAME,
};
pub use error::{Error, Result};
pub use grade::{EnhancePreset, EnhanceSettings, ENHANCE_PRESETS};
pub use resample::ScaleFactor;
pub use watermark::{Anchor, WatermarkRenderer, WatermarkSpec};
