//! Pipeline orchestration: one editing session per source image.
//!
//! The orchestrator's key invariant is that settings always run against the
//! pristine decoded source, never against an already-graded buffer, so
//! repeated slider changes stay composable and non-cumulative.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::buffer::{PixelBuffer, RasterImage};
use crate::error::{Error, Result};
use crate::grade::{self, EnhanceSettings};
use crate::sharpen::sharpen;

/// Application name used in export filenames.
pub const APP_NAME: &str = "selfie2snap";

/// Run the full enhancement pipeline against a pristine source.
///
/// Derives a fresh working copy, applies color grading, then sharpens when
/// the sharpness slider is non-zero (slider `[0, 100]` maps to unsharp-mask
/// amount `sharpness / 100`). Calling this twice with the same inputs
/// always yields the same buffer.
#[must_use]
pub fn process(source: &RasterImage, settings: &EnhanceSettings) -> PixelBuffer {
    let mut buffer = source.to_buffer();
    grade::apply_grading(&mut buffer, settings);
    if settings.sharpness > 0.0 {
        sharpen(&mut buffer, settings.sharpness / 100.0);
    }
    buffer
}

/// An interactive editing session over one decoded source.
///
/// Holds the pristine [`RasterImage`] and the current slider values. Every
/// settings change re-runs [`process`] from the pristine source and hands
/// back the new buffer; the previous buffer is simply discarded
/// (last-write-wins).
#[derive(Debug)]
pub struct EditSession {
    source: RasterImage,
    settings: EnhanceSettings,
}

impl EditSession {
    /// Start a session over an already-decoded source with default
    /// (all-zero, identity) settings.
    #[must_use]
    pub fn new(source: RasterImage) -> Self {
        Self {
            source,
            settings: EnhanceSettings::default(),
        }
    }

    /// Decode a source from a file and start a session.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if the file cannot be decoded; the caller
    /// stays in its pre-load state and may supply a new source.
    pub fn open(path: &std::path::Path) -> Result<Self> {
        Ok(Self::new(RasterImage::open(path)?))
    }

    /// Decode a source from encoded bytes and start a session.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if the bytes cannot be decoded.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(Self::new(RasterImage::from_bytes(bytes)?))
    }

    /// The pristine decoded source.
    #[must_use]
    pub fn source(&self) -> &RasterImage {
        &self.source
    }

    /// The currently active slider values.
    #[must_use]
    pub fn settings(&self) -> &EnhanceSettings {
        &self.settings
    }

    /// Replace the settings (clamped into bounds) and re-run the pipeline
    /// from the pristine source.
    pub fn set_settings(&mut self, settings: EnhanceSettings) -> PixelBuffer {
        self.settings = settings.clamped();
        self.render()
    }

    /// Apply a built-in enhancement preset by id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownPreset`] if no such preset exists; the
    /// session keeps its current settings.
    pub fn apply_preset(&mut self, id: &str) -> Result<PixelBuffer> {
        let preset =
            grade::find_preset(id).ok_or_else(|| Error::UnknownPreset(id.to_string()))?;
        Ok(self.set_settings(preset.settings))
    }

    /// Reset every slider to its identity value and re-run.
    pub fn reset(&mut self) -> PixelBuffer {
        self.set_settings(EnhanceSettings::default())
    }

    /// Run the pipeline with the current settings against the pristine
    /// source.
    #[must_use]
    pub fn render(&self) -> PixelBuffer {
        process(&self.source, &self.settings)
    }

    /// Run a final pipeline pass and encode the result as PNG bytes.
    ///
    /// Export failures are non-fatal to the session; the caller may retry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Encode`] if PNG serialization fails.
    pub fn export_png(&self) -> Result<Vec<u8>> {
        encode_png(&self.render())
    }
}

/// Encode a buffer as PNG bytes.
///
/// # Errors
///
/// Returns [`Error::Encode`] if serialization fails.
pub fn encode_png(buffer: &PixelBuffer) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    buffer
        .as_image()
        .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
        .map_err(Error::Encode)?;
    Ok(bytes)
}

/// What an exported file contains, for filename purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportPurpose {
    /// Output of the enhancement pipeline.
    Enhanced,
    /// Output of the upscaler.
    Upscaled,
    /// Output of the watermark editor.
    Watermarked,
}

impl ExportPurpose {
    fn as_str(self) -> &'static str {
        match self {
            Self::Enhanced => "enhanced",
            Self::Upscaled => "upscaled",
            Self::Watermarked => "watermarked",
        }
    }
}

/// Build the export filename `{app}-{purpose}[-{scale}]-{timestamp}.png`
/// for the current time.
#[must_use]
pub fn export_file_name(purpose: ExportPurpose, scale: Option<crate::resample::ScaleFactor>) -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    export_file_name_at(purpose, scale, millis)
}

/// [`export_file_name`] with an explicit timestamp.
#[must_use]
pub fn export_file_name_at(
    purpose: ExportPurpose,
    scale: Option<crate::resample::ScaleFactor>,
    timestamp_millis: u128,
) -> String {
    match scale {
        Some(factor) => format!(
            "{APP_NAME}-{}-{}-{timestamp_millis}.png",
            purpose.as_str(),
            factor.label()
        ),
        None => format!("{APP_NAME}-{}-{timestamp_millis}.png", purpose.as_str()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resample::ScaleFactor;

    fn sample_source() -> RasterImage {
        let mut data = Vec::new();
        for i in 0u32..16 {
            data.extend_from_slice(&[
                (i * 13 % 256) as u8,
                (i * 29 % 256) as u8,
                (i * 53 % 256) as u8,
                255,
            ]);
        }
        RasterImage::from_raw(4, 4, data).unwrap()
    }

    #[test]
    fn settings_are_non_cumulative() {
        let source = sample_source();
        let mut session = EditSession::new(source.clone());

        // brightness 40 first, then switch to contrast-only
        session.set_settings(EnhanceSettings {
            brightness: 40.0,
            ..EnhanceSettings::default()
        });
        let via_session = session.set_settings(EnhanceSettings {
            contrast: 20.0,
            ..EnhanceSettings::default()
        });

        let direct = process(
            &source,
            &EnhanceSettings {
                contrast: 20.0,
                ..EnhanceSettings::default()
            },
        );
        assert_eq!(via_session.as_raw(), direct.as_raw());
    }

    #[test]
    fn reset_restores_the_pristine_pixels() {
        let source = sample_source();
        let mut session = EditSession::new(source.clone());
        session.set_settings(EnhanceSettings {
            vibrance: 35.0,
            warmth: 10.0,
            ..EnhanceSettings::default()
        });
        let buffer = session.reset();
        assert_eq!(buffer.as_raw(), source.as_raw());
    }

    #[test]
    fn set_settings_clamps_into_bounds() {
        let mut session = EditSession::new(sample_source());
        session.set_settings(EnhanceSettings {
            brightness: 500.0,
            ..EnhanceSettings::default()
        });
        assert_eq!(session.settings().brightness, 50.0);
    }

    #[test]
    fn preset_application_matches_direct_settings() {
        let source = sample_source();
        let mut session = EditSession::new(source.clone());
        let via_preset = session.apply_preset("vivid").unwrap();

        let preset = crate::grade::find_preset("vivid").unwrap();
        let direct = process(&source, &preset.settings);
        assert_eq!(via_preset.as_raw(), direct.as_raw());
    }

    #[test]
    fn unknown_preset_keeps_current_settings() {
        let mut session = EditSession::new(sample_source());
        session.set_settings(EnhanceSettings {
            warmth: 12.0,
            ..EnhanceSettings::default()
        });
        let err = session.apply_preset("does-not-exist").unwrap_err();
        assert!(matches!(err, Error::UnknownPreset(_)));
        assert_eq!(session.settings().warmth, 12.0);
    }

    #[test]
    fn export_produces_decodable_png() {
        let session = EditSession::new(sample_source());
        let bytes = session.export_png().unwrap();
        let decoded = RasterImage::from_bytes(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (4, 4));
        assert_eq!(decoded.as_raw(), session.source().as_raw());
    }

    #[test]
    fn export_file_name_pattern() {
        assert_eq!(
            export_file_name_at(ExportPurpose::Enhanced, None, 1700000000000),
            "selfie2snap-enhanced-1700000000000.png"
        );
        assert_eq!(
            export_file_name_at(ExportPurpose::Upscaled, Some(ScaleFactor::X2), 42),
            "selfie2snap-upscaled-2x-42.png"
        );
        assert_eq!(
            export_file_name_at(ExportPurpose::Watermarked, None, 7),
            "selfie2snap-watermarked-7.png"
        );
    }
}
