//! Per-pixel color grading: brightness, contrast, saturation, warmth, vibrance.
//!
//! The five adjustments run in a fixed order that affects the visual result
//! and must not be reordered:
//!
//! 1. brightness — linear offset, slider unit `2.55` raw levels
//! 2. contrast — recenter around 0.5 in normalized space, scale, re-expand
//! 3. saturation — blend toward/away from BT.601 luma
//! 4. warmth — asymmetric red/blue shift
//! 5. vibrance — push channels away from their mean, weighted by how
//!    saturated the pixel already is (recomputed from post-warmth values)
//!
//! All intermediate math is floating point; each channel is clamp-rounded
//! into `[0, 255]` on write. The alpha channel is never touched.

use serde::{Deserialize, Serialize};

use crate::buffer::PixelBuffer;

/// Slider bounds, inclusive, per adjustment.
pub mod bounds {
    /// Brightness slider range.
    pub const BRIGHTNESS: (f32, f32) = (-50.0, 50.0);
    /// Contrast slider range.
    pub const CONTRAST: (f32, f32) = (-50.0, 50.0);
    /// Saturation slider range.
    pub const SATURATION: (f32, f32) = (-50.0, 50.0);
    /// Sharpness slider range.
    pub const SHARPNESS: (f32, f32) = (0.0, 100.0);
    /// Warmth slider range.
    pub const WARMTH: (f32, f32) = (-30.0, 30.0);
    /// Vibrance slider range.
    pub const VIBRANCE: (f32, f32) = (-50.0, 50.0);
}

/// The six enhancement sliders. Zero is the identity for every one of them.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EnhanceSettings {
    /// Brightness offset, `[-50, 50]`.
    pub brightness: f32,
    /// Contrast scale, `[-50, 50]`.
    pub contrast: f32,
    /// Saturation blend, `[-50, 50]`.
    pub saturation: f32,
    /// Unsharp-mask strength, `[0, 100]`.
    pub sharpness: f32,
    /// Color temperature shift, `[-30, 30]`.
    pub warmth: f32,
    /// Saturation-weighted color boost, `[-50, 50]`.
    pub vibrance: f32,
}

impl EnhanceSettings {
    /// Return a copy with every slider clamped into its declared bounds.
    ///
    /// Grading itself accepts any values; callers that take user input
    /// (CLI, presets loaded from disk) clamp before running the pipeline.
    #[must_use]
    pub fn clamped(self) -> Self {
        Self {
            brightness: self.brightness.clamp(bounds::BRIGHTNESS.0, bounds::BRIGHTNESS.1),
            contrast: self.contrast.clamp(bounds::CONTRAST.0, bounds::CONTRAST.1),
            saturation: self.saturation.clamp(bounds::SATURATION.0, bounds::SATURATION.1),
            sharpness: self.sharpness.clamp(bounds::SHARPNESS.0, bounds::SHARPNESS.1),
            warmth: self.warmth.clamp(bounds::WARMTH.0, bounds::WARMTH.1),
            vibrance: self.vibrance.clamp(bounds::VIBRANCE.0, bounds::VIBRANCE.1),
        }
    }

    /// Whether every slider sits at its identity value.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }
}

/// BT.601 luma weights used for the saturation blend.
const LUMA_R: f32 = 0.2989;
const LUMA_G: f32 = 0.587;
const LUMA_B: f32 = 0.114;

/// Apply the five-step grading transform to every pixel in place.
///
/// Dimensions never change and the operation always succeeds; settings
/// outside their bounds are a caller contract violation (see
/// [`EnhanceSettings::clamped`]).
pub fn apply_grading(buffer: &mut PixelBuffer, settings: &EnhanceSettings) {
    let brightness = settings.brightness * 2.55;
    let contrast = (settings.contrast + 100.0) / 100.0;
    let sat_factor = (settings.saturation + 100.0) / 100.0;
    let warmth = settings.warmth;
    let vibrance = settings.vibrance / 100.0;

    for px in buffer.as_image_mut().pixels_mut() {
        let mut r = f32::from(px[0]);
        let mut g = f32::from(px[1]);
        let mut b = f32::from(px[2]);

        r += brightness;
        g += brightness;
        b += brightness;

        r = ((r / 255.0 - 0.5) * contrast + 0.5) * 255.0;
        g = ((g / 255.0 - 0.5) * contrast + 0.5) * 255.0;
        b = ((b / 255.0 - 0.5) * contrast + 0.5) * 255.0;

        let gray = LUMA_R * r + LUMA_G * g + LUMA_B * b;
        r = gray + sat_factor * (r - gray);
        g = gray + sat_factor * (g - gray);
        b = gray + sat_factor * (b - gray);

        r += warmth * 1.5;
        g += warmth * 0.5;
        b -= warmth * 1.5;

        // avg and max are taken from the post-warmth values on purpose.
        let max_channel = r.max(g).max(b);
        let avg = (r + g + b) / 3.0;
        let vibrance_amount = (max_channel - avg) / 255.0 * vibrance;
        r += (r - avg) * vibrance_amount;
        g += (g - avg) * vibrance_amount;
        b += (b - avg) * vibrance_amount;

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        {
            px[0] = r.clamp(0.0, 255.0).round() as u8;
            px[1] = g.clamp(0.0, 255.0).round() as u8;
            px[2] = b.clamp(0.0, 255.0).round() as u8;
        }
    }
}

/// A named enhancement preset: fixed slider values plus display metadata.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnhancePreset {
    /// Stable identifier, e.g. `"portrait"`.
    pub id: &'static str,
    /// Display name.
    pub name: &'static str,
    /// One-line description.
    pub description: &'static str,
    /// The slider values the preset applies.
    pub settings: EnhanceSettings,
}

/// The built-in enhancement presets, in display order.
///
/// `"auto"` is first and doubles as the one-click auto-enhance profile.
pub const ENHANCE_PRESETS: [EnhancePreset; 8] = [
    EnhancePreset {
        id: "auto",
        name: "AI Auto",
        description: "Smart enhancement",
        settings: EnhanceSettings {
            brightness: 5.0,
            contrast: 10.0,
            saturation: 8.0,
            sharpness: 15.0,
            warmth: 3.0,
            vibrance: 12.0,
        },
    },
    EnhancePreset {
        id: "portrait",
        name: "Portrait",
        description: "Skin-friendly",
        settings: EnhanceSettings {
            brightness: 8.0,
            contrast: 8.0,
            saturation: 5.0,
            sharpness: 12.0,
            warmth: 6.0,
            vibrance: 8.0,
        },
    },
    EnhancePreset {
        id: "landscape",
        name: "Landscape",
        description: "Nature tones",
        settings: EnhanceSettings {
            brightness: 5.0,
            contrast: 15.0,
            saturation: 20.0,
            sharpness: 20.0,
            warmth: 2.0,
            vibrance: 25.0,
        },
    },
    EnhancePreset {
        id: "night",
        name: "Night Mode",
        description: "Low light fix",
        settings: EnhanceSettings {
            brightness: 15.0,
            contrast: 12.0,
            saturation: 8.0,
            sharpness: 18.0,
            warmth: -5.0,
            vibrance: 10.0,
        },
    },
    EnhancePreset {
        id: "hdr",
        name: "HDR Effect",
        description: "Dynamic range",
        settings: EnhanceSettings {
            brightness: 3.0,
            contrast: 30.0,
            saturation: 15.0,
            sharpness: 25.0,
            warmth: 0.0,
            vibrance: 20.0,
        },
    },
    EnhancePreset {
        id: "vivid",
        name: "Vivid",
        description: "Bold colors",
        settings: EnhanceSettings {
            brightness: 3.0,
            contrast: 15.0,
            saturation: 25.0,
            sharpness: 10.0,
            warmth: -5.0,
            vibrance: 30.0,
        },
    },
    EnhancePreset {
        id: "cinematic",
        name: "Cinematic",
        description: "Film look",
        settings: EnhanceSettings {
            brightness: -3.0,
            contrast: 20.0,
            saturation: -10.0,
            sharpness: 8.0,
            warmth: 8.0,
            vibrance: -5.0,
        },
    },
    EnhancePreset {
        id: "bright",
        name: "Bright",
        description: "Light & airy",
        settings: EnhanceSettings {
            brightness: 15.0,
            contrast: 5.0,
            saturation: 5.0,
            sharpness: 5.0,
            warmth: 5.0,
            vibrance: 10.0,
        },
    },
];

/// Look up a built-in enhancement preset by identifier.
#[must_use]
pub fn find_preset(id: &str) -> Option<&'static EnhancePreset> {
    ENHANCE_PRESETS.iter().find(|p| p.id == id)
}
