//! Text watermark compositing.
//!
//! A watermark is drawn as measured text on a transparent layer (drop
//! shadow first, then the text itself) and the layer is composited over the
//! working buffer at the spec's opacity. Placement uses five named anchors
//! with a fixed 20px padding from the edges.

use std::fmt;
use std::str::FromStr;

use ab_glyph::{FontRef, PxScale};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_text_mut, text_size};
use serde::{Deserialize, Serialize};

use crate::buffer::PixelBuffer;
use crate::error::{Error, Result};

/// Distance between the text and the image edge, in pixels.
const EDGE_PADDING: u32 = 20;

/// Drop shadow offset, in pixels.
const SHADOW_OFFSET: i32 = 2;

/// An RGB color parsed from a `#rrggbb` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    /// Red component.
    pub r: u8,
    /// Green component.
    pub g: u8,
    /// Blue component.
    pub b: u8,
}

impl Color {
    /// White, the default watermark color.
    pub const WHITE: Color = Color {
        r: 0xff,
        g: 0xff,
        b: 0xff,
    };

    /// Parse a `#rrggbb` string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Color`] on any other form.
    pub fn parse(s: &str) -> Result<Self> {
        let hex = s
            .strip_prefix('#')
            .filter(|h| h.len() == 6)
            .ok_or_else(|| Error::Color(s.to_string()))?;
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|_| Error::Color(s.to_string()))
        };
        Ok(Self {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Color {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(s: String) -> std::result::Result<Self, String> {
        Self::parse(&s).map_err(|e| e.to_string())
    }
}

impl From<Color> for String {
    fn from(c: Color) -> String {
        c.to_string()
    }
}

/// Where the watermark text is anchored within the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Anchor {
    /// Top-left corner.
    TopLeft,
    /// Top-right corner.
    TopRight,
    /// Bottom-left corner.
    BottomLeft,
    /// Bottom-right corner.
    BottomRight,
    /// Image center.
    Center,
}

impl Anchor {
    /// Every anchor, in display order.
    pub const ALL: [Anchor; 5] = [
        Self::TopLeft,
        Self::TopRight,
        Self::BottomLeft,
        Self::BottomRight,
        Self::Center,
    ];
}

impl FromStr for Anchor {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, String> {
        match s {
            "top-left" => Ok(Self::TopLeft),
            "top-right" => Ok(Self::TopRight),
            "bottom-left" => Ok(Self::BottomLeft),
            "bottom-right" => Ok(Self::BottomRight),
            "center" => Ok(Self::Center),
            other => Err(format!("unknown anchor {other:?}")),
        }
    }
}

/// A complete watermark description: what to draw, where, and how.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatermarkSpec {
    /// The text to composite.
    pub text: String,
    /// Placement anchor.
    pub anchor: Anchor,
    /// Font size in pixels.
    pub font_size: f32,
    /// Opacity percentage, `[0, 100]`.
    pub opacity: u8,
    /// Text color.
    pub color: Color,
}

impl Default for WatermarkSpec {
    fn default() -> Self {
        Self {
            text: "Selfie2Snap".to_string(),
            anchor: Anchor::BottomRight,
            font_size: 24.0,
            opacity: 70,
            color: Color::WHITE,
        }
    }
}

/// Top-left text origin for an anchor, given image and text extents.
#[allow(clippy::cast_possible_wrap)]
fn anchor_origin(anchor: Anchor, img_w: u32, img_h: u32, text_w: u32, text_h: u32) -> (i32, i32) {
    let pad = EDGE_PADDING;
    let right = img_w.saturating_sub(text_w + pad) as i32;
    let bottom = img_h.saturating_sub(text_h + pad) as i32;
    match anchor {
        Anchor::TopLeft => (pad as i32, pad as i32),
        Anchor::TopRight => (right, pad as i32),
        Anchor::BottomLeft => (pad as i32, bottom),
        Anchor::BottomRight => (right, bottom),
        Anchor::Center => (
            (img_w.saturating_sub(text_w) / 2) as i32,
            (img_h.saturating_sub(text_h) / 2) as i32,
        ),
    }
}

/// Renders watermark text onto pixel buffers with a caller-supplied font.
///
/// Create one per font and reuse it across images.
#[derive(Debug)]
pub struct WatermarkRenderer<'a> {
    font: FontRef<'a>,
}

impl<'a> WatermarkRenderer<'a> {
    /// Parse font bytes (TTF/OTF) into a renderer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Font`] if the bytes are not a parseable font.
    pub fn new(font_bytes: &'a [u8]) -> Result<Self> {
        let font = FontRef::try_from_slice(font_bytes).map_err(Error::Font)?;
        Ok(Self { font })
    }

    /// Composite the watermark onto the buffer in place.
    pub fn apply(&self, buffer: &mut PixelBuffer, spec: &WatermarkSpec) {
        if spec.text.is_empty() || spec.opacity == 0 {
            return;
        }

        let scale = PxScale::from(spec.font_size.max(1.0));
        let (text_w, text_h) = text_size(scale, &self.font, &spec.text);
        let (x, y) = anchor_origin(spec.anchor, buffer.width(), buffer.height(), text_w, text_h);

        // Shadow and text go on a transparent layer first so the whole
        // overlay can be faded by one global opacity, matching how the
        // editor previews it.
        let mut layer = RgbaImage::new(buffer.width(), buffer.height());
        draw_text_mut(
            &mut layer,
            Rgba([0, 0, 0, 128]),
            x + SHADOW_OFFSET,
            y + SHADOW_OFFSET,
            scale,
            &self.font,
            &spec.text,
        );
        draw_text_mut(
            &mut layer,
            Rgba([spec.color.r, spec.color.g, spec.color.b, 255]),
            x,
            y,
            scale,
            &self.font,
            &spec.text,
        );

        let opacity = f32::from(spec.opacity.min(100)) / 100.0;
        let target = buffer.as_image_mut();
        for (dst, src) in target.pixels_mut().zip(layer.pixels()) {
            // draw_text_mut leaves the layer premultiplied by glyph coverage
            let coverage = f32::from(src[3]) / 255.0;
            if coverage <= 0.0 {
                continue;
            }
            let alpha = coverage * opacity;
            for ch in 0..3 {
                let overlay = f32::from(src[ch]) / coverage;
                let blended = f32::from(dst[ch]) * (1.0 - alpha) + overlay * alpha;
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                {
                    dst[ch] = blended.clamp(0.0, 255.0).round() as u8;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_parses_hex() {
        let c = Color::parse("#a855f7").unwrap();
        assert_eq!((c.r, c.g, c.b), (0xa8, 0x55, 0xf7));
        assert_eq!(c.to_string(), "#a855f7");
    }

    #[test]
    fn color_rejects_malformed_strings() {
        for bad in ["a855f7", "#a855f", "#gggggg", "", "#a855f7ff"] {
            assert!(Color::parse(bad).is_err(), "{bad:?} should not parse");
        }
    }

    #[test]
    fn anchor_origins_respect_padding() {
        // 200x100 image, 60x20 text
        assert_eq!(anchor_origin(Anchor::TopLeft, 200, 100, 60, 20), (20, 20));
        assert_eq!(anchor_origin(Anchor::TopRight, 200, 100, 60, 20), (120, 20));
        assert_eq!(anchor_origin(Anchor::BottomLeft, 200, 100, 60, 20), (20, 60));
        assert_eq!(
            anchor_origin(Anchor::BottomRight, 200, 100, 60, 20),
            (120, 60)
        );
        assert_eq!(anchor_origin(Anchor::Center, 200, 100, 60, 20), (70, 40));
    }

    #[test]
    fn anchor_origin_clamps_when_text_is_wider_than_image() {
        let (x, y) = anchor_origin(Anchor::BottomRight, 30, 30, 100, 50);
        assert_eq!((x, y), (0, 0));
    }

    #[test]
    fn invalid_font_bytes_are_rejected() {
        let err = WatermarkRenderer::new(b"not a font").unwrap_err();
        assert!(matches!(err, Error::Font(_)));
    }

    #[test]
    fn spec_round_trips_through_json() {
        let spec = WatermarkSpec {
            text: "@yourhandle".to_string(),
            anchor: Anchor::TopRight,
            font_size: 20.0,
            opacity: 80,
            color: Color::parse("#ec4899").unwrap(),
        };
        let json = serde_json::to_string(&spec).unwrap();
        assert!(json.contains("top-right"));
        assert!(json.contains("#ec4899"));
        let back: WatermarkSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(back, spec);
    }

    #[test]
    fn default_spec_matches_editor_defaults() {
        let spec = WatermarkSpec::default();
        assert_eq!(spec.text, "Selfie2Snap");
        assert_eq!(spec.anchor, Anchor::BottomRight);
        assert_eq!(spec.opacity, 70);
        assert_eq!(spec.color, Color::WHITE);
    }
}
