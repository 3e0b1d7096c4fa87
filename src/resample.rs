//! Resolution upscaling with post-sharpening.
//!
//! Interpolation alone leaves the enlarged image soft, so every upscale is
//! followed by one unsharp-mask pass at a fixed strength of 0.3 regardless
//! of scale factor.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::buffer::{PixelBuffer, RasterImage};
use crate::error::{Error, Result};
use crate::sharpen::{sharpen, UPSCALE_SHARPEN_AMOUNT};

/// Linear dimension multiplier for one upscale invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScaleFactor {
    /// 1.5x — small boost.
    #[serde(rename = "1.5")]
    X1_5,
    /// 2x — recommended.
    #[serde(rename = "2")]
    X2,
    /// 3x — high quality.
    #[serde(rename = "3")]
    X3,
    /// 4x — maximum.
    #[serde(rename = "4")]
    X4,
}

impl ScaleFactor {
    /// Every supported factor, in ascending order.
    pub const ALL: [ScaleFactor; 4] = [Self::X1_5, Self::X2, Self::X3, Self::X4];

    /// The numeric multiplier.
    #[must_use]
    pub fn multiplier(self) -> f64 {
        match self {
            Self::X1_5 => 1.5,
            Self::X2 => 2.0,
            Self::X3 => 3.0,
            Self::X4 => 4.0,
        }
    }

    /// Short display label, e.g. `"2x"`.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::X1_5 => "1.5x",
            Self::X2 => "2x",
            Self::X3 => "3x",
            Self::X4 => "4x",
        }
    }

    /// Output dimensions for a source of the given size: `round(dim * factor)`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn scaled_dimensions(self, width: u32, height: u32) -> (u32, u32) {
        let m = self.multiplier();
        (
            (f64::from(width) * m).round() as u32,
            (f64::from(height) * m).round() as u32,
        )
    }
}

impl fmt::Display for ScaleFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ScaleFactor {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim_end_matches('x') {
            "1.5" => Ok(Self::X1_5),
            "2" => Ok(Self::X2),
            "3" => Ok(Self::X3),
            "4" => Ok(Self::X4),
            other => Err(format!("unsupported scale factor {other:?} (use 1.5, 2, 3 or 4)")),
        }
    }
}

/// Upscale a source image and sharpen the result.
///
/// Draws the source into a `round(w*s) x round(h*s)` buffer with smooth
/// (Catmull-Rom) interpolation, then runs the unsharp mask at
/// [`UPSCALE_SHARPEN_AMOUNT`]. The sharpening border policy means the
/// outermost pixel ring of the result keeps its interpolated value exactly.
///
/// # Errors
///
/// Returns [`Error::SurfaceUnavailable`] if the target buffer would have a
/// zero dimension.
pub fn upscale(source: &RasterImage, factor: ScaleFactor) -> Result<PixelBuffer> {
    let (new_width, new_height) = factor.scaled_dimensions(source.width(), source.height());
    if new_width == 0 || new_height == 0 {
        return Err(Error::SurfaceUnavailable {
            width: new_width,
            height: new_height,
        });
    }

    let resized = image::imageops::resize(
        source.as_image(),
        new_width,
        new_height,
        image::imageops::FilterType::CatmullRom,
    );

    let mut buffer = PixelBuffer::from_image(resized);
    sharpen(&mut buffer, UPSCALE_SHARPEN_AMOUNT);
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker(width: u32, height: u32) -> RasterImage {
        let mut data = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                let v = if (x + y) % 2 == 0 { 230 } else { 40 };
                data.extend_from_slice(&[v, v / 2, 255 - v, 255]);
            }
        }
        RasterImage::from_raw(width, height, data).unwrap()
    }

    #[test]
    fn dimension_contract_holds_for_all_factors() {
        let src = checker(10, 7);
        let expected = [(15, 11), (20, 14), (30, 21), (40, 28)];
        for (factor, (w, h)) in ScaleFactor::ALL.into_iter().zip(expected) {
            let out = upscale(&src, factor).unwrap();
            assert_eq!((out.width(), out.height()), (w, h), "{factor}");
        }
    }

    #[test]
    fn odd_dimensions_round_half_up() {
        // 7 * 1.5 = 10.5 rounds to 11
        assert_eq!(ScaleFactor::X1_5.scaled_dimensions(7, 7), (11, 11));
    }

    #[test]
    fn two_by_two_at_2x_keeps_interpolated_border() {
        let src = checker(2, 2);
        let out = upscale(&src, ScaleFactor::X2).unwrap();
        assert_eq!((out.width(), out.height()), (4, 4));

        // the border must equal the interpolation-only result bit for bit
        let interpolated = image::imageops::resize(
            src.as_image(),
            4,
            4,
            image::imageops::FilterType::CatmullRom,
        );
        for y in 0..4 {
            for x in 0..4 {
                if y == 0 || y == 3 || x == 0 || x == 3 {
                    assert_eq!(
                        out.as_image().get_pixel(x, y),
                        interpolated.get_pixel(x, y),
                        "border pixel ({x},{y})"
                    );
                }
            }
        }
    }

    #[test]
    fn zero_sized_source_is_surface_unavailable() {
        let src = RasterImage::from_raw(0, 5, Vec::new()).unwrap();
        let err = upscale(&src, ScaleFactor::X4).unwrap_err();
        assert!(matches!(err, Error::SurfaceUnavailable { width: 0, .. }));
    }

    #[test]
    fn scale_factor_parses_with_and_without_suffix() {
        assert_eq!("1.5".parse::<ScaleFactor>().unwrap(), ScaleFactor::X1_5);
        assert_eq!("2x".parse::<ScaleFactor>().unwrap(), ScaleFactor::X2);
        assert_eq!("4".parse::<ScaleFactor>().unwrap(), ScaleFactor::X4);
        assert!("5".parse::<ScaleFactor>().is_err());
    }
}
