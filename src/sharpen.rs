//! Unsharp-mask sharpening via a 4-neighbor Laplacian approximation.
//!
//! For every interior pixel and each of R, G, B independently:
//!
//! ```text
//! neighbor_avg = (north + south + east + west) / 4
//! sharpened   = center + (center - neighbor_avg) * amount
//! ```
//!
//! Neighbors are read from a snapshot taken before any writes, so values
//! already sharpened this pass never feed back in. The one-pixel border is
//! passed through unchanged — a deliberate edge policy, not an oversight.

use crate::buffer::PixelBuffer;

/// Fixed sharpening strength applied after every upscale.
pub const UPSCALE_SHARPEN_AMOUNT: f32 = 0.3;

/// Sharpen the buffer in place with the given strength.
///
/// `amount` is expected in `(0, 1]`; the enhancer maps its `[0, 100]`
/// sharpness slider to `sharpness / 100`. An `amount` of zero (or less) is
/// a no-op, as is any buffer too small to have interior pixels. Alpha is
/// untouched.
pub fn sharpen(buffer: &mut PixelBuffer, amount: f32) {
    let width = buffer.width() as usize;
    let height = buffer.height() as usize;
    if amount <= 0.0 || width < 3 || height < 3 {
        return;
    }

    let snap = buffer.snapshot();
    let data = buffer.as_image_mut();

    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let idx = (y * width + x) * 4;
            #[allow(clippy::cast_possible_truncation)]
            let px = data.get_pixel_mut(x as u32, y as u32);

            for ch in 0..3 {
                let center = f32::from(snap[idx + ch]);
                let neighbors = (f32::from(snap[((y - 1) * width + x) * 4 + ch])
                    + f32::from(snap[((y + 1) * width + x) * 4 + ch])
                    + f32::from(snap[(y * width + x - 1) * 4 + ch])
                    + f32::from(snap[(y * width + x + 1) * 4 + ch]))
                    / 4.0;

                let sharpened = center + (center - neighbors) * amount;
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                {
                    px[ch] = sharpened.clamp(0.0, 255.0).round() as u8;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic non-uniform test pattern.
    fn gradient(width: u32, height: u32) -> PixelBuffer {
        let mut data = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                #[allow(clippy::cast_possible_truncation)]
                {
                    data.push(((x * 37 + y * 11) % 256) as u8);
                    data.push(((x * 5 + y * 91) % 256) as u8);
                    data.push(((x * 63 + y * 29) % 256) as u8);
                    data.push(255);
                }
            }
        }
        PixelBuffer::from_raw(width, height, data).unwrap()
    }

    fn border_pixels(buf: &PixelBuffer) -> Vec<u8> {
        let (w, h) = (buf.width(), buf.height());
        let mut out = Vec::new();
        for y in 0..h {
            for x in 0..w {
                if y == 0 || y == h - 1 || x == 0 || x == w - 1 {
                    out.extend_from_slice(&buf.as_image().get_pixel(x, y).0);
                }
            }
        }
        out
    }

    #[test]
    fn amount_zero_is_a_no_op() {
        let mut buf = gradient(6, 5);
        let before = buf.snapshot();
        sharpen(&mut buf, 0.0);
        assert_eq!(buf.as_raw(), &before[..]);
    }

    #[test]
    fn border_is_bit_identical_for_any_amount() {
        for amount in [0.1, 0.3, 1.0] {
            let mut buf = gradient(7, 6);
            let before = border_pixels(&buf);
            sharpen(&mut buf, amount);
            assert_eq!(border_pixels(&buf), before, "amount {amount}");
        }
    }

    #[test]
    fn uniform_regions_are_unchanged() {
        // center == neighbor average everywhere, so the mask adds nothing
        let mut buf = PixelBuffer::from_raw(5, 5, vec![120u8; 5 * 5 * 4]).unwrap();
        let before = buf.snapshot();
        sharpen(&mut buf, 1.0);
        assert_eq!(buf.as_raw(), &before[..]);
    }

    #[test]
    fn bright_center_gets_brighter() {
        // a spike surrounded by darker neighbors is amplified
        let mut data = vec![50u8; 3 * 3 * 4];
        let center = (3 + 1) * 4; // pixel (1, 1)
        data[center] = 150;
        data[center + 1] = 150;
        data[center + 2] = 150;
        let mut buf = PixelBuffer::from_raw(3, 3, data).unwrap();

        sharpen(&mut buf, 0.5);

        // 150 + (150 - 50) * 0.5 = 200
        assert_eq!(buf.as_image().get_pixel(1, 1).0, [200, 200, 200, 255]);
    }

    #[test]
    fn reads_come_from_the_pre_pass_snapshot() {
        // 1x4 interior row: if writes leaked into reads, the second interior
        // pixel would see its sharpened west neighbor instead of the original.
        let mut data = Vec::new();
        for value in [[10u8, 200, 10, 200], [10, 200, 10, 200], [10, 200, 10, 200]] {
            for v in value {
                data.extend_from_slice(&[v, v, v, 255]);
            }
        }
        let mut buf = PixelBuffer::from_raw(4, 3, data).unwrap();
        let snap = buf.snapshot();
        sharpen(&mut buf, 1.0);

        // recompute expectations straight from the snapshot
        let w = 4usize;
        for x in 1..3usize {
            let idx = (w + x) * 4;
            let center = f32::from(snap[idx]);
            let neighbors = (f32::from(snap[x * 4])
                + f32::from(snap[(2 * w + x) * 4])
                + f32::from(snap[(w + x - 1) * 4])
                + f32::from(snap[(w + x + 1) * 4]))
                / 4.0;
            let expected = (center + (center - neighbors)).clamp(0.0, 255.0).round() as u8;
            assert_eq!(
                buf.as_image().get_pixel(x as u32, 1).0[0],
                expected,
                "interior x={x}"
            );
        }
    }

    #[test]
    fn tiny_buffers_are_left_alone() {
        let mut buf = gradient(2, 2);
        let before = buf.snapshot();
        sharpen(&mut buf, 1.0);
        assert_eq!(buf.as_raw(), &before[..]);
    }

    #[test]
    fn alpha_is_untouched() {
        let mut buf = gradient(5, 5);
        sharpen(&mut buf, 1.0);
        for px in buf.as_image().pixels() {
            assert_eq!(px[3], 255);
        }
    }
}
