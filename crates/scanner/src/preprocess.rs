//! Image cleanup applied before text recognition.
//!
//! The scoreboard occupies a fixed share of a screenshot, so the image is cut
//! down to that area, converted to grayscale and binarized with an inverted
//! adaptive mean threshold (text ends up white on black).

use std::io::Cursor;

use image::{DynamicImage, GrayImage, ImageFormat, Luma};

use crate::error::Result;

/// Relative crop box; every edge is a fraction of the image size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropRegion {
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
}

impl CropRegion {
    /// Where the in-game scoreboard sits on a full screenshot
    pub const SCOREBOARD: CropRegion = CropRegion {
        top: 0.12,
        bottom: 0.68,
        left: 0.40,
        right: 1.00,
    };

    /// Pixel bounds `(x, y, width, height)` for an image of the given size.
    /// Edges are floored to whole pixels.
    fn bounds(&self, width: u32, height: u32) -> (u32, u32, u32, u32) {
        let edge =
            |fraction: f64, size: u32| ((size as f64) * fraction.clamp(0.0, 1.0)).floor() as u32;

        let x0 = edge(self.left, width);
        let x1 = edge(self.right, width).max(x0);
        let y0 = edge(self.top, height);
        let y1 = edge(self.bottom, height).max(y0);

        (x0, y0, x1 - x0, y1 - y0)
    }
}

impl Default for CropRegion {
    fn default() -> Self {
        Self::SCOREBOARD
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdParams {
    /// Side of the square window the local mean is taken over; odd
    pub block_size: u32,
    /// Subtracted from the local mean
    pub offset: i32,
}

impl Default for ThresholdParams {
    fn default() -> Self {
        Self {
            block_size: 25,
            offset: 15,
        }
    }
}

pub fn decode(bytes: &[u8]) -> Result<DynamicImage> {
    Ok(image::load_from_memory(bytes)?)
}

pub fn crop(image: &DynamicImage, region: CropRegion) -> DynamicImage {
    let (x, y, width, height) = region.bounds(image.width(), image.height());
    image.crop_imm(x, y, width, height)
}

/// Inverted adaptive mean threshold.
///
/// A pixel becomes 255 when it is at least `offset` darker than the mean of
/// the `block_size` window around it, 0 otherwise. Windows are clipped at the
/// image border.
pub fn adaptive_threshold_inv(gray: &GrayImage, params: ThresholdParams) -> GrayImage {
    let (width, height) = gray.dimensions();
    if width == 0 || height == 0 {
        return GrayImage::new(width, height);
    }

    let integral = IntegralImage::new(gray);
    let radius = params.block_size / 2;

    GrayImage::from_fn(width, height, |x, y| {
        let x0 = x.saturating_sub(radius);
        let y0 = y.saturating_sub(radius);
        let x1 = (x + radius).min(width - 1);
        let y1 = (y + radius).min(height - 1);

        let area = i64::from((x1 - x0 + 1) * (y1 - y0 + 1));
        let sum = integral.sum(x0, y0, x1, y1);
        let value = i64::from(gray.get_pixel(x, y)[0]);

        // value <= sum / area - offset, kept in integers
        if value * area <= sum - i64::from(params.offset) * area {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}

pub fn encode_png(gray: GrayImage) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    DynamicImage::ImageLuma8(gray).write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)?;
    Ok(buffer)
}

/// Decode, crop, binarize and re-encode a screenshot as PNG
pub fn prepare_scoreboard(
    bytes: &[u8],
    region: CropRegion,
    params: ThresholdParams,
) -> Result<Vec<u8>> {
    let image = decode(bytes)?;
    tracing::debug!("Decoded screenshot {}x{}", image.width(), image.height());

    let gray = crop(&image, region).to_luma8();
    let binary = adaptive_threshold_inv(&gray, params);
    let png = encode_png(binary)?;

    tracing::debug!(
        "Prepared scoreboard crop {}x{} ({} bytes)",
        gray.width(),
        gray.height(),
        png.len()
    );

    Ok(png)
}

/// Summed-area table with a zero row and column in front
struct IntegralImage {
    stride: usize,
    sums: Vec<i64>,
}

impl IntegralImage {
    fn new(gray: &GrayImage) -> Self {
        let (width, height) = gray.dimensions();
        let stride = width as usize + 1;
        let mut sums = vec![0i64; stride * (height as usize + 1)];

        for y in 0..height as usize {
            let mut row = 0i64;
            for x in 0..width as usize {
                row += i64::from(gray.get_pixel(x as u32, y as u32)[0]);
                sums[(y + 1) * stride + x + 1] = sums[y * stride + x + 1] + row;
            }
        }

        Self { stride, sums }
    }

    /// Sum over the inclusive rectangle (x0, y0)..=(x1, y1)
    fn sum(&self, x0: u32, y0: u32, x1: u32, y1: u32) -> i64 {
        let (x0, y0, x1, y1) = (x0 as usize, y0 as usize, x1 as usize + 1, y1 as usize + 1);
        let at = |x: usize, y: usize| self.sums[y * self.stride + x];

        at(x1, y1) - at(x0, y1) - at(x1, y0) + at(x0, y0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    /// Light background with a dark square in the middle
    fn dark_square(size: u32, from: u32, to: u32) -> GrayImage {
        GrayImage::from_fn(size, size, |x, y| {
            if (from..to).contains(&x) && (from..to).contains(&y) {
                Luma([20])
            } else {
                Luma([230])
            }
        })
    }

    #[test]
    fn threshold_output_is_binary() {
        let gray = GrayImage::from_fn(40, 30, |x, y| Luma([((x * 7 + y * 13) % 256) as u8]));
        let binary = adaptive_threshold_inv(&gray, ThresholdParams::default());

        assert_eq!(binary.dimensions(), (40, 30));
        assert!(binary.pixels().all(|p| p[0] == 0 || p[0] == 255));
    }

    #[test]
    fn dark_text_on_light_background_turns_white() {
        let binary = adaptive_threshold_inv(&dark_square(60, 25, 35), ThresholdParams::default());

        assert_eq!(binary.get_pixel(30, 30)[0], 255);
        assert_eq!(binary.get_pixel(26, 33)[0], 255);
        assert_eq!(binary.get_pixel(5, 5)[0], 0);
        assert_eq!(binary.get_pixel(24, 30)[0], 0);
    }

    #[test]
    fn flat_image_is_all_black() {
        let gray = GrayImage::from_pixel(32, 32, Luma([128]));
        let binary = adaptive_threshold_inv(&gray, ThresholdParams::default());
        assert!(binary.pixels().all(|p| p[0] == 0));
    }

    #[test]
    fn integral_sum_matches_direct_sum() {
        let gray = GrayImage::from_fn(9, 7, |x, y| Luma([(x * 10 + y) as u8]));
        let integral = IntegralImage::new(&gray);

        let direct: i64 = (2..=6)
            .flat_map(|x| (1..=4).map(move |y| (x, y)))
            .map(|(x, y)| i64::from(gray.get_pixel(x, y)[0]))
            .sum();

        assert_eq!(integral.sum(2, 1, 6, 4), direct);
    }

    #[test]
    fn scoreboard_crop_uses_relative_bounds() {
        let image = DynamicImage::ImageRgb8(RgbImage::new(1000, 500));
        let cropped = crop(&image, CropRegion::SCOREBOARD);

        assert_eq!(cropped.width(), 600);
        assert_eq!(cropped.height(), 280);
    }

    #[test]
    fn crop_edges_are_floored() {
        let region = CropRegion {
            top: 0.5,
            bottom: 1.0,
            left: 0.5,
            right: 0.9,
        };
        // top 2.5 -> 2, left 2.5 -> 2, right 4.5 -> 4
        assert_eq!(region.bounds(5, 5), (2, 2, 2, 3));

        // 0.12 * 1079 = 129.48 and 0.68 * 1079 = 733.72
        assert_eq!(CropRegion::SCOREBOARD.bounds(1920, 1079), (768, 129, 1152, 604));
    }

    #[test]
    fn degenerate_region_yields_empty_crop() {
        let region = CropRegion {
            top: 0.8,
            bottom: 0.2,
            left: 0.5,
            right: 0.5,
        };
        let image = DynamicImage::ImageRgb8(RgbImage::new(100, 100));
        let cropped = crop(&image, region);

        assert_eq!((cropped.width(), cropped.height()), (0, 0));
    }

    #[test]
    fn prepare_scoreboard_emits_png_of_the_crop() {
        let screenshot = RgbImage::from_pixel(200, 100, Rgb([240, 240, 240]));
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(screenshot)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();

        let png = prepare_scoreboard(&bytes, CropRegion::SCOREBOARD, ThresholdParams::default())
            .unwrap();
        let decoded = image::load_from_memory(&png).unwrap();

        assert_eq!((decoded.width(), decoded.height()), (120, 56));
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let err = decode(b"definitely not an image").unwrap_err();
        assert!(err.is_bad_input());
    }
}
