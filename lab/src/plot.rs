//! Minimal line plots rendered straight into a PNG.

use anyhow::{Context, Result};
use image::{Rgb, RgbImage};
use std::path::Path;

pub const WIDTH: u32 = 640;
pub const HEIGHT: u32 = 480;
const MARGIN: u32 = 40;

pub const BLUE: Rgb<u8> = Rgb([31, 119, 180]);
pub const PALETTE: [Rgb<u8>; 4] = [
    BLUE,
    Rgb([255, 127, 14]),
    Rgb([44, 160, 44]),
    Rgb([214, 39, 40]),
];
const AXIS: Rgb<u8> = Rgb([0, 0, 0]);
const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);

/// One curve, x is the index into `values`.
pub struct Series<'a> {
    pub values: &'a [f32],
    pub color: Rgb<u8>,
}

fn draw_line(img: &mut RgbImage, (x0, y0): (i64, i64), (x1, y1): (i64, i64), color: Rgb<u8>) {
    // Bresenham
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let (mut x, mut y, mut err) = (x0, y0, dx + dy);
    loop {
        if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
            img.put_pixel(x as u32, y as u32, color);
        }
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

/// Shared y-range of all finite values, padded when flat.
fn value_range(series: &[Series<'_>]) -> (f32, f32) {
    let (lo, hi) = series
        .iter()
        .flat_map(|s| s.values.iter().copied())
        .filter(|v| v.is_finite())
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if lo > hi {
        (0.0, 1.0)
    } else if lo == hi {
        (lo - 1.0, hi + 1.0)
    } else {
        (lo, hi)
    }
}

pub fn line_plot(series: &[Series<'_>], width: u32, height: u32) -> RgbImage {
    let mut img = RgbImage::from_pixel(width, height, BACKGROUND);
    let left = MARGIN as i64;
    let bottom = height.saturating_sub(MARGIN) as i64;
    let right = width.saturating_sub(MARGIN / 2) as i64;
    let top = (MARGIN / 2) as i64;

    draw_line(&mut img, (left, top), (left, bottom), AXIS);
    draw_line(&mut img, (left, bottom), (right, bottom), AXIS);

    let (lo, hi) = value_range(series);
    let n = series.iter().map(|s| s.values.len()).max().unwrap_or(0);
    let x_span = (n.max(2) - 1) as f32;
    let to_pixel = |i: usize, v: f32| {
        let x = left + ((i as f32 / x_span) * (right - left) as f32).round() as i64;
        let y = bottom - (((v - lo) / (hi - lo)) * (bottom - top) as f32).round() as i64;
        (x, y)
    };

    for s in series {
        let points: Vec<(i64, i64)> = s
            .values
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_finite())
            .map(|(i, &v)| to_pixel(i, v))
            .collect();
        if let [only] = points.as_slice() {
            img.put_pixel(only.0 as u32, only.1 as u32, s.color);
        }
        for pair in points.windows(2) {
            draw_line(&mut img, pair[0], pair[1], s.color);
        }
    }
    img
}

pub fn save_line_plot(path: &Path, series: &[Series<'_>]) -> Result<()> {
    line_plot(series, WIDTH, HEIGHT)
        .save(path)
        .with_context(|| format!("saving plot to {}", path.display()))
}
