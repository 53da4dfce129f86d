//! PNG rendering for band previews and evaluation plots

use crate::core::raster::WorkingRaster;
use crate::types::{RasterError, RasterResult};
use image::{GrayImage, Rgb, RgbImage};
use std::path::Path;

const PLOT_WIDTH: u32 = 640;
const PLOT_HEIGHT: u32 = 480;
const PLOT_MARGIN: u32 = 48;
const CURVE_RADIUS: i64 = 2;
const CURVE_COLOR: Rgb<u8> = Rgb([220, 20, 20]);
const AXIS_COLOR: Rgb<u8> = Rgb([60, 60, 60]);
const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);

/// Render the first band of a raster as an 8-bit grayscale preview.
///
/// Finite values are stretched linearly over 0..255. Non-finite pixels
/// render black; a constant band renders mid-gray. A container holding
/// no bands is an error.
pub fn render_band_png<P: AsRef<Path>>(raster: &WorkingRaster, path: P) -> RasterResult<()> {
    if raster.band_count() == 0 {
        return Err(RasterError::Processing(
            "cannot render a container with no bands".to_string(),
        ));
    }
    let band = raster.band(0);

    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    for &v in band.iter() {
        if v.is_finite() {
            if v < min {
                min = v;
            }
            if v > max {
                max = v;
            }
        }
    }
    let span = max - min;

    let bytes: Vec<u8> = band
        .iter()
        .map(|&v| {
            if !v.is_finite() {
                0
            } else if span > 0.0 {
                (((v - min) / span) * 255.0).round() as u8
            } else {
                128
            }
        })
        .collect();

    let preview = GrayImage::from_raw(raster.cols() as u32, raster.rows() as u32, bytes)
        .ok_or_else(|| {
            RasterError::Processing("preview buffer does not match raster dimensions".to_string())
        })?;

    log::debug!(
        "Rendering {}x{} preview to {}",
        raster.cols(),
        raster.rows(),
        path.as_ref().display()
    );
    preview.save(path)?;
    Ok(())
}

/// Render a precision-recall curve as a PNG.
///
/// Points are drawn in the order given, recall on the horizontal axis and
/// precision on the vertical, both spanning 0..1. Out-of-range values are
/// clamped onto the plot area.
pub fn render_precision_recall_plot<P: AsRef<Path>>(
    precisions: &[f64],
    recalls: &[f64],
    path: P,
) -> RasterResult<()> {
    let mut canvas = RgbImage::from_pixel(PLOT_WIDTH, PLOT_HEIGHT, BACKGROUND);

    // Axes along the left and bottom margins
    for x in PLOT_MARGIN..=PLOT_WIDTH - PLOT_MARGIN {
        canvas.put_pixel(x, PLOT_HEIGHT - PLOT_MARGIN, AXIS_COLOR);
    }
    for y in PLOT_MARGIN..=PLOT_HEIGHT - PLOT_MARGIN {
        canvas.put_pixel(PLOT_MARGIN, y, AXIS_COLOR);
    }

    let points: Vec<(i64, i64)> = recalls
        .iter()
        .zip(precisions)
        .map(|(&recall, &precision)| plot_position(recall, precision))
        .collect();

    for &point in &points {
        stamp(&mut canvas, point, CURVE_COLOR);
    }
    for pair in points.windows(2) {
        draw_segment(&mut canvas, pair[0], pair[1], CURVE_COLOR);
    }

    canvas.save(path.as_ref())?;
    log::debug!(
        "Wrote precision-recall plot ({} point(s)) to {}",
        points.len(),
        path.as_ref().display()
    );
    Ok(())
}

fn plot_position(recall: f64, precision: f64) -> (i64, i64) {
    let inner_width = (PLOT_WIDTH - 2 * PLOT_MARGIN) as f64;
    let inner_height = (PLOT_HEIGHT - 2 * PLOT_MARGIN) as f64;
    let x = PLOT_MARGIN as f64 + recall.clamp(0.0, 1.0) * inner_width;
    let y = (PLOT_HEIGHT - PLOT_MARGIN) as f64 - precision.clamp(0.0, 1.0) * inner_height;
    (x.round() as i64, y.round() as i64)
}

/// Stamp a filled disc so the curve reads as a thick stroke
fn stamp(canvas: &mut RgbImage, center: (i64, i64), color: Rgb<u8>) {
    for dy in -CURVE_RADIUS..=CURVE_RADIUS {
        for dx in -CURVE_RADIUS..=CURVE_RADIUS {
            if dx * dx + dy * dy > CURVE_RADIUS * CURVE_RADIUS {
                continue;
            }
            let x = center.0 + dx;
            let y = center.1 + dy;
            if x >= 0 && y >= 0 && (x as u32) < canvas.width() && (y as u32) < canvas.height() {
                canvas.put_pixel(x as u32, y as u32, color);
            }
        }
    }
}

fn draw_segment(canvas: &mut RgbImage, from: (i64, i64), to: (i64, i64), color: Rgb<u8>) {
    let dx = (to.0 - from.0) as f64;
    let dy = (to.1 - from.1) as f64;
    let steps = dx.hypot(dy).ceil().max(1.0) as usize;
    for i in 0..=steps {
        let t = i as f64 / steps as f64;
        let x = from.0 as f64 + t * dx;
        let y = from.1 as f64 + t * dy;
        stamp(canvas, (x.round() as i64, y.round() as i64), color);
    }
}
