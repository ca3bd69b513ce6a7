// THEORY:
// Debug rendering answers one question: "what did the pipeline think each band
// looked like?" It rebuilds a frame-sized image where every band is flood-filled
// with its representative color and places it to the right of the original.
//
// Building those images is pure and lives here so it can be tested without a
// display. Showing them (and blocking until someone dismisses the window) is the
// job of a `DebugRenderer` implementation supplied by the binary.

use crate::core_modules::band_splitter::band_rows;
use crate::error::RenderError;
use image::{Rgb, RgbImage, imageops};

/// Displays one processed frame. Implementations may block until dismissed.
pub trait DebugRenderer {
    fn render(&mut self, frame: &RgbImage, colors: &[Rgb<u8>], bands: usize) -> Result<(), RenderError>;
}

impl<R: DebugRenderer + ?Sized> DebugRenderer for Box<R> {
    fn render(&mut self, frame: &RgbImage, colors: &[Rgb<u8>], bands: usize) -> Result<(), RenderError> {
        (**self).render(frame, colors, bands)
    }
}

/// A `width` x `height` image with band `i` filled with `colors[i]`.
pub fn reconstruct_bands(
    width: u32,
    height: u32,
    colors: &[Rgb<u8>],
    bands: usize,
) -> Result<RgbImage, RenderError> {
    if colors.len() != bands {
        return Err(RenderError::ColorCountMismatch {
            bands,
            colors: colors.len(),
        });
    }
    let rows = band_rows(height, bands as u32)?;

    let mut reconstruction = RgbImage::new(width, height);
    for (range, color) in rows.iter().zip(colors) {
        for y in range.clone() {
            for x in 0..width {
                reconstruction.put_pixel(x, y, *color);
            }
        }
    }
    Ok(reconstruction)
}

/// `left` and `right` next to each other on a black canvas tall enough for both.
pub fn side_by_side(left: &RgbImage, right: &RgbImage) -> RgbImage {
    let width = left.width() + right.width();
    let height = left.height().max(right.height());
    let mut canvas = RgbImage::new(width, height);
    imageops::replace(&mut canvas, left, 0, 0);
    imageops::replace(&mut canvas, right, left.width() as i64, 0);
    canvas
}

/// Original frame on the left, reconstructed bands on the right.
pub fn compose_debug_view(frame: &RgbImage, colors: &[Rgb<u8>], bands: usize) -> Result<RgbImage, RenderError> {
    let reconstruction = reconstruct_bands(frame.width(), frame.height(), colors, bands)?;
    Ok(side_by_side(frame, &reconstruction))
}
