// THEORY:
// The `BandSplitter` performs the first step of every cycle: slicing a raw frame
// into `n` full-width horizontal bands. It is fixed to one frame geometry when it
// is created, so the split count is validated once against real dimensions and
// never silently re-derived for a frame of another size.
//
// Band `i` covers rows [floor(i*h/n), floor((i+1)*h/n)). The boundaries are
// computed from the exact quotient rather than by rounding each band height on
// its own, so the bands tile the frame with no gap and no overlap even when `n`
// does not divide `h`. Integer arithmetic gives the same floor without any
// floating-point drift.

use crate::config::SegmentCount;
use crate::core_modules::D1::pixel::pixel::Pixel;
use crate::core_modules::band::band::Band;
use crate::error::SplitError;
use image::RgbImage;
use std::ops::Range;

/// Row ranges for `segments` bands over a frame `height` rows tall.
pub fn band_rows(height: u32, segments: u32) -> Result<Vec<Range<u32>>, SplitError> {
    if segments == 0 || segments > height {
        return Err(SplitError::InvalidSplitCount {
            requested: segments,
            height,
        });
    }

    let boundary = |i: u32| ((i as u64 * height as u64) / segments as u64) as u32;
    Ok((0..segments).map(|i| boundary(i)..boundary(i + 1)).collect())
}

/// Splits frames of one fixed geometry into horizontal bands.
#[derive(Debug, Clone)]
pub struct BandSplitter {
    /// The width of every frame this splitter accepts.
    width: u32,
    /// The height of every frame this splitter accepts.
    height: u32,
    /// Precomputed row range of each band.
    rows: Vec<Range<u32>>,
}

impl BandSplitter {
    /// Validates the split count against the frame height and fixes the boundaries.
    pub fn new(width: u32, height: u32, segments: SegmentCount) -> Result<Self, SplitError> {
        let rows = band_rows(height, segments.get())?;
        Ok(Self {
            width,
            height,
            rows,
        })
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn band_count(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[Range<u32>] {
        &self.rows
    }

    /// True when `frame` has the geometry this splitter was built for.
    pub fn accepts(&self, frame: &RgbImage) -> bool {
        frame.dimensions() == (self.width, self.height)
    }

    /// Copies each band's pixels out of `frame`.
    /// Callers check `accepts` first; a smaller frame yields short bands, never a panic.
    pub fn split(&self, frame: &RgbImage) -> Vec<Band> {
        self.rows
            .iter()
            .enumerate()
            .map(|(index, range)| {
                let pixels: Vec<Pixel> = frame
                    .rows()
                    .skip(range.start as usize)
                    .take(range.len())
                    .flat_map(|row| row.map(Pixel::from))
                    .collect();
                Band::new(index, range.clone(), self.width, pixels)
            })
            .collect()
    }
}
