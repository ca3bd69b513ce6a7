// THEORY:
// A `Band` is a full-width horizontal slice of one frame. Like the pixel it is a
// "dumb" data container: it owns a copy of its pixels and knows how to summarize
// them, but knows nothing about other bands or earlier frames.
//
// Two interchangeable summaries exist, picked by `SummaryMode`:
// 1.  **Mean** (`average_pixel`): per-channel arithmetic mean, truncated back to
//     bytes. The caller converts the result to hue and classifies it.
// 2.  **Histogram majority** (`dominant_bucket`): every pixel is classified on its
//     own and votes for its bucket; the bucket with most votes wins, ties going
//     to the earliest bucket in `ColorBucket::ALL`.
//
// Both are a single O(pixels) pass.

pub mod band {
    use crate::core_modules::D1::pixel::pixel::Pixel;
    use crate::core_modules::hue_bucket::{ColorBucket, classify};
    use crate::error::ClassificationRangeError;
    use std::ops::Range;

    /// Per-bucket vote counts, indexed by `ColorBucket::index`.
    pub type HueHistogram = [u64; ColorBucket::COUNT];

    /// Outcome of a histogram-majority vote.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct BucketVote {
        pub bucket: ColorBucket,
        /// Votes cast for `bucket`.
        pub votes: u64,
        /// Pixels that voted.
        pub total: u64,
    }

    /// A contiguous run of full-width rows from one frame.
    #[derive(Debug, Clone)]
    pub struct Band {
        /// Position of this band from the top, starting at 0.
        pub index: usize,
        /// Frame rows covered by this band.
        pub rows: Range<u32>,
        /// The width of the band in pixels.
        pub width: u32,
        /// Row-major pixels of the band.
        pub pixels: Vec<Pixel>,
    }

    impl Band {
        pub fn new(index: usize, rows: Range<u32>, width: u32, pixels: Vec<Pixel>) -> Self {
            Self {
                index,
                rows,
                width,
                pixels,
            }
        }

        pub fn height(&self) -> u32 {
            self.rows.end - self.rows.start
        }

        /// Mean color of the band, each channel truncated toward zero.
        pub fn average_pixel(&self) -> Pixel {
            let num_pixels = self.pixels.len() as u64;
            if num_pixels == 0 {
                return Pixel::default();
            }

            let mut sum_r = 0u64;
            let mut sum_g = 0u64;
            let mut sum_b = 0u64;
            for pixel in &self.pixels {
                sum_r += pixel.red as u64;
                sum_g += pixel.green as u64;
                sum_b += pixel.blue as u64;
            }

            Pixel {
                red: (sum_r / num_pixels) as u8,
                green: (sum_g / num_pixels) as u8,
                blue: (sum_b / num_pixels) as u8,
            }
        }

        /// Classifies every pixel's hue and counts votes per bucket.
        pub fn hue_histogram(&self) -> Result<HueHistogram, ClassificationRangeError> {
            let mut histogram = HueHistogram::default();
            for pixel in &self.pixels {
                let bucket = classify(pixel.hue())?;
                histogram[bucket.index()] += 1;
            }
            Ok(histogram)
        }

        /// Bucket with the most votes. The first maximum in enumeration order wins a tie.
        pub fn dominant_bucket(&self) -> Result<BucketVote, ClassificationRangeError> {
            let histogram = self.hue_histogram()?;
            let mut winner = BucketVote {
                bucket: ColorBucket::ALL[0],
                votes: histogram[0],
                total: self.pixels.len() as u64,
            };
            for bucket in ColorBucket::ALL.into_iter().skip(1) {
                let votes = histogram[bucket.index()];
                // Strictly greater keeps the earlier bucket on a tie.
                if votes > winner.votes {
                    winner.bucket = bucket;
                    winner.votes = votes;
                }
            }
            Ok(winner)
        }
    }

}
