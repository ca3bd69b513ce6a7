// THEORY:
// The `hue_bucket` module turns a hue angle into one of six human-readable names.
// The hue circle is cut into six 60-degree sectors centred on the primaries and
// secondaries, with red straddling the 0/360 seam:
//
//   [0, 30] ∪ (330, 360]  red
//   (30, 90]              yellow
//   (90, 150]             green
//   (150, 210]            cyan
//   (210, 270]            blue
//   (270, 330]            purple
//
// `classify` is total over [0, 360]. Anything outside that (negative, above a full
// turn, NaN) means an upstream stage used another hue scale, so it is reported as
// a `ClassificationRangeError` instead of being forced into a bucket.

use crate::error::ClassificationRangeError;
use image::Rgb;

/// Upper bound of the hue domain, inclusive.
pub const FULL_TURN: f32 = 360.0;

/// One of the six named hue sectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorBucket {
    Red,
    Yellow,
    Green,
    Cyan,
    Blue,
    Purple,
}

impl ColorBucket {
    pub const COUNT: usize = 6;

    /// Enumeration order. Histogram ties resolve to the earliest entry.
    pub const ALL: [ColorBucket; Self::COUNT] = [
        ColorBucket::Red,
        ColorBucket::Yellow,
        ColorBucket::Green,
        ColorBucket::Cyan,
        ColorBucket::Blue,
        ColorBucket::Purple,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            ColorBucket::Red => "red",
            ColorBucket::Yellow => "yellow",
            ColorBucket::Green => "green",
            ColorBucket::Cyan => "cyan",
            ColorBucket::Blue => "blue",
            ColorBucket::Purple => "purple",
        }
    }

    /// Position in `ALL`, used as a histogram slot.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// A fully saturated representative used when drawing a bucket.
    pub const fn swatch(self) -> Rgb<u8> {
        match self {
            ColorBucket::Red => Rgb([255, 0, 0]),
            ColorBucket::Yellow => Rgb([255, 255, 0]),
            ColorBucket::Green => Rgb([0, 255, 0]),
            ColorBucket::Cyan => Rgb([0, 255, 255]),
            ColorBucket::Blue => Rgb([0, 0, 255]),
            ColorBucket::Purple => Rgb([255, 0, 255]),
        }
    }
}

impl std::fmt::Display for ColorBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Maps a hue in degrees onto its bucket.
pub fn classify(hue: f32) -> Result<ColorBucket, ClassificationRangeError> {
    if !(0.0..=FULL_TURN).contains(&hue) {
        return Err(ClassificationRangeError { hue });
    }

    let bucket = if hue <= 30.0 || hue > 330.0 {
        ColorBucket::Red
    } else if hue <= 90.0 {
        ColorBucket::Yellow
    } else if hue <= 150.0 {
        ColorBucket::Green
    } else if hue <= 210.0 {
        ColorBucket::Cyan
    } else if hue <= 270.0 {
        ColorBucket::Blue
    } else {
        ColorBucket::Purple
    };
    Ok(bucket)
}
