// THEORY (1D Pixel Heuristics):
// The `Pixel` module is the most fundamental unit of the band classifier. It is a
// "dumb" data container for a single RGB sample plus the one heuristic the rest
// of the system needs from it: the hue angle. Nothing here looks at neighbours;
// anything that summarizes many pixels belongs to `Band`.
//
// Channel order is fixed to R, G, B for the whole crate. Sources that deliver
// another order (OpenCV hands out BGR) must swap at the acquisition boundary,
// never later.
//
// Hue convention: full degrees, [0, 360). Pure red is 0, pure green 120, pure
// blue 240. Achromatic pixels (chroma ~ 0) report 0.
//
// Optimal vs Accurate (feature-selected):
// - optimal (default): normalized sRGB, fastest.
// - accurate: sRGB -> linear through a 256-entry `OnceLock` LUT.
// Enable accurate with `--features accurate`.

pub mod pixel {
    use image::Rgb;
    use std::sync::OnceLock;

    pub type Channel = u8;
    pub type NormalizedChannel = f32;
    pub type Hue = f32;

    const CHANNELS: usize = 3;
    const ACHROMATIC_CHROMA: f32 = 1e-6;

    static SRGB_TO_LINEAR_LUT: OnceLock<[NormalizedChannel; 256]> = OnceLock::new();

    /// A single RGB sample.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Pixel {
        /// The red channel value (0-255).
        pub red: Channel,
        /// The green channel value (0-255).
        pub green: Channel,
        /// The blue channel value (0-255).
        pub blue: Channel,
    }

    impl Pixel {
        pub const fn new(red: Channel, green: Channel, blue: Channel) -> Self {
            Pixel { red, green, blue }
        }

        #[inline]
        fn normalized(channel: Channel) -> NormalizedChannel {
            channel as NormalizedChannel / 255.0f32
        }

        #[inline]
        fn srgb_to_linear_normalized_from_byte(srgb_value: Channel) -> NormalizedChannel {
            let table = SRGB_TO_LINEAR_LUT.get_or_init(|| {
                let mut table = [0.0f32; 256];
                for (i, slot) in table.iter_mut().enumerate() {
                    let srgb_normalized = i as NormalizedChannel / 255.0f32;
                    *slot = if srgb_normalized <= 0.04045f32 {
                        srgb_normalized / 12.92f32
                    } else {
                        ((srgb_normalized + 0.055f32) / 1.055f32).powf(2.4f32)
                    };
                }
                table
            });
            table[srgb_value as usize]
        }

        /// Shared hue math for both channel forms.
        fn hue_from_channels(red: f32, green: f32, blue: f32) -> Hue {
            let maximum_channel = red.max(green.max(blue));
            let minimum_channel = red.min(green.min(blue));
            let chroma = maximum_channel - minimum_channel;

            if chroma <= ACHROMATIC_CHROMA {
                return 0.0;
            }

            let inverse_chroma = 1.0 / chroma;

            let (base_difference, sector_offset) = if maximum_channel == red {
                (green - blue, 0.0)
            } else if maximum_channel == green {
                (blue - red, 2.0)
            } else {
                (red - green, 4.0)
            };

            let mut hue_degrees = (base_difference * inverse_chroma + sector_offset) * 60.0;
            if hue_degrees < 0.0 {
                hue_degrees += 360.0;
            }
            // Tiny negative angles round up to exactly 360.0 after the wrap.
            if hue_degrees >= 360.0 {
                hue_degrees -= 360.0;
            }
            hue_degrees
        }

        /// Hue angle in degrees [0, 360) — optimal (fast) variant.
        ///
        /// - Uses normalized sRGB channels, no linearization.
        /// - Good for coarse color bucketing, which is all this crate does.
        pub fn hue_optimal(&self) -> Hue {
            Self::hue_from_channels(
                Self::normalized(self.red),
                Self::normalized(self.green),
                Self::normalized(self.blue),
            )
        }

        /// Hue angle in degrees [0, 360) — accurate variant on linear light.
        pub fn hue_accurate(&self) -> Hue {
            Self::hue_from_channels(
                Self::srgb_to_linear_normalized_from_byte(self.red),
                Self::srgb_to_linear_normalized_from_byte(self.green),
                Self::srgb_to_linear_normalized_from_byte(self.blue),
            )
        }

        /// Feature-selected hue.
        /// - default: hue_optimal
        /// - with feature accurate: hue_accurate
        #[cfg(feature = "accurate")]
        pub fn hue(&self) -> Hue {
            self.hue_accurate()
        }

        #[cfg(not(feature = "accurate"))]
        pub fn hue(&self) -> Hue {
            self.hue_optimal()
        }
    }

    impl From<Rgb<u8>> for Pixel {
        fn from(rgb: Rgb<u8>) -> Self {
            let [red, green, blue] = rgb.0;
            Pixel::new(red, green, blue)
        }
    }

    impl From<&Rgb<u8>> for Pixel {
        fn from(rgb: &Rgb<u8>) -> Self {
            Pixel::from(*rgb)
        }
    }

    impl From<Pixel> for Rgb<u8> {
        fn from(pixel: Pixel) -> Self {
            Rgb([pixel.red, pixel.green, pixel.blue])
        }
    }

    impl TryFrom<&[u8]> for Pixel {
        type Error = usize;

        /// Fails with the offending length when the slice is not exactly one pixel.
        fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
            if bytes.len() != CHANNELS {
                return Err(bytes.len());
            }
            Ok(Pixel::new(bytes[0], bytes[1], bytes[2]))
        }
    }

    impl std::fmt::Display for Pixel {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "rgb({}, {}, {})", self.red, self.green, self.blue)
        }
    }

}
