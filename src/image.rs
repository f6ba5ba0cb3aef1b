use crate::{
    error::Error,
    frame::{FRAME_PIXELS, FRAME_SIZE, PixelCoordinate},
};
use rayon::prelude::*;

/// A 64x64 RGB sky image.
///
/// Channel 0 is treated as red and channel 2 as blue.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkyImage {
    pixels: Vec<[u8; 3]>,
}

impl SkyImage {
    /// Create a sky image from interleaved RGB bytes organized by row.
    ///
    /// ```text
    /// +-----------+-----------+-----+-------------+
    /// | r0 g0 b0  | r1 g1 b1  | ... | r63 g63 b63 |
    /// +-----------+-----------+-----+-------------+
    /// | r64 ...   |
    /// ```
    ///
    /// Returns an error unless `width` and `height` are both 64 and `bytes`
    /// holds exactly three bytes per pixel.
    pub fn from_bytes(width: usize, height: usize, bytes: &[u8]) -> Result<Self, Error> {
        if width != FRAME_SIZE || height != FRAME_SIZE || bytes.len() != FRAME_PIXELS * 3 {
            return Err(Error::InvalidShape {
                width,
                height,
                len: bytes.len(),
            });
        }

        let pixels = bytes
            .chunks_exact(3)
            .map(|rgb| [rgb[0], rgb[1], rgb[2]])
            .collect();

        Ok(Self { pixels })
    }

    /// Create a sky image by evaluating `f` at every pixel.
    pub fn from_fn(f: impl Fn(PixelCoordinate) -> [u8; 3]) -> Self {
        Self {
            pixels: (0..FRAME_PIXELS)
                .map(|index| f(PixelCoordinate::from_index(index)))
                .collect(),
        }
    }

    /// Create a sky image where every pixel is `rgb`.
    pub fn filled(rgb: [u8; 3]) -> Self {
        Self {
            pixels: vec![rgb; FRAME_PIXELS],
        }
    }

    pub fn get(&self, pixel: PixelCoordinate) -> [u8; 3] {
        self.pixels[pixel.row() * FRAME_SIZE + pixel.col()]
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.pixels.iter().flatten().copied().collect()
    }

    /// Computes the normalized red-blue ratio of every pixel.
    pub fn nrbr(&self) -> NrbrImage {
        NrbrImage {
            values: self.pixels.par_iter().map(|rgb| nrbr(*rgb)).collect(),
        }
    }
}

/// Computes `(R - B) / (R + B)` on `rgb`.
///
/// Returns NaN when both channels are zero. NaN fails every threshold
/// comparison, so such pixels are never classified.
pub fn nrbr(rgb: [u8; 3]) -> f64 {
    let red = f64::from(rgb[0]);
    let blue = f64::from(rgb[2]);
    (red - blue) / (red + blue)
}

/// Per-pixel normalized red-blue ratios of a sky image.
#[derive(Clone, Debug, PartialEq)]
pub struct NrbrImage {
    values: Vec<f64>,
}

impl NrbrImage {
    pub fn get(&self, pixel: PixelCoordinate) -> f64 {
        self.values[pixel.row() * FRAME_SIZE + pixel.col()]
    }

    pub fn as_slice(&self) -> &[f64] {
        self.values.as_slice()
    }

    /// Returns `|self - other|` at every pixel.
    pub fn abs_diff(&self, other: &NrbrImage) -> NrbrImage {
        NrbrImage {
            values: self
                .values
                .par_iter()
                .zip(other.values.par_iter())
                .map(|(a, b)| (a - b).abs())
                .collect(),
        }
    }
}
