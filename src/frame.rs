//! Geometry of the fixed 64x64 fisheye sky frame.
//!
//! Pixels are addressed by (row, col) where row indexes the first image axis.
//! The sky occupies a disk of radius [`FRAME_RADIUS`] centered on
//! [`FRAME_ORIGIN`]; everything outside it is horizon clutter or lens housing.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Side length of a sky frame in pixels.
pub const FRAME_SIZE: usize = 64;

/// Number of pixels in a sky frame.
pub const FRAME_PIXELS: usize = FRAME_SIZE * FRAME_SIZE;

/// Radius of the sky disk in pixels.
pub const FRAME_RADIUS: i64 = 29;

/// Center of the sky disk.
pub const FRAME_ORIGIN: SunCenter = SunCenter::new(29, 30);

/// Angle in degrees between geographic north and north in the sky frame.
pub const NORTH_OFFSET_DEG: f64 = 14.036;

/// Denominator of every cloud fraction, `floor(pi * 29^2)`.
///
/// This is the area of the continuous sky disk. The pixel lattice inside the
/// disk is slightly smaller, so fractions never reach one.
pub const FIELD_OF_VIEW_AREA: usize = 2642;

static FIELD_OF_VIEW: LazyLock<Mask> =
    LazyLock::new(|| Mask::disk(FRAME_ORIGIN, FRAME_RADIUS));

/// The pixels that see sky, computed once per process.
pub fn field_of_view() -> &'static Mask {
    &FIELD_OF_VIEW
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct PixelCoordinate {
    row: usize,
    col: usize,
}

impl PixelCoordinate {
    /// # Panics
    ///
    /// Panics if `row` or `col` is not less than [`FRAME_SIZE`].
    pub fn new(row: usize, col: usize) -> Self {
        assert!(
            row < FRAME_SIZE && col < FRAME_SIZE,
            "pixel ({row}, {col}) is outside the {FRAME_SIZE}x{FRAME_SIZE} frame"
        );
        Self { row, col }
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn col(&self) -> usize {
        self.col
    }

    fn index(&self) -> usize {
        self.row * FRAME_SIZE + self.col
    }

    pub(crate) fn from_index(index: usize) -> Self {
        debug_assert!(index < FRAME_PIXELS);
        Self {
            row: index / FRAME_SIZE,
            col: index % FRAME_SIZE,
        }
    }
}

/// A point in frame pixel space that may fall outside the frame.
///
/// The sun projects off-frame when it is below the horizon.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SunCenter {
    row: i64,
    col: i64,
}

impl SunCenter {
    pub const fn new(row: i64, col: i64) -> Self {
        Self { row, col }
    }

    pub fn row(&self) -> i64 {
        self.row
    }

    pub fn col(&self) -> i64 {
        self.col
    }

    pub fn distance_squared(&self, other: &SunCenter) -> i64 {
        (self.row - other.row).pow(2) + (self.col - other.col).pow(2)
    }

    pub fn distance(&self, other: &SunCenter) -> f64 {
        (self.distance_squared(other) as f64).sqrt()
    }

    /// Returns the pixel at this point if it lies inside the frame.
    pub fn pixel(&self) -> Option<PixelCoordinate> {
        let row = usize::try_from(self.row).ok().filter(|r| *r < FRAME_SIZE)?;
        let col = usize::try_from(self.col).ok().filter(|c| *c < FRAME_SIZE)?;
        Some(PixelCoordinate::new(row, col))
    }
}

impl From<PixelCoordinate> for SunCenter {
    fn from(pixel: PixelCoordinate) -> Self {
        Self::new(pixel.row as i64, pixel.col as i64)
    }
}

impl From<(i64, i64)> for SunCenter {
    fn from((row, col): (i64, i64)) -> Self {
        Self::new(row, col)
    }
}

/// Color channel of an RGB pixel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Channel {
    Red = 0,
    Green = 1,
    Blue = 2,
}

/// A binary 64x64 pixel mask.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mask {
    pixels: Vec<bool>,
}

impl Mask {
    /// Creates a mask with no marked pixels.
    pub fn empty() -> Self {
        Self {
            pixels: vec![false; FRAME_PIXELS],
        }
    }

    /// Creates a mask by evaluating `f` at every pixel in row-major order.
    pub fn from_fn(mut f: impl FnMut(PixelCoordinate) -> bool) -> Self {
        Self {
            pixels: (0..FRAME_PIXELS)
                .map(|index| f(PixelCoordinate::from_index(index)))
                .collect(),
        }
    }

    /// Marks every in-frame pixel within `radius` of `center` inclusive.
    ///
    /// Parts of the disk beyond the frame edge are dropped.
    pub fn disk(center: SunCenter, radius: i64) -> Self {
        Self::from_fn(|px| SunCenter::from(px).distance_squared(&center) <= radius.pow(2))
    }

    pub fn get(&self, pixel: PixelCoordinate) -> bool {
        self.pixels[pixel.index()]
    }

    pub fn count(&self) -> usize {
        self.pixels.iter().filter(|marked| **marked).count()
    }

    /// Counts pixels marked in both `self` and `other`.
    pub fn count_within(&self, other: &Mask) -> usize {
        self.pixels
            .iter()
            .zip(other.pixels.iter())
            .filter(|(a, b)| **a && **b)
            .count()
    }

    pub fn marked(&self) -> impl Iterator<Item = PixelCoordinate> + '_ {
        self.pixels
            .iter()
            .enumerate()
            .filter(|(_, marked)| **marked)
            .map(|(index, _)| PixelCoordinate::from_index(index))
    }

    pub fn as_slice(&self) -> &[bool] {
        self.pixels.as_slice()
    }

    /// Renders the mask as interleaved RGB bytes by row, with `channel` set to
    /// 255 at marked pixels and every other byte zero.
    pub fn rgb_bytes(&self, channel: Channel) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|marked| {
                let mut rgb = [0u8; 3];
                if *marked {
                    rgb[channel as usize] = u8::MAX;
                }
                rgb
            })
            .collect()
    }
}
