//! Paint targets: the `Surface` seam and an owned RGBA framebuffer.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Packed RGBA color.
///
/// Stored so the in-memory byte order is `R, G, B, A` on little-endian
/// targets, which lets a [`PixelSurface`] be blitted as-is (for example into
/// a browser `ImageData`). Serializes as a `#RRGGBB` / `#RRGGBBAA` hex
/// string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(transparent)]
pub struct Rgba(u32);

impl Rgba {
    /// Fully transparent black, the initial framebuffer contents.
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self((r as u32) | (g as u32) << 8 | (b as u32) << 16 | (a as u32) << 24)
    }

    /// Opaque color from RGB channels.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 0xFF)
    }

    #[inline]
    pub const fn r(&self) -> u8 {
        self.0 as u8
    }

    #[inline]
    pub const fn g(&self) -> u8 {
        (self.0 >> 8) as u8
    }

    #[inline]
    pub const fn b(&self) -> u8 {
        (self.0 >> 16) as u8
    }

    #[inline]
    pub const fn a(&self) -> u8 {
        (self.0 >> 24) as u8
    }
}

/// A color string that is not `#RRGGBB` or `#RRGGBBAA`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid color {0:?}, expected #RRGGBB or #RRGGBBAA")]
pub struct ColorParseError(pub String);

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a() == 0xFF {
            write!(f, "#{:02X}{:02X}{:02X}", self.r(), self.g(), self.b())
        } else {
            write!(
                f,
                "#{:02X}{:02X}{:02X}{:02X}",
                self.r(),
                self.g(),
                self.b(),
                self.a()
            )
        }
    }
}

impl FromStr for Rgba {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, ColorParseError> {
        let digits = s
            .strip_prefix('#')
            .ok_or_else(|| ColorParseError(s.to_owned()))?;
        let channel = |at: usize| {
            digits
                .get(at..at + 2)
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .ok_or_else(|| ColorParseError(s.to_owned()))
        };
        match digits.len() {
            6 => Ok(Rgba::rgb(channel(0)?, channel(2)?, channel(4)?)),
            8 => Ok(Rgba::new(
                channel(0)?,
                channel(2)?,
                channel(4)?,
                channel(6)?,
            )),
            _ => Err(ColorParseError(s.to_owned())),
        }
    }
}

impl Serialize for Rgba {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Rgba {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Where cell rectangles and gridlines get painted.
///
/// The renderer only ever issues axis-aligned filled rectangles, so this is
/// the whole seam. Implementations clip out-of-range rectangles rather than
/// failing.
pub trait Surface {
    /// Surface width in pixels.
    fn width(&self) -> u32;

    /// Surface height in pixels.
    fn height(&self) -> u32;

    /// Fill a rectangle, clipping it to the surface bounds.
    fn fill_rect(&mut self, x: u32, y: u32, w: u32, h: u32, color: Rgba);
}

/// Owned RGBA framebuffer.
///
/// Pixels are row-major, starting transparent. `as_bytes` exposes the buffer
/// for blitting without a copy.
#[derive(Debug, Clone)]
pub struct PixelSurface {
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
}

impl PixelSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Rgba::TRANSPARENT; width as usize * height as usize],
        }
    }

    /// One pixel.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is outside the surface.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> Rgba {
        assert!(x < self.width && y < self.height, "pixel outside surface");
        self.pixels[y as usize * self.width as usize + x as usize]
    }

    /// All pixels, row-major.
    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    /// The framebuffer as raw bytes (`R, G, B, A` per pixel on little-endian
    /// targets).
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }
}

impl Surface for PixelSurface {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn fill_rect(&mut self, x: u32, y: u32, w: u32, h: u32, color: Rgba) {
        let x0 = x.min(self.width) as usize;
        let y0 = y.min(self.height) as usize;
        let x1 = x.saturating_add(w).min(self.width) as usize;
        let y1 = y.saturating_add(h).min(self.height) as usize;
        let stride = self.width as usize;
        for row in y0..y1 {
            self.pixels[row * stride + x0..row * stride + x1].fill(color);
        }
    }
}
