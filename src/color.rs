use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// straight (un-premultiplied) 8-bit RGBA color
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::new(255, 255, 255, 255);
    pub const BLACK: Color = Color::new(0, 0, 0, 255);

    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// parse `#rgb`, `#rgba`, `#rrggbb` or `#rrggbbaa` (leading `#` optional)
    pub fn from_hex(s: &str) -> Result<Self> {
        let hex = s.trim().trim_start_matches('#');
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(Error::invalid_color(s));
        }

        let nibble = |i: usize| -> Result<u8> {
            u8::from_str_radix(&hex[i..i + 1], 16)
                .map(|v| (v << 4) | v)
                .map_err(|_| Error::invalid_color(s))
        };
        let byte = |i: usize| -> Result<u8> {
            u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| Error::invalid_color(s))
        };

        match hex.len() {
            3 => Ok(Self::new(nibble(0)?, nibble(1)?, nibble(2)?, 255)),
            4 => Ok(Self::new(nibble(0)?, nibble(1)?, nibble(2)?, nibble(3)?)),
            6 => Ok(Self::new(byte(0)?, byte(2)?, byte(4)?, 255)),
            8 => Ok(Self::new(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => Err(Error::invalid_color(s)),
        }
    }

    /// mean RGB over every pixel of the image, fully opaque
    pub fn average(image: &RgbaImage) -> Self {
        profiling::scope!("Color::average");
        let mut sums = [0u64; 3];
        for px in image.pixels() {
            sums[0] += px[0] as u64;
            sums[1] += px[1] as u64;
            sums[2] += px[2] as u64;
        }
        let n = (image.width() as u64 * image.height() as u64).max(1);
        Self::new((sums[0] / n) as u8, (sums[1] / n) as u8, (sums[2] / n) as u8, 255)
    }

    #[inline]
    pub fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// `#rrggbb`, alpha is dropped
    pub fn hex_rgb(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    #[inline]
    pub fn to_rgba(self) -> image::Rgba<u8> {
        image::Rgba([self.r, self.g, self.b, self.a])
    }

    /// premultiplied pixel, the representation the working canvas holds
    pub fn to_premultiplied_rgba(self) -> image::Rgba<u8> {
        let a = self.a as u32 * 0x101;
        let mul = |c: u8| ((c as u32 * 0x101 * a / 0xffff) >> 8) as u8;
        image::Rgba([mul(self.r), mul(self.g), mul(self.b), self.a])
    }
}
