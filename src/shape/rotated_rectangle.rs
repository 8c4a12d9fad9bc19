use rand::Rng;
use serde::{Deserialize, Serialize};
use tiny_skia as sk;

use super::{clamp_i, closed_path, normal};
use crate::geom::{rotate, Point};
use crate::raster::{fill_polygon, Bounds, Scanline};

const MAX_ASPECT: f64 = 5.0;

/// rectangle of `sx` by `sy` centred on (x, y), rotated by `angle` degrees
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotatedRectangle {
    pub x: i32,
    pub y: i32,
    pub sx: i32,
    pub sy: i32,
    pub angle: i32,
}

impl RotatedRectangle {
    pub fn random<R: Rng>(bounds: Bounds, rng: &mut R) -> Self {
        let mut r = Self {
            x: rng.random_range(0..bounds.w),
            y: rng.random_range(0..bounds.h),
            sx: rng.random_range(1..=32),
            sy: rng.random_range(1..=32),
            angle: rng.random_range(0..360),
        };
        r.perturb(bounds, rng);
        r
    }

    pub fn perturb<R: Rng>(&mut self, bounds: Bounds, rng: &mut R) {
        let (w, h) = (bounds.w, bounds.h);
        loop {
            match rng.random_range(0..3) {
                0 => {
                    self.x = clamp_i(self.x + (normal(rng) * 16.0) as i32, 0, w - 1);
                    self.y = clamp_i(self.y + (normal(rng) * 16.0) as i32, 0, h - 1);
                }
                1 => {
                    self.sx = clamp_i(self.sx + (normal(rng) * 16.0) as i32, 1, w - 1);
                    self.sy = clamp_i(self.sy + (normal(rng) * 16.0) as i32, 1, h - 1);
                }
                _ => self.angle += (normal(rng) * 32.0) as i32,
            }
            if self.is_valid() {
                break;
            }
        }
    }

    pub fn is_valid(&self) -> bool {
        let a = self.sx.max(self.sy) as f64;
        let b = self.sx.min(self.sy) as f64;
        b >= 1.0 && a / b <= MAX_ASPECT
    }

    pub fn corners(&self) -> [Point; 4] {
        let (hx, hy) = (self.sx as f64 / 2.0, self.sy as f64 / 2.0);
        let theta = (self.angle as f64).to_radians();
        let (cx, cy) = (self.x as f64, self.y as f64);
        [(-hx, -hy), (hx, -hy), (hx, hy), (-hx, hy)].map(|(px, py)| {
            let (rx, ry) = rotate(px, py, theta);
            (rx + cx, ry + cy)
        })
    }

    pub fn rasterize(&self, bounds: Bounds, lines: &mut Vec<Scanline>) {
        fill_polygon(&self.corners(), bounds, lines);
    }

    pub fn svg(&self, attrs: &str) -> String {
        format!(
            r#"<g transform="translate({} {}) rotate({}) scale({} {})"><rect {attrs} x="-0.5" y="-0.5" width="1" height="1" /></g>"#,
            self.x, self.y, self.angle, self.sx, self.sy
        )
    }

    pub fn path(&self) -> Option<sk::Path> {
        closed_path(&self.corners())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::covered_pixels;

    #[test]
    fn unrotated_matches_axis_aligned_area() {
        let r = RotatedRectangle { x: 10, y: 10, sx: 6, sy: 4, angle: 0 };
        let mut lines = Vec::new();
        r.rasterize(Bounds::new(20, 20), &mut lines);
        assert_eq!(covered_pixels(&lines), 24);
    }

    #[test]
    fn quarter_turn_swaps_extent() {
        let r = RotatedRectangle { x: 10, y: 10, sx: 8, sy: 2, angle: 90 };
        let mut lines = Vec::new();
        r.rasterize(Bounds::new(20, 20), &mut lines);
        assert_eq!(lines.len(), 8);
    }

    #[test]
    fn aspect_limit() {
        assert!(RotatedRectangle { x: 0, y: 0, sx: 10, sy: 2, angle: 0 }.is_valid());
        assert!(!RotatedRectangle { x: 0, y: 0, sx: 12, sy: 2, angle: 0 }.is_valid());
    }
}
