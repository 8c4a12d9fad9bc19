use rand::Rng;
use serde::{Deserialize, Serialize};
use tiny_skia as sk;

use super::{clamp_i, closed_path, normal, MARGIN};
use crate::geom::{triangle_angles_exceed, Point};
use crate::raster::{fill_polygon, Bounds, Scanline};

/// needle triangles below this interior angle are rejected
const MIN_DEGREES: f64 = 15.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Triangle {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
    pub x3: i32,
    pub y3: i32,
}

impl Triangle {
    pub fn random<R: Rng>(bounds: Bounds, rng: &mut R) -> Self {
        let x1 = rng.random_range(0..bounds.w);
        let y1 = rng.random_range(0..bounds.h);
        let mut t = Self {
            x1,
            y1,
            x2: x1 + rng.random_range(-15..=15),
            y2: y1 + rng.random_range(-15..=15),
            x3: x1 + rng.random_range(-15..=15),
            y3: y1 + rng.random_range(-15..=15),
        };
        t.perturb(bounds, rng);
        t
    }

    /// move one vertex; repeats until every angle is wide enough
    pub fn perturb<R: Rng>(&mut self, bounds: Bounds, rng: &mut R) {
        let (w, h) = (bounds.w, bounds.h);
        loop {
            let dx = (normal(rng) * 16.0) as i32;
            let dy = (normal(rng) * 16.0) as i32;
            let (x, y) = match rng.random_range(0..3) {
                0 => (&mut self.x1, &mut self.y1),
                1 => (&mut self.x2, &mut self.y2),
                _ => (&mut self.x3, &mut self.y3),
            };
            *x = clamp_i(*x + dx, -MARGIN, w - 1 + MARGIN);
            *y = clamp_i(*y + dy, -MARGIN, h - 1 + MARGIN);
            if self.is_valid() {
                break;
            }
        }
    }

    pub fn is_valid(&self) -> bool {
        triangle_angles_exceed(self.points(), MIN_DEGREES)
    }

    pub fn points(&self) -> [Point; 3] {
        [
            (self.x1 as f64, self.y1 as f64),
            (self.x2 as f64, self.y2 as f64),
            (self.x3 as f64, self.y3 as f64),
        ]
    }

    pub fn rasterize(&self, bounds: Bounds, lines: &mut Vec<Scanline>) {
        fill_polygon(&self.points(), bounds, lines);
    }

    pub fn svg(&self, attrs: &str) -> String {
        format!(
            r#"<polygon {attrs} points="{},{} {},{} {},{}" />"#,
            self.x1, self.y1, self.x2, self.y2, self.x3, self.y3
        )
    }

    pub fn path(&self) -> Option<sk::Path> {
        closed_path(&self.points())
    }
}
