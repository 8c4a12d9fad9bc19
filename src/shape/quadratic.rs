use rand::Rng;
use serde::{Deserialize, Serialize};
use tiny_skia as sk;

use super::{clamp_f, normal, MARGIN};
use crate::geom::{distance_sq, Point};
use crate::raster::{stroke_polyline, Bounds, Scanline};

/// segments used to flatten the curve before stroking
const FLATTEN_SEGMENTS: usize = 16;

/// quadratic Bezier stroke from p1 to p3 with control point p2
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quadratic {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub x3: f64,
    pub y3: f64,
    pub width: f64,
}

impl Quadratic {
    pub fn random<R: Rng>(bounds: Bounds, rng: &mut R) -> Self {
        let x1 = rng.random::<f64>() * bounds.w as f64;
        let y1 = rng.random::<f64>() * bounds.h as f64;
        let x2 = x1 + rng.random::<f64>() * 40.0 - 20.0;
        let y2 = y1 + rng.random::<f64>() * 40.0 - 20.0;
        let x3 = x2 + rng.random::<f64>() * 40.0 - 20.0;
        let y3 = y2 + rng.random::<f64>() * 40.0 - 20.0;
        let mut q = Self { x1, y1, x2, y2, x3, y3, width: 0.5 };
        q.perturb(bounds, rng);
        q
    }

    pub fn perturb<R: Rng>(&mut self, bounds: Bounds, rng: &mut R) {
        let m = MARGIN as f64;
        let (w, h) = (bounds.w as f64, bounds.h as f64);
        loop {
            let dx = normal(rng) * 16.0;
            let dy = normal(rng) * 16.0;
            let (x, y) = match rng.random_range(0..3) {
                0 => (&mut self.x1, &mut self.y1),
                1 => (&mut self.x2, &mut self.y2),
                _ => (&mut self.x3, &mut self.y3),
            };
            *x = clamp_f(*x + dx, -m, w - 1.0 + m);
            *y = clamp_f(*y + dy, -m, h - 1.0 + m);
            if self.is_valid() {
                break;
            }
        }
    }

    /// the chord must be the longest of the three point distances,
    /// which keeps the curve from folding back on itself
    pub fn is_valid(&self) -> bool {
        let p1 = (self.x1, self.y1);
        let p2 = (self.x2, self.y2);
        let p3 = (self.x3, self.y3);
        let d12 = distance_sq(p1, p2);
        let d23 = distance_sq(p2, p3);
        let d13 = distance_sq(p1, p3);
        d13 > d12 && d13 > d23
    }

    pub fn flatten(&self) -> [Point; FLATTEN_SEGMENTS + 1] {
        std::array::from_fn(|i| {
            let t = i as f64 / FLATTEN_SEGMENTS as f64;
            let u = 1.0 - t;
            (
                u * u * self.x1 + 2.0 * u * t * self.x2 + t * t * self.x3,
                u * u * self.y1 + 2.0 * u * t * self.y2 + t * t * self.y3,
            )
        })
    }

    pub fn rasterize(&self, bounds: Bounds, lines: &mut Vec<Scanline>) {
        stroke_polyline(&self.flatten(), self.width, bounds, lines);
    }

    pub fn svg(&self, attrs: &str) -> String {
        let attrs = attrs.replace("fill", "stroke");
        format!(
            r#"<path {attrs} fill="none" d="M {:.6} {:.6} Q {:.6} {:.6}, {:.6} {:.6}" stroke-width="{:.6}" />"#,
            self.x1, self.y1, self.x2, self.y2, self.x3, self.y3, self.width
        )
    }

    pub fn path(&self) -> Option<sk::Path> {
        let mut pb = sk::PathBuilder::new();
        pb.move_to(self.x1 as f32, self.y1 as f32);
        pb.quad_to(self.x2 as f32, self.y2 as f32, self.x3 as f32, self.y3 as f32);
        pb.finish()
    }
}
