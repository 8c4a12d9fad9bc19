use rand::Rng;
use serde::{Deserialize, Serialize};
use tiny_skia as sk;

use super::{clamp_f, closed_path, normal, MARGIN};
use crate::geom::{is_simple, polygon_area, Point};
use crate::raster::{fill_polygon, Bounds, Scanline};

/// vertex count of freshly sampled polygons
const ORDER: usize = 4;

/// simple (non self-intersecting) polygon with float vertices
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub points: Vec<Point>,
}

impl Polygon {
    pub fn random<R: Rng>(bounds: Bounds, rng: &mut R) -> Self {
        let x = rng.random::<f64>() * bounds.w as f64;
        let y = rng.random::<f64>() * bounds.h as f64;
        let mut points = Vec::with_capacity(ORDER);
        points.push((x, y));
        for _ in 1..ORDER {
            points.push((x + rng.random::<f64>() * 40.0 - 20.0, y + rng.random::<f64>() * 40.0 - 20.0));
        }
        let mut p = Self { points };
        p.perturb(bounds, rng);
        p
    }

    /// swap two vertices or move one; repeats until the outline is simple
    pub fn perturb<R: Rng>(&mut self, bounds: Bounds, rng: &mut R) {
        let n = self.points.len();
        if n < 3 {
            return;
        }
        let m = MARGIN as f64;
        let (w, h) = (bounds.w as f64, bounds.h as f64);
        loop {
            if rng.random::<f64>() < 0.25 {
                let i = rng.random_range(0..n);
                let j = rng.random_range(0..n);
                self.points.swap(i, j);
            } else {
                let i = rng.random_range(0..n);
                let (x, y) = self.points[i];
                self.points[i] = (
                    clamp_f(x + normal(rng) * 16.0, -m, w - 1.0 + m),
                    clamp_f(y + normal(rng) * 16.0, -m, h - 1.0 + m),
                );
            }
            if self.is_valid() {
                break;
            }
        }
    }

    pub fn is_valid(&self) -> bool {
        is_simple(&self.points) && polygon_area(&self.points) > 0.0
    }

    pub fn rasterize(&self, bounds: Bounds, lines: &mut Vec<Scanline>) {
        fill_polygon(&self.points, bounds, lines);
    }

    pub fn svg(&self, attrs: &str) -> String {
        let points = self
            .points
            .iter()
            .map(|(x, y)| format!("{x:.6},{y:.6}"))
            .collect::<Vec<_>>()
            .join(" ");
        format!(r#"<polygon {attrs} points="{points}" />"#)
    }

    pub fn path(&self) -> Option<sk::Path> {
        closed_path(&self.points)
    }
}
