use rand::Rng;
use serde::{Deserialize, Serialize};
use tiny_skia as sk;

use super::{clamp_f, normal};
use crate::geom::{rotate, Point};
use crate::raster::{fill_polygon, Bounds, Scanline};

/// vertices of the polygon the ellipse is approximated by when rasterizing
const OUTLINE_VERTICES: usize = 32;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RotatedEllipse {
    pub x: f64,
    pub y: f64,
    pub rx: f64,
    pub ry: f64,
    /// degrees
    pub angle: f64,
}

impl RotatedEllipse {
    pub fn random<R: Rng>(bounds: Bounds, rng: &mut R) -> Self {
        Self {
            x: rng.random::<f64>() * bounds.w as f64,
            y: rng.random::<f64>() * bounds.h as f64,
            rx: rng.random::<f64>() * 32.0 + 1.0,
            ry: rng.random::<f64>() * 32.0 + 1.0,
            angle: rng.random::<f64>() * 360.0,
        }
    }

    pub fn perturb<R: Rng>(&mut self, bounds: Bounds, rng: &mut R) {
        let (w, h) = (bounds.w as f64, bounds.h as f64);
        match rng.random_range(0..3) {
            0 => {
                self.x = clamp_f(self.x + normal(rng) * 16.0, 0.0, w - 1.0);
                self.y = clamp_f(self.y + normal(rng) * 16.0, 0.0, h - 1.0);
            }
            1 => {
                self.rx = clamp_f(self.rx + normal(rng) * 16.0, 1.0, w - 1.0);
                self.ry = clamp_f(self.ry + normal(rng) * 16.0, 1.0, h - 1.0);
            }
            _ => self.angle += normal(rng) * 32.0,
        }
    }

    pub fn outline(&self) -> [Point; OUTLINE_VERTICES] {
        let theta = self.angle.to_radians();
        std::array::from_fn(|i| {
            let t = i as f64 / OUTLINE_VERTICES as f64 * std::f64::consts::TAU;
            let (px, py) = rotate(t.cos() * self.rx, t.sin() * self.ry, theta);
            (px + self.x, py + self.y)
        })
    }

    pub fn rasterize(&self, bounds: Bounds, lines: &mut Vec<Scanline>) {
        fill_polygon(&self.outline(), bounds, lines);
    }

    pub fn svg(&self, attrs: &str) -> String {
        format!(
            r#"<g transform="translate({:.6} {:.6}) rotate({:.6}) scale({:.6} {:.6})"><ellipse {attrs} cx="0" cy="0" rx="1" ry="1" /></g>"#,
            self.x, self.y, self.angle, self.rx, self.ry
        )
    }

    pub fn path(&self) -> Option<sk::Path> {
        let unit = sk::Rect::from_xywh(-1.0, -1.0, 2.0, 2.0)?;
        let ts = sk::Transform::from_translate(self.x as f32, self.y as f32)
            .pre_concat(sk::Transform::from_rotate(self.angle as f32))
            .pre_concat(sk::Transform::from_scale(self.rx as f32, self.ry as f32));
        sk::PathBuilder::from_oval(unit)?.transform(ts)
    }
}
