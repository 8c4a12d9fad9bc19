use rand::Rng;
use serde::{Deserialize, Serialize};
use tiny_skia as sk;

use super::{clamp_i, normal};
use crate::raster::{push_clipped, Bounds, Scanline, FULL_COVERAGE};

/// axis-aligned ellipse with integer centre and radii
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ellipse {
    pub x: i32,
    pub y: i32,
    pub rx: i32,
    pub ry: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Circle {
    pub x: i32,
    pub y: i32,
    pub r: i32,
}

/// one run per row, rows `y - ry < row < y + ry`
fn rasterize_ellipse(cx: i32, cy: i32, rx: i32, ry: i32, bounds: Bounds, lines: &mut Vec<Scanline>) {
    lines.clear();
    if rx < 1 || ry < 1 {
        return;
    }
    let aspect = rx as f64 / ry as f64;
    let ry_sq = (ry as f64) * (ry as f64);
    for y in (cy - ry + 1)..=(cy + ry - 1) {
        let dy = (y - cy) as f64;
        let s = ((ry_sq - dy * dy).sqrt() * aspect) as i32;
        push_clipped(lines, bounds, y, cx - s, cx + s + 1, FULL_COVERAGE);
    }
}

fn oval_path(cx: f32, cy: f32, rx: f32, ry: f32) -> Option<sk::Path> {
    let rect = sk::Rect::from_xywh(cx - rx, cy - ry, rx * 2.0, ry * 2.0)?;
    sk::PathBuilder::from_oval(rect)
}

impl Ellipse {
    pub fn random<R: Rng>(bounds: Bounds, rng: &mut R) -> Self {
        Self {
            x: rng.random_range(0..bounds.w),
            y: rng.random_range(0..bounds.h),
            rx: rng.random_range(1..=32),
            ry: rng.random_range(1..=32),
        }
    }

    pub fn perturb<R: Rng>(&mut self, bounds: Bounds, rng: &mut R) {
        let (w, h) = (bounds.w, bounds.h);
        match rng.random_range(0..3) {
            0 => {
                self.x = clamp_i(self.x + (normal(rng) * 16.0) as i32, 0, w - 1);
                self.y = clamp_i(self.y + (normal(rng) * 16.0) as i32, 0, h - 1);
            }
            1 => self.rx = clamp_i(self.rx + (normal(rng) * 16.0) as i32, 1, w - 1),
            _ => self.ry = clamp_i(self.ry + (normal(rng) * 16.0) as i32, 1, h - 1),
        }
    }

    pub fn rasterize(&self, bounds: Bounds, lines: &mut Vec<Scanline>) {
        rasterize_ellipse(self.x, self.y, self.rx, self.ry, bounds, lines);
    }

    pub fn svg(&self, attrs: &str) -> String {
        format!(
            r#"<ellipse {attrs} cx="{}" cy="{}" rx="{}" ry="{}" />"#,
            self.x, self.y, self.rx, self.ry
        )
    }

    pub fn path(&self) -> Option<sk::Path> {
        oval_path(self.x as f32, self.y as f32, self.rx as f32, self.ry as f32)
    }
}

impl Circle {
    pub fn random<R: Rng>(bounds: Bounds, rng: &mut R) -> Self {
        Self {
            x: rng.random_range(0..bounds.w),
            y: rng.random_range(0..bounds.h),
            r: rng.random_range(1..=32),
        }
    }

    pub fn perturb<R: Rng>(&mut self, bounds: Bounds, rng: &mut R) {
        let (w, h) = (bounds.w, bounds.h);
        if rng.random_bool(0.5) {
            self.x = clamp_i(self.x + (normal(rng) * 16.0) as i32, 0, w - 1);
            self.y = clamp_i(self.y + (normal(rng) * 16.0) as i32, 0, h - 1);
        } else {
            self.r = clamp_i(self.r + (normal(rng) * 16.0) as i32, 1, w.max(h) - 1);
        }
    }

    pub fn rasterize(&self, bounds: Bounds, lines: &mut Vec<Scanline>) {
        rasterize_ellipse(self.x, self.y, self.r, self.r, bounds, lines);
    }

    pub fn svg(&self, attrs: &str) -> String {
        format!(r#"<circle {attrs} cx="{}" cy="{}" r="{}" />"#, self.x, self.y, self.r)
    }

    pub fn path(&self) -> Option<sk::Path> {
        oval_path(self.x as f32, self.y as f32, self.r as f32, self.r as f32)
    }
}
