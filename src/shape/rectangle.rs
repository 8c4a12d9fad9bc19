use rand::Rng;
use serde::{Deserialize, Serialize};
use tiny_skia as sk;

use super::{clamp_i, normal};
use crate::raster::{push_clipped, Bounds, Scanline, FULL_COVERAGE};

/// axis-aligned rectangle spanning two inclusive pixel corners
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rectangle {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl Rectangle {
    pub fn random<R: Rng>(bounds: Bounds, rng: &mut R) -> Self {
        let x1 = rng.random_range(0..bounds.w);
        let y1 = rng.random_range(0..bounds.h);
        Self {
            x1,
            y1,
            x2: clamp_i(x1 + rng.random_range(1..=32), 0, bounds.w - 1),
            y2: clamp_i(y1 + rng.random_range(1..=32), 0, bounds.h - 1),
        }
    }

    pub fn perturb<R: Rng>(&mut self, bounds: Bounds, rng: &mut R) {
        let dx = (normal(rng) * 16.0) as i32;
        let dy = (normal(rng) * 16.0) as i32;
        let (x, y) = if rng.random_bool(0.5) {
            (&mut self.x1, &mut self.y1)
        } else {
            (&mut self.x2, &mut self.y2)
        };
        *x = clamp_i(*x + dx, 0, bounds.w - 1);
        *y = clamp_i(*y + dy, 0, bounds.h - 1);
    }

    /// normalized (left, top, right, bottom), inclusive
    pub fn ltrb(&self) -> (i32, i32, i32, i32) {
        (
            self.x1.min(self.x2),
            self.y1.min(self.y2),
            self.x1.max(self.x2),
            self.y1.max(self.y2),
        )
    }

    pub fn rasterize(&self, bounds: Bounds, lines: &mut Vec<Scanline>) {
        lines.clear();
        let (l, t, r, b) = self.ltrb();
        for y in t..=b {
            push_clipped(lines, bounds, y, l, r + 1, FULL_COVERAGE);
        }
    }

    pub fn svg(&self, attrs: &str) -> String {
        let (l, t, r, b) = self.ltrb();
        format!(
            r#"<rect {attrs} x="{}" y="{}" width="{}" height="{}" />"#,
            l as f64 - 0.5,
            t as f64 - 0.5,
            r - l + 1,
            b - t + 1
        )
    }

    pub fn path(&self) -> Option<sk::Path> {
        let (l, t, r, b) = self.ltrb();
        let rect = sk::Rect::from_ltrb(l as f32 - 0.5, t as f32 - 0.5, r as f32 + 0.5, b as f32 + 0.5)?;
        Some(sk::PathBuilder::from_rect(rect))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rasterizes_inclusive_corners() {
        let r = Rectangle { x1: 5, y1: 4, x2: 2, y2: 2 };
        let mut lines = Vec::new();
        r.rasterize(Bounds::new(10, 10), &mut lines);
        assert_eq!(lines.len(), 3);
        assert!(lines.iter().all(|l| l.x1 == 2 && l.x2 == 6));
        assert_eq!(lines[0].y, 2);
        assert_eq!(r.svg("a"), r#"<rect a x="1.5" y="1.5" width="4" height="3" />"#);
    }
}
