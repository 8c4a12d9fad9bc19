// Shape variants: random construction, mutation, scan conversion and output.
//
// every variant lives in its own file and exposes the same small set of free
// functions (`random`, `perturb`, `is_valid`, `rasterize`, `svg`, `path`);
// `Shape` is the closed enum that dispatches to them.

mod ellipse;
mod polygon;
mod quadratic;
mod rectangle;
mod rotated_ellipse;
mod rotated_rectangle;
mod triangle;

pub use ellipse::{Circle, Ellipse};
pub use polygon::Polygon;
pub use quadratic::Quadratic;
pub use rectangle::Rectangle;
pub use rotated_ellipse::RotatedEllipse;
pub use rotated_rectangle::RotatedRectangle;
pub use triangle::Triangle;

use rand::Rng;
use rand_distr::{Distribution, StandardNormal};
use serde::{Deserialize, Serialize};
use tiny_skia as sk;

use crate::raster::{Bounds, Scanline};

/// how far control points of open/pointy variants may stray outside the canvas
pub(crate) const MARGIN: i32 = 16;

#[inline]
pub(crate) fn normal<R: Rng>(rng: &mut R) -> f64 {
    StandardNormal.sample(rng)
}

/// clamp that never panics: when `hi < lo` the result is `lo`
#[inline]
pub(crate) fn clamp_i(v: i32, lo: i32, hi: i32) -> i32 {
    v.min(hi).max(lo)
}

#[inline]
pub(crate) fn clamp_f(v: f64, lo: f64, hi: f64) -> f64 {
    v.min(hi).max(lo)
}

/// shape selector: `Any` samples one of the eight concrete variants per candidate
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ShapeType {
    Any = 0,
    Triangle = 1,
    Rectangle = 2,
    Ellipse = 3,
    Circle = 4,
    RotatedRectangle = 5,
    Quadratic = 6,
    RotatedEllipse = 7,
    Polygon = 8,
}

impl ShapeType {
    pub const CONCRETE: [ShapeType; 8] = [
        ShapeType::Triangle,
        ShapeType::Rectangle,
        ShapeType::Ellipse,
        ShapeType::Circle,
        ShapeType::RotatedRectangle,
        ShapeType::Quadratic,
        ShapeType::RotatedEllipse,
        ShapeType::Polygon,
    ];

    /// numeric selector used on the command line (0..=8)
    pub fn from_mode(mode: u8) -> Option<Self> {
        match mode {
            0 => Some(ShapeType::Any),
            m => Self::CONCRETE.get(m as usize - 1).copied(),
        }
    }

    #[inline]
    pub fn mode(self) -> u8 {
        self as u8
    }

    /// replace `Any` by a uniformly sampled concrete variant
    pub fn resolve<R: Rng>(self, rng: &mut R) -> Self {
        match self {
            ShapeType::Any => Self::CONCRETE[rng.random_range(0..Self::CONCRETE.len())],
            other => other,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Triangle(Triangle),
    Rectangle(Rectangle),
    Ellipse(Ellipse),
    Circle(Circle),
    RotatedRectangle(RotatedRectangle),
    Quadratic(Quadratic),
    RotatedEllipse(RotatedEllipse),
    Polygon(Polygon),
}

impl Shape {
    /// a random valid shape of the requested kind whose rasterization is not empty.
    /// `scratch` holds the scanlines of the returned shape afterwards.
    pub fn random<R: Rng>(kind: ShapeType, bounds: Bounds, rng: &mut R, scratch: &mut Vec<Scanline>) -> Self {
        profiling::scope!("Shape::random");
        let kind = kind.resolve(rng);
        loop {
            let shape = match kind {
                ShapeType::Triangle | ShapeType::Any => Shape::Triangle(Triangle::random(bounds, rng)),
                ShapeType::Rectangle => Shape::Rectangle(Rectangle::random(bounds, rng)),
                ShapeType::Ellipse => Shape::Ellipse(Ellipse::random(bounds, rng)),
                ShapeType::Circle => Shape::Circle(Circle::random(bounds, rng)),
                ShapeType::RotatedRectangle => Shape::RotatedRectangle(RotatedRectangle::random(bounds, rng)),
                ShapeType::Quadratic => Shape::Quadratic(Quadratic::random(bounds, rng)),
                ShapeType::RotatedEllipse => Shape::RotatedEllipse(RotatedEllipse::random(bounds, rng)),
                ShapeType::Polygon => Shape::Polygon(Polygon::random(bounds, rng)),
            };
            shape.rasterize(bounds, scratch);
            if !scratch.is_empty() {
                return shape;
            }
        }
    }

    /// perturb exactly one control value. retries until the result is valid and
    /// still covers at least one pixel; `scratch` then holds its scanlines.
    pub fn mutate<R: Rng>(&mut self, bounds: Bounds, rng: &mut R, scratch: &mut Vec<Scanline>) {
        profiling::scope!("Shape::mutate");
        loop {
            let mut candidate = self.clone();
            match &mut candidate {
                Shape::Triangle(s) => s.perturb(bounds, rng),
                Shape::Rectangle(s) => s.perturb(bounds, rng),
                Shape::Ellipse(s) => s.perturb(bounds, rng),
                Shape::Circle(s) => s.perturb(bounds, rng),
                Shape::RotatedRectangle(s) => s.perturb(bounds, rng),
                Shape::Quadratic(s) => s.perturb(bounds, rng),
                Shape::RotatedEllipse(s) => s.perturb(bounds, rng),
                Shape::Polygon(s) => s.perturb(bounds, rng),
            }
            candidate.rasterize(bounds, scratch);
            if !scratch.is_empty() {
                *self = candidate;
                return;
            }
        }
    }

    /// clear `lines` and fill it with this shape's clipped scanlines, rows ascending
    pub fn rasterize(&self, bounds: Bounds, lines: &mut Vec<Scanline>) {
        match self {
            Shape::Triangle(s) => s.rasterize(bounds, lines),
            Shape::Rectangle(s) => s.rasterize(bounds, lines),
            Shape::Ellipse(s) => s.rasterize(bounds, lines),
            Shape::Circle(s) => s.rasterize(bounds, lines),
            Shape::RotatedRectangle(s) => s.rasterize(bounds, lines),
            Shape::Quadratic(s) => s.rasterize(bounds, lines),
            Shape::RotatedEllipse(s) => s.rasterize(bounds, lines),
            Shape::Polygon(s) => s.rasterize(bounds, lines),
        }
    }

    pub fn kind(&self) -> ShapeType {
        match self {
            Shape::Triangle(_) => ShapeType::Triangle,
            Shape::Rectangle(_) => ShapeType::Rectangle,
            Shape::Ellipse(_) => ShapeType::Ellipse,
            Shape::Circle(_) => ShapeType::Circle,
            Shape::RotatedRectangle(_) => ShapeType::RotatedRectangle,
            Shape::Quadratic(_) => ShapeType::Quadratic,
            Shape::RotatedEllipse(_) => ShapeType::RotatedEllipse,
            Shape::Polygon(_) => ShapeType::Polygon,
        }
    }

    pub fn is_valid(&self) -> bool {
        match self {
            Shape::Triangle(s) => s.is_valid(),
            Shape::RotatedRectangle(s) => s.is_valid(),
            Shape::Quadratic(s) => s.is_valid(),
            Shape::Polygon(s) => s.is_valid(),
            Shape::Rectangle(_) | Shape::Ellipse(_) | Shape::Circle(_) | Shape::RotatedEllipse(_) => true,
        }
    }

    /// SVG element for this shape; `attrs` carries the fill attributes
    pub fn svg(&self, attrs: &str) -> String {
        match self {
            Shape::Triangle(s) => s.svg(attrs),
            Shape::Rectangle(s) => s.svg(attrs),
            Shape::Ellipse(s) => s.svg(attrs),
            Shape::Circle(s) => s.svg(attrs),
            Shape::RotatedRectangle(s) => s.svg(attrs),
            Shape::Quadratic(s) => s.svg(attrs),
            Shape::RotatedEllipse(s) => s.svg(attrs),
            Shape::Polygon(s) => s.svg(attrs),
        }
    }

    /// outline in working-canvas units for the vector canvas
    pub fn path(&self) -> Option<sk::Path> {
        match self {
            Shape::Triangle(s) => s.path(),
            Shape::Rectangle(s) => s.path(),
            Shape::Ellipse(s) => s.path(),
            Shape::Circle(s) => s.path(),
            Shape::RotatedRectangle(s) => s.path(),
            Shape::Quadratic(s) => s.path(),
            Shape::RotatedEllipse(s) => s.path(),
            Shape::Polygon(s) => s.path(),
        }
    }

    /// stroke width when the shape is drawn as an outline instead of filled
    pub fn stroke_width(&self) -> Option<f64> {
        match self {
            Shape::Quadratic(q) => Some(q.width),
            _ => None,
        }
    }
}

/// build a closed path through `pts`
pub(crate) fn closed_path(pts: &[(f64, f64)]) -> Option<sk::Path> {
    let (first, rest) = pts.split_first()?;
    let mut pb = sk::PathBuilder::new();
    pb.move_to(first.0 as f32, first.1 as f32);
    for p in rest {
        pb.line_to(p.0 as f32, p.1 as f32);
    }
    pb.close();
    pb.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn well_formed(lines: &[Scanline], bounds: Bounds) -> bool {
        lines.windows(2).all(|w| w[0].y < w[1].y || (w[0].y == w[1].y && w[0].x2 <= w[1].x1))
            && lines.iter().all(|l| l.x1 < l.x2 && l.x1 >= 0 && l.x2 <= bounds.w && l.y >= 0 && l.y < bounds.h)
    }

    #[test]
    fn mode_mapping_matches_selector_table() {
        assert_eq!(ShapeType::from_mode(0), Some(ShapeType::Any));
        assert_eq!(ShapeType::from_mode(1), Some(ShapeType::Triangle));
        assert_eq!(ShapeType::from_mode(5), Some(ShapeType::RotatedRectangle));
        assert_eq!(ShapeType::from_mode(6), Some(ShapeType::Quadratic));
        assert_eq!(ShapeType::from_mode(7), Some(ShapeType::RotatedEllipse));
        assert_eq!(ShapeType::from_mode(8), Some(ShapeType::Polygon));
        assert_eq!(ShapeType::from_mode(9), None);
        for kind in ShapeType::CONCRETE {
            assert_eq!(ShapeType::from_mode(kind.mode()), Some(kind));
        }
    }

    #[test]
    fn any_resolves_to_every_concrete_kind() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..500 {
            let k = ShapeType::Any.resolve(&mut rng);
            assert_ne!(k, ShapeType::Any);
            seen.insert(k);
        }
        assert_eq!(seen.len(), 8);
    }

    #[test]
    fn random_and_mutated_shapes_stay_valid_and_visible() {
        let bounds = Bounds::new(64, 48);
        let mut rng = Pcg32::seed_from_u64(11);
        let mut lines = Vec::new();
        for kind in ShapeType::CONCRETE {
            for _ in 0..20 {
                let mut shape = Shape::random(kind, bounds, &mut rng, &mut lines);
                assert_eq!(shape.kind(), kind);
                assert!(shape.is_valid());
                assert!(!lines.is_empty());
                assert!(well_formed(&lines, bounds), "{kind:?}");
                for _ in 0..20 {
                    shape.mutate(bounds, &mut rng, &mut lines);
                    assert!(shape.is_valid(), "{shape:?}");
                    assert!(!lines.is_empty());
                    assert!(well_formed(&lines, bounds), "{shape:?}");
                }
            }
        }
    }

    #[test]
    fn mutate_leaves_scratch_matching_shape() {
        let bounds = Bounds::new(40, 40);
        let mut rng = Pcg32::seed_from_u64(5);
        let mut scratch = Vec::new();
        let mut fresh = Vec::new();
        let mut shape = Shape::random(ShapeType::Any, bounds, &mut rng, &mut scratch);
        for _ in 0..50 {
            shape.mutate(bounds, &mut rng, &mut scratch);
            shape.rasterize(bounds, &mut fresh);
            assert_eq!(scratch, fresh);
        }
    }

    #[test]
    fn single_pixel_canvas_never_yields_empty_shapes() {
        let bounds = Bounds::new(1, 1);
        let mut rng = Pcg32::seed_from_u64(99);
        let mut lines = Vec::new();
        for kind in ShapeType::CONCRETE {
            let mut shape = Shape::random(kind, bounds, &mut rng, &mut lines);
            assert_eq!(lines, vec![Scanline { y: 0, x1: 0, x2: 1, alpha: lines[0].alpha }]);
            shape.mutate(bounds, &mut rng, &mut lines);
            assert_eq!(lines.len(), 1);
        }
    }

    #[test]
    fn svg_elements_per_kind() {
        let bounds = Bounds::new(32, 32);
        let mut rng = Pcg32::seed_from_u64(1);
        let mut lines = Vec::new();
        let expect = [
            (ShapeType::Triangle, "<polygon"),
            (ShapeType::Rectangle, "<rect"),
            (ShapeType::Ellipse, "<ellipse"),
            (ShapeType::Circle, "<circle"),
            (ShapeType::RotatedRectangle, "<rect"),
            (ShapeType::Quadratic, "<path"),
            (ShapeType::RotatedEllipse, "<ellipse"),
            (ShapeType::Polygon, "<polygon"),
        ];
        for (kind, tag) in expect {
            let shape = Shape::random(kind, bounds, &mut rng, &mut lines);
            let svg = shape.svg(r##"fill="#ff0000" fill-opacity="0.5""##);
            assert!(svg.starts_with(tag) || svg.starts_with("<g"), "{svg}");
            assert!(svg.contains(tag), "{svg}");
            assert!(shape.path().is_some(), "{kind:?}");
        }
    }

    #[test]
    fn quadratic_svg_uses_stroke() {
        let bounds = Bounds::new(32, 32);
        let mut rng = Pcg32::seed_from_u64(8);
        let mut lines = Vec::new();
        let shape = Shape::random(ShapeType::Quadratic, bounds, &mut rng, &mut lines);
        let svg = shape.svg(r##"fill="#00ff00" fill-opacity="0.250000""##);
        assert!(svg.contains(r##"stroke="#00ff00""##));
        assert!(svg.contains(r#"stroke-opacity="0.250000""#));
        assert!(svg.contains(r#"fill="none""#));
        assert_eq!(shape.stroke_width(), Some(0.5));
    }
}
