// -----------------------------------------------------------------------------
// Scan conversion: shapes -> horizontal pixel runs
// -----------------------------------------------------------------------------
//
// coordinate convention: integer coordinates sit on pixel centres, so row `y`
// is sampled at exactly `y` and pixel `x` is covered when its centre lies
// inside the shape. every emitted run is clipped to the canvas.

use crate::geom::{segment_distance_sq, Point};

/// full coverage for `Scanline::alpha` (16-bit)
pub const FULL_COVERAGE: u32 = 0xffff;

/// steps used when quantizing anti-aliased coverage so neighbouring pixels
/// with the same coverage merge into one run
const COVERAGE_STEPS: f64 = 64.0;

/// working canvas size in pixels
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bounds {
    pub w: i32,
    pub h: i32,
}

impl Bounds {
    #[inline]
    pub fn new(w: u32, h: u32) -> Self {
        Self { w: w as i32, h: h as i32 }
    }

    #[inline]
    pub fn pixels(&self) -> usize {
        self.w.max(0) as usize * self.h.max(0) as usize
    }
}

/// horizontal run of pixels `[x1, x2)` on row `y` with a 16-bit coverage
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Scanline {
    pub y: i32,
    pub x1: i32,
    pub x2: i32,
    pub alpha: u32,
}

impl Scanline {
    #[inline]
    pub fn full(y: i32, x1: i32, x2: i32) -> Self {
        Self { y, x1, x2, alpha: FULL_COVERAGE }
    }

    #[inline]
    pub fn len(&self) -> usize {
        (self.x2 - self.x1).max(0) as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.x2 <= self.x1
    }
}

/// total number of pixels touched by a run set
pub fn covered_pixels(lines: &[Scanline]) -> usize {
    lines.iter().map(Scanline::len).sum()
}

/// push `[x1, x2)` on row `y` after clipping to the canvas
#[inline]
pub(crate) fn push_clipped(lines: &mut Vec<Scanline>, bounds: Bounds, y: i32, x1: i32, x2: i32, alpha: u32) {
    if y < 0 || y >= bounds.h {
        return;
    }
    let x1 = x1.max(0);
    let x2 = x2.min(bounds.w);
    if x1 < x2 && alpha > 0 {
        lines.push(Scanline { y, x1, x2, alpha });
    }
}

/// fill a closed polygon (even-odd rule) into `lines`, rows ascending.
/// the buffer is cleared first; an empty result means nothing on canvas is covered.
pub fn fill_polygon(pts: &[Point], bounds: Bounds, lines: &mut Vec<Scanline>) {
    profiling::scope!("fill_polygon");
    lines.clear();
    let n = pts.len();
    if n < 3 || bounds.w <= 0 || bounds.h <= 0 {
        return;
    }

    let mut y_min = f64::INFINITY;
    let mut y_max = f64::NEG_INFINITY;
    for &(_, y) in pts {
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }
    if !y_min.is_finite() || !y_max.is_finite() {
        return;
    }

    // rows whose sample y satisfies y_min <= y < y_max
    let row_start = (y_min.ceil() as i64).max(0) as i32;
    let row_end = (y_max.ceil() as i64).min(bounds.h as i64) as i32;

    let mut xs: Vec<f64> = Vec::with_capacity(n);
    for y in row_start..row_end {
        let yc = y as f64;
        xs.clear();
        for i in 0..n {
            let (ax, ay) = pts[i];
            let (bx, by) = pts[(i + 1) % n];
            if (ay <= yc && yc < by) || (by <= yc && yc < ay) {
                xs.push(ax + (yc - ay) * (bx - ax) / (by - ay));
            }
        }
        xs.sort_by(f64::total_cmp);
        for pair in xs.chunks_exact(2) {
            let x1 = pair[0].ceil().clamp(i32::MIN as f64, i32::MAX as f64) as i32;
            let x2 = pair[1].ceil().clamp(i32::MIN as f64, i32::MAX as f64) as i32;
            push_clipped(lines, bounds, y, x1, x2, FULL_COVERAGE);
        }
    }
}

/// x extent of the part of segment `a`-`b` lying within `reach` of row `yc`
fn segment_row_span(a: Point, b: Point, yc: f64, reach: f64) -> Option<(f64, f64)> {
    let (lo, hi) = (yc - reach, yc + reach);
    if a.1.max(b.1) < lo || a.1.min(b.1) > hi {
        return None;
    }
    let dy = b.1 - a.1;
    if dy.abs() < 1e-12 {
        return Some((a.0.min(b.0), a.0.max(b.0)));
    }
    let t0 = ((lo - a.1) / dy).clamp(0.0, 1.0);
    let t1 = ((hi - a.1) / dy).clamp(0.0, 1.0);
    let x0 = a.0 + t0 * (b.0 - a.0);
    let x1 = a.0 + t1 * (b.0 - a.0);
    Some((x0.min(x1), x0.max(x1)))
}

/// stroke an open polyline of the given width with box-filtered coverage.
/// pixels with equal (quantized) coverage on a row are merged into one run.
/// each row only visits columns within reach of a segment crossing it.
pub fn stroke_polyline(pts: &[Point], width: f64, bounds: Bounds, lines: &mut Vec<Scanline>) {
    profiling::scope!("stroke_polyline");
    lines.clear();
    if pts.len() < 2 || width <= 0.0 || bounds.w <= 0 || bounds.h <= 0 {
        return;
    }

    let half = width / 2.0;
    let reach = half + 0.5;

    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for &(_, y) in pts {
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }
    if !min_y.is_finite() || !max_y.is_finite() {
        return;
    }
    let y_start = ((min_y - reach).floor() as i64).max(0) as i32;
    let y_end = ((max_y + reach).ceil() as i64).min(bounds.h as i64 - 1) as i32;

    let mut near: Vec<(Point, Point)> = Vec::with_capacity(pts.len());
    let mut spans: Vec<(i32, i32)> = Vec::with_capacity(pts.len());
    for y in y_start..=y_end {
        let yc = y as f64;
        near.clear();
        spans.clear();
        for seg in pts.windows(2) {
            let Some((lo, hi)) = segment_row_span(seg[0], seg[1], yc, reach) else {
                continue;
            };
            near.push((seg[0], seg[1]));
            let x1 = ((lo - reach).floor() as i64).max(0) as i32;
            let x2 = ((hi + reach).ceil() as i64).min(bounds.w as i64 - 1) as i32;
            if x1 <= x2 {
                spans.push((x1, x2));
            }
        }
        spans.sort_unstable();

        // merge overlapping or touching column ranges, inclusive ends
        let mut merged: Option<(i32, i32)> = None;
        for &(x1, x2) in spans.iter() {
            merged = match merged {
                Some((m1, m2)) if x1 <= m2 + 1 => Some((m1, m2.max(x2))),
                Some(range) => {
                    stroke_row(&near, half, bounds, y, range, lines);
                    Some((x1, x2))
                }
                None => Some((x1, x2)),
            };
        }
        if let Some(range) = merged {
            stroke_row(&near, half, bounds, y, range, lines);
        }
    }
}

/// emit coverage runs for columns `x_start..=x_end` of row `y`
fn stroke_row(
    segments: &[(Point, Point)],
    half: f64,
    bounds: Bounds,
    y: i32,
    (x_start, x_end): (i32, i32),
    lines: &mut Vec<Scanline>,
) {
    // open run: (x1, alpha)
    let mut run: Option<(i32, u32)> = None;
    for x in x_start..=x_end {
        let p = (x as f64, y as f64);
        let d = segments
            .iter()
            .map(|&(a, b)| segment_distance_sq(p, a, b))
            .fold(f64::INFINITY, f64::min)
            .sqrt();

        // overlap of [d - half, d + half] with the pixel's unit footprint
        let cov = ((d + half).min(0.5) - (d - half).max(-0.5)).max(0.0).min(1.0);
        let alpha = ((cov * COVERAGE_STEPS).round() / COVERAGE_STEPS * FULL_COVERAGE as f64) as u32;

        match run {
            Some((_, a)) if a == alpha => {}
            Some((x1, a)) => {
                push_clipped(lines, bounds, y, x1, x, a);
                run = (alpha > 0).then_some((x, alpha));
            }
            None if alpha > 0 => run = Some((x, alpha)),
            None => {}
        }
    }
    if let Some((x1, a)) = run {
        push_clipped(lines, bounds, y, x1, x_end + 1, a);
    }
}
