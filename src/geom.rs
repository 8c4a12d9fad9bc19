// geometry helpers shared by the shape variants
//
// points are (x, y) in working-canvas units. the polygon checks keep
// mutated shapes:
// - simple (no self-intersections / bow-ties)
// - non-degenerate (positive area, no needle triangles)

pub type Point = (f64, f64);

/// signed area of a polygon using the shoelace formula.
/// returns positive for CCW, negative for CW, zero for degenerate.
pub fn signed_area(pts: &[Point]) -> f64 {
    if pts.len() < 3 {
        return 0.0;
    }

    let mut area = 0.0;
    for i in 0..pts.len() {
        let j = (i + 1) % pts.len();
        area += pts[i].0 * pts[j].1;
        area -= pts[j].0 * pts[i].1;
    }
    area * 0.5
}

/// absolute polygon area in square units
#[inline]
pub fn polygon_area(pts: &[Point]) -> f64 {
    signed_area(pts).abs()
}

/// check if two line segments properly cross (touching endpoints don't count).
fn segments_intersect(a: Point, b: Point, c: Point, d: Point) -> bool {
    fn ccw(p: Point, q: Point, r: Point) -> f64 {
        (r.1 - p.1) * (q.0 - p.0) - (q.1 - p.1) * (r.0 - p.0)
    }

    let ccw_abc = ccw(a, b, c);
    let ccw_abd = ccw(a, b, d);
    let ccw_cda = ccw(c, d, a);
    let ccw_cdb = ccw(c, d, b);

    const EPSILON: f64 = 1e-9;
    (ccw_abc * ccw_abd < -EPSILON) && (ccw_cda * ccw_cdb < -EPSILON)
}

/// check if a polygon is simple (no self-intersections).
/// tests all pairs of non-adjacent edges.
pub fn is_simple(pts: &[Point]) -> bool {
    let n = pts.len();
    if n < 3 {
        return false;
    }

    for i in 0..n {
        let j = (i + 1) % n;
        for k in (i + 2)..n {
            let l = (k + 1) % n;
            // edges sharing the wraparound vertex are adjacent
            if i == l {
                continue;
            }
            if segments_intersect(pts[i], pts[j], pts[k], pts[l]) {
                return false;
            }
        }
    }

    true
}

/// interior angle at vertex `b` of the corner a-b-c, in degrees
fn corner_degrees(a: Point, b: Point, c: Point) -> f64 {
    let (ux, uy) = (a.0 - b.0, a.1 - b.1);
    let (vx, vy) = (c.0 - b.0, c.1 - b.1);
    let lu = ux.hypot(uy);
    let lv = vx.hypot(vy);
    if lu == 0.0 || lv == 0.0 {
        return 0.0;
    }
    let cos = ((ux * vx + uy * vy) / (lu * lv)).clamp(-1.0, 1.0);
    cos.acos().to_degrees()
}

/// true when every interior angle of the triangle exceeds `min_degrees`
pub fn triangle_angles_exceed(pts: [Point; 3], min_degrees: f64) -> bool {
    let [a, b, c] = pts;
    corner_degrees(c, a, b) > min_degrees
        && corner_degrees(a, b, c) > min_degrees
        && corner_degrees(b, c, a) > min_degrees
}

/// rotate (x, y) around the origin by `radians`
#[inline]
pub fn rotate(x: f64, y: f64, radians: f64) -> Point {
    let (s, c) = radians.sin_cos();
    (x * c - y * s, x * s + y * c)
}

#[inline]
pub fn distance_sq(a: Point, b: Point) -> f64 {
    let dx = a.0 - b.0;
    let dy = a.1 - b.1;
    dx * dx + dy * dy
}

/// squared distance from `p` to the segment a-b
pub fn segment_distance_sq(p: Point, a: Point, b: Point) -> f64 {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return distance_sq(p, a);
    }
    let t = (((p.0 - a.0) * dx + (p.1 - a.1) * dy) / len_sq).clamp(0.0, 1.0);
    distance_sq(p, (a.0 + t * dx, a.1 + t * dy))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signed_area_ccw() {
        let pts = vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)];
        assert!(signed_area(&pts) > 0.0);
    }

    #[test]
    fn test_signed_area_cw() {
        let pts = vec![(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)];
        assert!(signed_area(&pts) < 0.0);
        assert_eq!(polygon_area(&pts), 1.0);
    }

    #[test]
    fn test_bow_tie_rejected() {
        let pts = vec![(0.0, 0.0), (1.0, 1.0), (1.0, 0.0), (0.0, 1.0)];
        assert!(!is_simple(&pts));
    }

    #[test]
    fn test_concave_quad_is_still_simple() {
        let pts = vec![(0.0, 0.0), (1.0, 0.0), (0.3, 0.5), (0.0, 1.0)];
        assert!(is_simple(&pts));
    }

    #[test]
    fn test_needle_triangle_rejected() {
        assert!(triangle_angles_exceed([(0.0, 0.0), (10.0, 0.0), (5.0, 8.0)], 15.0));
        assert!(!triangle_angles_exceed([(0.0, 0.0), (10.0, 0.0), (20.0, 1.0)], 15.0));
        assert!(!triangle_angles_exceed([(0.0, 0.0), (0.0, 0.0), (5.0, 8.0)], 15.0));
    }

    #[test]
    fn test_rotate_quarter_turn() {
        let (x, y) = rotate(1.0, 0.0, std::f64::consts::FRAC_PI_2);
        assert!(x.abs() < 1e-12);
        assert!((y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_segment_distance() {
        assert_eq!(segment_distance_sq((5.0, 3.0), (0.0, 0.0), (10.0, 0.0)), 9.0);
        assert_eq!(segment_distance_sq((-3.0, 4.0), (0.0, 0.0), (10.0, 0.0)), 25.0);
    }
}
