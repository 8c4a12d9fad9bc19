// colour solver and scanline compositing on straight-alpha RGBA buffers.
//
// compositing is 16-bit premultiplied source-over scaled by the coverage of
// each run, done in integer math so results are bit-for-bit reproducible.

use image::RgbaImage;

use crate::color::Color;
use crate::raster::Scanline;

const M: u64 = 0xffff;

#[inline]
fn span(width: usize, line: &Scanline) -> std::ops::Range<usize> {
    let row = line.y as usize * width;
    (row + line.x1 as usize) * 4..(row + line.x2 as usize) * 4
}

/// least-squares flat colour that, blended at `alpha` over `current`,
/// best matches `target` on the covered pixels. falls back to the average of
/// `current` when nothing is covered.
pub fn compute_color(target: &RgbaImage, current: &RgbaImage, lines: &[Scanline], alpha: u8) -> Color {
    profiling::scope!("compute_color");
    let alpha = alpha.max(1);
    let a = 0x101 * 255 / alpha as i64;
    let w = target.width() as usize;

    let mut sums = [0i64; 3];
    let mut count: i64 = 0;
    let t = target.as_raw();
    let c = current.as_raw();
    for line in lines {
        let r = span(w, line);
        for (tp, cp) in t[r.clone()].chunks_exact(4).zip(c[r].chunks_exact(4)) {
            for ch in 0..3 {
                let (tv, cv) = (tp[ch] as i64, cp[ch] as i64);
                sums[ch] += (tv - cv) * a + cv * 0x101;
            }
            count += 1;
        }
    }

    if count == 0 {
        return Color::average(current).with_alpha(alpha);
    }

    let solve = |sum: i64| ((sum / count) >> 8).clamp(0, 255) as u8;
    Color::new(solve(sums[0]), solve(sums[1]), solve(sums[2]), alpha)
}

/// copy the pixels under `lines` from `src` into `dst`
pub fn copy_lines(dst: &mut RgbaImage, src: &RgbaImage, lines: &[Scanline]) {
    profiling::scope!("copy_lines");
    debug_assert_eq!(dst.dimensions(), src.dimensions());
    let w = src.width() as usize;
    let s = src.as_raw();
    let d: &mut [u8] = dst;
    for line in lines {
        let r = span(w, line);
        d[r.clone()].copy_from_slice(&s[r]);
    }
}

/// blend `color` over the pixels under `lines`
pub fn draw_lines(image: &mut RgbaImage, color: Color, lines: &[Scanline]) {
    profiling::scope!("draw_lines");
    let sa = color.a as u64 * 0x101;
    let src = [
        color.r as u64 * 0x101 * sa / M,
        color.g as u64 * 0x101 * sa / M,
        color.b as u64 * 0x101 * sa / M,
        sa,
    ];

    let w = image.width() as usize;
    let buf: &mut [u8] = image;
    for line in lines {
        let ma = line.alpha as u64;
        let keep = (M - sa * ma / M) * 0x101;
        for px in buf[span(w, line)].chunks_exact_mut(4) {
            for (d, s) in px.iter_mut().zip(src) {
                *d = ((((*d as u64) * keep + s * ma) / M) >> 8) as u8;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn full_rows(w: i32, h: i32) -> Vec<Scanline> {
        (0..h).map(|y| Scanline::full(y, 0, w)).collect()
    }

    #[test]
    fn opaque_solve_reproduces_target() {
        let target = RgbaImage::from_pixel(4, 4, Rgba([200, 10, 90, 255]));
        let current = RgbaImage::from_pixel(4, 4, Rgba([255, 255, 255, 255]));
        let c = compute_color(&target, &current, &full_rows(4, 4), 255);
        assert_eq!(c, Color::new(200, 10, 90, 255));
    }

    #[test]
    fn translucent_solve_is_clamped() {
        let target = RgbaImage::from_pixel(4, 4, Rgba([255, 0, 0, 255]));
        let current = RgbaImage::from_pixel(4, 4, Rgba([255, 255, 255, 255]));
        let c = compute_color(&target, &current, &full_rows(4, 4), 128);
        assert_eq!(c, Color::new(255, 0, 0, 128));
    }

    #[test]
    fn no_coverage_falls_back_to_current_average() {
        let target = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 255]));
        let current = RgbaImage::from_pixel(2, 2, Rgba([40, 50, 60, 255]));
        assert_eq!(compute_color(&target, &current, &[], 77), Color::new(40, 50, 60, 77));
    }

    #[test]
    fn opaque_draw_replaces_pixels() {
        let mut img = RgbaImage::from_pixel(5, 3, Rgba([255, 255, 255, 255]));
        draw_lines(&mut img, Color::new(12, 34, 56, 255), &[Scanline::full(1, 1, 4)]);
        assert_eq!(img.get_pixel(2, 1), &Rgba([12, 34, 56, 255]));
        assert_eq!(img.get_pixel(0, 1), &Rgba([255, 255, 255, 255]));
        assert_eq!(img.get_pixel(2, 0), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn half_alpha_blends_halfway() {
        let mut img = RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 255]));
        draw_lines(&mut img, Color::new(255, 255, 255, 128), &[Scanline::full(0, 0, 1)]);
        let px = img.get_pixel(0, 0);
        assert!((px[0] as i32 - 128).abs() <= 1, "{px:?}");
        assert_eq!(px[3], 255);
    }

    #[test]
    fn zero_coverage_is_a_no_op() {
        let mut img = RgbaImage::from_pixel(2, 1, Rgba([9, 8, 7, 255]));
        let line = Scanline { y: 0, x1: 0, x2: 2, alpha: 0 };
        draw_lines(&mut img, Color::new(200, 200, 200, 255), &[line]);
        assert_eq!(img.get_pixel(1, 0), &Rgba([9, 8, 7, 255]));
    }

    #[test]
    fn copy_lines_restores_region() {
        let src = RgbaImage::from_pixel(4, 4, Rgba([1, 2, 3, 255]));
        let mut dst = RgbaImage::from_pixel(4, 4, Rgba([9, 9, 9, 255]));
        copy_lines(&mut dst, &src, &[Scanline::full(2, 1, 3)]);
        assert_eq!(dst.get_pixel(1, 2), &Rgba([1, 2, 3, 255]));
        assert_eq!(dst.get_pixel(3, 2), &Rgba([9, 9, 9, 255]));
    }
}
