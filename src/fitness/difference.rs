// root-mean-square difference between two RGBA buffers (alpha ignored),
// normalized so that a canvas of maximal contrast scores 1.0.

use image::RgbaImage;
use rayon::prelude::*;

use crate::raster::Scanline;

pub const SCORE_CHANNELS: f64 = 3.0;

#[inline(always)]
fn sq_rgb(a: &[u8], b: &[u8]) -> u64 {
    let dr = a[0] as i32 - b[0] as i32;
    let dg = a[1] as i32 - b[1] as i32;
    let db = a[2] as i32 - b[2] as i32;
    (dr * dr + dg * dg + db * db) as u64
}

#[inline]
fn normalize(total: f64, pixels: usize) -> f64 {
    let denom = (pixels as f64 * SCORE_CHANNELS).max(1.0);
    (total.max(0.0) / denom).sqrt() / 255.0
}

/// full-image score; rows are summed in parallel
pub fn difference_full(target: &RgbaImage, current: &RgbaImage) -> f64 {
    profiling::scope!("difference_full");
    debug_assert_eq!(target.dimensions(), current.dimensions());

    let stride = (target.width() as usize * 4).max(4);
    let total: u64 = target
        .as_raw()
        .par_chunks(stride)
        .zip(current.as_raw().par_chunks(stride))
        .map(|(t_row, c_row)| {
            t_row
                .chunks_exact(4)
                .zip(c_row.chunks_exact(4))
                .map(|(t, c)| sq_rgb(t, c))
                .sum::<u64>()
        })
        .sum();

    normalize(total as f64, target.width() as usize * target.height() as usize)
}

/// score of `after` given the score of `before`, looking only at the pixels
/// under `lines`. `before` and `after` must agree everywhere else.
pub fn difference_partial(
    target: &RgbaImage,
    before: &RgbaImage,
    after: &RgbaImage,
    score: f64,
    lines: &[Scanline],
) -> f64 {
    profiling::scope!("difference_partial");
    let w = target.width() as usize;
    let pixels = w * target.height() as usize;
    let denom = pixels as f64 * SCORE_CHANNELS;
    let prior = score * 255.0;

    let t = target.as_raw();
    let b = before.as_raw();
    let a = after.as_raw();

    let mut delta: i64 = 0;
    for line in lines {
        let row = line.y as usize * w;
        let lo = (row + line.x1 as usize) * 4;
        let hi = (row + line.x2 as usize) * 4;
        for ((tp, bp), ap) in t[lo..hi]
            .chunks_exact(4)
            .zip(b[lo..hi].chunks_exact(4))
            .zip(a[lo..hi].chunks_exact(4))
        {
            delta -= sq_rgb(tp, bp) as i64;
            delta += sq_rgb(tp, ap) as i64;
        }
    }

    normalize(prior * prior * denom + delta as f64, pixels)
}
