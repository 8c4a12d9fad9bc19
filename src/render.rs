use image::{Rgba, RgbaImage};
use tiny_skia as sk;

use crate::color::Color;
use crate::error::{Error, Result};
use crate::shape::Shape;

/// Output-resolution canvas mirroring the committed shapes with anti-aliased
/// vector drawing. Shapes are given in working-canvas units; the transform
/// `scale(s) translate(0.5 0.5)` maps pixel centres to output pixels.
pub struct VectorCanvas {
    pix: sk::Pixmap,
    transform: sk::Transform,
}

impl VectorCanvas {
    pub fn new(width: u32, height: u32, scale: f64, background: Color) -> Result<Self> {
        let mut pix = sk::Pixmap::new(width, height)
            .ok_or_else(|| Error::canvas(format!("cannot allocate {width}x{height} pixmap")))?;
        pix.fill(sk_color(background));
        let s = scale as f32;
        let transform = sk::Transform::from_scale(s, s).pre_translate(0.5, 0.5);
        Ok(Self { pix, transform })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.pix.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.pix.height()
    }

    pub fn draw(&mut self, shape: &Shape, color: Color) {
        profiling::scope!("VectorCanvas::draw");
        let Some(path) = shape.path() else {
            return;
        };

        let mut paint = sk::Paint::default();
        paint.anti_alias = true;
        paint.shader = sk::Shader::SolidColor(sk_color(color));

        match shape.stroke_width() {
            Some(width) => {
                let stroke = sk::Stroke { width: width as f32, ..sk::Stroke::default() };
                self.pix.stroke_path(&path, &paint, &stroke, self.transform, None);
            }
            None => self.pix.fill_path(&path, &paint, sk::FillRule::EvenOdd, self.transform, None),
        }
    }

    /// straight-alpha copy of the canvas
    pub fn image(&self) -> RgbaImage {
        profiling::scope!("VectorCanvas::image");
        let mut out = RgbaImage::new(self.pix.width(), self.pix.height());
        for (dst, src) in out.pixels_mut().zip(self.pix.pixels()) {
            let c = src.demultiply();
            *dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
        }
        out
    }
}

#[inline]
fn sk_color(c: Color) -> sk::Color {
    sk::Color::from_rgba8(c.r, c.g, c.b, c.a)
}
