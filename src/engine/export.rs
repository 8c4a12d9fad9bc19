use image::RgbaImage;

use crate::error::Result;
use crate::render::VectorCanvas;

use super::Model;

/// frames are emitted relative to this score, so the first committed
/// shape always produces one
const FRAME_START_SCORE: f64 = 10.0;

impl Model {
    /// SVG document: background rect, then one element per committed shape,
    /// in commit order, inside a `scale(s) translate(0.5 0.5)` group
    pub fn svg(&self) -> String {
        profiling::scope!("Model::svg");
        let (sw, sh) = (self.sw, self.sh);
        let mut lines = Vec::with_capacity(self.shapes.len() + 5);
        lines.push(format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" version="1.1" width="{sw}" height="{sh}">"#
        ));
        lines.push(format!(
            r#"<rect x="0" y="0" width="{sw}" height="{sh}" fill="{}" />"#,
            self.background.hex_rgb()
        ));
        lines.push(format!(r#"<g transform="scale({:.6}) translate(0.5 0.5)">"#, self.scale));
        for (shape, color) in self.shapes.iter().zip(&self.colors) {
            let attrs = format!(
                r#"fill="{}" fill-opacity="{:.6}""#,
                color.hex_rgb(),
                color.a as f64 / 255.0
            );
            lines.push(shape.svg(&attrs));
        }
        lines.push("</g>".to_owned());
        lines.push("</svg>".to_owned());
        lines.join("\n")
    }

    /// replay the history onto a fresh canvas. the background frame is always
    /// first; after that a frame is kept whenever the score has dropped by at
    /// least `delta` since the last kept frame.
    pub fn frames(&self, delta: f64) -> Result<Vec<RgbaImage>> {
        profiling::scope!("Model::frames");
        let mut canvas = VectorCanvas::new(self.sw, self.sh, self.scale, self.background)?;
        let mut frames = vec![canvas.image()];
        let mut previous = FRAME_START_SCORE;
        for ((shape, &color), &score) in self.shapes.iter().zip(&self.colors).zip(&self.scores) {
            canvas.draw(shape, color);
            if previous - score >= delta {
                previous = score;
                frames.push(canvas.image());
            }
        }
        tracing::debug!(frames = frames.len(), shapes = self.shapes.len(), delta, "frames");
        Ok(frames)
    }
}
