use crate::fitness::{improvement_percent, MetricsSnapshot};

use super::Model;

impl Model {
    /// score, RMSE and PSNR of the current canvas
    #[inline]
    pub fn metrics(&self) -> MetricsSnapshot {
        MetricsSnapshot::from_score(self.score)
    }

    /// score of the background-only canvas
    #[inline]
    pub fn initial_score(&self) -> f64 {
        self.initial_score
    }

    /// get current progress as a percentage (0-100, higher is better)
    /// normalized by the score of the background-only canvas
    pub fn improvement_percent(&self) -> f64 {
        improvement_percent(self.initial_score, self.score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::shape::{Rectangle, Shape};
    use image::{Rgba, RgbaImage};

    #[test]
    fn covering_the_target_reaches_full_improvement() {
        let target = RgbaImage::from_pixel(6, 4, Rgba([30, 60, 90, 255]));
        let mut model = Model::new(target, Color::WHITE, 12, 1).unwrap();
        assert_eq!(model.improvement_percent(), 0.0);
        assert!(model.metrics().rmse > 0.0);

        model.add(Shape::Rectangle(Rectangle { x1: 0, y1: 0, x2: 5, y2: 3 }), 255);
        assert!(model.score() < 1e-12);
        assert!((model.improvement_percent() - 100.0).abs() < 1e-9);
        assert!(model.metrics().psnr > 100.0);
    }
}
