// Engine module organization
// Each submodule handles a specific aspect of the shape search

pub mod export;
pub mod metrics;
pub mod optimizer;
pub mod worker;

pub use optimizer::{hill_climb, State};
pub use worker::Worker;

use std::sync::Arc;

use image::RgbaImage;
use rayon::prelude::*;

use crate::color::Color;
use crate::error::{Error, Result};
use crate::fitness::{compute_color, difference_full, difference_partial, draw_lines};
use crate::raster::{Bounds, Scanline};
use crate::render::VectorCanvas;
use crate::settings::SearchSettings;
use crate::shape::{Shape, ShapeType};

/// construction parameters for a `Model`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ModelConfig {
    /// longer side of rendered outputs
    pub output_size: u32,
    /// worker count; 0 means one per available core
    pub workers: usize,
    /// base seed for the worker RNG streams; random when `None`
    pub seed: Option<u64>,
    pub search: SearchSettings,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            output_size: 1024,
            workers: 0,
            seed: None,
            search: SearchSettings::default(),
        }
    }
}

/// index of the first strictly smallest value; NaN never wins
pub fn index_of_min(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        if v.is_nan() {
            continue;
        }
        if best.map_or(true, |(_, b)| v < b) {
            best = Some((i, v));
        }
    }
    best.map(|(i, _)| i)
}

/// output dimensions and canvas-to-output scale for a target of `w` by `h`
pub fn output_geometry(w: u32, h: u32, size: u32) -> (u32, u32, f64) {
    let aspect = w as f64 / h as f64;
    let size_f = size as f64;
    if aspect >= 1.0 {
        (size, ((size_f / aspect) as u32).max(1), size_f / w as f64)
    } else {
        (((size_f * aspect) as u32).max(1), size, size_f / h as f64)
    }
}

/// Owns the target, the accumulated canvas and the committed history, and
/// drives the worker pool one step at a time.
pub struct Model {
    sw: u32,
    sh: u32,
    scale: f64,
    background: Color,
    target: Arc<RgbaImage>,
    current: RgbaImage,
    score: f64,
    initial_score: f64,
    shapes: Vec<Shape>,
    colors: Vec<Color>,
    scores: Vec<f64>,
    canvas: VectorCanvas,
    bounds: Bounds,
    lines: Vec<Scanline>,
    search: SearchSettings,
    workers: Vec<Worker>,
    pool: rayon::ThreadPool,
}

impl Model {
    /// `workers == 0` uses every available core; the worker seeds are random
    pub fn new(target: RgbaImage, background: Color, size: u32, workers: usize) -> Result<Self> {
        let config = ModelConfig {
            output_size: size,
            workers,
            ..ModelConfig::default()
        };
        Self::with_config(target, background, &config)
    }

    pub fn with_config(target: RgbaImage, background: Color, config: &ModelConfig) -> Result<Self> {
        profiling::scope!("Model::with_config");
        let (w, h) = target.dimensions();
        if w == 0 || h == 0 {
            return Err(Error::canvas(format!("target image is {w}x{h}")));
        }
        if config.output_size == 0 {
            return Err(Error::canvas("output size must be positive"));
        }

        let (sw, sh, scale) = output_geometry(w, h, config.output_size);
        let target = Arc::new(target);
        let current = RgbaImage::from_pixel(w, h, background.to_premultiplied_rgba());
        let score = difference_full(&target, &current);
        let canvas = VectorCanvas::new(sw, sh, scale, background)?;

        let worker_count = match config.workers {
            0 => std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1),
            n => n,
        };
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(worker_count)
            .thread_name(|i| format!("worker-{i}"))
            .build()
            .map_err(|e| Error::ThreadPool(e.to_string()))?;

        let seed = config.seed.unwrap_or_else(rand::random);
        let workers = (0..worker_count)
            .map(|i| Worker::new(i, Arc::clone(&target), seed.wrapping_add(i as u64)))
            .collect();

        tracing::info!(
            width = w,
            height = h,
            output_width = sw,
            output_height = sh,
            workers = worker_count,
            seed,
            score,
            "model ready"
        );

        Ok(Self {
            sw,
            sh,
            scale,
            background,
            target,
            current,
            score,
            initial_score: score,
            shapes: Vec::new(),
            colors: Vec::new(),
            scores: Vec::new(),
            canvas,
            bounds: Bounds::new(w, h),
            lines: Vec::new(),
            search: config.search,
            workers,
            pool,
        })
    }

    /// draw `shape` at `alpha` in its best colour onto the canvas and record it
    pub fn add(&mut self, shape: Shape, alpha: u8) {
        profiling::scope!("Model::add");
        let before = self.current.clone();
        shape.rasterize(self.bounds, &mut self.lines);
        let color = compute_color(&self.target, &self.current, &self.lines, alpha);
        draw_lines(&mut self.current, color, &self.lines);
        let score = difference_partial(&self.target, &before, &self.current, self.score, &self.lines);

        self.score = score;
        self.canvas.draw(&shape, color);
        self.shapes.push(shape);
        self.colors.push(color);
        self.scores.push(score);
    }

    /// search for the best shape, commit it, then refine up to `repeat` more
    /// times while refinement still helps. returns the number of energy
    /// evaluations performed by the workers.
    #[tracing::instrument(level = "debug", skip(self), fields(frame = self.shapes.len()))]
    pub fn step(&mut self, kind: ShapeType, alpha: u8, repeat: u32) -> u64 {
        profiling::scope!("Model::step");
        let (mut state, winner) = self.run_workers(kind, alpha);
        self.add(state.shape.clone(), state.alpha);
        let mut evaluations: u64 = self.workers.iter().map(Worker::counter).sum();

        // refinement re-inits the winner, which resets its counter
        for _ in 0..repeat {
            let worker = &mut self.workers[winner];
            worker.init(&self.current, self.score);
            state.invalidate();
            let before = state.energy(worker);
            state = hill_climb(state, worker, self.search.refine_age);
            let after = state.energy(worker);
            evaluations += worker.counter();
            // stop once a pass no longer moves the energy or would not lower the score
            if before == after || after >= self.score {
                break;
            }
            self.add(state.shape.clone(), state.alpha);
        }

        evaluations
    }

    /// fan the search out to every worker and reduce to the lowest energy.
    /// results are collected in worker order, so ties go to the lowest index.
    fn run_workers(&mut self, kind: ShapeType, alpha: u8) -> (State, usize) {
        profiling::scope!("Model::run_workers");
        let n = self.search.candidates;
        let age = self.search.age;
        let restarts = self.search.restarts.div_ceil(self.workers.len().max(1) as u32).max(1);

        let current = &self.current;
        let score = self.score;
        let workers = &mut self.workers;
        let mut results: Vec<(State, f64)> = self.pool.install(|| {
            workers
                .par_iter_mut()
                .map(|worker| {
                    worker.init(current, score);
                    let mut state = worker.best_hill_climb_state(kind, alpha, n, age, restarts);
                    let energy = state.energy(worker);
                    (state, energy)
                })
                .collect()
        });

        let energies: Vec<f64> = results.iter().map(|(_, e)| *e).collect();
        let winner = index_of_min(&energies).unwrap_or(0);
        tracing::debug!(winner, energy = energies.get(winner).copied(), "reduced");
        (results.swap_remove(winner).0, winner)
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.current.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.current.height()
    }

    /// output dimensions
    #[inline]
    pub fn output_size(&self) -> (u32, u32) {
        (self.sw, self.sh)
    }

    #[inline]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    #[inline]
    pub fn background(&self) -> Color {
        self.background
    }

    #[inline]
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    #[inline]
    pub fn target(&self) -> &RgbaImage {
        &self.target
    }

    /// working-resolution canvas
    #[inline]
    pub fn current(&self) -> &RgbaImage {
        &self.current
    }

    #[inline]
    pub fn score(&self) -> f64 {
        self.score
    }

    #[inline]
    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    #[inline]
    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    #[inline]
    pub fn scores(&self) -> &[f64] {
        &self.scores
    }

    /// output-resolution raster of everything committed so far
    pub fn render(&self) -> RgbaImage {
        self.canvas.image()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn config(seed: u64, workers: usize) -> ModelConfig {
        ModelConfig {
            output_size: 64,
            workers,
            seed: Some(seed),
            search: SearchSettings { candidates: 20, age: 20, restarts: 4, refine_age: 20 },
        }
    }

    #[test]
    fn reduction_prefers_lowest_index_on_ties() {
        assert_eq!(index_of_min(&[5.0, 2.0, 2.0, 7.0]), Some(1));
        assert_eq!(index_of_min(&[3.0]), Some(0));
        assert_eq!(index_of_min(&[]), None);
        assert_eq!(index_of_min(&[f64::NAN, 1.0]), Some(1));
    }

    #[test]
    fn geometry_keeps_aspect() {
        assert_eq!(output_geometry(200, 100, 1024), (1024, 512, 5.12));
        assert_eq!(output_geometry(100, 200, 1024), (512, 1024, 5.12));
        assert_eq!(output_geometry(1, 1, 8), (8, 8, 8.0));
    }

    #[test]
    fn zero_sized_target_is_rejected() {
        let err = Model::new(RgbaImage::new(0, 4), Color::WHITE, 64, 1);
        assert!(matches!(err, Err(Error::Canvas(_))));
    }

    #[test]
    fn histories_grow_together() {
        let target = RgbaImage::from_fn(20, 20, |x, y| Rgba([(x * 12) as u8, (y * 12) as u8, 0, 255]));
        let mut model = Model::with_config(target, Color::WHITE, &config(1, 2)).unwrap();
        for _ in 0..3 {
            let evaluations = model.step(ShapeType::Any, 128, 1);
            assert!(evaluations > 0);
            assert_eq!(model.shapes().len(), model.colors().len());
            assert_eq!(model.shapes().len(), model.scores().len());
        }
        assert!(model.shapes().len() >= 3);
        assert_eq!(model.scores().last().copied(), Some(model.score()));
    }

    #[test]
    fn running_score_tracks_full_difference() {
        let target = RgbaImage::from_fn(24, 24, |x, y| Rgba([(x * 10) as u8, 80, (y * 10) as u8, 255]));
        let mut model = Model::with_config(target, Color::BLACK, &config(9, 1)).unwrap();
        let mut rng = <rand_pcg::Pcg32 as rand::SeedableRng>::seed_from_u64(9);
        let mut scratch = Vec::new();
        for i in 0..60 {
            let kind = ShapeType::CONCRETE[i % 8];
            let shape = Shape::random(kind, model.bounds, &mut rng, &mut scratch);
            model.add(shape, (i * 4 + 10) as u8);
            let full = difference_full(model.target(), model.current());
            assert!((model.score() - full).abs() < 1e-9, "{kind:?}");
        }
        assert_eq!(model.scores().len(), 60);
    }

    #[test]
    fn refinement_counts_every_evaluation() {
        let target = RgbaImage::from_fn(24, 24, |x, y| Rgba([(x * 10) as u8, 80, (y * 10) as u8, 255]));
        let mut plain = Model::with_config(target.clone(), Color::BLACK, &config(21, 1)).unwrap();
        let mut refined = Model::with_config(target, Color::BLACK, &config(21, 1)).unwrap();
        let searched = plain.step(ShapeType::Triangle, 128, 0);
        let total = refined.step(ShapeType::Triangle, 128, 5);
        // restarts run before refinement, so the search part is identical
        assert!(searched >= 4 * 20);
        assert!(total > searched, "{total} <= {searched}");
    }

    #[test]
    fn refinement_is_bounded_and_never_raises_the_score() {
        let target = RgbaImage::from_fn(24, 24, |x, y| Rgba([(x * 10) as u8, 80, (y * 10) as u8, 255]));
        let mut model = Model::with_config(target, Color::BLACK, &config(5, 2)).unwrap();
        let repeat = 3;
        for _ in 0..6 {
            let start = model.shapes().len();
            model.step(ShapeType::Ellipse, 128, repeat);
            let added = model.shapes().len() - start;
            assert!((1..=1 + repeat as usize).contains(&added), "{added}");
            for pair in model.scores()[start..].windows(2) {
                assert!(pair[1] < pair[0], "refinement raised the score: {pair:?}");
            }
        }
    }

    #[test]
    fn refinement_stops_when_a_pass_cannot_move() {
        let target = RgbaImage::from_fn(16, 16, |x, y| Rgba([(x * 16) as u8, (y * 16) as u8, 40, 255]));
        let mut cfg = config(8, 2);
        cfg.search.refine_age = 0;
        let mut model = Model::with_config(target, Color::WHITE, &cfg).unwrap();
        for i in 1..=3 {
            model.step(ShapeType::Rectangle, 128, 10);
            assert_eq!(model.shapes().len(), i);
        }
    }

    #[test]
    fn translucent_background_is_premultiplied() {
        let target = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 255]));
        let model = Model::new(target, Color::new(255, 128, 0, 128), 16, 1).unwrap();
        assert!(model.current().pixels().all(|p| *p == Rgba([128, 64, 0, 128])));
        assert_eq!(model.background(), Color::new(255, 128, 0, 128));
    }

    #[test]
    fn searched_steps_lower_the_score() {
        let target = RgbaImage::from_fn(24, 24, |x, y| Rgba([(x * 10) as u8, 80, (y * 10) as u8, 255]));
        let mut model = Model::with_config(target, Color::BLACK, &config(12, 2)).unwrap();
        let mut previous = model.score();
        for _ in 0..5 {
            model.step(ShapeType::Triangle, 128, 0);
            assert!(model.score() <= previous + 1e-12);
            previous = model.score();
        }
        assert!(model.score() < model.initial_score);
    }
}
