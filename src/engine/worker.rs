use std::sync::Arc;

use image::RgbaImage;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::fitness::{compute_color, copy_lines, difference_partial, draw_lines};
use crate::raster::{Bounds, Scanline};
use crate::shape::{Shape, ShapeType};

use super::optimizer::{hill_climb, State};

/// Independent search unit. Holds a private copy of the model's canvas taken
/// at `init`, a scratch buffer candidates are drawn into, and its own RNG
/// stream. Workers only share the read-only target.
pub struct Worker {
    index: usize,
    target: Arc<RgbaImage>,
    current: RgbaImage,
    buffer: RgbaImage,
    bounds: Bounds,
    lines: Vec<Scanline>,
    rng: Pcg32,
    score: f64,
    counter: u64,
}

impl Worker {
    pub fn new(index: usize, target: Arc<RgbaImage>, seed: u64) -> Self {
        let (w, h) = target.dimensions();
        Self {
            index,
            current: RgbaImage::new(w, h),
            buffer: RgbaImage::new(w, h),
            bounds: Bounds::new(w, h),
            lines: Vec::with_capacity(h as usize * 2),
            rng: Pcg32::seed_from_u64(seed),
            score: 0.0,
            counter: 0,
            target,
        }
    }

    /// rebind to the model's canvas and score; resets the evaluation counter
    pub fn init(&mut self, current: &RgbaImage, score: f64) {
        profiling::scope!("Worker::init");
        debug_assert_eq!(current.dimensions(), self.current.dimensions());
        let cur: &mut [u8] = &mut self.current;
        cur.copy_from_slice(current.as_raw());
        let buf: &mut [u8] = &mut self.buffer;
        buf.copy_from_slice(current.as_raw());
        self.score = score;
        self.counter = 0;
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// candidate evaluations since the last `init`
    #[inline]
    pub fn counter(&self) -> u64 {
        self.counter
    }

    #[inline]
    pub fn score(&self) -> f64 {
        self.score
    }

    pub(super) fn mutation_parts(&mut self) -> (Bounds, &mut Pcg32, &mut Vec<Scanline>) {
        (self.bounds, &mut self.rng, &mut self.lines)
    }

    /// score the canvas would have with `shape` drawn at `alpha` in its best colour
    pub fn energy(&mut self, shape: &Shape, alpha: u8) -> f64 {
        profiling::scope!("Worker::energy");
        self.counter += 1;
        shape.rasterize(self.bounds, &mut self.lines);
        let color = compute_color(&self.target, &self.current, &self.lines, alpha);
        copy_lines(&mut self.buffer, &self.current, &self.lines);
        draw_lines(&mut self.buffer, color, &self.lines);
        difference_partial(&self.target, &self.current, &self.buffer, self.score, &self.lines)
    }

    pub fn random_state(&mut self, kind: ShapeType, alpha: u8) -> State {
        let shape = Shape::random(kind, self.bounds, &mut self.rng, &mut self.lines);
        State::new(shape, alpha)
    }

    /// lowest-energy of `n` random candidates; ties keep the earliest
    pub fn best_random_state(&mut self, kind: ShapeType, alpha: u8, n: u32) -> State {
        profiling::scope!("Worker::best_random_state");
        let mut best = self.random_state(kind, alpha);
        let mut best_energy = best.energy(self);
        for _ in 1..n {
            let mut state = self.random_state(kind, alpha);
            let energy = state.energy(self);
            if energy < best_energy {
                best = state;
                best_energy = energy;
            }
        }
        best
    }

    /// `restarts` hill climbs of `age` iterations, each started from the best
    /// of `n` random candidates; returns the lowest-energy result
    pub fn best_hill_climb_state(&mut self, kind: ShapeType, alpha: u8, n: u32, age: u32, restarts: u32) -> State {
        profiling::scope!("Worker::best_hill_climb_state");
        let mut best: Option<(State, f64)> = None;
        for restart in 0..restarts.max(1) {
            let mut state = self.best_random_state(kind, alpha, n);
            let before = state.energy(self);
            let mut state = hill_climb(state, self, age);
            let after = state.energy(self);
            tracing::debug!(
                worker = self.index,
                restart,
                candidates = n,
                age,
                before,
                after,
                "hill climb"
            );
            if best.as_ref().map_or(true, |(_, e)| after < *e) {
                best = Some((state, after));
            }
        }
        match best {
            Some((state, _)) => state,
            None => self.random_state(kind, alpha),
        }
    }
}
