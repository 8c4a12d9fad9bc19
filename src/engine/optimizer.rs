use rand::Rng;

use crate::shape::Shape;

use super::worker::Worker;

/// alpha a searched-alpha state starts from
const AUTO_ALPHA_START: u8 = 128;

/// one candidate: a shape, the alpha it is drawn with, and its cached energy.
/// the worker that owns the candidate is passed to each call that needs it.
#[derive(Clone, Debug)]
pub struct State {
    pub shape: Shape,
    pub alpha: u8,
    /// alpha is part of the search (requested alpha was 0)
    pub mutate_alpha: bool,
    energy: Option<f64>,
}

impl State {
    /// `alpha == 0` means the search picks alpha as well
    pub fn new(shape: Shape, alpha: u8) -> Self {
        let mutate_alpha = alpha == 0;
        let alpha = if mutate_alpha { AUTO_ALPHA_START } else { alpha };
        Self { shape, alpha, mutate_alpha, energy: None }
    }

    /// score of the canvas with this shape drawn, computed once per shape
    pub fn energy(&mut self, worker: &mut Worker) -> f64 {
        match self.energy {
            Some(e) => e,
            None => {
                let e = worker.energy(&self.shape, self.alpha);
                self.energy = Some(e);
                e
            }
        }
    }

    #[inline]
    pub fn cached_energy(&self) -> Option<f64> {
        self.energy
    }

    /// forget the cached energy, e.g. after the worker was re-initialised
    #[inline]
    pub fn invalidate(&mut self) {
        self.energy = None;
    }

    /// mutate the shape (and alpha when searched) in place
    pub fn do_move(&mut self, worker: &mut Worker) {
        let (bounds, rng, scratch) = worker.mutation_parts();
        self.shape.mutate(bounds, rng, scratch);
        if self.mutate_alpha {
            let a = self.alpha as i32 + rng.random_range(-10..=10);
            self.alpha = a.clamp(1, 255) as u8;
        }
        self.energy = None;
    }
}

/// strict greedy local search: `budget` mutations from the best state so far,
/// each kept only when it lowers the energy
pub fn hill_climb(state: State, worker: &mut Worker, budget: u32) -> State {
    profiling::scope!("hill_climb");
    let mut best = state;
    let mut best_energy = best.energy(worker);
    for _ in 0..budget {
        let mut candidate = best.clone();
        candidate.do_move(worker);
        let energy = candidate.energy(worker);
        if energy < best_energy {
            best = candidate;
            best_energy = energy;
        }
    }
    best
}
