//! Approximate an image with layered translucent geometric primitives.
//!
//! A [`Model`] holds the target, the canvas built so far and the committed
//! shapes. Each [`Model::step`] runs a parallel random-restart hill-climbing
//! search over candidate shapes, commits the best one and reports how many
//! candidates were scored. Results export as a raster, an SVG document or a
//! sequence of animation frames.

pub mod color;
pub mod engine;
pub mod error;
pub mod fitness;
pub mod geom;
pub mod io;
pub mod raster;
pub mod render;
pub mod settings;
pub mod shape;

pub use color::Color;
pub use engine::{index_of_min, Model, ModelConfig};
pub use error::{Error, Result};
pub use fitness::MetricsSnapshot;
pub use settings::{OutputSettings, SearchSettings, Settings};
pub use shape::{Shape, ShapeType};
