// Fitness module organization
// Each submodule handles a specific aspect of scoring a canvas against the target

pub mod color;
pub mod difference;
pub mod metrics;

// Re-export commonly used types and functions
pub use color::{compute_color, copy_lines, draw_lines};
pub use difference::{difference_full, difference_partial};
pub use metrics::{improvement_percent, psnr_from_mse, MetricsSnapshot};
