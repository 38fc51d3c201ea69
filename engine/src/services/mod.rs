// In-process services called by the rendering layer
pub mod chart_overlay;

pub use chart_overlay::{build_overlay, calculate_indicator, ChartOverlay};
