use crate::color::{ColorScale, EduStats, Rgb};

/// Ordered legend thresholds: the minimum, `steps - 1` evenly spaced interior
/// values rounded to one decimal place, then the maximum.
pub fn thresholds(stats: EduStats, steps: usize) -> Vec<f64> {
    let steps = steps.max(1);
    let step_size = (stats.max - stats.min) / steps as f64;
    let mut values = Vec::with_capacity(steps + 1);
    values.push(stats.min);
    for i in 1..steps {
        values.push(round_one_decimal(stats.min + i as f64 * step_size));
    }
    values.push(stats.max);
    values
}

/// Swatches to draw: one per step, filled through the color scale. The final
/// threshold only labels the top edge, so it gets no swatch of its own.
pub fn swatches(values: &[f64], scale: &ColorScale) -> Vec<(f64, Rgb)> {
    values
        .iter()
        .take(values.len().saturating_sub(1))
        .map(|&v| (v, scale.color_of(v)))
        .collect()
}

fn round_one_decimal(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}
