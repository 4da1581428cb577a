use crate::colors::Color;
use log::*;
pub mod load;

use load::LoadPalette;

/// One step of a threshold table: values strictly above `lower` take `color`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bucket {
    pub lower: f64,
    pub color: Color,
}

impl Bucket {
    pub const fn new(lower: f64, color: Color) -> Self {
        Self { lower, color }
    }
}

/// Threshold table scanned from the first bucket to the last. Buckets must be
/// ordered by descending `lower`; values matching none take the fallback.
pub trait ThresholdPalette {
    fn buckets(&self) -> &[Bucket];
    fn fallback(&self) -> Color;

    /// Every color the palette can produce, hottest first.
    fn colors(&self) -> Vec<Color> {
        self.buckets()
            .iter()
            .map(|b| b.color)
            .chain(std::iter::once(self.fallback()))
            .collect()
    }
}

/// Index of the first bucket `value` is strictly above. The fallback bucket
/// is `buckets().len()`, so a lower index is always a warmer color.
pub fn bucket_index(palette: &dyn ThresholdPalette, value: f64) -> usize {
    let buckets = palette.buckets();
    buckets
        .iter()
        .position(|b| value > b.lower)
        .unwrap_or(buckets.len())
}

pub fn classify_with(palette: &dyn ThresholdPalette, value: f64) -> Color {
    let buckets = palette.buckets();
    match bucket_index(palette, value) {
        i if i < buckets.len() => buckets[i].color,
        _ => {
            if value.is_nan() {
                debug!("NaN ratio, using fallback color");
            }
            palette.fallback()
        }
    }
}

/// Color for a load ratio. Total over `f64`: NaN fails every comparison and
/// lands in the lowest bucket.
pub fn classify(value: f64) -> Color {
    classify_with(&LoadPalette {}, value)
}
