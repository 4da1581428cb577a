use super::{Bucket, ThresholdPalette};
use crate::colors::Color;

pub const RED: Color = Color::new(0xF4, 0x56, 0x56);
pub const AMBER: Color = Color::new(0xF4, 0xB5, 0x56);
pub const NEUTRAL: Color = Color::new(0xC4, 0xC4, 0xC4);
pub const LIGHT_GREEN: Color = Color::new(0xB3, 0xD2, 0xA0);
pub const GREEN: Color = Color::new(0x8B, 0xD4, 0x5F);

const BUCKETS: [Bucket; 4] = [
    Bucket::new(1.25, RED),
    Bucket::new(1.15, AMBER),
    Bucket::new(0.85, NEUTRAL),
    Bucket::new(0.75, LIGHT_GREEN),
];

/// Load ratio table: around 1.0 is neutral, above is warmer, below is greener.
pub struct LoadPalette {}
impl ThresholdPalette for LoadPalette {
    fn buckets(&self) -> &[Bucket] {
        &BUCKETS
    }
    fn fallback(&self) -> Color {
        GREEN
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn hex_round_trips() {
        for color in (LoadPalette {}).colors() {
            assert_eq!(color.to_string().parse::<Color>().unwrap(), color);
        }
    }

    #[test]
    fn bounds_descend() {
        let bounds: Vec<f64> = LoadPalette {}.buckets().iter().map(|b| b.lower).collect();
        let mut sorted = bounds.clone();
        sorted.sort_by(|a, b| b.partial_cmp(a).unwrap());
        assert_eq!(bounds, sorted);
    }

    #[test]
    fn hex_matches_table() {
        assert_eq!(
            LoadPalette {}
                .colors()
                .into_iter()
                .map(|c| c.to_string())
                .collect::<Vec<_>>(),
            vec!["#F45656", "#F4B556", "#C4C4C4", "#B3D2A0", "#8BD45F"]
        );
    }
}
