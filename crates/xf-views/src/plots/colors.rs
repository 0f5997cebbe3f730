//! Color ramps and palettes for the charts

use egui::Color32;

/// Fill for regions with no matching rows
pub const NO_DATA: Color32 = Color32::from_rgb(0x44, 0x44, 0x44);

/// Default bar fill
pub const BAR_FILL: Color32 = Color32::from_rgb(70, 130, 180);

/// Selection outline
pub const SELECTION: Color32 = Color32::from_rgb(255, 140, 0);

fn to_color32(color: colorous::Color) -> Color32 {
    Color32::from_rgb(color.r, color.g, color.b)
}

fn ratio(value: usize, max: usize) -> f64 {
    if max == 0 {
        0.0
    } else {
        (value as f64 / max as f64).clamp(0.0, 1.0)
    }
}

/// Sequential viridis color for `value` in `0..=max`
pub fn viridis(value: usize, max: usize) -> Color32 {
    to_color32(colorous::VIRIDIS.eval_continuous(ratio(value, max)))
}

/// Sequential inferno color for `value` in `0..=max`
pub fn inferno(value: usize, max: usize) -> Color32 {
    to_color32(colorous::INFERNO.eval_continuous(ratio(value, max)))
}

/// Categorical color, cycling through ten hues
pub fn category10(index: usize) -> Color32 {
    let palette = &colorous::CATEGORY10;
    to_color32(palette[index % palette.len()])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ramps_handle_empty_max() {
        assert_eq!(viridis(0, 0), viridis(0, 10));
        assert_ne!(inferno(0, 10), inferno(10, 10));
    }

    #[test]
    fn test_category_cycles() {
        assert_eq!(category10(0), category10(10));
        assert_ne!(category10(0), category10(1));
    }
}
