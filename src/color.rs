use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

/// Colour of a single trace (time plot with one file, spectrum plot).
pub const TRACE_COLOR: Color32 = Color32::LIGHT_BLUE;

/// One colour per assembled file; a single file keeps [`TRACE_COLOR`].
pub fn segment_colors(n: usize) -> Vec<Color32> {
    match n {
        0 => Vec::new(),
        1 => vec![TRACE_COLOR],
        _ => generate_palette(n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_colours_are_distinct() {
        let colors = generate_palette(5);
        assert_eq!(colors.len(), 5);
        for (i, a) in colors.iter().enumerate() {
            for b in &colors[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn single_segment_uses_trace_colour() {
        assert_eq!(segment_colors(1), vec![TRACE_COLOR]);
        assert!(segment_colors(0).is_empty());
        assert_eq!(segment_colors(3).len(), 3);
    }
}
