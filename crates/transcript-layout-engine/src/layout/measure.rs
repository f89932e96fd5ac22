/// Sizes text runs. Stands in for whatever actually renders the glyphs.
pub trait TextMeasure {
    /// Width and height of `text` rendered with `classes`.
    fn measure(&self, text: &str, classes: &[String]) -> (f64, f64);

    /// Height of one regular line, used for vertical spaces.
    fn line_height(&self) -> f64;
}

/// Classes rendered at the reduced size.
const SMALL_CLASSES: [&str; 3] = ["interline", "sup", "sub"];

/// Monospace metrics: every character has the same advance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedMetrics {
    pub char_width: f64,
    pub line_height: f64,
    /// Scale applied to interline, superscript and subscript text.
    pub small_scale: f64,
}

impl Default for FixedMetrics {
    fn default() -> Self {
        Self {
            char_width: 10.0,
            line_height: 20.0,
            small_scale: 0.6,
        }
    }
}

impl TextMeasure for FixedMetrics {
    fn measure(&self, text: &str, classes: &[String]) -> (f64, f64) {
        let scale = if classes.iter().any(|c| SMALL_CLASSES.contains(&c.as_str())) {
            self.small_scale
        } else {
            1.0
        };
        let chars = text.chars().count() as f64;
        (chars * self.char_width * scale, self.line_height * scale)
    }

    fn line_height(&self) -> f64 {
        self.line_height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_counts_chars_not_bytes() {
        let m = FixedMetrics::default();
        assert_eq!(m.measure("Größe", &[]), (50.0, 20.0));
    }

    #[test]
    fn small_classes_scale_down() {
        let m = FixedMetrics {
            char_width: 10.0,
            line_height: 20.0,
            small_scale: 0.5,
        };
        assert_eq!(m.measure("ab", &["normal".into()]), (20.0, 20.0));
        assert_eq!(m.measure("ab", &["interline".into()]), (10.0, 10.0));
        assert_eq!(m.measure("", &["sup".into()]), (0.0, 10.0));
    }
}
