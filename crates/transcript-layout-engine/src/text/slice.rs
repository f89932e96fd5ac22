use xi_rope::Rope;
use xi_rope::rope::{BaseMetric, Utf16CodeUnitsMetric};

use super::range::Range;

/// Length of the rope in UTF-16 code units.
pub fn utf16_len(rope: &Rope) -> usize {
    rope.measure::<Utf16CodeUnitsMetric>()
}

/// Byte offset for a UTF-16 offset. Offsets past the end clamp to the end.
pub fn byte_offset(rope: &Rope, utf16: usize) -> usize {
    if utf16 >= utf16_len(rope) {
        return rope.len();
    }
    rope.convert_metrics::<Utf16CodeUnitsMetric, BaseMetric>(utf16)
}

/// Extracts the text for a UTF-16 range from the rope as an owned String.
pub fn slice_to_string(rope: &Rope, range: Range) -> String {
    let start = byte_offset(rope, range.start);
    let end = byte_offset(rope, range.end).max(start);
    rope.slice_to_cow(start..end).into_owned()
}

/// Truncates to `max` characters with "..." suffix if needed.
///
/// Used for human-readable snapshot output.
pub fn preview(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &s[..cut]),
        None => s.to_string(),
    }
}
