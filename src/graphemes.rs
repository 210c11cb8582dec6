use unicode_segmentation::UnicodeSegmentation;

pub fn count(s: &str) -> usize {
    s.graphemes(true).count()
}

/// Byte offset of the grapheme at `idx`, or `s.len()` past the end.
pub fn byte_offset(s: &str, idx: usize) -> usize {
    s.grapheme_indices(true)
        .nth(idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// Hard-wrap `s` into rows of at most `width` graphemes.
///
/// Always returns at least one row. A width of zero disables wrapping.
pub fn wrap(s: &str, width: usize) -> Vec<String> {
    if s.is_empty() {
        return vec![String::new()];
    }
    if width == 0 {
        return vec![s.to_string()];
    }

    let mut rows = Vec::new();
    let mut current = String::new();
    let mut len = 0;
    for g in s.graphemes(true) {
        current.push_str(g);
        len += 1;
        if len == width {
            rows.push(std::mem::take(&mut current));
            len = 0;
        }
    }
    if len > 0 {
        rows.push(current);
    }
    rows
}
