//! Context windows around located values.

/// Window of at most `value.len() + 2 * context_length` bytes around the
/// first occurrence of `value`, clipped to `text` and to char boundaries.
/// `None` when `value` does not occur.
pub fn context_window(text: &str, value: &str, context_length: usize) -> Option<String> {
    if value.is_empty() {
        return None;
    }
    let location = text.find(value)?;

    let mut start = location.saturating_sub(context_length);
    while !text.is_char_boundary(start) {
        start += 1;
    }

    let mut end = (location + value.len() + context_length).min(text.len());
    while !text.is_char_boundary(end) {
        end -= 1;
    }

    Some(text[start..end].to_string())
}

/// Case-insensitive, non-overlapping occurrences of `value` in `text`.
pub fn count_occurrences(text: &str, value: &str) -> usize {
    if value.is_empty() {
        return 0;
    }
    text.to_lowercase().matches(&value.to_lowercase()).count()
}

/// Byte offsets of every occurrence of `value`, left to right.
pub fn occurrence_offsets(text: &str, value: &str) -> Vec<usize> {
    if value.is_empty() {
        return Vec::new();
    }
    text.match_indices(value).map(|(offset, _)| offset).collect()
}

/// Window around the occurrence of `value` starting at `offset`.
pub fn context_window_at(text: &str, value: &str, offset: usize, context_length: usize) -> Option<String> {
    let tail = text.get(offset..)?;
    if !tail.starts_with(value) {
        return None;
    }
    let mut start = offset.saturating_sub(context_length);
    while !text.is_char_boundary(start) {
        start += 1;
    }
    let mut end = (offset + value.len() + context_length).min(text.len());
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    Some(text[start..end].to_string())
}
