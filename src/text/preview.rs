//! Evidence preview snippets (spec.md §4.1).

/// Default radius (in characters) around the match used when a caller
/// does not specify one.
pub const DEFAULT_PREVIEW_RADIUS: usize = 40;

/// Returns a whitespace-collapsed window of up to `radius` characters
/// before and after `[start, end)`, with an ellipsis glyph prefixed or
/// suffixed whenever the window was clipped (spec.md §4.1).
///
/// `start`/`end` are byte offsets into `text`; they are clamped to valid
/// char boundaries.
#[must_use]
pub fn create_preview(text: &str, start: usize, end: usize, radius: usize) -> String {
    let len = text.len();
    let start = start.min(len);
    let end = end.clamp(start, len);

    let window_start = find_char_boundary(text, start.saturating_sub(radius));
    let window_end = find_char_boundary_forward(text, (end + radius).min(len));

    let before_clipped = window_start > 0;
    let after_clipped = window_end < len;

    let raw = &text[window_start..window_end];
    let collapsed: String = raw.split_whitespace().collect::<Vec<_>>().join(" ");

    let mut preview = String::new();
    if before_clipped {
        preview.push('…');
    }
    preview.push_str(&collapsed);
    if after_clipped {
        preview.push('…');
    }
    preview
}

/// Convenience wrapper using [`DEFAULT_PREVIEW_RADIUS`].
#[must_use]
pub fn create_preview_default(text: &str, start: usize, end: usize) -> String {
    create_preview(text, start, end, DEFAULT_PREVIEW_RADIUS)
}

fn find_char_boundary(s: &str, pos: usize) -> usize {
    if pos >= s.len() {
        return s.len();
    }
    let bytes = s.as_bytes();
    let mut boundary = pos;
    while boundary > 0 && (bytes[boundary] & 0xC0) == 0x80 {
        boundary -= 1;
    }
    boundary
}

fn find_char_boundary_forward(s: &str, pos: usize) -> usize {
    if pos >= s.len() {
        return s.len();
    }
    let bytes = s.as_bytes();
    let mut boundary = pos;
    while boundary < bytes.len() && (bytes[boundary] & 0xC0) == 0x80 {
        boundary += 1;
    }
    boundary
}
