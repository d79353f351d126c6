//! Fixed-window chunking
//!
//! Walks the text in `target_size` slices, snapping each cut to the
//! nearest natural break within a local window. A paragraph break is
//! preferred over a sentence break when both are found and the paragraph
//! break is at least as close to the target boundary.

/// Search window around the target boundary for a natural break
const BREAK_SEARCH_WINDOW: usize = 100;

/// Split text into windows of roughly `target_size` characters.
///
/// `overlap` is realized by stepping the next window start back to
/// `end - overlap`; non-positive advancement falls back to `end` to
/// prevent infinite loops. All cuts land on UTF-8 char boundaries.
pub fn chunk_windows(text: &str, target_size: usize, overlap: usize) -> Vec<String> {
    if text.is_empty() || target_size == 0 {
        return Vec::new();
    }

    let mut out = Vec::new();
    let mut start = 0usize;

    while start < text.len() {
        let mut hard_end = (start + target_size).min(text.len());
        while !text.is_char_boundary(hard_end) {
            hard_end -= 1;
        }

        let end = if hard_end < text.len() {
            match find_natural_break(text, hard_end) {
                Some(brk) if brk > start && brk <= text.len() => brk,
                _ => hard_end,
            }
        } else {
            hard_end
        };

        if end > start {
            out.push(text[start..end].to_string());
        }

        if end >= text.len() {
            break;
        }

        // Step back for overlap; guard against non-advancement
        let mut next = end.saturating_sub(overlap);
        if next <= start {
            next = end;
        }
        while next < text.len() && !text.is_char_boundary(next) {
            next += 1;
        }
        start = next;
    }

    out
}

/// Find the natural break nearest `target` within the search window on
/// either side of it, so a snapped cut may overshoot the target by at
/// most the window size.
///
/// Returns the cut position (the index after the break), or `None` when
/// the window holds no break.
fn find_natural_break(text: &str, target: usize) -> Option<usize> {
    let window_start = target.saturating_sub(BREAK_SEARCH_WINDOW);
    let window_end = (target + BREAK_SEARCH_WINDOW).min(text.len());
    let mut window_start = window_start;
    while !text.is_char_boundary(window_start) {
        window_start += 1;
    }
    let mut window_end = window_end;
    while !text.is_char_boundary(window_end) {
        window_end -= 1;
    }
    if window_start >= window_end {
        return None;
    }
    let window = &text[window_start..window_end];

    let paragraph = nearest_match(window, target - window_start, &["\n\n"]);
    let sentence = nearest_match(window, target - window_start, &[". ", ".\n", "! ", "!\n", "? ", "?\n"]);

    let best = match (paragraph, sentence) {
        (Some((p_pos, p_dist)), Some((_, s_dist))) if p_dist <= s_dist => Some(p_pos),
        (Some((p_pos, _)), None) => Some(p_pos),
        (_, Some((s_pos, _))) => Some(s_pos),
        (None, None) => None,
    }?;

    Some(window_start + best)
}

/// Nearest cut position (index after a matched break) to `target` among
/// the given break patterns, with its distance
fn nearest_match(window: &str, target: usize, patterns: &[&str]) -> Option<(usize, usize)> {
    let mut best: Option<(usize, usize)> = None;
    for pattern in patterns {
        let mut from = 0;
        while let Some(found) = window[from..].find(pattern) {
            let cut = from + found + pattern.len();
            let dist = cut.abs_diff(target);
            match best {
                Some((_, best_dist)) if dist >= best_dist => {}
                _ => best = Some((cut, dist)),
            }
            from += found + 1;
        }
    }
    best
}
