//! Vector similarity utilities.

/// Compute cosine similarity between two vectors.
///
/// Returns a value in [-1, 1] where 1 = identical, 0 = orthogonal, -1 = opposite.
/// Returns 0.0 if either vector is zero-length, empty, or the lengths differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;

    for (x, y) in a.iter().zip(b.iter()) {
        let x = *x as f64;
        let y = *y as f64;
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < 1e-10 {
        return 0.0;
    }

    (dot / denom) as f32
}

/// Indices of `candidates` ranked by descending similarity to `query`,
/// paired with their score and cut to `limit`.
///
/// Ties keep insertion order.
pub fn rank<'a, I>(query: &[f32], candidates: I, limit: usize) -> Vec<(usize, f32)>
where
    I: IntoIterator<Item = &'a [f32]>,
{
    let mut scored: Vec<(usize, f32)> = candidates
        .into_iter()
        .enumerate()
        .map(|(i, emb)| (i, cosine_similarity(emb, query)))
        .collect();

    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(limit);
    scored
}

/// Split `text` into windows of at most `size` characters, each starting
/// `overlap` characters before the previous one ended.
///
/// Window edges move to whitespace where there is some nearby so words stay
/// whole. Blank windows are dropped.
pub fn split_windows(text: &str, size: usize, overlap: usize) -> Vec<&str> {
    let size = size.max(1);
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let byte_at = |i: usize| chars.get(i).map_or(text.len(), |(b, _)| *b);

    let mut windows = Vec::new();
    let mut start = 0;
    while start < chars.len() {
        let mut end = (start + size).min(chars.len());
        if end < chars.len() {
            if let Some(ws) = (start + size / 2..end).rev().find(|&i| chars[i].1.is_whitespace()) {
                end = ws;
            }
        }

        let window = text[byte_at(start)..byte_at(end)].trim();
        if !window.is_empty() {
            windows.push(window);
        }
        if end == chars.len() {
            break;
        }
        let next = end.saturating_sub(overlap).max(start + 1);
        start = if chars[next - 1].1.is_whitespace() {
            next
        } else {
            (next..end).find(|&i| chars[i].1.is_whitespace()).unwrap_or(next)
        };
    }
    windows
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cosine_identical_vectors() {
        let v = vec![1.0, 2.0, 3.0];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_orthogonal_vectors() {
        assert!(cosine_similarity(&[1.0, 0.0, 0.0], &[0.0, 1.0, 0.0]).abs() < 1e-6);
    }

    #[test]
    fn cosine_degenerate_inputs() {
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 2.0], &[1.0, 2.0, 3.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
    }

    #[test]
    fn cosine_known_value() {
        // [1,1]·[1,0] / sqrt(2)
        let sim = cosine_similarity(&[1.0, 1.0], &[1.0, 0.0]);
        assert!((sim - 0.7071).abs() < 0.001);
    }

    #[test]
    fn rank_orders_best_first() {
        let docs: Vec<Vec<f32>> = vec![vec![0.0, 1.0], vec![1.0, 0.0], vec![0.5, 0.5]];
        let ranked = rank(&[1.0, 0.0], docs.iter().map(Vec::as_slice), 10);
        let order: Vec<usize> = ranked.iter().map(|(i, _)| *i).collect();
        assert_eq!(order, vec![1, 2, 0]);
    }

    #[test]
    fn rank_respects_limit() {
        let docs: Vec<Vec<f32>> = (0..10).map(|i| vec![1.0, i as f32 * 0.1]).collect();
        let ranked = rank(&[1.0, 0.0], docs.iter().map(Vec::as_slice), 3);
        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0].0, 0);
    }

    #[test]
    fn short_text_is_one_window() {
        assert_eq!(split_windows("  a short note ", 100, 10), vec!["a short note"]);
        assert!(split_windows("   ", 100, 10).is_empty());
    }

    #[test]
    fn windows_are_bounded_and_overlap() {
        let text = "alpha beta gamma delta epsilon zeta eta theta iota kappa";
        let windows = split_windows(text, 20, 6);

        assert!(windows.len() > 2);
        assert!(windows.iter().all(|w| w.chars().count() <= 20));
        assert_eq!(windows[0], "alpha beta gamma");
        // each window re-reads the tail of the previous one
        assert!(windows[1].starts_with("gamma"));
        assert!(windows.last().unwrap().ends_with("kappa"));
    }

    #[test]
    fn windows_split_on_char_boundaries() {
        let text = "Zürich ".repeat(50);
        let windows = split_windows(&text, 16, 4);
        assert!(windows.iter().all(|w| w.chars().count() <= 16));
        assert!(windows.iter().all(|w| w.contains("Zürich")));
    }

    #[test]
    fn text_without_whitespace_still_splits() {
        let text = "x".repeat(45);
        let windows = split_windows(&text, 20, 5);
        assert_eq!(windows.iter().map(|w| w.len()).collect::<Vec<_>>(), vec![20, 20, 15]);
    }
}
