//! Edit distance and similarity scoring for fuzzy matching.

/// Classic Levenshtein distance over Unicode chars.
///
/// Single-character insertions, deletions, and substitutions all cost 1.
/// Two-row DP, O(|a| * |b|) time, O(min-row) space.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];

    for (i, &ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Similarity score in `[0, 1]`: `1 - distance / max(len)`.
///
/// Two empty strings are defined as identical (similarity 1).
pub fn similarity(a: &str, b: &str) -> f32 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    1.0 - levenshtein(a, b) as f32 / max_len as f32
}

/// Cheap pre-filter for the similarity gate.
///
/// The distance is at least the char-length difference, so when that alone
/// pushes similarity to `min_sim` or below the DP can be skipped. Returns
/// true when `similarity(a, b) > min_sim` is still possible.
pub fn within_length_window(a: &str, b: &str, min_sim: f32) -> bool {
    let la = a.chars().count();
    let lb = b.chars().count();
    let max_len = la.max(lb);
    if max_len == 0 {
        return true;
    }
    let diff = la.abs_diff(lb);
    1.0 - diff as f32 / max_len as f32 > min_sim
}
