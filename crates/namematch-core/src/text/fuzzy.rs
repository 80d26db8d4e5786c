//! Longest-matching-blocks similarity
//!
//! Ratcliff/Obershelp style: find the longest common block, recurse on the
//! pieces left and right of it, and sum the block lengths. The ratio is
//! `2 * matched / (len(a) + len(b))` over lower-cased characters.
//!
//! This is not an edit distance. "Jhon Smith" vs "John Smith" matches
//! "n smith" + "j" + "h" = 9 characters, ratio 0.9.

/// Fuzzy similarity in [0, 1] between two strings, case-insensitive
///
/// Returns 1.0 iff the lower-cased strings are identical (including two
/// empty strings) and 0.0 when no character lines up in any block. The
/// block decomposition is direction dependent in rare cases, so both
/// directions are evaluated and the larger match count is used, which keeps
/// the ratio symmetric.
pub fn fuzzy_ratio(a: &str, b: &str) -> f32 {
    let a: Vec<char> = a.to_lowercase().chars().collect();
    let b: Vec<char> = b.to_lowercase().chars().collect();

    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }

    let matched = matching_block_total(&a, &b).max(matching_block_total(&b, &a));
    (2 * matched) as f32 / total as f32
}

/// Number of characters covered by matching blocks (lower-cased, a -> b direction)
pub fn matching_characters(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.to_lowercase().chars().collect();
    let b: Vec<char> = b.to_lowercase().chars().collect();
    matching_block_total(&a, &b)
}

fn matching_block_total(a: &[char], b: &[char]) -> usize {
    let mut total = 0;
    let mut pending = vec![(0, a.len(), 0, b.len())];

    while let Some((alo, ahi, blo, bhi)) = pending.pop() {
        let (i, j, size) = longest_match(a, b, alo, ahi, blo, bhi);
        if size == 0 {
            continue;
        }
        total += size;

        if alo < i && blo < j {
            pending.push((alo, i, blo, j));
        }
        if i + size < ahi && j + size < bhi {
            pending.push((i + size, ahi, j + size, bhi));
        }
    }

    total
}

/// Longest common block of `a[alo..ahi]` and `b[blo..bhi]`
///
/// Ties resolve to the block starting earliest in `a`, then earliest in `b`.
fn longest_match(
    a: &[char],
    b: &[char],
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_size) = (alo, blo, 0);

    // run[j + 1] = length of the common run ending at (i, j)
    let mut prev = vec![0usize; b.len() + 1];
    let mut cur = vec![0usize; b.len() + 1];

    for i in alo..ahi {
        for j in blo..bhi {
            if a[i] == b[j] {
                let k = prev[j] + 1;
                cur[j + 1] = k;
                if k > best_size {
                    best_i = i + 1 - k;
                    best_j = j + 1 - k;
                    best_size = k;
                }
            } else {
                cur[j + 1] = 0;
            }
        }
        std::mem::swap(&mut prev, &mut cur);
        cur.iter_mut().for_each(|v| *v = 0);
    }

    (best_i, best_j, best_size)
}

// ============================================================================
// TESTS
// ============================================================================
