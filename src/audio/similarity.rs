//! Ratcliff/Obershelp "gestalt" similarity.
//!
//! `ratio` is `2 * M / T`, where `T` is the combined length of both strings and
//! `M` the number of characters in matching blocks: the longest common
//! substring, then recursively the longest blocks to its left and right.
//! Among equally long blocks the one starting earliest in `a` wins, then the
//! earliest in `b`.

pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }

    2.0 * matching_characters(&a, &b) as f64 / total as f64
}

fn matching_characters(a: &[char], b: &[char]) -> usize {
    let mut matched = 0;
    let mut pending = vec![(0, a.len(), 0, b.len())];

    while let Some((a_lo, a_hi, b_lo, b_hi)) = pending.pop() {
        let (i, j, size) = longest_block(a, b, a_lo, a_hi, b_lo, b_hi);
        if size == 0 {
            continue;
        }

        matched += size;
        if a_lo < i && b_lo < j {
            pending.push((a_lo, i, b_lo, j));
        }
        if i + size < a_hi && j + size < b_hi {
            pending.push((i + size, a_hi, j + size, b_hi));
        }
    }

    matched
}

/// Longest common run of `a[a_lo..a_hi]` and `b[b_lo..b_hi]` as (start_a, start_b, len)
fn longest_block(
    a: &[char],
    b: &[char],
    a_lo: usize,
    a_hi: usize,
    b_lo: usize,
    b_hi: usize,
) -> (usize, usize, usize) {
    let mut best = (a_lo, b_lo, 0);
    let width = b_hi - b_lo + 1;
    // run[k + 1] = length of the run ending at the current a index and b[b_lo + k]
    let mut previous = vec![0usize; width];
    let mut current = vec![0usize; width];

    for i in a_lo..a_hi {
        for j in b_lo..b_hi {
            let k = j - b_lo;
            if a[i] == b[j] {
                let run = previous[k] + 1;
                current[k + 1] = run;
                if run > best.2 {
                    best = (i + 1 - run, j + 1 - run, run);
                }
            } else {
                current[k + 1] = 0;
            }
        }
        std::mem::swap(&mut previous, &mut current);
    }

    best
}
