//! Name similarity scoring.

/// Score returned for `name` / `name<digits>` pairs.
pub const PREFIX_DIGITS_SCORE: f64 = 0.9;

/// Ratios above this are accepted without running the finer heuristics.
pub const CHEAP_ACCEPT: f64 = 0.8;

/// Multiplier applied to the ratio when the length gap is large.
pub const GAP_PENALTY: f64 = 0.7;

/// Floor applied by the near-equal and suffix-extension boosts.
pub const BOOST_FLOOR: f64 = 0.7;

/// Names shorter than this use the positional shortcut instead of full
/// Levenshtein.
const SHORT_NAME_LEN: usize = 10;

/// Longest suffix that still counts as a "small extension" of a name.
const MAX_EXTENSION_SUFFIX: usize = 5;

const NEAR_EQUAL_MIN_LEN: usize = 4;
const NEAR_EQUAL_MAX_DIFF: usize = 2;

const WEIGHT_RATIO: f64 = 0.3;
const WEIGHT_POSITIONAL: f64 = 0.3;
const WEIGHT_EDIT: f64 = 0.4;

/// Score the similarity of two entry names in `[0, 1]`.
///
/// `score(a, a)` is `1.0` for every `a`, including the empty string.
///
/// Names are rated with an ordered ladder of rules. Pure edit distance
/// conflates superficially different words ("Cursor" vs "Curolos"), so the
/// ladder first catches incremental-suffix variants ("file", "file1",
/// "file_v2") and only then falls back to a weighted blend of distance
/// measures.
///
/// # Rules (first match wins)
///
/// 1. Both names are lowercased and compared per `char`.
/// 2. The shorter name is a prefix of the longer and the remainder is all
///    decimal digits: [`PREFIX_DIGITS_SCORE`].
/// 3. The length gap exceeds half the shorter length: `0.0`.
/// 4. Ratcliff/Obershelp ratio above [`CHEAP_ACCEPT`]: that ratio.
/// 5. Length gap above half the shorter length: ratio × [`GAP_PENALTY`].
/// 6. Equal lengths (≥ 4) with at most two differing positions:
///    `max(ratio, BOOST_FLOOR)`.
/// 7. One name extends the other by at most five characters:
///    `max(ratio, BOOST_FLOOR)`.
/// 8. Otherwise `0.3 × ratio + 0.3 × positional + 0.4 × edit`.
///
/// # Symmetry
///
/// The ladder picks "shorter" as `a` when the lengths are equal, so the
/// function is not guaranteed to be bit-identical under argument swap. Callers
/// always score `seed` against `candidate` in that order.
pub fn score(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.to_lowercase().chars().collect();
    let b: Vec<char> = b.to_lowercase().chars().collect();

    let (shorter, longer) = if a.len() <= b.len() { (&a, &b) } else { (&b, &a) };
    let gap = longer.len() - shorter.len();
    let is_prefix = longer.starts_with(shorter);

    if gap > 0 && is_prefix && longer[shorter.len()..].iter().all(char::is_ascii_digit) {
        return PREFIX_DIGITS_SCORE;
    }

    let gap_too_large = gap as f64 > shorter.len() as f64 / 2.0;
    if gap_too_large {
        return 0.0;
    }

    let baseline = ratio(&a, &b);
    if baseline > CHEAP_ACCEPT {
        return baseline;
    }
    if gap_too_large {
        return baseline * GAP_PENALTY;
    }

    let differing = differing_positions(&a, &b);
    let positional = (shorter.len() - differing) as f64 / longer.len() as f64;
    let edit = edit_ratio(&a, &b, differing).unwrap_or(baseline);

    if gap == 0 && a.len() >= NEAR_EQUAL_MIN_LEN && differing <= NEAR_EQUAL_MAX_DIFF {
        return baseline.max(BOOST_FLOOR);
    }
    if is_prefix && gap <= MAX_EXTENSION_SUFFIX {
        return baseline.max(BOOST_FLOOR);
    }

    WEIGHT_RATIO * baseline + WEIGHT_POSITIONAL * positional + WEIGHT_EDIT * edit
}

/// Ratcliff/Obershelp similarity: `2 * M / (|a| + |b|)` where `M` is the
/// total size of the matching blocks.
///
/// Two empty inputs are identical and score `1.0`.
pub fn ratio(a: &[char], b: &[char]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_characters(a, b) as f64 / total as f64
}

/// Classic Levenshtein distance (insert, delete, substitute all cost 1).
pub fn levenshtein(a: &[char], b: &[char]) -> usize {
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitute = prev[j] + usize::from(ca != cb);
            curr[j + 1] = substitute.min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// `1 - distance / max_len`, or `None` when both names are empty.
///
/// Short names use `differing positions + length gap` as the distance.
fn edit_ratio(a: &[char], b: &[char], differing: usize) -> Option<f64> {
    let max_len = a.len().max(b.len());
    if max_len == 0 {
        return None;
    }
    let distance = if max_len < SHORT_NAME_LEN {
        differing + a.len().abs_diff(b.len())
    } else {
        levenshtein(a, b)
    };
    Some(1.0 - distance as f64 / max_len as f64)
}

/// Number of aligned positions (over the shorter length) whose characters differ.
fn differing_positions(a: &[char], b: &[char]) -> usize {
    a.iter().zip(b).filter(|(x, y)| x != y).count()
}

/// Total size of the matching blocks found by recursively taking the longest
/// common run and repeating on the pieces to its left and right.
fn matching_characters(a: &[char], b: &[char]) -> usize {
    let mut total = 0;
    let mut pending = vec![(0, a.len(), 0, b.len())];

    while let Some((alo, ahi, blo, bhi)) = pending.pop() {
        let (i, j, k) = longest_match(a, b, alo, ahi, blo, bhi);
        if k == 0 {
            continue;
        }
        total += k;
        if alo < i && blo < j {
            pending.push((alo, i, blo, j));
        }
        if i + k < ahi && j + k < bhi {
            pending.push((i + k, ahi, j + k, bhi));
        }
    }
    total
}

/// Longest common run of `a[alo..ahi]` and `b[blo..bhi]`.
///
/// Ties resolve to the earliest start in `a`, then the earliest start in `b`.
fn longest_match(
    a: &[char],
    b: &[char],
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_k) = (alo, blo, 0);
    let width = bhi - blo;
    let mut prev = vec![0usize; width + 1];
    let mut curr = vec![0usize; width + 1];

    for i in alo..ahi {
        for j in blo..bhi {
            let col = j - blo + 1;
            curr[col] = if a[i] == b[j] { prev[col - 1] + 1 } else { 0 };
            if curr[col] > best_k {
                best_k = curr[col];
                best_i = i + 1 - best_k;
                best_j = j + 1 - best_k;
            }
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    (best_i, best_j, best_k)
}
