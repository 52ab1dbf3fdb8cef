//! Ratcliff/Obershelp similarity.
//!
//! The ratio is `2 * M / T`, where `T` is the combined length of both sequences and `M` is the
//! number of characters in the matching blocks. Blocks are found by taking the longest common
//! run and recursing on the pieces to its left and right. This is the "gestalt" ratio of the
//! classic sequence matcher; it is not symmetric in its arguments.
//!
//! No junk heuristics are applied: every character is significant.

use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Block {
    a: usize,
    b: usize,
    size: usize,
}

/// Compares two strings character by character.
#[derive(Debug)]
pub struct SequenceMatcher {
    a: Vec<char>,
    b: Vec<char>,
    b2j: HashMap<char, Vec<usize>>,
}

impl SequenceMatcher {
    pub fn new(a: &str, b: &str) -> Self {
        let a: Vec<char> = a.chars().collect();
        let b: Vec<char> = b.chars().collect();
        let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
        for (j, ch) in b.iter().enumerate() {
            b2j.entry(*ch).or_default().push(j);
        }
        Self { a, b, b2j }
    }

    /// Longest matching block in `a[alo..ahi]` and `b[blo..bhi]`.
    ///
    /// Among blocks of maximal length, returns the one starting earliest in `a`, and of those
    /// the one starting earliest in `b`.
    fn longest_match(&self, alo: usize, ahi: usize, blo: usize, bhi: usize) -> Block {
        let mut best = Block {
            a: alo,
            b: blo,
            size: 0,
        };
        // j2len[j] = length of the match ending at a[i - 1] and b[j]
        let mut j2len: HashMap<usize, usize> = HashMap::new();
        for i in alo..ahi {
            let mut next: HashMap<usize, usize> = HashMap::new();
            if let Some(positions) = self.b2j.get(&self.a[i]) {
                for &j in positions {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let k = j
                        .checked_sub(1)
                        .and_then(|prev| j2len.get(&prev))
                        .copied()
                        .unwrap_or(0)
                        + 1;
                    next.insert(j, k);
                    if k > best.size {
                        best = Block {
                            a: i + 1 - k,
                            b: j + 1 - k,
                            size: k,
                        };
                    }
                }
            }
            j2len = next;
        }
        best
    }

    /// Total number of characters covered by the matching blocks.
    fn matched_chars(&self) -> usize {
        let mut total = 0;
        let mut pending = vec![(0, self.a.len(), 0, self.b.len())];
        while let Some((alo, ahi, blo, bhi)) = pending.pop() {
            let block = self.longest_match(alo, ahi, blo, bhi);
            if block.size == 0 {
                continue;
            }
            total += block.size;
            if alo < block.a && blo < block.b {
                pending.push((alo, block.a, blo, block.b));
            }
            if block.a + block.size < ahi && block.b + block.size < bhi {
                pending.push((block.a + block.size, ahi, block.b + block.size, bhi));
            }
        }
        total
    }

    fn total_len(&self) -> usize {
        self.a.len() + self.b.len()
    }

    fn scaled(&self, matches: usize) -> f64 {
        match self.total_len() {
            0 => 1.0,
            total => 2.0 * matches as f64 / total as f64,
        }
    }

    /// Similarity in `[0, 1]`.
    pub fn ratio(&self) -> f64 {
        self.scaled(self.matched_chars())
    }

    /// Upper bound on [`ratio`](Self::ratio) from shared character counts, ignoring order.
    pub fn quick_ratio(&self) -> f64 {
        let mut available: HashMap<char, usize> = HashMap::new();
        for ch in &self.b {
            *available.entry(*ch).or_default() += 1;
        }
        let mut matches = 0;
        for ch in &self.a {
            if let Some(count) = available.get_mut(ch) {
                if *count > 0 {
                    *count -= 1;
                    matches += 1;
                }
            }
        }
        self.scaled(matches)
    }

    /// Upper bound on [`quick_ratio`](Self::quick_ratio) from lengths alone.
    pub fn real_quick_ratio(&self) -> f64 {
        self.scaled(self.a.len().min(self.b.len()))
    }
}

/// Best candidate for `word` with a similarity of at least `cutoff`.
///
/// Each candidate is compared as the first sequence against `word` as the second. The
/// highest ratio wins; equal ratios go to the lexicographically greatest candidate.
pub fn best_match<'a, T: AsRef<str>>(word: &str, candidates: &'a [T], cutoff: f64) -> Option<&'a T> {
    let mut best: Option<(f64, &'a T)> = None;
    for candidate in candidates {
        let matcher = SequenceMatcher::new(candidate.as_ref(), word);
        if matcher.real_quick_ratio() < cutoff || matcher.quick_ratio() < cutoff {
            continue;
        }
        let score = matcher.ratio();
        if score < cutoff {
            continue;
        }
        let better = match best {
            None => true,
            Some((best_score, best_candidate)) => {
                score > best_score
                    || (score == best_score && candidate.as_ref() > best_candidate.as_ref())
            }
        };
        if better {
            best = Some((score, candidate));
        }
    }
    best.map(|(_, candidate)| candidate)
}
