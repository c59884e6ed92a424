//! Consensus scoring for merged search results.
//!
//! Formula: `score = engine_count * K - sum(ranks)`
//! where `K = max_rank * backends_queried + 1`.
//!
//! Every rank lies in `1..=max_rank` and a result collects at most one rank
//! per backend, so any two rank sums differ by less than `K`. One more
//! contributing engine therefore always outweighs the rank sums, and among
//! equal engine counts better (lower) ranks win.

use std::cmp::Ordering;

use crate::types::MergedSearchResult;

/// The per-engine weight `K` for a query.
///
/// # Arguments
///
/// * `max_rank` - The largest rank any backend may contribute (the
///   per-backend list length cap).
/// * `backends_queried` - How many backends took part in the fan-out.
pub fn consensus_weight(max_rank: usize, backends_queried: usize) -> i64 {
    let product = max_rank.max(1).saturating_mul(backends_queried.max(1));
    i64::try_from(product)
        .unwrap_or(i64::MAX / 2)
        .saturating_add(1)
}

/// Calculate the consensus score for one merged result.
pub fn consensus_score(ranks: &[usize], weight: i64) -> i64 {
    let engine_count = i64::try_from(ranks.len()).unwrap_or(i64::MAX);
    let rank_sum = ranks
        .iter()
        .map(|&r| i64::try_from(r).unwrap_or(i64::MAX))
        .fold(0_i64, i64::saturating_add);
    engine_count.saturating_mul(weight).saturating_sub(rank_sum)
}

/// Ordering for final results: score descending, then best single rank
/// ascending. Stable sorts keep first-seen order for remaining ties.
pub fn compare(a: &MergedSearchResult, b: &MergedSearchResult) -> Ordering {
    b.consensus_score
        .cmp(&a.consensus_score)
        .then_with(|| a.best_rank().cmp(&b.best_rank()))
}

/// Sort merged results into final consensus order, in place.
pub fn rank_results(results: &mut [MergedSearchResult]) {
    results.sort_by(compare);
}
