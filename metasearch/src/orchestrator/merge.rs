//! Cross-backend merging by normalised URL.
//!
//! Groups results that refer to the same page (after URL normalisation),
//! records every contributing backend with the rank it gave, keeps the
//! most informative title and description, and scores each group.

use std::collections::HashMap;

use crate::types::{MergedSearchResult, SearchResult};

use super::scoring::{consensus_score, consensus_weight, rank_results};
use super::url_normalize::{normalize_url_for_dedup, url_hash};

/// One backend's ordered results.
#[derive(Debug, Clone)]
pub struct RankedList {
    /// Backend identifier.
    pub backend: String,
    /// Results in the backend's own order; position `i` is rank `i + 1`.
    pub results: Vec<SearchResult>,
}

impl RankedList {
    /// Pair a backend identifier with its results.
    pub fn new(backend: impl Into<String>, results: Vec<SearchResult>) -> Self {
        Self {
            backend: backend.into(),
            results,
        }
    }
}

/// Merge ranked lists into consensus order.
///
/// Each list is capped at `max_rank` entries before ranks are assigned.
/// `lists` must already be in a deterministic order (the aggregator uses
/// identifier order); first-seen tie breaking follows it. A backend that
/// lists the same page twice contributes only its better rank.
///
/// The output is sorted but not truncated.
pub fn merge_ranked_lists(lists: &[RankedList], max_rank: usize) -> Vec<MergedSearchResult> {
    let weight = consensus_weight(max_rank, lists.len());

    let mut order: Vec<MergedSearchResult> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for list in lists {
        for (position, result) in list.results.iter().take(max_rank).enumerate() {
            let rank = position + 1;
            let hash = url_hash(&normalize_url_for_dedup(&result.url));

            match index.get(&hash) {
                Some(&slot) => absorb(&mut order[slot], &list.backend, rank, result),
                None => {
                    index.insert(hash.clone(), order.len());
                    order.push(MergedSearchResult {
                        url_hash: hash,
                        url: result.url.clone(),
                        title: result.title.trim().to_owned(),
                        description: result.description.trim().to_owned(),
                        engines: vec![list.backend.clone()],
                        ranks: vec![rank],
                        consensus_score: 0,
                    });
                }
            }
        }
    }

    for merged in &mut order {
        merged.consensus_score = consensus_score(&merged.ranks, weight);
    }
    rank_results(&mut order);
    order
}

fn absorb(merged: &mut MergedSearchResult, backend: &str, rank: usize, result: &SearchResult) {
    // Lists are walked in order, so a repeat from the same backend is never
    // a better rank than the one already recorded.
    if !merged.engines.iter().any(|e| e == backend) {
        merged.engines.push(backend.to_owned());
        merged.ranks.push(rank);
    }
    keep_longest(&mut merged.title, &result.title);
    keep_longest(&mut merged.description, &result.description);
}

fn keep_longest(current: &mut String, candidate: &str) {
    let candidate = candidate.trim();
    if candidate.chars().count() > current.chars().count() {
        *current = candidate.to_owned();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_result(url: &str, engine: &str, title: &str, description: &str) -> SearchResult {
        SearchResult {
            title: title.to_string(),
            url: url.to_string(),
            description: description.to_string(),
            source: String::new(),
            engine: engine.to_string(),
        }
    }

    fn list(backend: &str, urls: &[&str]) -> RankedList {
        RankedList::new(
            backend,
            urls.iter()
                .map(|u| make_result(u, backend, &format!("Title from {backend}"), ""))
                .collect(),
        )
    }

    #[test]
    fn equivalent_urls_collapse_across_backends() {
        let merged = merge_ranked_lists(
            &[list("a", &["https://x.com/"]), list("b", &["http://www.x.com"])],
            10,
        );
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].engines, vec!["a", "b"]);
        assert_eq!(merged[0].ranks, vec![1, 1]);
        assert_eq!(merged[0].url, "https://x.com/");
    }

    #[test]
    fn unique_urls_pass_through() {
        let merged = merge_ranked_lists(
            &[list("a", &["https://a.com"]), list("b", &["https://b.com"])],
            10,
        );
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn ranks_are_one_based_positions() {
        let merged = merge_ranked_lists(
            &[list("a", &["https://1.com", "https://2.com", "https://3.com"])],
            10,
        );
        let third = merged
            .iter()
            .find(|m| m.url == "https://3.com")
            .expect("present");
        assert_eq!(third.ranks, vec![3]);
    }

    #[test]
    fn same_backend_duplicate_keeps_first_rank_only() {
        let merged = merge_ranked_lists(
            &[list("a", &["https://x.com", "https://www.x.com/"])],
            10,
        );
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].engines, vec!["a"]);
        assert_eq!(merged[0].ranks, vec![1]);
    }

    #[test]
    fn engines_and_ranks_stay_parallel() {
        let merged = merge_ranked_lists(
            &[
                list("a", &["https://x.com", "https://y.com"]),
                list("b", &["https://y.com", "https://x.com"]),
                list("c", &["https://x.com"]),
            ],
            10,
        );
        for m in &merged {
            assert_eq!(m.engines.len(), m.ranks.len());
        }
        let x = merged.iter().find(|m| m.url == "https://x.com").expect("x");
        assert_eq!(x.engines, vec!["a", "b", "c"]);
        assert_eq!(x.ranks, vec![1, 2, 1]);
    }

    #[test]
    fn longest_title_and_description_selected() {
        let merged = merge_ranked_lists(
            &[
                RankedList::new(
                    "a",
                    vec![make_result("https://x.com", "a", "Short", "")],
                ),
                RankedList::new(
                    "b",
                    vec![make_result(
                        "https://x.com",
                        "b",
                        "A much longer title",
                        "Some description",
                    )],
                ),
                RankedList::new(
                    "c",
                    vec![make_result("https://x.com", "c", "Tiny", "Desc")],
                ),
            ],
            10,
        );
        assert_eq!(merged[0].title, "A much longer title");
        assert_eq!(merged[0].description, "Some description");
    }

    #[test]
    fn title_tie_keeps_first_seen() {
        let merged = merge_ranked_lists(
            &[
                RankedList::new("a", vec![make_result("https://x.com", "a", "AAAA", "")]),
                RankedList::new("b", vec![make_result("https://x.com", "b", "BBBB", "")]),
            ],
            10,
        );
        assert_eq!(merged[0].title, "AAAA");
    }

    #[test]
    fn empty_first_title_replaced() {
        let merged = merge_ranked_lists(
            &[
                RankedList::new("a", vec![make_result("https://x.com", "a", "", "")]),
                RankedList::new("b", vec![make_result("https://x.com", "b", "Real", "")]),
            ],
            10,
        );
        assert_eq!(merged[0].title, "Real");
    }

    #[test]
    fn consensus_beats_single_top_rank() {
        // R1 found by 2 engines at ranks [1, 2]; R2 by 1 engine at rank 1.
        let merged = merge_ranked_lists(
            &[
                list("a", &["https://r2.com", "https://r1.com"]),
                list("b", &["https://r1.com"]),
            ],
            10,
        );
        assert_eq!(merged[0].url, "https://r1.com");
        assert_eq!(merged[1].url, "https://r2.com");
    }

    #[test]
    fn order_independent_of_list_arrival_for_scored_results() {
        let forward = merge_ranked_lists(
            &[
                list("a", &["https://shared.com", "https://a-only.com"]),
                list("b", &["https://b-only.com", "https://shared.com"]),
            ],
            10,
        );
        let reverse = merge_ranked_lists(
            &[
                list("b", &["https://b-only.com", "https://shared.com"]),
                list("a", &["https://shared.com", "https://a-only.com"]),
            ],
            10,
        );
        assert_eq!(forward[0].url, "https://shared.com");
        assert_eq!(reverse[0].url, "https://shared.com");
        assert_eq!(forward[0].consensus_score, reverse[0].consensus_score);
    }

    #[test]
    fn lists_capped_at_max_rank() {
        let merged = merge_ranked_lists(
            &[list(
                "a",
                &["https://1.com", "https://2.com", "https://3.com", "https://4.com"],
            )],
            2,
        );
        assert_eq!(merged.len(), 2);
        assert!(merged.iter().all(|m| m.ranks[0] <= 2));
    }

    #[test]
    fn empty_input_returns_empty() {
        assert!(merge_ranked_lists(&[], 10).is_empty());
        assert!(merge_ranked_lists(&[list("a", &[])], 10).is_empty());
    }
}
