//! Prompt rendering and strict parsing of the model's answer.

use std::collections::HashSet;

use crate::types::MergedSearchResult;

/// The model's answer after parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// The model answered `none`: nothing is relevant.
    Nothing,
    /// Zero-based indices of relevant results, deduplicated, in answer order.
    Indices(Vec<usize>),
    /// No usable index could be extracted.
    Unusable,
}

/// Render the relevance prompt for `query` over `results`.
///
/// Results are enumerated from 1 with title, URL and description.
pub fn build_prompt(query: &str, results: &[MergedSearchResult]) -> String {
    let mut prompt =
        format!("You are judging web search results for relevance to the query \"{query}\".\n");
    prompt.push_str("\nResults:\n");
    for (i, result) in results.iter().enumerate() {
        prompt.push_str(&format!("{}. {}\n   URL: {}\n", i + 1, result.title, result.url));
        if !result.description.is_empty() {
            prompt.push_str(&format!("   {}\n", result.description));
        }
    }
    prompt.push_str(
        "\nReply with ONLY the numbers of the relevant results as a comma-separated list \
         (for example: 1,3,4).\n\
         If none of the results are relevant, reply with exactly: none\n",
    );
    prompt
}

/// Parse the model's answer against a candidate list of length `count`.
///
/// `none` (any case, optional trailing period) means nothing is relevant.
/// Otherwise tokens are split on commas and whitespace; anything that is not
/// a number in `1..=count` is ignored and repeats are dropped.
pub fn parse_selection(raw: &str, count: usize) -> Selection {
    let trimmed = raw.trim();
    let bare = trimmed.strip_suffix('.').unwrap_or(trimmed).trim();
    if bare.eq_ignore_ascii_case("none") {
        return Selection::Nothing;
    }

    let mut seen = HashSet::new();
    let indices: Vec<usize> = bare
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter_map(|token| token.trim().trim_end_matches('.').parse::<usize>().ok())
        .filter(|&n| (1..=count).contains(&n))
        .map(|n| n - 1)
        .filter(|i| seen.insert(*i))
        .collect();

    if indices.is_empty() {
        Selection::Unusable
    } else {
        Selection::Indices(indices)
    }
}
