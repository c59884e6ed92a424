//! URL normalisation and hashing for cross-backend deduplication.
//!
//! Two results are the same result when their URLs normalise to the same
//! string. Normalisation is deliberately coarse: scheme, a `www.` prefix and
//! a trailing slash are not part of a page's identity here.

const SCHEMES: &[&str] = &["https://", "http://"];

/// Normalise a URL for deduplication comparison.
///
/// Lowercases, trims, strips a leading `http://` or `https://`, strips a
/// leading `www.` and strips a trailing `/`. The steps are repeated until
/// nothing changes, so the function is idempotent for every input. It never
/// fails: anything that is not a URL is simply lowercased and trimmed.
///
/// # Examples
///
/// ```
/// use metasearch::orchestrator::url_normalize::normalize_url_for_dedup;
///
/// assert_eq!(normalize_url_for_dedup("https://www.Example.com/"), "example.com");
/// assert_eq!(normalize_url_for_dedup("http://example.com"), "example.com");
/// ```
pub fn normalize_url_for_dedup(url: &str) -> String {
    let mut current = url.to_lowercase();
    loop {
        let next = normalize_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn normalize_once(s: &str) -> String {
    let mut s = s.trim();
    if let Some(rest) = SCHEMES.iter().find_map(|scheme| s.strip_prefix(scheme)) {
        s = rest;
    }
    if let Some(rest) = s.strip_prefix("www.") {
        s = rest;
    }
    if let Some(rest) = s.strip_suffix('/') {
        s = rest;
    }
    s.to_owned()
}

/// Stable digest of a normalised URL, rendered as lowercase hex.
///
/// Equal inputs always produce equal hashes; this is the merge key.
pub fn url_hash(normalized_url: &str) -> String {
    blake3::hash(normalized_url.as_bytes()).to_hex().to_string()
}
