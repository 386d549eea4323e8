// src/normalize.rs
// URL and title canonicalization used by the matchers. These functions are
// lenient by contract: bad input degrades to a comparable string, never an
// error.

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

// Boilerplate stripped before cross-source title comparison. Applied
// repeatedly until the title stops changing, so stacked suffixes like
// "Amendment Bill" come off too.
static TITLE_BOILERPLATE: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"\s+bill$",
        r"\s+act(\s+\d{4})?$",
        r"\s+amendment$",
        r"^government\s+",
        r"^new\s+",
    ]
    .iter()
    .filter_map(|pattern| Regex::new(pattern).ok())
    .collect()
});

/// Canonicalize a URL to lowercase `host+path` for exact-duplicate keying.
/// Query and fragment are discarded, `www.` and any trailing slash dropped.
/// Empty input yields an empty string; input the URL parser rejects falls
/// back to the lowercased raw string so callers always get a comparable key.
pub fn normalize_url(url: &str) -> String {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    if trimmed.starts_with("mailto:") || trimmed.starts_with("tel:") {
        return trimmed.to_lowercase();
    }

    // Scraped hrefs frequently arrive without a scheme
    let with_scheme = if !trimmed.contains("://") {
        format!("https://{}", trimmed)
    } else {
        trimmed.to_string()
    };

    match Url::parse(&with_scheme) {
        Ok(parsed) => {
            let host = parsed.host_str().unwrap_or("").to_lowercase();
            let host = host.strip_prefix("www.").unwrap_or(&host);
            let path = parsed.path().to_lowercase();
            let mut normalized = format!("{}{}", host, path);
            while normalized.ends_with('/') {
                normalized.pop();
            }
            normalized
        }
        Err(_) => trimmed.trim_end_matches('/').to_lowercase(),
    }
}

/// Lowercase, trim, and collapse whitespace runs for title comparison.
pub fn normalize_title(title: &str) -> String {
    title
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Strip legislative boilerplate so the same underlying subject compares
/// equal across document kinds: "Housing Supply Bill" and "Housing Supply
/// Act 2024" both reduce to "housing supply".
pub fn clean_title(title: &str) -> String {
    let mut cleaned = normalize_title(title);
    let mut changed = true;
    while changed {
        changed = false;
        for pattern in TITLE_BOILERPLATE.iter() {
            let stripped = pattern.replace(&cleaned, "").trim().to_string();
            if stripped != cleaned {
                cleaned = stripped;
                changed = true;
            }
        }
    }
    cleaned
}
