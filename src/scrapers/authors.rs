//! Byline normalization.
//!
//! Bylines on CNN Lite look like `By Jane Doe and John Smith, Jr., CNN`.
//! [`split_authors`] turns that into `["Jane Doe", "John Smith, Jr."]`.

use once_cell::sync::Lazy;
use regex::Regex;

static LEADING_BY: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^\s*by\s+").unwrap());
static CONJUNCTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+(?:and|&)\s+").unwrap());
static OUTLET_SUFFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i),\s*CNN\s*$").unwrap());

const NAME_SUFFIXES: [&str; 5] = ["jr", "sr", "ii", "iii", "iv"];
const OUTLET: &str = "CNN";

/// Split raw byline text into individual author names.
pub fn split_authors(byline: &str) -> Vec<String> {
    let cleaned = LEADING_BY.replace(byline, "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return Vec::new();
    }

    let has_conjunction = CONJUNCTION.is_match(cleaned);
    let parts: Vec<&str> = CONJUNCTION.split(cleaned).collect();
    let mut authors = Vec::new();

    for part in &parts {
        let entries: Vec<&str> = part
            .split(',')
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .collect();
        let Some((first, rest)) = entries.split_first() else {
            continue;
        };

        // "Smith, John"
        if !has_conjunction && parts.len() == 1 && entries.len() == 2 {
            authors.push(format!("{}, {}", entries[0], entries[1]));
            continue;
        }

        let mut current = first.to_string();
        for entry in rest {
            let normalized = entry.to_lowercase();
            if NAME_SUFFIXES.contains(&normalized.trim_end_matches('.')) && !current.is_empty() {
                current = format!("{current}, {entry}");
            } else {
                if !current.is_empty() {
                    authors.push(current);
                }
                current = entry.to_string();
            }
        }
        if !current.is_empty() {
            authors.push(current);
        }
    }

    authors
        .into_iter()
        .map(|a| OUTLET_SUFFIX.replace(&a, "").trim().to_string())
        .filter(|a| !a.is_empty() && !a.eq_ignore_ascii_case(OUTLET))
        .collect()
}
