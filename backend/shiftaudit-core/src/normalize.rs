// src/normalize.rs
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

// --- Patterns ---

// "1234 - Jane Doe", "#1234 Jane Doe", "00123: Jane Doe"
static LEADING_EMPLOYEE_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#?\d+\s*[-:|]?\s+|^#?\d+\s*[-:|]\s*").unwrap());
// "Jane Doe (Contractor)"
static TRAILING_PARENTHETICAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*\([^)]*\)\s*$").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

// Placeholders telematics exports write when no driver is assigned.
const UNASSIGNED_NAMES: [&str; 7] = [
    "UNKNOWN",
    "UNKNOWN DRIVER",
    "NO DRIVER",
    "UNASSIGNED",
    "N/A",
    "NONE",
    "-",
];

/// A driver identity. Equality, hashing and ordering use only the grouping
/// key, so different raw spellings of one driver collapse together.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverKey {
    pub key: String,
    pub display: String,
}

impl PartialEq for DriverKey {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for DriverKey {}

impl Hash for DriverKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl PartialOrd for DriverKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DriverKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}

/// Cleans a raw driver cell into a grouping key plus a display name.
///
/// Returns `None` for empty cells and unassigned-driver placeholders.
pub fn normalize_driver_name(raw: &str) -> Option<DriverKey> {
    let trimmed = raw.trim().trim_matches(|c| c == '"' || c == '\'').trim();
    if trimmed.is_empty() {
        return None;
    }

    let mut cleaned = WHITESPACE.replace_all(trimmed, " ").into_owned();

    let without_id = LEADING_EMPLOYEE_ID.replace(&cleaned, "").into_owned();
    if !without_id.trim().is_empty() {
        cleaned = without_id;
    }
    cleaned = TRAILING_PARENTHETICAL.replace(&cleaned, "").into_owned();

    // "Doe, Jane" -> "Jane Doe"
    if let Some((last, first)) = cleaned.split_once(',') {
        let (last, first) = (last.trim(), first.trim());
        if !last.is_empty() && !first.is_empty() && !first.contains(',') {
            cleaned = format!("{} {}", first, last);
        }
    }

    let cleaned = cleaned.trim().trim_end_matches('.').trim().to_string();
    if cleaned.is_empty() {
        return None;
    }

    let key = cleaned.to_uppercase();
    if UNASSIGNED_NAMES.contains(&key.as_str()) {
        return None;
    }

    Some(DriverKey {
        display: display_name(&cleaned),
        key,
    })
}

// Mixed-case input is kept as typed ("McAllister"); single-case input is title-cased.
fn display_name(cleaned: &str) -> String {
    let has_upper = cleaned.chars().any(|c| c.is_uppercase());
    let has_lower = cleaned.chars().any(|c| c.is_lowercase());
    if has_upper && has_lower {
        return cleaned.to_string();
    }

    cleaned
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(|c| c.to_lowercase()))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
