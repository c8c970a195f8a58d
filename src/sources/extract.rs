// src/sources/extract.rs

//! Row-level extraction helpers shared by the source adapters.

use std::sync::OnceLock;

use regex::Regex;
use scraper::Selector;

use crate::error::{AppError, Result};

fn year_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(?:19|20)\d{2}\b").expect("year pattern"))
}

fn vin_regex() -> &'static Regex {
    // 17 characters, letters I, O and Q excluded
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b[A-HJ-NPR-Z0-9]{17}\b").expect("vin pattern"))
}

/// Collapse runs of whitespace into single spaces and trim.
pub fn squash_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Find the first 4-digit year token within the configured range.
///
/// Tokens outside the range are skipped, so a row whose text carries both
/// a stray number and a real model year still resolves.
pub fn find_year(text: &str, year_min: i32, year_max: i32) -> Option<i32> {
    for token in year_regex().find_iter(text) {
        if let Ok(year) = token.as_str().parse::<i32>() {
            if year_min <= year && year <= year_max {
                return Some(year);
            }
        }
    }
    None
}

/// Check whether model text names the target family.
///
/// The text must contain at least one family token and none of the
/// excluded sibling model names, case-insensitively.
pub fn matches_model(text: &str, tokens: &[String], exclusions: &[String]) -> bool {
    let text = text.to_lowercase();
    let has_token = tokens.iter().any(|t| text.contains(&t.to_lowercase()));
    let has_exclusion = exclusions.iter().any(|e| text.contains(&e.to_lowercase()));
    has_token && !has_exclusion
}

/// Find a VIN-shaped token in free text, if any.
pub fn find_vin(text: &str) -> Option<String> {
    vin_regex().find(text).map(|m| m.as_str().to_string())
}

/// Parse a CSS selector, mapping failures into the app error type.
pub fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| AppError::selector(selector, format!("{e:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_squash_whitespace() {
        assert_eq!(squash_whitespace("  2015\n Dodge\t Ram  "), "2015 Dodge Ram");
    }

    #[test]
    fn test_find_year_in_range() {
        assert_eq!(find_year("2015 Dodge Ram 1500", 1994, 2026), Some(2015));
        assert_eq!(find_year("Dodge Ram", 1994, 2026), None);
    }

    #[test]
    fn test_find_year_skips_out_of_range_tokens() {
        // "3500" is not a year token; "1985" is one but outside the range.
        assert_eq!(find_year("1985 Dodge Ram 3500", 1994, 2026), None);
        assert_eq!(find_year("Row 2088, 2003 Dodge Ram", 1994, 2026), Some(2003));
    }

    #[test]
    fn test_matches_model() {
        let tokens = vec!["ram".to_string()];
        let exclusions = vec!["dakota".to_string(), "durango".to_string()];

        assert!(matches_model("RAM 1500", &tokens, &exclusions));
        assert!(matches_model("Ram 2500 Laramie", &tokens, &exclusions));
        assert!(!matches_model("Dakota", &tokens, &exclusions));
        // Family token present but a sibling name disqualifies the row
        assert!(!matches_model("Durango (Ram platform)", &tokens, &exclusions));
        assert!(!matches_model("Charger", &tokens, &exclusions));
    }

    #[test]
    fn test_find_vin() {
        assert_eq!(
            find_vin("VIN 1D7HA18N83S123456 stock 42"),
            Some("1D7HA18N83S123456".to_string())
        );
        // I, O and Q never appear in a VIN
        assert_eq!(find_vin("1D7HA18N83SIOQ456"), None);
        assert_eq!(find_vin("too short 1D7HA18N"), None);
    }

    #[test]
    fn test_parse_selector() {
        assert!(parse_selector("table tbody tr").is_ok());
        assert!(parse_selector("[[invalid").is_err());
    }
}
