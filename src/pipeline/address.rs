use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Built-in abbreviation table: every entry maps a source spelling onto the
/// canonical token used for comparison. Config can merge extra entries over
/// these via `[dedup.extra_abbreviations]`.
static DEFAULT_ABBREVIATIONS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("st", "street"),
        ("ave", "avenue"),
        ("av", "avenue"),
        ("blvd", "boulevard"),
        ("dr", "drive"),
        ("rd", "road"),
        ("ln", "lane"),
        ("ct", "court"),
        ("pl", "place"),
        ("sq", "square"),
        ("ter", "terrace"),
        ("pkwy", "parkway"),
        ("hwy", "highway"),
        ("apt", "unit"),
        ("apartment", "unit"),
        ("ste", "suite"),
        ("n", "north"),
        ("s", "south"),
        ("e", "east"),
        ("w", "west"),
    ])
});

/// Canonicalizes street addresses so that "123 Main St Apt 4" and
/// "123 main street #4" compare equal.
pub struct AddressNormalizer {
    table: HashMap<String, String>,
}

impl AddressNormalizer {
    pub fn new(extra: &HashMap<String, String>) -> Self {
        let mut table: HashMap<String, String> = DEFAULT_ABBREVIATIONS
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        for (k, v) in extra {
            table.insert(k.trim().to_lowercase(), v.trim().to_lowercase());
        }
        Self { table }
    }

    /// Lowercase, expand `#` into a unit marker, strip punctuation, collapse
    /// whitespace, and expand abbreviated tokens.
    pub fn normalize(&self, address: &str) -> String {
        let lowered = address.to_lowercase().replace('#', " unit ");
        let stripped: String = lowered
            .chars()
            .map(|c| {
                if c.is_alphanumeric() || c.is_whitespace() {
                    c
                } else {
                    ' '
                }
            })
            .collect();

        stripped
            .split_whitespace()
            .map(|token| {
                self.table
                    .get(token)
                    .map(String::as_str)
                    .unwrap_or(token)
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Default for AddressNormalizer {
    fn default() -> Self {
        Self::new(&HashMap::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equivalent_spellings_normalize_identically() {
        let normalizer = AddressNormalizer::default();
        assert_eq!(
            normalizer.normalize("123 Main St Apt 4"),
            normalizer.normalize("123 main street #4"),
        );
        assert_eq!(
            normalizer.normalize("500 Valencia Ave."),
            normalizer.normalize("500 VALENCIA AVENUE"),
        );
    }

    #[test]
    fn punctuation_and_whitespace_are_collapsed() {
        let normalizer = AddressNormalizer::default();
        assert_eq!(
            normalizer.normalize("  742   Evergreen  Ter., "),
            "742 evergreen terrace"
        );
    }

    #[test]
    fn extra_abbreviations_merge_over_defaults() {
        let extra = HashMap::from([("cyn".to_string(), "canyon".to_string())]);
        let normalizer = AddressNormalizer::new(&extra);
        assert_eq!(normalizer.normalize("9 Bear Cyn Rd"), "9 bear canyon road");
    }

    #[test]
    fn distinct_addresses_stay_distinct() {
        let normalizer = AddressNormalizer::default();
        assert_ne!(
            normalizer.normalize("123 Main St"),
            normalizer.normalize("125 Main St"),
        );
    }
}
