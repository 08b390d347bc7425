mod codec;

pub use codec::{
    parse, parse_query, serialize, to_query_string, RawParams, RawValue, INDEXABLE_KEY, SEARCH_KEY,
};

use serde::Serialize;
use std::fmt;

/// Filterable dimensions shared by every page
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Dimension {
    Fund,
    Entity,
    Country,
    City,
}

impl Dimension {
    pub const ALL: [Dimension; 4] = [
        Dimension::Fund,
        Dimension::Entity,
        Dimension::Country,
        Dimension::City,
    ];

    /// Query-string key
    pub fn key(self) -> &'static str {
        match self {
            Dimension::Fund => "fund",
            Dimension::Entity => "entity",
            Dimension::Country => "country",
            Dimension::City => "city",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Dimension::Fund => "Fund",
            Dimension::Entity => "Entity",
            Dimension::Country => "Country",
            Dimension::City => "City",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Active filter selection for one page render.
///
/// `None` on a dimension means unrestricted; a `Some` list is never empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub fund: Option<Vec<String>>,
    pub entity: Option<Vec<String>>,
    pub country: Option<Vec<String>>,
    pub city: Option<Vec<String>>,
    pub indexable_only: bool,
    pub search: Option<String>,
}

impl FilterState {
    pub fn selection(&self, dimension: Dimension) -> Option<&[String]> {
        match dimension {
            Dimension::Fund => self.fund.as_deref(),
            Dimension::Entity => self.entity.as_deref(),
            Dimension::Country => self.country.as_deref(),
            Dimension::City => self.city.as_deref(),
        }
    }

    /// Selected values plus one for a search term
    pub fn active_count(&self) -> usize {
        let selected: usize = Dimension::ALL
            .iter()
            .map(|d| self.selection(*d).map_or(0, <[String]>::len))
            .sum();
        selected + usize::from(self.search.is_some())
    }

    pub fn is_unfiltered(&self) -> bool {
        self.active_count() == 0 && !self.indexable_only
    }
}

/// Distinct values per dimension, used to populate filter choices
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub fund: Vec<String>,
    pub entity: Vec<String>,
    pub country: Vec<String>,
    pub city: Vec<String>,
}

/// Most choices a dropdown shows at once
pub const MAX_OPTION_MATCHES: usize = 50;

impl FilterOptions {
    pub fn values(&self, dimension: Dimension) -> &[String] {
        match dimension {
            Dimension::Fund => &self.fund,
            Dimension::Entity => &self.entity,
            Dimension::Country => &self.country,
            Dimension::City => &self.city,
        }
    }

    /// Case-insensitive substring search over one dimension, skipping blank entries
    pub fn search(&self, dimension: Dimension, needle: &str) -> Vec<&str> {
        let needle = needle.to_lowercase();
        self.values(dimension)
            .iter()
            .filter(|v| !v.is_empty() && v.to_lowercase().contains(&needle))
            .take(MAX_OPTION_MATCHES)
            .map(String::as_str)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn active_count_sums_selections_and_search() {
        let state = FilterState {
            fund: Some(strings(&["A", "B"])),
            city: Some(strings(&["Paris"])),
            search: Some("acme".to_string()),
            ..Default::default()
        };
        assert_eq!(state.active_count(), 4);
        assert!(!state.is_unfiltered());
        assert!(FilterState::default().is_unfiltered());
    }

    #[test]
    fn indexable_alone_is_not_unfiltered() {
        let state = FilterState {
            indexable_only: true,
            ..Default::default()
        };
        assert_eq!(state.active_count(), 0);
        assert!(!state.is_unfiltered());
    }

    #[test]
    fn option_search_is_case_insensitive_and_skips_blanks() {
        let options = FilterOptions {
            city: strings(&["Berlin", "", "Bern", "Paris"]),
            ..Default::default()
        };
        assert_eq!(options.search(Dimension::City, "BER"), vec!["Berlin", "Bern"]);
        assert_eq!(options.search(Dimension::City, "").len(), 3);
        assert!(options.search(Dimension::Fund, "x").is_empty());
    }

    #[test]
    fn option_search_caps_matches() {
        let options = FilterOptions {
            entity: (0..80).map(|i| format!("Entity {i}")).collect(),
            ..Default::default()
        };
        assert_eq!(options.search(Dimension::Entity, "entity").len(), MAX_OPTION_MATCHES);
    }
}
