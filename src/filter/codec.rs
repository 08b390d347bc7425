//! Conversion between `FilterState` and its flat query-string form.

use std::collections::BTreeMap;

use url::form_urlencoded;

use super::{Dimension, FilterState};

pub const INDEXABLE_KEY: &str = "indexable";
pub const SEARCH_KEY: &str = "q";

/// A query parameter as received: one value, or several when the key repeats
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawValue {
    One(String),
    Many(Vec<String>),
}

impl RawValue {
    fn as_single(&self) -> Option<&str> {
        match self {
            RawValue::One(value) => Some(value),
            RawValue::Many(_) => None,
        }
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::One(value.to_string())
    }
}

pub type RawParams = BTreeMap<String, RawValue>;

/// Split comma-joined tokens, trim them and drop empties; nothing left means unrestricted
fn to_list(raw: Option<&RawValue>) -> Option<Vec<String>> {
    let joined = match raw? {
        RawValue::One(value) => value.clone(),
        RawValue::Many(values) => values.join(","),
    };
    let list: Vec<String> = joined
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect();
    (!list.is_empty()).then_some(list)
}

/// Build the filter state for a page render from raw query parameters
pub fn parse(raw: &RawParams) -> FilterState {
    FilterState {
        fund: to_list(raw.get(Dimension::Fund.key())),
        entity: to_list(raw.get(Dimension::Entity.key())),
        country: to_list(raw.get(Dimension::Country.key())),
        city: to_list(raw.get(Dimension::City.key())),
        indexable_only: raw
            .get(INDEXABLE_KEY)
            .and_then(RawValue::as_single)
            .is_some_and(|v| v == "1"),
        search: raw
            .get(SEARCH_KEY)
            .and_then(RawValue::as_single)
            .filter(|q| !q.is_empty())
            .map(str::to_string),
    }
}

/// Flat key/value pairs for a navigable URL; inactive filters are omitted
pub fn serialize(state: &FilterState) -> Vec<(&'static str, String)> {
    let mut pairs = Vec::new();
    for dimension in Dimension::ALL {
        if let Some(values) = state.selection(dimension) {
            if !values.is_empty() {
                pairs.push((dimension.key(), values.join(",")));
            }
        }
    }
    if state.indexable_only {
        pairs.push((INDEXABLE_KEY, "1".to_string()));
    }
    if let Some(search) = state.search.as_deref().filter(|q| !q.is_empty()) {
        pairs.push((SEARCH_KEY, search.to_string()));
    }
    pairs
}

pub fn to_query_string(state: &FilterState) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(serialize(state))
        .finish()
}

/// Decode a query string (leading `?` optional); repeated keys collect into `Many`
pub fn parse_query(query: &str) -> RawParams {
    let query = query.strip_prefix('?').unwrap_or(query);
    let mut params = RawParams::new();
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        let value = value.into_owned();
        match params.remove(key.as_ref()) {
            None => {
                params.insert(key.into_owned(), RawValue::One(value));
            }
            Some(RawValue::One(first)) => {
                params.insert(key.into_owned(), RawValue::Many(vec![first, value]));
            }
            Some(RawValue::Many(mut values)) => {
                values.push(value);
                params.insert(key.into_owned(), RawValue::Many(values));
            }
        }
    }
    params
}
