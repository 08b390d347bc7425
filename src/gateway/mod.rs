//! Typed boundary to the remote aggregation procedures.
//!
//! Every page issues one batch of calls sharing the same filter parameters.
//! The batch either succeeds as a whole or fails as a whole.

mod batch;
mod client;
mod decode;
mod options;
mod overview;
mod receivables;

pub use batch::{gather, RpcCall};
pub use client::{PostgrestClient, RpcTransport};
pub use decode::{decode_first, decode_rows, lenient_number, lenient_text, to_number};
pub use options::{decode_options, load_options};
pub use overview::{
    load_overview, ExpiryYear, MarketingKpis, OverviewData, PortfolioMetrics, TenantRent,
    UpcomingExpiry,
};
pub use receivables::{
    load_receivables, AgingBucket, DebtMetrics, Debtor, ReceivableRow, ReceivablesData,
};

use serde::Serialize;
use serde_json::{Map, Value};

use crate::filter::FilterState;

/// Dashboard pages, each with its own batch of procedures
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Page {
    Overview,
    Receivables,
}

impl Page {
    /// Path of the page in the web dashboard
    pub fn path(self) -> &'static str {
        match self {
            Page::Overview => "/",
            Page::Receivables => "/receivables",
        }
    }

    /// Only the overview procedures accept `p_indexable_only`
    fn takes_indexable_flag(self) -> bool {
        matches!(self, Page::Overview)
    }

    pub fn options_endpoint(self) -> &'static str {
        match self {
            Page::Overview => overview::FILTER_OPTIONS,
            Page::Receivables => receivables::FILTER_OPTIONS,
        }
    }
}

/// Shared filter parameters as the procedures expect them.
///
/// Unrestricted dimensions are sent as `null`, never as an empty array.
#[derive(Debug, Serialize)]
struct FilterParams<'a> {
    p_fund: Option<&'a [String]>,
    p_entity: Option<&'a [String]>,
    p_country: Option<&'a [String]>,
    p_city: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    p_indexable_only: Option<bool>,
    p_search: Option<&'a str>,
}

/// Parameter record shared by every call of a page batch
pub fn filter_params(filters: &FilterState, page: Page) -> Map<String, Value> {
    let params = FilterParams {
        p_fund: non_empty(&filters.fund),
        p_entity: non_empty(&filters.entity),
        p_country: non_empty(&filters.country),
        p_city: non_empty(&filters.city),
        p_indexable_only: page.takes_indexable_flag().then_some(filters.indexable_only),
        p_search: filters.search.as_deref(),
    };
    match serde_json::to_value(params) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

fn non_empty(values: &Option<Vec<String>>) -> Option<&[String]> {
    values.as_deref().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unrestricted_dimensions_are_null() {
        let params = filter_params(&FilterState::default(), Page::Overview);
        assert_eq!(
            Value::Object(params),
            json!({
                "p_fund": null,
                "p_entity": null,
                "p_country": null,
                "p_city": null,
                "p_indexable_only": false,
                "p_search": null,
            })
        );
    }

    #[test]
    fn empty_selection_is_sent_as_null() {
        let filters = FilterState {
            fund: Some(Vec::new()),
            ..Default::default()
        };
        let params = filter_params(&filters, Page::Receivables);
        assert_eq!(params["p_fund"], Value::Null);
    }

    #[test]
    fn receivables_params_omit_indexable_flag() {
        let filters = FilterState {
            city: Some(vec!["Lyon".to_string()]),
            indexable_only: true,
            search: Some("bakery".to_string()),
            ..Default::default()
        };
        let params = filter_params(&filters, Page::Receivables);
        assert!(!params.contains_key("p_indexable_only"));
        assert_eq!(params["p_city"], json!(["Lyon"]));
        assert_eq!(params["p_search"], json!("bakery"));
    }
}
