use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::batch::{gather, RpcCall};
use super::client::RpcTransport;
use super::decode::{decode_first, decode_rows, lenient_number, lenient_text};
use super::options::decode_options;
use super::{filter_params, Page};
use crate::config::ReceivablesSettings;
use crate::error::Result;
use crate::filter::{FilterOptions, FilterState};

pub const DEBT_METRICS: &str = "receivables_metrics";
pub const AGING_BREAKDOWN: &str = "receivables_aging_breakdown";
pub const TOP_DEBTORS: &str = "receivables_top_debtors";
pub const OPEN_ITEMS: &str = "receivables_list";
pub const FILTER_OPTIONS: &str = "receivables_filter_options";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DebtMetrics {
    #[serde(default, deserialize_with = "lenient_number")]
    pub total_debt: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub risk_debt_90_plus: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub fresh_debt_30: f64,
    /// Number of open invoices
    #[serde(default, deserialize_with = "lenient_number")]
    pub row_count: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub max_single_tenant_debt: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AgingBucket {
    #[serde(default, deserialize_with = "lenient_text")]
    pub bucket: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub amount: f64,
}

/// A debtor group ranked by outstanding debt; `tenant` holds the group name
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Debtor {
    #[serde(default, deserialize_with = "lenient_text")]
    pub tenant: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub total_debt: f64,
}

/// One open receivable line with its aging buckets
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ReceivableRow {
    #[serde(default, deserialize_with = "lenient_text")]
    pub tenant: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub contact_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub unit_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub invoice_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub bucket_1_30: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub bucket_31_60: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub bucket_61_90: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub bucket_90_120: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub bucket_120_plus: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub total: f64,
}

impl ReceivableRow {
    /// Consolidation key: the contact group when set, else the tenant
    pub fn group_key(&self) -> &str {
        match self.contact_name.as_deref() {
            Some(contact) if !contact.is_empty() => contact,
            _ => self.tenant.as_deref().unwrap_or(""),
        }
    }

    /// Debt older than 90 days
    pub fn risk_amount(&self) -> f64 {
        self.bucket_90_120 + self.bucket_120_plus
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReceivablesData {
    pub metrics: DebtMetrics,
    pub aging: Vec<AgingBucket>,
    pub top_debtors: Vec<Debtor>,
    pub rows: Vec<ReceivableRow>,
    pub options: FilterOptions,
}

fn receivables_calls(filters: &FilterState, limits: &ReceivablesSettings) -> Vec<RpcCall> {
    let shared = filter_params(filters, Page::Receivables);
    vec![
        RpcCall::new(DEBT_METRICS, &shared),
        RpcCall::new(AGING_BREAKDOWN, &shared),
        RpcCall::new(TOP_DEBTORS, &shared).with("p_limit", limits.top_debtors),
        RpcCall::new(OPEN_ITEMS, &shared).with("p_limit", limits.open_items),
        RpcCall::new(FILTER_OPTIONS, &shared),
    ]
}

/// Run the receivables batch and shape its five responses
pub fn load_receivables<T>(
    transport: &T,
    filters: &FilterState,
    limits: &ReceivablesSettings,
) -> Result<ReceivablesData>
where
    T: RpcTransport + ?Sized,
{
    let mut values = gather(transport, &receivables_calls(filters, limits))?.into_iter();
    let mut next = || values.next().unwrap_or(Value::Null);

    Ok(ReceivablesData {
        metrics: decode_first(DEBT_METRICS, next()),
        aging: decode_rows(AGING_BREAKDOWN, next()),
        top_debtors: decode_rows(TOP_DEBTORS, next()),
        rows: decode_rows(OPEN_ITEMS, next()),
        options: decode_options(FILTER_OPTIONS, next()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DashboardError;
    use crate::gateway::batch::tests::FakeTransport;
    use serde_json::json;

    #[test]
    fn group_key_prefers_non_empty_contact() {
        let mut row = ReceivableRow {
            tenant: Some("Shop 12".to_string()),
            contact_name: Some("Retail Group".to_string()),
            ..Default::default()
        };
        assert_eq!(row.group_key(), "Retail Group");
        row.contact_name = Some(String::new());
        assert_eq!(row.group_key(), "Shop 12");
        row.contact_name = None;
        row.tenant = None;
        assert_eq!(row.group_key(), "");
    }

    #[test]
    fn shapes_open_items_with_string_amounts() {
        let transport = FakeTransport::new()
            .respond(DEBT_METRICS, json!([{"total_debt": "1500.5", "row_count": 2}]))
            .respond(OPEN_ITEMS, json!([
                {"tenant": "A", "contact_name": null, "unit_id": 101, "city": "Lyon",
                 "invoice_date": "2026-01-01", "bucket_1_30": "100", "bucket_120_plus": 50, "total": "150"}
            ]));
        let data = load_receivables(&transport, &FilterState::default(), &ReceivablesSettings::default())
            .unwrap();

        assert_eq!(data.metrics.total_debt, 1500.5);
        assert_eq!(data.rows.len(), 1);
        let row = &data.rows[0];
        assert_eq!(row.unit_id.as_deref(), Some("101"));
        assert_eq!(row.bucket_1_30, 100.0);
        assert_eq!(row.risk_amount(), 50.0);
        assert_eq!(row.total, 150.0);
        assert!(data.aging.is_empty());
        assert!(data.top_debtors.is_empty());
    }

    #[test]
    fn limits_and_shared_params_reach_the_backend() {
        let transport = FakeTransport::new();
        let filters = FilterState {
            search: Some("bistro".to_string()),
            indexable_only: true,
            ..Default::default()
        };
        let limits = ReceivablesSettings {
            top_debtors: 3,
            open_items: 25,
        };
        load_receivables(&transport, &filters, &limits).unwrap();

        let seen = transport.seen.lock().unwrap();
        assert_eq!(seen.len(), 5);
        assert!(seen.iter().all(|(_, p)| p["p_search"] == json!("bistro")));
        assert!(seen.iter().all(|(_, p)| p.get("p_indexable_only").is_none()));
        drop(seen);
        assert_eq!(transport.params_for(TOP_DEBTORS).unwrap()["p_limit"], json!(3));
        assert_eq!(transport.params_for(OPEN_ITEMS).unwrap()["p_limit"], json!(25));
    }

    #[test]
    fn failure_reports_a_single_error() {
        let transport = FakeTransport::new().fail(DEBT_METRICS).fail(OPEN_ITEMS);
        let err = load_receivables(&transport, &FilterState::default(), &ReceivablesSettings::default())
            .unwrap_err();
        assert!(matches!(err, DashboardError::BatchFailed { total: 5, .. }));
        assert_eq!(err.failed_endpoints(), vec![DEBT_METRICS, OPEN_ITEMS]);
    }
}
