use serde::Deserialize;
use serde_json::Value;

use super::batch::{gather, RpcCall};
use super::client::RpcTransport;
use super::decode::{decode_first, decode_rows, lenient_number, lenient_text};
use super::options::decode_options;
use super::{filter_params, Page};
use crate::config::OverviewSettings;
use crate::error::Result;
use crate::filter::{FilterOptions, FilterState};

pub const PORTFOLIO_METRICS: &str = "portfolio_metrics";
pub const MARKETING_KPIS: &str = "portfolio_marketing_kpis";
pub const TOP_TENANTS: &str = "top_tenants";
pub const EXPIRY_EXPOSURE: &str = "expiry_exposure_yearly";
pub const UPCOMING_EXPIRIES: &str = "next_90_days_expiries";
pub const FILTER_OPTIONS: &str = "filter_options";

/// Rent roll KPIs for the current filter combination
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PortfolioMetrics {
    #[serde(default, deserialize_with = "lenient_number")]
    pub net_rent_month: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub net_rent_year: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub area_m2: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub wa_rent_eur_m2_month: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub walt_weighted_years: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub vacant_area_m2: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub vacant_units_count: f64,
    /// Number of units in scope
    #[serde(default, deserialize_with = "lenient_number")]
    pub row_count: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MarketingKpis {
    #[serde(default, deserialize_with = "lenient_number")]
    pub tenants_count: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub units_count: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub top5_concentration: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub expiry_12m_net_rent_year: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub indexable_rent_share: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TenantRent {
    #[serde(default, deserialize_with = "lenient_text")]
    pub tenant: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub net_rent_year: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExpiryYear {
    #[serde(default, deserialize_with = "lenient_number")]
    pub expiry_year: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub net_rent_year: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpcomingExpiry {
    #[serde(default, deserialize_with = "lenient_text")]
    pub tenant: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub unit_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub net_rent_year: f64,
    #[serde(default, deserialize_with = "lenient_text")]
    pub next_possible_contract_end: Option<String>,
}

/// Everything the overview page shows, from one consistent batch
#[derive(Debug, Clone, Default)]
pub struct OverviewData {
    pub metrics: PortfolioMetrics,
    pub marketing: MarketingKpis,
    pub top_tenants: Vec<TenantRent>,
    pub expiry: Vec<ExpiryYear>,
    pub upcoming: Vec<UpcomingExpiry>,
    pub options: FilterOptions,
}

fn overview_calls(filters: &FilterState, limits: &OverviewSettings) -> Vec<RpcCall> {
    let shared = filter_params(filters, Page::Overview);
    vec![
        RpcCall::new(PORTFOLIO_METRICS, &shared),
        RpcCall::new(MARKETING_KPIS, &shared),
        RpcCall::new(TOP_TENANTS, &shared).with("p_limit", limits.top_tenants),
        RpcCall::new(EXPIRY_EXPOSURE, &shared).with("p_years_ahead", limits.expiry_years_ahead),
        RpcCall::new(UPCOMING_EXPIRIES, &shared).with("p_limit", limits.upcoming_expiries),
        RpcCall::new(FILTER_OPTIONS, &shared),
    ]
}

/// Run the overview batch and shape its six responses
pub fn load_overview<T>(
    transport: &T,
    filters: &FilterState,
    limits: &OverviewSettings,
) -> Result<OverviewData>
where
    T: RpcTransport + ?Sized,
{
    let mut values = gather(transport, &overview_calls(filters, limits))?.into_iter();
    let mut next = || values.next().unwrap_or(Value::Null);

    Ok(OverviewData {
        metrics: decode_first(PORTFOLIO_METRICS, next()),
        marketing: decode_first(MARKETING_KPIS, next()),
        top_tenants: decode_rows(TOP_TENANTS, next()),
        expiry: decode_rows(EXPIRY_EXPOSURE, next()),
        upcoming: decode_rows(UPCOMING_EXPIRIES, next()),
        options: decode_options(FILTER_OPTIONS, next()),
    })
}
