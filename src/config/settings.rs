use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendSettings,
    #[serde(default)]
    pub display: DisplaySettings,
    #[serde(default)]
    pub overview: OverviewSettings,
    #[serde(default)]
    pub receivables: ReceivablesSettings,
}

/// Where the aggregation procedures live
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BackendSettings {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_rpc_path")]
    pub rpc_path: String,
    /// Global per-request timeout; unset leaves the transport defaults
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            url: String::new(),
            api_key: None,
            rpc_path: default_rpc_path(),
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DisplaySettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_true")]
    pub color: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            color: true,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy)]
pub struct OverviewSettings {
    #[serde(default = "default_top_n")]
    pub top_tenants: u32,
    #[serde(default = "default_years_ahead")]
    pub expiry_years_ahead: u32,
    #[serde(default = "default_upcoming")]
    pub upcoming_expiries: u32,
}

impl Default for OverviewSettings {
    fn default() -> Self {
        Self {
            top_tenants: default_top_n(),
            expiry_years_ahead: default_years_ahead(),
            upcoming_expiries: default_upcoming(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy)]
pub struct ReceivablesSettings {
    #[serde(default = "default_top_n")]
    pub top_debtors: u32,
    #[serde(default = "default_open_items")]
    pub open_items: u32,
}

impl Default for ReceivablesSettings {
    fn default() -> Self {
        Self {
            top_debtors: default_top_n(),
            open_items: default_open_items(),
        }
    }
}

fn default_rpc_path() -> String {
    "/rest/v1/rpc".to_string()
}

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_true() -> bool {
    true
}

fn default_top_n() -> u32 {
    8
}

fn default_years_ahead() -> u32 {
    10
}

fn default_upcoming() -> u32 {
    50
}

fn default_open_items() -> u32 {
    100
}
