pub mod arrears;
pub mod config;
pub mod error;
pub mod filter;
pub mod gateway;
pub mod logging;
pub mod present;
pub mod render;

pub use arrears::{aggregate, ArrearsTable, ArrearsView, GroupSummary, ViewMode};
pub use config::Config;
pub use error::{DashboardError, Result};
pub use filter::{FilterOptions, FilterState};
pub use gateway::{load_overview, load_receivables, Page, PostgrestClient, RpcTransport};
