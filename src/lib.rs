// GDN Campaign Country Optimizer - Core Library
// Exposes the reconciliation pipeline for use in CLI, web server, and tests

pub mod countries;
pub mod export;
pub mod filter;
pub mod pipeline;
pub mod reconciliation;
pub mod revenue;
pub mod spend;

// Re-export commonly used types
pub use countries::CountryResolver;
pub use export::{
    read_partition_csv, write_partition_csv, EXCLUDED_FILE, EXPORT_COLUMNS, PERFORMING_FILE,
};
pub use filter::{filter_rows, CampaignSelection};
pub use pipeline::run_pipeline;
pub use reconciliation::{classify, reconcile, ReconciledRow, ReconciliationReport};
pub use revenue::{aggregate_revenue, read_revenue_csv, RevenueKey, RevenueRecord};
pub use spend::{extract_campaign_id, parse_spend_xlsx, SpendLayout, SpendRecord, SPEND_COLUMNS};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
