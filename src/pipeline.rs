// 🔁 Pipeline - The one-shot transformation the UI layers call
//
// (spend bytes, revenue bytes) → classified report. Pure over its inputs:
// no I/O, no ambient state, recomputed in full on every invocation.

use crate::countries::CountryResolver;
use crate::reconciliation::{classify, reconcile, ReconciliationReport};
use crate::revenue::{aggregate_revenue, read_revenue_csv};
use crate::spend::{parse_spend_xlsx, SpendLayout};
use anyhow::{Context, Result};

/// Run the full reconciliation pipeline over in-memory inputs
///
/// Stages run strictly forward: normalize spend → aggregate revenue →
/// left join → classify. Parse failures inside rows degrade to nulls;
/// structural problems (unreadable xlsx, wrong column count) error out
/// without producing a partial result.
pub fn run_pipeline(
    spend_bytes: &[u8],
    revenue_bytes: &[u8],
    layout: &SpendLayout,
    countries: &CountryResolver,
) -> Result<ReconciliationReport> {
    let spend = parse_spend_xlsx(spend_bytes, layout, countries)
        .context("Failed to parse spend data")?;

    let revenue_rows = read_revenue_csv(revenue_bytes).context("Failed to parse revenue data")?;
    let revenue = aggregate_revenue(&revenue_rows);

    let reconciled = reconcile(spend, &revenue);
    Ok(classify(reconciled))
}

// ============================================================================
// TESTS
// ============================================================================
