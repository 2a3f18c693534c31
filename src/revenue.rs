// 💰 Revenue Aggregator
// Parses the revenue CSV and sums revenue per (campaign id, country code)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// RevenueRecord - One raw revenue row
///
/// Deserialized by header name; extra columns in the feed are ignored.
/// Multiple rows may share a (campaign id, country code) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueRecord {
    #[serde(rename = "Campid")]
    pub campaign_id: i64,
    #[serde(rename = "Country_Code")]
    pub country_code: String,
    #[serde(rename = "Revenue")]
    pub revenue: f64,
}

/// Aggregation key: (campaign id, country code)
pub type RevenueKey = (i64, String);

/// Parse revenue rows from CSV bytes
///
/// Rows that fail to deserialize (missing fields, non-numeric revenue)
/// are dropped, not repaired. A file without the expected headers yields
/// zero rows rather than an error; the join then simply finds no matches.
pub fn read_revenue_csv(bytes: &[u8]) -> Result<Vec<RevenueRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(bytes);

    // Header row itself must parse; malformed data rows degrade per-row
    reader
        .headers()
        .context("Failed to read revenue CSV headers")?;

    let records = reader
        .deserialize::<RevenueRecord>()
        .filter_map(|row| row.ok())
        .collect();

    Ok(records)
}

/// Sum revenue per (campaign id, country code)
///
/// The key is unique in the output by construction. Iteration order of
/// the map is unspecified; nothing downstream depends on it.
pub fn aggregate_revenue(records: &[RevenueRecord]) -> HashMap<RevenueKey, f64> {
    let mut totals: HashMap<RevenueKey, f64> = HashMap::new();

    for rec in records {
        *totals
            .entry((rec.campaign_id, rec.country_code.clone()))
            .or_insert(0.0) += rec.revenue;
    }

    totals
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(campaign_id: i64, country_code: &str, revenue: f64) -> RevenueRecord {
        RevenueRecord {
            campaign_id,
            country_code: country_code.to_string(),
            revenue,
        }
    }

    #[test]
    fn test_aggregation_sums_per_key() {
        let rows = vec![rec(1, "US", 10.0), rec(1, "US", 5.0), rec(2, "FR", 3.0)];

        let totals = aggregate_revenue(&rows);

        assert_eq!(totals.len(), 2);
        assert_eq!(totals.get(&(1, "US".to_string())), Some(&15.0));
        assert_eq!(totals.get(&(2, "FR".to_string())), Some(&3.0));
    }

    #[test]
    fn test_aggregation_is_order_independent() {
        let forward = vec![rec(1, "US", 10.0), rec(1, "US", 5.0), rec(2, "FR", 3.0)];
        let reversed: Vec<_> = forward.iter().rev().cloned().collect();

        assert_eq!(aggregate_revenue(&forward), aggregate_revenue(&reversed));
    }

    #[test]
    fn test_same_campaign_different_countries_stay_separate() {
        let rows = vec![rec(7, "US", 2.0), rec(7, "DE", 4.0)];

        let totals = aggregate_revenue(&rows);

        assert_eq!(totals.len(), 2);
        assert_eq!(totals.get(&(7, "US".to_string())), Some(&2.0));
        assert_eq!(totals.get(&(7, "DE".to_string())), Some(&4.0));
    }

    #[test]
    fn test_read_revenue_csv() {
        let csv = b"Campid,Country_Code,Revenue\n1,US,10.5\n1,US,4.5\n2,FR,3.0\n";

        let rows = read_revenue_csv(csv).unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], rec(1, "US", 10.5));
        assert_eq!(rows[2], rec(2, "FR", 3.0));
    }

    #[test]
    fn test_read_revenue_csv_ignores_extra_columns() {
        let csv = b"Date,Campid,Country_Code,Revenue,Source\n2025-01-01,9,JP,7.25,network\n";

        let rows = read_revenue_csv(csv).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0], rec(9, "JP", 7.25));
    }

    #[test]
    fn test_read_revenue_csv_drops_malformed_rows() {
        let csv = b"Campid,Country_Code,Revenue\n1,US,10.0\nnot-a-number,US,5.0\n2,FR,oops\n3,DE,1.0\n";

        let rows = read_revenue_csv(csv).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], rec(1, "US", 10.0));
        assert_eq!(rows[1], rec(3, "DE", 1.0));
    }
}
