// ⚖️ Reconciliation Engine - Join spend against revenue, classify countries
//
// Left join on (campaign id, country code), then partition every row into
// performing (revenue >= cost) or excluded (revenue < cost).

use crate::revenue::RevenueKey;
use crate::spend::SpendRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// RECONCILED ROW
// ============================================================================

/// ReconciledRow - One spend row carrying its matched revenue
///
/// total_revenue is None when no revenue matched the (campaign id,
/// country code) key — deliberately null rather than zero, so missing
/// data stays distinguishable from a genuine zero-revenue country.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciledRow {
    pub country_name: String,
    pub campaign: String,
    pub campaign_id: Option<i64>,
    pub cost: Option<f64>,
    pub conversions: Option<f64>,
    pub cost_per_conv: Option<f64>,
    pub country_code: Option<String>,
    pub total_revenue: Option<f64>,
}

impl ReconciledRow {
    /// Join key, present only when both components are
    fn key(&self) -> Option<RevenueKey> {
        match (self.campaign_id, &self.country_code) {
            (Some(id), Some(code)) => Some((id, code.clone())),
            _ => None,
        }
    }
}

// ============================================================================
// JOIN
// ============================================================================

/// Left-join spend records against aggregated revenue
///
/// Every spend record appears exactly once in the output, in input order.
/// A null campaign id or country code never matches anything (standard
/// null-inequality semantics); unmatched rows get total_revenue = None.
pub fn reconcile(
    spend: Vec<SpendRecord>,
    revenue: &HashMap<RevenueKey, f64>,
) -> Vec<ReconciledRow> {
    spend
        .into_iter()
        .map(|rec| {
            let mut row = ReconciledRow {
                country_name: rec.country_name,
                campaign: rec.campaign,
                campaign_id: rec.campaign_id,
                cost: rec.cost,
                conversions: rec.conversions,
                cost_per_conv: rec.cost_per_conv,
                country_code: rec.country_code,
                total_revenue: None,
            };
            row.total_revenue = row.key().and_then(|k| revenue.get(&k).copied());
            row
        })
        .collect()
}

// ============================================================================
// CLASSIFIER
// ============================================================================

/// ReconciliationReport - The two partitions plus discovery helpers
///
/// performing and excluded are disjoint and together cover every
/// reconciled row. Both are sorted ascending by campaign id as a
/// presentation convenience; rows without an id sort last.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationReport {
    pub performing: Vec<ReconciledRow>,
    pub excluded: Vec<ReconciledRow>,
}

impl ReconciliationReport {
    /// Total reconciled rows across both partitions
    pub fn total_rows(&self) -> usize {
        self.performing.len() + self.excluded.len()
    }

    /// Sorted distinct campaign ids across ALL reconciled rows
    ///
    /// Drawn from both partitions so the filter choices cover every
    /// campaign that appears in the spend file, not just the winners.
    pub fn campaign_ids(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = self
            .performing
            .iter()
            .chain(self.excluded.iter())
            .filter_map(|row| row.campaign_id)
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    pub fn summary(&self) -> String {
        format!(
            "{} rows reconciled: {} performing, {} excluded, {} campaigns",
            self.total_rows(),
            self.performing.len(),
            self.excluded.len(),
            self.campaign_ids().len()
        )
    }
}

/// True when the row earns its spend back
///
/// Null rule (explicit, not left to numeric coercion): a row with a
/// missing cost OR missing revenue operand is never performing, so all
/// unmatched and unparsable rows land in excluded. Tie (revenue == cost)
/// counts as performing.
fn is_performing(row: &ReconciledRow) -> bool {
    match (row.cost, row.total_revenue) {
        (Some(cost), Some(revenue)) => revenue >= cost,
        _ => false,
    }
}

/// Partition reconciled rows into performing and excluded sets
pub fn classify(rows: Vec<ReconciledRow>) -> ReconciliationReport {
    let (performing, excluded): (Vec<_>, Vec<_>) = rows.into_iter().partition(is_performing);

    let mut report = ReconciliationReport {
        performing,
        excluded,
    };

    // Ascending campaign id, id-less rows last; stable within equal keys
    let by_campaign = |row: &ReconciledRow| (row.campaign_id.is_none(), row.campaign_id);
    report.performing.sort_by_key(by_campaign);
    report.excluded.sort_by_key(by_campaign);

    report
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn spend(
        country: &str,
        code: Option<&str>,
        campaign_id: Option<i64>,
        cost: Option<f64>,
    ) -> SpendRecord {
        SpendRecord {
            country_name: country.to_string(),
            campaign: format!("Campaign ({})", campaign_id.unwrap_or(0)),
            campaign_id,
            cost,
            conversions: Some(1.0),
            cost_per_conv: cost,
            country_code: code.map(|c| c.to_string()),
        }
    }

    fn revenue_map(entries: &[(i64, &str, f64)]) -> HashMap<RevenueKey, f64> {
        entries
            .iter()
            .map(|(id, code, rev)| ((*id, code.to_string()), *rev))
            .collect()
    }

    #[test]
    fn test_join_matches_on_composite_key() {
        let rows = reconcile(
            vec![spend("United States", Some("US"), Some(1), Some(50.0))],
            &revenue_map(&[(1, "US", 80.0)]),
        );

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].total_revenue, Some(80.0));
    }

    #[test]
    fn test_join_totality() {
        // Every spend row appears exactly once, matched or not
        let spend_rows = vec![
            spend("United States", Some("US"), Some(1), Some(50.0)),
            spend("France", Some("FR"), Some(2), Some(10.0)),
            spend("Wakanda", None, Some(3), Some(5.0)),
            spend("Germany", Some("DE"), None, Some(7.0)),
        ];

        let rows = reconcile(spend_rows, &revenue_map(&[(1, "US", 80.0)]));

        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].total_revenue, Some(80.0));
        // Unmatched rows carry null revenue, not zero
        assert_eq!(rows[1].total_revenue, None);
        // Null keys never match
        assert_eq!(rows[2].total_revenue, None);
        assert_eq!(rows[3].total_revenue, None);
    }

    #[test]
    fn test_join_requires_both_key_fields() {
        // Revenue exists for campaign 5 / US, but each spend row is
        // missing one key component
        let revenue = revenue_map(&[(5, "US", 100.0)]);

        let no_code = reconcile(vec![spend("X", None, Some(5), Some(1.0))], &revenue);
        let no_id = reconcile(vec![spend("X", Some("US"), None, Some(1.0))], &revenue);

        assert_eq!(no_code[0].total_revenue, None);
        assert_eq!(no_id[0].total_revenue, None);
    }

    fn row(campaign_id: Option<i64>, cost: Option<f64>, revenue: Option<f64>) -> ReconciledRow {
        ReconciledRow {
            country_name: "United States".to_string(),
            campaign: "C".to_string(),
            campaign_id,
            cost,
            conversions: None,
            cost_per_conv: None,
            country_code: Some("US".to_string()),
            total_revenue: revenue,
        }
    }

    #[test]
    fn test_classify_basic_partition() {
        let report = classify(vec![
            row(Some(1), Some(50.0), Some(80.0)), // performing
            row(Some(2), Some(50.0), Some(20.0)), // excluded
            row(Some(3), Some(10.0), None),       // unmatched → excluded
        ]);

        assert_eq!(report.performing.len(), 1);
        assert_eq!(report.excluded.len(), 2);
        assert_eq!(report.performing[0].campaign_id, Some(1));
    }

    #[test]
    fn test_classify_tie_is_performing() {
        let report = classify(vec![row(Some(1), Some(100.0), Some(100.0))]);

        assert_eq!(report.performing.len(), 1);
        assert!(report.excluded.is_empty());
    }

    #[test]
    fn test_classify_null_operands_go_to_excluded() {
        let report = classify(vec![
            row(Some(1), None, Some(80.0)), // null cost
            row(Some(2), Some(10.0), None), // null revenue
            row(Some(3), None, None),       // both null
        ]);

        assert!(report.performing.is_empty());
        assert_eq!(report.excluded.len(), 3);
    }

    #[test]
    fn test_partitions_exhaustive_and_disjoint() {
        let rows = vec![
            row(Some(4), Some(1.0), Some(2.0)),
            row(Some(2), Some(5.0), Some(1.0)),
            row(None, None, None),
            row(Some(9), Some(0.0), Some(0.0)),
        ];
        let total = rows.len();

        let report = classify(rows);

        assert_eq!(report.total_rows(), total);
        for p in &report.performing {
            assert!(!report.excluded.contains(p));
        }
    }

    #[test]
    fn test_partitions_sorted_by_campaign_id() {
        let report = classify(vec![
            row(Some(30), Some(5.0), Some(1.0)),
            row(None, Some(5.0), Some(1.0)),
            row(Some(10), Some(5.0), Some(1.0)),
            row(Some(20), Some(5.0), Some(1.0)),
        ]);

        let ids: Vec<Option<i64>> = report.excluded.iter().map(|r| r.campaign_id).collect();
        assert_eq!(ids, vec![Some(10), Some(20), Some(30), None]);
    }

    #[test]
    fn test_campaign_ids_cover_both_partitions() {
        let report = classify(vec![
            row(Some(2), Some(1.0), Some(9.0)), // performing
            row(Some(1), Some(9.0), Some(1.0)), // excluded
            row(Some(2), Some(9.0), Some(1.0)), // excluded, duplicate id
            row(None, None, None),
        ]);

        assert_eq!(report.campaign_ids(), vec![1, 2]);
    }

    #[test]
    fn test_report_json_shape() {
        // The report is served as JSON by the web layer: nulls stay
        // null (never zero) and field names are the snake_case ones the
        // page binds to
        let report = classify(vec![row(Some(1), Some(50.0), Some(80.0)), row(Some(2), Some(10.0), None)]);

        let json: serde_json::Value = serde_json::to_value(&report).unwrap();

        assert_eq!(json["performing"][0]["campaign_id"], 1);
        assert_eq!(json["performing"][0]["total_revenue"], 80.0);
        assert_eq!(json["excluded"][0]["total_revenue"], serde_json::Value::Null);
        assert_eq!(json["excluded"][0]["country_code"], "US");

        let restored: ReconciliationReport = serde_json::from_value(json).unwrap();
        assert_eq!(restored, report);
    }

    #[test]
    fn test_report_summary() {
        let report = classify(vec![
            row(Some(1), Some(1.0), Some(2.0)),
            row(Some(2), Some(2.0), Some(1.0)),
        ]);

        assert_eq!(
            report.summary(),
            "2 rows reconciled: 1 performing, 1 excluded, 2 campaigns"
        );
    }
}
