// 🔎 Campaign Filter - Caller-held selection + pure filter function

use crate::reconciliation::ReconciledRow;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// CampaignSelection - The set of campaign ids currently selected
///
/// A plain value owned by the caller (CLI flag, web session), not hidden
/// UI state. The filter function itself stays pure and stateless.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignSelection {
    selected: BTreeSet<i64>,
}

impl CampaignSelection {
    /// Select every id in the given list ("Select All")
    pub fn all_of<I: IntoIterator<Item = i64>>(ids: I) -> Self {
        CampaignSelection {
            selected: ids.into_iter().collect(),
        }
    }

    /// Empty selection ("Deselect All")
    pub fn none() -> Self {
        CampaignSelection::default()
    }

    pub fn contains(&self, id: i64) -> bool {
        self.selected.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Selected ids in ascending order
    pub fn ids(&self) -> Vec<i64> {
        self.selected.iter().copied().collect()
    }
}

/// Restrict rows to the selected campaigns
///
/// Rows whose campaign id is missing never pass any filter (membership
/// in a set is undefined for a null id). Applying the same selection
/// twice gives the same result as applying it once.
pub fn filter_rows(rows: &[ReconciledRow], selection: &CampaignSelection) -> Vec<ReconciledRow> {
    rows.iter()
        .filter(|row| row.campaign_id.is_some_and(|id| selection.contains(id)))
        .cloned()
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn row(campaign_id: Option<i64>) -> ReconciledRow {
        ReconciledRow {
            country_name: "France".to_string(),
            campaign: "C".to_string(),
            campaign_id,
            cost: Some(1.0),
            conversions: None,
            cost_per_conv: None,
            country_code: Some("FR".to_string()),
            total_revenue: Some(2.0),
        }
    }

    #[test]
    fn test_filter_restricts_to_subset() {
        let rows = vec![row(Some(1)), row(Some(2)), row(Some(3))];
        let selection = CampaignSelection::all_of([1, 3]);

        let filtered = filter_rows(&rows, &selection);

        assert_eq!(filtered.len(), 2);
        for r in &filtered {
            assert!(selection.contains(r.campaign_id.unwrap()));
        }
    }

    #[test]
    fn test_filter_is_idempotent() {
        let rows = vec![row(Some(1)), row(Some(2)), row(Some(2)), row(None)];
        let selection = CampaignSelection::all_of([2]);

        let once = filter_rows(&rows, &selection);
        let twice = filter_rows(&once, &selection);

        assert_eq!(once, twice);
        assert_eq!(once.len(), 2);
    }

    #[test]
    fn test_empty_selection_filters_everything() {
        let rows = vec![row(Some(1)), row(Some(2))];

        let filtered = filter_rows(&rows, &CampaignSelection::none());

        assert!(filtered.is_empty());
    }

    #[test]
    fn test_rows_without_id_never_pass() {
        let rows = vec![row(None), row(Some(5))];
        let selection = CampaignSelection::all_of([5]);

        let filtered = filter_rows(&rows, &selection);

        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].campaign_id, Some(5));
    }

    #[test]
    fn test_selection_ids_sorted() {
        let selection = CampaignSelection::all_of([9, 1, 5, 1]);

        assert_eq!(selection.ids(), vec![1, 5, 9]);
        assert_eq!(selection.len(), 3);
        assert!(!selection.is_empty());
        assert!(CampaignSelection::none().is_empty());
    }
}
