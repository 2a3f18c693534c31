// 📤 Partition Export - CSV writer/reader for the two country sets

use crate::reconciliation::ReconciledRow;
use anyhow::{Context, Result};

/// Export column order (matches the on-screen tables)
pub const EXPORT_COLUMNS: [&str; 8] = [
    "Country Name",
    "Campaign",
    "Cost",
    "Conversions",
    "Cost per conv.",
    "Campid",
    "Country Code",
    "Total Revenue",
];

/// Default export file names
pub const PERFORMING_FILE: &str = "performing_countries.csv";
pub const EXCLUDED_FILE: &str = "excluded_countries.csv";

fn opt_float(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Write a partition as UTF-8 CSV bytes
///
/// Header row + one row per record. Null fields serialize as empty
/// strings. Floats use shortest round-trip formatting, so re-parsing
/// the file recovers the exact values.
pub fn write_partition_csv(rows: &[ReconciledRow]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record(EXPORT_COLUMNS)
        .context("Failed to write CSV header")?;

    for row in rows {
        writer
            .write_record(&[
                row.country_name.clone(),
                row.campaign.clone(),
                opt_float(row.cost),
                opt_float(row.conversions),
                opt_float(row.cost_per_conv),
                row.campaign_id.map(|id| id.to_string()).unwrap_or_default(),
                row.country_code.clone().unwrap_or_default(),
                opt_float(row.total_revenue),
            ])
            .context("Failed to write CSV row")?;
    }

    writer
        .into_inner()
        .context("Failed to flush CSV writer")
}

fn parse_opt_float(field: &str) -> Option<f64> {
    if field.is_empty() {
        None
    } else {
        field.parse::<f64>().ok()
    }
}

/// Read a partition back from exported CSV bytes
///
/// Inverse of write_partition_csv; used by the round-trip tests and by
/// consumers of the exported files.
pub fn read_partition_csv(bytes: &[u8]) -> Result<Vec<ReconciledRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(bytes);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.context("Failed to read exported CSV row")?;

        rows.push(ReconciledRow {
            country_name: record.get(0).unwrap_or_default().to_string(),
            campaign: record.get(1).unwrap_or_default().to_string(),
            cost: parse_opt_float(record.get(2).unwrap_or_default()),
            conversions: parse_opt_float(record.get(3).unwrap_or_default()),
            cost_per_conv: parse_opt_float(record.get(4).unwrap_or_default()),
            campaign_id: record
                .get(5)
                .filter(|f| !f.is_empty())
                .and_then(|f| f.parse::<i64>().ok()),
            country_code: record
                .get(6)
                .filter(|f| !f.is_empty())
                .map(|f| f.to_string()),
            total_revenue: parse_opt_float(record.get(7).unwrap_or_default()),
        });
    }

    Ok(rows)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn row(
        country: &str,
        campaign: &str,
        campaign_id: Option<i64>,
        cost: Option<f64>,
        revenue: Option<f64>,
    ) -> ReconciledRow {
        ReconciledRow {
            country_name: country.to_string(),
            campaign: campaign.to_string(),
            campaign_id,
            cost,
            conversions: Some(2.0),
            cost_per_conv: cost.map(|c| c / 2.0),
            country_code: Some("US".to_string()),
            total_revenue: revenue,
        }
    }

    #[test]
    fn test_export_header_and_shape() {
        let bytes =
            write_partition_csv(&[row("United States", "C (1)", Some(1), Some(5.0), Some(9.0))])
                .unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let mut lines = text.lines();

        assert_eq!(
            lines.next().unwrap(),
            "Country Name,Campaign,Cost,Conversions,Cost per conv.,Campid,Country Code,Total Revenue"
        );
        assert_eq!(lines.next().unwrap(), "United States,C (1),5,2,2.5,1,US,9");
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_round_trip_preserves_values() {
        let original = vec![
            row("United States", "Search (1)", Some(1), Some(100.25), Some(100.25)),
            row("Wakanda", "No Id", None, None, None),
            row("France", "Display (2)", Some(2), Some(0.1), Some(33.333333)),
        ];

        let bytes = write_partition_csv(&original).unwrap();
        let restored = read_partition_csv(&bytes).unwrap();

        assert_eq!(restored, original);
    }

    #[test]
    fn test_export_nulls_as_empty_fields() {
        let bytes = write_partition_csv(&[row("X", "Y", None, None, None)]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let data_line = text.lines().nth(1).unwrap();

        // Cost, Campid and Total Revenue fields are empty
        assert_eq!(data_line, "X,Y,,2,,,US,");
    }

    #[test]
    fn test_export_quotes_embedded_commas() {
        let bytes = write_partition_csv(&[row("Korea, South", "C (3)", Some(3), None, None)])
            .unwrap();

        let restored = read_partition_csv(&bytes).unwrap();
        assert_eq!(restored[0].country_name, "Korea, South");
    }

    #[test]
    fn test_empty_partition_exports_header_only() {
        let bytes = write_partition_csv(&[]).unwrap();
        let text = String::from_utf8(bytes.clone()).unwrap();

        assert_eq!(text.lines().count(), 1);
        assert!(read_partition_csv(&bytes).unwrap().is_empty());
    }
}
