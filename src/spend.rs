// 📥 Spend Record Normalizer
// Parses the GDN spend export (xlsx) into canonical spend records

use crate::countries::CountryResolver;
use anyhow::{bail, Context, Result};
use calamine::{Data, Reader, Xlsx};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::sync::OnceLock;

// ============================================================================
// LAYOUT
// ============================================================================

/// The 13 semantic column names of the spend export, in the fixed order
/// the report generator emits them. Positions are rebound to these names;
/// the header text in the file itself is discarded.
pub const SPEND_COLUMNS: [&str; 13] = [
    "Country Name",
    "Campaign",
    "Bid adj.",
    "Added/Excluded",
    "Clicks",
    "Impressions",
    "CTR",
    "Currency code",
    "Avg. CPC",
    "Cost",
    "Conv. rate",
    "Conversions",
    "Cost per conv.",
];

// Column positions used by normalization
const COL_COUNTRY_NAME: usize = 0;
const COL_CAMPAIGN: usize = 1;
const COL_COST: usize = 9;
const COL_CONVERSIONS: usize = 11;
const COL_COST_PER_CONV: usize = 12;

/// SpendLayout - Structural parameters of the spend export
///
/// The report carries three non-data rows before the first spend row:
/// a report title row, the header row, and a totals row. Kept as explicit
/// configuration so format drift is a one-line change, not a misparse.
#[derive(Debug, Clone)]
pub struct SpendLayout {
    /// Leading rows to discard before data begins
    pub leading_rows: usize,
}

impl SpendLayout {
    pub const DEFAULT_LEADING_ROWS: usize = 3;

    pub fn new(leading_rows: usize) -> Self {
        SpendLayout { leading_rows }
    }
}

impl Default for SpendLayout {
    fn default() -> Self {
        SpendLayout {
            leading_rows: Self::DEFAULT_LEADING_ROWS,
        }
    }
}

// ============================================================================
// SPEND RECORD
// ============================================================================

/// SpendRecord - One normalized row of the spend export
///
/// Optional fields degrade to None on parse failure instead of erroring:
/// a row with an unmapped country or an unparsable cost still participates
/// in the pipeline, it just cannot match revenue or classify as performing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendRecord {
    pub country_name: String,
    /// Raw campaign label, e.g. "Search Campaign (12345)"
    pub campaign: String,
    /// Numeric id extracted from the campaign label; None if no match
    pub campaign_id: Option<i64>,
    pub cost: Option<f64>,
    pub conversions: Option<f64>,
    pub cost_per_conv: Option<f64>,
    /// Two-letter country code; None if the name is not in the table
    pub country_code: Option<String>,
}

// ============================================================================
// CAMPAIGN ID EXTRACTION
// ============================================================================

fn campaign_id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\((\d+)\)").expect("campaign id pattern is valid"))
}

/// Extract the campaign id from a campaign label
///
/// The id is the first integer enclosed in parentheses anywhere in the
/// label. Labels with several parenthesized integers keep the first one
/// (documented ambiguity in the export format). No match yields None.
pub fn extract_campaign_id(label: &str) -> Option<i64> {
    campaign_id_regex()
        .captures(label)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<i64>().ok())
}

// ============================================================================
// CELL COERCION
// ============================================================================

/// Coerce a spreadsheet cell to f64, degrading to None
///
/// Placeholder text (" --", "", etc.) and any other unparsable content
/// becomes None rather than an error.
fn coerce_float(cell: &Data) -> Option<f64> {
    match cell {
        Data::Float(f) => Some(*f),
        Data::Int(i) => Some(*i as f64),
        Data::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Cell content as text (empty string for empty cells)
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

// ============================================================================
// PARSING
// ============================================================================

/// Normalize one raw spreadsheet row into a SpendRecord
pub(crate) fn normalize_row(cells: &[Data], countries: &CountryResolver) -> SpendRecord {
    let country_name = cell_text(&cells[COL_COUNTRY_NAME]);
    let campaign = cell_text(&cells[COL_CAMPAIGN]);

    SpendRecord {
        campaign_id: extract_campaign_id(&campaign),
        cost: coerce_float(&cells[COL_COST]),
        conversions: coerce_float(&cells[COL_CONVERSIONS]),
        cost_per_conv: coerce_float(&cells[COL_COST_PER_CONV]),
        country_code: countries.resolve(&country_name).map(|c| c.to_string()),
        country_name,
        campaign,
    }
}

/// Parse a spend export from in-memory xlsx bytes
///
/// Reads sheet "Sheet0" (the name the report generator uses), falling back
/// to the first sheet. Fails fast on structural mismatch (wrong column
/// count) since the layout is fixed by contract with the data source.
/// Row order is preserved.
pub fn parse_spend_xlsx(
    bytes: &[u8],
    layout: &SpendLayout,
    countries: &CountryResolver,
) -> Result<Vec<SpendRecord>> {
    let mut workbook =
        Xlsx::new(Cursor::new(bytes)).context("Failed to open spend file as xlsx")?;

    let sheet_names = workbook.sheet_names();
    let sheet = if sheet_names.iter().any(|n| n == "Sheet0") {
        "Sheet0".to_string()
    } else {
        sheet_names
            .first()
            .cloned()
            .context("Spend workbook contains no sheets")?
    };

    let range = workbook
        .worksheet_range(&sheet)
        .with_context(|| format!("Failed to read sheet '{}'", sheet))?;

    if range.width() != SPEND_COLUMNS.len() {
        bail!(
            "Spend sheet '{}' has {} columns, expected {} ({:?} ...)",
            sheet,
            range.width(),
            SPEND_COLUMNS.len(),
            &SPEND_COLUMNS[..2]
        );
    }

    let records = range
        .rows()
        .skip(layout.leading_rows)
        .map(|row| normalize_row(row, countries))
        .collect();

    Ok(records)
}

// ============================================================================
// TESTS
// ============================================================================
