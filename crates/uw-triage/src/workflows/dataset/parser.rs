use serde::{Deserialize, Deserializer};
use std::io::Read;

/// One row of the external property sheet. Every cell is optional; blanks and `NaN`
/// markers deserialize to `None` so the catalog value fills in.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct SheetRow {
    #[serde(default, deserialize_with = "cell")]
    pub(crate) submission_id: Option<String>,
    #[serde(default, deserialize_with = "cell")]
    pub(crate) submission_channel: Option<String>,
    #[serde(default, deserialize_with = "cell")]
    pub(crate) occupancy_type: Option<String>,
    #[serde(default, deserialize_with = "cell")]
    pub(crate) property_age: Option<String>,
    #[serde(default, deserialize_with = "cell")]
    pub(crate) property_value: Option<String>,
    #[serde(
        rename = "Property_county",
        alias = "property_county",
        default,
        deserialize_with = "cell"
    )]
    pub(crate) property_county: Option<String>,
    #[serde(default, deserialize_with = "cell")]
    pub(crate) cover_type: Option<String>,
    #[serde(default, deserialize_with = "cell")]
    pub(crate) building_coverage_limit: Option<String>,
    #[serde(default, deserialize_with = "cell")]
    pub(crate) contents_coverage_limit: Option<String>,
    #[serde(default, deserialize_with = "cell")]
    pub(crate) broker_company: Option<String>,
}

impl SheetRow {
    pub(crate) fn submission_code(&self) -> Option<String> {
        self.submission_id.as_deref().map(normalize_code)
    }
}

/// Reads at most `limit` rows; later rows are never consulted.
pub(crate) fn parse_rows<R: Read>(reader: R, limit: usize) -> Result<Vec<SheetRow>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    csv_reader.deserialize::<SheetRow>().take(limit).collect()
}

/// Parses a whole, non-negative number. Spreadsheet exports often render integers as `18.0`
/// or with thousands separators.
pub(crate) fn whole_number(raw: &str) -> Option<u64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, ',' | '$' | ' '))
        .collect();
    let value = cleaned.parse::<f64>().ok()?;
    if value.is_finite() && value >= 0.0 {
        Some(value.round() as u64)
    } else {
        None
    }
}

fn normalize_code(raw: &str) -> String {
    let trimmed = raw.trim();
    match trimmed.strip_suffix(".0") {
        Some(head) if !head.is_empty() && head.chars().all(|c| c.is_ascii_digit()) => {
            head.to_string()
        }
        _ => trimmed.to_string(),
    }
}

fn is_missing(value: &str) -> bool {
    let value = value.trim();
    value.is_empty()
        || value.eq_ignore_ascii_case("nan")
        || value.eq_ignore_ascii_case("null")
        || value.eq_ignore_ascii_case("none")
}

fn cell<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !is_missing(value)))
}
