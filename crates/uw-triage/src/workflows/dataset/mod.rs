//! Property dataset: the six triage properties, merged from an optional external sheet over the
//! static catalog.

mod catalog;
mod index;
mod parser;

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};

use super::sourced::{FallbackReason, Sourced};
use parser::{whole_number, SheetRow};

pub use catalog::{static_properties, static_property};
pub use index::PropertyIndex;

/// A property under review. `id`, `letter`, imagery, `construction_risk`, and `state` always
/// come from the static catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Property {
    #[serde(skip)]
    pub index: PropertyIndex,
    pub id: i64,
    #[serde(rename = "propertyId")]
    pub letter: String,
    pub submission_id: String,
    pub submission_channel: String,
    pub occupancy_type: String,
    pub property_age: u32,
    pub property_value: u64,
    pub property_county: String,
    pub cover_type: String,
    pub building_coverage_limit: u64,
    pub contents_coverage_limit: u64,
    pub broker_company: String,
    pub construction_risk: String,
    pub state: String,
    #[serde(rename = "imageUrl")]
    pub image_url: String,
    #[serde(rename = "roofImageUrl")]
    pub roof_image_url: String,
}

#[derive(Debug, thiserror::Error)]
pub enum DatasetLoadError {
    #[error("failed to read property sheet: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid property sheet: {0}")]
    Csv(#[from] csv::Error),
}

/// Provider for the triage property set. Never fails: any problem with the external sheet
/// degrades to the static catalog.
#[derive(Debug, Clone, Default)]
pub struct PropertyDataset {
    source: Option<PathBuf>,
}

impl PropertyDataset {
    pub fn new(source: Option<PathBuf>) -> Self {
        Self { source }
    }

    pub fn static_only() -> Self {
        Self { source: None }
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn load(&self) -> Sourced<Vec<Property>> {
        let fallback = || static_properties().to_vec();

        let Some(path) = self.source.as_deref() else {
            return Sourced::Fallback(
                fallback(),
                FallbackReason::SourceMissing("no property sheet configured".to_string()),
            );
        };

        if !path.exists() {
            return Sourced::Fallback(
                fallback(),
                FallbackReason::SourceMissing(path.display().to_string()),
            );
        }

        match read_sheet(path) {
            Ok(rows) if rows.is_empty() => Sourced::Fallback(fallback(), FallbackReason::SourceEmpty),
            Ok(rows) => Sourced::Primary(merge_rows(&rows)),
            Err(err) => Sourced::Fallback(
                fallback(),
                FallbackReason::SourceUnreadable(err.to_string()),
            ),
        }
    }

    /// Loads and logs any degradation; callers that don't care about provenance use this.
    pub fn properties(&self) -> Vec<Property> {
        let loaded = self.load();
        match loaded.reason() {
            Some(reason @ FallbackReason::SourceMissing(_)) => {
                debug!(%reason, "serving static property catalog")
            }
            Some(reason) => warn!(%reason, "property sheet unusable; serving static catalog"),
            None => {}
        }
        loaded.into_inner()
    }

    /// Looks a property up by letter label, 1-based number, or submission code.
    pub fn find(&self, identifier: &str) -> Option<Property> {
        let properties = self.properties();
        let identifier = identifier.trim();
        properties
            .iter()
            .find(|property| property.submission_id == identifier)
            .or_else(|| {
                PropertyIndex::from_letter(identifier)
                    .or_else(|| identifier.parse().ok().and_then(PropertyIndex::from_property_id))
                    .or_else(|| PropertyIndex::from_static_code(identifier))
                    .map(|index| &properties[index.position()])
            })
            .cloned()
    }
}

fn read_sheet(path: &Path) -> Result<Vec<SheetRow>, DatasetLoadError> {
    let file = File::open(path)?;
    read_rows(file)
}

pub(crate) fn read_rows<R: Read>(reader: R) -> Result<Vec<SheetRow>, DatasetLoadError> {
    Ok(parser::parse_rows(reader, PropertyIndex::COUNT)?)
}

/// Positional merge of sheet rows over the catalog. Positions the sheet doesn't cover keep the
/// catalog entry unchanged, so the output is always exactly six properties, A through F.
pub(crate) fn merge_rows(rows: &[SheetRow]) -> Vec<Property> {
    PropertyIndex::all()
        .map(|index| {
            let fallback = static_property(index);
            match rows.get(index.position()) {
                Some(row) => merge_row(row, fallback),
                None => fallback.clone(),
            }
        })
        .collect()
}

fn merge_row(row: &SheetRow, fallback: &Property) -> Property {
    let text = |value: &Option<String>, fallback: &str| {
        value.clone().unwrap_or_else(|| fallback.to_string())
    };
    let number = |value: &Option<String>, fallback: u64| {
        value.as_deref().and_then(whole_number).unwrap_or(fallback)
    };

    Property {
        index: fallback.index,
        id: fallback.id,
        letter: fallback.letter.clone(),
        submission_id: row
            .submission_code()
            .unwrap_or_else(|| fallback.submission_id.clone()),
        submission_channel: text(&row.submission_channel, &fallback.submission_channel),
        occupancy_type: text(&row.occupancy_type, &fallback.occupancy_type),
        property_age: row
            .property_age
            .as_deref()
            .and_then(whole_number)
            .and_then(|age| u32::try_from(age).ok())
            .unwrap_or(fallback.property_age),
        property_value: number(&row.property_value, fallback.property_value),
        property_county: text(&row.property_county, &fallback.property_county),
        cover_type: text(&row.cover_type, &fallback.cover_type),
        building_coverage_limit: number(
            &row.building_coverage_limit,
            fallback.building_coverage_limit,
        ),
        contents_coverage_limit: number(
            &row.contents_coverage_limit,
            fallback.contents_coverage_limit,
        ),
        broker_company: text(&row.broker_company, &fallback.broker_company),
        construction_risk: fallback.construction_risk.clone(),
        state: fallback.state.clone(),
        image_url: fallback.image_url.clone(),
        roof_image_url: fallback.roof_image_url.clone(),
    }
}
