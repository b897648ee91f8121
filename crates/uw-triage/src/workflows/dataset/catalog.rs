use std::sync::OnceLock;

use super::index::PropertyIndex;
use super::Property;

struct CatalogSeed {
    image_url: &'static str,
    roof_image_url: &'static str,
    submission_channel: &'static str,
    occupancy_type: &'static str,
    property_age: u32,
    property_value: u64,
    property_county: &'static str,
    cover_type: &'static str,
    building_coverage_limit: u64,
    contents_coverage_limit: u64,
    broker_company: &'static str,
    construction_risk: &'static str,
    state: &'static str,
}

const SEEDS: [CatalogSeed; PropertyIndex::COUNT] = [
    CatalogSeed {
        image_url: "https://images.unsplash.com/photo-1568605114967-8130f3a36994?w=800&h=600&fit=crop",
        roof_image_url: "https://images.unsplash.com/photo-1558618666-fcd25c85cd64?w=800&h=600&fit=crop",
        submission_channel: "Broker",
        occupancy_type: "Owner Occupied",
        property_age: 18,
        property_value: 850_000,
        property_county: "Orange County",
        cover_type: "Comprehensive",
        building_coverage_limit: 600_000,
        contents_coverage_limit: 150_000,
        broker_company: "ABC Insurance",
        construction_risk: "Medium",
        state: "CA",
    },
    CatalogSeed {
        image_url: "https://images.unsplash.com/photo-1570129477492-45c003edd2be?w=800&h=600&fit=crop",
        roof_image_url: "https://images.unsplash.com/photo-1504307651254-35680f356dfd?w=800&h=600&fit=crop",
        submission_channel: "Direct",
        occupancy_type: "Tenant Occupied",
        property_age: 25,
        property_value: 620_000,
        property_county: "Los Angeles County",
        cover_type: "Basic",
        building_coverage_limit: 450_000,
        contents_coverage_limit: 100_000,
        broker_company: "Direct Underwriting",
        construction_risk: "High",
        state: "CA",
    },
    CatalogSeed {
        image_url: "https://images.unsplash.com/photo-1564013799919-ab600027ffc6?w=800&h=600&fit=crop",
        roof_image_url: "https://images.unsplash.com/photo-1622021142947-da7dedc7c39a?w=800&h=600&fit=crop",
        submission_channel: "Broker",
        occupancy_type: "Owner Occupied",
        property_age: 5,
        property_value: 1_200_000,
        property_county: "San Diego County",
        cover_type: "Premium",
        building_coverage_limit: 900_000,
        contents_coverage_limit: 250_000,
        broker_company: "XYZ Brokers",
        construction_risk: "Low",
        state: "CA",
    },
    CatalogSeed {
        image_url: "https://images.unsplash.com/photo-1580587771525-78b9dba3b914?w=800&h=600&fit=crop",
        roof_image_url: "https://images.unsplash.com/photo-1512917774080-9991f1c4c750?w=800&h=600&fit=crop",
        submission_channel: "Broker",
        occupancy_type: "Vacation Home",
        property_age: 35,
        property_value: 450_000,
        property_county: "Riverside County",
        cover_type: "Comprehensive",
        building_coverage_limit: 350_000,
        contents_coverage_limit: 75_000,
        broker_company: "Coastal Insurance Group",
        construction_risk: "High",
        state: "CA",
    },
    CatalogSeed {
        image_url: "https://images.unsplash.com/photo-1600596542815-ffad4c1539a9?w=800&h=600&fit=crop",
        roof_image_url: "https://images.unsplash.com/photo-1605146769289-440113cc3d00?w=800&h=600&fit=crop",
        submission_channel: "Direct",
        occupancy_type: "Owner Occupied",
        property_age: 12,
        property_value: 975_000,
        property_county: "Ventura County",
        cover_type: "Comprehensive",
        building_coverage_limit: 700_000,
        contents_coverage_limit: 200_000,
        broker_company: "Direct Underwriting",
        construction_risk: "Low",
        state: "CA",
    },
    CatalogSeed {
        image_url: "https://images.unsplash.com/photo-1600585154340-be6161a56a0c?w=800&h=600&fit=crop",
        roof_image_url: "https://images.unsplash.com/photo-1513584684374-8bab748fbf90?w=800&h=600&fit=crop",
        submission_channel: "Broker",
        occupancy_type: "Owner Occupied",
        property_age: 8,
        property_value: 725_000,
        property_county: "Orange County",
        cover_type: "Basic",
        building_coverage_limit: 550_000,
        contents_coverage_limit: 125_000,
        broker_company: "Premier Property Insurance",
        construction_risk: "Low",
        state: "CA",
    },
];

/// Static property catalog, ordered A through F.
pub fn static_properties() -> &'static [Property] {
    static CATALOG: OnceLock<Vec<Property>> = OnceLock::new();
    CATALOG.get_or_init(|| PropertyIndex::all().map(seeded_property).collect())
}

pub fn static_property(index: PropertyIndex) -> &'static Property {
    &static_properties()[index.position()]
}

fn seeded_property(index: PropertyIndex) -> Property {
    let seed = &SEEDS[index.position()];
    Property {
        index,
        id: index.property_id(),
        letter: index.letter().to_string(),
        submission_id: index.static_code().to_string(),
        submission_channel: seed.submission_channel.to_string(),
        occupancy_type: seed.occupancy_type.to_string(),
        property_age: seed.property_age,
        property_value: seed.property_value,
        property_county: seed.property_county.to_string(),
        cover_type: seed.cover_type.to_string(),
        building_coverage_limit: seed.building_coverage_limit,
        contents_coverage_limit: seed.contents_coverage_limit,
        broker_company: seed.broker_company.to_string(),
        construction_risk: seed.construction_risk.to_string(),
        state: seed.state.to_string(),
        image_url: seed.image_url.to_string(),
        roof_image_url: seed.roof_image_url.to_string(),
    }
}
