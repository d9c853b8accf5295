//! Unit tests for provenance enrichment

use crate::fixtures::text_attr;
use geo_types::{Geometry, Point};
use shp2pgis::services::enrich::enrich;
use shp2pgis::{AttributeValue, Feature, RunToken};

fn run() -> RunToken {
    RunToken::parse("170518").unwrap()
}

#[test]
fn stamps_directory_and_run_on_every_feature() {
    let mut features = vec![
        Feature::new(Geometry::Point(Point::new(0.0, 0.0))),
        Feature::new(Geometry::Point(Point::new(1.0, 1.0))).with_attribute("height", AttributeValue::Number(12.5)),
    ];

    enrich(&mut features, "unit_042", &run());

    for feature in &features {
        assert_eq!(text_attr(feature, "directory"), Some("unit_042"));
        assert_eq!(text_attr(feature, "run"), Some("170518"));
    }
    assert_eq!(
        features[1].attribute("height"),
        Some(&AttributeValue::Number(12.5))
    );
}

#[test]
fn overwrites_existing_provenance_but_keeps_geometry() {
    let geometry = Geometry::Point(Point::new(3.0, 4.0));
    let mut features = vec![
        Feature::new(geometry.clone())
            .with_attribute("directory", "stale")
            .with_attribute("run", AttributeValue::Integer(1))
            .with_attribute("name", "parcel"),
    ];

    enrich(&mut features, "A", &run());

    assert_eq!(text_attr(&features[0], "directory"), Some("A"));
    assert_eq!(text_attr(&features[0], "run"), Some("170518"));
    assert_eq!(text_attr(&features[0], "name"), Some("parcel"));
    assert_eq!(features[0].geometry, geometry);
    assert_eq!(features[0].attributes.len(), 3);
}

#[test]
fn empty_batch_is_untouched() {
    let mut features: Vec<Feature> = Vec::new();
    enrich(&mut features, "A", &run());
    assert!(features.is_empty());
}
