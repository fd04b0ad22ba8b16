// Transformation directive serialization tests
//
// The directive travels to the backend as request-scoped processing
// options; these tests pin the wire shape, in particular that unset
// fields are absent rather than zero-valued.

use std::collections::HashMap;

use torii::directive::{Fit, TransformationDirective};
use torii::negotiate::OutputFormat;
use torii::presets::PresetCatalog;

fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn test_empty_directive_serializes_to_empty_object() {
    let directive = TransformationDirective::default();
    let json = serde_json::to_value(&directive).expect("Failed to serialize directive");
    assert_eq!(json, serde_json::json!({}));
}

#[test]
fn test_full_directive_field_rendering() {
    let directive = TransformationDirective {
        fit: Some(Fit::ScaleDown),
        width: Some(640),
        height: Some(640),
        quality: Some(75),
        format: Some(OutputFormat::Avif),
    };
    let json = serde_json::to_value(&directive).expect("Failed to serialize directive");
    assert_eq!(
        json,
        serde_json::json!({
            "fit": "scale-down",
            "width": 640,
            "height": 640,
            "quality": 75,
            "format": "avif"
        })
    );
}

#[test]
fn test_partial_directive_omits_only_unset_fields() {
    let catalog = PresetCatalog::default();
    let directive =
        TransformationDirective::build(&params(&[("quality", "90")]), &catalog, None);

    let json = serde_json::to_value(&directive).expect("Failed to serialize directive");
    assert_eq!(json, serde_json::json!({ "quality": 90 }));
}

#[test]
fn test_unrecognized_fit_token_serialized_verbatim() {
    let catalog = PresetCatalog::default();
    let directive =
        TransformationDirective::build(&params(&[("fit", "squish")]), &catalog, None);

    let json = serde_json::to_value(&directive).expect("Failed to serialize directive");
    assert_eq!(json, serde_json::json!({ "fit": "squish" }));
}

#[test]
fn test_negotiated_webp_rendering() {
    let catalog = PresetCatalog::default();
    let directive = TransformationDirective::build(
        &params(&[]),
        &catalog,
        Some(OutputFormat::Webp),
    );

    let json = serde_json::to_value(&directive).expect("Failed to serialize directive");
    assert_eq!(json, serde_json::json!({ "format": "webp" }));
}

#[test]
fn test_negative_quality_passed_through() {
    // Range validation belongs to the backend; the gateway only requires
    // a parseable base-10 integer.
    let catalog = PresetCatalog::default();
    let directive =
        TransformationDirective::build(&params(&[("quality", "-5")]), &catalog, None);

    assert_eq!(directive.quality, Some(-5));
}
