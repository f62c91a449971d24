/*!
 * Tests for attribute dictionary decoding
 */

use annoclip::annotation::{Attribute, AttributeDictionary, ExportDocument, ExportLayout};
use annoclip::errors::ExportError;
use crate::common;

#[test]
fn test_from_export_withSampleExport_shouldDecodeAllAttributes() {
    let export = common::sample_export();
    let attributes = AttributeDictionary::from_export(&export, 8).unwrap();

    assert_eq!(attributes.len(), 5);
    let hand_shape = attributes.get("2").unwrap();
    assert_eq!(hand_shape.name, "G:HandShape");
    assert_eq!(hand_shape.option_label("0"), Some("Fist"));
    assert_eq!(hand_shape.option_label("1"), Some("Open Palm"));
    assert_eq!(hand_shape.option_label("9"), None);
    assert_eq!(attributes.get("3").unwrap().name, "MP:Verb");
}

#[test]
fn test_parse_header_line_withoutPrefix_shouldFailAsMalformedHeader() {
    let err = AttributeDictionary::parse_header_line(r#"{"1":{"aname":"G:X","options":{}}}"#, 9).unwrap_err();
    match err {
        ExportError::MalformedHeader { line, reason } => {
            assert_eq!(line, 9);
            assert!(reason.contains("# ATTRIBUTE ="));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_parse_header_line_withInvalidJson_shouldFailAsMalformedHeader() {
    let err = AttributeDictionary::parse_header_line("# ATTRIBUTE = {\"1\": {\"aname\": ", 9).unwrap_err();
    assert!(matches!(err, ExportError::MalformedHeader { line: 9, .. }));
}

#[test]
fn test_parse_header_line_withWrongShape_shouldFailAsMalformedHeader() {
    // Attribute without a name
    let err = AttributeDictionary::parse_header_line(r#"# ATTRIBUTE = {"1":{"options":{}}}"#, 9).unwrap_err();
    assert!(matches!(err, ExportError::MalformedHeader { .. }));
}

#[test]
fn test_parse_header_line_withSurroundingWhitespace_shouldDecode() {
    let attributes = AttributeDictionary::parse_header_line(
        "  # ATTRIBUTE = {\"7\":{\"aname\":\"G:Grip\",\"options\":{\"a\":\"Pinch\"}}}  \r",
        9,
    )
    .unwrap();
    assert_eq!(attributes.get("7").unwrap().option_label("a"), Some("Pinch"));
}

#[test]
fn test_from_export_withShortFile_shouldFailAsMalformedHeader() {
    let err = AttributeDictionary::from_export("# one\n# two\n", 8).unwrap_err();
    match err {
        ExportError::MalformedHeader { line, reason } => {
            assert_eq!(line, 9);
            assert!(reason.contains("only 2 lines"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_to_json_withDecodedDictionary_shouldRoundTripEquivalent() {
    let export = common::sample_export();
    let decoded = AttributeDictionary::from_export(&export, 8).unwrap();

    let encoded = decoded.to_json().unwrap();
    let reparsed = AttributeDictionary::parse_header_line(&format!("# ATTRIBUTE = {}", encoded), 9).unwrap();
    assert_eq!(reparsed, decoded);

    // Extra fields survive the trip
    let original: serde_json::Value = serde_json::from_str(common::SAMPLE_ATTRIBUTES).unwrap();
    let reencoded: serde_json::Value = serde_json::from_str(&encoded).unwrap();
    assert_eq!(original, reencoded);
}

#[test]
fn test_export_document_withCustomLayout_shouldReadShiftedHeader() {
    let export = format!(
        "# only line before\n# ATTRIBUTE = {}\n# CSV_HEADER\n",
        common::SAMPLE_ATTRIBUTES
    );
    let layout = ExportLayout {
        attribute_line: 1,
        data_start_line: 3,
    };
    let document = ExportDocument::new(export, layout);
    assert_eq!(document.attributes().unwrap().len(), 5);
}

#[test]
fn test_dictionary_builder_withOptions_shouldCollect() {
    let dict: AttributeDictionary = vec![(
        "1".to_string(),
        Attribute::new("G:HandShape").with_option("0", "Fist"),
    )]
    .into_iter()
    .collect();
    assert_eq!(dict.get("1").unwrap().option_label("0"), Some("Fist"));
    assert!(!dict.is_empty());
}
