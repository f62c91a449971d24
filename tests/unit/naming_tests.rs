/*!
 * Tests for clip naming and folder precedence
 */

use std::path::Path;
use annoclip::annotation::{Annotation, AttributeDictionary, ExportDocument, ExportLayout, Segment};
use annoclip::errors::SegmentError;
use annoclip::naming::{FolderPrecedence, SegmentNamer};
use annoclip::taxonomy::{Category, CategoryIndex};
use crate::common;

fn sample() -> (AttributeDictionary, Vec<Segment>) {
    let document = ExportDocument::new(common::sample_export(), ExportLayout::default());
    (document.attributes().unwrap(), document.collect_segments().unwrap())
}

fn segment_with(row: usize, annotations: Vec<Annotation>) -> Segment {
    Segment {
        row,
        line: row + 10,
        video_file: "session.mp4".to_string(),
        start_sec: 0.0,
        end_sec: 1.0,
        annotations,
    }
}

#[test]
fn test_resolve_withGestureRow_shouldNameAfterAttributeAndOption() {
    let (attributes, segments) = sample();
    let index = CategoryIndex::build(&attributes, "out");
    let namer = SegmentNamer::new(&attributes, &index, FolderPrecedence::GestureFirst);

    let output = namer.resolve(&segments[0]).unwrap();
    assert_eq!(output.category, Category::Gesture);
    assert_eq!(output.filename, "segment_1__HandShape_Fist.mp4");
    assert_eq!(output.path(), Path::new("out/Gestures/HandShape/segment_1__HandShape_Fist.mp4"));
    assert_eq!(
        output.relative_to(Path::new("out")),
        Path::new("Gestures/HandShape/segment_1__HandShape_Fist.mp4")
    );
}

#[test]
fn test_resolve_withVerbAndTarget_shouldBuildMotionFragment() {
    let (attributes, segments) = sample();
    let index = CategoryIndex::build(&attributes, "out");
    let namer = SegmentNamer::new(&attributes, &index, FolderPrecedence::GestureFirst);

    let output = namer.resolve(&segments[1]).unwrap();
    assert_eq!(output.category, Category::MotionPrimitive);
    assert_eq!(output.filename, "segment_2__MP_Push_TO_Box.mp4");
    assert_eq!(output.folder, Path::new("out/MPs/Verb"));
}

#[test]
fn test_resolve_withOnlyIgnoredAttribute_shouldBeUnresolved() {
    let (attributes, segments) = sample();
    let index = CategoryIndex::build(&attributes, "out");
    let namer = SegmentNamer::new(&attributes, &index, FolderPrecedence::GestureFirst);

    assert_eq!(namer.resolve(&segments[2]), Err(SegmentError::UnresolvedCategory));
    assert_eq!(
        namer.resolve(&segment_with(9, vec![])),
        Err(SegmentError::UnresolvedCategory)
    );
}

#[test]
fn test_resolve_withMixedRow_shouldOrderGesturesBeforeMotion() {
    let (attributes, segments) = sample();
    let index = CategoryIndex::build(&attributes, "out");
    let namer = SegmentNamer::new(&attributes, &index, FolderPrecedence::GestureFirst);

    let output = namer.resolve(&segments[3]).unwrap();
    assert_eq!(
        output.filename,
        "segment_4__HandShape_Open_Palm__Motion_Path_Circle__MP_Pull_TO_.mp4"
    );
    assert_eq!(output.folder, Path::new("out/Gestures/HandShape"));
}

#[test]
fn test_resolve_withPrecedenceVariants_shouldOnlyChangeFolder() {
    let (attributes, segments) = sample();
    let index = CategoryIndex::build(&attributes, "out");
    let mixed = &segments[3];

    let motion_first = SegmentNamer::new(&attributes, &index, FolderPrecedence::MotionPrimitiveFirst)
        .resolve(mixed)
        .unwrap();
    let first_annotation = SegmentNamer::new(&attributes, &index, FolderPrecedence::FirstAnnotation)
        .resolve(mixed)
        .unwrap();
    let gesture_first = SegmentNamer::new(&attributes, &index, FolderPrecedence::GestureFirst)
        .resolve(mixed)
        .unwrap();

    assert_eq!(motion_first.folder, Path::new("out/MPs/Verb"));
    assert_eq!(first_annotation.folder, Path::new("out/MPs/Verb"));
    assert_eq!(first_annotation.category, Category::MotionPrimitive);
    assert_eq!(motion_first.filename, gesture_first.filename);
}

#[test]
fn test_resolve_withMultipleVerbsAndTargets_shouldJoinWithDash() {
    let (attributes, _) = sample();
    let index = CategoryIndex::build(&attributes, "out");
    let namer = SegmentNamer::new(&attributes, &index, FolderPrecedence::GestureFirst);

    let segment = segment_with(
        5,
        vec![
            Annotation::new("4", "1"),
            Annotation::new("3", "0"),
            Annotation::new("3", "1"),
            Annotation::new("4", "0"),
        ],
    );
    let output = namer.resolve(&segment).unwrap();
    assert_eq!(output.filename, "segment_5__MP_Push-Pull_TO_Door-Box.mp4");
    // First motion annotation was the target
    assert_eq!(output.folder, Path::new("out/MPs/Target"));
}

#[test]
fn test_option_label_withUnknownOption_shouldUsePlaceholder() {
    let (attributes, _) = sample();
    let index = CategoryIndex::build(&attributes, "out");
    let namer = SegmentNamer::new(&attributes, &index, FolderPrecedence::GestureFirst);

    assert_eq!(namer.option_label("2", "1"), "Open Palm");
    assert_eq!(namer.option_label("2", "7"), "option_7");
    assert_eq!(namer.option_label("99", "0"), "option_0");

    let output = namer.resolve(&segment_with(6, vec![Annotation::new("2", "7")])).unwrap();
    assert_eq!(output.filename, "segment_6__HandShape_option_7.mp4");
}

#[test]
fn test_resolve_withRepeatedAttributeInRow_shouldEmitSingleFragment() {
    let (attributes, _) = sample();
    let index = CategoryIndex::build(&attributes, "out");
    let namer = SegmentNamer::new(&attributes, &index, FolderPrecedence::GestureFirst);

    let line = r#""m1","[""session.mp4""]",0,"[1,2]","[]","{""2"":""0"",""2"":""1""}""#;
    let segment = Segment::parse_row(line, 8, 18).unwrap();
    let output = namer.resolve(&segment).unwrap();
    assert_eq!(output.filename, "segment_8__HandShape_Open_Palm.mp4");
}

#[test]
fn test_resolve_withUnknownAttributeId_shouldIgnoreIt() {
    let (attributes, _) = sample();
    let index = CategoryIndex::build(&attributes, "out");
    let namer = SegmentNamer::new(&attributes, &index, FolderPrecedence::GestureFirst);

    let output = namer
        .resolve(&segment_with(7, vec![Annotation::new("42", "0"), Annotation::new("2", "0")]))
        .unwrap();
    assert_eq!(output.filename, "segment_7__HandShape_Fist.mp4");
}

#[test]
fn test_folder_precedence_serde_shouldUseSnakeCase() {
    let json = serde_json::to_string(&FolderPrecedence::MotionPrimitiveFirst).unwrap();
    assert_eq!(json, "\"motion_primitive_first\"");
    let parsed: FolderPrecedence = serde_json::from_str("\"first_annotation\"").unwrap();
    assert_eq!(parsed, FolderPrecedence::FirstAnnotation);
    assert_eq!(FolderPrecedence::default(), FolderPrecedence::GestureFirst);
}
