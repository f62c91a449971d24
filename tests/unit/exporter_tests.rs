/*!
 * Tests for single segment export
 */

use std::path::{Path, PathBuf};
use annoclip::annotation::{Annotation, Segment};
use annoclip::errors::{SegmentError, VideoError};
use annoclip::exporter::{ExportOutcome, SegmentExporter};
use annoclip::naming::ResolvedOutput;
use annoclip::taxonomy::Category;
use annoclip::video::mock::EngineCall;
use annoclip::video::{EncodingSettings, MockEngine};
use crate::common;

fn segment(video_file: &str) -> Segment {
    Segment {
        row: 1,
        line: 11,
        video_file: video_file.to_string(),
        start_sec: 1.0,
        end_sec: 2.5,
        annotations: vec![Annotation::new("2", "0")],
    }
}

fn output_in(dir: &Path) -> ResolvedOutput {
    let folder = dir.join("Gestures").join("HandShape");
    std::fs::create_dir_all(&folder).unwrap();
    ResolvedOutput {
        category: Category::Gesture,
        folder,
        filename: "segment_1__HandShape_Fist.mp4".to_string(),
    }
}

fn exporter(engine: MockEngine, video_root: PathBuf, skip_existing: bool) -> SegmentExporter<MockEngine> {
    SegmentExporter::new(engine, EncodingSettings::default(), video_root, skip_existing)
}

#[tokio::test]
async fn test_export_withWorkingEngine_shouldWriteClipAndReleaseHandles() {
    let temp_dir = common::create_temp_dir().unwrap();
    let engine = MockEngine::working();
    let exporter = exporter(engine.clone(), temp_dir.path().to_path_buf(), false);
    let output = output_in(temp_dir.path());

    let outcome = exporter.export(&segment("session.mp4"), &output).await.unwrap();

    assert_eq!(outcome, ExportOutcome::Written(output.path()));
    assert!(output.path().is_file());
    assert_eq!(engine.open_handles(), 0);

    let source = temp_dir.path().join("session.mp4");
    assert_eq!(
        engine.calls(),
        vec![
            EngineCall::Open(source.clone()),
            EngineCall::Extract {
                source: source.clone(),
                start_sec: 1.0,
                end_sec: 2.5,
            },
            EngineCall::Write {
                source: source.clone(),
                path: output.path(),
                fps: 30,
            },
            EngineCall::CloseClip(source.clone()),
            EngineCall::CloseSource(source),
        ]
    );
}

#[tokio::test]
async fn test_export_withAbsoluteVideoPath_shouldIgnoreVideoRoot() {
    let temp_dir = common::create_temp_dir().unwrap();
    let engine = MockEngine::working();
    let exporter = exporter(engine.clone(), PathBuf::from("/unused/root"), false);
    let absolute = temp_dir.path().join("abs.mp4");

    let seg = segment(&absolute.to_string_lossy());
    assert_eq!(exporter.source_path(&seg), absolute);

    exporter.export(&seg, &output_in(temp_dir.path())).await.unwrap();
    assert_eq!(engine.calls()[0], EngineCall::Open(absolute));
}

#[tokio::test]
async fn test_export_withFailingWrite_shouldReturnErrorAndReleaseHandles() {
    let temp_dir = common::create_temp_dir().unwrap();
    let engine = MockEngine::failing_write(&["session.mp4"]);
    let exporter = exporter(engine.clone(), temp_dir.path().to_path_buf(), false);
    let output = output_in(temp_dir.path());

    let err = exporter.export(&segment("session.mp4"), &output).await.unwrap_err();

    assert!(matches!(err, SegmentError::VideoExtraction(VideoError::Write { .. })));
    assert!(!output.path().exists());
    assert_eq!(engine.open_handles(), 0);
}

#[tokio::test]
async fn test_export_withFailingExtract_shouldCloseSource() {
    let temp_dir = common::create_temp_dir().unwrap();
    let engine = MockEngine::failing_extract(&["session.mp4"]);
    let exporter = exporter(engine.clone(), temp_dir.path().to_path_buf(), false);

    let err = exporter
        .export(&segment("session.mp4"), &output_in(temp_dir.path()))
        .await
        .unwrap_err();

    assert!(matches!(err, SegmentError::VideoExtraction(VideoError::Extract { .. })));
    assert_eq!(engine.open_handles(), 0);
    assert!(matches!(engine.calls().last(), Some(EngineCall::CloseSource(_))));
}

#[tokio::test]
async fn test_export_withFailingOpen_shouldRecordNothing() {
    let temp_dir = common::create_temp_dir().unwrap();
    let engine = MockEngine::failing_open(&["missing.mp4"]);
    let exporter = exporter(engine.clone(), temp_dir.path().to_path_buf(), false);

    let err = exporter
        .export(&segment("missing.mp4"), &output_in(temp_dir.path()))
        .await
        .unwrap_err();

    assert!(err.to_string().contains("mock open failure"));
    assert!(engine.calls().is_empty());
}

#[tokio::test]
async fn test_export_withExistingClip_shouldOverwriteByDefault() {
    let temp_dir = common::create_temp_dir().unwrap();
    let output = output_in(temp_dir.path());
    std::fs::write(output.path(), "earlier run").unwrap();

    let engine = MockEngine::working();
    let outcome = exporter(engine.clone(), temp_dir.path().to_path_buf(), false)
        .export(&segment("session.mp4"), &output)
        .await
        .unwrap();

    assert_eq!(outcome, ExportOutcome::Written(output.path()));
    let written = std::fs::read_to_string(output.path()).unwrap();
    assert!(written.contains("[1.000, 2.500)"));
    assert_eq!(engine.open_handles(), 0);
}

#[tokio::test]
async fn test_export_withSkipExisting_shouldKeepExistingClip() {
    let temp_dir = common::create_temp_dir().unwrap();
    let output = output_in(temp_dir.path());
    std::fs::write(output.path(), "earlier run").unwrap();

    let engine = MockEngine::working();
    let kept = exporter(engine.clone(), temp_dir.path().to_path_buf(), true)
        .export(&segment("session.mp4"), &output)
        .await
        .unwrap();

    assert_eq!(kept, ExportOutcome::AlreadyPresent(output.path()));
    assert!(engine.calls().is_empty());
    assert_eq!(std::fs::read_to_string(output.path()).unwrap(), "earlier run");

    // Nothing on disk yet: skip_existing still writes
    std::fs::remove_file(output.path()).unwrap();
    let written = exporter(engine.clone(), temp_dir.path().to_path_buf(), true)
        .export(&segment("session.mp4"), &output)
        .await
        .unwrap();
    assert_eq!(written, ExportOutcome::Written(output.path()));
}

#[test]
fn test_export_withBlockOn_shouldPassEncodingSettings() {
    let temp_dir = common::create_temp_dir().unwrap();
    let engine = MockEngine::working();
    let settings = EncodingSettings {
        fps: 25,
        video_codec: "libx265".to_string(),
        audio_codec: "opus".to_string(),
    };
    let exporter = SegmentExporter::new(engine.clone(), settings, temp_dir.path().to_path_buf(), false);
    let output = output_in(temp_dir.path());

    tokio_test::block_on(exporter.export(&segment("session.mp4"), &output)).unwrap();

    let written = std::fs::read_to_string(output.path()).unwrap();
    assert!(written.contains("libx265 opus"));
    assert!(engine
        .calls()
        .iter()
        .any(|call| matches!(call, EngineCall::Write { fps: 25, .. })));
}
