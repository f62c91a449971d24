/*!
 * Common test utilities for the annoclip test suite
 */

use std::path::{Path, PathBuf};
use std::fs;
use anyhow::Result;
use tempfile::TempDir;

/// Attribute dictionary used by the sample export
pub const SAMPLE_ATTRIBUTES: &str = r#"{"1":{"aname":"TEMPORAL-SEGMENTS","anchor_id":"FILE1_Z2_XY0","type":4,"desc":"Temporal segment attribute added by default","options":{"default":"Default"},"default_option_id":""},"2":{"aname":"G:HandShape","anchor_id":"FILE1_Z2_XY0","type":4,"desc":"","options":{"0":"Fist","1":"Open Palm"},"default_option_id":""},"3":{"aname":"MP:Verb","anchor_id":"FILE1_Z2_XY0","type":4,"desc":"","options":{"0":"Push","1":"Pull"},"default_option_id":""},"4":{"aname":"MP:Target","anchor_id":"FILE1_Z2_XY0","type":4,"desc":"","options":{"0":"Box","1":"Door"},"default_option_id":""},"5":{"aname":"G:Motion Path","anchor_id":"FILE1_Z2_XY0","type":4,"desc":"","options":{"0":"Circle"},"default_option_id":""}}"#;

/// Data rows of the sample export (with a comment and a blank line mixed in)
pub const SAMPLE_ROWS: &[&str] = &[
    r#""1_a","[""session.mp4""]",0,"[1.0,2.5]","[]","{""2"":""0""}""#,
    r#""1_b","[""session.mp4""]",0,"[3,4]","[]","{""3"":""0"",""4"":""0""}""#,
    "# reviewer note: row below only carries the default attribute",
    r#""1_c","[""session.mp4""]",0,"[5.0,6.0]","[]","{""1"":""default""}""#,
    "",
    r#""1_d","[""other.mp4""]",0,"[7.0,8.5]","[]","{""3"":""1"",""2"":""1"",""5"":""0""}""#,
];

/// The nine informational/header lines that precede the CSV header comment
pub fn header_lines(attribute_json: &str) -> Vec<String> {
    vec![
        "# Exported using VGG Image Annotator (http://www.robots.ox.ac.uk/~vgg/software/via)".to_string(),
        "# Notes:".to_string(),
        "# - spatial_coordinates of [2,10,20,50,80] denotes a rectangle (shape_id=2) of size 50x80 placed at (10,20)".to_string(),
        "# - temporal coordinate of [1.349,2.741] denotes a temporal segment from time 1.349 sec. to 2.741 sec.".to_string(),
        "# - temporal coordinate of [4.351] denotes a still video frame at 4.351 sec.".to_string(),
        r#"# - metadata of {""1"":""3""} indicates attribute with id "1" set to an attribute option with id "3""#.to_string(),
        r#"# SHAPE_ID = {"POINT":1,"RECTANGLE":2,"CIRCLE":3,"ELLIPSE":4,"LINE":5,"POLYLINE":6,"POLYGON":7}"#.to_string(),
        r#"# FLAG_ID = {"RESERVED_FOR_FUTURE":1}"#.to_string(),
        format!("# ATTRIBUTE = {}", attribute_json),
        "# CSV_HEADER = metadata_id,file_list,flags,temporal_coordinates,spatial_coordinates,metadata".to_string(),
    ]
}

/// Build an export from an attribute payload and data rows
pub fn build_export(attribute_json: &str, rows: &[&str]) -> String {
    let mut lines = header_lines(attribute_json);
    lines.extend(rows.iter().map(|r| r.to_string()));
    lines.join("\n") + "\n"
}

/// The sample export used across tests
pub fn sample_export() -> String {
    build_export(SAMPLE_ATTRIBUTES, SAMPLE_ROWS)
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Writes the sample export plus placeholder source videos into `dir`
pub fn create_sample_workspace(dir: &Path) -> Result<PathBuf> {
    create_test_file(dir, "session.mp4", "fake video")?;
    create_test_file(dir, "other.mp4", "fake video")?;
    create_test_file(dir, "session_annotations.csv", &sample_export())
}

/// Initialise logging for a test run; repeated calls are harmless
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
