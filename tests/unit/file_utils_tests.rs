/*!
 * Tests for file utility functions
 */

use std::path::{Path, PathBuf};
use annoclip::file_utils::FileManager;
use crate::common;

#[test]
fn test_find_files_withNestedExports_shouldReturnSortedMatches() {
    let temp_dir = common::create_temp_dir().unwrap();
    let nested = temp_dir.path().join("day2");
    FileManager::ensure_dir(&nested).unwrap();

    common::create_test_file(temp_dir.path(), "b.csv", "").unwrap();
    common::create_test_file(temp_dir.path(), "a.CSV", "").unwrap();
    common::create_test_file(temp_dir.path(), "notes.txt", "").unwrap();
    common::create_test_file(&nested, "c.csv", "").unwrap();

    let found = FileManager::find_files(temp_dir.path(), ".csv").unwrap();
    let names: Vec<String> = found
        .iter()
        .map(|p| p.strip_prefix(temp_dir.path()).unwrap().to_string_lossy().to_string())
        .collect();
    assert_eq!(names, vec!["a.CSV", "b.csv", "day2/c.csv"]);
}

#[test]
fn test_write_to_file_withMissingParent_shouldCreateIt() {
    let temp_dir = common::create_temp_dir().unwrap();
    let path = temp_dir.path().join("x").join("y").join("report.json");

    FileManager::write_to_file(&path, "{}").unwrap();
    assert_eq!(FileManager::read_to_string(&path).unwrap(), "{}");
    assert!(FileManager::file_exists(&path));
    assert!(FileManager::dir_exists(temp_dir.path().join("x")));
}

#[test]
fn test_resolve_against_shouldOnlyJoinRelativePaths() {
    assert_eq!(
        FileManager::resolve_against("clip.mp4", "/data/videos"),
        PathBuf::from("/data/videos/clip.mp4")
    );
    assert_eq!(
        FileManager::resolve_against("/abs/clip.mp4", "/data/videos"),
        PathBuf::from("/abs/clip.mp4")
    );
}

#[test]
fn test_remove_if_exists_withMissingFile_shouldSucceed() {
    let temp_dir = common::create_temp_dir().unwrap();
    let path = common::create_test_file(temp_dir.path(), "a.part", "x").unwrap();

    FileManager::remove_if_exists(&path).unwrap();
    assert!(!path.exists());
    FileManager::remove_if_exists(&path).unwrap();
    FileManager::remove_if_exists(Path::new("/definitely/not/here.part")).unwrap();
}

#[test]
fn test_read_to_string_withMissingFile_shouldFail() {
    assert!(FileManager::read_to_string("/definitely/not/here.csv").is_err());
}
