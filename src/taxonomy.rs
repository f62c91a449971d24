use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use log::debug;

use crate::annotation::AttributeDictionary;
use crate::errors::ExportError;
use crate::file_utils::FileManager;

// @module: Category taxonomy derived from attribute naming conventions

/// Name prefix of gesture attributes
pub const GESTURE_PREFIX: &str = "G:";
/// Name prefix of motion primitive attributes
pub const MOTION_PRIMITIVE_PREFIX: &str = "MP:";

/// Folder name used when an attribute name sanitizes to nothing usable
pub const PLACEHOLDER_NAME: &str = "_";

// @const: Characters that may not appear in a folder or file name fragment
static UNSAFE_NAME_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s/\\]").unwrap());

/// Taxonomy bucket of an attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Gesture,
    MotionPrimitive,
    Ignored,
}

impl Category {
    /// Classify an attribute by its name prefix
    pub fn classify(name: &str) -> Self {
        if name.starts_with(GESTURE_PREFIX) {
            Category::Gesture
        } else if name.starts_with(MOTION_PRIMITIVE_PREFIX) {
            Category::MotionPrimitive
        } else {
            Category::Ignored
        }
    }

    /// Top-level output folder; `None` for ignored attributes
    pub fn folder_name(&self) -> Option<&'static str> {
        match self {
            Category::Gesture => Some("Gestures"),
            Category::MotionPrimitive => Some("MPs"),
            Category::Ignored => None,
        }
    }

    fn prefix(&self) -> &'static str {
        match self {
            Category::Gesture => GESTURE_PREFIX,
            Category::MotionPrimitive => MOTION_PRIMITIVE_PREFIX,
            Category::Ignored => "",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Gesture => write!(f, "gesture"),
            Category::MotionPrimitive => write!(f, "motion primitive"),
            Category::Ignored => write!(f, "ignored"),
        }
    }
}

/// Sub-role of a motion primitive attribute, inferred from its name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionRole {
    Verb,
    Target,
    Other,
}

impl MotionRole {
    pub fn infer(name: &str) -> Self {
        if name.contains("Verb") {
            MotionRole::Verb
        } else if name.contains("Target") {
            MotionRole::Target
        } else {
            MotionRole::Other
        }
    }
}

/// Replace whitespace and path separators with `_`
pub fn sanitize_label(label: &str) -> String {
    UNSAFE_NAME_CHARS.replace_all(label.trim(), "_").into_owned()
}

/// Folder-safe attribute name: category prefix and `:` removed, then sanitized.
///
/// Names that would not form a real path component (empty, `.`, `..`) become
/// [`PLACEHOLDER_NAME`].
pub fn sanitize_attribute_name(name: &str) -> String {
    let category = Category::classify(name);
    let bare = name.strip_prefix(category.prefix()).unwrap_or(name);
    let sanitized = sanitize_label(&bare.replace(':', ""));
    match sanitized.as_str() {
        "" | "." | ".." => PLACEHOLDER_NAME.to_string(),
        _ => sanitized,
    }
}

// @struct: Precomputed placement of one categorized attribute
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedAttribute {
    pub category: Category,
    pub sanitized_name: String,
    pub role: MotionRole,
    pub folder: PathBuf,
}

/// Attribute id -> category and output folder, built once per run
#[derive(Debug, Clone)]
pub struct CategoryIndex {
    base_dir: PathBuf,
    entries: HashMap<String, ResolvedAttribute>,
}

impl CategoryIndex {
    /// Classify every attribute of the dictionary; ignored attributes are left out
    pub fn build<P: AsRef<Path>>(attributes: &AttributeDictionary, base_dir: P) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();
        let mut entries = HashMap::new();

        for (id, attribute) in attributes {
            let category = Category::classify(&attribute.name);
            let Some(category_folder) = category.folder_name() else {
                debug!("Ignoring attribute {} ({})", id, attribute.name);
                continue;
            };
            let sanitized_name = sanitize_attribute_name(&attribute.name);
            let folder = base_dir.join(category_folder).join(&sanitized_name);
            let role = if category == Category::MotionPrimitive {
                MotionRole::infer(&attribute.name)
            } else {
                MotionRole::Other
            };

            entries.insert(
                id.clone(),
                ResolvedAttribute {
                    category,
                    sanitized_name,
                    role,
                    folder,
                },
            );
        }

        Self { base_dir, entries }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn get(&self, attribute_id: &str) -> Option<&ResolvedAttribute> {
        self.entries.get(attribute_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Distinct folders in sorted order
    pub fn folders(&self) -> Vec<&Path> {
        let mut folders: Vec<&Path> = self.entries.values().map(|e| e.folder.as_path()).collect();
        folders.sort();
        folders.dedup();
        folders
    }

    /// Create every category folder; safe to repeat across runs
    pub fn prepare_folders(&self) -> Result<(), ExportError> {
        for folder in self.folders() {
            FileManager::ensure_dir(folder).map_err(|e| ExportError::OutputFolder {
                path: folder.to_path_buf(),
                reason: format!("{:#}", e),
            })?;
        }
        debug!("Prepared {} output folders under {:?}", self.folders().len(), self.base_dir);
        Ok(())
    }
}
