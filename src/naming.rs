/*!
 * Output naming for exported segments.
 *
 * A segment's filename is built from its decoded annotations:
 * - each gesture annotation contributes `<Attribute>_<Option>`
 * - motion primitive verbs and targets are grouped into a single
 *   `MP_<verb1-verb2>_TO_<target1-target2>` fragment
 *
 * The result is `segment_<row>__<fragment>__<fragment>.mp4`, where `row` is the
 * segment's 1-based position in the export. Names depend only on the export,
 * so repeated runs produce identical paths.
 */

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use log::debug;

use crate::annotation::{AttributeDictionary, Segment};
use crate::errors::SegmentError;
use crate::taxonomy::{sanitize_label, Category, CategoryIndex, MotionRole};

/// Extension of every exported clip
pub const CLIP_EXTENSION: &str = "mp4";

/// Which annotation decides a segment's destination folder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FolderPrecedence {
    /// First gesture annotation, falling back to the first motion primitive
    #[default]
    GestureFirst,
    /// First motion primitive annotation, falling back to the first gesture
    MotionPrimitiveFirst,
    /// Whichever categorized annotation appears first in the row
    FirstAnnotation,
}

/// Destination of one segment's clip
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedOutput {
    pub category: Category,
    pub folder: PathBuf,
    pub filename: String,
}

impl ResolvedOutput {
    pub fn path(&self) -> PathBuf {
        self.folder.join(&self.filename)
    }

    /// Path relative to the base output directory, for display
    pub fn relative_to(&self, base: &Path) -> PathBuf {
        let path = self.path();
        path.strip_prefix(base).map(Path::to_path_buf).unwrap_or(path)
    }
}

/// Builds filenames and picks folders for segments
pub struct SegmentNamer<'a> {
    attributes: &'a AttributeDictionary,
    index: &'a CategoryIndex,
    precedence: FolderPrecedence,
}

impl<'a> SegmentNamer<'a> {
    pub fn new(attributes: &'a AttributeDictionary, index: &'a CategoryIndex, precedence: FolderPrecedence) -> Self {
        Self {
            attributes,
            index,
            precedence,
        }
    }

    /// Label for an option id, or `option_<id>` when the attribute doesn't define it
    pub fn option_label(&self, attribute_id: &str, option_id: &str) -> String {
        self.attributes
            .get(attribute_id)
            .and_then(|attribute| attribute.option_label(option_id))
            .map(str::to_string)
            .unwrap_or_else(|| format!("option_{}", option_id))
    }

    /// Resolve the folder and filename of a segment
    pub fn resolve(&self, segment: &Segment) -> Result<ResolvedOutput, SegmentError> {
        let mut gesture_fragments = Vec::new();
        let mut verbs = Vec::new();
        let mut targets = Vec::new();
        let mut first_gesture = None;
        let mut first_motion = None;
        let mut first_any = None;

        for annotation in &segment.annotations {
            let Some(resolved) = self.index.get(&annotation.attribute_id) else {
                debug!(
                    "Segment {}: attribute {} is not categorized, ignoring",
                    segment.row, annotation.attribute_id
                );
                continue;
            };

            let label = sanitize_label(&self.option_label(&annotation.attribute_id, &annotation.option_id));
            match resolved.category {
                Category::Gesture => {
                    gesture_fragments.push(format!("{}_{}", resolved.sanitized_name, label));
                    first_gesture.get_or_insert(resolved);
                }
                Category::MotionPrimitive => {
                    match resolved.role {
                        MotionRole::Verb => verbs.push(label),
                        MotionRole::Target => targets.push(label),
                        MotionRole::Other => {}
                    }
                    first_motion.get_or_insert(resolved);
                }
                Category::Ignored => continue,
            }
            first_any.get_or_insert(resolved);
        }

        let mut fragments = gesture_fragments;
        if !verbs.is_empty() || !targets.is_empty() {
            fragments.push(format!("MP_{}_TO_{}", verbs.join("-"), targets.join("-")));
        }
        if fragments.is_empty() {
            return Err(SegmentError::UnresolvedCategory);
        }

        let destination = match self.precedence {
            FolderPrecedence::GestureFirst => first_gesture.or(first_motion),
            FolderPrecedence::MotionPrimitiveFirst => first_motion.or(first_gesture),
            FolderPrecedence::FirstAnnotation => first_any,
        }
        .ok_or(SegmentError::UnresolvedCategory)?;

        Ok(ResolvedOutput {
            category: destination.category,
            folder: destination.folder.clone(),
            filename: format!("segment_{}__{}.{}", segment.row, fragments.join("__"), CLIP_EXTENSION),
        })
    }
}
