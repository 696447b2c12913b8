//! Core domain types for the course/exercise graph.

use std::collections::BTreeMap;

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

/// Logo used when a descriptor file does not name one.
pub const DEFAULT_LOGO_URL: &str = "http://navgurukul.org/img/sqlogo.jpg";

/// Longest exercise name accepted by the content service.
pub const MAX_EXERCISE_NAME_LEN: usize = 100;

/// Fence language that marks a quiz block.
pub const FAQ_LANGUAGE: &str = "faq";

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Identifier assigned to a course by the content service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CourseId(pub i64);

impl std::fmt::Display for CourseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier assigned to an exercise by the content service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExerciseId(pub i64);

impl std::fmt::Display for ExerciseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// CourseDescriptor
// ---------------------------------------------------------------------------

/// Course metadata parsed from a folder's descriptor file.
///
/// `id` is only ever set from the content service (lookup by name or the
/// response of a create call), never invented locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseDescriptor {
    /// Natural key used for the remote lookup.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<CourseId>,
    pub logo: String,
    /// Every other `key: value` pair from the descriptor.
    #[serde(flatten)]
    pub metadata: BTreeMap<String, String>,
}

// ---------------------------------------------------------------------------
// ExerciseFileRef
// ---------------------------------------------------------------------------

/// One entry of a course outline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExerciseFileRef {
    /// Markdown file, or the directory holding the child files.
    pub file_name: String,
    /// Child file names, empty for a leaf exercise.
    pub child_exercise: Vec<String>,
}

impl ExerciseFileRef {
    pub fn leaf(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            child_exercise: Vec::new(),
        }
    }

    pub fn group(file_name: impl Into<String>, children: Vec<String>) -> Self {
        Self {
            file_name: file_name.into(),
            child_exercise: children,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.child_exercise.is_empty()
    }
}

// ---------------------------------------------------------------------------
// ContentBlock
// ---------------------------------------------------------------------------

/// A quiz question parsed from a `faq` fence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Faq {
    pub question: String,
    pub options: Vec<String>,
    pub answer_key: String,
    pub explanation: String,
}

/// One classified unit of an exercise document.
///
/// Serializes as `{"type": ..., "value": ...}`. A code block's `type` is its
/// language tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentBlock {
    Markdown(String),
    Code { language: String, code: String },
    Youtube(String),
    Faq(Faq),
}

impl ContentBlock {
    /// Text blocks with no payload are dropped from the final sequence.
    ///
    /// Code and faq values are structured, so they are kept even when their
    /// fields are empty (an empty starter fence is still an exercise block).
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Markdown(text) | Self::Youtube(text) => text.is_empty(),
            Self::Code { .. } | Self::Faq(_) => false,
        }
    }

    /// Short kind name, used in logs and tests.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Markdown(_) => "markdown",
            Self::Code { .. } => "code",
            Self::Youtube(_) => "youtube",
            Self::Faq(_) => "faq",
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CodeValue<'a> {
    code: &'a str,
    test_cases: &'a [serde_json::Value],
}

impl Serialize for ContentBlock {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ContentBlock", 2)?;
        match self {
            Self::Markdown(text) => {
                state.serialize_field("type", "markdown")?;
                state.serialize_field("value", text)?;
            }
            Self::Code { language, code } => {
                state.serialize_field("type", language)?;
                state.serialize_field(
                    "value",
                    &CodeValue {
                        code,
                        test_cases: &[],
                    },
                )?;
            }
            Self::Youtube(id) => {
                state.serialize_field("type", "youtube")?;
                state.serialize_field("value", id)?;
            }
            Self::Faq(faq) => {
                state.serialize_field("type", FAQ_LANGUAGE)?;
                state.serialize_field("value", faq)?;
            }
        }
        state.end()
    }
}

/// The envelope stored in [`Exercise::content`].
#[derive(Debug, Clone, Serialize)]
pub struct ExerciseContent {
    pub lang: String,
    pub exercise: Vec<ContentBlock>,
}

impl ExerciseContent {
    /// Serialize to the JSON string sent to the content service.
    pub fn to_json(&self) -> crate::Result<String> {
        serde_json::to_string(self)
            .map_err(|e| crate::SeederError::parse(format!("content serialization failed: {e}")))
    }
}

// ---------------------------------------------------------------------------
// Exercise
// ---------------------------------------------------------------------------

/// An exercise as sent to the content service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    /// Remote id resolved by slug, absent for exercises not yet stored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ExerciseId>,
    pub name: String,
    pub course_id: Option<CourseId>,
    /// Serialized [`ExerciseContent`].
    pub content: String,
    pub slug: String,
    pub github_link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submission_type: Option<String>,
}

/// An outline entry after assembly: a leaf exercise or a group of children.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExerciseEntry {
    Single(Exercise),
    Group {
        file_name: String,
        children: Vec<Exercise>,
    },
}

impl ExerciseEntry {
    /// Every exercise in this entry (one for a leaf, each child for a group).
    pub fn exercises(&self) -> &[Exercise] {
        match self {
            Self::Single(exercise) => std::slice::from_ref(exercise),
            Self::Group { children, .. } => children,
        }
    }

    pub fn exercises_mut(&mut self) -> &mut [Exercise] {
        match self {
            Self::Single(exercise) => std::slice::from_mut(exercise),
            Self::Group { children, .. } => children,
        }
    }
}

// ---------------------------------------------------------------------------
// Course
// ---------------------------------------------------------------------------

/// A course folder after parsing: descriptor plus its outline entries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Course {
    pub descriptor: CourseDescriptor,
    pub exercises: Vec<ExerciseEntry>,
}

impl Course {
    /// Record a remote-assigned id on the descriptor and on every exercise
    /// (children included) that does not already carry one.
    pub fn assign_course_id(&mut self, id: CourseId) {
        self.descriptor.id = Some(id);
        for exercise in self.exercises.iter_mut().flat_map(|e| e.exercises_mut()) {
            if exercise.course_id.is_none() {
                exercise.course_id = Some(id);
            }
        }
    }

    /// Total exercises, counting each child separately.
    pub fn exercise_count(&self) -> usize {
        self.exercises.iter().map(|e| e.exercises().len()).sum()
    }
}
