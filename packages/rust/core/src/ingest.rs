//! Per-folder course ingest: outline, descriptor, remote id lookup, assembly.

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use seeder_markdown::{parse_descriptor, parse_outline};
use seeder_remote::CourseApi;
use seeder_shared::{Course, CurriculumConfig, SeederError};

use crate::assembler::{DroppedExercise, ExerciseAssembler};
use crate::catalog::read_text;

/// Everything a folder ingest needs.
pub struct IngestContext<'a> {
    pub config: &'a CurriculumConfig,
    pub assembler: &'a ExerciseAssembler,
    /// `None` skips the descriptor lookup (dry run).
    pub api: Option<&'a dyn CourseApi>,
}

/// A folder that produced no course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FolderIssue {
    pub folder: String,
    pub reason: String,
}

/// Result of ingesting one folder.
#[derive(Debug)]
pub enum FolderOutcome {
    Loaded {
        course: Course,
        dropped: Vec<DroppedExercise>,
    },
    /// A required file is missing.
    Skipped(FolderIssue),
    /// The descriptor is malformed, a file is unreadable, or the lookup failed.
    Failed(FolderIssue),
}

impl FolderOutcome {
    fn from_error(folder: &str, err: SeederError) -> Self {
        let issue = FolderIssue {
            folder: folder.to_string(),
            reason: err.to_string(),
        };
        if err.is_not_found() {
            info!(folder, reason = %issue.reason, "skipping course folder");
            Self::Skipped(issue)
        } else {
            warn!(folder, reason = %issue.reason, "course folder failed");
            Self::Failed(issue)
        }
    }
}

/// Ingest one course folder.
///
/// The outline must exist before the descriptor is read. When an API is
/// given, the descriptor's `id` is resolved by name; exercises are then
/// assembled with that id.
#[instrument(skip_all, fields(folder = %folder))]
pub async fn ingest_folder(folder: String, ctx: &IngestContext<'_>) -> FolderOutcome {
    let dir = ctx.assembler.options().root.join(&folder);

    let outline = match read_text(&dir.join(&ctx.config.outline_file)).await {
        Ok(outline) => outline,
        Err(e) => return FolderOutcome::from_error(&folder, e),
    };

    let descriptor = match read_text(&dir.join(&ctx.config.descriptor_file)).await {
        Ok(text) => parse_descriptor(&text, &ctx.config.default_logo),
        Err(e) => Err(e),
    };
    let mut descriptor = match descriptor {
        Ok(descriptor) => descriptor,
        Err(e) => return FolderOutcome::from_error(&folder, e),
    };

    if let Some(api) = ctx.api {
        match api.find_course_id(&descriptor.name).await {
            Ok(id) => descriptor.id = id,
            Err(e) => {
                let err = SeederError::Remote(format!(
                    "lookup of course '{}' failed: {e}",
                    descriptor.name
                ));
                return FolderOutcome::from_error(&folder, err);
            }
        }
    }

    let refs = parse_outline(&outline);
    debug!(name = %descriptor.name, id = ?descriptor.id, refs = refs.len(), "outline parsed");

    let assembly = ctx.assembler.assemble(&folder, &refs, descriptor.id).await;

    FolderOutcome::Loaded {
        course: Course {
            descriptor,
            exercises: assembly.entries,
        },
        dropped: assembly.dropped,
    }
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use seeder_shared::CourseId;

    use super::*;
    use crate::assembler::AssembleOptions;
    use crate::testing::RecordingApi;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("seeder-ingest-test-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    async fn ingest(root: &Path, folder: &str, api: Option<&dyn CourseApi>) -> FolderOutcome {
        let config = CurriculumConfig::default();
        let assembler = ExerciseAssembler::new(AssembleOptions::new(root, &config));
        let ctx = IngestContext {
            config: &config,
            assembler: &assembler,
            api,
        };
        ingest_folder(folder.to_string(), &ctx).await
    }

    #[tokio::test]
    async fn loads_course_with_resolved_id() {
        let root = temp_dir();
        write(&root, "python/index.md", "- intro.md\n");
        write(&root, "python/info.md", "name: Python\n");
        write(&root, "python/intro.md", "# Intro\n");

        let api = RecordingApi::default().with_course("Python", CourseId(8));
        let FolderOutcome::Loaded { course, dropped } = ingest(&root, "python", Some(&api)).await
        else {
            panic!("expected a loaded course");
        };

        assert!(dropped.is_empty());
        assert_eq!(course.descriptor.id, Some(CourseId(8)));
        assert_eq!(course.exercises[0].exercises()[0].course_id, Some(CourseId(8)));
        assert_eq!(api.course_lookups(), vec!["Python"]);

        std::fs::remove_dir_all(&root).ok();
    }

    #[tokio::test]
    async fn missing_outline_skips_before_descriptor() {
        let root = temp_dir();
        write(&root, "drafts/info.md", "name: Drafts\n");

        let api = RecordingApi::default();
        let outcome = ingest(&root, "drafts", Some(&api)).await;
        assert!(matches!(outcome, FolderOutcome::Skipped(ref issue) if issue.folder == "drafts"));
        assert!(api.course_lookups().is_empty());

        std::fs::remove_dir_all(&root).ok();
    }

    #[tokio::test]
    async fn missing_descriptor_skips_course() {
        let root = temp_dir();
        write(&root, "python/index.md", "- intro.md\n");

        let outcome = ingest(&root, "python", None).await;
        assert!(matches!(outcome, FolderOutcome::Skipped(_)));

        std::fs::remove_dir_all(&root).ok();
    }

    #[tokio::test]
    async fn descriptor_without_name_fails_course() {
        let root = temp_dir();
        write(&root, "python/index.md", "- intro.md\n");
        write(&root, "python/info.md", "logo: http://x/y.png\n");

        let outcome = ingest(&root, "python", None).await;
        assert!(matches!(outcome, FolderOutcome::Failed(_)));

        std::fs::remove_dir_all(&root).ok();
    }

    #[tokio::test]
    async fn lookup_failure_fails_course() {
        let root = temp_dir();
        write(&root, "python/index.md", "- intro.md\n");
        write(&root, "python/info.md", "name: Python\n");

        let api = RecordingApi::default().failing_lookups();
        let FolderOutcome::Failed(issue) = ingest(&root, "python", Some(&api)).await else {
            panic!("expected a failed folder");
        };
        assert!(issue.reason.contains("lookup of course 'Python' failed"));

        std::fs::remove_dir_all(&root).ok();
    }

    #[tokio::test]
    async fn dry_run_leaves_id_absent() {
        let root = temp_dir();
        write(&root, "python/index.md", "- intro.md\n");
        write(&root, "python/info.md", "name: Python\n");
        write(&root, "python/intro.md", "# Intro\n");

        let FolderOutcome::Loaded { course, .. } = ingest(&root, "python", None).await else {
            panic!("expected a loaded course");
        };
        assert_eq!(course.descriptor.id, None);
        assert_eq!(course.exercises[0].exercises()[0].course_id, None);

        std::fs::remove_dir_all(&root).ok();
    }
}
