//! End-to-end `seed` pipeline: list folders → ingest courses → reconcile.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{info, instrument};

use seeder_remote::CourseApi;
use seeder_shared::{AppConfig, Course, Result};

use crate::assembler::{AssembleOptions, DroppedExercise, ExerciseAssembler};
use crate::catalog::list_course_folders;
use crate::ingest::{FolderIssue, FolderOutcome, IngestContext, ingest_folder};
use crate::sync::{SyncEngine, SyncReport};

/// Courses parsed from a curriculum tree, before any sync.
#[derive(Debug, Default, Serialize)]
pub struct Curriculum {
    pub courses: Vec<Course>,
    /// Folders without an outline or descriptor.
    pub skipped: Vec<FolderIssue>,
    /// Folders whose descriptor or lookup failed.
    pub failed: Vec<FolderIssue>,
    /// Exercise files left out of their course.
    pub dropped: Vec<DroppedExercise>,
}

/// Result of a `seed` run.
#[derive(Debug)]
pub struct SeedResult {
    pub curriculum: Curriculum,
    /// `None` for a dry run.
    pub report: Option<SyncReport>,
    pub elapsed: Duration,
}

impl SeedResult {
    /// No folder failed and no remote call failed.
    pub fn succeeded(&self) -> bool {
        self.curriculum.failed.is_empty()
            && !self.report.as_ref().is_some_and(SyncReport::has_failures)
    }
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called when a course folder has been parsed.
    fn course_loaded(&self, name: &str, exercises: usize);
    /// Called when the pipeline completes.
    fn done(&self, result: &SeedResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn course_loaded(&self, _name: &str, _exercises: usize) {}
    fn done(&self, _result: &SeedResult) {}
}

/// Parse every course folder under `config.curriculum.root`.
///
/// With an API, each descriptor's id is looked up by name; without one no
/// remote call is made. Only an unreadable root is an error.
#[instrument(skip_all, fields(root = %config.curriculum.root))]
pub async fn load_curriculum(
    config: &AppConfig,
    api: Option<&dyn CourseApi>,
    progress: &dyn ProgressReporter,
) -> Result<Curriculum> {
    let root = PathBuf::from(&config.curriculum.root);

    progress.phase("Listing course folders");
    let folders = list_course_folders(&root).await?;
    info!(count = folders.len(), "course folders found");

    progress.phase("Parsing courses");
    let assembler = ExerciseAssembler::new(AssembleOptions::new(&root, &config.curriculum));
    let ctx = IngestContext {
        config: &config.curriculum,
        assembler: &assembler,
        api,
    };

    let outcomes: Vec<FolderOutcome> = stream::iter(folders)
        .map(|folder| ingest_folder(folder, &ctx))
        .buffered(config.curriculum.concurrency.max(1))
        .collect()
        .await;

    let mut curriculum = Curriculum::default();
    for outcome in outcomes {
        match outcome {
            FolderOutcome::Loaded { course, dropped } => {
                progress.course_loaded(&course.descriptor.name, course.exercise_count());
                curriculum.dropped.extend(dropped);
                curriculum.courses.push(course);
            }
            FolderOutcome::Skipped(issue) => curriculum.skipped.push(issue),
            FolderOutcome::Failed(issue) => curriculum.failed.push(issue),
        }
    }

    info!(
        courses = curriculum.courses.len(),
        skipped = curriculum.skipped.len(),
        failed = curriculum.failed.len(),
        dropped = curriculum.dropped.len(),
        "curriculum parsed"
    );
    Ok(curriculum)
}

/// Run the full `seed` pipeline.
///
/// 1. Validate configuration
/// 2. List and parse course folders
/// 3. Reconcile with the content service (skipped when `api` is `None`)
#[instrument(skip_all, fields(dry_run = api.is_none()))]
pub async fn run_seed(
    config: &AppConfig,
    api: Option<Arc<dyn CourseApi>>,
    progress: &dyn ProgressReporter,
) -> Result<SeedResult> {
    let start = Instant::now();
    config.validate()?;

    let mut curriculum = load_curriculum(config, api.as_deref(), progress).await?;

    let report = match api {
        Some(api) => {
            progress.phase("Syncing with content service");
            let engine = SyncEngine::new(api, config.sync.clone());
            Some(engine.reconcile(&mut curriculum.courses).await)
        }
        None => None,
    };

    let result = SeedResult {
        curriculum,
        report,
        elapsed: start.elapsed(),
    };

    progress.done(&result);

    info!(
        courses = result.curriculum.courses.len(),
        succeeded = result.succeeded(),
        elapsed_ms = result.elapsed.as_millis(),
        "seed pipeline complete"
    );

    Ok(result)
}
