//! Two-phase reconciliation with the content service.
//!
//! Phase 1 creates every course that has no remote id and writes the new id
//! onto the course and its exercises. Phase 2 upserts exercises, and starts
//! only after every creation call has resolved: any course may supply the
//! id an exercise needs.
//!
//! Each course and each exercise payload gets its own [`ItemOutcome`]; a
//! failed call is recorded and the run moves on.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use seeder_remote::{CourseApi, ExerciseUpsert};
use seeder_shared::{Course, CourseId, ExerciseEntry, Result, SyncConfig};

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// What an outcome refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Course,
    Exercise,
    Group,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum ItemStatus {
    /// The course already existed remotely.
    Resolved(CourseId),
    Created(CourseId),
    Upserted,
    Skipped(String),
    Failed(String),
}

/// Result for one course or one exercise payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemOutcome {
    pub kind: ItemKind,
    /// Course name, exercise slug, or `course/group` for a child group.
    pub key: String,
    pub status: ItemStatus,
}

impl ItemOutcome {
    fn new(kind: ItemKind, key: impl Into<String>, status: ItemStatus) -> Self {
        Self {
            kind,
            key: key.into(),
            status,
        }
    }
}

/// Outcome of one reconciliation run.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub outcomes: Vec<ItemOutcome>,
}

impl SyncReport {
    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }

    pub fn failures(&self) -> impl Iterator<Item = &ItemOutcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, ItemStatus::Failed(_)))
    }

    /// Number of outcomes whose status matches `pred`.
    pub fn count(&self, pred: impl Fn(&ItemStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.status)).count()
    }

    pub fn created(&self) -> usize {
        self.count(|s| matches!(s, ItemStatus::Created(_)))
    }

    pub fn upserted(&self) -> usize {
        self.count(|s| matches!(s, ItemStatus::Upserted))
    }

    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, ItemStatus::Skipped(_)))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, ItemStatus::Failed(_)))
    }
}

// ---------------------------------------------------------------------------
// SyncEngine
// ---------------------------------------------------------------------------

/// One upsert call waiting to be sent.
struct PendingUpsert {
    kind: ItemKind,
    key: String,
    payload: ExerciseUpsert,
}

/// Reconciles parsed courses with the content service.
pub struct SyncEngine {
    api: Arc<dyn CourseApi>,
    config: SyncConfig,
}

impl SyncEngine {
    pub fn new(api: Arc<dyn CourseApi>, config: SyncConfig) -> Self {
        Self { api, config }
    }

    fn concurrency(&self) -> usize {
        self.config.concurrency.max(1)
    }

    /// Run both phases over `courses`, updating ids in place.
    #[instrument(skip_all, fields(courses = courses.len()))]
    pub async fn reconcile(&self, courses: &mut [Course]) -> SyncReport {
        let started_at = Utc::now();
        let mut outcomes = Vec::new();

        outcomes.extend(self.create_courses(courses).await);
        outcomes.extend(self.upsert_exercises(courses).await);

        let report = SyncReport {
            started_at,
            finished_at: Utc::now(),
            outcomes,
        };

        info!(
            created = report.created(),
            upserted = report.upserted(),
            skipped = report.skipped(),
            failed = report.failed(),
            "reconciliation complete"
        );
        report
    }

    /// Phase 1: create each course name that has no id, once per name.
    async fn create_courses(&self, courses: &mut [Course]) -> Vec<ItemOutcome> {
        let mut outcomes = Vec::new();
        let mut seen = HashSet::new();
        let mut pending = Vec::new();

        for course in courses.iter() {
            let descriptor = &course.descriptor;
            if !seen.insert(descriptor.name.clone()) {
                continue;
            }
            match descriptor.id {
                Some(id) => outcomes.push(ItemOutcome::new(
                    ItemKind::Course,
                    &descriptor.name,
                    ItemStatus::Resolved(id),
                )),
                None => pending.push(descriptor.clone()),
            }
        }

        debug!(count = pending.len(), "creating courses");

        let api = &self.api;
        let results: Vec<_> = stream::iter(pending)
            .map(|descriptor| async move {
                let result = api.create_course(&descriptor).await;
                (descriptor.name, result)
            })
            .buffered(self.concurrency())
            .collect()
            .await;

        for (name, result) in results {
            let status = match result {
                Ok(created) => {
                    // Match the response back by the name the service returned.
                    let mut matched = 0usize;
                    for course in courses
                        .iter_mut()
                        .filter(|c| c.descriptor.id.is_none() && c.descriptor.name == created.name)
                    {
                        course.assign_course_id(created.id);
                        matched += 1;
                    }

                    if matched == 0 {
                        warn!(%name, returned = %created.name, "created course matches no local course");
                        ItemStatus::Failed(format!(
                            "service returned course '{}' for '{name}'",
                            created.name
                        ))
                    } else {
                        info!(%name, id = %created.id, "course created");
                        ItemStatus::Created(created.id)
                    }
                }
                Err(e) => {
                    warn!(%name, error = %e, "course creation failed");
                    ItemStatus::Failed(e.to_string())
                }
            };
            outcomes.push(ItemOutcome::new(ItemKind::Course, name, status));
        }

        outcomes
    }

    /// Phase 2: upsert every exercise and child group that has a course id.
    async fn upsert_exercises(&self, courses: &[Course]) -> Vec<ItemOutcome> {
        let (pending, mut outcomes) = plan_upserts(courses);
        debug!(count = pending.len(), "upserting exercises");

        let sent: Vec<ItemOutcome> = stream::iter(pending)
            .map(|item| self.send(item))
            .buffered(self.concurrency())
            .collect()
            .await;

        outcomes.extend(sent);
        outcomes
    }

    async fn send(&self, mut item: PendingUpsert) -> ItemOutcome {
        let result = self.upsert(&mut item.payload).await;
        let status = match result {
            Ok(()) => ItemStatus::Upserted,
            Err(e) => {
                warn!(key = %item.key, error = %e, "exercise upsert failed");
                ItemStatus::Failed(e.to_string())
            }
        };
        ItemOutcome::new(item.kind, item.key, status)
    }

    /// Resolve remote ids by slug when enabled, then post the payload.
    async fn upsert(&self, payload: &mut ExerciseUpsert) -> Result<()> {
        if self.config.resolve_exercise_ids {
            for exercise in payload.exercises_mut() {
                if exercise.id.is_none() {
                    exercise.id = self.api.find_exercise_id(&exercise.slug).await?;
                }
            }
        }

        self.api.upsert_exercise(payload).await?;
        debug!(label = payload.label(), "exercise upserted");
        Ok(())
    }
}

/// Build the upsert calls for phase 2, plus outcomes for what is skipped.
///
/// A slug is sent at most once per run. Exercises without a course id are
/// skipped; a group keeps only children with a course id and is skipped
/// when none remain.
fn plan_upserts(courses: &[Course]) -> (Vec<PendingUpsert>, Vec<ItemOutcome>) {
    let mut seen = HashSet::new();
    let mut pending = Vec::new();
    let mut skipped = Vec::new();

    for course in courses {
        for entry in &course.exercises {
            match entry {
                ExerciseEntry::Single(exercise) => {
                    let skip = if exercise.course_id.is_none() {
                        Some("course has no remote id")
                    } else if !seen.insert(exercise.slug.clone()) {
                        Some("duplicate slug")
                    } else {
                        None
                    };

                    match skip {
                        Some(reason) => skipped.push(ItemOutcome::new(
                            ItemKind::Exercise,
                            &exercise.slug,
                            ItemStatus::Skipped(reason.into()),
                        )),
                        None => pending.push(PendingUpsert {
                            kind: ItemKind::Exercise,
                            key: exercise.slug.clone(),
                            payload: ExerciseUpsert::Single(exercise.clone()),
                        }),
                    }
                }
                ExerciseEntry::Group {
                    file_name,
                    children,
                } => {
                    let key = format!("{}/{file_name}", course.descriptor.name);
                    let children: Vec<_> = children
                        .iter()
                        .filter(|child| child.course_id.is_some())
                        .filter(|child| seen.insert(child.slug.clone()))
                        .cloned()
                        .collect();

                    if children.is_empty() {
                        skipped.push(ItemOutcome::new(
                            ItemKind::Group,
                            key,
                            ItemStatus::Skipped("no children to send".into()),
                        ));
                    } else {
                        pending.push(PendingUpsert {
                            kind: ItemKind::Group,
                            key,
                            payload: ExerciseUpsert::Children(children),
                        });
                    }
                }
            }
        }
    }

    (pending, skipped)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
