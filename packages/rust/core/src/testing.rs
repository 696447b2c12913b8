//! In-memory [`CourseApi`] that records every call.
//!
//! Created courses and upserted exercises are remembered, so a second run
//! against the same instance sees what the first one stored.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;

use seeder_remote::{CourseApi, CreatedCourse, ExerciseUpsert};
use seeder_shared::{CourseDescriptor, CourseId, ExerciseId, Result, SeederError};

/// Ids handed out by `create_course` start here.
const FIRST_CREATED_ID: i64 = 100;
/// Ids handed out to exercises stored without one start here.
const FIRST_EXERCISE_ID: i64 = 500;

#[derive(Default)]
struct Calls {
    course_lookups: Vec<String>,
    created: Vec<CourseDescriptor>,
    exercise_lookups: Vec<String>,
    upserts: Vec<ExerciseUpsert>,
}

pub(crate) struct RecordingApi {
    courses: Mutex<HashMap<String, CourseId>>,
    exercises: Mutex<HashMap<String, ExerciseId>>,
    fail_lookups: bool,
    fail_create: HashSet<String>,
    fail_upsert: HashSet<String>,
    next_id: AtomicI64,
    next_exercise_id: AtomicI64,
    calls: Mutex<Calls>,
}

impl Default for RecordingApi {
    fn default() -> Self {
        Self {
            courses: Mutex::new(HashMap::new()),
            exercises: Mutex::new(HashMap::new()),
            fail_lookups: false,
            fail_create: HashSet::new(),
            fail_upsert: HashSet::new(),
            next_id: AtomicI64::new(FIRST_CREATED_ID),
            next_exercise_id: AtomicI64::new(FIRST_EXERCISE_ID),
            calls: Mutex::new(Calls::default()),
        }
    }
}

impl RecordingApi {
    pub fn with_course(self, name: &str, id: CourseId) -> Self {
        self.courses.lock().unwrap().insert(name.to_string(), id);
        self
    }

    pub fn with_exercise(self, slug: &str, id: ExerciseId) -> Self {
        self.exercises.lock().unwrap().insert(slug.to_string(), id);
        self
    }

    pub fn failing_lookups(mut self) -> Self {
        self.fail_lookups = true;
        self
    }

    pub fn failing_create(mut self, name: &str) -> Self {
        self.fail_create.insert(name.to_string());
        self
    }

    /// Fail any upsert that carries `slug`.
    pub fn failing_upsert(mut self, slug: &str) -> Self {
        self.fail_upsert.insert(slug.to_string());
        self
    }

    pub fn course_lookups(&self) -> Vec<String> {
        self.calls.lock().unwrap().course_lookups.clone()
    }

    pub fn created_courses(&self) -> Vec<String> {
        let calls = self.calls.lock().unwrap();
        calls.created.iter().map(|c| c.name.clone()).collect()
    }

    pub fn exercise_lookups(&self) -> Vec<String> {
        self.calls.lock().unwrap().exercise_lookups.clone()
    }

    pub fn upserts(&self) -> Vec<ExerciseUpsert> {
        self.calls.lock().unwrap().upserts.clone()
    }

    /// Forget recorded calls, keeping stored courses and exercises.
    pub fn clear_calls(&self) {
        *self.calls.lock().unwrap() = Calls::default();
    }
}

#[async_trait]
impl CourseApi for RecordingApi {
    async fn find_course_id(&self, name: &str) -> Result<Option<CourseId>> {
        self.calls.lock().unwrap().course_lookups.push(name.to_string());
        if self.fail_lookups {
            return Err(SeederError::Remote("connection refused".into()));
        }
        Ok(self.courses.lock().unwrap().get(name).copied())
    }

    async fn create_course(&self, course: &CourseDescriptor) -> Result<CreatedCourse> {
        self.calls.lock().unwrap().created.push(course.clone());
        if self.fail_create.contains(&course.name) {
            return Err(SeederError::Remote("HTTP 500".into()));
        }
        let id = CourseId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.courses.lock().unwrap().insert(course.name.clone(), id);
        Ok(CreatedCourse {
            id,
            name: course.name.clone(),
        })
    }

    async fn find_exercise_id(&self, slug: &str) -> Result<Option<ExerciseId>> {
        self.calls.lock().unwrap().exercise_lookups.push(slug.to_string());
        Ok(self.exercises.lock().unwrap().get(slug).copied())
    }

    async fn upsert_exercise(&self, payload: &ExerciseUpsert) -> Result<()> {
        self.calls.lock().unwrap().upserts.push(payload.clone());
        if payload
            .exercises()
            .iter()
            .any(|exercise| self.fail_upsert.contains(&exercise.slug))
        {
            return Err(SeederError::Remote("HTTP 422".into()));
        }

        let mut stored = self.exercises.lock().unwrap();
        for exercise in payload.exercises() {
            let id = exercise
                .id
                .unwrap_or_else(|| ExerciseId(self.next_exercise_id.fetch_add(1, Ordering::SeqCst)));
            stored.entry(exercise.slug.clone()).or_insert(id);
        }
        Ok(())
    }
}
