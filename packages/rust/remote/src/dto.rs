//! Wire types for the content service.

use serde::{Deserialize, Serialize};

use seeder_shared::{CourseId, Exercise, ExerciseId};

/// Any record the service returns with an `id`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct IdRecord<T> {
    pub id: T,
}

/// `GET /course/name?name=...`
#[derive(Debug, Deserialize)]
pub(crate) struct CourseLookupResponse {
    #[serde(default)]
    pub course: Vec<IdRecord<CourseId>>,
}

/// `GET /exercise/slug?slug=...`
#[derive(Debug, Deserialize)]
pub(crate) struct ExerciseLookupResponse {
    #[serde(default)]
    pub exercise: Vec<IdRecord<ExerciseId>>,
}

/// `POST /course`
#[derive(Debug, Deserialize)]
pub(crate) struct CreateCourseResponse {
    #[serde(rename = "newCourse")]
    pub new_course: CreatedCourse,
}

/// The course record returned by a create call.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreatedCourse {
    pub id: CourseId,
    pub name: String,
}

/// Body of `POST /exercise`: one exercise, or the children of one outline entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ExerciseUpsert {
    #[serde(rename = "exercise")]
    Single(Exercise),
    #[serde(rename = "childExercise")]
    Children(Vec<Exercise>),
}

impl ExerciseUpsert {
    pub fn exercises(&self) -> &[Exercise] {
        match self {
            Self::Single(exercise) => std::slice::from_ref(exercise),
            Self::Children(children) => children,
        }
    }

    pub fn exercises_mut(&mut self) -> &mut [Exercise] {
        match self {
            Self::Single(exercise) => std::slice::from_mut(exercise),
            Self::Children(children) => children,
        }
    }

    /// Slug of the exercise, or of the first child.
    pub fn label(&self) -> &str {
        self.exercises()
            .first()
            .map(|exercise| exercise.slug.as_str())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise(slug: &str) -> Exercise {
        Exercise {
            id: None,
            name: slug.into(),
            course_id: Some(CourseId(1)),
            content: "{}".into(),
            slug: slug.into(),
            github_link: String::new(),
            submission_type: None,
        }
    }

    #[test]
    fn upsert_payload_shapes() {
        let single = serde_json::to_value(ExerciseUpsert::Single(exercise("python__intro"))).unwrap();
        assert_eq!(single["exercise"]["slug"], "python__intro");

        let group = serde_json::to_value(ExerciseUpsert::Children(vec![
            exercise("python__loops/for"),
            exercise("python__loops/while"),
        ]))
        .unwrap();
        assert_eq!(group["childExercise"][1]["slug"], "python__loops/while");
    }

    #[test]
    fn create_response_decodes() {
        let body = r#"{"newCourse": {"id": 12, "name": "Python", "logo": "x"}}"#;
        let parsed: CreateCourseResponse = serde_json::from_str(body).unwrap();
        assert_eq!(
            parsed.new_course,
            CreatedCourse {
                id: CourseId(12),
                name: "Python".into()
            }
        );
    }

    #[test]
    fn lookup_response_tolerates_extra_fields() {
        let body = r#"{"course": [{"id": 3, "name": "Python", "logo": "x"}]}"#;
        let parsed: CourseLookupResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.course[0].id, CourseId(3));
    }
}
