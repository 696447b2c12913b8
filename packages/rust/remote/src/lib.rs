//! Client for the remote content service.
//!
//! The seeder only needs four calls: look a course up by name, create a
//! course, look an exercise up by slug, and create/update exercises.
//! [`CourseApi`] is the seam the sync engine depends on; [`HttpCourseApi`]
//! is the reqwest implementation.

mod dto;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use seeder_shared::{CourseDescriptor, CourseId, ExerciseId, RemoteConfig, Result, SeederError};

pub use dto::{CreatedCourse, ExerciseUpsert};

/// User-Agent string for service requests.
const USER_AGENT: &str = concat!("curriculum-seeder/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// CourseApi
// ---------------------------------------------------------------------------

/// Operations the seeder performs against the content service.
#[async_trait]
pub trait CourseApi: Send + Sync {
    /// Id of the course with this name, if one exists.
    async fn find_course_id(&self, name: &str) -> Result<Option<CourseId>>;

    /// Create a course and return the stored record.
    async fn create_course(&self, course: &CourseDescriptor) -> Result<CreatedCourse>;

    /// Id of the exercise with this slug, if one exists.
    async fn find_exercise_id(&self, slug: &str) -> Result<Option<ExerciseId>>;

    /// Create or update one exercise, or one group of child exercises.
    async fn upsert_exercise(&self, payload: &ExerciseUpsert) -> Result<()>;
}

// ---------------------------------------------------------------------------
// HttpCourseApi
// ---------------------------------------------------------------------------

/// [`CourseApi`] over HTTP/JSON.
#[derive(Debug, Clone)]
pub struct HttpCourseApi {
    client: Client,
    base_url: Url,
}

impl HttpCourseApi {
    /// Build a client for the service at `config.base_url`.
    pub fn new(config: &RemoteConfig) -> Result<Self> {
        let mut base_url = Url::parse(&config.base_url).map_err(|e| {
            SeederError::config(format!("invalid remote base URL '{}': {e}", config.base_url))
        })?;

        // Keep any path prefix when joining endpoint paths.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SeederError::Remote(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, base_url })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| SeederError::config(format!("invalid endpoint '{path}': {e}")))
    }
}

#[async_trait]
impl CourseApi for HttpCourseApi {
    #[instrument(skip(self))]
    async fn find_course_id(&self, name: &str) -> Result<Option<CourseId>> {
        let url = self.endpoint("course/name")?;
        let request = self.client.get(url.clone()).query(&[("name", name)]);
        let response: dto::CourseLookupResponse = fetch_json(request, &url).await?;

        let id = response.course.first().map(|record| record.id);
        debug!(?id, "course lookup");
        Ok(id)
    }

    #[instrument(skip_all, fields(name = %course.name))]
    async fn create_course(&self, course: &CourseDescriptor) -> Result<CreatedCourse> {
        let url = self.endpoint("course")?;
        let request = self.client.post(url.clone()).json(course);
        let response: dto::CreateCourseResponse = fetch_json(request, &url).await?;

        debug!(id = %response.new_course.id, "course created");
        Ok(response.new_course)
    }

    #[instrument(skip(self))]
    async fn find_exercise_id(&self, slug: &str) -> Result<Option<ExerciseId>> {
        let url = self.endpoint("exercise/slug")?;
        let request = self.client.get(url.clone()).query(&[("slug", slug)]);

        let response = request
            .send()
            .await
            .map_err(|e| SeederError::Remote(format!("{url}: {e}")))?;

        // The service answers 404 for slugs it has never stored.
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let response: dto::ExerciseLookupResponse = decode(response, &url).await?;
        Ok(response.exercise.first().map(|record| record.id))
    }

    #[instrument(skip_all, fields(slug = payload.label(), count = payload.exercises().len()))]
    async fn upsert_exercise(&self, payload: &ExerciseUpsert) -> Result<()> {
        let url = self.endpoint("exercise")?;
        let response = self
            .client
            .post(url.clone())
            .json(payload)
            .send()
            .await
            .map_err(|e| SeederError::Remote(format!("{url}: {e}")))?;

        check_status(response, &url).await?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Send a request and decode a JSON body.
async fn fetch_json<T: DeserializeOwned>(request: RequestBuilder, url: &Url) -> Result<T> {
    let response = request
        .send()
        .await
        .map_err(|e| SeederError::Remote(format!("{url}: {e}")))?;
    decode(response, url).await
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response, url: &Url) -> Result<T> {
    let response = check_status(response, url).await?;
    response
        .json()
        .await
        .map_err(|e| SeederError::Remote(format!("{url}: undecodable response body: {e}")))
}

/// Turn a non-2xx response into [`SeederError::Remote`], keeping the body text.
async fn check_status(response: reqwest::Response, url: &Url) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(SeederError::Remote(format!("{url}: HTTP {status}: {body}")))
}
