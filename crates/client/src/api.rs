//! HTTP implementation of the backend collaborators.

use std::sync::Arc;
use async_trait::async_trait;
use coursetrack_core::{Course, CourseId, LessonId, NoteId};
use coursetrack_progress::{PersistenceError, ProgressPersistence, ProgressUpdate};
use reqwest::{Client, ClientBuilder, RequestBuilder, Response, Url};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::auth::AuthProvider;
use crate::config::ClientConfig;
use crate::error::{FetchError, FetchErrorKind};
use crate::notes::{Note, NoteDraft};

/// Source of course content.
#[async_trait]
pub trait ContentFetch: Send + Sync {
    /// Fetch a course with the current user's progress.
    async fn fetch_course(&self, slug: &str) -> Result<Course, FetchError>;
}

/// Error envelope of non-success responses.
#[derive(Deserialize)]
struct ErrorEnvelope {
    error: String,
}

/// Course backend client.
#[derive(Clone)]
pub struct HttpCourseApi {
    /// HTTP client
    client: Client,

    /// Base URL without trailing slash
    base_url: String,

    /// Token source
    auth: Arc<dyn AuthProvider>,
}

impl HttpCourseApi {
    /// Create a client for `config.base_url`.
    pub fn new(config: &ClientConfig, auth: Arc<dyn AuthProvider>) -> Self {
        Self {
            client: ClientBuilder::new()
                .timeout(config.request_timeout)
                .build()
                .unwrap_or_default(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Base URL extended with `segments`, each percent-encoded as a single
    /// path segment.
    fn segment_url(&self, segments: &[&str]) -> Result<Url, FetchError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| FetchError::transport(format!("invalid base URL {}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| FetchError::transport(format!("base URL {} cannot have a path", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Attach credentials and send; non-success statuses become errors.
    async fn send(&self, request: RequestBuilder) -> Result<Response, FetchError> {
        let token = self.auth.bearer_token().await?;
        let response = request.bearer_auth(token).send().await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorEnvelope>(&body)
            .map(|e| e.error)
            .unwrap_or_else(|_| {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            });
        Err(FetchError::from_status(status.as_u16(), message))
    }

    /// Notes of a lesson.
    pub async fn list_notes(
        &self,
        course_id: &CourseId,
        lesson_id: &LessonId,
    ) -> Result<Vec<Note>, FetchError> {
        let request = self
            .client
            .get(self.url("/courses/notes"))
            .query(&[("courseId", course_id.as_str()), ("lessonId", lesson_id.as_str())]);
        let response = self.send(request).await?;
        Ok(response.json().await?)
    }

    /// Create a note.
    pub async fn add_note(&self, draft: &NoteDraft) -> Result<Note, FetchError> {
        let request = self.client.post(self.url("/courses/notes")).json(draft);
        let response = self.send(request).await?;
        Ok(response.json().await?)
    }

    /// Delete a note.
    pub async fn delete_note(&self, note_id: &NoteId) -> Result<(), FetchError> {
        let request = self
            .client
            .delete(self.url("/courses/notes"))
            .query(&[("noteId", note_id.as_str())]);
        self.send(request).await?;
        Ok(())
    }
}

#[async_trait]
impl ContentFetch for HttpCourseApi {
    async fn fetch_course(&self, slug: &str) -> Result<Course, FetchError> {
        debug!("Fetching course {}", slug);
        let request = self
            .client
            .get(self.segment_url(&["courses", slug, "content"])?);
        let response = self.send(request).await?;
        let course: Course = response.json().await.map_err(|e| {
            warn!("Malformed course payload for {}: {}", slug, e);
            FetchError::transport(format!("malformed course payload: {}", e))
        })?;
        Ok(course)
    }
}

#[async_trait]
impl ProgressPersistence for HttpCourseApi {
    async fn save_progress(&self, update: &ProgressUpdate) -> Result<(), PersistenceError> {
        debug!("Saving progress for lesson {}", update.lesson_id);
        let request = self.client.post(self.url("/courses/progress")).json(update);
        match self.send(request).await {
            Ok(_) => Ok(()),
            Err(e) if e.kind == FetchErrorKind::Unauthorized && e.status.is_none() => {
                Err(PersistenceError::Unauthorized(e.message))
            }
            Err(e) => match e.status {
                Some(status) => Err(PersistenceError::Rejected {
                    status,
                    message: e.message,
                }),
                None => Err(PersistenceError::Transport(e.message)),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticToken;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn api(server: &MockServer, token: Option<&str>) -> HttpCourseApi {
        let config = ClientConfig {
            base_url: format!("{}/", server.uri()),
            ..ClientConfig::default()
        };
        HttpCourseApi::new(&config, Arc::new(StaticToken::new(token.map(String::from))))
    }

    fn course_body() -> serde_json::Value {
        serde_json::json!({
            "id": "c1",
            "slug": "rust-101",
            "title": "Rust 101",
            "modules": [{
                "id": "m1",
                "title": "Intro",
                "lessons": [{
                    "id": "l1",
                    "title": "Welcome",
                    "type": "VIDEO",
                    "duration": 120,
                    "progress": [{"completed": false, "watchedSeconds": 30, "lastPosition": 30}]
                }]
            }]
        })
    }

    #[tokio::test]
    async fn test_fetch_course_sends_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/courses/rust-101/content"))
            .and(header("authorization", "Bearer secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(course_body()))
            .expect(1)
            .mount(&server)
            .await;

        let course = api(&server, Some("secret")).fetch_course("rust-101").await.unwrap();

        assert_eq!(course.id, CourseId::new("c1"));
        assert_eq!(course.modules[0].lessons[0].progress.last_position, 30);
    }

    #[tokio::test]
    async fn test_fetch_course_classifies_error_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/courses/rust-101/content"))
            .respond_with(
                ResponseTemplate::new(403)
                    .set_body_json(serde_json::json!({"error": "You are not enrolled"})),
            )
            .mount(&server)
            .await;

        let err = api(&server, Some("secret"))
            .fetch_course("rust-101")
            .await
            .unwrap_err();

        assert_eq!(err.kind, FetchErrorKind::NotEnrolled);
        assert_eq!(err.status, Some(403));
        assert_eq!(err.message, "You are not enrolled");
    }

    #[tokio::test]
    async fn test_missing_token_fails_before_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(course_body()))
            .expect(0)
            .mount(&server)
            .await;

        let err = api(&server, None).fetch_course("rust-101").await.unwrap_err();

        assert_eq!(err.kind, FetchErrorKind::Unauthorized);
        assert_eq!(err.status, None);
    }

    #[tokio::test]
    async fn test_save_progress_posts_update() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/courses/progress"))
            .and(body_json(serde_json::json!({
                "courseId": "c1",
                "lessonId": "l1",
                "completed": true,
                "watchedSeconds": 120,
                "lastPosition": 118
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let update = ProgressUpdate {
            course_id: CourseId::new("c1"),
            lesson_id: LessonId::new("l1"),
            completed: Some(true),
            watched_seconds: Some(120),
            last_position: Some(118),
        };
        api(&server, Some("secret")).save_progress(&update).await.unwrap();
    }

    #[tokio::test]
    async fn test_save_progress_rejection() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/courses/progress"))
            .respond_with(
                ResponseTemplate::new(500).set_body_json(serde_json::json!({"error": "db down"})),
            )
            .mount(&server)
            .await;

        let update = ProgressUpdate {
            course_id: CourseId::new("c1"),
            lesson_id: LessonId::new("l1"),
            completed: None,
            watched_seconds: Some(5),
            last_position: Some(5),
        };
        let err = api(&server, Some("secret")).save_progress(&update).await.unwrap_err();

        match err {
            PersistenceError::Rejected { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "db down");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_notes_endpoints() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/courses/notes"))
            .and(query_param("courseId", "c1"))
            .and(query_param("lessonId", "l1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"id": "n1", "courseId": "c1", "lessonId": "l1", "content": "ownership!", "timestamp": 42}
            ])))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/courses/notes"))
            .and(body_json(serde_json::json!({
                "courseId": "c1",
                "lessonId": "l1",
                "content": "borrow checker",
                "timestamp": 95
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!(
                {"id": "n2", "courseId": "c1", "lessonId": "l1", "content": "borrow checker", "timestamp": 95}
            )))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/courses/notes"))
            .and(query_param("noteId", "n1"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let api = api(&server, Some("secret"));
        let notes = api
            .list_notes(&CourseId::new("c1"), &LessonId::new("l1"))
            .await
            .unwrap();

        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].content, "ownership!");
        assert_eq!(notes[0].timestamp, Some(42));

        let created = api
            .add_note(&NoteDraft {
                course_id: CourseId::new("c1"),
                lesson_id: LessonId::new("l1"),
                content: "borrow checker".to_string(),
                timestamp: Some(95),
            })
            .await
            .unwrap();
        assert_eq!(created.id, NoteId::new("n2"));

        api.delete_note(&notes[0].id).await.unwrap();
    }

    #[tokio::test]
    async fn test_slug_stays_one_path_segment() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/courses/a%2Fb%3Fc/content"))
            .respond_with(ResponseTemplate::new(200).set_body_json(course_body()))
            .expect(1)
            .mount(&server)
            .await;

        api(&server, Some("secret")).fetch_course("a/b?c").await.unwrap();
    }
}
