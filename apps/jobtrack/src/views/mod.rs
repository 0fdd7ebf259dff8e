//! View-side state: one cached list per list view, dropped on every
//! successful mutation so the next read goes back to the server.

use uuid::Uuid;

use crate::api_client::FileUpload;
use crate::contract::{JobApplication, JobApplicationUpdate, JobForm, ResumeData, ResumeMetadata};
use crate::errors::ClientError;
use crate::services::{JobService, ResumeService};

pub mod dashboard;

pub use dashboard::{DashboardStats, UpcomingDeadline};

#[derive(Debug)]
pub struct ListCache<T> {
    entries: Option<Vec<T>>,
}

impl<T> Default for ListCache<T> {
    fn default() -> Self {
        Self { entries: None }
    }
}

impl<T> ListCache<T> {
    pub fn get(&self) -> Option<&[T]> {
        self.entries.as_deref()
    }

    pub fn set(&mut self, entries: Vec<T>) {
        self.entries = Some(entries);
    }

    pub fn invalidate(&mut self) {
        self.entries = None;
    }

    pub fn is_loaded(&self) -> bool {
        self.entries.is_some()
    }
}

/// Jobs list view.
pub struct JobBoard {
    service: JobService,
    cache: ListCache<JobApplication>,
}

impl JobBoard {
    pub fn new(service: JobService) -> Self {
        Self {
            service,
            cache: ListCache::default(),
        }
    }

    pub async fn jobs(&mut self) -> Result<&[JobApplication], ClientError> {
        if !self.cache.is_loaded() {
            let fresh = self.service.list().await?;
            self.cache.set(fresh);
        }
        Ok(self.cache.get().unwrap_or_default())
    }

    pub async fn refresh(&mut self) -> Result<&[JobApplication], ClientError> {
        self.cache.invalidate();
        self.jobs().await
    }

    pub async fn create(&mut self, form: &JobForm) -> Result<JobApplication, ClientError> {
        let payload = form.parse()?;
        let job = self.service.create(&payload).await?;
        self.cache.invalidate();
        Ok(job)
    }

    pub async fn update(
        &mut self,
        id: Uuid,
        update: &JobApplicationUpdate,
    ) -> Result<JobApplication, ClientError> {
        let job = self.service.update(id, update).await?;
        self.cache.invalidate();
        Ok(job)
    }

    pub async fn delete(&mut self, id: Uuid) -> Result<(), ClientError> {
        self.service.delete(id).await?;
        self.cache.invalidate();
        Ok(())
    }
}

/// Resume checker's resume list.
pub struct ResumeLibrary {
    service: ResumeService,
    cache: ListCache<ResumeMetadata>,
}

impl ResumeLibrary {
    pub fn new(service: ResumeService) -> Self {
        Self {
            service,
            cache: ListCache::default(),
        }
    }

    pub async fn resumes(&mut self) -> Result<&[ResumeMetadata], ClientError> {
        if !self.cache.is_loaded() {
            let fresh = self.service.list().await?;
            self.cache.set(fresh);
        }
        Ok(self.cache.get().unwrap_or_default())
    }

    pub async fn upload(&mut self, file: FileUpload) -> Result<ResumeData, ClientError> {
        let resume = self.service.upload(file).await?;
        self.cache.invalidate();
        Ok(resume)
    }

    pub async fn delete(&mut self, id: Uuid) -> Result<(), ClientError> {
        self.service.delete(id).await?;
        self.cache.invalidate();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api_client::mock::{MockTransport, StaticCredential};
    use crate::api_client::ApiClient;
    use crate::services::resumes::resume_upload;
    use crate::session::Credential;
    use reqwest::Method;
    use serde_json::json;
    use std::sync::Arc;

    const RESUME_ID: &str = "11111111-1111-1111-1111-111111111111";

    fn api(transport: &Arc<MockTransport>) -> ApiClient {
        ApiClient::new(
            transport.clone(),
            Arc::new(StaticCredential(Some(Credential::new("tok")))),
        )
    }

    fn resume_metadata() -> serde_json::Value {
        json!({
            "id": RESUME_ID,
            "filename": "resume.pdf",
            "content_hash": "ab12",
            "storage_path": null,
            "created_at": "2024-05-01T10:00:00Z",
            "updated_at": "2024-05-01T10:00:00Z"
        })
    }

    #[tokio::test]
    async fn test_uploaded_resume_appears_once_in_list() {
        let transport = MockTransport::new();
        transport.respond(Method::GET, "/resumes/", 200, json!([]));
        transport.respond(Method::GET, "/resumes/", 200, json!([resume_metadata()]));
        let mut upload_body = resume_metadata();
        upload_body["user_id"] = json!("22222222-2222-2222-2222-222222222222");
        upload_body["raw_text"] = json!("Jane Doe");
        transport.respond(Method::POST, "/resumes/upload", 201, upload_body);

        let mut library = ResumeLibrary::new(ResumeService::new(api(&transport)));
        assert!(library.resumes().await.unwrap().is_empty());

        let uploaded = library
            .upload(resume_upload("resume.pdf", b"%PDF-1.7".to_vec()))
            .await
            .unwrap();
        assert_eq!(uploaded.id().to_string(), RESUME_ID);

        let list = library.resumes().await.unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id.to_string(), RESUME_ID);
        assert_eq!(list[0].filename.as_deref(), Some("resume.pdf"));
    }

    #[tokio::test]
    async fn test_list_is_cached_until_mutation() {
        let transport = MockTransport::new();
        transport.respond(Method::GET, "/jobs/", 200, json!([]));
        let mut board = JobBoard::new(JobService::new(api(&transport)));

        board.jobs().await.unwrap();
        board.jobs().await.unwrap();
        assert_eq!(transport.count(&Method::GET, "/jobs/"), 1);

        board.refresh().await.unwrap();
        assert_eq!(transport.count(&Method::GET, "/jobs/"), 2);
    }

    #[tokio::test]
    async fn test_delete_invalidates_cache() {
        let transport = MockTransport::new();
        let job_id = "6f1c1e4a-2b1a-4c57-9a67-0d3b0c3c2c11";
        transport.respond(Method::GET, "/jobs/", 200, json!([]));
        transport.respond_empty(Method::DELETE, &format!("/jobs/{job_id}"), 204);
        let mut board = JobBoard::new(JobService::new(api(&transport)));

        board.jobs().await.unwrap();
        board.delete(job_id.parse().unwrap()).await.unwrap();
        board.jobs().await.unwrap();
        assert_eq!(transport.count(&Method::GET, "/jobs/"), 2);
    }

    #[tokio::test]
    async fn test_invalid_form_keeps_cache() {
        let transport = MockTransport::new();
        transport.respond(Method::GET, "/jobs/", 200, json!([]));
        let mut board = JobBoard::new(JobService::new(api(&transport)));
        board.jobs().await.unwrap();

        let err = board.create(&JobForm::default()).await.unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
        board.jobs().await.unwrap();
        assert_eq!(transport.count(&Method::GET, "/jobs/"), 1);
        assert_eq!(transport.count(&Method::POST, "/jobs/"), 0);
    }
}
