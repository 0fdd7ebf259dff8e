use tracing::info;
use uuid::Uuid;

use crate::api_client::ApiClient;
use crate::contract::{JobApplication, JobApplicationCreate, JobApplicationUpdate, Validate};
use crate::errors::ClientError;

#[derive(Clone)]
pub struct JobService {
    api: ApiClient,
}

impl JobService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// GET /jobs/
    pub async fn list(&self) -> Result<Vec<JobApplication>, ClientError> {
        self.api.get_list("/jobs/").await
    }

    /// GET /jobs/{id}
    pub async fn get(&self, id: Uuid) -> Result<JobApplication, ClientError> {
        self.api.get(&format!("/jobs/{id}")).await
    }

    /// POST /jobs/
    pub async fn create(
        &self,
        payload: &JobApplicationCreate,
    ) -> Result<JobApplication, ClientError> {
        payload.validate()?;
        let job: JobApplication = self.api.post("/jobs/", payload).await?;
        info!(job_id = %job.id, "Created job application");
        Ok(job)
    }

    /// PUT /jobs/{id}
    pub async fn update(
        &self,
        id: Uuid,
        payload: &JobApplicationUpdate,
    ) -> Result<JobApplication, ClientError> {
        payload.validate()?;
        self.api.put(&format!("/jobs/{id}"), payload).await
    }

    /// DELETE /jobs/{id}
    pub async fn delete(&self, id: Uuid) -> Result<(), ClientError> {
        self.api.delete(&format!("/jobs/{id}")).await?;
        info!(job_id = %id, "Deleted job application");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api_client::mock::{MockTransport, StaticCredential};
    use crate::api_client::RequestBody;
    use crate::contract::JobStatus;
    use crate::session::Credential;
    use reqwest::Method;
    use serde_json::json;
    use std::sync::Arc;

    const JOB_ID: &str = "6f1c1e4a-2b1a-4c57-9a67-0d3b0c3c2c11";

    fn service(transport: &Arc<MockTransport>) -> JobService {
        JobService::new(ApiClient::new(
            transport.clone(),
            Arc::new(StaticCredential(Some(Credential::new("tok")))),
        ))
    }

    fn job_json(deadline: serde_json::Value) -> serde_json::Value {
        json!({
            "id": JOB_ID,
            "user_id": "0e5d2ad7-8b8a-4f0e-8e51-51f1e2c1a9b2",
            "company": "Acme",
            "position": "Engineer",
            "status": "applied",
            "deadline": deadline,
            "notes": null,
            "created_at": "2024-05-01T10:00:00Z",
            "updated_at": "2024-05-01T10:00:00Z"
        })
    }

    #[tokio::test]
    async fn test_create_without_deadline() {
        let transport = MockTransport::new();
        transport.respond(Method::POST, "/jobs/", 201, job_json(json!(null)));

        let payload = JobApplicationCreate::new("Acme", "Engineer").with_status(JobStatus::Applied);
        let job = service(&transport).create(&payload).await.unwrap();
        assert_eq!(job.deadline, None);
        assert_eq!(job.status, JobStatus::Applied);

        match &transport.requests()[0].body {
            RequestBody::Json(body) => {
                assert_eq!(body["company"], "Acme");
                assert!(body["deadline"].is_null());
            }
            other => panic!("unexpected body {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_invalid_payload_skips_network() {
        let transport = MockTransport::new();
        let err = service(&transport)
            .create(&JobApplicationCreate::new("", "Engineer"))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Validation(ref e) if e.has_field("company")));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_list_rejects_whole_list_on_one_bad_entry() {
        let transport = MockTransport::new();
        let mut bad = job_json(json!(null));
        bad["status"] = json!("lost");
        transport.respond(
            Method::GET,
            "/jobs/",
            200,
            json!([job_json(json!("2024-07-01")), bad]),
        );
        let err = service(&transport).list().await.unwrap_err();
        assert!(matches!(err, ClientError::ResponseContract(_)));
    }

    #[tokio::test]
    async fn test_get_uses_id_path() {
        let transport = MockTransport::new();
        transport.respond(
            Method::GET,
            &format!("/jobs/{JOB_ID}"),
            200,
            job_json(json!("2024-07-01")),
        );
        let job = service(&transport)
            .get(JOB_ID.parse().unwrap())
            .await
            .unwrap();
        assert_eq!(job.deadline.unwrap().to_string(), "2024-07-01");
    }

    #[tokio::test]
    async fn test_update_sends_partial_body() {
        let transport = MockTransport::new();
        transport.respond(
            Method::PUT,
            &format!("/jobs/{JOB_ID}"),
            200,
            job_json(json!(null)),
        );
        let update = JobApplicationUpdate {
            status: Some(JobStatus::Offer),
            ..Default::default()
        };
        service(&transport)
            .update(JOB_ID.parse().unwrap(), &update)
            .await
            .unwrap();
        match &transport.requests()[0].body {
            RequestBody::Json(body) => assert_eq!(body, &json!({"status": "offer"})),
            other => panic!("unexpected body {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_delete_missing_job_is_not_found() {
        let transport = MockTransport::new();
        transport.respond(
            Method::DELETE,
            &format!("/jobs/{JOB_ID}"),
            404,
            json!({"detail": "Job not found"}),
        );
        let err = service(&transport)
            .delete(JOB_ID.parse().unwrap())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "NOT_FOUND");
    }
}
