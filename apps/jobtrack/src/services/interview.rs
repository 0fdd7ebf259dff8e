use crate::api_client::ApiClient;
use crate::contract::{InterviewPrepResult, ResumeJobRequest, Validate};
use crate::errors::ClientError;

#[derive(Clone)]
pub struct InterviewService {
    api: ApiClient,
}

impl InterviewService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// POST /interview/generate-questions
    pub async fn generate_questions(
        &self,
        request: &ResumeJobRequest,
    ) -> Result<InterviewPrepResult, ClientError> {
        request.validate()?;
        self.api
            .post("/interview/generate-questions", request)
            .await
    }
}
