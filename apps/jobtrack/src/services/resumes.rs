use std::path::Path;

use tracing::info;
use uuid::Uuid;

use crate::api_client::{ApiClient, FileUpload};
use crate::contract::{
    AnalysisResult, ResumeData, ResumeJobRequest, ResumeMetadata, Validate, ValidationError,
    Violations,
};
use crate::errors::ClientError;

/// Upload size limit enforced by the backend.
pub const MAX_RESUME_BYTES: usize = 5 * 1024 * 1024;

pub const PDF_MIME: &str = "application/pdf";
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Content type for a supported resume file name (PDF or DOCX).
pub fn resume_content_type(filename: &str) -> Option<&'static str> {
    let extension = Path::new(filename)
        .extension()?
        .to_str()?
        .to_ascii_lowercase();
    match extension.as_str() {
        "pdf" => Some(PDF_MIME),
        "docx" => Some(DOCX_MIME),
        _ => None,
    }
}

/// Builds an upload for a resume file, inferring its content type.
pub fn resume_upload(filename: impl Into<String>, bytes: impl Into<bytes::Bytes>) -> FileUpload {
    let upload = FileUpload::new(filename, bytes);
    match resume_content_type(&upload.filename) {
        Some(content_type) => upload.with_content_type(content_type),
        None => upload,
    }
}

pub fn validate_upload(file: &FileUpload) -> Result<(), ValidationError> {
    let mut v = Violations::new();
    v.require_text("filename", &file.filename);
    let declared = file.content_type.as_deref();
    let supported = matches!(declared, Some(PDF_MIME | DOCX_MIME))
        || resume_content_type(&file.filename).is_some();
    if !supported {
        v.push("file", "unsupported file type, allowed types: PDF, DOCX");
    }
    if file.bytes.is_empty() {
        v.push("file", "must not be empty");
    } else if file.bytes.len() > MAX_RESUME_BYTES {
        v.push(
            "file",
            format!("exceeds the {} MB limit", MAX_RESUME_BYTES / (1024 * 1024)),
        );
    }
    v.into_result()
}

#[derive(Clone)]
pub struct ResumeService {
    api: ApiClient,
}

impl ResumeService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// GET /resumes/
    pub async fn list(&self) -> Result<Vec<ResumeMetadata>, ClientError> {
        self.api.get_list("/resumes/").await
    }

    /// POST /resumes/upload
    pub async fn upload(&self, file: FileUpload) -> Result<ResumeData, ClientError> {
        validate_upload(&file)?;
        let resume: ResumeData = self.api.upload("/resumes/upload", file).await?;
        info!(resume_id = %resume.id(), "Uploaded resume");
        Ok(resume)
    }

    /// GET /resumes/{id}
    pub async fn get(&self, id: Uuid) -> Result<ResumeData, ClientError> {
        self.api.get(&format!("/resumes/{id}")).await
    }

    /// DELETE /resumes/{id}
    pub async fn delete(&self, id: Uuid) -> Result<(), ClientError> {
        self.api.delete(&format!("/resumes/{id}")).await
    }

    /// POST /resumes/analyze
    pub async fn analyze(&self, request: &ResumeJobRequest) -> Result<AnalysisResult, ClientError> {
        request.validate()?;
        self.api.post("/resumes/analyze", request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api_client::mock::{MockTransport, StaticCredential};
    use crate::api_client::RequestBody;
    use crate::session::Credential;
    use reqwest::Method;
    use serde_json::json;
    use std::sync::Arc;

    fn service(transport: &Arc<MockTransport>) -> ResumeService {
        ResumeService::new(ApiClient::new(
            transport.clone(),
            Arc::new(StaticCredential(Some(Credential::new("tok")))),
        ))
    }

    #[test]
    fn test_content_type_by_extension() {
        assert_eq!(resume_content_type("cv.PDF"), Some(PDF_MIME));
        assert_eq!(resume_content_type("cv.docx"), Some(DOCX_MIME));
        assert_eq!(resume_content_type("cv.txt"), None);
        assert_eq!(resume_content_type("cv"), None);
    }

    #[test]
    fn test_validate_upload_rules() {
        assert!(validate_upload(&resume_upload("cv.pdf", b"%PDF-1.7".to_vec())).is_ok());
        assert!(validate_upload(&resume_upload("cv.png", b"png".to_vec())).is_err());
        assert!(validate_upload(&resume_upload("cv.pdf", Vec::new())).is_err());
        let oversized = resume_upload("cv.pdf", vec![0u8; MAX_RESUME_BYTES + 1]);
        assert!(validate_upload(&oversized).is_err());
        let declared = FileUpload::new("upload", b"data".to_vec()).with_content_type(PDF_MIME);
        assert!(validate_upload(&declared).is_ok());
    }

    #[tokio::test]
    async fn test_upload_sends_multipart_file() {
        let transport = MockTransport::new();
        transport.respond(
            Method::POST,
            "/resumes/upload",
            201,
            json!({
                "id": "11111111-1111-1111-1111-111111111111",
                "user_id": "22222222-2222-2222-2222-222222222222",
                "filename": "resume.pdf",
                "raw_text": "Jane Doe",
                "created_at": "2024-05-01T10:00:00Z",
                "updated_at": "2024-05-01T10:00:00Z"
            }),
        );
        let resume = service(&transport)
            .upload(resume_upload("resume.pdf", b"%PDF-1.7".to_vec()))
            .await
            .unwrap();
        assert_eq!(resume.metadata.filename.as_deref(), Some("resume.pdf"));

        match &transport.requests()[0].body {
            RequestBody::File(file) => {
                assert_eq!(file.field, "file");
                assert_eq!(file.content_type.as_deref(), Some(PDF_MIME));
            }
            other => panic!("unexpected body {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_analyze_validates_before_sending() {
        let transport = MockTransport::new();
        let request = ResumeJobRequest {
            resume_id: None,
            resume_text: None,
            job_description_text: "Rust engineer".into(),
        };
        let err = service(&transport).analyze(&request).await.unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_analyze_rejects_out_of_range_score() {
        let transport = MockTransport::new();
        transport.respond(
            Method::POST,
            "/resumes/analyze",
            200,
            json!({
                "match_score": 101,
                "missing_keywords": [],
                "strength_summary": "",
                "improvement_suggestions": [],
                "ats_compatibility_check": ""
            }),
        );
        let request = ResumeJobRequest::for_text("cv", "Rust engineer").unwrap();
        let err = service(&transport).analyze(&request).await.unwrap_err();
        assert!(
            matches!(err, ClientError::ResponseContract(ref e) if e.entity == "AnalysisResult")
        );
    }
}
