use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Contract, FieldViolation, Validate, ValidationError, Violations};

pub const MIN_MATCH_SCORE: i64 = 0;
pub const MAX_MATCH_SCORE: i64 = 100;

/// Request body shared by `/resumes/analyze` and
/// `/interview/generate-questions`.
///
/// Exactly one of `resume_id` / `resume_text` must be set. An empty
/// `resume_text` counts as absent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResumeJobRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume_text: Option<String>,
    pub job_description_text: String,
}

impl ResumeJobRequest {
    pub fn new(
        resume_id: Option<Uuid>,
        resume_text: Option<String>,
        job_description_text: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let request = Self {
            resume_id,
            resume_text: resume_text.filter(|t| !t.is_empty()),
            job_description_text: job_description_text.into(),
        };
        request.validate()?;
        Ok(request)
    }

    pub fn for_resume(
        resume_id: Uuid,
        job_description_text: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Self::new(Some(resume_id), None, job_description_text)
    }

    pub fn for_text(
        resume_text: impl Into<String>,
        job_description_text: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Self::new(None, Some(resume_text.into()), job_description_text)
    }
}

impl Validate for ResumeJobRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut v = Violations::new();
        let has_text = self.resume_text.as_deref().is_some_and(|t| !t.is_empty());
        match (self.resume_id.is_some(), has_text) {
            (false, false) => v.push(
                "resume_id",
                "either resume_id or resume_text must be provided",
            ),
            (true, true) => v.push("resume_id", "provide resume_id or resume_text, not both"),
            _ => {}
        }
        v.require_min_chars("job_description_text", &self.job_description_text, 1);
        v.into_result()
    }
}

/// AI resume-vs-job analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub match_score: i64,
    pub missing_keywords: Vec<String>,
    pub strength_summary: String,
    pub improvement_suggestions: Vec<String>,
    pub ats_compatibility_check: String,
}

impl Contract for AnalysisResult {
    const ENTITY: &'static str = "AnalysisResult";

    fn violations(&self) -> Vec<FieldViolation> {
        let mut v = Violations::new();
        v.require_range(
            "match_score",
            self.match_score,
            MIN_MATCH_SCORE,
            MAX_MATCH_SCORE,
        );
        v.into_vec()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewQuestion {
    pub question: String,
    /// e.g. "Behavioral", "Technical", "Situational"
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewPrepResult {
    pub generated_questions: Vec<InterviewQuestion>,
    pub preparation_tips: Vec<String>,
}

impl Contract for InterviewPrepResult {
    const ENTITY: &'static str = "InterviewPrepResult";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::decode;
    use serde_json::json;

    fn analysis_with_score(score: serde_json::Value) -> Vec<u8> {
        json!({
            "match_score": score,
            "missing_keywords": ["kubernetes"],
            "strength_summary": "Strong Rust background",
            "improvement_suggestions": ["Quantify impact"],
            "ats_compatibility_check": "Good"
        })
        .to_string()
        .into_bytes()
    }

    #[test]
    fn test_match_score_bounds_are_inclusive() {
        assert_eq!(
            decode::<AnalysisResult>(&analysis_with_score(json!(0)))
                .unwrap()
                .match_score,
            0
        );
        assert_eq!(
            decode::<AnalysisResult>(&analysis_with_score(json!(100)))
                .unwrap()
                .match_score,
            100
        );
    }

    #[test]
    fn test_match_score_out_of_range_is_rejected_not_clamped() {
        for score in [-1, 101] {
            let err = decode::<AnalysisResult>(&analysis_with_score(json!(score))).unwrap_err();
            assert_eq!(err.entity, "AnalysisResult");
            assert_eq!(err.violations[0].field, "match_score");
        }
    }

    #[test]
    fn test_match_score_must_be_integer() {
        assert!(decode::<AnalysisResult>(&analysis_with_score(json!(72.5))).is_err());
        assert!(decode::<AnalysisResult>(&analysis_with_score(json!("72"))).is_err());
    }

    #[test]
    fn test_interview_prep_decodes() {
        let body = json!({
            "generated_questions": [
                {"question": "Tell me about a hard bug", "category": "Behavioral"}
            ],
            "preparation_tips": ["Research the company"]
        });
        let prep: InterviewPrepResult = decode(body.to_string().as_bytes()).unwrap();
        assert_eq!(prep.generated_questions[0].category, "Behavioral");
    }

    #[test]
    fn test_interview_question_requires_category() {
        let body = json!({
            "generated_questions": [{"question": "Why us?"}],
            "preparation_tips": []
        });
        assert!(decode::<InterviewPrepResult>(body.to_string().as_bytes()).is_err());
    }

    #[test]
    fn test_request_requires_exactly_one_resume_source() {
        let neither = ResumeJobRequest::new(None, None, "Rust role").unwrap_err();
        assert!(neither.has_field("resume_id"));

        let both = ResumeJobRequest::new(Some(Uuid::nil()), Some("cv".into()), "Rust role")
            .unwrap_err();
        assert!(both.violations[0].reason.contains("not both"));
    }

    #[test]
    fn test_request_treats_empty_text_as_absent() {
        let req =
            ResumeJobRequest::new(Some(Uuid::nil()), Some(String::new()), "Rust role").unwrap();
        assert_eq!(req.resume_text, None);
        assert!(ResumeJobRequest::new(None, Some(String::new()), "Rust role").is_err());
    }

    #[test]
    fn test_request_requires_job_description() {
        let err = ResumeJobRequest::for_text("cv", "").unwrap_err();
        assert!(err.has_field("job_description_text"));
    }

    #[test]
    fn test_request_serializes_only_the_chosen_source() {
        let req = ResumeJobRequest::for_text("cv text", "Rust role").unwrap();
        let body = serde_json::to_value(&req).unwrap();
        assert!(body.get("resume_id").is_none());
        assert_eq!(body["resume_text"], "cv text");
        assert_eq!(body["job_description_text"], "Rust role");
    }
}
