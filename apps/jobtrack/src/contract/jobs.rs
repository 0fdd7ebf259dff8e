use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use super::{timestamp, Contract, FieldViolation, Validate, ValidationError, Violations};

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Wishlist,
    #[default]
    Applied,
    Interviewing,
    Offer,
    Rejected,
    NoResponse,
}

impl JobStatus {
    pub const ALL: [JobStatus; 6] = [
        JobStatus::Wishlist,
        JobStatus::Applied,
        JobStatus::Interviewing,
        JobStatus::Offer,
        JobStatus::Rejected,
        JobStatus::NoResponse,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Wishlist => "wishlist",
            JobStatus::Applied => "applied",
            JobStatus::Interviewing => "interviewing",
            JobStatus::Offer => "offer",
            JobStatus::Rejected => "rejected",
            JobStatus::NoResponse => "no_response",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            JobStatus::Wishlist => "Wishlist",
            JobStatus::Applied => "Applied",
            JobStatus::Interviewing => "Interviewing",
            JobStatus::Offer => "Offer",
            JobStatus::Rejected => "Rejected",
            JobStatus::NoResponse => "No Response",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JobStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                let allowed: Vec<_> = JobStatus::ALL.iter().map(JobStatus::as_str).collect();
                format!("'{s}' is not one of {}", allowed.join(", "))
            })
    }
}

/// A job application as returned by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobApplication {
    pub id: Uuid,
    pub user_id: Uuid,
    pub company: String,
    pub position: String,
    pub status: JobStatus,
    pub deadline: Option<NaiveDate>,
    pub notes: Option<String>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl Contract for JobApplication {
    const ENTITY: &'static str = "JobApplication";

    fn violations(&self) -> Vec<FieldViolation> {
        let mut v = Violations::new();
        v.require_min_chars("company", &self.company, 1);
        v.require_min_chars("position", &self.position, 1);
        v.into_vec()
    }
}

/// Payload for `POST /jobs/`. An omitted status is defaulted to `applied`
/// by the server.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobApplicationCreate {
    pub company: String,
    pub position: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<JobStatus>,
    pub deadline: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl JobApplicationCreate {
    pub fn new(company: impl Into<String>, position: impl Into<String>) -> Self {
        Self {
            company: company.into(),
            position: position.into(),
            status: None,
            deadline: None,
            notes: None,
        }
    }

    pub fn with_status(mut self, status: JobStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_deadline(mut self, deadline: NaiveDate) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

impl Validate for JobApplicationCreate {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut v = Violations::new();
        v.require_text("company", &self.company);
        v.require_text("position", &self.position);
        v.into_result()
    }
}

/// Partial payload for `PUT /jobs/{id}`.
///
/// `deadline` and `notes` are double options: `None` leaves the field out of
/// the request (unchanged), `Some(None)` sends an explicit `null` (cleared).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobApplicationUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<JobStatus>,
    #[serde(
        default,
        deserialize_with = "explicit_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub deadline: Option<Option<NaiveDate>>,
    #[serde(
        default,
        deserialize_with = "explicit_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub notes: Option<Option<String>>,
}

impl JobApplicationUpdate {
    pub fn is_empty(&self) -> bool {
        self.company.is_none()
            && self.position.is_none()
            && self.status.is_none()
            && self.deadline.is_none()
            && self.notes.is_none()
    }
}

impl Validate for JobApplicationUpdate {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut v = Violations::new();
        if self.is_empty() {
            v.push("$", "at least one field must be provided");
        }
        if let Some(company) = &self.company {
            v.require_text("company", company);
        }
        if let Some(position) = &self.position {
            v.require_text("position", position);
        }
        v.into_result()
    }
}

/// Keeps a present `null` as `Some(None)` instead of collapsing it into
/// "omitted".
fn explicit_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Raw job form input, every field as the text a form collects.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobForm {
    pub company: String,
    pub position: String,
    pub status: String,
    pub deadline: String,
    pub notes: String,
}

impl JobForm {
    /// Prefills the form from an existing application (edit mode).
    pub fn from_application(job: &JobApplication) -> Self {
        Self {
            company: job.company.clone(),
            position: job.position.clone(),
            status: job.status.as_str().to_string(),
            deadline: job
                .deadline
                .map(|d| d.format(DATE_FORMAT).to_string())
                .unwrap_or_default(),
            notes: job.notes.clone().unwrap_or_default(),
        }
    }

    /// Converts the form into a create payload. Blank deadline and notes
    /// become `null`; a blank status defaults to `applied`.
    pub fn parse(&self) -> Result<JobApplicationCreate, ValidationError> {
        let mut v = Violations::new();
        v.require_text("company", &self.company);
        v.require_text("position", &self.position);

        let status = match self.status.trim() {
            "" => JobStatus::default(),
            raw => match raw.parse::<JobStatus>() {
                Ok(status) => status,
                Err(reason) => {
                    v.push("status", reason);
                    JobStatus::default()
                }
            },
        };

        let deadline = match self.deadline.trim() {
            "" => None,
            raw => match parse_date(raw) {
                Some(date) => Some(date),
                None => {
                    v.push("deadline", format!("'{raw}' is not a YYYY-MM-DD date"));
                    None
                }
            },
        };

        let notes = match self.notes.trim() {
            "" => None,
            _ => Some(self.notes.clone()),
        };

        v.into_result()?;

        Ok(JobApplicationCreate {
            company: self.company.trim().to_string(),
            position: self.position.trim().to_string(),
            status: Some(status),
            deadline,
            notes,
        })
    }
}

/// Parses a calendar date. A date-time prefixed value keeps only its date
/// part.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let date_part = raw.split('T').next().unwrap_or(raw);
    NaiveDate::parse_from_str(date_part, DATE_FORMAT).ok()
}
