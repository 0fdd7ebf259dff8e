use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use uuid::Uuid;

use crate::contract::{Identity, JobApplication, JobStatus};

pub const UPCOMING_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpcomingDeadline {
    pub job_id: Uuid,
    pub company: String,
    pub position: String,
    pub deadline: NaiveDate,
    pub days_left: i64,
}

/// Summary shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardStats {
    pub total: usize,
    pub by_status: BTreeMap<JobStatus, usize>,
    /// Sorted by deadline, soonest first.
    pub upcoming: Vec<UpcomingDeadline>,
}

impl DashboardStats {
    /// Deadlines count as upcoming from `today` through `today + window_days`,
    /// skipping rejected applications.
    pub fn from_jobs(jobs: &[JobApplication], today: NaiveDate, window_days: i64) -> Self {
        let mut by_status = BTreeMap::new();
        for job in jobs {
            *by_status.entry(job.status).or_insert(0) += 1;
        }

        let horizon = today + Duration::days(window_days);
        let mut upcoming: Vec<_> = jobs
            .iter()
            .filter(|job| job.status != JobStatus::Rejected)
            .filter_map(|job| {
                let deadline = job.deadline?;
                (deadline >= today && deadline <= horizon).then(|| UpcomingDeadline {
                    job_id: job.id,
                    company: job.company.clone(),
                    position: job.position.clone(),
                    deadline,
                    days_left: (deadline - today).num_days(),
                })
            })
            .collect();
        upcoming.sort_by(|a, b| {
            a.deadline
                .cmp(&b.deadline)
                .then_with(|| a.company.cmp(&b.company))
        });

        Self {
            total: jobs.len(),
            by_status,
            upcoming,
        }
    }

    pub fn count(&self, status: JobStatus) -> usize {
        self.by_status.get(&status).copied().unwrap_or(0)
    }
}

pub fn greeting(identity: &Identity) -> String {
    format!("Welcome back, {}!", identity.display_name())
}
