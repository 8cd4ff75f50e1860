use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    #[default]
    Pending,
    Submitted,
    UnderReview,
    InterviewScheduled,
    Rejected,
    Accepted,
    Withdrawn,
    Expired,
}

impl ApplicationStatus {
    /// Still awaiting an outcome.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            Self::Pending | Self::Submitted | Self::UnderReview | Self::InterviewScheduled
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusChange {
    pub from: ApplicationStatus,
    pub to: ApplicationStatus,
    pub timestamp: DateTime<Utc>,
    pub notes: Option<String>,
}

/// A submission of a (possibly tailored) resume to a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub id: Uuid,
    pub job_id: String,
    pub resume_id: String,
    pub status: ApplicationStatus,
    #[serde(default)]
    pub status_history: Vec<StatusChange>,
    pub cover_letter: Option<String>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub confirmation_number: Option<String>,
    /// Dry-run submissions never reach the job board.
    pub test_mode: bool,
    #[serde(default)]
    pub errors: Vec<String>,
}

impl Application {
    pub fn new(job_id: impl Into<String>, resume_id: impl Into<String>, test_mode: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            job_id: job_id.into(),
            resume_id: resume_id.into(),
            status: ApplicationStatus::Pending,
            status_history: Vec::new(),
            cover_letter: None,
            submitted_at: None,
            confirmation_number: None,
            test_mode,
            errors: Vec::new(),
        }
    }

    pub fn update_status(&mut self, status: ApplicationStatus, notes: Option<String>) {
        self.status_history.push(StatusChange {
            from: self.status,
            to: status,
            timestamp: Utc::now(),
            notes,
        });
        self.status = status;
    }

    pub fn mark_submitted(&mut self, confirmation_number: Option<String>) {
        self.submitted_at = Some(Utc::now());
        self.confirmation_number = confirmation_number;
        self.update_status(ApplicationStatus::Submitted, None);
    }

    pub fn add_error(&mut self, message: &str) {
        self.errors.push(format!("{}: {}", Utc::now().to_rfc3339(), message));
    }

    /// Submitted or under review for longer than a week or two without news.
    pub fn requires_follow_up(&self, now: DateTime<Utc>) -> bool {
        let Some(submitted_at) = self.submitted_at else {
            return false;
        };
        let days = (now - submitted_at).num_days();
        match self.status {
            ApplicationStatus::Submitted => days > 7,
            ApplicationStatus::UnderReview => days > 14,
            _ => false,
        }
    }
}

crate::opaque_summary!(Application);
