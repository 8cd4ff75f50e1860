use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Lifecycle of a discovered job posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    #[default]
    Discovered,
    Analyzed,
    Applied,
    Rejected,
    Expired,
}

/// How strongly a posting asks for a requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Importance {
    Required,
    Preferred,
    NiceToHave,
}

/// A single requirement extracted from a posting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRequirement {
    /// e.g. `technical`, `experience`, `education`.
    pub category: String,
    pub skill: String,
    pub importance: Importance,
    pub years_experience: Option<u32>,
}

/// A job posting as it moves through search, analysis and application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: Option<String>,
    pub title: String,
    pub company: String,
    pub location: String,
    pub url: String,
    pub description: String,
    #[serde(default)]
    pub requirements: Vec<JobRequirement>,
    /// Board the posting was found on (`linkedin`, `indeed`, ...).
    pub platform: String,
    #[serde(default)]
    pub easy_apply: bool,
    #[serde(default)]
    pub key_skills: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Compatibility with the user's profile, `0.0..=1.0`.
    pub match_score: Option<f64>,
    #[serde(default)]
    pub status: JobStatus,
    pub discovered_at: DateTime<Utc>,
    pub analyzed_at: Option<DateTime<Utc>>,
    pub applied_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
}

impl Job {
    pub fn new(
        title: impl Into<String>,
        company: impl Into<String>,
        url: impl Into<String>,
        platform: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            title: title.into(),
            company: company.into(),
            location: String::new(),
            url: url.into(),
            description: String::new(),
            requirements: Vec::new(),
            platform: platform.into(),
            easy_apply: false,
            key_skills: Vec::new(),
            keywords: Vec::new(),
            match_score: None,
            status: JobStatus::Discovered,
            discovered_at: Utc::now(),
            analyzed_at: None,
            applied_at: None,
            metadata: HashMap::new(),
        }
    }

    pub fn add_requirement(
        &mut self,
        category: impl Into<String>,
        skill: impl Into<String>,
        importance: Importance,
        years_experience: Option<u32>,
    ) {
        self.requirements.push(JobRequirement {
            category: category.into(),
            skill: skill.into(),
            importance,
            years_experience,
        });
    }

    pub fn skills_with(&self, importance: Importance) -> Vec<&str> {
        self.requirements
            .iter()
            .filter(|r| r.importance == importance)
            .map(|r| r.skill.as_str())
            .collect()
    }

    /// Store analysis output and move the job to `Analyzed`.
    pub fn update_analysis(&mut self, key_skills: Vec<String>, keywords: Vec<String>, match_score: f64) {
        self.key_skills = key_skills;
        self.keywords = keywords;
        self.match_score = Some(match_score.clamp(0.0, 1.0));
        self.analyzed_at = Some(Utc::now());
        self.status = JobStatus::Analyzed;
    }

    pub fn mark_applied(&mut self) {
        self.applied_at = Some(Utc::now());
        self.status = JobStatus::Applied;
    }
}

/// Search parameters handed to a job-search agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobQuery {
    pub keywords: Vec<String>,
    pub location: Option<String>,
    pub platforms: Vec<String>,
    pub max_results: usize,
}

crate::opaque_summary!(Job, JobQuery);
