use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How far a tailoring pass may rewrite a resume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TailoringMode {
    #[default]
    Conservative,
    Moderate,
    Aggressive,
}

impl TailoringMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Conservative => "conservative",
            Self::Moderate => "moderate",
            Self::Aggressive => "aggressive",
        }
    }
}

impl std::fmt::Display for TailoringMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TailoringMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "conservative" => Ok(Self::Conservative),
            "moderate" => Ok(Self::Moderate),
            "aggressive" => Ok(Self::Aggressive),
            other => Err(format!("Invalid tailoring mode: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeSection {
    pub title: String,
    pub content: String,
    pub order: u32,
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Content before tailoring, kept so changes can be reviewed.
    pub original_content: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resume {
    pub id: Option<String>,
    pub title: String,
    pub owner_name: String,
    pub email: String,
    #[serde(default)]
    pub sections: Vec<ResumeSection>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub is_tailored: bool,
    pub tailored_for_job: Option<String>,
    pub tailoring_mode: Option<TailoringMode>,
    pub original_resume_id: Option<String>,
    pub updated_at: DateTime<Utc>,
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
}

fn default_version() -> u32 {
    1
}

impl Resume {
    pub fn new(title: impl Into<String>, owner_name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            owner_name: owner_name.into(),
            email: email.into(),
            sections: Vec::new(),
            skills: Vec::new(),
            is_tailored: false,
            tailored_for_job: None,
            tailoring_mode: None,
            original_resume_id: None,
            updated_at: Utc::now(),
            version: 1,
            metadata: HashMap::new(),
        }
    }

    /// Append a section after the existing ones.
    pub fn add_section(&mut self, title: impl Into<String>, content: impl Into<String>) {
        let order = self.sections.iter().map(|s| s.order + 1).max().unwrap_or(0);
        self.sections.push(ResumeSection {
            title: title.into(),
            content: content.into(),
            order,
            keywords: Vec::new(),
            original_content: None,
        });
        self.updated_at = Utc::now();
    }

    pub fn section(&self, title: &str) -> Option<&ResumeSection> {
        self.sections.iter().find(|s| s.title == title)
    }

    /// Replace a section's content, remembering the first original. Returns
    /// `false` when no section has that title.
    pub fn update_section(&mut self, title: &str, content: impl Into<String>) -> bool {
        let Some(section) = self.sections.iter_mut().find(|s| s.title == title) else {
            return false;
        };
        let previous = std::mem::replace(&mut section.content, content.into());
        section.original_content.get_or_insert(previous);
        self.updated_at = Utc::now();
        true
    }

    pub fn tailored_copy(&self, job_id: impl Into<String>, mode: TailoringMode) -> Resume {
        let job_id = job_id.into();
        let mut copy = self.clone();
        copy.title = format!("{} - Tailored for {}", self.title, job_id);
        copy.id = None;
        copy.is_tailored = true;
        copy.tailored_for_job = Some(job_id);
        copy.tailoring_mode = Some(mode);
        copy.original_resume_id = self.id.clone();
        copy.version = 1;
        copy.updated_at = Utc::now();
        copy
    }
}

crate::opaque_summary!(Resume);
